//! Lifecycle Discord commands - requisition, borrow, return, transfer, scrap, dispose.
//!
//! Every command takes a list of asset codes and runs one all-or-nothing batch.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{Context, handlers::autocomplete, operator_for, parse_codes},
        core::{
            asset::{get_asset_by_code, resolve_asset_codes},
            ledger,
            operation::{Assignment, BorrowPeriod, Holder, Location, Operation, ReturnDetails},
            report,
        },
        entities::ReturnType,
        errors::{Error, Result},
    };
    use chrono::Utc;
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    const SUCCESS_COLOR: u32 = 0x0057_F287;
    const REJECT_COLOR: u32 = 0x00ED_4245;

    fn build_assignment(
        employee: String,
        employee_code: Option<String>,
        department: Option<String>,
        location: [Option<String>; 3],
        form_no: Option<String>,
    ) -> Result<Assignment> {
        let holder = Holder::new(employee, employee_code, department)?;
        let location = if location.iter().any(Option::is_some) {
            let [floor, room_type, spot] = location;
            Some(Location::new(
                floor.unwrap_or_default(),
                room_type.unwrap_or_default(),
                spot.unwrap_or_default(),
            )?)
        } else {
            None
        };
        Ok(Assignment::new(holder, location).with_form_no(form_no))
    }

    async fn run_batch(
        ctx: Context<'_>,
        codes: &str,
        operation: Operation,
        note: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let kind = operation.kind();

        let codes = parse_codes(codes);
        if codes.is_empty() {
            ctx.say("❌ Give at least one asset code.").await?;
            return Ok(());
        }

        let (ids, missing) = resolve_asset_codes(db, &codes).await?;
        if !missing.is_empty() {
            ctx.say(format!(
                "❌ Unknown asset codes: {}. Nothing was changed.",
                missing.join(", ")
            ))
            .await?;
            return Ok(());
        }

        let operator = operator_for(ctx);
        let outcome =
            ledger::execute_operation(db, &operator, &ids, &operation, note.as_deref()).await?;

        if !outcome.rejected.is_empty() {
            let mut body = String::new();
            for rejection in &outcome.rejected {
                writeln!(&mut body, "`{}`: {}", rejection.label(), rejection.reason)?;
            }
            let embed = serenity::CreateEmbed::default()
                .title(format!("❌ {kind} rejected"))
                .color(REJECT_COLOR)
                .description(format!(
                    "{} of {} assets are not eligible. Nothing was changed.\n\n{body}",
                    outcome.rejected.len(),
                    ids.len()
                ));
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
            return Ok(());
        }

        let mut embed = serenity::CreateEmbed::default()
            .title(format!("✅ {kind} applied"))
            .color(SUCCESS_COLOR)
            .description(format!("{} by {}", codes.join(", "), operator.name));
        if let Some(assignment) = operation.assignment() {
            let mut target = assignment.holder.employee_name.clone();
            if let Some(location) = &assignment.location {
                write!(&mut target, " @ {}", location.display())?;
            }
            embed = embed.field("Holder", target, false);
        }
        for warning in &outcome.warnings {
            embed = embed.field("⚠️ Warning", warning, false);
        }
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Issues in-stock assets to an employee.
    #[allow(clippy::too_many_arguments)]
    #[poise::command(slash_command)]
    pub async fn requisition(
        ctx: Context<'_>,
        #[description = "Asset codes, comma separated"]
        #[autocomplete = "autocomplete::autocomplete_asset_code"]
        codes: String,
        #[description = "Employee receiving the assets"] employee: String,
        #[description = "Employee code"] employee_code: Option<String>,
        #[description = "Department"] department: Option<String>,
        #[description = "Floor"] floor: Option<String>,
        #[description = "Room type"] room_type: Option<String>,
        #[description = "Specific location"] spot: Option<String>,
        #[description = "Related form number"] form_no: Option<String>,
        #[description = "Note"] note: Option<String>,
    ) -> Result<()> {
        let assignment = build_assignment(
            employee,
            employee_code,
            department,
            [floor, room_type, spot],
            form_no,
        )?;
        run_batch(ctx, &codes, Operation::Requisition(assignment), note).await
    }

    /// Lends in-stock assets to an employee for a number of days.
    #[allow(clippy::too_many_arguments)]
    #[poise::command(slash_command)]
    pub async fn borrow(
        ctx: Context<'_>,
        #[description = "Asset codes, comma separated"]
        #[autocomplete = "autocomplete::autocomplete_asset_code"]
        codes: String,
        #[description = "Employee borrowing the assets"] employee: String,
        #[description = "Loan length in days"] days: u32,
        #[description = "Employee code"] employee_code: Option<String>,
        #[description = "Department"] department: Option<String>,
        #[description = "Floor"] floor: Option<String>,
        #[description = "Room type"] room_type: Option<String>,
        #[description = "Specific location"] spot: Option<String>,
        #[description = "Related form number"] form_no: Option<String>,
        #[description = "Note"] note: Option<String>,
    ) -> Result<()> {
        let assignment = build_assignment(
            employee,
            employee_code,
            department,
            [floor, room_type, spot],
            form_no,
        )?;
        let period = BorrowPeriod::for_days(Utc::now(), days)?;
        run_batch(ctx, &codes, Operation::Borrow(assignment, period), note).await
    }

    /// Brings in-use assets back into stock.
    #[poise::command(slash_command, rename = "return")]
    pub async fn return_assets(
        ctx: Context<'_>,
        #[description = "Asset codes, comma separated"]
        #[autocomplete = "autocomplete::autocomplete_asset_code"]
        codes: String,
        #[description = "Who brought them back; derived from the holder when omitted"]
        returned_by: Option<String>,
        #[description = "Returned because the holder is leaving"] resignation: Option<bool>,
        #[description = "Note"] note: Option<String>,
    ) -> Result<()> {
        let details = ReturnDetails {
            return_type: if resignation.unwrap_or(false) {
                ReturnType::Resignation
            } else {
                ReturnType::Normal
            },
            returned_by: returned_by
                .map(|name| Holder::new(name, None, None))
                .transpose()?,
        };
        run_batch(ctx, &codes, Operation::Return(details), note).await
    }

    /// Moves in-use assets to a new holder.
    #[allow(clippy::too_many_arguments)]
    #[poise::command(slash_command)]
    pub async fn transfer(
        ctx: Context<'_>,
        #[description = "Asset codes, comma separated"]
        #[autocomplete = "autocomplete::autocomplete_asset_code"]
        codes: String,
        #[description = "New holder"] employee: String,
        #[description = "Employee code"] employee_code: Option<String>,
        #[description = "Department"] department: Option<String>,
        #[description = "Floor"] floor: Option<String>,
        #[description = "Room type"] room_type: Option<String>,
        #[description = "Specific location"] spot: Option<String>,
        #[description = "Related form number"] form_no: Option<String>,
        #[description = "Note"] note: Option<String>,
    ) -> Result<()> {
        let assignment = build_assignment(
            employee,
            employee_code,
            department,
            [floor, room_type, spot],
            form_no,
        )?;
        run_batch(ctx, &codes, Operation::Transfer(assignment), note).await
    }

    /// Writes assets off.
    #[poise::command(slash_command)]
    pub async fn scrap(
        ctx: Context<'_>,
        #[description = "Asset codes, comma separated"]
        #[autocomplete = "autocomplete::autocomplete_asset_code"]
        codes: String,
        #[description = "Reason"] reason: Option<String>,
    ) -> Result<()> {
        run_batch(ctx, &codes, Operation::Scrap, reason).await
    }

    /// Clears scrapped assets from the books.
    #[poise::command(slash_command)]
    pub async fn dispose(
        ctx: Context<'_>,
        #[description = "Asset codes, comma separated"]
        #[autocomplete = "autocomplete::autocomplete_asset_code"]
        codes: String,
        #[description = "Reason"] reason: Option<String>,
    ) -> Result<()> {
        run_batch(ctx, &codes, Operation::Dispose, reason).await
    }

    /// Shows the flow history of an asset, newest first.
    #[poise::command(slash_command, prefix_command)]
    pub async fn history(
        ctx: Context<'_>,
        #[description = "Asset code"]
        #[autocomplete = "autocomplete::autocomplete_asset_code"]
        code: String,
        #[description = "Maximum number of records (default 15)"] limit: Option<u32>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let asset = get_asset_by_code(db, &code)
            .await?
            .ok_or_else(|| Error::AssetNotFound {
                reference: code.clone(),
            })?;

        let records = ledger::get_flow_history(db, asset.id).await?;
        let total = records.len();
        let limit = usize::try_from(limit.unwrap_or(15))?;

        let mut body = String::new();
        for record in records.iter().take(limit) {
            writeln!(&mut body, "{}", report::format_flow_summary(record))?;
        }
        if body.is_empty() {
            body.push_str("No flow records.");
        }

        let embed = serenity::CreateEmbed::default()
            .title(format!("History of {} ({total} records)", asset.asset_code))
            .color(0x0058_65F2)
            .description(body);
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
