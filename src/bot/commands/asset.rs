//! Asset Discord commands - registration, lookup and the fault flag.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{Context, handlers::autocomplete, operator_for},
        core::{
            asset::{self as assets, AssetFilter, AssetIntake},
            dictionary, report,
        },
        entities::AssetStatus,
        errors::{Error, Result},
    };
    use chrono::NaiveDate;
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    /// Status filter offered by `/asset list`
    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum StatusChoice {
        #[name = "in_stock"]
        InStock,
        #[name = "in_use"]
        InUse,
        #[name = "maintenance"]
        Maintenance,
        #[name = "scrapped"]
        Scrapped,
        #[name = "cleared"]
        Cleared,
    }

    impl From<StatusChoice> for AssetStatus {
        fn from(choice: StatusChoice) -> Self {
            match choice {
                StatusChoice::InStock => Self::InStock,
                StatusChoice::InUse => Self::InUse,
                StatusChoice::Maintenance => Self::Maintenance,
                StatusChoice::Scrapped => Self::Scrapped,
                StatusChoice::Cleared => Self::Cleared,
            }
        }
    }

    fn parse_date(value: Option<String>, field: &'static str) -> Result<Option<NaiveDate>> {
        value
            .map(|v| {
                NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d").map_err(|_| Error::InvalidPayload {
                    message: format!("{field} must be a YYYY-MM-DD date, got '{v}'"),
                })
            })
            .transpose()
    }

    async fn resolve_category(ctx: Context<'_>, name: Option<String>) -> Result<Option<i64>> {
        let Some(name) = name else {
            return Ok(None);
        };
        let category = dictionary::get_category_by_name(&ctx.data().database, &name)
            .await?
            .ok_or(Error::CategoryNotFound { reference: name })?;
        Ok(Some(category.id))
    }

    /// Registers, inspects and lists assets.
    #[poise::command(
        slash_command,
        subcommands("asset_add", "asset_from_dictionary", "asset_info", "asset_list", "asset_fault")
    )]
    pub async fn asset(ctx: Context<'_>) -> Result<()> {
        let help_text = "Asset command. Available subcommands:\n\
            `/asset add` - Register a new asset into stock\n\
            `/asset from_dictionary` - Register an asset from a dictionary item\n\
            `/asset info` - Show an asset and its recent history\n\
            `/asset list` - List assets with filters\n\
            `/asset fault` - Mark or clear the fault flag";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Registers a new asset. It starts in stock with an inbound flow record.
    #[poise::command(slash_command, rename = "add")]
    pub async fn asset_add(
        ctx: Context<'_>,
        #[description = "Display name (e.g., 'ThinkPad T14')"] name: String,
        #[description = "Asset code; generated when omitted"] code: Option<String>,
        #[description = "Category"]
        #[autocomplete = "autocomplete::autocomplete_category_name"]
        category: Option<String>,
        #[description = "Purchase price"] price: Option<f64>,
        #[description = "Brand"] brand: Option<String>,
        #[description = "Model"] model: Option<String>,
        #[description = "Serial number"] serial_number: Option<String>,
        #[description = "Purchase date (YYYY-MM-DD)"] purchase_date: Option<String>,
    ) -> Result<()> {
        let operator = operator_for(ctx);
        let intake = AssetIntake {
            asset_code: code,
            name,
            category_id: resolve_category(ctx, category).await?,
            brand,
            model_name: model,
            serial_number,
            purchase_price: price,
            purchase_date: parse_date(purchase_date, "purchase_date")?,
            ..Default::default()
        };

        let created = assets::create_asset(&ctx.data().database, &operator, intake).await?;
        ctx.say(format!(
            "✅ Registered **{}** ({}) in stock at {}.",
            created.asset_code,
            created.name,
            report::format_currency(created.purchase_price)
        ))
        .await?;
        Ok(())
    }

    /// Registers a new asset pre-filled from a dictionary item.
    #[poise::command(slash_command, rename = "from_dictionary")]
    pub async fn asset_from_dictionary(
        ctx: Context<'_>,
        #[description = "Dictionary item id (see /dictionary list)"] item_id: i64,
        #[description = "Asset code; generated when omitted"] code: Option<String>,
        #[description = "Serial number"] serial_number: Option<String>,
        #[description = "Purchase order number"] purchase_order: Option<String>,
        #[description = "Purchase date (YYYY-MM-DD)"] purchase_date: Option<String>,
    ) -> Result<()> {
        let operator = operator_for(ctx);
        let intake = AssetIntake {
            asset_code: code,
            serial_number,
            purchase_order,
            purchase_date: parse_date(purchase_date, "purchase_date")?,
            ..Default::default()
        };

        let created =
            assets::create_asset_from_dictionary(&ctx.data().database, &operator, item_id, intake)
                .await?;
        ctx.say(format!(
            "✅ Registered **{}** ({}) from dictionary item #{item_id}.",
            created.asset_code, created.name
        ))
        .await?;
        Ok(())
    }

    /// Shows an asset with its current holder and recent flow records.
    #[poise::command(slash_command, rename = "info")]
    pub async fn asset_info(
        ctx: Context<'_>,
        #[description = "Asset code"]
        #[autocomplete = "autocomplete::autocomplete_asset_code"]
        code: String,
    ) -> Result<()> {
        let data = report::generate_asset_report(&ctx.data().database, &code, Some(5)).await?;
        let asset = &data.asset;

        let mut history = String::new();
        for record in &data.recent_flows {
            writeln!(&mut history, "{}", report::format_flow_summary(record))?;
        }
        if history.is_empty() {
            history.push_str("No flow records.");
        }

        let mut embed = serenity::CreateEmbed::default()
            .title(format!("{} - {}", asset.asset_code, asset.name))
            .color(0x0058_65F2)
            .field("Status", asset.status.to_string(), true)
            .field(
                "Category",
                data.category_name.clone().unwrap_or_else(|| "-".to_string()),
                true,
            )
            .field(
                "Price",
                report::format_currency(asset.purchase_price),
                true,
            )
            .field("Holder", report::format_holder(asset), false);
        if asset.is_faulty {
            embed = embed.field("Fault", "⚠️ Marked faulty", true);
        }
        embed = embed
            .field(
                format!("Recent history ({} total)", data.flow_count),
                history,
                false,
            );

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Lists assets, optionally filtered.
    #[poise::command(slash_command, rename = "list")]
    pub async fn asset_list(
        ctx: Context<'_>,
        #[description = "Status"] status: Option<StatusChoice>,
        #[description = "Part of the code or name"] search: Option<String>,
        #[description = "Category"]
        #[autocomplete = "autocomplete::autocomplete_category_name"]
        category: Option<String>,
        #[description = "Only faulty assets"] faulty: Option<bool>,
    ) -> Result<()> {
        let filter = AssetFilter {
            name_contains: search,
            status: status.map(AssetStatus::from),
            category_id: resolve_category(ctx, category).await?,
            is_faulty: faulty,
            ..Default::default()
        };
        let found = assets::list_assets(&ctx.data().database, &filter).await?;

        if found.is_empty() {
            ctx.say("No assets match.").await?;
            return Ok(());
        }

        let mut body = String::new();
        for asset in found.iter().take(30) {
            writeln!(
                &mut body,
                "`{}` {} | {} | {}",
                asset.asset_code,
                asset.name,
                asset.status,
                report::format_holder(asset)
            )?;
        }
        if found.len() > 30 {
            writeln!(&mut body, "... and {} more", found.len() - 30)?;
        }

        let embed = serenity::CreateEmbed::default()
            .title(format!("**Assets** ({})", found.len()))
            .color(0x0058_65F2)
            .description(body);
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Marks an asset faulty, or clears the flag.
    #[poise::command(slash_command, rename = "fault")]
    pub async fn asset_fault(
        ctx: Context<'_>,
        #[description = "Asset code"]
        #[autocomplete = "autocomplete::autocomplete_asset_code"]
        code: String,
        #[description = "Faulty (true) or repaired (false)"] faulty: bool,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let asset = assets::get_asset_by_code(db, &code)
            .await?
            .ok_or_else(|| Error::AssetNotFound {
                reference: code.clone(),
            })?;

        assets::set_faulty(db, asset.id, faulty).await?;
        let message = if faulty {
            format!("⚠️ **{code}** marked faulty; it can no longer be requisitioned or borrowed.")
        } else {
            format!("✅ **{code}** fault flag cleared.")
        };
        ctx.say(message).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
