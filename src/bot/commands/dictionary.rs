//! Catalogue Discord commands - browse equipment templates and procurement contracts.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{Context, handlers::autocomplete},
        core::{
            contract::{self, ContractDetails, ContractFilter},
            dictionary::{self as catalog, DictionaryFilter},
            report,
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    /// Equipment templates used to pre-fill new assets.
    #[poise::command(slash_command, subcommands("dictionary_list"))]
    pub async fn dictionary(ctx: Context<'_>) -> Result<()> {
        ctx.say("Dictionary command. Available subcommands:\n`/dictionary list` - Browse dictionary items")
            .await?;
        Ok(())
    }

    /// Lists dictionary items with their tax-inclusive price.
    #[poise::command(slash_command, rename = "list")]
    pub async fn dictionary_list(
        ctx: Context<'_>,
        #[description = "Part of the name, brand, model or supplier"] search: Option<String>,
        #[description = "Procurement project"]
        #[autocomplete = "autocomplete::autocomplete_project_name"]
        project: Option<String>,
    ) -> Result<()> {
        let filter = DictionaryFilter {
            project_name: project,
            search,
            ..Default::default()
        };
        let items = catalog::list_dictionary_items(&ctx.data().database, &filter).await?;

        if items.is_empty() {
            ctx.say("No dictionary items match.").await?;
            return Ok(());
        }

        let fields: Vec<(String, String, bool)> = items
            .iter()
            .take(25)
            .map(|item| {
                let title = format!("#{} {}", item.id, item.equipment_name);
                let detail = format!(
                    "{} {} | {} ({} incl. tax) | {}",
                    item.brand.as_deref().unwrap_or("-"),
                    item.model_name.as_deref().unwrap_or(""),
                    report::format_currency(item.price),
                    report::format_currency(catalog::tax_inclusive_price(item.price, item.tax_rate)),
                    item.supplier.as_deref().unwrap_or("-")
                );
                (title, detail, false)
            })
            .collect();

        let embed = serenity::CreateEmbed::default()
            .title(format!("**Dictionary** ({})", items.len()))
            .color(0x0058_65F2)
            .fields(fields);
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    fn contract_summary(details: &ContractDetails) -> String {
        let suppliers: Vec<&str> = details
            .suppliers
            .iter()
            .map(|supplier| supplier.supplier_name.as_str())
            .collect();
        format!(
            "BM: {} | PO: {} | Suppliers: {}",
            details.contract.bm_number.as_deref().unwrap_or("-"),
            details.contract.procurement_order.as_deref().unwrap_or("-"),
            if suppliers.is_empty() {
                "-".to_string()
            } else {
                suppliers.join(", ")
            }
        )
    }

    /// Procurement contracts and their suppliers.
    #[poise::command(slash_command, subcommands("contract_list", "contract_info"))]
    pub async fn contract(ctx: Context<'_>) -> Result<()> {
        ctx.say(
            "Contract command. Available subcommands:\n\
            `/contract list` - Browse procurement contracts\n\
            `/contract info` - Suppliers and dictionary items of one contract",
        )
        .await?;
        Ok(())
    }

    /// Lists procurement contracts, newest first.
    #[poise::command(slash_command, rename = "list")]
    pub async fn contract_list(
        ctx: Context<'_>,
        #[description = "Part of the project name"] project: Option<String>,
        #[description = "Part of the BM number"] bm: Option<String>,
        #[description = "Part of the purchase order"] order: Option<String>,
    ) -> Result<()> {
        let filter = ContractFilter {
            project_contains: project,
            bm_contains: bm,
            order_contains: order,
        };
        let contracts = contract::list_contracts(&ctx.data().database, &filter).await?;

        if contracts.is_empty() {
            ctx.say("No contracts match.").await?;
            return Ok(());
        }

        let fields: Vec<(String, String, bool)> = contracts
            .iter()
            .take(25)
            .map(|details| {
                let title = match details.contract.project_time {
                    Some(date) => format!("{} ({date})", details.contract.project_name),
                    None => details.contract.project_name.clone(),
                };
                (title, contract_summary(details), false)
            })
            .collect();

        let embed = serenity::CreateEmbed::default()
            .title(format!("**Contracts** ({})", contracts.len()))
            .color(0x0058_65F2)
            .fields(fields);
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Shows one contract with its suppliers and dictionary items.
    #[poise::command(slash_command, rename = "info")]
    pub async fn contract_info(
        ctx: Context<'_>,
        #[description = "Project name"]
        #[autocomplete = "autocomplete::autocomplete_project_name"]
        project: String,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let found = contract::get_contract_by_project_name(db, &project)
            .await?
            .ok_or_else(|| Error::ContractNotFound {
                reference: project.clone(),
            })?;
        let details = contract::get_contract_details(db, found.id).await?;
        let items = catalog::list_dictionary_items(
            db,
            &DictionaryFilter {
                contract_id: Some(found.id),
                ..Default::default()
            },
        )
        .await?;

        let mut suppliers = String::new();
        for supplier in &details.suppliers {
            writeln!(
                &mut suppliers,
                "• {} | {} {}",
                supplier.supplier_name,
                supplier.contact_person.as_deref().unwrap_or("-"),
                supplier.contact_phone.as_deref().unwrap_or("")
            )?;
        }
        if suppliers.is_empty() {
            suppliers.push('-');
        }

        let mut catalogue = String::new();
        for item in items.iter().take(20) {
            writeln!(
                &mut catalogue,
                "#{} {} | {}",
                item.id,
                item.equipment_name,
                report::format_currency(item.price)
            )?;
        }
        if catalogue.is_empty() {
            catalogue.push('-');
        }

        let mut embed = serenity::CreateEmbed::default()
            .title(format!("📄 {}", details.contract.project_name))
            .color(0x0058_65F2)
            .field(
                "BM number",
                details.contract.bm_number.as_deref().unwrap_or("-"),
                true,
            )
            .field(
                "Purchase order",
                details.contract.procurement_order.as_deref().unwrap_or("-"),
                true,
            )
            .field("Suppliers", suppliers, false)
            .field(format!("Dictionary items ({})", items.len()), catalogue, false);
        if let Some(description) = details.contract.description.as_deref() {
            embed = embed.description(description);
        }
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
