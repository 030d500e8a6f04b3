//! Report Discord commands - stagnant inventory, dashboard, rollups and purchase orders.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{Context, handlers::autocomplete},
        core::{
            dashboard::{self, Dimension},
            report,
            stagnant::{self, StagnantWindow},
        },
        errors::{Error, Result},
    };
    use chrono::{NaiveDate, Utc};
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    /// Rollup dimension offered by `/rollup`
    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum DimensionChoice {
        Category,
        Brand,
        Model,
    }

    impl From<DimensionChoice> for Dimension {
        fn from(choice: DimensionChoice) -> Self {
            match choice {
                DimensionChoice::Category => Self::Category,
                DimensionChoice::Brand => Self::Brand,
                DimensionChoice::Model => Self::Model,
            }
        }
    }

    fn parse_day(value: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| Error::InvalidPayload {
            message: format!("expected a YYYY-MM-DD date, got '{value}'"),
        })
    }

    /// Lists in-stock assets with no flow activity in a window.
    ///
    /// Give `days` for a rolling window, or `from` and `to` for a date range.
    #[poise::command(slash_command, prefix_command)]
    pub async fn stagnant(
        ctx: Context<'_>,
        #[description = "Lookback in days (default from config)"] days: Option<u32>,
        #[description = "Range start (YYYY-MM-DD)"] from: Option<String>,
        #[description = "Range end (YYYY-MM-DD)"] to: Option<String>,
    ) -> Result<()> {
        let window = match (from, to) {
            (Some(from), Some(to)) => StagnantWindow::range(parse_day(&from)?, parse_day(&to)?)?,
            (None, None) => {
                StagnantWindow::Days(days.unwrap_or(ctx.data().settings.stagnant_days))
            }
            _ => {
                ctx.say("❌ Give both `from` and `to`, or neither.").await?;
                return Ok(());
            }
        };

        let assets = stagnant::compute_stagnant(&ctx.data().database, &window).await?;
        let heading = match window {
            StagnantWindow::Days(days) => format!("no activity in the last {days} days"),
            StagnantWindow::Range { start, end } => format!("no activity from {start} to {end}"),
        };

        if assets.is_empty() {
            ctx.say(format!("✅ No stagnant assets ({heading}).")).await?;
            return Ok(());
        }

        let total: f64 = assets.iter().map(|asset| asset.purchase_price).sum();
        let mut body = String::new();
        for asset in assets.iter().take(30) {
            writeln!(
                &mut body,
                "`{}` {} | {}",
                asset.asset_code,
                asset.name,
                report::format_currency(asset.purchase_price)
            )?;
        }
        if assets.len() > 30 {
            writeln!(&mut body, "... and {} more", assets.len() - 30)?;
        }

        let embed = serenity::CreateEmbed::default()
            .title(format!("Stagnant assets ({})", assets.len()))
            .color(0x00FE_E75C)
            .description(format!("In stock, {heading}.\n\n{body}"))
            .footer(serenity::CreateEmbedFooter::new(format!(
                "Idle value: {}",
                report::format_currency(total)
            )));
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Shows totals, purchase-age buckets and scrap candidates.
    #[poise::command(slash_command, prefix_command)]
    pub async fn dashboard(ctx: Context<'_>) -> Result<()> {
        let db = &ctx.data().database;
        let today = Utc::now().date_naive();
        let min_age = ctx.data().settings.scrap_age_years;

        let overview = dashboard::overview(db).await?;
        let buckets = dashboard::fetch_lifespan_buckets(db, today).await?;
        let candidates = dashboard::fetch_scrap_candidates(db, today, min_age).await?;

        #[allow(clippy::cast_precision_loss)]
        let utilization = if overview.total_count == 0 {
            0.0
        } else {
            overview.in_use_count as f64 / overview.total_count as f64
        };

        let mut categories = String::new();
        for (name, count) in overview.by_category.iter().take(10) {
            writeln!(&mut categories, "{name}: {count}")?;
        }
        if categories.is_empty() {
            categories.push('-');
        }

        let embed = serenity::CreateEmbed::default()
            .title("📊 Asset Dashboard")
            .color(0x0034_98DB)
            .field("Assets", overview.total_count.to_string(), true)
            .field("Value", report::format_currency(overview.total_value), true)
            .field("Faulty", overview.faulty_count.to_string(), true)
            .field("In use", overview.in_use_count.to_string(), true)
            .field("In stock", overview.in_stock_count.to_string(), true)
            .field(
                "Utilization",
                report::format_utilization_bar(utilization, Some(10)),
                false,
            )
            .field("By category", categories, false)
            .field(
                "Purchase age",
                format!(
                    "<2y: {} | 2-4y: {} | ≥4y: {}",
                    buckets.under_two_years, buckets.two_to_four_years, buckets.four_years_plus
                ),
                false,
            )
            .field(
                format!("Scrap candidates (≥{min_age}y)"),
                format!(
                    "{} scrapped, {} aged | {}",
                    candidates.scrapped.len(),
                    candidates.aged.len(),
                    report::format_currency(candidates.total_value)
                ),
                false,
            );
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Rolls assets up by category, brand or model.
    #[poise::command(slash_command, prefix_command)]
    pub async fn rollup(
        ctx: Context<'_>,
        #[description = "Group by"] primary: DimensionChoice,
        #[description = "Then break down by"] secondary: Option<DimensionChoice>,
    ) -> Result<()> {
        let tree = dashboard::aggregate_by_dimension(
            &ctx.data().database,
            primary.into(),
            secondary.map(Dimension::from),
        )
        .await?;

        if tree.is_empty() {
            ctx.say("No assets to roll up.").await?;
            return Ok(());
        }

        let lines = report::format_rollup(&tree);
        let mut body = String::new();
        for line in lines.iter().take(40) {
            writeln!(&mut body, "{line}")?;
        }

        let embed = serenity::CreateEmbed::default()
            .title(format!("Rollup by {primary:?}"))
            .color(0x0058_65F2)
            .description(format!("```\n{body}```"));
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Shows how much of each purchase order has been issued.
    ///
    /// Without an order, every order is listed.
    #[poise::command(slash_command, prefix_command)]
    pub async fn purchase_order(
        ctx: Context<'_>,
        #[description = "Purchase order number"]
        #[autocomplete = "autocomplete::autocomplete_purchase_order"]
        order: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let stats: Vec<dashboard::PurchaseOrderStats> = match order.as_deref() {
            Some(order) => dashboard::fetch_purchase_order(db, order)
                .await?
                .into_iter()
                .collect(),
            None => dashboard::fetch_purchase_order_stats(db).await?,
        };

        if stats.is_empty() {
            ctx.say("No assets carry that purchase order.").await?;
            return Ok(());
        }

        let fields: Vec<(String, String, bool)> = stats
            .iter()
            .take(25)
            .map(|entry| {
                let title = match entry.project_name.as_deref() {
                    Some(project) => format!("{} ({project})", entry.purchase_order),
                    None => entry.purchase_order.clone(),
                };
                let detail = format!(
                    "{} assets | {} | issued {} | in stock {}",
                    entry.count,
                    report::format_currency(entry.total_amount),
                    entry.issued_count,
                    entry.in_stock_count
                );
                (title, detail, false)
            })
            .collect();

        let embed = serenity::CreateEmbed::default()
            .title(format!("🧾 Purchase orders ({})", stats.len()))
            .color(0x0034_98DB)
            .fields(fields);
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
