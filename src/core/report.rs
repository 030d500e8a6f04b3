//! Report generation and text formatting.
//!
//! Functions here build structured report data or plain strings. They know nothing
//! about Discord; the bot layer decides how to lay them out.

use crate::{
    core::{asset::get_asset_by_code, dashboard::RollupNode, ledger},
    entities::{Category, asset, flow_record},
    errors::{Error, Result},
};
use sea_orm::{DatabaseConnection, EntityTrait};

/// Asset card: the asset, its category name and its most recent flow records.
#[derive(Debug, Clone)]
pub struct AssetReport {
    /// The asset
    pub asset: asset::Model,
    /// Category display name
    pub category_name: Option<String>,
    /// Most recent flow records, newest first
    pub recent_flows: Vec<flow_record::Model>,
    /// Total number of flow records
    pub flow_count: usize,
}

/// Builds the report for one asset.
///
/// # Arguments
/// * `asset_code` - Code of the asset
/// * `history_limit` - Maximum number of flow records to include (default 5)
pub async fn generate_asset_report(
    db: &DatabaseConnection,
    asset_code: &str,
    history_limit: Option<u64>,
) -> Result<AssetReport> {
    let asset = get_asset_by_code(db, asset_code)
        .await?
        .ok_or_else(|| Error::AssetNotFound {
            reference: asset_code.to_string(),
        })?;

    let category_name = match asset.category_id {
        Some(id) => Category::find_by_id(id).one(db).await?.map(|c| c.name),
        None => None,
    };

    let history = ledger::get_flow_history(db, asset.id).await?;
    let flow_count = history.len();
    let recent_flows = history
        .into_iter()
        .take(history_limit.unwrap_or(5).try_into()?)
        .collect();

    Ok(AssetReport {
        asset,
        category_name,
        recent_flows,
        flow_count,
    })
}

/// Formats a money amount with two decimals, e.g. `¥1234.50`.
#[must_use]
pub fn format_currency(amount: f64) -> String {
    format!("¥{amount:.2}")
}

/// Text bar for a utilization ratio in `[0, 1]`, like `[████░░░░░░] 40.0%`.
#[must_use]
pub fn format_utilization_bar(ratio: f64, bar_length: Option<usize>) -> String {
    let length = bar_length.unwrap_or(10);
    let clamped = ratio.clamp(0.0, 1.0);

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = (clamped * length as f64).round() as usize;
    let empty = length.saturating_sub(filled);

    format!(
        "[{}{}] {:.1}%",
        "█".repeat(filled),
        "░".repeat(empty),
        clamped * 100.0
    )
}

/// Holder and location of an asset on one line, or `-` when unassigned.
#[must_use]
pub fn format_holder(asset: &asset::Model) -> String {
    let mut parts = Vec::new();
    if let Some(name) = &asset.employee_name {
        match &asset.department_name {
            Some(dept) => parts.push(format!("{name} ({dept})")),
            None => parts.push(name.clone()),
        }
    }
    let location: Vec<&str> = [&asset.floor, &asset.room_type, &asset.specific_location]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .collect();
    if !location.is_empty() {
        parts.push(location.join(" "));
    }

    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(" @ ")
    }
}

/// One-line summary of a flow record.
#[must_use]
pub fn format_flow_summary(record: &flow_record::Model) -> String {
    let mut line = format!(
        "{} | {} | {}",
        record.operation_time.format("%Y-%m-%d %H:%M"),
        record.operation_type,
        record.operator
    );
    if let Some(target) = &record.target_employee_name {
        line.push_str(&format!(" -> {target}"));
    }
    if let Some(form_no) = &record.related_form_no {
        line.push_str(&format!(" [{form_no}]"));
    }
    if let Some(description) = &record.description {
        line.push_str(&format!(" | {description}"));
    }
    line
}

/// Renders a rollup tree as indented lines.
#[must_use]
pub fn format_rollup(nodes: &[RollupNode]) -> Vec<String> {
    let mut lines = Vec::new();
    push_rollup_lines(nodes, 0, &mut lines);
    lines
}

fn push_rollup_lines(nodes: &[RollupNode], depth: usize, lines: &mut Vec<String>) {
    for node in nodes {
        lines.push(format!(
            "{}{}: {} | {} | {}",
            "  ".repeat(depth),
            node.name,
            node.count,
            format_currency(node.total_value),
            format_utilization_bar(node.utilization(), Some(8))
        ));
        push_rollup_lines(&node.children, depth + 1, lines);
    }
}
