//! Autocomplete handlers for Discord slash command parameters.
//!
//! Suggestions are capped at 25 entries, the Discord limit.

use crate::{
    bot::{Context, split_last_code},
    core::{
        asset::{AssetFilter, list_assets},
        dashboard, dictionary,
    },
};

/// Suggests asset codes containing the partial input.
///
/// For lists (separated the same way `parse_codes` splits them) only the last entry
/// is completed; earlier entries are kept as typed.
pub async fn autocomplete_asset_code(ctx: Context<'_>, partial: &str) -> Vec<String> {
    let db = &ctx.data().database;

    let (prefix, current) = split_last_code(partial);
    let current = current.trim();
    let prefix = if prefix.is_empty() || prefix.ends_with(char::is_whitespace) {
        prefix.to_string()
    } else {
        format!("{prefix} ")
    };

    let filter = AssetFilter {
        code_contains: Some(current.to_uppercase()).filter(|c| !c.is_empty()),
        ..Default::default()
    };
    let Ok(assets) = list_assets(db, &filter).await else {
        return Vec::new();
    };

    assets
        .into_iter()
        .map(|asset| format!("{prefix}{}", asset.asset_code))
        .take(25)
        .collect()
}

/// Suggests category names containing the partial input.
pub async fn autocomplete_category_name(ctx: Context<'_>, partial: &str) -> Vec<String> {
    let db = &ctx.data().database;

    let Ok(categories) = dictionary::get_all_categories(db).await else {
        return Vec::new();
    };

    let partial_lower = partial.to_lowercase();
    categories
        .into_iter()
        .filter(|category| category.name.to_lowercase().contains(&partial_lower))
        .map(|category| category.name)
        .take(25)
        .collect()
}

/// Suggests contract and dictionary project names containing the partial input.
pub async fn autocomplete_project_name(ctx: Context<'_>, partial: &str) -> Vec<String> {
    let db = &ctx.data().database;

    let Ok(projects) = dictionary::list_project_names(db).await else {
        return Vec::new();
    };

    let partial_lower = partial.to_lowercase();
    projects
        .into_iter()
        .filter(|project| project.to_lowercase().contains(&partial_lower))
        .take(25)
        .collect()
}

/// Suggests purchase orders containing the partial input.
pub async fn autocomplete_purchase_order(ctx: Context<'_>, partial: &str) -> Vec<String> {
    let db = &ctx.data().database;

    let Ok(orders) = dashboard::fetch_purchase_order_stats(db).await else {
        return Vec::new();
    };

    let partial_lower = partial.to_lowercase();
    orders
        .into_iter()
        .map(|order| order.purchase_order)
        .filter(|order| order.to_lowercase().contains(&partial_lower))
        .take(25)
        .collect()
}
