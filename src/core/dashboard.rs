//! Dashboard aggregations over the asset table.
//!
//! Every figure here covers live assets only: cleared (and legacy `disposed`) assets
//! have left the organisation and are excluded by [`load_live_assets`].
//!
//! Rollups group assets along category, brand and model. Each asset lands in exactly
//! one node per tree level; assets missing a dimension value are grouped under
//! [`OTHER`]. Nodes only exist for groups that contain assets.

use crate::{
    entities::{Asset, AssetStatus, Category, asset},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, prelude::*};
use std::collections::{BTreeMap, HashMap};

/// Group name for assets without a value in the rolled-up dimension.
pub const OTHER: &str = "Other";

/// Attribute an aggregation groups by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    /// Asset category name
    Category,
    /// Brand
    Brand,
    /// Model designation
    Model,
}

impl Dimension {
    fn key(self, asset: &asset::Model, category_names: &HashMap<i64, String>) -> String {
        let value = match self {
            Self::Category => asset
                .category_id
                .and_then(|id| category_names.get(&id).cloned()),
            Self::Brand => asset.brand.clone(),
            Self::Model => asset.model_name.clone(),
        };
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| OTHER.to_string())
    }
}

/// One node of a rollup tree.
#[derive(Debug, Clone, PartialEq)]
pub struct RollupNode {
    /// Dimension value
    pub name: String,
    /// Number of assets in the group
    pub count: usize,
    /// Sum of purchase prices
    pub total_value: f64,
    /// Assets currently in use
    pub in_use_count: usize,
    /// Breakdown by the next dimension, if any
    pub children: Vec<RollupNode>,
}

impl RollupNode {
    /// Share of assets in use, between 0 and 1.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn utilization(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.in_use_count as f64 / self.count as f64
    }
}

/// Builds a rollup tree from already loaded assets.
///
/// Sibling nodes are sorted by count (descending), then by name.
#[must_use]
pub fn build_rollup(
    assets: &[&asset::Model],
    category_names: &HashMap<i64, String>,
    dimensions: &[Dimension],
) -> Vec<RollupNode> {
    let Some((&dimension, rest)) = dimensions.split_first() else {
        return Vec::new();
    };

    let mut groups: HashMap<String, Vec<&asset::Model>> = HashMap::new();
    for &asset in assets {
        groups
            .entry(dimension.key(asset, category_names))
            .or_default()
            .push(asset);
    }

    let mut nodes: Vec<RollupNode> = groups
        .into_iter()
        .map(|(name, members)| RollupNode {
            name,
            count: members.len(),
            total_value: members.iter().map(|asset| asset.purchase_price).sum(),
            in_use_count: members
                .iter()
                .filter(|asset| asset.status.canonical() == AssetStatus::InUse)
                .count(),
            children: build_rollup(&members, category_names, rest),
        })
        .collect();

    nodes.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    nodes
}

async fn load_category_names(db: &DatabaseConnection) -> Result<HashMap<i64, String>> {
    Ok(Category::find()
        .all(db)
        .await?
        .into_iter()
        .map(|category| (category.id, category.name))
        .collect())
}

/// Loads every asset that has not been cleared.
pub async fn load_live_assets(db: &DatabaseConnection) -> Result<Vec<asset::Model>> {
    Asset::find()
        .filter(asset::Column::Status.is_not_in([AssetStatus::Cleared, AssetStatus::Disposed]))
        .order_by_asc(asset::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Rollup along any sequence of dimensions.
pub async fn aggregate_tree(
    db: &DatabaseConnection,
    dimensions: &[Dimension],
) -> Result<Vec<RollupNode>> {
    let assets = load_live_assets(db).await?;
    let category_names = load_category_names(db).await?;
    let refs: Vec<&asset::Model> = assets.iter().collect();
    Ok(build_rollup(&refs, &category_names, dimensions))
}

/// Rollup by a primary dimension, optionally broken down by a secondary one.
pub async fn aggregate_by_dimension(
    db: &DatabaseConnection,
    primary: Dimension,
    secondary: Option<Dimension>,
) -> Result<Vec<RollupNode>> {
    let mut dimensions = vec![primary];
    dimensions.extend(secondary.filter(|d| *d != primary));
    aggregate_tree(db, &dimensions).await
}

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
    /// Live assets
    pub total_count: usize,
    /// Sum of purchase prices
    pub total_value: f64,
    /// Assets in use
    pub in_use_count: usize,
    /// Assets in stock
    pub in_stock_count: usize,
    /// Assets flagged faulty
    pub faulty_count: usize,
    /// Asset counts per category, largest first
    pub by_category: Vec<(String, usize)>,
}

/// Computes the overview from loaded assets.
#[must_use]
pub fn compute_overview(assets: &[asset::Model], category_names: &HashMap<i64, String>) -> Overview {
    let refs: Vec<&asset::Model> = assets.iter().collect();
    let by_category = build_rollup(&refs, category_names, &[Dimension::Category])
        .into_iter()
        .map(|node| (node.name, node.count))
        .collect();

    Overview {
        total_count: assets.len(),
        total_value: assets.iter().map(|asset| asset.purchase_price).sum(),
        in_use_count: assets
            .iter()
            .filter(|asset| asset.status == AssetStatus::InUse)
            .count(),
        in_stock_count: assets
            .iter()
            .filter(|asset| asset.status == AssetStatus::InStock)
            .count(),
        faulty_count: assets.iter().filter(|asset| asset.is_faulty).count(),
        by_category,
    }
}

/// Loads live assets and computes the overview.
pub async fn overview(db: &DatabaseConnection) -> Result<Overview> {
    let assets = load_live_assets(db).await?;
    let category_names = load_category_names(db).await?;
    Ok(compute_overview(&assets, &category_names))
}

/// Whole years between a purchase date and `today`; zero for future dates.
#[must_use]
pub fn age_in_years(purchase_date: NaiveDate, today: NaiveDate) -> u32 {
    today.years_since(purchase_date).unwrap_or(0)
}

/// Assets grouped by purchase age.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LifespanBuckets {
    /// Younger than two years
    pub under_two_years: usize,
    /// Two to four years
    pub two_to_four_years: usize,
    /// Four years or older
    pub four_years_plus: usize,
    /// The assets in the oldest bucket
    pub warning_assets: Vec<asset::Model>,
}

/// Buckets assets by purchase age. Assets without a purchase date are skipped.
#[must_use]
pub fn lifespan_buckets(assets: &[asset::Model], today: NaiveDate) -> LifespanBuckets {
    let mut buckets = LifespanBuckets::default();
    for asset in assets {
        let Some(purchased) = asset.purchase_date else {
            continue;
        };
        match age_in_years(purchased, today) {
            0..2 => buckets.under_two_years += 1,
            2..4 => buckets.two_to_four_years += 1,
            _ => {
                buckets.four_years_plus += 1;
                buckets.warning_assets.push(asset.clone());
            }
        }
    }
    buckets
}

/// Assets worth reviewing for disposal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrapCandidates {
    /// Already scrapped, awaiting disposal
    pub scrapped: Vec<asset::Model>,
    /// Still in service but at least the minimum age
    pub aged: Vec<asset::Model>,
    /// Purchase value of both lists
    pub total_value: f64,
}

/// Already scrapped assets plus live assets at least `min_age_years` old.
#[must_use]
pub fn scrap_candidates(
    assets: &[asset::Model],
    today: NaiveDate,
    min_age_years: u32,
) -> ScrapCandidates {
    let mut candidates = ScrapCandidates::default();
    for asset in assets {
        match asset.status.canonical() {
            AssetStatus::Scrapped => candidates.scrapped.push(asset.clone()),
            AssetStatus::Cleared => {}
            _ => {
                if asset
                    .purchase_date
                    .is_some_and(|date| age_in_years(date, today) >= min_age_years)
                {
                    candidates.aged.push(asset.clone());
                }
            }
        }
    }
    candidates.total_value = candidates
        .scrapped
        .iter()
        .chain(&candidates.aged)
        .map(|asset| asset.purchase_price)
        .sum();
    candidates
}

/// Loads live assets and buckets them by age.
pub async fn fetch_lifespan_buckets(
    db: &DatabaseConnection,
    today: NaiveDate,
) -> Result<LifespanBuckets> {
    let assets = load_live_assets(db).await?;
    Ok(lifespan_buckets(&assets, today))
}

/// Loads live assets and lists scrap candidates.
pub async fn fetch_scrap_candidates(
    db: &DatabaseConnection,
    today: NaiveDate,
    min_age_years: u32,
) -> Result<ScrapCandidates> {
    let assets = load_live_assets(db).await?;
    Ok(scrap_candidates(&assets, today, min_age_years))
}

/// Issue progress of one purchase order.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseOrderStats {
    /// Purchase order number
    pub purchase_order: String,
    /// Project of the first asset on the order, if any
    pub project_name: Option<String>,
    /// Assets on the order
    pub count: usize,
    /// Sum of purchase prices
    pub total_amount: f64,
    /// Assets still in stock (not yet issued)
    pub in_stock_count: usize,
    /// Assets issued to a holder
    pub issued_count: usize,
}

/// Groups assets by purchase order, sorted by order number. Assets without an order
/// are skipped.
#[must_use]
pub fn purchase_order_stats(assets: &[asset::Model]) -> Vec<PurchaseOrderStats> {
    let mut orders: BTreeMap<&str, PurchaseOrderStats> = BTreeMap::new();
    for asset in assets {
        let Some(order) = asset
            .purchase_order
            .as_deref()
            .map(str::trim)
            .filter(|order| !order.is_empty())
        else {
            continue;
        };
        let stats = orders.entry(order).or_insert_with(|| PurchaseOrderStats {
            purchase_order: order.to_string(),
            project_name: None,
            count: 0,
            total_amount: 0.0,
            in_stock_count: 0,
            issued_count: 0,
        });
        if stats.project_name.is_none() {
            stats.project_name.clone_from(&asset.project_name);
        }
        stats.count += 1;
        stats.total_amount += asset.purchase_price;
        match asset.status.canonical() {
            AssetStatus::InStock => stats.in_stock_count += 1,
            AssetStatus::InUse => stats.issued_count += 1,
            _ => {}
        }
    }
    orders.into_values().collect()
}

/// Loads live assets and groups them by purchase order.
pub async fn fetch_purchase_order_stats(
    db: &DatabaseConnection,
) -> Result<Vec<PurchaseOrderStats>> {
    let assets = load_live_assets(db).await?;
    Ok(purchase_order_stats(&assets))
}

/// Stats for a single purchase order, `None` when no live asset carries it.
pub async fn fetch_purchase_order(
    db: &DatabaseConnection,
    purchase_order: &str,
) -> Result<Option<PurchaseOrderStats>> {
    let wanted = purchase_order.trim();
    let assets: Vec<asset::Model> = load_live_assets(db)
        .await?
        .into_iter()
        .filter(|asset| asset.purchase_order.as_deref().map(str::trim) == Some(wanted))
        .collect();
    Ok(purchase_order_stats(&assets).into_iter().next())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::{
        asset::{AssetIntake, create_asset},
        ledger::execute_operation,
        operation::Operation,
    };
    use crate::test_utils::*;
    use sea_orm::{ActiveModelTrait, Set};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn no_empty(nodes: &[RollupNode]) -> bool {
        nodes.iter().all(|n| n.count > 0 && no_empty(&n.children))
    }

    async fn set_purchase_date(db: &DatabaseConnection, id: i64, purchased: NaiveDate) {
        let asset = Asset::find_by_id(id).one(db).await.unwrap().unwrap();
        let mut active: asset::ActiveModel = asset.into();
        active.purchase_date = Set(Some(purchased));
        active.update(db).await.unwrap();
    }

    async fn seed_fleet(db: &DatabaseConnection) -> Result<()> {
        let computers = create_test_category(db, "Computers").await?;
        let furniture = create_test_category(db, "Furniture").await?;
        let pc = Some(computers.id);
        let a = create_custom_asset(db, "AST-001", pc, Some("Lenovo"), Some("T14"), 6000.0).await?;
        create_custom_asset(db, "AST-002", pc, Some("Lenovo"), Some("X1"), 9000.0).await?;
        let c = create_custom_asset(db, "AST-003", pc, Some("Dell"), None, 5000.0).await?;
        create_custom_asset(db, "AST-004", Some(furniture.id), None, None, 800.0).await?;
        create_custom_asset(db, "AST-005", None, Some("Dell"), Some("U27"), 2000.0).await?;
        let holder = requisition_to("张三")?;
        execute_operation(db, &test_operator(), &[a.id, c.id], &holder, None).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_aggregate_by_category_and_brand() -> Result<()> {
        let db = setup_test_db().await?;
        seed_fleet(&db).await?;

        let tree =
            aggregate_by_dimension(&db, Dimension::Category, Some(Dimension::Brand)).await?;
        let names: Vec<&str> = tree.iter().map(|node| node.name.as_str()).collect();
        assert_eq!(names, vec!["Computers", "Furniture", "Other"]);

        let computers = &tree[0];
        assert_eq!(computers.count, 3);
        assert_eq!(computers.total_value, 20000.0);
        assert_eq!(computers.in_use_count, 2);
        assert!((computers.utilization() - 2.0 / 3.0).abs() < 1e-9);

        let brands: Vec<(&str, usize)> = computers
            .children
            .iter()
            .map(|node| (node.name.as_str(), node.count))
            .collect();
        assert_eq!(brands, vec![("Lenovo", 2), ("Dell", 1)]);
        assert!(computers.children.iter().all(|node| node.children.is_empty()));

        let furniture = &tree[1];
        assert_eq!(furniture.children[0].name, OTHER);
        assert_eq!(furniture.utilization(), 0.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_every_level_counts_each_asset_once() -> Result<()> {
        let db = setup_test_db().await?;
        seed_fleet(&db).await?;

        let tree = aggregate_tree(&db, &[Dimension::Category, Dimension::Brand, Dimension::Model])
            .await?;
        let top: usize = tree.iter().map(|node| node.count).sum();
        let second: usize = tree
            .iter()
            .flat_map(|node| &node.children)
            .map(|node| node.count)
            .sum();
        let third: usize = tree
            .iter()
            .flat_map(|node| &node.children)
            .flat_map(|node| &node.children)
            .map(|node| node.count)
            .sum();
        assert_eq!((top, second, third), (5, 5, 5));
        assert!(no_empty(&tree));
        Ok(())
    }

    #[tokio::test]
    async fn test_same_dimension_twice_is_flat() -> Result<()> {
        let db = setup_test_db().await?;
        seed_fleet(&db).await?;
        let tree = aggregate_by_dimension(&db, Dimension::Brand, Some(Dimension::Brand)).await?;
        assert!(tree.iter().all(|node| node.children.is_empty()));
        assert_eq!(tree[0].name, "Dell");
        assert_eq!(tree[0].count, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_ledger_has_no_nodes() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(aggregate_by_dimension(&db, Dimension::Model, None).await?.is_empty());
        let summary = overview(&db).await?;
        assert_eq!(summary.total_count, 0);
        assert!(summary.by_category.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_overview() -> Result<()> {
        let db = setup_test_db().await?;
        seed_fleet(&db).await?;
        let summary = overview(&db).await?;
        assert_eq!(summary.total_count, 5);
        assert_eq!(summary.total_value, 22800.0);
        assert_eq!(summary.in_use_count, 2);
        assert_eq!(summary.in_stock_count, 3);
        assert_eq!(summary.faulty_count, 0);
        assert_eq!(summary.by_category[0], ("Computers".to_string(), 3));
        Ok(())
    }

    #[tokio::test]
    async fn test_lifespan_and_scrap_candidates() -> Result<()> {
        let db = setup_test_db().await?;
        let today = date(2025, 6, 1);
        let young = create_test_asset(&db, "AST-001").await?;
        let middle = create_test_asset(&db, "AST-002").await?;
        let old = create_test_asset(&db, "AST-003").await?;
        let scrapped = create_test_asset(&db, "AST-004").await?;
        create_test_asset(&db, "AST-005").await?;

        set_purchase_date(&db, young.id, date(2024, 6, 2)).await;
        set_purchase_date(&db, middle.id, date(2022, 6, 1)).await;
        set_purchase_date(&db, old.id, date(2021, 6, 1)).await;
        set_purchase_date(&db, scrapped.id, date(2024, 1, 1)).await;
        execute_operation(&db, &test_operator(), &[scrapped.id], &Operation::Scrap, None).await?;

        let buckets = fetch_lifespan_buckets(&db, today).await?;
        assert_eq!(buckets.under_two_years, 2);
        assert_eq!(buckets.two_to_four_years, 1);
        assert_eq!(buckets.four_years_plus, 1);
        assert_eq!(buckets.warning_assets[0].asset_code, "AST-003");

        let candidates = fetch_scrap_candidates(&db, today, 4).await?;
        assert_eq!(candidates.scrapped.len(), 1);
        assert_eq!(candidates.aged.len(), 1);
        assert_eq!(candidates.aged[0].asset_code, "AST-003");
        assert_eq!(candidates.total_value, 2000.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_cleared_assets_are_excluded() -> Result<()> {
        let db = setup_test_db().await?;
        seed_fleet(&db).await?;
        let computers = Category::find()
            .filter(crate::entities::category::Column::Name.eq("Computers"))
            .one(&db)
            .await?
            .unwrap();

        let cleared = create_custom_asset(
            &db,
            "AST-006",
            Some(computers.id),
            Some("Lenovo"),
            Some("T14"),
            7000.0,
        )
        .await?;
        execute_operation(&db, &test_operator(), &[cleared.id], &Operation::Scrap, None).await?;
        execute_operation(&db, &test_operator(), &[cleared.id], &Operation::Dispose, None).await?;
        let legacy = insert_raw_asset(&db, "AST-007", AssetStatus::Disposed).await?;
        set_purchase_date(&db, cleared.id, date(2015, 1, 1)).await;
        set_purchase_date(&db, legacy.id, date(2015, 1, 1)).await;

        let live = load_live_assets(&db).await?;
        assert_eq!(live.len(), 5);
        assert!(live.iter().all(|asset| asset.status.canonical() != AssetStatus::Cleared));

        let tree = aggregate_by_dimension(&db, Dimension::Category, None).await?;
        assert_eq!(tree[0].name, "Computers");
        assert_eq!(tree[0].count, 3);
        assert_eq!(tree[0].total_value, 20000.0);
        assert_eq!(tree.iter().map(|node| node.count).sum::<usize>(), 5);

        let summary = overview(&db).await?;
        assert_eq!(summary.total_count, 5);
        assert_eq!(summary.total_value, 22800.0);

        let buckets = fetch_lifespan_buckets(&db, date(2025, 6, 1)).await?;
        assert_eq!(buckets.four_years_plus, 0);
        let candidates = fetch_scrap_candidates(&db, date(2025, 6, 1), 4).await?;
        assert!(candidates.aged.is_empty());
        assert!(candidates.scrapped.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_purchase_order_stats() -> Result<()> {
        let db = setup_test_db().await?;
        let operator = test_operator();
        let mut ids = Vec::new();
        for (code, order, price) in [
            ("AST-001", Some("PO-2"), 1000.0),
            ("AST-002", Some("PO-1"), 2000.0),
            ("AST-003", Some("PO-1"), 3000.0),
            ("AST-004", Some("PO-1"), 500.0),
            ("AST-005", None, 9000.0),
        ] {
            let asset = create_asset(
                &db,
                &operator,
                AssetIntake {
                    asset_code: Some(code.to_string()),
                    name: format!("Asset {code}"),
                    project_name: Some("Fitout".to_string()),
                    purchase_order: order.map(str::to_string),
                    purchase_price: Some(price),
                    ..Default::default()
                },
            )
            .await?;
            ids.push(asset.id);
        }
        execute_operation(&db, &operator, &[ids[1]], &requisition_to("李四")?, None).await?;
        execute_operation(&db, &operator, &[ids[3]], &Operation::Scrap, None).await?;
        execute_operation(&db, &operator, &[ids[3]], &Operation::Dispose, None).await?;

        let stats = fetch_purchase_order_stats(&db).await?;
        let orders: Vec<&str> = stats.iter().map(|s| s.purchase_order.as_str()).collect();
        assert_eq!(orders, vec!["PO-1", "PO-2"]);

        let po1 = &stats[0];
        assert_eq!(po1.count, 2);
        assert_eq!(po1.total_amount, 5000.0);
        assert_eq!(po1.in_stock_count, 1);
        assert_eq!(po1.issued_count, 1);
        assert_eq!(po1.project_name.as_deref(), Some("Fitout"));

        let single = fetch_purchase_order(&db, " PO-2 ").await?.unwrap();
        assert_eq!(single.count, 1);
        assert_eq!(single.in_stock_count, 1);
        assert!(fetch_purchase_order(&db, "PO-9").await?.is_none());
        Ok(())
    }

    #[test]
    fn test_age_in_years() {
        assert_eq!(age_in_years(date(2021, 6, 2), date(2025, 6, 1)), 3);
        assert_eq!(age_in_years(date(2021, 6, 1), date(2025, 6, 1)), 4);
        assert_eq!(age_in_years(date(2026, 1, 1), date(2025, 6, 1)), 0);
    }
}
