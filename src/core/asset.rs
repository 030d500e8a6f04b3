//! Asset business logic - intake, lookups and non-lifecycle edits.
//!
//! New assets enter the ledger through [`create_asset`] (or
//! [`create_asset_from_dictionary`]), which inserts the row in `in_stock` and appends
//! its `inbound` flow record in the same transaction. Everything here leaves the
//! lifecycle fields alone; status and holder changes go through `core::ledger`.

use crate::{
    core::{contract, dictionary, operation::Operator},
    entities::{Asset, AssetStatus, FlowRecord, OperationKind, asset, flow_record},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{Condition, QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument, warn};

const INBOUND_DESCRIPTION: &str = "Asset created and inbound to stock";

/// Attributes supplied when registering a new asset.
///
/// Only `name` is required; a code is generated when `asset_code` is `None`.
#[derive(Debug, Clone, Default)]
pub struct AssetIntake {
    /// Explicit asset code; generated when absent
    pub asset_code: Option<String>,
    /// Display name
    pub name: String,
    /// Category id
    pub category_id: Option<i64>,
    /// Brand
    pub brand: Option<String>,
    /// Model designation
    pub model_name: Option<String>,
    /// Unit of measure
    pub unit: Option<String>,
    /// Serial number
    pub serial_number: Option<String>,
    /// Supplier
    pub supplier: Option<String>,
    /// Procurement project
    pub project_name: Option<String>,
    /// Purchase order number
    pub purchase_order: Option<String>,
    /// Purchase price; `None` means "take it from the dictionary item" or zero
    pub purchase_price: Option<f64>,
    /// Tax rate in percent
    pub tax_rate: Option<f64>,
    /// Purchase date
    pub purchase_date: Option<NaiveDate>,
    /// Accounting date
    pub accounting_date: Option<NaiveDate>,
    /// Arrival date
    pub arrival_date: Option<NaiveDate>,
    /// Free-text description
    pub description: Option<String>,
}

/// Editable, non-lifecycle attributes. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct AssetDetailsUpdate {
    /// New display name
    pub name: Option<String>,
    /// New category
    pub category_id: Option<i64>,
    /// New brand
    pub brand: Option<String>,
    /// New model designation
    pub model_name: Option<String>,
    /// New serial number
    pub serial_number: Option<String>,
    /// New purchase price
    pub purchase_price: Option<f64>,
    /// New description
    pub description: Option<String>,
}

/// Filters for [`list_assets`]. Text filters are case-sensitive substring matches.
#[derive(Debug, Clone, Default)]
pub struct AssetFilter {
    /// Substring of the asset code
    pub code_contains: Option<String>,
    /// Substring of the name
    pub name_contains: Option<String>,
    /// Exact status
    pub status: Option<AssetStatus>,
    /// Exact category
    pub category_id: Option<i64>,
    /// Fault flag
    pub is_faulty: Option<bool>,
}

/// Generates an asset code from the current time, e.g. `AST-482913`.
#[must_use]
pub fn generate_asset_code() -> String {
    let millis = Utc::now().timestamp_millis();
    format!("AST-{:06}", millis.rem_euclid(1_000_000))
}

/// Registers a new asset in `in_stock` and appends its `inbound` flow record.
///
/// # Errors
/// - `Error::MissingField` if the name is empty
/// - `Error::InvalidAmount` if the price or tax rate is negative or not finite
/// - `Error::DuplicateAssetCode` if the code is taken
/// - `Error::CategoryNotFound` if the category does not exist
#[instrument(skip(db, intake), fields(name = %intake.name))]
pub async fn create_asset(
    db: &DatabaseConnection,
    operator: &Operator,
    intake: AssetIntake,
) -> Result<asset::Model> {
    insert_with_inbound(db, operator, intake, None).await
}

/// Registers a new asset pre-filled from a dictionary item.
///
/// Category, brand, model, unit, price, tax rate, supplier, project and description
/// (the item's accessory info) are copied from the item, and the purchase order from
/// the item's contract; any value set in `intake` wins. An empty intake name takes the
/// item's equipment name.
#[instrument(skip(db, intake))]
pub async fn create_asset_from_dictionary(
    db: &DatabaseConnection,
    operator: &Operator,
    dictionary_item_id: i64,
    intake: AssetIntake,
) -> Result<asset::Model> {
    let item = dictionary::get_dictionary_item_by_id(db, dictionary_item_id)
        .await?
        .ok_or(Error::DictionaryItemNotFound {
            id: dictionary_item_id,
        })?;
    let contract_order = match item.contract_id {
        Some(contract_id) => contract::get_contract_by_id(db, contract_id)
            .await?
            .and_then(|contract| contract.procurement_order),
        None => None,
    };

    let intake = AssetIntake {
        name: if intake.name.trim().is_empty() {
            item.equipment_name
        } else {
            intake.name
        },
        category_id: intake.category_id.or(item.category_id),
        brand: intake.brand.or(item.brand),
        model_name: intake.model_name.or(item.model_name),
        unit: intake.unit.or(item.unit),
        supplier: intake.supplier.or(item.supplier),
        project_name: intake.project_name.or(item.project_name),
        purchase_order: intake.purchase_order.or(contract_order),
        purchase_price: intake.purchase_price.or(Some(item.price)),
        tax_rate: intake.tax_rate.or(item.tax_rate),
        description: intake.description.or(item.accessory_info),
        ..intake
    };

    insert_with_inbound(db, operator, intake, Some(dictionary_item_id)).await
}

async fn insert_with_inbound(
    db: &DatabaseConnection,
    operator: &Operator,
    intake: AssetIntake,
    dictionary_item_id: Option<i64>,
) -> Result<asset::Model> {
    let name = intake.name.trim().to_string();
    if name.is_empty() {
        return Err(Error::MissingField { field: "name" });
    }

    let purchase_price = intake.purchase_price.unwrap_or(0.0);
    if !purchase_price.is_finite() || purchase_price < 0.0 {
        return Err(Error::InvalidAmount {
            amount: purchase_price,
        });
    }
    if let Some(rate) = intake.tax_rate.filter(|r| !r.is_finite() || *r < 0.0) {
        return Err(Error::InvalidAmount { amount: rate });
    }

    let asset_code = intake
        .asset_code
        .map(|code| code.trim().to_string())
        .filter(|code| !code.is_empty())
        .unwrap_or_else(generate_asset_code);

    let txn = db.begin().await?;

    let existing = Asset::find()
        .filter(asset::Column::AssetCode.eq(asset_code.as_str()))
        .one(&txn)
        .await?;
    if existing.is_some() {
        return Err(Error::DuplicateAssetCode { code: asset_code });
    }

    if let Some(category_id) = intake.category_id {
        crate::entities::Category::find_by_id(category_id)
            .one(&txn)
            .await?
            .ok_or_else(|| Error::CategoryNotFound {
                reference: category_id.to_string(),
            })?;
    }

    let now = Utc::now();
    let model = asset::ActiveModel {
        asset_code: Set(asset_code),
        name: Set(name),
        category_id: Set(intake.category_id),
        dictionary_item_id: Set(dictionary_item_id),
        brand: Set(intake.brand),
        model_name: Set(intake.model_name),
        unit: Set(intake.unit),
        serial_number: Set(intake.serial_number),
        supplier: Set(intake.supplier),
        project_name: Set(intake.project_name),
        purchase_order: Set(intake.purchase_order),
        status: Set(AssetStatus::InStock),
        employee_name: Set(None),
        employee_code: Set(None),
        department_name: Set(None),
        floor: Set(None),
        room_type: Set(None),
        specific_location: Set(None),
        purchase_price: Set(purchase_price),
        tax_rate: Set(intake.tax_rate),
        purchase_date: Set(intake.purchase_date),
        accounting_date: Set(intake.accounting_date),
        arrival_date: Set(intake.arrival_date),
        is_faulty: Set(false),
        description: Set(intake.description),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let created = model.insert(&txn).await?;

    let inbound = flow_record::ActiveModel {
        asset_id: Set(created.id),
        operation_type: Set(OperationKind::Inbound),
        operator: Set(operator.name.clone()),
        operator_id: Set(operator.id.clone()),
        operation_time: Set(now),
        description: Set(Some(INBOUND_DESCRIPTION.to_string())),
        ..Default::default()
    };
    inbound.insert(&txn).await?;

    txn.commit().await?;

    info!(
        "Registered asset {} ({}) by {}",
        created.asset_code, created.id, operator.name
    );
    Ok(created)
}

/// Finds an asset by its id.
pub async fn get_asset_by_id<C>(db: &C, asset_id: i64) -> Result<Option<asset::Model>>
where
    C: ConnectionTrait,
{
    Asset::find_by_id(asset_id).one(db).await.map_err(Into::into)
}

/// Finds an asset by its code.
pub async fn get_asset_by_code<C>(db: &C, asset_code: &str) -> Result<Option<asset::Model>>
where
    C: ConnectionTrait,
{
    Asset::find()
        .filter(asset::Column::AssetCode.eq(asset_code.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Resolves asset codes to ids, preserving order. Unknown codes are returned separately.
pub async fn resolve_asset_codes(
    db: &DatabaseConnection,
    codes: &[String],
) -> Result<(Vec<i64>, Vec<String>)> {
    let trimmed: Vec<String> = codes
        .iter()
        .map(|code| code.trim().to_string())
        .filter(|code| !code.is_empty())
        .collect();

    let found = Asset::find()
        .filter(asset::Column::AssetCode.is_in(trimmed.iter().cloned()))
        .all(db)
        .await?;

    let mut ids = Vec::with_capacity(trimmed.len());
    let mut missing = Vec::new();
    for code in trimmed {
        match found.iter().find(|asset| asset.asset_code == code) {
            Some(asset) => ids.push(asset.id),
            None => missing.push(code),
        }
    }
    Ok((ids, missing))
}

/// Lists assets matching a filter, ordered by code.
pub async fn list_assets(db: &DatabaseConnection, filter: &AssetFilter) -> Result<Vec<asset::Model>> {
    let mut condition = Condition::all();
    if let Some(code) = filter.code_contains.as_deref() {
        condition = condition.add(asset::Column::AssetCode.contains(code));
    }
    if let Some(name) = filter.name_contains.as_deref() {
        condition = condition.add(asset::Column::Name.contains(name));
    }
    if let Some(status) = filter.status {
        condition = condition.add(asset::Column::Status.eq(status));
    }
    if let Some(category_id) = filter.category_id {
        condition = condition.add(asset::Column::CategoryId.eq(category_id));
    }
    if let Some(is_faulty) = filter.is_faulty {
        condition = condition.add(asset::Column::IsFaulty.eq(is_faulty));
    }

    Asset::find()
        .filter(condition)
        .order_by_asc(asset::Column::AssetCode)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Updates catalogue attributes of an asset. Lifecycle fields are never touched here.
pub async fn update_asset_details(
    db: &DatabaseConnection,
    asset_id: i64,
    update: AssetDetailsUpdate,
) -> Result<asset::Model> {
    let asset = get_asset_by_id(db, asset_id)
        .await?
        .ok_or_else(|| Error::AssetNotFound {
            reference: asset_id.to_string(),
        })?;

    let mut active: asset::ActiveModel = asset.into();

    if let Some(name) = update.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(Error::MissingField { field: "name" });
        }
        active.name = Set(name);
    }
    if let Some(price) = update.purchase_price {
        if !price.is_finite() || price < 0.0 {
            return Err(Error::InvalidAmount { amount: price });
        }
        active.purchase_price = Set(price);
    }
    if let Some(category_id) = update.category_id {
        active.category_id = Set(Some(category_id));
    }
    if let Some(brand) = update.brand {
        active.brand = Set(Some(brand));
    }
    if let Some(model_name) = update.model_name {
        active.model_name = Set(Some(model_name));
    }
    if let Some(serial_number) = update.serial_number {
        active.serial_number = Set(Some(serial_number));
    }
    if let Some(description) = update.description {
        active.description = Set(Some(description));
    }
    active.updated_at = Set(Utc::now());

    active.update(db).await.map_err(Into::into)
}

/// Sets or clears the fault flag. Faulty assets are excluded from requisition and borrow.
#[instrument(skip(db))]
pub async fn set_faulty(db: &DatabaseConnection, asset_id: i64, is_faulty: bool) -> Result<asset::Model> {
    let asset = get_asset_by_id(db, asset_id)
        .await?
        .ok_or_else(|| Error::AssetNotFound {
            reference: asset_id.to_string(),
        })?;

    let mut active: asset::ActiveModel = asset.into();
    active.is_faulty = Set(is_faulty);
    active.updated_at = Set(Utc::now());
    let updated = active.update(db).await?;

    info!("Asset {} fault flag set to {}", updated.asset_code, is_faulty);
    Ok(updated)
}

/// Administrative delete. Removes the asset together with its flow records in one
/// transaction. No ledger entry survives the deletion.
#[instrument(skip(db))]
pub async fn delete_asset(db: &DatabaseConnection, asset_id: i64) -> Result<()> {
    let asset = get_asset_by_id(db, asset_id)
        .await?
        .ok_or_else(|| Error::AssetNotFound {
            reference: asset_id.to_string(),
        })?;

    let code = asset.asset_code.clone();
    let txn = db.begin().await?;
    let removed = FlowRecord::delete_many()
        .filter(flow_record::Column::AssetId.eq(asset_id))
        .exec(&txn)
        .await?
        .rows_affected;
    asset.delete(&txn).await?;
    txn.commit().await?;

    warn!("Asset {code} deleted administratively with {removed} flow records");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::ledger;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_asset_writes_inbound_record() -> Result<()> {
        let db = setup_test_db().await?;
        let operator = test_operator();

        let asset = create_asset(
            &db,
            &operator,
            AssetIntake {
                asset_code: Some("AST-001".to_string()),
                name: "ThinkPad T14".to_string(),
                purchase_price: Some(6999.0),
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(asset.asset_code, "AST-001");
        assert_eq!(asset.status, AssetStatus::InStock);
        assert_eq!(asset.purchase_price, 6999.0);
        assert!(asset.employee_name.is_none());
        assert!(!asset.is_faulty);

        let history = ledger::get_flow_history(&db, asset.id).await?;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].operation_type, OperationKind::Inbound);
        assert_eq!(history[0].operator, operator.name);
        assert_eq!(history[0].description.as_deref(), Some(INBOUND_DESCRIPTION));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_asset_generates_code() -> Result<()> {
        let db = setup_test_db().await?;
        let asset = create_asset(
            &db,
            &test_operator(),
            AssetIntake {
                name: "Office chair".to_string(),
                ..Default::default()
            },
        )
        .await?;

        assert!(asset.asset_code.starts_with("AST-"));
        assert_eq!(asset.asset_code.len(), 10);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_asset_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let operator = test_operator();

        let result = create_asset(&db, &operator, AssetIntake::default()).await;
        assert!(matches!(result, Err(Error::MissingField { field: "name" })));

        let result = create_asset(
            &db,
            &operator,
            AssetIntake {
                name: "Desk".to_string(),
                purchase_price: Some(-1.0),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));

        let result = create_asset(
            &db,
            &operator,
            AssetIntake {
                name: "Desk".to_string(),
                purchase_price: Some(f64::NAN),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));

        let result = create_asset(
            &db,
            &operator,
            AssetIntake {
                name: "Desk".to_string(),
                category_id: Some(999),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::CategoryNotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_asset_rejects_bad_tax_rate() -> Result<()> {
        let db = setup_test_db().await?;
        let operator = test_operator();

        for rate in [-13.0, f64::NAN, f64::INFINITY] {
            let result = create_asset(
                &db,
                &operator,
                AssetIntake {
                    name: "Desk".to_string(),
                    tax_rate: Some(rate),
                    ..Default::default()
                },
            )
            .await;
            assert!(matches!(result, Err(Error::InvalidAmount { .. })));
        }

        let item = create_test_dictionary_item(&db, "Laptop", None, 5000.0).await?;
        let result = create_asset_from_dictionary(
            &db,
            &operator,
            item.id,
            AssetIntake {
                tax_rate: Some(-1.0),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));

        assert!(list_assets(&db, &AssetFilter::default()).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_asset_code_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_asset(&db, "AST-001").await?;

        let result = create_asset(
            &db,
            &test_operator(),
            AssetIntake {
                asset_code: Some("AST-001".to_string()),
                name: "Another".to_string(),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::DuplicateAssetCode { code }) if code == "AST-001"));

        let all = list_assets(&db, &AssetFilter::default()).await?;
        assert_eq!(all.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_asset_from_dictionary_prefills() -> Result<()> {
        let db = setup_test_db().await?;
        let category = create_test_category(&db, "Computers").await?;
        let item = create_test_dictionary_item(&db, "Laptop", Some(category.id), 5000.0).await?;

        let asset = create_asset_from_dictionary(
            &db,
            &test_operator(),
            item.id,
            AssetIntake {
                asset_code: Some("AST-100".to_string()),
                brand: Some("Dell".to_string()),
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(asset.name, "Laptop");
        assert_eq!(asset.category_id, Some(category.id));
        assert_eq!(asset.dictionary_item_id, Some(item.id));
        assert_eq!(asset.purchase_price, 5000.0);
        assert_eq!(asset.tax_rate, Some(13.0));
        assert_eq!(asset.brand.as_deref(), Some("Dell"));
        assert_eq!(asset.model_name.as_deref(), Some("T14"));
        assert_eq!(asset.unit.as_deref(), Some("台"));

        let missing =
            create_asset_from_dictionary(&db, &test_operator(), 999, AssetIntake::default()).await;
        assert!(matches!(missing, Err(Error::DictionaryItemNotFound { id: 999 })));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_asset_from_dictionary_takes_contract_order() -> Result<()> {
        let db = setup_test_db().await?;
        let details = create_test_contract(&db, "Fitout", &["Acme"]).await?;
        let item = dictionary::create_dictionary_item(
            &db,
            dictionary::DictionaryItemInput {
                equipment_name: "Desk".to_string(),
                contract_id: Some(details.contract.id),
                price: 900.0,
                ..Default::default()
            },
        )
        .await?;

        let asset =
            create_asset_from_dictionary(&db, &test_operator(), item.id, AssetIntake::default())
                .await?;
        assert_eq!(asset.purchase_order.as_deref(), Some("PO-Fitout"));
        assert_eq!(asset.project_name.as_deref(), Some("Fitout"));
        assert_eq!(asset.supplier.as_deref(), Some("Acme"));

        let overridden = create_asset_from_dictionary(
            &db,
            &test_operator(),
            item.id,
            AssetIntake {
                purchase_order: Some("PO-manual".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(overridden.purchase_order.as_deref(), Some("PO-manual"));
        Ok(())
    }

    #[tokio::test]
    async fn test_lookups_and_resolve_codes() -> Result<()> {
        let db = setup_test_db().await?;
        let first = create_test_asset(&db, "AST-001").await?;
        let second = create_test_asset(&db, "AST-002").await?;

        assert_eq!(get_asset_by_code(&db, " AST-002 ").await?, Some(second.clone()));
        assert_eq!(get_asset_by_id(&db, first.id).await?, Some(first.clone()));
        assert!(get_asset_by_code(&db, "AST-404").await?.is_none());

        let (ids, missing) = resolve_asset_codes(
            &db,
            &[
                "AST-002".to_string(),
                "AST-404".to_string(),
                "AST-001".to_string(),
            ],
        )
        .await?;
        assert_eq!(ids, vec![second.id, first.id]);
        assert_eq!(missing, vec!["AST-404".to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_assets_filters() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_test_asset(&db, "AST-001").await?;
        create_test_asset(&db, "BLD-002").await?;
        set_faulty(&db, a.id, true).await?;

        let by_code = list_assets(
            &db,
            &AssetFilter {
                code_contains: Some("AST".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(by_code.len(), 1);

        let faulty = list_assets(
            &db,
            &AssetFilter {
                is_faulty: Some(true),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(faulty.len(), 1);
        assert_eq!(faulty[0].asset_code, "AST-001");

        let in_use = list_assets(
            &db,
            &AssetFilter {
                status: Some(AssetStatus::InUse),
                ..Default::default()
            },
        )
        .await?;
        assert!(in_use.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_asset_details_leaves_lifecycle_alone() -> Result<()> {
        let db = setup_test_db().await?;
        let asset = create_test_asset(&db, "AST-001").await?;

        let updated = update_asset_details(
            &db,
            asset.id,
            AssetDetailsUpdate {
                name: Some("Renamed".to_string()),
                purchase_price: Some(120.5),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.purchase_price, 120.5);
        assert_eq!(updated.status, AssetStatus::InStock);

        let bad = update_asset_details(
            &db,
            asset.id,
            AssetDetailsUpdate {
                purchase_price: Some(-5.0),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(bad, Err(Error::InvalidAmount { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_asset_removes_history() -> Result<()> {
        let db = setup_test_db().await?;
        let asset = create_test_asset(&db, "AST-001").await?;

        delete_asset(&db, asset.id).await?;
        assert!(get_asset_by_id(&db, asset.id).await?.is_none());
        assert!(ledger::get_flow_history(&db, asset.id).await?.is_empty());

        let missing = delete_asset(&db, asset.id).await;
        assert!(matches!(missing, Err(Error::AssetNotFound { .. })));
        Ok(())
    }
}
