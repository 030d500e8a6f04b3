//! Shared test utilities for the asset ledger.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        asset::{self, AssetIntake},
        contract::{self, ContractDetails, ContractInput, SupplierInput},
        dictionary::{self, DictionaryItemInput},
        operation::{Assignment, Holder, Location, Operation, Operator},
    },
    entities::{self, AssetStatus, OperationKind},
    errors::Result,
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Operator used by tests.
#[must_use]
pub fn test_operator() -> Operator {
    Operator {
        name: "Test Admin".to_string(),
        id: Some("test_user".to_string()),
    }
}

/// Creates an in-stock test asset through normal intake.
///
/// # Defaults
/// * name: "Test Laptop"
/// * price: 1000.0
pub async fn create_test_asset(db: &DatabaseConnection, code: &str) -> Result<entities::AssetModel> {
    asset::create_asset(
        db,
        &test_operator(),
        AssetIntake {
            asset_code: Some(code.to_string()),
            name: "Test Laptop".to_string(),
            purchase_price: Some(1000.0),
            ..Default::default()
        },
    )
    .await
}

/// Creates a test asset with custom catalogue attributes.
pub async fn create_custom_asset(
    db: &DatabaseConnection,
    code: &str,
    category_id: Option<i64>,
    brand: Option<&str>,
    model_name: Option<&str>,
    price: f64,
) -> Result<entities::AssetModel> {
    asset::create_asset(
        db,
        &test_operator(),
        AssetIntake {
            asset_code: Some(code.to_string()),
            name: format!("Asset {code}"),
            category_id,
            brand: brand.map(str::to_string),
            model_name: model_name.map(str::to_string),
            purchase_price: Some(price),
            ..Default::default()
        },
    )
    .await
}

/// Inserts an asset row directly, bypassing intake. No flow record is written.
pub async fn insert_raw_asset(
    db: &DatabaseConnection,
    code: &str,
    status: AssetStatus,
) -> Result<entities::AssetModel> {
    let now = Utc::now();
    let model = entities::asset::ActiveModel {
        asset_code: Set(code.to_string()),
        name: Set(format!("Raw {code}")),
        status: Set(status),
        purchase_price: Set(0.0),
        is_faulty: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Appends a flow record with an explicit timestamp. Does not touch the asset.
pub async fn insert_flow_at(
    db: &DatabaseConnection,
    asset_id: i64,
    kind: OperationKind,
    at: DateTime<Utc>,
) -> Result<entities::FlowRecordModel> {
    let record = entities::flow_record::ActiveModel {
        asset_id: Set(asset_id),
        operation_type: Set(kind),
        operator: Set("Test Admin".to_string()),
        operation_time: Set(at),
        ..Default::default()
    };
    record.insert(db).await.map_err(Into::into)
}

/// Creates a test category named `name` with code `"TC"`.
pub async fn create_test_category(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::CategoryModel> {
    dictionary::create_category(db, name, "TC", None).await
}

/// Creates a test dictionary item.
///
/// # Defaults
/// * brand: "Lenovo", model: "T14", unit: "台"
/// * tax rate: 13%
/// * usage years: 4
pub async fn create_test_dictionary_item(
    db: &DatabaseConnection,
    equipment_name: &str,
    category_id: Option<i64>,
    price: f64,
) -> Result<entities::DictionaryItemModel> {
    dictionary::create_dictionary_item(
        db,
        DictionaryItemInput {
            equipment_name: equipment_name.to_string(),
            category_id,
            contract_id: None,
            project_name: Some("Test Project".to_string()),
            brand: Some("Lenovo".to_string()),
            model_name: Some("T14".to_string()),
            unit: Some("台".to_string()),
            price,
            tax_rate: Some(13.0),
            supplier: Some("Test Supplier".to_string()),
            usage_years: Some(4),
            accessory_info: None,
        },
    )
    .await
}

/// Creates a procurement contract for `project_name` with the named suppliers.
///
/// # Defaults
/// * BM number: `"BM-{project_name}"`
/// * purchase order: `"PO-{project_name}"`
pub async fn create_test_contract(
    db: &DatabaseConnection,
    project_name: &str,
    suppliers: &[&str],
) -> Result<ContractDetails> {
    contract::create_contract(
        db,
        ContractInput {
            project_name: project_name.to_string(),
            bm_number: Some(format!("BM-{project_name}")),
            procurement_order: Some(format!("PO-{project_name}")),
            suppliers: suppliers
                .iter()
                .map(|name| SupplierInput {
                    supplier_name: (*name).to_string(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        },
    )
    .await
}

/// Requisition payload for `employee` at a default desk.
pub fn requisition_to(employee: &str) -> Result<Operation> {
    Ok(Operation::Requisition(Assignment::new(
        Holder::new(employee, Some(format!("E-{employee}")), Some("R&D".to_string()))?,
        Some(Location::new("3F", "Office", "Desk 1")?),
    )))
}

/// Transfer payload for `employee` without a location.
pub fn transfer_to(employee: &str) -> Result<Operation> {
    Ok(Operation::Transfer(Assignment::new(
        Holder::new(employee, None, None)?,
        None,
    )))
}
