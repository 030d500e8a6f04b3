//! Dictionary item entity - Reusable equipment template from a procurement contract.
//!
//! Dictionary items describe a purchasable equipment type (brand, model, unit, price,
//! supplier, tax rate). They pre-fill new assets and are not part of the lifecycle.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Dictionary item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "dictionary_items")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Contract the item was priced under
    pub contract_id: Option<i64>,
    /// Procurement project the contract belongs to
    pub project_name: Option<String>,
    /// Category of the equipment
    pub category_id: Option<i64>,
    /// Equipment name used as the asset's display name
    pub equipment_name: String,
    /// Brand
    pub brand: Option<String>,
    /// Model designation
    #[sea_orm(column_name = "model")]
    pub model_name: Option<String>,
    /// Unit of measure
    pub unit: Option<String>,
    /// Contract unit price (tax exclusive)
    pub price: f64,
    /// Tax rate in percent
    pub tax_rate: Option<f64>,
    /// Supplier on the contract
    pub supplier: Option<String>,
    /// Expected service life in years
    pub usage_years: Option<i32>,
    /// Accessories shipped with the equipment
    pub accessory_info: Option<String>,
    /// When the item was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between DictionaryItem and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each dictionary item optionally belongs to a category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
    /// Each dictionary item optionally comes from a procurement contract
    #[sea_orm(
        belongs_to = "super::procurement_contract::Entity",
        from = "Column::ContractId",
        to = "super::procurement_contract::Column::Id",
        on_delete = "SetNull"
    )]
    Contract,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::procurement_contract::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contract.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
