//! Procurement contract entity - A purchasing project and the suppliers it was awarded to.
//!
//! Contracts are the source of dictionary items: each item may point at the contract
//! it was priced under, and inherits the contract's project name and purchase order.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Procurement contract database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "procurement_contracts")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Project name, unique
    #[sea_orm(unique)]
    pub project_name: String,
    /// Date the project was run
    pub project_time: Option<Date>,
    /// Budget management (BM) number
    pub bm_number: Option<String>,
    /// Purchase order number
    pub procurement_order: Option<String>,
    /// Free-form notes
    pub description: Option<String>,
    /// When the contract was recorded
    pub created_at: DateTimeUtc,
}

/// Defines relationships between ProcurementContract and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One contract has many suppliers
    #[sea_orm(has_many = "super::contract_supplier::Entity")]
    Suppliers,
    /// One contract prices many dictionary items
    #[sea_orm(has_many = "super::dictionary_item::Entity")]
    DictionaryItems,
}

impl Related<super::contract_supplier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Suppliers.def()
    }
}

impl Related<super::dictionary_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DictionaryItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
