//! Contract supplier entity - One supplier awarded part of a procurement contract.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Contract supplier database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contract_suppliers")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Contract the supplier belongs to
    pub contract_id: i64,
    /// Supplier name, unique within the contract
    pub supplier_name: String,
    /// Contact at the supplier
    pub contact_person: Option<String>,
    /// Contact phone number
    pub contact_phone: Option<String>,
    /// Notes
    pub remarks: Option<String>,
}

/// Defines relationships between ContractSupplier and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Suppliers go away with their contract
    #[sea_orm(
        belongs_to = "super::procurement_contract::Entity",
        from = "Column::ContractId",
        to = "super::procurement_contract::Column::Id",
        on_delete = "Cascade"
    )]
    Contract,
}

impl Related<super::procurement_contract::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contract.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
