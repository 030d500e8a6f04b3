//! Asset entity - One physical, individually tracked item.
//!
//! Holds the asset's catalogue attributes and its current lifecycle state: `status`,
//! the current holder (`employee_name`, `employee_code`, `department_name`) and the
//! current location triple (`floor`, `room_type`, `specific_location`). Lifecycle
//! fields are only written by the ledger in `core::ledger`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Asset database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "assets")]
pub struct Model {
    /// Unique identifier for the asset
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable asset code (e.g., "AST-001")
    #[sea_orm(unique)]
    pub asset_code: String,
    /// Display name
    pub name: String,
    /// Category this asset belongs to
    pub category_id: Option<i64>,
    /// Dictionary item the asset was drawn from, if any
    pub dictionary_item_id: Option<i64>,
    /// Brand name
    pub brand: Option<String>,
    /// Model designation
    #[sea_orm(column_name = "model")]
    pub model_name: Option<String>,
    /// Unit of measure (e.g., "台")
    pub unit: Option<String>,
    /// Manufacturer serial number
    pub serial_number: Option<String>,
    /// Supplier the asset was procured from
    pub supplier: Option<String>,
    /// Procurement project name
    pub project_name: Option<String>,
    /// Purchase order number
    pub purchase_order: Option<String>,
    /// Current lifecycle status
    pub status: AssetStatus,
    /// Current holder name, set only while `in_use`
    pub employee_name: Option<String>,
    /// Current holder employee code
    pub employee_code: Option<String>,
    /// Current holder department
    pub department_name: Option<String>,
    /// Current floor
    pub floor: Option<String>,
    /// Current room type
    pub room_type: Option<String>,
    /// Current specific location within the room
    pub specific_location: Option<String>,
    /// Purchase price (tax exclusive)
    pub purchase_price: f64,
    /// Tax rate in percent
    pub tax_rate: Option<f64>,
    /// Date of purchase
    pub purchase_date: Option<Date>,
    /// Date the asset entered the accounts
    pub accounting_date: Option<Date>,
    /// Date the asset physically arrived
    pub arrival_date: Option<Date>,
    /// Faulty assets cannot be requisitioned or borrowed
    pub is_faulty: bool,
    /// Free-text description
    pub description: Option<String>,
    /// When the asset was registered
    pub created_at: DateTimeUtc,
    /// When the asset row was last modified
    pub updated_at: DateTimeUtc,
}

/// Lifecycle status of an asset.
///
/// `Disposed` only exists for rows written by older tooling; it is treated as
/// `Cleared` everywhere and never written by the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    /// In the warehouse, available
    #[sea_orm(string_value = "in_stock")]
    InStock,
    /// Held by an employee
    #[sea_orm(string_value = "in_use")]
    InUse,
    /// Under repair
    #[sea_orm(string_value = "maintenance")]
    Maintenance,
    /// Written off, awaiting disposal
    #[sea_orm(string_value = "scrapped")]
    Scrapped,
    /// Physically removed (terminal)
    #[sea_orm(string_value = "cleared")]
    Cleared,
    /// Legacy spelling of `Cleared`
    #[sea_orm(string_value = "disposed")]
    Disposed,
}

impl AssetStatus {
    /// Collapses the legacy `Disposed` alias into `Cleared`.
    #[must_use]
    pub const fn canonical(self) -> Self {
        match self {
            Self::Disposed => Self::Cleared,
            other => other,
        }
    }

    /// Stable snake_case name, as stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InStock => "in_stock",
            Self::InUse => "in_use",
            Self::Maintenance => "maintenance",
            Self::Scrapped => "scrapped",
            Self::Cleared => "cleared",
            Self::Disposed => "disposed",
        }
    }

    /// Parses a stored or user-typed status name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "in_stock" => Some(Self::InStock),
            "in_use" => Some(Self::InUse),
            "maintenance" => Some(Self::Maintenance),
            "scrapped" => Some(Self::Scrapped),
            "cleared" => Some(Self::Cleared),
            "disposed" => Some(Self::Disposed),
            _ => None,
        }
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Defines relationships between Asset and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One asset has many flow records
    #[sea_orm(has_many = "super::flow_record::Entity")]
    FlowRecords,
    /// Each asset optionally belongs to a category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
}

impl Related<super::flow_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FlowRecords.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
