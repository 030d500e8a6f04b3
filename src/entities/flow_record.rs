//! Flow record entity - Immutable audit entry for one lifecycle operation on one asset.
//!
//! Records are append-only. The operation-specific columns (`target_*`, `borrow_*`,
//! `return_type`, `related_form_no`) are only populated for the kinds that use them;
//! the typed view of those payloads lives in `core::operation`.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Flow record database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "flow_records")]
pub struct Model {
    /// Unique identifier for the record
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Asset this record belongs to
    pub asset_id: i64,
    /// Kind of lifecycle operation
    pub operation_type: OperationKind,
    /// Display name of the operator who performed the operation
    pub operator: String,
    /// Stable operator id (e.g., Discord user id), when known
    pub operator_id: Option<String>,
    /// When the operation happened
    pub operation_time: DateTimeUtc,
    /// Free-text description or reason
    pub description: Option<String>,
    /// External form number linking several records (requisition/borrow/transfer)
    pub related_form_no: Option<String>,
    /// Target (or returning) employee name
    pub target_employee_name: Option<String>,
    /// Target employee code
    pub target_employee_code: Option<String>,
    /// Target department
    pub target_department_name: Option<String>,
    /// Target floor
    pub target_floor: Option<String>,
    /// Target room type
    pub target_room_type: Option<String>,
    /// Target specific location
    pub target_specific_location: Option<String>,
    /// Borrow period start
    pub borrow_start_time: Option<DateTimeUtc>,
    /// Borrow period end
    pub borrow_end_time: Option<DateTimeUtc>,
    /// Why the asset was returned; only set for `return`
    pub return_type: Option<ReturnType>,
}

/// Kind of lifecycle operation recorded by a flow record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Asset registered into stock
    #[sea_orm(string_value = "inbound")]
    Inbound,
    /// Issued to an employee
    #[sea_orm(string_value = "requisition")]
    Requisition,
    /// Lent to an employee for a period
    #[sea_orm(string_value = "borrow")]
    Borrow,
    /// Brought back into stock
    #[sea_orm(string_value = "return")]
    Return,
    /// Moved to a different holder
    #[sea_orm(string_value = "transfer")]
    Transfer,
    /// Written off
    #[sea_orm(string_value = "scrap")]
    Scrap,
    /// Physically removed
    #[sea_orm(string_value = "dispose")]
    Dispose,
}

impl OperationKind {
    /// Stable snake_case name, as stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inbound => "inbound",
            Self::Requisition => "requisition",
            Self::Borrow => "borrow",
            Self::Return => "return",
            Self::Transfer => "transfer",
            Self::Scrap => "scrap",
            Self::Dispose => "dispose",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an asset came back into stock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ReturnType {
    /// Ordinary return
    #[default]
    #[sea_orm(string_value = "normal")]
    Normal,
    /// Returned because the holder left the company
    #[sea_orm(string_value = "resignation")]
    Resignation,
}

/// Defines relationships between FlowRecord and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each record belongs to one asset
    #[sea_orm(
        belongs_to = "super::asset::Entity",
        from = "Column::AssetId",
        to = "super::asset::Column::Id",
        on_delete = "Cascade"
    )]
    Asset,
}

impl Related<super::asset::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Asset.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
