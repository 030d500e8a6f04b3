//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod asset;
pub mod category;
pub mod contract_supplier;
pub mod dictionary_item;
pub mod flow_record;
pub mod procurement_contract;

// Re-export specific types to avoid conflicts
pub use asset::{AssetStatus, Column as AssetColumn, Entity as Asset, Model as AssetModel};
pub use category::{Column as CategoryColumn, Entity as Category, Model as CategoryModel};
pub use contract_supplier::{
    Column as ContractSupplierColumn, Entity as ContractSupplier, Model as ContractSupplierModel,
};
pub use dictionary_item::{
    Column as DictionaryItemColumn, Entity as DictionaryItem, Model as DictionaryItemModel,
};
pub use flow_record::{
    Column as FlowRecordColumn, Entity as FlowRecord, Model as FlowRecordModel, OperationKind,
    ReturnType,
};
pub use procurement_contract::{
    Column as ProcurementContractColumn, Entity as ProcurementContract,
    Model as ProcurementContractModel,
};
