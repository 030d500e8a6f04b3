//! Database configuration module for the asset ledger.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated with `Schema::create_table_from_entity`, so the schema always
//! matches the entity definitions. Tables are created parents first: categories and
//! contracts, then suppliers and dictionary items, then assets and their flow records.

use crate::entities::{
    Asset, Category, ContractSupplier, DictionaryItem, FlowRecord, ProcurementContract,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::info;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/asset_ledger.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable, falling back
/// to a local `SQLite` file.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    info!("Connecting to database at {database_url}");
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all tables that do not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut category_table = schema.create_table_from_entity(Category);
    let mut contract_table = schema.create_table_from_entity(ProcurementContract);
    let mut supplier_table = schema.create_table_from_entity(ContractSupplier);
    let mut dictionary_table = schema.create_table_from_entity(DictionaryItem);
    let mut asset_table = schema.create_table_from_entity(Asset);
    let mut flow_record_table = schema.create_table_from_entity(FlowRecord);

    for table in [
        &mut category_table,
        &mut contract_table,
        &mut supplier_table,
        &mut dictionary_table,
        &mut asset_table,
        &mut flow_record_table,
    ] {
        table.if_not_exists();
        db.execute(builder.build(&*table)).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        AssetModel, CategoryModel, ContractSupplierModel, DictionaryItemModel, FlowRecordModel,
        ProcurementContractModel,
    };
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        let _: Vec<CategoryModel> = Category::find().limit(1).all(&db).await?;
        let _: Vec<ProcurementContractModel> =
            ProcurementContract::find().limit(1).all(&db).await?;
        let _: Vec<ContractSupplierModel> = ContractSupplier::find().limit(1).all(&db).await?;
        let _: Vec<DictionaryItemModel> = DictionaryItem::find().limit(1).all(&db).await?;
        let _: Vec<AssetModel> = Asset::find().limit(1).all(&db).await?;
        let _: Vec<FlowRecordModel> = FlowRecord::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }
}
