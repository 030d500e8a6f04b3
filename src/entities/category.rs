//! Category entity - Groups assets and dictionary items (e.g., "Computers", "Furniture").

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Category database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name, unique
    #[sea_orm(unique)]
    pub name: String,
    /// Short code (e.g., "PC")
    pub code: String,
    /// Optional description
    pub description: Option<String>,
}

/// Defines relationships between Category and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One category has many assets
    #[sea_orm(has_many = "super::asset::Entity")]
    Assets,
    /// One category has many dictionary items
    #[sea_orm(has_many = "super::dictionary_item::Entity")]
    DictionaryItems,
}

impl Related<super::asset::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assets.def()
    }
}

impl Related<super::dictionary_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DictionaryItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
