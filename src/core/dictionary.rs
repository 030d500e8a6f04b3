//! Catalogue business logic - categories and dictionary items.
//!
//! Dictionary items are equipment templates taken from procurement contracts. They
//! pre-fill new assets (see `core::asset::create_asset_from_dictionary`) and never take
//! part in the lifecycle. Categories group both assets and dictionary items. An item
//! linked to a contract takes its project name from it and its supplier must be one of
//! the contract's suppliers.

use crate::{
    config::catalog::Config,
    core::contract::{self, ContractInput, SupplierInput},
    entities::{Category, DictionaryItem, ProcurementContract, category, dictionary_item},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{Condition, QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

/// Retrieves all categories, ordered alphabetically by name.
pub async fn get_all_categories(db: &DatabaseConnection) -> Result<Vec<category::Model>> {
    Category::find()
        .order_by_asc(category::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a category by its exact name.
pub async fn get_category_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<category::Model>> {
    Category::find()
        .filter(category::Column::Name.eq(name.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a category. Names are unique.
///
/// # Errors
/// - `Error::MissingField` if the name or code is empty
/// - `Error::InvalidPayload` if a category with that name exists
pub async fn create_category(
    db: &DatabaseConnection,
    name: &str,
    code: &str,
    description: Option<String>,
) -> Result<category::Model> {
    let name = name.trim();
    let code = code.trim();
    if name.is_empty() {
        return Err(Error::MissingField { field: "name" });
    }
    if code.is_empty() {
        return Err(Error::MissingField { field: "code" });
    }
    if get_category_by_name(db, name).await?.is_some() {
        return Err(Error::InvalidPayload {
            message: format!("category '{name}' already exists"),
        });
    }

    let model = category::ActiveModel {
        name: Set(name.to_string()),
        code: Set(code.to_string()),
        description: Set(description),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Fields of a dictionary item, used for both create and update.
#[derive(Debug, Clone, Default)]
pub struct DictionaryItemInput {
    /// Equipment name (required)
    pub equipment_name: String,
    /// Category
    pub category_id: Option<i64>,
    /// Procurement contract the item was priced under
    pub contract_id: Option<i64>,
    /// Procurement project; defaults to the contract's project
    pub project_name: Option<String>,
    /// Brand
    pub brand: Option<String>,
    /// Model designation
    pub model_name: Option<String>,
    /// Unit of measure
    pub unit: Option<String>,
    /// Contract unit price, tax exclusive
    pub price: f64,
    /// Tax rate in percent
    pub tax_rate: Option<f64>,
    /// Supplier
    pub supplier: Option<String>,
    /// Expected service life in years
    pub usage_years: Option<i32>,
    /// Accessories shipped with the equipment
    pub accessory_info: Option<String>,
}

impl DictionaryItemInput {
    fn validate(&self) -> Result<String> {
        let name = self.equipment_name.trim();
        if name.is_empty() {
            return Err(Error::MissingField {
                field: "equipment_name",
            });
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(Error::InvalidAmount { amount: self.price });
        }
        if let Some(rate) = self.tax_rate.filter(|r| !r.is_finite() || *r < 0.0) {
            return Err(Error::InvalidAmount { amount: rate });
        }
        Ok(name.to_string())
    }
}

async fn ensure_category(db: &DatabaseConnection, category_id: Option<i64>) -> Result<()> {
    if let Some(id) = category_id {
        Category::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| Error::CategoryNotFound {
                reference: id.to_string(),
            })?;
    }
    Ok(())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Project name and supplier an item ends up with once its contract is applied.
///
/// Without a contract both are taken as given. With one, a blank project takes the
/// contract's project, and the supplier must be on the contract unless the contract
/// lists none. A blank supplier on a single-supplier contract takes that supplier.
async fn resolve_contract_fields(
    db: &DatabaseConnection,
    input: &DictionaryItemInput,
) -> Result<(Option<String>, Option<String>)> {
    let project_name = non_blank(input.project_name.as_deref()).map(str::to_string);
    let supplier = non_blank(input.supplier.as_deref()).map(str::to_string);
    let Some(contract_id) = input.contract_id else {
        return Ok((project_name, supplier));
    };

    let details = contract::get_contract_details(db, contract_id).await?;
    let project_name = project_name.or_else(|| Some(details.contract.project_name.clone()));
    let supplier = match supplier {
        Some(name) if details.suppliers.is_empty() || details.has_supplier(&name) => Some(name),
        Some(name) => {
            return Err(Error::InvalidPayload {
                message: format!(
                    "supplier '{name}' is not on contract '{}'",
                    details.contract.project_name
                ),
            });
        }
        None => match details.suppliers.as_slice() {
            [only] => Some(only.supplier_name.clone()),
            _ => None,
        },
    };
    Ok((project_name, supplier))
}

/// Creates a dictionary item.
///
/// # Errors
/// - `Error::MissingField` if the equipment name is empty
/// - `Error::InvalidAmount` if the price or tax rate is negative or not finite
/// - `Error::CategoryNotFound` if the category does not exist
/// - `Error::ContractNotFound` if the contract does not exist
/// - `Error::InvalidPayload` if the supplier is not on the contract
pub async fn create_dictionary_item(
    db: &DatabaseConnection,
    input: DictionaryItemInput,
) -> Result<dictionary_item::Model> {
    let equipment_name = input.validate()?;
    ensure_category(db, input.category_id).await?;
    let (project_name, supplier) = resolve_contract_fields(db, &input).await?;

    let model = dictionary_item::ActiveModel {
        contract_id: Set(input.contract_id),
        project_name: Set(project_name),
        category_id: Set(input.category_id),
        equipment_name: Set(equipment_name),
        brand: Set(input.brand),
        model_name: Set(input.model_name),
        unit: Set(input.unit),
        price: Set(input.price),
        tax_rate: Set(input.tax_rate),
        supplier: Set(supplier),
        usage_years: Set(input.usage_years),
        accessory_info: Set(input.accessory_info),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Replaces every field of a dictionary item.
pub async fn update_dictionary_item(
    db: &DatabaseConnection,
    item_id: i64,
    input: DictionaryItemInput,
) -> Result<dictionary_item::Model> {
    let equipment_name = input.validate()?;
    let item = get_dictionary_item_by_id(db, item_id)
        .await?
        .ok_or(Error::DictionaryItemNotFound { id: item_id })?;
    ensure_category(db, input.category_id).await?;
    let (project_name, supplier) = resolve_contract_fields(db, &input).await?;

    let mut active: dictionary_item::ActiveModel = item.into();
    active.contract_id = Set(input.contract_id);
    active.project_name = Set(project_name);
    active.category_id = Set(input.category_id);
    active.equipment_name = Set(equipment_name);
    active.brand = Set(input.brand);
    active.model_name = Set(input.model_name);
    active.unit = Set(input.unit);
    active.price = Set(input.price);
    active.tax_rate = Set(input.tax_rate);
    active.supplier = Set(supplier);
    active.usage_years = Set(input.usage_years);
    active.accessory_info = Set(input.accessory_info);

    active.update(db).await.map_err(Into::into)
}

/// Deletes a dictionary item. Assets created from it keep their copied values.
pub async fn delete_dictionary_item(db: &DatabaseConnection, item_id: i64) -> Result<()> {
    let result = DictionaryItem::delete_by_id(item_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::DictionaryItemNotFound { id: item_id });
    }
    Ok(())
}

/// Retrieves a dictionary item by id.
pub async fn get_dictionary_item_by_id<C>(
    db: &C,
    item_id: i64,
) -> Result<Option<dictionary_item::Model>>
where
    C: ConnectionTrait,
{
    DictionaryItem::find_by_id(item_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Filters for [`list_dictionary_items`].
#[derive(Debug, Clone, Default)]
pub struct DictionaryFilter {
    /// Exact project name
    pub project_name: Option<String>,
    /// Exact category
    pub category_id: Option<i64>,
    /// Exact contract
    pub contract_id: Option<i64>,
    /// Substring of equipment name, supplier, brand or model
    pub search: Option<String>,
}

/// Lists dictionary items matching a filter, ordered by equipment name.
pub async fn list_dictionary_items(
    db: &DatabaseConnection,
    filter: &DictionaryFilter,
) -> Result<Vec<dictionary_item::Model>> {
    let mut condition = Condition::all();
    if let Some(project) = filter.project_name.as_deref() {
        condition = condition.add(dictionary_item::Column::ProjectName.eq(project));
    }
    if let Some(category_id) = filter.category_id {
        condition = condition.add(dictionary_item::Column::CategoryId.eq(category_id));
    }
    if let Some(contract_id) = filter.contract_id {
        condition = condition.add(dictionary_item::Column::ContractId.eq(contract_id));
    }
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        condition = condition.add(
            Condition::any()
                .add(dictionary_item::Column::EquipmentName.contains(search))
                .add(dictionary_item::Column::Supplier.contains(search))
                .add(dictionary_item::Column::Brand.contains(search))
                .add(dictionary_item::Column::ModelName.contains(search)),
        );
    }

    DictionaryItem::find()
        .filter(condition)
        .order_by_asc(dictionary_item::Column::EquipmentName)
        .order_by_asc(dictionary_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Distinct project names across contracts and the dictionary, sorted.
pub async fn list_project_names(db: &DatabaseConnection) -> Result<Vec<String>> {
    let mut names: Vec<String> = DictionaryItem::find()
        .all(db)
        .await?
        .into_iter()
        .filter_map(|item| item.project_name)
        .collect();
    names.extend(
        ProcurementContract::find()
            .all(db)
            .await?
            .into_iter()
            .map(|contract| contract.project_name),
    );
    names.sort();
    names.dedup();
    Ok(names)
}

/// Price including tax: `price * (1 + rate / 100)`. A missing rate means no tax.
#[must_use]
pub fn tax_inclusive_price(price: f64, tax_rate: Option<f64>) -> f64 {
    price * (1.0 + tax_rate.unwrap_or(0.0) / 100.0)
}

/// Counts of catalogue rows inserted by [`seed_catalog`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    /// Categories inserted
    pub categories: usize,
    /// Contracts inserted
    pub contracts: usize,
    /// Dictionary items inserted
    pub dictionary_items: usize,
}

/// Seeds categories, contracts and dictionary items from config.toml.
///
/// Idempotent: categories are matched by name, contracts by project name, dictionary
/// items by equipment name and model, and existing rows are left alone.
///
/// # Errors
/// - `Error::CategoryNotFound` if a dictionary entry names an unknown category
/// - `Error::ContractNotFound` if a dictionary entry names an unknown contract
#[instrument(skip_all)]
pub async fn seed_catalog(db: &DatabaseConnection, config: &Config) -> Result<SeedSummary> {
    let mut summary = SeedSummary::default();

    for entry in &config.categories {
        if get_category_by_name(db, &entry.name).await?.is_none() {
            create_category(db, &entry.name, &entry.code, entry.description.clone()).await?;
            summary.categories += 1;
        }
    }

    for entry in &config.contracts {
        if contract::get_contract_by_project_name(db, &entry.project_name)
            .await?
            .is_some()
        {
            continue;
        }
        contract::create_contract(
            db,
            ContractInput {
                project_name: entry.project_name.clone(),
                project_time: entry.project_time,
                bm_number: entry.bm_number.clone(),
                procurement_order: entry.procurement_order.clone(),
                description: entry.description.clone(),
                suppliers: entry
                    .suppliers
                    .iter()
                    .map(|supplier| SupplierInput {
                        supplier_name: supplier.name.clone(),
                        contact_person: supplier.contact_person.clone(),
                        contact_phone: supplier.contact_phone.clone(),
                        remarks: supplier.remarks.clone(),
                    })
                    .collect(),
            },
        )
        .await?;
        summary.contracts += 1;
    }

    for entry in &config.dictionary {
        let category_id = match entry.category.as_deref() {
            Some(name) => Some(
                get_category_by_name(db, name)
                    .await?
                    .ok_or_else(|| Error::CategoryNotFound {
                        reference: name.to_string(),
                    })?
                    .id,
            ),
            None => None,
        };
        let contract_id = match entry.contract.as_deref() {
            Some(project) => Some(
                contract::get_contract_by_project_name(db, project)
                    .await?
                    .ok_or_else(|| Error::ContractNotFound {
                        reference: project.to_string(),
                    })?
                    .id,
            ),
            None => None,
        };

        let mut existing = DictionaryItem::find()
            .filter(dictionary_item::Column::EquipmentName.eq(entry.equipment_name.trim()));
        existing = match entry.model.as_deref() {
            Some(model) => existing.filter(dictionary_item::Column::ModelName.eq(model)),
            None => existing.filter(dictionary_item::Column::ModelName.is_null()),
        };
        if existing.one(db).await?.is_some() {
            continue;
        }

        create_dictionary_item(
            db,
            DictionaryItemInput {
                equipment_name: entry.equipment_name.clone(),
                category_id,
                contract_id,
                project_name: entry.project_name.clone(),
                brand: entry.brand.clone(),
                model_name: entry.model.clone(),
                unit: entry.unit.clone(),
                price: entry.price,
                tax_rate: entry.tax_rate,
                supplier: entry.supplier.clone(),
                usage_years: entry.usage_years,
                accessory_info: None,
            },
        )
        .await?;
        summary.dictionary_items += 1;
    }

    info!(
        "Seeded {} categories, {} contracts and {} dictionary items",
        summary.categories, summary.contracts, summary.dictionary_items
    );
    Ok(summary)
}
