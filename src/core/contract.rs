//! Procurement contract business logic - contracts, their suppliers and lookups.
//!
//! A contract is one purchasing project (project name, BM number, purchase order)
//! awarded to one or more suppliers. Dictionary items are priced under a contract and
//! inherit its project name and supplier list; assets created from those items inherit
//! the contract's purchase order. Suppliers are always written together with their
//! contract: updates replace the whole supplier list in one transaction.

use crate::{
    entities::{
        ContractSupplier, DictionaryItem, ProcurementContract, contract_supplier, dictionary_item,
        procurement_contract,
    },
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{Condition, DatabaseTransaction, QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::HashMap;
use tracing::{info, instrument, warn};

/// One supplier on a contract.
#[derive(Debug, Clone, Default)]
pub struct SupplierInput {
    /// Supplier name (required, unique within the contract)
    pub supplier_name: String,
    /// Contact at the supplier
    pub contact_person: Option<String>,
    /// Contact phone number
    pub contact_phone: Option<String>,
    /// Notes
    pub remarks: Option<String>,
}

/// Fields of a contract, used for both create and update.
#[derive(Debug, Clone, Default)]
pub struct ContractInput {
    /// Project name (required, unique)
    pub project_name: String,
    /// Date the project was run
    pub project_time: Option<NaiveDate>,
    /// Budget management number
    pub bm_number: Option<String>,
    /// Purchase order number
    pub procurement_order: Option<String>,
    /// Notes
    pub description: Option<String>,
    /// Suppliers awarded the contract
    pub suppliers: Vec<SupplierInput>,
}

impl ContractInput {
    fn validate(&self) -> Result<String> {
        let project_name = self.project_name.trim();
        if project_name.is_empty() {
            return Err(Error::MissingField {
                field: "project_name",
            });
        }

        let mut seen: Vec<&str> = Vec::with_capacity(self.suppliers.len());
        for supplier in &self.suppliers {
            let name = supplier.supplier_name.trim();
            if name.is_empty() {
                return Err(Error::MissingField {
                    field: "supplier_name",
                });
            }
            if seen.contains(&name) {
                return Err(Error::InvalidPayload {
                    message: format!("supplier '{name}' is listed twice on '{project_name}'"),
                });
            }
            seen.push(name);
        }
        Ok(project_name.to_string())
    }
}

/// A contract together with its suppliers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractDetails {
    /// The contract row
    pub contract: procurement_contract::Model,
    /// Its suppliers, in insertion order
    pub suppliers: Vec<contract_supplier::Model>,
}

impl ContractDetails {
    /// Whether `name` is one of the contract's suppliers.
    #[must_use]
    pub fn has_supplier(&self, name: &str) -> bool {
        self.suppliers
            .iter()
            .any(|supplier| supplier.supplier_name == name.trim())
    }
}

async fn insert_suppliers(
    txn: &DatabaseTransaction,
    contract_id: i64,
    suppliers: Vec<SupplierInput>,
) -> Result<()> {
    for supplier in suppliers {
        contract_supplier::ActiveModel {
            contract_id: Set(contract_id),
            supplier_name: Set(supplier.supplier_name.trim().to_string()),
            contact_person: Set(supplier.contact_person),
            contact_phone: Set(supplier.contact_phone),
            remarks: Set(supplier.remarks),
            ..Default::default()
        }
        .insert(txn)
        .await?;
    }
    Ok(())
}

async fn ensure_unique_project<C>(db: &C, project_name: &str, except: Option<i64>) -> Result<()>
where
    C: ConnectionTrait,
{
    let mut query = ProcurementContract::find()
        .filter(procurement_contract::Column::ProjectName.eq(project_name));
    if let Some(id) = except {
        query = query.filter(procurement_contract::Column::Id.ne(id));
    }
    if query.one(db).await?.is_some() {
        return Err(Error::InvalidPayload {
            message: format!("contract for project '{project_name}' already exists"),
        });
    }
    Ok(())
}

/// Records a contract and its suppliers.
///
/// # Errors
/// - `Error::MissingField` if the project or a supplier name is empty
/// - `Error::InvalidPayload` if the project already has a contract or a supplier repeats
#[instrument(skip(db, input), fields(project = %input.project_name))]
pub async fn create_contract(
    db: &DatabaseConnection,
    input: ContractInput,
) -> Result<ContractDetails> {
    let project_name = input.validate()?;

    let txn = db.begin().await?;
    ensure_unique_project(&txn, &project_name, None).await?;

    let contract = procurement_contract::ActiveModel {
        project_name: Set(project_name),
        project_time: Set(input.project_time),
        bm_number: Set(input.bm_number),
        procurement_order: Set(input.procurement_order),
        description: Set(input.description),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    insert_suppliers(&txn, contract.id, input.suppliers).await?;
    let suppliers = get_contract_suppliers(&txn, contract.id).await?;
    txn.commit().await?;

    info!(
        "Recorded contract '{}' with {} suppliers",
        contract.project_name,
        suppliers.len()
    );
    Ok(ContractDetails {
        contract,
        suppliers,
    })
}

/// Replaces a contract's fields and its whole supplier list.
///
/// Dictionary items linked to the contract keep their own supplier values.
#[instrument(skip(db, input))]
pub async fn update_contract(
    db: &DatabaseConnection,
    contract_id: i64,
    input: ContractInput,
) -> Result<ContractDetails> {
    let project_name = input.validate()?;

    let txn = db.begin().await?;
    let contract = get_contract_by_id(&txn, contract_id)
        .await?
        .ok_or_else(|| Error::ContractNotFound {
            reference: contract_id.to_string(),
        })?;
    ensure_unique_project(&txn, &project_name, Some(contract_id)).await?;

    let mut active: procurement_contract::ActiveModel = contract.into();
    active.project_name = Set(project_name);
    active.project_time = Set(input.project_time);
    active.bm_number = Set(input.bm_number);
    active.procurement_order = Set(input.procurement_order);
    active.description = Set(input.description);
    let contract = active.update(&txn).await?;

    ContractSupplier::delete_many()
        .filter(contract_supplier::Column::ContractId.eq(contract_id))
        .exec(&txn)
        .await?;
    insert_suppliers(&txn, contract_id, input.suppliers).await?;
    let suppliers = get_contract_suppliers(&txn, contract_id).await?;
    txn.commit().await?;

    Ok(ContractDetails {
        contract,
        suppliers,
    })
}

/// Deletes a contract and its suppliers. Dictionary items priced under it are kept
/// and unlinked.
#[instrument(skip(db))]
pub async fn delete_contract(db: &DatabaseConnection, contract_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let contract = get_contract_by_id(&txn, contract_id)
        .await?
        .ok_or_else(|| Error::ContractNotFound {
            reference: contract_id.to_string(),
        })?;

    let unlinked = DictionaryItem::update_many()
        .col_expr(
            dictionary_item::Column::ContractId,
            Expr::value(Option::<i64>::None),
        )
        .filter(dictionary_item::Column::ContractId.eq(contract_id))
        .exec(&txn)
        .await?
        .rows_affected;
    ContractSupplier::delete_many()
        .filter(contract_supplier::Column::ContractId.eq(contract_id))
        .exec(&txn)
        .await?;
    contract.delete(&txn).await?;
    txn.commit().await?;

    warn!("Contract {contract_id} deleted; {unlinked} dictionary items unlinked");
    Ok(())
}

/// Retrieves a contract by id.
pub async fn get_contract_by_id<C>(
    db: &C,
    contract_id: i64,
) -> Result<Option<procurement_contract::Model>>
where
    C: ConnectionTrait,
{
    ProcurementContract::find_by_id(contract_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a contract by its exact project name.
pub async fn get_contract_by_project_name(
    db: &DatabaseConnection,
    project_name: &str,
) -> Result<Option<procurement_contract::Model>> {
    ProcurementContract::find()
        .filter(procurement_contract::Column::ProjectName.eq(project_name.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Suppliers of one contract, in insertion order.
pub async fn get_contract_suppliers<C>(
    db: &C,
    contract_id: i64,
) -> Result<Vec<contract_supplier::Model>>
where
    C: ConnectionTrait,
{
    ContractSupplier::find()
        .filter(contract_supplier::Column::ContractId.eq(contract_id))
        .order_by_asc(contract_supplier::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Loads a contract with its suppliers.
pub async fn get_contract_details<C>(db: &C, contract_id: i64) -> Result<ContractDetails>
where
    C: ConnectionTrait,
{
    let contract = get_contract_by_id(db, contract_id)
        .await?
        .ok_or_else(|| Error::ContractNotFound {
            reference: contract_id.to_string(),
        })?;
    let suppliers = get_contract_suppliers(db, contract_id).await?;
    Ok(ContractDetails {
        contract,
        suppliers,
    })
}

/// Filters for [`list_contracts`]. All matches are substrings.
#[derive(Debug, Clone, Default)]
pub struct ContractFilter {
    /// Part of the project name
    pub project_contains: Option<String>,
    /// Part of the BM number
    pub bm_contains: Option<String>,
    /// Part of the purchase order
    pub order_contains: Option<String>,
}

/// Lists contracts with their suppliers, newest first.
pub async fn list_contracts(
    db: &DatabaseConnection,
    filter: &ContractFilter,
) -> Result<Vec<ContractDetails>> {
    let mut condition = Condition::all();
    for (column, value) in [
        (procurement_contract::Column::ProjectName, &filter.project_contains),
        (procurement_contract::Column::BmNumber, &filter.bm_contains),
        (procurement_contract::Column::ProcurementOrder, &filter.order_contains),
    ] {
        if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            condition = condition.add(column.contains(value));
        }
    }

    let contracts = ProcurementContract::find()
        .filter(condition)
        .order_by_desc(procurement_contract::Column::CreatedAt)
        .order_by_desc(procurement_contract::Column::Id)
        .all(db)
        .await?;

    let mut suppliers: HashMap<i64, Vec<contract_supplier::Model>> = HashMap::new();
    for supplier in ContractSupplier::find()
        .filter(
            contract_supplier::Column::ContractId
                .is_in(contracts.iter().map(|contract| contract.id)),
        )
        .order_by_asc(contract_supplier::Column::Id)
        .all(db)
        .await?
    {
        suppliers.entry(supplier.contract_id).or_default().push(supplier);
    }

    Ok(contracts
        .into_iter()
        .map(|contract| ContractDetails {
            suppliers: suppliers.remove(&contract.id).unwrap_or_default(),
            contract,
        })
        .collect())
}
