//! Ledger business logic - executes lifecycle operations and queries the flow history.
//!
//! [`execute_operation`] applies one [`Operation`] to a batch of assets with
//! all-or-nothing semantics: every asset is validated against the lifecycle table
//! before anything is written, and the writes for the whole batch (one flow record
//! plus one conditional asset update per asset) share a single database transaction.
//! An asset whose status changed between validation and write aborts the batch with
//! [`Error::ConcurrentModification`].

use crate::{
    core::{
        lifecycle::{self, HolderPolicy, RejectReason},
        operation::{Holder, Operation, Operator},
    },
    entities::{Asset, AssetStatus, FlowRecord, OperationKind, ReturnType, asset, flow_record},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{Condition, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

/// One asset that could not take part in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Requested asset id
    pub asset_id: i64,
    /// Asset code, when the asset exists
    pub asset_code: Option<String>,
    /// Why it was rejected
    pub reason: RejectReason,
}

impl Rejection {
    /// Asset code, or the id when the asset does not exist.
    #[must_use]
    pub fn label(&self) -> String {
        self.asset_code
            .clone()
            .unwrap_or_else(|| format!("#{}", self.asset_id))
    }
}

/// Result of a batch operation.
///
/// Under the all-or-nothing policy either `rejected` is empty and every requested
/// asset is in `succeeded`, or `succeeded` is empty and nothing was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Operation that was requested
    pub kind: OperationKind,
    /// Ids of assets that transitioned
    pub succeeded: Vec<i64>,
    /// Assets that failed validation
    pub rejected: Vec<Rejection>,
    /// Non-fatal notes for the caller (e.g., an ambiguous returner)
    pub warnings: Vec<String>,
}

impl BatchOutcome {
    const fn new(kind: OperationKind) -> Self {
        Self {
            kind,
            succeeded: Vec::new(),
            rejected: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Whether the batch was applied.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        self.rejected.is_empty() && !self.succeeded.is_empty()
    }
}

/// Lists assets an operation kind can currently be applied to, ordered by code.
///
/// Faulty assets are left out for requisition and borrow. `inbound` only applies to
/// new assets, so it yields nothing.
pub async fn list_eligible_assets(
    db: &DatabaseConnection,
    kind: OperationKind,
) -> Result<Vec<asset::Model>> {
    let statuses = lifecycle::eligible_statuses(kind);
    if statuses.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = Asset::find().filter(asset::Column::Status.is_in(statuses.iter().copied()));
    if lifecycle::excludes_faulty(kind) {
        query = query.filter(asset::Column::IsFaulty.eq(false));
    }

    query
        .order_by_asc(asset::Column::AssetCode)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Applies one lifecycle operation to a batch of assets.
///
/// Ineligible or unknown assets are reported in [`BatchOutcome::rejected`] and leave
/// every asset in the batch untouched. Duplicate ids are applied once.
///
/// # Errors
/// - `Error::InvalidPayload` if no assets are selected
/// - `Error::ConcurrentModification` if an asset changed status mid-batch
/// - `Error::Database` on storage failure; nothing is committed
#[instrument(skip(db, operation, note), fields(kind = %operation.kind()))]
pub async fn execute_operation(
    db: &DatabaseConnection,
    operator: &Operator,
    asset_ids: &[i64],
    operation: &Operation,
    note: Option<&str>,
) -> Result<BatchOutcome> {
    let kind = operation.kind();
    if asset_ids.is_empty() {
        return Err(Error::InvalidPayload {
            message: format!("{kind} needs at least one asset"),
        });
    }

    let mut seen = HashSet::new();
    let ids: Vec<i64> = asset_ids
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect();

    let txn = db.begin().await?;

    let found = Asset::find()
        .filter(asset::Column::Id.is_in(ids.iter().copied()))
        .all(&txn)
        .await?;

    let mut outcome = BatchOutcome::new(kind);
    let mut batch = Vec::with_capacity(ids.len());
    for id in &ids {
        let Some(asset) = found.iter().find(|asset| asset.id == *id) else {
            outcome.rejected.push(Rejection {
                asset_id: *id,
                asset_code: None,
                reason: RejectReason::NotFound,
            });
            continue;
        };
        match lifecycle::check_eligibility(kind, asset) {
            Ok(()) => batch.push(asset.clone()),
            Err(reason) => outcome.rejected.push(Rejection {
                asset_id: asset.id,
                asset_code: Some(asset.asset_code.clone()),
                reason,
            }),
        }
    }

    if !outcome.rejected.is_empty() {
        txn.rollback().await?;
        warn!(
            "Rejected {} batch: {} of {} assets ineligible",
            kind,
            outcome.rejected.len(),
            ids.len()
        );
        return Ok(outcome);
    }

    let returner = match operation {
        Operation::Return(details) => match &details.returned_by {
            Some(holder) => Some(holder.clone()),
            None => {
                let (holder, warning) = resolve_return_holder(&batch);
                outcome.warnings.extend(warning);
                holder
            }
        },
        _ => None,
    };

    let now = Utc::now();
    for asset in &batch {
        apply_operation(&txn, operator, asset, operation, returner.as_ref(), note, now).await?;
        outcome.succeeded.push(asset.id);
    }

    txn.commit().await?;

    info!(
        "Applied {} to {} asset(s) by {}",
        kind,
        outcome.succeeded.len(),
        operator.name
    );
    Ok(outcome)
}

/// Derives the returner from the current holders of a batch.
///
/// Exactly one distinct holder is used as the returner. Several distinct holders
/// leave it unset and produce a warning.
#[must_use]
pub fn resolve_return_holder(assets: &[asset::Model]) -> (Option<Holder>, Option<String>) {
    let mut holders: Vec<Holder> = Vec::new();
    for asset in assets {
        let Some(name) = asset.employee_name.as_deref() else {
            continue;
        };
        let holder = Holder {
            employee_name: name.to_string(),
            employee_code: asset.employee_code.clone(),
            department_name: asset.department_name.clone(),
        };
        if !holders.iter().any(|h| {
            h.employee_name == holder.employee_name && h.employee_code == holder.employee_code
        }) {
            holders.push(holder);
        }
    }

    match holders.len() {
        0 => (None, None),
        1 => (holders.pop(), None),
        n => (
            None,
            Some(format!(
                "Selected assets are held by {n} different employees; returner left blank, name one explicitly"
            )),
        ),
    }
}

/// Appends the flow record for one asset and applies the field policy.
///
/// The asset update only matches while the asset is still in an eligible status.
async fn apply_operation<C>(
    conn: &C,
    operator: &Operator,
    asset: &asset::Model,
    operation: &Operation,
    returner: Option<&Holder>,
    note: Option<&str>,
    now: DateTime<Utc>,
) -> Result<()>
where
    C: ConnectionTrait,
{
    let kind = operation.kind();

    let mut record = flow_record::ActiveModel {
        asset_id: Set(asset.id),
        operation_type: Set(kind),
        operator: Set(operator.name.clone()),
        operator_id: Set(operator.id.clone()),
        operation_time: Set(now),
        description: Set(note.map(str::to_string)),
        ..Default::default()
    };

    if let Some(assignment) = operation.assignment() {
        set_target_holder(&mut record, Some(&assignment.holder));
        let location = assignment.location.as_ref();
        record.target_floor = Set(location.map(|l| l.floor.clone()));
        record.target_room_type = Set(location.map(|l| l.room_type.clone()));
        record.target_specific_location = Set(location.map(|l| l.specific_location.clone()));
        record.related_form_no = Set(assignment.related_form_no.clone());
    }
    match operation {
        Operation::Borrow(_, period) => {
            record.borrow_start_time = Set(Some(period.start()));
            record.borrow_end_time = Set(Some(period.end()));
        }
        Operation::Return(details) => {
            record.return_type = Set(Some(details.return_type));
            set_target_holder(&mut record, returner);
        }
        _ => {}
    }
    record.insert(conn).await?;

    let mut changes = asset::ActiveModel {
        status: Set(lifecycle::resulting_status(kind)),
        updated_at: Set(now),
        ..Default::default()
    };
    match lifecycle::holder_policy(kind) {
        HolderPolicy::Assign => {
            if let Some(assignment) = operation.assignment() {
                let holder = &assignment.holder;
                let location = assignment.location.as_ref();
                changes.employee_name = Set(Some(holder.employee_name.clone()));
                changes.employee_code = Set(holder.employee_code.clone());
                changes.department_name = Set(holder.department_name.clone());
                changes.floor = Set(location.map(|l| l.floor.clone()));
                changes.room_type = Set(location.map(|l| l.room_type.clone()));
                changes.specific_location = Set(location.map(|l| l.specific_location.clone()));
            }
        }
        HolderPolicy::Clear => {
            changes.employee_name = Set(None);
            changes.employee_code = Set(None);
            changes.department_name = Set(None);
            changes.floor = Set(None);
            changes.room_type = Set(None);
            changes.specific_location = Set(None);
        }
        HolderPolicy::Keep => {}
    }

    let result = Asset::update_many()
        .set(changes)
        .filter(asset::Column::Id.eq(asset.id))
        .filter(asset::Column::Status.is_in(lifecycle::eligible_statuses(kind).iter().copied()))
        .exec(conn)
        .await?;

    if result.rows_affected != 1 {
        warn!("Asset {} changed under a running {} batch", asset.asset_code, kind);
        return Err(Error::ConcurrentModification {
            code: asset.asset_code.clone(),
        });
    }

    debug!("Asset {} -> {}", asset.asset_code, lifecycle::resulting_status(kind));
    Ok(())
}

fn set_target_holder(record: &mut flow_record::ActiveModel, holder: Option<&Holder>) {
    record.target_employee_name = Set(holder.map(|h| h.employee_name.clone()));
    record.target_employee_code = Set(holder.and_then(|h| h.employee_code.clone()));
    record.target_department_name = Set(holder.and_then(|h| h.department_name.clone()));
}

/// Retrieves the flow history of an asset, newest first. Ties on the timestamp are
/// broken by insertion order.
pub async fn get_flow_history<C>(db: &C, asset_id: i64) -> Result<Vec<flow_record::Model>>
where
    C: ConnectionTrait,
{
    FlowRecord::find()
        .filter(flow_record::Column::AssetId.eq(asset_id))
        .order_by_desc(flow_record::Column::OperationTime)
        .order_by_desc(flow_record::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Filters for [`list_flow_records`].
#[derive(Debug, Clone, Default)]
pub struct FlowRecordFilter {
    /// Only this operation kind
    pub kind: Option<OperationKind>,
    /// Only this asset
    pub asset_id: Option<i64>,
    /// Substring of the target employee name
    pub employee_contains: Option<String>,
    /// Substring of the related form number
    pub form_no_contains: Option<String>,
    /// Only this return type
    pub return_type: Option<ReturnType>,
    /// Maximum number of records
    pub limit: Option<u64>,
}

/// Lists flow records matching a filter, newest first.
pub async fn list_flow_records(
    db: &DatabaseConnection,
    filter: &FlowRecordFilter,
) -> Result<Vec<flow_record::Model>> {
    let mut condition = Condition::all();
    if let Some(kind) = filter.kind {
        condition = condition.add(flow_record::Column::OperationType.eq(kind));
    }
    if let Some(asset_id) = filter.asset_id {
        condition = condition.add(flow_record::Column::AssetId.eq(asset_id));
    }
    if let Some(name) = filter.employee_contains.as_deref() {
        condition = condition.add(flow_record::Column::TargetEmployeeName.contains(name));
    }
    if let Some(form_no) = filter.form_no_contains.as_deref() {
        condition = condition.add(flow_record::Column::RelatedFormNo.contains(form_no));
    }
    if let Some(return_type) = filter.return_type {
        condition = condition.add(flow_record::Column::ReturnType.eq(return_type));
    }

    FlowRecord::find()
        .filter(condition)
        .order_by_desc(flow_record::Column::OperationTime)
        .order_by_desc(flow_record::Column::Id)
        .limit(filter.limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Flow records that belong to one external form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowGroup {
    /// Shared form number; `None` for a standalone record
    pub form_no: Option<String>,
    /// Records in the group, in input order
    pub records: Vec<flow_record::Model>,
}

/// Collapses requisition records sharing a form number into one group.
///
/// Groups keep the position of their first record. Other kinds, and requisitions
/// without a form number, stay as single-record groups.
#[must_use]
pub fn group_by_form_number(records: Vec<flow_record::Model>) -> Vec<FlowGroup> {
    let mut groups: Vec<FlowGroup> = Vec::new();
    for record in records {
        let form_no = match (&record.operation_type, &record.related_form_no) {
            (OperationKind::Requisition, Some(form_no)) => Some(form_no.clone()),
            _ => None,
        };
        if let Some(form_no) = form_no {
            if let Some(group) = groups
                .iter_mut()
                .find(|g| g.form_no.as_deref() == Some(form_no.as_str()))
            {
                group.records.push(record);
                continue;
            }
            groups.push(FlowGroup {
                form_no: Some(form_no),
                records: vec![record],
            });
        } else {
            groups.push(FlowGroup {
                form_no: None,
                records: vec![record],
            });
        }
    }
    groups
}

/// Most recent flow records across all assets, with their asset.
pub async fn recent_flows(
    db: &DatabaseConnection,
    limit: u64,
) -> Result<Vec<(flow_record::Model, Option<asset::Model>)>> {
    FlowRecord::find()
        .find_also_related(Asset)
        .order_by_desc(flow_record::Column::OperationTime)
        .order_by_desc(flow_record::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Administrative delete of one flow record.
///
/// The asset's current-state fields are left as they are, so the asset may no longer
/// agree with its history afterwards; [`verify_asset_consistency`] reports that.
#[instrument(skip(db))]
pub async fn delete_flow_record(db: &DatabaseConnection, record_id: i64) -> Result<()> {
    let record = FlowRecord::find_by_id(record_id)
        .one(db)
        .await?
        .ok_or(Error::FlowRecordNotFound { id: record_id })?;

    let asset_id = record.asset_id;
    let kind = record.operation_type;
    record.delete(db).await?;

    warn!(
        "Flow record {record_id} ({kind}) of asset {asset_id} deleted; asset fields were not rolled back"
    );
    Ok(())
}

/// Result of comparing an asset's status with its latest flow record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsistencyReport {
    /// Asset id
    pub asset_id: i64,
    /// Asset code
    pub asset_code: String,
    /// Current status
    pub status: AssetStatus,
    /// Kind of the most recent flow record, if any
    pub latest_kind: Option<OperationKind>,
    /// Whether status matches the latest record
    pub consistent: bool,
}

/// Checks that an asset's status is the one its most recent flow record produces.
pub async fn verify_asset_consistency(
    db: &DatabaseConnection,
    asset_id: i64,
) -> Result<ConsistencyReport> {
    let asset = Asset::find_by_id(asset_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::AssetNotFound {
            reference: asset_id.to_string(),
        })?;

    let latest = FlowRecord::find()
        .filter(flow_record::Column::AssetId.eq(asset_id))
        .order_by_desc(flow_record::Column::OperationTime)
        .order_by_desc(flow_record::Column::Id)
        .one(db)
        .await?
        .map(|record| record.operation_type);

    Ok(ConsistencyReport {
        asset_id,
        asset_code: asset.asset_code,
        status: asset.status,
        latest_kind: latest,
        consistent: lifecycle::is_consistent(asset.status, latest),
    })
}

/// Audits every asset and returns the ones whose status disagrees with their history.
pub async fn find_inconsistent_assets(db: &DatabaseConnection) -> Result<Vec<ConsistencyReport>> {
    let ids: Vec<i64> = Asset::find()
        .order_by_asc(asset::Column::AssetCode)
        .all(db)
        .await?
        .into_iter()
        .map(|asset| asset.id)
        .collect();

    let mut inconsistent = Vec::new();
    for id in ids {
        let report = verify_asset_consistency(db, id).await?;
        if !report.consistent {
            inconsistent.push(report);
        }
    }
    Ok(inconsistent)
}
