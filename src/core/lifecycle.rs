//! Asset lifecycle state machine.
//!
//! Pure rules, no I/O: which statuses each operation kind accepts, which status it
//! produces, what happens to the holder/location fields, and whether an asset's
//! status agrees with its most recent flow record.
//!
//! | Operation   | Eligible from                   | Result    | Holder/location |
//! |-------------|---------------------------------|-----------|-----------------|
//! | inbound     | (new asset)                     | in_stock  | cleared         |
//! | requisition | in_stock, not faulty            | in_use    | assigned        |
//! | borrow      | in_stock, not faulty            | in_use    | assigned        |
//! | return      | in_use                          | in_stock  | cleared         |
//! | transfer    | in_use                          | in_use    | assigned        |
//! | scrap       | in_stock, in_use, maintenance   | scrapped  | unchanged       |
//! | dispose     | scrapped, cleared (disposed)    | cleared   | unchanged       |

use crate::entities::{AssetStatus, OperationKind, asset};
use std::fmt;

/// What an operation does to the holder and location fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HolderPolicy {
    /// Overwrite with the operation's target
    Assign,
    /// Set to null
    Clear,
    /// Leave untouched
    Keep,
}

/// Why an asset cannot take part in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// No asset with the requested id or code
    NotFound,
    /// Requisition and borrow skip faulty assets
    Faulty,
    /// The asset is already in the status the operation would produce
    AlreadyInStatus(AssetStatus),
    /// The asset's status is not in the operation's eligible set
    IneligibleStatus {
        /// Status the asset is currently in
        current: AssetStatus,
        /// Operation that was requested
        kind: OperationKind,
    },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => f.write_str("asset not found"),
            Self::Faulty => f.write_str("asset is marked faulty"),
            Self::AlreadyInStatus(status) => write!(f, "asset already {status}"),
            Self::IneligibleStatus { current, kind } => {
                let allowed: Vec<&str> = eligible_statuses(*kind)
                    .iter()
                    .map(|status| status.as_str())
                    .collect();
                write!(
                    f,
                    "asset is {current}; {kind} requires one of [{}]",
                    allowed.join(", ")
                )
            }
        }
    }
}

/// Statuses from which an operation kind may start. Empty for `inbound`, which only
/// applies to newly created assets.
#[must_use]
pub const fn eligible_statuses(kind: OperationKind) -> &'static [AssetStatus] {
    match kind {
        OperationKind::Inbound => &[],
        OperationKind::Requisition | OperationKind::Borrow => &[AssetStatus::InStock],
        OperationKind::Return | OperationKind::Transfer => &[AssetStatus::InUse],
        OperationKind::Scrap => &[
            AssetStatus::InStock,
            AssetStatus::InUse,
            AssetStatus::Maintenance,
        ],
        OperationKind::Dispose => &[
            AssetStatus::Scrapped,
            AssetStatus::Cleared,
            AssetStatus::Disposed,
        ],
    }
}

/// Whether faulty assets are excluded from the operation.
#[must_use]
pub const fn excludes_faulty(kind: OperationKind) -> bool {
    matches!(kind, OperationKind::Requisition | OperationKind::Borrow)
}

/// Status an asset ends up in after the operation.
#[must_use]
pub const fn resulting_status(kind: OperationKind) -> AssetStatus {
    match kind {
        OperationKind::Inbound | OperationKind::Return => AssetStatus::InStock,
        OperationKind::Requisition | OperationKind::Borrow | OperationKind::Transfer => {
            AssetStatus::InUse
        }
        OperationKind::Scrap => AssetStatus::Scrapped,
        OperationKind::Dispose => AssetStatus::Cleared,
    }
}

/// Field policy for holder and location columns.
#[must_use]
pub const fn holder_policy(kind: OperationKind) -> HolderPolicy {
    match kind {
        OperationKind::Requisition | OperationKind::Borrow | OperationKind::Transfer => {
            HolderPolicy::Assign
        }
        OperationKind::Inbound | OperationKind::Return => HolderPolicy::Clear,
        OperationKind::Scrap | OperationKind::Dispose => HolderPolicy::Keep,
    }
}

/// Checks one asset against the eligibility rules of an operation kind.
pub fn check_eligibility(kind: OperationKind, asset: &asset::Model) -> Result<(), RejectReason> {
    if !eligible_statuses(kind).contains(&asset.status) {
        let target = resulting_status(kind);
        if asset.status.canonical() == target {
            return Err(RejectReason::AlreadyInStatus(target));
        }
        return Err(RejectReason::IneligibleStatus {
            current: asset.status,
            kind,
        });
    }
    if excludes_faulty(kind) && asset.is_faulty {
        return Err(RejectReason::Faulty);
    }
    Ok(())
}

/// Whether an asset's status agrees with the kind of its most recent flow record.
///
/// Assets without any record are accepted as consistent.
#[must_use]
pub fn is_consistent(status: AssetStatus, latest: Option<OperationKind>) -> bool {
    latest.is_none_or(|kind| resulting_status(kind) == status.canonical())
}
