//! Unified error type for the asset ledger.
//!
//! Validation, not-found, storage and concurrency failures all surface through
//! [`Error`]. Batch eligibility failures are not errors; they are reported in
//! [`crate::core::ledger::BatchOutcome`] so callers can list every rejected asset.

use thiserror::Error;

/// Every failure the ledger and its command surface can report.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// Storage layer failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Referenced asset does not exist
    #[error("Asset not found: {reference}")]
    AssetNotFound {
        /// Id or code the caller used
        reference: String,
    },

    /// Referenced flow record does not exist
    #[error("Flow record not found: {id}")]
    FlowRecordNotFound {
        /// Flow record id
        id: i64,
    },

    /// Referenced dictionary item does not exist
    #[error("Dictionary item not found: {id}")]
    DictionaryItemNotFound {
        /// Dictionary item id
        id: i64,
    },

    /// Referenced category does not exist
    #[error("Category not found: {reference}")]
    CategoryNotFound {
        /// Id or name the caller used
        reference: String,
    },

    /// Referenced procurement contract does not exist
    #[error("Procurement contract not found: {reference}")]
    ContractNotFound {
        /// Id or project name the caller used
        reference: String,
    },

    /// Asset codes are unique
    #[error("Asset code already in use: {code}")]
    DuplicateAssetCode {
        /// The conflicting code
        code: String,
    },

    /// Monetary amount is negative or not finite
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// An operation-specific field is required but absent
    #[error("Missing required field: {field}")]
    MissingField {
        /// Name of the missing field
        field: &'static str,
    },

    /// An operation payload is malformed
    #[error("Invalid operation payload: {message}")]
    InvalidPayload {
        /// What is wrong with the payload
        message: String,
    },

    /// The asset changed status between validation and write
    #[error("Asset {code} was modified concurrently; no changes were applied")]
    ConcurrentModification {
        /// Code of the asset that lost eligibility
        code: String,
    },

    /// I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or unreadable environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Text formatting failure while building a reply
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Numeric conversion overflow
    #[error("Integer conversion error: {0}")]
    IntConversion(#[from] std::num::TryFromIntError),

    /// Discord framework failure
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
