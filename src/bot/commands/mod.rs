//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Asset registration and lookup commands
pub mod asset;

/// Dictionary browsing commands
pub mod dictionary;

/// General utility commands
pub mod general;

/// Lifecycle operation commands
pub mod operation;

/// Stagnant, dashboard and rollup reports
pub mod report;

// Export commands
pub use asset::*;
pub use dictionary::*;
pub use general::*;
pub use operation::*;
pub use report::*;
