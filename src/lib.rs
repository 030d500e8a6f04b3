//! Asset ledger - lifecycle tracking for physical assets, driven from Discord
//!
//! The crate keeps each asset's current state (status, holder, location) together with
//! an append-only history of flow records, enforces the lifecycle state machine for
//! batch operations, and provides stagnant-inventory detection and dashboard rollups.

#![deny(
    unsafe_code,
    unsafe_op_in_unsafe_fn,
    unreachable_code,
    unreachable_patterns,
    unused_must_use,
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    // Panics and leftovers never belong in ledger code
    clippy::dbg_macro,
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    // Money is f64; compare with a tolerance
    clippy::float_cmp,
    clippy::large_enum_variant,
    clippy::needless_pass_by_value,
    clippy::too_many_lines,
    clippy::wildcard_imports,
    future_incompatible,
    rust_2018_idioms,
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    // serenity::Error is boxed inside errors::Error but the enum stays wide
    clippy::result_large_err,
)]

/// Discord bot interface - commands, handlers, and bot context
pub mod bot;
/// Configuration management for database and application settings
pub mod config;
/// Core business logic - framework-agnostic lifecycle, ledger, catalogue and reporting operations
pub mod core;
/// SeaORM entity definitions for database tables
pub mod entities;
/// Unified error types and result handling
pub mod errors;

#[cfg(test)]
pub mod test_utils;
