/// Database configuration and connection management
pub mod database;

/// Catalogue seed data and ledger settings from config.toml
pub mod catalog;

/// Operator display names from environment variables
pub mod operators;
