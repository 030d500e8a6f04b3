/// Asset intake, lookups and non-lifecycle edits
pub mod asset;
/// Procurement contracts and their suppliers
pub mod contract;
/// Category and dictionary item management, catalogue seeding
pub mod dictionary;
/// Category, brand and model rollups, lifespan buckets and scrap candidates
pub mod dashboard;
/// Batch execution of lifecycle operations and flow record queries
pub mod ledger;
/// Lifecycle state machine rules
pub mod lifecycle;
/// Typed operation payloads and operator context
pub mod operation;
/// Formatting helpers for chat responses
pub mod report;
/// Stagnant asset detection
pub mod stagnant;
