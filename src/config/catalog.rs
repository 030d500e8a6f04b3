//! Catalogue and ledger settings loaded from config.toml
//!
//! The `[[categories]]`, `[[contracts]]` and `[[dictionary]]` tables seed the catalogue
//! on first run; `[ledger]` holds tunables such as the default stagnant-inventory window.

use crate::errors::{Error, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::Path;

/// Default lookback window for stagnant inventory, in days
pub const DEFAULT_STAGNANT_DAYS: u32 = 90;

/// Default age in years after which an asset becomes a scrap candidate
pub const DEFAULT_SCRAP_AGE_YEARS: u32 = 4;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Ledger tunables
    #[serde(default)]
    pub ledger: LedgerSettings,
    /// Categories to seed
    #[serde(default)]
    pub categories: Vec<CategoryConfig>,
    /// Procurement contracts to seed
    #[serde(default)]
    pub contracts: Vec<ContractConfig>,
    /// Dictionary items to seed
    #[serde(default)]
    pub dictionary: Vec<DictionaryItemConfig>,
}

/// Ledger tunables
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LedgerSettings {
    /// Default stagnant-inventory lookback window in days
    #[serde(default = "default_stagnant_days")]
    pub stagnant_days: u32,
    /// Age in years at which assets are listed as scrap candidates
    #[serde(default = "default_scrap_age_years")]
    pub scrap_age_years: u32,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            stagnant_days: DEFAULT_STAGNANT_DAYS,
            scrap_age_years: DEFAULT_SCRAP_AGE_YEARS,
        }
    }
}

const fn default_stagnant_days() -> u32 {
    DEFAULT_STAGNANT_DAYS
}

const fn default_scrap_age_years() -> u32 {
    DEFAULT_SCRAP_AGE_YEARS
}

/// Configuration for a single category
#[derive(Debug, Deserialize, Clone)]
pub struct CategoryConfig {
    /// Display name (unique)
    pub name: String,
    /// Short code
    pub code: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
}

/// Configuration for a procurement contract
#[derive(Debug, Deserialize, Clone)]
pub struct ContractConfig {
    /// Project name (unique)
    pub project_name: String,
    /// Project date, e.g. `"2026-03-01"`
    #[serde(default)]
    pub project_time: Option<NaiveDate>,
    /// Budget management number
    #[serde(default)]
    pub bm_number: Option<String>,
    /// Purchase order number
    #[serde(default)]
    pub procurement_order: Option<String>,
    /// Notes
    #[serde(default)]
    pub description: Option<String>,
    /// Suppliers awarded the contract
    #[serde(default)]
    pub suppliers: Vec<ContractSupplierConfig>,
}

/// A supplier listed under `[[contracts.suppliers]]`
#[derive(Debug, Deserialize, Clone)]
pub struct ContractSupplierConfig {
    /// Supplier name
    pub name: String,
    /// Contact at the supplier
    #[serde(default)]
    pub contact_person: Option<String>,
    /// Contact phone number
    #[serde(default)]
    pub contact_phone: Option<String>,
    /// Notes
    #[serde(default)]
    pub remarks: Option<String>,
}

/// Configuration for a single dictionary item
#[derive(Debug, Deserialize, Clone)]
pub struct DictionaryItemConfig {
    /// Equipment name
    pub equipment_name: String,
    /// Name of the category this item belongs to
    #[serde(default)]
    pub category: Option<String>,
    /// Project name of the contract this item was priced under
    #[serde(default)]
    pub contract: Option<String>,
    /// Procurement project
    #[serde(default)]
    pub project_name: Option<String>,
    /// Brand
    #[serde(default)]
    pub brand: Option<String>,
    /// Model designation
    #[serde(default)]
    pub model: Option<String>,
    /// Unit of measure
    #[serde(default)]
    pub unit: Option<String>,
    /// Contract unit price
    pub price: f64,
    /// Tax rate in percent
    #[serde(default)]
    pub tax_rate: Option<f64>,
    /// Supplier
    #[serde(default)]
    pub supplier: Option<String>,
    /// Expected service life in years
    #[serde(default)]
    pub usage_years: Option<i32>,
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads configuration from `./config.toml`, falling back to defaults when the file is absent.
pub fn load_default_config() -> Result<Config> {
    let path = Path::new("config.toml");
    if !path.exists() {
        tracing::warn!("config.toml not found, using built-in defaults");
        return Ok(Config::default());
    }
    load_config(path)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_parse_catalog_config() {
        let toml_str = r#"
            [ledger]
            stagnant_days = 60

            [[categories]]
            name = "Computers"
            code = "PC"

            [[categories]]
            name = "Furniture"
            code = "FN"
            description = "Desks and chairs"

            [[contracts]]
            project_name = "Office Refresh"
            project_time = "2026-03-01"
            procurement_order = "PO-001"

            [[contracts.suppliers]]
            name = "Acme Supplies"
            contact_phone = "555-0100"

            [[dictionary]]
            equipment_name = "Laptop"
            category = "Computers"
            contract = "Office Refresh"
            brand = "Lenovo"
            model = "T14"
            unit = "台"
            price = 6999.0
            tax_rate = 13.0
            supplier = "Acme Supplies"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.ledger.stagnant_days, 60);
        assert_eq!(config.ledger.scrap_age_years, DEFAULT_SCRAP_AGE_YEARS);
        assert_eq!(config.categories.len(), 2);
        assert_eq!(config.categories[1].description.as_deref(), Some("Desks and chairs"));
        assert_eq!(config.dictionary.len(), 1);
        assert_eq!(config.dictionary[0].price, 6999.0);
        assert_eq!(config.dictionary[0].model.as_deref(), Some("T14"));
        assert!(config.dictionary[0].project_name.is_none());
        assert_eq!(config.dictionary[0].contract.as_deref(), Some("Office Refresh"));

        assert_eq!(config.contracts.len(), 1);
        let contract = &config.contracts[0];
        assert_eq!(contract.project_time, NaiveDate::from_ymd_opt(2026, 3, 1));
        assert!(contract.bm_number.is_none());
        assert_eq!(contract.suppliers.len(), 1);
        assert_eq!(contract.suppliers[0].contact_phone.as_deref(), Some("555-0100"));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.ledger.stagnant_days, DEFAULT_STAGNANT_DAYS);
        assert!(config.categories.is_empty());
        assert!(config.contracts.is_empty());
        assert!(config.dictionary.is_empty());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("does/not/exist.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
