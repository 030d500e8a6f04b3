//! Discord interaction handlers
//!
//! This module provides handlers for Discord interactions such as autocomplete.

/// Autocomplete handlers for asset codes, categories and dictionary projects
pub mod autocomplete;
