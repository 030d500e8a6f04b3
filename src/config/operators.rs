//! Operator display names loaded from environment variables.
//!
//! Flow records are stamped with a human-readable operator name. Pairs of
//! `OPERATOR_ID_<n>` / `OPERATOR_NAME_<n>` (n = 1, 2, ...) in the `.env` file map
//! chat user ids to those names; unmapped users fall back to their chat username.

use std::collections::HashMap;

/// Reads `OPERATOR_ID_<n>` / `OPERATOR_NAME_<n>` pairs until the first missing index.
#[must_use]
pub fn get_operator_names() -> HashMap<String, String> {
    collect_operator_names(|key| std::env::var(key).ok())
}

/// Gets the configured display name for a user id, if any.
#[must_use]
pub fn get_operator_name(user_id: &str) -> Option<String> {
    get_operator_names().get(user_id).cloned()
}

fn collect_operator_names<F>(lookup: F) -> HashMap<String, String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut names = HashMap::new();

    for index in 1.. {
        let Some(user_id) = lookup(&format!("OPERATOR_ID_{index}")) else {
            break;
        };
        if let Some(name) = lookup(&format!("OPERATOR_NAME_{index}")) {
            names.insert(user_id, name);
        }
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_collect_operator_names() {
        let names = collect_operator_names(lookup_from(&[
            ("OPERATOR_ID_1", "1001"),
            ("OPERATOR_NAME_1", "王五"),
            ("OPERATOR_ID_2", "1002"),
            ("OPERATOR_NAME_2", "赵六"),
        ]));
        assert_eq!(names.len(), 2);
        assert_eq!(names.get("1001").map(String::as_str), Some("王五"));
        assert_eq!(names.get("1002").map(String::as_str), Some("赵六"));
    }

    #[test]
    fn test_collect_stops_at_first_gap() {
        let names = collect_operator_names(lookup_from(&[
            ("OPERATOR_ID_1", "1001"),
            ("OPERATOR_NAME_1", "王五"),
            ("OPERATOR_ID_3", "1003"),
            ("OPERATOR_NAME_3", "孙七"),
        ]));
        assert_eq!(names.len(), 1);
        assert!(!names.contains_key("1003"));
    }

    #[test]
    fn test_id_without_name_is_skipped() {
        let names = collect_operator_names(lookup_from(&[
            ("OPERATOR_ID_1", "1001"),
            ("OPERATOR_ID_2", "1002"),
            ("OPERATOR_NAME_2", "赵六"),
        ]));
        assert_eq!(names.len(), 1);
        assert_eq!(names.get("1002").map(String::as_str), Some("赵六"));
    }
}
