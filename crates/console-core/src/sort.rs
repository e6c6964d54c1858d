use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PolicyEntry {
    pub name: Option<String>,
}

impl PolicyEntry {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEntry {
    pub access_key: String,
}

/// Ascending by name. An empty name sorts before every other defined name;
/// a missing name sorts after all of them.
pub fn policy_sort(a: &PolicyEntry, b: &PolicyEntry) -> Ordering {
    match (&a.name, &b.name) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn users_sort(a: &UserEntry, b: &UserEntry) -> Ordering {
    a.access_key.cmp(&b.access_key)
}

pub fn string_sort(a: &str, b: &str) -> Ordering {
    a.cmp(b)
}
