//! Bounded per-category history of previously used values

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const DEFAULT_MAX_HISTORY: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoryCategory {
    ModelPackage,
    ClientPackage,
    SqlMapPackage,
}

impl HistoryCategory {
    pub const ALL: [HistoryCategory; 3] = [
        HistoryCategory::ModelPackage,
        HistoryCategory::ClientPackage,
        HistoryCategory::SqlMapPackage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryCategory::ModelPackage => "MODEL_PACKAGE",
            HistoryCategory::ClientPackage => "CLIENT_PACKAGE",
            HistoryCategory::SqlMapPackage => "SQL_MAP_PACKAGE",
        }
    }
}

impl fmt::Display for HistoryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Previously used values per category, most recent first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    entries: BTreeMap<HistoryCategory, Vec<String>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `value` under `category`.
    ///
    /// Blank values and values the category already holds are ignored.
    /// New values go to the front; the list is truncated to `max_entries`.
    /// Returns whether the history changed.
    pub fn append(&mut self, category: HistoryCategory, value: &str, max_entries: usize) -> bool {
        if value.trim().is_empty() || max_entries == 0 {
            return false;
        }

        let values = self.entries.entry(category).or_default();
        if values.iter().any(|existing| existing == value) {
            return false;
        }

        values.insert(0, value.to_string());
        values.truncate(max_entries);
        true
    }

    pub fn get(&self, category: HistoryCategory) -> &[String] {
        self.entries
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(Vec::is_empty)
    }

    /// Every category with its values, including empty ones
    pub fn to_map(&self) -> BTreeMap<HistoryCategory, Vec<String>> {
        HistoryCategory::ALL
            .into_iter()
            .map(|category| (category, self.get(category).to_vec()))
            .collect()
    }
}
