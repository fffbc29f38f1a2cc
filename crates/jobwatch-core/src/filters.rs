//! Category and keyword filtering.
//!
//! The store implementations only persist; the rules for reconciling a
//! category refresh and normalising keyword input live here so every store
//! behaves identically.

use std::collections::HashSet;

use crate::models::{Category, JobDetail, NewCategory};
use crate::platform::Platform;

/// The selected categories and keywords gating one polling cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSet {
    pub platform: Platform,
    /// Selected categories only.
    pub categories: Vec<Category>,
    pub keywords: Vec<String>,
}

impl FilterSet {
    /// Build a filter set from everything stored for a platform, keeping selected categories.
    pub fn new(platform: Platform, categories: Vec<Category>, keywords: Vec<String>) -> Self {
        Self {
            platform,
            categories: categories.into_iter().filter(|c| c.selected).collect(),
            keywords,
        }
    }

    pub fn has_selection(&self) -> bool {
        !self.categories.is_empty()
    }

    /// External keys of the selected categories, in store order.
    pub fn selected_keys(&self) -> Vec<&str> {
        self.categories
            .iter()
            .map(|c| c.external_key.as_str())
            .collect()
    }

    pub fn is_selected(&self, external_key: &str) -> bool {
        self.categories.iter().any(|c| c.external_key == external_key)
    }

    /// Whether a fetched job should be delivered.
    ///
    /// An empty keyword set admits everything; otherwise any keyword must occur
    /// (case-insensitively) in the title, the description or one of the skills.
    pub fn matches(&self, job: &JobDetail) -> bool {
        if self.keywords.is_empty() {
            return true;
        }
        let title = job.title.to_lowercase();
        let description = job.description.to_lowercase();
        let skills: Vec<String> = job.skills.iter().map(|s| s.to_lowercase()).collect();

        self.keywords.iter().any(|keyword| {
            let keyword = keyword.to_lowercase();
            title.contains(&keyword)
                || description.contains(&keyword)
                || skills.iter().any(|s| s.contains(&keyword))
        })
    }
}

/// Reconcile a fresh category list against the stored one.
///
/// - `selected` carries over from the stored category with the same `name`
///   (key schemes can change between refreshes, names are stable)
/// - categories new to the store start unselected
/// - stored categories missing from `incoming` are dropped
/// - repeated `external_key`s in `incoming` collapse to the first occurrence
pub fn reconcile_categories(
    platform: Platform,
    existing: &[Category],
    incoming: Vec<NewCategory>,
) -> Vec<Category> {
    let mut seen = HashSet::new();
    incoming
        .into_iter()
        .filter(|c| seen.insert(c.external_key.clone()))
        .map(|c| {
            let selected = existing
                .iter()
                .any(|e| e.platform == platform && e.name == c.name && e.selected);
            Category {
                platform,
                name: c.name,
                external_key: c.external_key,
                selected,
            }
        })
        .collect()
}

/// Trim, drop empties and collapse duplicates, preserving first-seen order.
pub fn normalize_keywords<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    values
        .into_iter()
        .map(|v| v.as_ref().trim().to_string())
        .filter(|v| !v.is_empty())
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

/// Split free-form keyword input (commas or newlines) into normalised keywords.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    normalize_keywords(raw.split([',', '\n']))
}
