//! Tracked-file descriptor.
//!
//! A project descriptor is a JSON map of category label to the set of
//! repository-relative paths in that category, e.g.
//!
//! ```json
//! { "protocol": ["src/wire.rs"], "proof": ["proofs/safety.tla"] }
//! ```
//!
//! Only the validator and the report consume it; the normalizer never does.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a descriptor.
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("failed to read descriptor file")]
    Io(#[from] std::io::Error),

    #[error("failed to parse descriptor JSON")]
    Json(#[from] serde_json::Error),

    #[error("path `{path}` appears in categories `{first}` and `{second}`")]
    DuplicatePath {
        path: String,
        first: String,
        second: String,
    },
}

/// Category label to tracked path set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Descriptor {
    categories: BTreeMap<String, BTreeSet<String>>,
}

impl Descriptor {
    /// Builds a descriptor, rejecting paths listed under two categories.
    pub fn new(
        categories: BTreeMap<String, BTreeSet<String>>,
    ) -> Result<Self, DescriptorError> {
        let mut seen: BTreeMap<&str, &str> = BTreeMap::new();
        for (category, paths) in &categories {
            for path in paths {
                if let Some(first) = seen.insert(path, category) {
                    return Err(DescriptorError::DuplicatePath {
                        path: path.clone(),
                        first: first.to_string(),
                        second: category.clone(),
                    });
                }
            }
        }
        Ok(Self { categories })
    }

    /// Loads and validates a descriptor from a JSON file.
    pub fn load(path: &Path) -> Result<Self, DescriptorError> {
        let text = fs::read_to_string(path)?;
        let categories: BTreeMap<String, BTreeSet<String>> = serde_json::from_str(&text)?;
        let descriptor = Self::new(categories)?;
        tracing::debug!(
            categories = descriptor.categories.len(),
            paths = descriptor.tracked_path_count(),
            "loaded descriptor"
        );
        Ok(descriptor)
    }

    /// The category a path is tracked under, if any.
    #[must_use]
    pub fn category_of(&self, path: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|(_, paths)| paths.contains(path))
            .map(|(category, _)| category.as_str())
    }

    /// Whether a path is tracked under any category.
    #[must_use]
    pub fn is_tracked(&self, path: &str) -> bool {
        self.category_of(path).is_some()
    }

    /// Category labels in sorted order.
    pub fn category_labels(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    #[must_use]
    pub fn tracked_path_count(&self) -> usize {
        self.categories.values().map(BTreeSet::len).sum()
    }
}
