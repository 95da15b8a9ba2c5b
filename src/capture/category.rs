//! Mapping from the model's Korean category labels to storage keys.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Storage key used for labels the vocabulary does not know.
pub const FALLBACK_CATEGORY_KEY: &str = "other";

/// Translates display category labels into inventory storage keys.
///
/// The table is plain data so deployments can extend it from the pipeline
/// config; lookups never fail and unknown labels land in `fallback`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryVocabulary {
    labels: BTreeMap<String, String>,
    #[serde(default = "default_fallback")]
    fallback: String,
}

fn default_fallback() -> String {
    FALLBACK_CATEGORY_KEY.to_string()
}

impl Default for CategoryVocabulary {
    fn default() -> Self {
        let labels = [
            ("과일", "fruits"),
            ("채소", "vegetables"),
            ("육류", "meat"),
            ("유제품", "dairy"),
            ("곡물", "grains"),
            ("음료", "beverages"),
            ("조미료", "condiments"),
            ("냉동", "frozen"),
            ("기타", "other"),
        ]
        .into_iter()
        .map(|(label, key)| (label.to_string(), key.to_string()))
        .collect();

        Self {
            labels,
            fallback: default_fallback(),
        }
    }
}

impl CategoryVocabulary {
    /// Builds a vocabulary from explicit `(label, key)` pairs.
    pub fn from_pairs<I, L, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (L, K)>,
        L: Into<String>,
        K: Into<String>,
    {
        Self {
            labels: pairs
                .into_iter()
                .map(|(label, key)| (label.into(), key.into()))
                .collect(),
            fallback: default_fallback(),
        }
    }

    /// Returns the storage key for `label`, or the fallback key.
    pub fn translate(&self, label: &str) -> &str {
        self.labels
            .get(label.trim())
            .map(String::as_str)
            .unwrap_or(&self.fallback)
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
