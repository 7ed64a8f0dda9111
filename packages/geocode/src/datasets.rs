//! Registry of the school datasets the geocoder processes.
//!
//! Datasets are listed in `datasets.toml`, embedded at compile time, and
//! processed in file order by a full run.

use std::path::Path;

use serde::Deserialize;

use crate::BatchPaths;
use crate::paths::{clean_dir, geocoded_dir};

/// One cleaned extract to geocode.
#[derive(Debug, Clone, Deserialize)]
pub struct Dataset {
    /// Identifier and file-name stem (e.g., `"public_primaire"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
}

impl Dataset {
    /// Input, output, and checkpoint paths for this dataset under
    /// `data_dir`.
    #[must_use]
    pub fn paths(&self, data_dir: &Path) -> BatchPaths {
        let geocoded = geocoded_dir(data_dir);
        BatchPaths {
            input: clean_dir(data_dir).join(format!("{}_clean.json", self.id)),
            output: geocoded.join(format!("{}_geocoded.json", self.id)),
            checkpoint: geocoded.join(format!("{}_geocoded_temp.json", self.id)),
        }
    }
}

#[derive(Deserialize)]
struct Registry {
    dataset: Vec<Dataset>,
}

const DATASETS_TOML: &str = include_str!("../datasets.toml");

/// Returns every registered dataset in processing order.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed (this is a compile-time
/// guarantee since the registry is embedded).
#[must_use]
pub fn all_datasets() -> Vec<Dataset> {
    toml::de::from_str::<Registry>(DATASETS_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse dataset registry: {e}"))
        .dataset
}

/// Looks up a dataset by id.
#[must_use]
pub fn find_dataset(id: &str) -> Option<Dataset> {
    all_datasets().into_iter().find(|d| d.id == id)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn registers_the_public_datasets_in_order() {
        let ids: Vec<String> = all_datasets().into_iter().map(|d| d.id).collect();
        assert_eq!(ids, ["public_primaire", "public_college", "public_lycee"]);
    }

    #[test]
    fn dataset_ids_are_unique() {
        let mut seen = BTreeSet::new();
        for ds in all_datasets() {
            assert!(!ds.name.is_empty(), "Dataset {} has empty name", ds.id);
            assert!(seen.insert(ds.id.clone()), "Duplicate dataset ID: {}", ds.id);
        }
    }

    #[test]
    fn builds_stage_paths() {
        let ds = find_dataset("public_lycee").unwrap();
        let paths = ds.paths(Path::new("data"));
        assert_eq!(
            paths.input,
            Path::new("data/json/clean/public_lycee_clean.json")
        );
        assert_eq!(
            paths.output,
            Path::new("data/json/geocoded/public_lycee_geocoded.json")
        );
        assert_eq!(
            paths.checkpoint,
            Path::new("data/json/geocoded/public_lycee_geocoded_temp.json")
        );
    }

    #[test]
    fn unknown_dataset_is_none() {
        assert!(find_dataset("private_primaire").is_none());
    }
}
