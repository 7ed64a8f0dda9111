#![allow(clippy::module_name_repetitions)]
//! Canonical file paths for the pipeline's `data/` directory.
//!
//! Defaults to `<project root>/data`; set `SCHOOL_MAP_DATA_DIR` to use a
//! different directory.

use std::path::{Path, PathBuf};

/// Environment variable overriding [`data_dir`].
pub const DATA_DIR_ENV: &str = "SCHOOL_MAP_DATA_DIR";

/// Returns the workspace root directory.
///
/// Resolved at compile time from `CARGO_MANIFEST_DIR`.
#[must_use]
pub fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Returns the `data/` directory path.
#[must_use]
pub fn data_dir() -> PathBuf {
    std::env::var_os(DATA_DIR_ENV)
        .filter(|v| !v.is_empty())
        .map_or_else(|| project_root().join("data"), PathBuf::from)
}

/// Returns the `json/clean/` directory holding transform-stage output.
#[must_use]
pub fn clean_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("json").join("clean")
}

/// Returns the `json/geocoded/` directory for geocoder output and
/// checkpoints.
#[must_use]
pub fn geocoded_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("json").join("geocoded")
}
