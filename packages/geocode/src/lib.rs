#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Checkpointed batch geocoding of school records.
//!
//! [`run_batch`] takes one cleaned record file through the geocode stage:
//!
//! 1. Load the checkpoint if one exists (resume), else the input file.
//! 2. Prime a [`ResolutionCache`] from records that already have valid
//!    coordinates.
//! 3. Resolve every record concurrently (at most
//!    [`GeocodeOptions::workers`] in flight), writing each coordinate back
//!    as it completes. Records that already carry an in-bounds coordinate
//!    keep it.
//! 4. Snapshot the whole record set every [`GeocodeOptions::save_every`]
//!    completions and after the last one.
//! 5. Write the output file and discard the checkpoint.
//!
//! A record that cannot be resolved gets the `0.0, 0.0` sentinel; only I/O
//! and JSON errors on the batch files abort a run.

pub mod cache;
pub mod checkpoint;
pub mod datasets;
pub mod paths;
pub mod progress;
pub mod resolve;

#[cfg(test)]
pub(crate) mod test_utils;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt as _};
use school_map_geocoder::Geocoder;
use school_map_school_models::{Coordinate, SchoolRecord};
use thiserror::Error;

pub use cache::ResolutionCache;
use progress::ProgressCallback;

/// Errors that abort a batch run.
#[derive(Debug, Error)]
pub enum GeocodeRunError {
    /// Reading or writing a batch file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File or directory involved.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A batch file could not be (de)serialized.
    #[error("JSON error in {path}: {source}")]
    Json {
        /// File involved.
        path: String,
        /// Underlying error.
        source: serde_json::Error,
    },
}

impl GeocodeRunError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    pub(crate) fn json(path: &Path, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Tuning knobs for a batch run.
#[derive(Debug, Clone)]
pub struct GeocodeOptions {
    /// Maximum number of records resolved concurrently.
    pub workers: usize,
    /// Completions between checkpoint snapshots.
    pub save_every: usize,
    /// Pause each worker takes after finishing a record.
    pub delay: Duration,
    /// Retry with the Arabic query when the Latin one fails.
    pub fallback: bool,
}

impl Default for GeocodeOptions {
    fn default() -> Self {
        Self {
            workers: 5,
            save_every: 50,
            delay: Duration::from_millis(50),
            fallback: true,
        }
    }
}

/// Files involved in one batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPaths {
    /// Cleaned records from the transform stage.
    pub input: PathBuf,
    /// Geocoded records.
    pub output: PathBuf,
    /// In-progress snapshot; present only while a run is incomplete.
    pub checkpoint: PathBuf,
}

/// Geocodes the records at `paths.input` (or resumes from
/// `paths.checkpoint`) and writes them to `paths.output`.
///
/// Returns the final record set.
///
/// # Errors
///
/// Returns [`GeocodeRunError`] if the input or checkpoint cannot be read,
/// a checkpoint cannot be written, or the output cannot be written.
pub async fn run_batch(
    paths: &BatchPaths,
    geocoder: &dyn Geocoder,
    options: &GeocodeOptions,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<SchoolRecord>, GeocodeRunError> {
    let (mut records, resumed) = checkpoint::load_or_resume(&paths.input, &paths.checkpoint)?;
    log::info!("Total records to process: {}", records.len());

    if resumed {
        let pending = count_unresolved(&records);
        log::info!(
            "{} records already resolved, {pending} left",
            records.len() - pending
        );
        progress.set_message(format!("Resuming ({pending} left)"));
    }

    geocode_records(&mut records, &paths.checkpoint, geocoder, options, progress).await?;

    checkpoint::save(&paths.output, &records)?;
    checkpoint::discard(&paths.checkpoint);

    let unresolved = count_unresolved(&records);
    log::info!(
        "Geocoding completed: {} records written to {} ({unresolved} unresolved)",
        records.len(),
        paths.output.display()
    );
    progress.finish(format!(
        "{} records geocoded, {unresolved} unresolved",
        records.len()
    ));

    Ok(records)
}

/// Resolves every record in place, snapshotting to `checkpoint_path` as
/// completions accumulate.
///
/// Records are dispatched in order but complete in any order. Snapshots
/// only ever contain coordinates of completed records.
///
/// # Errors
///
/// Returns [`GeocodeRunError`] if a checkpoint cannot be written.
pub async fn geocode_records(
    records: &mut [SchoolRecord],
    checkpoint_path: &Path,
    geocoder: &dyn Geocoder,
    options: &GeocodeOptions,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<(), GeocodeRunError> {
    let total = records.len();
    progress.set_total(total as u64);

    let cache = ResolutionCache::primed(records, geocoder.bounds());
    let jobs: Vec<(usize, SchoolRecord)> = records.iter().cloned().enumerate().collect();
    let save_every = options.save_every.max(1);

    let cache = &cache;
    let mut completions = stream::iter(jobs.into_iter().map(|(idx, record)| async move {
        let coord = resolve::resolve_record(&record, geocoder, cache, options.fallback).await;
        tokio::time::sleep(options.delay).await;
        (idx, coord)
    }))
    .buffer_unordered(options.workers.max(1));

    let mut completed = 0usize;
    let mut since_save = 0usize;

    while let Some((idx, coord)) = completions.next().await {
        if coord.is_unresolved() {
            log::debug!("Record {idx} unresolved: '{}'", records[idx].name_latin);
        }
        records[idx].set_coordinate(coord);
        completed += 1;
        since_save += 1;
        progress.inc(1);

        if since_save >= save_every || completed == total {
            checkpoint::save(checkpoint_path, records)?;
            since_save = 0;
            log::info!("Progress saved at record {completed}/{total}");
        }
    }

    Ok(())
}

/// Counts records without a usable coordinate.
#[must_use]
pub fn count_unresolved(records: &[SchoolRecord]) -> usize {
    records
        .iter()
        .filter(|r| r.coordinate().is_none_or(Coordinate::is_unresolved))
        .count()
}
