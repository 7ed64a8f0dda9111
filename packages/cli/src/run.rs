//! Drives [`school_map_geocode::run_batch`] with progress bars.

use std::path::Path;
use std::time::Instant;

use school_map_cli_utils::{IndicatifProgress, MultiProgress};
use school_map_geocode::datasets::Dataset;
use school_map_geocode::{BatchPaths, GeocodeOptions, GeocodeRunError};
use school_map_geocoder::Geocoder;

/// Geocodes each dataset in turn.
///
/// A dataset whose files cannot be read or written is logged and skipped so
/// the remaining datasets still run.
///
/// # Errors
///
/// Returns an error naming the failed datasets if any batch failed.
#[allow(clippy::future_not_send)]
pub async fn run_datasets(
    multi: &MultiProgress,
    datasets: &[Dataset],
    data_dir: &Path,
    geocoder: &dyn Geocoder,
    options: &GeocodeOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();
    let total = datasets.len();
    let steps = IndicatifProgress::datasets_bar(multi, total as u64);
    let mut failed = Vec::new();

    for (i, ds) in datasets.iter().enumerate() {
        steps.set_message(format!("[{}/{total}] {}", i + 1, ds.name));
        log::info!("Processing {} ({})", ds.name, ds.id);

        if let Err(e) = run_one(multi, &ds.name, &ds.paths(data_dir), geocoder, options).await {
            log::error!("Failed to geocode {}: {e}", ds.id);
            failed.push(ds.id.clone());
        }

        steps.inc(1);
    }

    steps.finish(format!(
        "Geocoded {}/{total} dataset(s) in {:.1}s",
        total - failed.len(),
        start.elapsed().as_secs_f64()
    ));

    if failed.is_empty() {
        Ok(())
    } else {
        Err(format!("Geocoding failed for: {}", failed.join(", ")).into())
    }
}

/// Geocodes a single record file.
///
/// # Errors
///
/// Returns [`GeocodeRunError`] if the batch fails.
pub async fn run_file(
    multi: &MultiProgress,
    paths: &BatchPaths,
    geocoder: &dyn Geocoder,
    options: &GeocodeOptions,
) -> Result<(), GeocodeRunError> {
    let label = paths
        .input
        .file_name()
        .map_or_else(
            || paths.input.display().to_string(),
            |n| n.to_string_lossy().into_owned(),
        );
    run_one(multi, &label, paths, geocoder, options).await
}

async fn run_one(
    multi: &MultiProgress,
    label: &str,
    paths: &BatchPaths,
    geocoder: &dyn Geocoder,
    options: &GeocodeOptions,
) -> Result<(), GeocodeRunError> {
    let bar = IndicatifProgress::records_bar(multi, label);
    let start = Instant::now();

    let records = match school_map_geocode::run_batch(paths, geocoder, options, &bar).await {
        Ok(records) => records,
        Err(e) => {
            bar.finish(format!("{label} failed"));
            return Err(e);
        }
    };

    log::info!(
        "{label}: {} records in {:.1}s",
        records.len(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}
