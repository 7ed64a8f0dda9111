//! Interactive dataset picker.
//!
//! Prompts for the datasets to geocode and, optionally, the tuning
//! parameters, then runs them with progress bars.

use std::path::{Path, PathBuf};
use std::time::Duration;

use dialoguer::{Confirm, Input, MultiSelect};
use school_map_cli_utils::MultiProgress;
use school_map_geocode::GeocodeOptions;
use school_map_geocode::datasets::all_datasets;

use crate::build_geocoder;
use crate::run::run_datasets;

/// Runs the interactive flow.
///
/// # Errors
///
/// Returns an error if a prompt fails, the geocoder cannot be built, or a
/// selected dataset fails.
#[allow(clippy::future_not_send)]
pub async fn run(
    multi: &MultiProgress,
    data_dir: PathBuf,
    service_config: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let datasets = all_datasets();
    let labels: Vec<String> = datasets
        .iter()
        .map(|d| {
            if d.paths(&data_dir).checkpoint.exists() {
                format!("{} ({}, resumable)", d.name, d.id)
            } else {
                format!("{} ({})", d.name, d.id)
            }
        })
        .collect();
    let defaults = vec![true; datasets.len()];

    let selected = MultiSelect::new()
        .with_prompt("Datasets to geocode (space=toggle, a=all, enter=confirm)")
        .items(&labels)
        .defaults(&defaults)
        .interact()?;

    if selected.is_empty() {
        println!("No datasets selected.");
        return Ok(());
    }

    let mut options = GeocodeOptions::default();

    let advanced = Confirm::new()
        .with_prompt("Configure advanced options?")
        .default(false)
        .interact()?;

    if advanced {
        options.workers = prompt_usize("Concurrent workers", options.workers)?;
        options.save_every = prompt_usize("Checkpoint every N records", options.save_every)?;

        let delay_str: String = Input::new()
            .with_prompt("Delay after each record (ms)")
            .default(options.delay.as_millis().to_string())
            .interact_text()?;
        if let Ok(ms) = delay_str.trim().parse() {
            options.delay = Duration::from_millis(ms);
        }

        options.fallback = Confirm::new()
            .with_prompt("Retry failed queries with the Arabic name and address?")
            .default(true)
            .interact()?;
    }

    let chosen: Vec<_> = selected.iter().map(|&i| datasets[i].clone()).collect();

    println!();
    let geocoder = build_geocoder(service_config)?;
    run_datasets(multi, &chosen, &data_dir, &geocoder, &options).await
}

/// Prompts for a `usize`, keeping `default` on empty or unparsable input.
fn prompt_usize(prompt: &str, default: usize) -> Result<usize, Box<dyn std::error::Error>> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .default(default.to_string())
        .interact_text()?;
    Ok(input.trim().parse().unwrap_or(default))
}
