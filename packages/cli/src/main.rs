#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for the geocode stage of the school map
//! pipeline.
//!
//! Run without a subcommand for an interactive prompt, or use one of the
//! subcommands to geocode every registered dataset, a single dataset, or
//! an arbitrary file.
//!
//! Uses `indicatif-log-bridge` (via [`school_map_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and progress bars never fight for the terminal.

mod interactive;
mod run;

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use school_map_geocode::datasets::{all_datasets, find_dataset};
use school_map_geocode::{BatchPaths, GeocodeOptions};
use school_map_geocoder::google::GoogleGeocoder;
use school_map_geocoder::service_registry::{self, GeocodingService};

#[derive(Parser)]
#[command(name = "school_map", about = "Geocode cleaned school extracts")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Maximum number of records geocoded concurrently
    #[arg(long, default_value = "5", global = true)]
    workers: usize,

    /// Number of completed records between checkpoint saves
    #[arg(long, default_value = "50", global = true)]
    save_every: usize,

    /// Pause after each record, in milliseconds
    #[arg(long, default_value = "50", global = true)]
    delay_ms: u64,

    /// Do not retry failed queries with the Arabic name and address
    #[arg(long, global = true)]
    no_fallback: bool,

    /// Geocoding service TOML to use instead of the built-in Google config
    #[arg(long, global = true)]
    service_config: Option<PathBuf>,

    /// Data directory (defaults to `SCHOOL_MAP_DATA_DIR` or `<repo>/data`)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Geocode every registered dataset in order
    All,
    /// Geocode a single registered dataset
    Dataset {
        /// Dataset identifier (e.g., "`public_primaire`")
        id: String,
    },
    /// Geocode an arbitrary JSON record file
    File {
        /// Cleaned records (JSON array)
        #[arg(long)]
        input: PathBuf,
        /// Where to write the geocoded records
        #[arg(long)]
        output: PathBuf,
        /// Checkpoint path (defaults to `<output stem>_temp.json`)
        #[arg(long)]
        checkpoint: Option<PathBuf>,
    },
    /// List registered datasets
    Datasets,
}

impl Cli {
    fn options(&self) -> GeocodeOptions {
        GeocodeOptions {
            workers: self.workers,
            save_every: self.save_every,
            delay: Duration::from_millis(self.delay_ms),
            fallback: !self.no_fallback,
        }
    }

    fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(school_map_geocode::paths::data_dir)
    }
}

fn build_geocoder(
    service_config: Option<&Path>,
) -> Result<GoogleGeocoder, Box<dyn std::error::Error>> {
    let service = match service_config {
        Some(path) => {
            log::info!("Using geocoding service config {}", path.display());
            GeocodingService::from_file(path)?
        }
        None => service_registry::google(),
    };
    let geocoder = GoogleGeocoder::from_env(service)?;
    log::info!("Geocoding with {}", geocoder.service().name);
    Ok(geocoder)
}

fn default_checkpoint(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map_or_else(|| "geocoded".into(), |s| s.to_string_lossy());
    output.with_file_name(format!("{stem}_temp.json"))
}

#[tokio::main]
#[allow(clippy::future_not_send)]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = school_map_cli_utils::init_logger();
    let cli = Cli::parse();

    let Some(command) = &cli.command else {
        return interactive::run(&multi, cli.data_dir(), cli.service_config.as_deref()).await;
    };

    match command {
        Commands::Datasets => {
            let data_dir = cli.data_dir();
            println!("{:<20} NAME", "ID");
            println!("{}", "-".repeat(60));
            for ds in all_datasets() {
                let resumable = if ds.paths(&data_dir).checkpoint.exists() {
                    " (checkpoint present)"
                } else {
                    ""
                };
                println!("{:<20} {}{resumable}", ds.id, ds.name);
            }
        }
        Commands::All => {
            let geocoder = build_geocoder(cli.service_config.as_deref())?;
            run::run_datasets(
                &multi,
                &all_datasets(),
                &cli.data_dir(),
                &geocoder,
                &cli.options(),
            )
            .await?;
        }
        Commands::Dataset { id } => {
            let Some(ds) = find_dataset(id) else {
                return Err(format!("Unknown dataset '{id}'").into());
            };
            let geocoder = build_geocoder(cli.service_config.as_deref())?;
            run::run_datasets(&multi, &[ds], &cli.data_dir(), &geocoder, &cli.options()).await?;
        }
        Commands::File {
            input,
            output,
            checkpoint,
        } => {
            let paths = BatchPaths {
                input: input.clone(),
                output: output.clone(),
                checkpoint: checkpoint
                    .clone()
                    .unwrap_or_else(|| default_checkpoint(output)),
            };
            let geocoder = build_geocoder(cli.service_config.as_deref())?;
            run::run_file(&multi, &paths, &geocoder, &cli.options()).await?;
        }
    }

    Ok(())
}
