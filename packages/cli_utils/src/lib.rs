#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal output for the school map geocoder.
//!
//! [`init_logger`] installs `pretty_env_logger` behind
//! `indicatif-log-bridge`, and [`IndicatifProgress`] renders a batch run's
//! [`ProgressCallback`] events as `indicatif` bars on the same
//! [`MultiProgress`].

use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use school_map_geocode::progress::ProgressCallback;

pub use indicatif::MultiProgress;

const DATASETS_TEMPLATE: &str =
    "{msg} {wide_bar:.green/dim} {pos}/{len} datasets [{elapsed_precise}]";
const LOADING_TEMPLATE: &str = "{spinner:.yellow} Loading {msg}";
const RECORDS_TEMPLATE: &str =
    "  {msg} {wide_bar:.yellow/dim} {pos}/{len} records {percent}% [{eta}]";

fn bar_style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-")
}

/// Progress bar driven by the geocode runner.
pub struct IndicatifProgress {
    bar: ProgressBar,
    /// Applied when the record count becomes known.
    counting_style: ProgressStyle,
}

impl IndicatifProgress {
    /// Outer bar counting finished datasets in a multi-dataset run.
    #[must_use]
    pub fn datasets_bar(multi: &MultiProgress, total: u64) -> Arc<dyn ProgressCallback> {
        let bar = multi.add(ProgressBar::new(total));
        let style = bar_style(DATASETS_TEMPLATE);
        bar.set_style(style.clone());
        bar.set_message("Datasets");

        Arc::new(Self {
            bar,
            counting_style: style,
        })
    }

    /// Per-file bar. Spins while records load, then counts resolved
    /// records once the runner reports the total.
    #[must_use]
    pub fn records_bar(multi: &MultiProgress, label: &str) -> Arc<dyn ProgressCallback> {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_style(
            ProgressStyle::with_template(LOADING_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(label.to_string());

        Arc::new(Self {
            bar,
            counting_style: bar_style(RECORDS_TEMPLATE),
        })
    }
}

impl ProgressCallback for IndicatifProgress {
    fn set_total(&self, total: u64) {
        self.bar.set_style(self.counting_style.clone());
        self.bar.set_length(total);
        self.bar.set_position(0);
    }

    fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn set_message(&self, msg: String) {
        self.bar.set_message(msg);
    }

    fn finish(&self, msg: String) {
        self.bar.finish_with_message(msg);
    }
}

/// Installs the global logger and returns the [`MultiProgress`] every bar
/// must be added to.
///
/// Logs at `info` unless `RUST_LOG` says otherwise. A second call keeps the
/// logger from the first.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .filter_level(log::LevelFilter::Info)
        .parse_env("RUST_LOG")
        .build();
    let max_level = logger.filter();

    if indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .is_ok()
    {
        log::set_max_level(max_level);
    }

    multi
}
