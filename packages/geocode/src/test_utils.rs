//! Shared fixtures for batch and resolution tests.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use school_map_geocoder::Geocoder;
use school_map_school_models::{BoundingBox, Coordinate, MOROCCO_BOUNDS, SchoolRecord};

use crate::progress::ProgressCallback;

/// A [`Geocoder`] with canned answers that records every query it gets.
///
/// Answers outside Morocco are turned into the sentinel, like the real
/// client does.
#[derive(Default)]
pub struct StubGeocoder {
    answers: BTreeMap<String, Coordinate>,
    calls: Mutex<Vec<String>>,
    snapshot: Option<(usize, PathBuf)>,
    snapshot_contents: Mutex<Option<String>>,
}

impl StubGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, query: &str, coord: Coordinate) -> Self {
        self.answers.insert(query.to_string(), coord);
        self
    }

    /// Reads `path` when call number `call` (1-based) arrives.
    pub fn snapshot_on_call(mut self, call: usize, path: PathBuf) -> Self {
        self.snapshot = Some((call, path));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn snapshot_contents(&self) -> Option<String> {
        self.snapshot_contents.lock().unwrap().clone()
    }
}

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn resolve(&self, query: &str, _expected_region: Option<&str>) -> Coordinate {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(query.to_string());
            calls.len()
        };

        if let Some((at, path)) = &self.snapshot
            && *at == call
        {
            *self.snapshot_contents.lock().unwrap() = std::fs::read_to_string(path).ok();
        }

        if query.trim().is_empty() {
            return Coordinate::UNRESOLVED;
        }

        self.answers
            .get(query)
            .copied()
            .filter(|c| MOROCCO_BOUNDS.contains(*c))
            .unwrap_or(Coordinate::UNRESOLVED)
    }

    fn bounds(&self) -> BoundingBox {
        MOROCCO_BOUNDS
    }
}

/// A fully populated record named `name`, located in "Commune Y".
pub fn school(name: &str) -> SchoolRecord {
    SchoolRecord {
        name_latin: name.to_string(),
        name_arabic: format!("مدرسة {name}"),
        address_latin: "Rue X".to_string(),
        address_arabic: "زنقة س".to_string(),
        commune: "Commune Y".to_string(),
        province: "Province Z".to_string(),
        region: "Region W".to_string(),
        school_type: "public".to_string(),
        level: "primaire".to_string(),
        ..SchoolRecord::default()
    }
}

/// A [`ProgressCallback`] that keeps every `set_message` call.
#[derive(Default)]
pub struct RecordingProgress {
    messages: Mutex<Vec<String>>,
}

impl RecordingProgress {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl ProgressCallback for RecordingProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, msg: String) {
        self.messages.lock().unwrap().push(msg);
    }
    fn finish(&self, _msg: String) {}
}
