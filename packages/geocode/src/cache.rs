//! In-memory resolution cache shared by all workers of a batch.
//!
//! Maps a query key (see [`build_query`]) to the coordinate it resolved
//! to. Both hits and misses are cached: a query that came back
//! [`Coordinate::UNRESOLVED`] is not sent again for the rest of the run.
//!
//! Every stored value is either inside the cache's bounding box or the
//! sentinel. Values read back are re-validated by [`ResolutionCache::lookup`]
//! before use.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use school_map_geocoder::address::build_query;
use school_map_school_models::{BoundingBox, Coordinate, SchoolRecord, Script};

/// Outcome of a validated cache lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CacheLookup {
    /// A previously resolved, in-bounds coordinate.
    Resolved(Coordinate),
    /// The query already failed during this run.
    KnownUnresolved,
    /// Nothing usable is cached; the query must be sent.
    Miss,
}

/// Concurrency-safe query → coordinate map owned by one batch run.
#[derive(Debug)]
pub struct ResolutionCache {
    entries: RwLock<BTreeMap<String, Coordinate>>,
    bounds: BoundingBox,
}

impl ResolutionCache {
    #[must_use]
    pub const fn new(bounds: BoundingBox) -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            bounds,
        }
    }

    /// Builds a cache pre-seeded from records that already carry an
    /// in-bounds coordinate, keyed by their primary-script query.
    ///
    /// Records without coordinates, with the sentinel, or with
    /// out-of-bounds values are left out so they get re-resolved.
    #[must_use]
    pub fn primed(records: &[SchoolRecord], bounds: BoundingBox) -> Self {
        let cache = Self::new(bounds);
        let mut seeded = 0usize;

        {
            let mut entries = cache
                .entries
                .write()
                .unwrap_or_else(PoisonError::into_inner);

            for record in records {
                let Some(coord) = record.coordinate() else {
                    continue;
                };
                if !bounds.contains(coord) {
                    continue;
                }
                let key = build_query(record, Script::Latin);
                if key.is_empty() {
                    continue;
                }
                entries.insert(key, coord);
                seeded += 1;
            }
        }

        if seeded > 0 {
            log::info!("Cache primed with {seeded} already-geocoded records");
        }

        cache
    }

    /// Returns the raw cached value for `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Coordinate> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied()
    }

    /// Stores `coord` under `key`.
    ///
    /// Empty keys are ignored. A value that is neither in bounds nor the
    /// sentinel is stored as the sentinel.
    pub fn put(&self, key: &str, coord: Coordinate) {
        if key.is_empty() {
            return;
        }

        let coord = if coord.is_unresolved() || self.bounds.contains(coord) {
            coord
        } else {
            log::warn!("Refusing to cache out-of-bounds {coord} for '{key}'");
            Coordinate::UNRESOLVED
        };

        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), coord);
    }

    /// Looks up `key` and re-validates the cached value against the
    /// bounding box.
    #[must_use]
    pub fn lookup(&self, key: &str) -> CacheLookup {
        match self.get(key) {
            None => CacheLookup::Miss,
            Some(coord) if coord.is_unresolved() => CacheLookup::KnownUnresolved,
            Some(coord) if self.bounds.contains(coord) => CacheLookup::Resolved(coord),
            Some(coord) => {
                log::debug!("Ignoring stale out-of-bounds cache entry {coord} for '{key}'");
                CacheLookup::Miss
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
