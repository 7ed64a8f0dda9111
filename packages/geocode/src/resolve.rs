//! Per-record resolution: cache, then service, then secondary script.

use school_map_geocoder::Geocoder;
use school_map_geocoder::address::build_query;
use school_map_school_models::{Coordinate, SchoolRecord, Script};

use crate::cache::{CacheLookup, ResolutionCache};

/// Resolves a single record to a coordinate.
///
/// A record that already carries an in-bounds coordinate keeps it and
/// never reaches the cache or the service. Otherwise:
///
/// 1. The primary (Latin) query is answered from the cache if possible,
///    otherwise sent to `geocoder`.
/// 2. If that yields the sentinel and `fallback` is set, the secondary
///    (Arabic) query is tried the same way. Its result is cached whether or
///    not it resolved.
/// 3. The final coordinate is cached under the primary key, sentinel
///    included, so the same failing query is not re-sent during this run.
///
/// Never fails; an unresolvable record yields [`Coordinate::UNRESOLVED`].
pub async fn resolve_record(
    record: &SchoolRecord,
    geocoder: &dyn Geocoder,
    cache: &ResolutionCache,
    fallback: bool,
) -> Coordinate {
    if let Some(existing) = record.coordinate()
        && geocoder.bounds().contains(existing)
    {
        return existing;
    }

    let region = Some(record.region.as_str()).filter(|r| !r.trim().is_empty());
    let primary = build_query(record, Script::Latin);

    let mut coord = match cache.lookup(&primary) {
        CacheLookup::Resolved(coord) => return coord,
        CacheLookup::KnownUnresolved => Coordinate::UNRESOLVED,
        CacheLookup::Miss => query(geocoder, &primary, region).await,
    };

    if coord.is_unresolved() && fallback {
        let secondary = build_query(record, Script::Arabic);
        if secondary != primary {
            coord = match cache.lookup(&secondary) {
                CacheLookup::Resolved(coord) => coord,
                CacheLookup::KnownUnresolved => Coordinate::UNRESOLVED,
                CacheLookup::Miss => {
                    log::debug!("Falling back to Arabic query for '{primary}'");
                    let coord = query(geocoder, &secondary, region).await;
                    cache.put(&secondary, coord);
                    coord
                }
            };
        }
    }

    cache.put(&primary, coord);
    coord
}

async fn query(geocoder: &dyn Geocoder, query: &str, region: Option<&str>) -> Coordinate {
    if query.is_empty() {
        return Coordinate::UNRESOLVED;
    }
    geocoder.resolve(query, region).await
}

#[cfg(test)]
mod tests {
    use school_map_school_models::MOROCCO_BOUNDS;

    use super::*;
    use crate::test_utils::{StubGeocoder, school};

    const PRIMARY: &str = "Ecole A, Rue X, Commune Y, Province Z, Region W, Morocco";
    const SECONDARY: &str = "مدرسة Ecole A, زنقة س, Commune Y, Province Z, Region W, Morocco";

    fn cache() -> ResolutionCache {
        ResolutionCache::new(MOROCCO_BOUNDS)
    }

    #[tokio::test]
    async fn resolves_through_the_service() {
        let geocoder = StubGeocoder::new().answer(PRIMARY, Coordinate::new(33.5, -7.6));
        let cache = cache();

        let coord = resolve_record(&school("Ecole A"), &geocoder, &cache, true).await;

        assert_eq!(coord, Coordinate::new(33.5, -7.6));
        assert_eq!(geocoder.calls(), vec![PRIMARY.to_string()]);
        assert_eq!(cache.get(PRIMARY), Some(Coordinate::new(33.5, -7.6)));
    }

    #[tokio::test]
    async fn same_query_twice_calls_the_service_once() {
        let geocoder = StubGeocoder::new().answer(PRIMARY, Coordinate::new(33.5, -7.6));
        let cache = cache();

        let first = resolve_record(&school("Ecole A"), &geocoder, &cache, true).await;
        let second = resolve_record(&school("Ecole A"), &geocoder, &cache, true).await;

        assert_eq!(first, second);
        assert_eq!(geocoder.call_count(), 1);
    }

    #[tokio::test]
    async fn out_of_bounds_answer_is_cached_as_unresolved() {
        let geocoder = StubGeocoder::new().answer(PRIMARY, Coordinate::new(48.85, 2.35));
        let cache = cache();

        let first = resolve_record(&school("Ecole A"), &geocoder, &cache, false).await;
        let second = resolve_record(&school("Ecole A"), &geocoder, &cache, false).await;

        assert_eq!(first, Coordinate::UNRESOLVED);
        assert_eq!(second, Coordinate::UNRESOLVED);
        assert_eq!(geocoder.call_count(), 1);
        assert_eq!(cache.lookup(PRIMARY), CacheLookup::KnownUnresolved);
    }

    #[tokio::test]
    async fn falls_back_to_arabic_exactly_once() {
        let geocoder = StubGeocoder::new().answer(SECONDARY, Coordinate::new(34.0, -6.8));
        let cache = cache();

        let coord = resolve_record(&school("Ecole A"), &geocoder, &cache, true).await;

        assert_eq!(coord, Coordinate::new(34.0, -6.8));
        assert_eq!(
            geocoder.calls(),
            vec![PRIMARY.to_string(), SECONDARY.to_string()]
        );
        assert_eq!(cache.get(SECONDARY), Some(Coordinate::new(34.0, -6.8)));
        assert_eq!(cache.get(PRIMARY), Some(Coordinate::new(34.0, -6.8)));
    }

    #[tokio::test]
    async fn failed_fallback_writes_sentinel_and_caches_both_keys() {
        let geocoder = StubGeocoder::new();
        let cache = cache();

        let coord = resolve_record(&school("Ecole A"), &geocoder, &cache, true).await;

        assert_eq!(coord, Coordinate::UNRESOLVED);
        assert_eq!(geocoder.call_count(), 2);
        assert_eq!(cache.lookup(PRIMARY), CacheLookup::KnownUnresolved);
        assert_eq!(cache.lookup(SECONDARY), CacheLookup::KnownUnresolved);

        resolve_record(&school("Ecole A"), &geocoder, &cache, true).await;
        assert_eq!(geocoder.call_count(), 2);
    }

    #[tokio::test]
    async fn no_fallback_when_disabled() {
        let geocoder = StubGeocoder::new().answer(SECONDARY, Coordinate::new(34.0, -6.8));
        let cache = cache();

        let coord = resolve_record(&school("Ecole A"), &geocoder, &cache, false).await;

        assert_eq!(coord, Coordinate::UNRESOLVED);
        assert_eq!(geocoder.calls(), vec![PRIMARY.to_string()]);
    }

    #[tokio::test]
    async fn cached_secondary_is_reused() {
        let geocoder = StubGeocoder::new();
        let cache = cache();
        cache.put(SECONDARY, Coordinate::new(34.0, -6.8));

        let coord = resolve_record(&school("Ecole A"), &geocoder, &cache, true).await;

        assert_eq!(coord, Coordinate::new(34.0, -6.8));
        assert_eq!(geocoder.calls(), vec![PRIMARY.to_string()]);
    }

    #[tokio::test]
    async fn empty_record_never_reaches_the_service() {
        let geocoder = StubGeocoder::new();
        let cache = cache();

        let coord = resolve_record(&SchoolRecord::default(), &geocoder, &cache, true).await;

        assert_eq!(coord, Coordinate::UNRESOLVED);
        assert_eq!(geocoder.call_count(), 0);
    }

    #[tokio::test]
    async fn existing_coordinate_is_kept_without_a_query() {
        let geocoder = StubGeocoder::new().answer(PRIMARY, Coordinate::new(33.5, -7.6));
        let cache = cache();
        let mut record = school("Ecole A");
        record.set_coordinate(Coordinate::new(34.0, -6.8));

        let coord = resolve_record(&record, &geocoder, &cache, true).await;

        assert_eq!(coord, Coordinate::new(34.0, -6.8));
        assert_eq!(geocoder.call_count(), 0);
    }

    #[tokio::test]
    async fn existing_sentinel_or_out_of_bounds_is_re_resolved() {
        let geocoder = StubGeocoder::new().answer(PRIMARY, Coordinate::new(33.5, -7.6));

        for stale in [Coordinate::UNRESOLVED, Coordinate::new(48.85, 2.35)] {
            let mut record = school("Ecole A");
            record.set_coordinate(stale);
            let coord = resolve_record(&record, &geocoder, &cache(), true).await;
            assert_eq!(coord, Coordinate::new(33.5, -7.6));
        }
        assert_eq!(geocoder.call_count(), 2);
    }

    #[tokio::test]
    async fn identical_scripts_are_not_queried_twice() {
        let geocoder = StubGeocoder::new();
        let cache = cache();
        let record = SchoolRecord {
            commune: "Commune Y".to_string(),
            region: "Region W".to_string(),
            ..SchoolRecord::default()
        };

        resolve_record(&record, &geocoder, &cache, true).await;

        assert_eq!(geocoder.call_count(), 1);
    }
}
