//! Address query construction for school records.
//!
//! Queries are built from the most specific component to the least
//! specific one: school name, street address, commune, province, region,
//! and finally the country. Empty components are skipped so that sparse
//! records still produce a usable query.
//!
//! The query string doubles as the resolution cache key, so it must be
//! fully deterministic for a given record and [`Script`].

use school_map_school_models::{SchoolRecord, Script};

/// Country name appended to every non-empty query.
pub const COUNTRY_NAME: &str = "Morocco";

const SEPARATOR: &str = ", ";

/// Builds the geocoding query for `record` in the given script.
///
/// Returns an empty string if the record has no usable name, address,
/// commune, province, or region; the country name alone is never a query.
#[must_use]
pub fn build_query(record: &SchoolRecord, script: Script) -> String {
    let parts: Vec<&str> = [
        record.name(script),
        record.address(script),
        record.commune.as_str(),
        record.province.as_str(),
        record.region.as_str(),
    ]
    .into_iter()
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .collect();

    if parts.is_empty() {
        return String::new();
    }

    let mut query = parts.join(SEPARATOR);
    query.push_str(SEPARATOR);
    query.push_str(COUNTRY_NAME);
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SchoolRecord {
        SchoolRecord {
            name_latin: "Ecole A".to_string(),
            name_arabic: "مدرسة أ".to_string(),
            address_latin: "Rue X".to_string(),
            address_arabic: "زنقة س".to_string(),
            commune: "Commune Y".to_string(),
            province: "Province Z".to_string(),
            region: "Region W".to_string(),
            ..SchoolRecord::default()
        }
    }

    #[test]
    fn builds_latin_query_in_order() {
        assert_eq!(
            build_query(&sample(), Script::Latin),
            "Ecole A, Rue X, Commune Y, Province Z, Region W, Morocco"
        );
    }

    #[test]
    fn builds_arabic_query_with_shared_components() {
        assert_eq!(
            build_query(&sample(), Script::Arabic),
            "مدرسة أ, زنقة س, Commune Y, Province Z, Region W, Morocco"
        );
    }

    #[test]
    fn skips_empty_components() {
        let record = SchoolRecord {
            address_latin: String::new(),
            province: "   ".to_string(),
            ..sample()
        };
        assert_eq!(
            build_query(&record, Script::Latin),
            "Ecole A, Commune Y, Region W, Morocco"
        );
    }

    #[test]
    fn empty_record_builds_empty_query() {
        assert_eq!(build_query(&SchoolRecord::default(), Script::Latin), "");
        assert_eq!(build_query(&SchoolRecord::default(), Script::Arabic), "");
    }

    #[test]
    fn latin_only_record_has_empty_name_in_arabic() {
        let record = SchoolRecord {
            name_arabic: String::new(),
            address_arabic: String::new(),
            ..sample()
        };
        assert_eq!(
            build_query(&record, Script::Arabic),
            "Commune Y, Province Z, Region W, Morocco"
        );
    }

    #[test]
    fn identical_records_share_a_key() {
        let a = sample();
        let mut b = sample();
        b.level = "college".to_string();
        assert_eq!(
            build_query(&a, Script::Latin),
            build_query(&b, Script::Latin)
        );
    }
}
