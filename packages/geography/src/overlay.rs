//! Joins per-area case totals onto district boundaries.

use geojson::{FeatureCollection, JsonObject, JsonValue};
use surveillance_map_analytics::aggregate::aggregate_by;
use surveillance_map_analytics_models::CaseCount;
use surveillance_map_records_models::Record;

use crate::{GeoError, normalize_name, title_case};

/// Property set to the joined case total.
pub const CASES_PROPERTY: &str = "cases";

/// Property set to the title-cased district name.
pub const DISPLAY_NAME_PROPERTY: &str = "displayName";

/// Sums cases per area for `year`, in the order areas first appear.
///
/// Records with an empty area are skipped.
#[must_use]
pub fn area_case_totals(records: &[Record], year: i32) -> Vec<CaseCount> {
    aggregate_by(records.iter().filter(|r| r.year == year), |r| {
        (!r.area.is_empty()).then(|| r.area.clone())
    })
    .into_iter()
    .map(|row| CaseCount {
        name: row.category,
        cases: row.total_cases,
    })
    .collect()
}

/// Returns a copy of `boundaries` where every feature carries the case total
/// for `year` of the area whose name matches its `district_property`, plus a
/// display name.
///
/// Names are compared after [`normalize_name`]; the first matching area
/// wins and unmatched districts get `0` cases.
///
/// # Errors
///
/// Returns [`GeoError::DataUnavailable`] if no boundaries are loaded or
/// `records` is empty.
pub fn build_map_overlay(
    records: &[Record],
    boundaries: Option<&FeatureCollection>,
    year: i32,
    district_property: &str,
) -> Result<FeatureCollection, GeoError> {
    let Some(boundaries) = boundaries else {
        return Err(GeoError::DataUnavailable);
    };
    if records.is_empty() {
        return Err(GeoError::DataUnavailable);
    }

    let totals: Vec<(String, u64)> = area_case_totals(records, year)
        .into_iter()
        .map(|total| (normalize_name(&total.name), total.cases))
        .collect();

    let mut overlay = boundaries.clone();
    let mut matched = 0usize;

    for feature in &mut overlay.features {
        let properties = feature.properties.get_or_insert_with(JsonObject::new);
        let district = normalize_name(&property_text(properties.get(district_property)));

        let cases = totals
            .iter()
            .find(|(area, _)| *area == district)
            .map_or(0, |(_, cases)| {
                matched += 1;
                *cases
            });

        properties.insert(CASES_PROPERTY.to_string(), JsonValue::from(cases));
        properties.insert(
            DISPLAY_NAME_PROPERTY.to_string(),
            JsonValue::String(title_case(&district)),
        );
    }

    log::debug!(
        "Map overlay for {year}: {matched} of {} districts matched {} areas",
        overlay.features.len(),
        totals.len()
    );

    Ok(overlay)
}

fn property_text(value: Option<&JsonValue>) -> String {
    match value {
        None | Some(JsonValue::Null) => String::new(),
        Some(JsonValue::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_boundaries;

    fn record(year: i32, area: &str, cases: u64) -> Record {
        Record {
            year,
            disease: "Dengue".to_string(),
            area: area.to_string(),
            case_count: cases,
            ..Record::default()
        }
    }

    fn boundaries() -> FeatureCollection {
        parse_boundaries(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{"DTNAME":" PUNE "},
                 "geometry":{"type":"Point","coordinates":[73.8,18.5]}},
                {"type":"Feature","properties":{"DTNAME":"Nagpur"},"geometry":null},
                {"type":"Feature","properties":{"DTNAME":"Satara"},"geometry":null}
            ]}"#,
        )
        .unwrap()
    }

    fn property<'a>(collection: &'a FeatureCollection, idx: usize, key: &str) -> &'a JsonValue {
        collection.features[idx]
            .properties
            .as_ref()
            .and_then(|p| p.get(key))
            .unwrap()
    }

    #[test]
    fn totals_per_area_for_year() {
        let records = [
            record(2021, "Pune", 20),
            record(2021, "Nagpur", 5),
            record(2021, "Pune", 30),
            record(2020, "Pune", 99),
            record(2021, "", 7),
        ];
        let totals = area_case_totals(&records, 2021);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].name, "Pune");
        assert_eq!(totals[0].cases, 50);
        assert_eq!(totals[1].cases, 5);
    }

    #[test]
    fn annotates_matching_district() {
        let records = [record(2021, "Pune", 50)];
        let overlay = build_map_overlay(&records, Some(&boundaries()), 2021, "DTNAME").unwrap();

        assert_eq!(property(&overlay, 0, "cases"), &JsonValue::from(50u64));
        assert_eq!(property(&overlay, 0, "displayName"), "Pune");
        assert_eq!(property(&overlay, 0, "DTNAME"), " PUNE ");
        assert_eq!(property(&overlay, 1, "cases"), &JsonValue::from(0u64));
        assert_eq!(property(&overlay, 2, "displayName"), "Satara");
        assert!(overlay.features[0].geometry.is_some());
    }

    #[test]
    fn canonical_boundaries_are_not_modified() {
        let canonical = boundaries();
        let records = [record(2020, "Pune", 4), record(2021, "Nagpur", 9)];

        let first = build_map_overlay(&records, Some(&canonical), 2020, "DTNAME").unwrap();
        let second = build_map_overlay(&records, Some(&canonical), 2021, "DTNAME").unwrap();

        assert_eq!(canonical, boundaries());
        assert_eq!(property(&first, 0, "cases"), &JsonValue::from(4u64));
        assert_eq!(property(&second, 0, "cases"), &JsonValue::from(0u64));
        assert_eq!(property(&second, 1, "cases"), &JsonValue::from(9u64));
        assert_eq!(first.features[0].geometry, second.features[0].geometry);
    }

    #[test]
    fn area_names_are_normalized_too() {
        let records = [record(2021, " pune", 3)];
        let overlay = build_map_overlay(&records, Some(&boundaries()), 2021, "DTNAME").unwrap();
        assert_eq!(property(&overlay, 0, "cases"), &JsonValue::from(3u64));
    }

    #[test]
    fn partial_names_do_not_match() {
        let records = [record(2021, "Pune City", 3)];
        let overlay = build_map_overlay(&records, Some(&boundaries()), 2021, "DTNAME").unwrap();
        assert_eq!(property(&overlay, 0, "cases"), &JsonValue::from(0u64));
    }

    #[test]
    fn features_without_properties_get_annotated() {
        let collection = parse_boundaries(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":null,"geometry":null}
            ]}"#,
        )
        .unwrap();
        let overlay =
            build_map_overlay(&[record(2021, "Pune", 1)], Some(&collection), 2021, "DTNAME")
                .unwrap();
        assert_eq!(property(&overlay, 0, "cases"), &JsonValue::from(0u64));
        assert_eq!(property(&overlay, 0, "displayName"), "");
    }

    #[test]
    fn missing_inputs_are_unavailable() {
        assert!(matches!(
            build_map_overlay(&[record(2021, "Pune", 1)], None, 2021, "DTNAME"),
            Err(GeoError::DataUnavailable)
        ));
        assert!(matches!(
            build_map_overlay(&[], Some(&boundaries()), 2021, "DTNAME"),
            Err(GeoError::DataUnavailable)
        ));
    }
}
