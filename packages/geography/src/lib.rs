#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! District boundaries and the case-count overlay drawn on top of them.
//!
//! Boundaries are a `GeoJSON` `FeatureCollection` loaded once at startup and
//! shared read-only. [`build_map_overlay`] annotates a fresh copy per call,
//! so the loaded collection is never modified.

pub mod overlay;

use std::path::Path;

use geojson::{FeatureCollection, GeoJson};
use thiserror::Error;

pub use overlay::{area_case_totals, build_map_overlay};

/// Feature property holding the district name in the bundled boundaries.
pub const DEFAULT_DISTRICT_PROPERTY: &str = "DTNAME";

/// Errors that can occur during geography operations.
#[derive(Debug, Error)]
pub enum GeoError {
    /// Boundaries or records have not been loaded.
    #[error("Data not available")]
    DataUnavailable,

    /// Reading the boundary file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The boundary file is not valid `GeoJSON`.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The boundary file is valid `GeoJSON` but not a feature collection.
    #[error("Conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}

/// Loads a boundary `FeatureCollection` from a `GeoJSON` file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid `GeoJSON`, or
/// does not contain a `FeatureCollection`.
pub fn load_boundaries(path: impl AsRef<Path>) -> Result<FeatureCollection, GeoError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let collection = parse_boundaries(&text)?;
    log::info!(
        "Loaded {} boundary features from {}",
        collection.features.len(),
        path.display()
    );
    Ok(collection)
}

/// Parses a `GeoJSON` document into a boundary `FeatureCollection`.
///
/// # Errors
///
/// Returns an error if `text` is not valid `GeoJSON` or is not a
/// `FeatureCollection`.
pub fn parse_boundaries(text: &str) -> Result<FeatureCollection, GeoError> {
    match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => Ok(collection),
        GeoJson::Feature(_) => Err(GeoError::Conversion {
            message: "expected a FeatureCollection, found a Feature".to_string(),
        }),
        GeoJson::Geometry(_) => Err(GeoError::Conversion {
            message: "expected a FeatureCollection, found a Geometry".to_string(),
        }),
    }
}

/// Normalizes a district or area name for matching: trims whitespace and
/// lower-cases.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Title-cases `name`: the first letter of every run of letters is
/// upper-cased and the rest lower-cased.
///
/// Any non-alphabetic character starts a new word, so `"ahmed-nagar"`
/// becomes `"Ahmed-Nagar"`.
#[must_use]
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_word = false;
    for c in name.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_names() {
        assert_eq!(normalize_name("  PUNE "), "pune");
        assert_eq!(normalize_name("Mumbai Suburban"), "mumbai suburban");
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn title_cases_words() {
        assert_eq!(title_case("pune"), "Pune");
        assert_eq!(title_case("mumbai suburban"), "Mumbai Suburban");
        assert_eq!(title_case("ahmed-nagar"), "Ahmed-Nagar");
        assert_eq!(title_case("NASHIK"), "Nashik");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn parses_feature_collections_only() {
        let collection = parse_boundaries(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{"DTNAME":"Pune"},"geometry":null}
            ]}"#,
        )
        .unwrap();
        assert_eq!(collection.features.len(), 1);

        let point = r#"{"type":"Point","coordinates":[73.8,18.5]}"#;
        assert!(matches!(
            parse_boundaries(point),
            Err(GeoError::Conversion { .. })
        ));
        assert!(matches!(
            parse_boundaries("not json"),
            Err(GeoError::GeoJson(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            load_boundaries("/nonexistent/boundaries.geojson"),
            Err(GeoError::Io(_))
        ));
    }
}
