#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Surveillance record schema and raw-field coercion rules.
//!
//! Upstream sources deliver loosely typed key-value rows. This crate turns
//! each row into a [`Record`] with named, typed, defaulted fields exactly
//! once at load time, so nothing downstream has to re-parse numbers or
//! guess at missing keys.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A raw row as delivered by the upstream source (JSON object or CSV row).
pub type RawRecord = serde_json::Map<String, Value>;

/// Column names used by the upstream dataset.
pub mod columns {
    /// Reporting year.
    pub const YEAR: &str = "Year";
    /// Disease name.
    pub const DISEASE: &str = "Disease";
    /// District or region name.
    pub const AREA: &str = "Area";
    /// Number of reported cases.
    pub const CASES: &str = "No of cases";
    /// Number of reported deaths.
    pub const DEATHS: &str = "No of deaths";
    /// Outbreak start date.
    pub const DATE_OF_START: &str = "Date of start";
    /// Outbreak reporting date.
    pub const DATE_OF_REPORTING: &str = "Date of reporting";
}

/// Date formats accepted for the start/reporting columns, tried in order.
const DATE_FORMATS: &[&str] = &["%d-%m-%Y", "%Y-%m-%d", "%d/%m/%Y"];

/// One surveillance entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Reporting year (0 when absent or unparseable).
    pub year: i32,
    /// Free-form disease name. Empty when absent.
    pub disease: String,
    /// District or region name. Empty when absent.
    pub area: String,
    /// Reported cases.
    pub case_count: u64,
    /// Reported deaths.
    pub death_count: u64,
    /// When the outbreak started, if known.
    pub started_on: Option<NaiveDate>,
    /// When the outbreak was reported, if known.
    pub reported_on: Option<NaiveDate>,
}

impl Record {
    /// Builds a record from a raw upstream row.
    ///
    /// Never fails: numeric fields that are absent, null, negative, or not
    /// numbers become `0`, text fields become empty, and dates that do not
    /// parse become `None`.
    #[must_use]
    pub fn from_raw(raw: &RawRecord) -> Self {
        Self {
            year: coerce_year(field(raw, columns::YEAR)),
            disease: coerce_text(field(raw, columns::DISEASE)),
            area: coerce_text(field(raw, columns::AREA)),
            case_count: coerce_count(field(raw, columns::CASES)),
            death_count: coerce_count(field(raw, columns::DEATHS)),
            started_on: parse_date(field(raw, columns::DATE_OF_START)),
            reported_on: parse_date(field(raw, columns::DATE_OF_REPORTING)),
        }
    }

    /// Days between the start and reporting dates, when both are known.
    #[must_use]
    pub fn response_days(&self) -> Option<i64> {
        match (self.started_on, self.reported_on) {
            (Some(start), Some(reported)) => Some((reported - start).num_days()),
            _ => None,
        }
    }
}

impl From<&RawRecord> for Record {
    fn from(raw: &RawRecord) -> Self {
        Self::from_raw(raw)
    }
}

/// Looks up a column, tolerating surrounding whitespace in header names.
fn field<'a>(raw: &'a RawRecord, name: &str) -> Option<&'a Value> {
    raw.get(name).or_else(|| {
        raw.iter()
            .find(|(key, _)| key.trim() == name)
            .map(|(_, value)| value)
    })
}

/// Coerces a raw count into a non-negative integer.
///
/// Accepts JSON numbers and numeric strings (including `"12.0"`). Anything
/// else, including negative values, yields `0`.
#[must_use]
pub fn coerce_count(value: Option<&Value>) -> u64 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().and_then(float_to_count))
            .unwrap_or(0),
        Some(Value::String(s)) => parse_count(s).unwrap_or_else(|| {
            log::debug!("Coercing malformed count {s:?} to 0");
            0
        }),
        Some(other) => {
            log::debug!("Coercing non-numeric count {other} to 0");
            0
        }
    }
}

fn parse_count(s: &str) -> Option<u64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Some(0);
    }
    trimmed
        .parse::<u64>()
        .ok()
        .or_else(|| trimmed.parse::<f64>().ok().and_then(float_to_count))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn float_to_count(f: f64) -> Option<u64> {
    (f.is_finite() && f >= 0.0).then(|| f.trunc() as u64)
}

/// Coerces a raw year into an integer, `0` when absent or malformed.
#[must_use]
pub fn coerce_year(value: Option<&Value>) -> i32 {
    let parsed = match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|y| i32::try_from(y).ok())
            .or_else(|| n.as_f64().and_then(float_to_year)),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i32>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().and_then(float_to_year))
        }
        _ => None,
    };

    parsed.unwrap_or_else(|| {
        if let Some(v) = value {
            log::debug!("Coercing malformed year {v} to 0");
        }
        0
    })
}

#[allow(clippy::cast_possible_truncation)]
fn float_to_year(f: f64) -> Option<i32> {
    (f.is_finite() && f.abs() < f64::from(i32::MAX)).then(|| f.trunc() as i32)
}

/// Coerces a raw text column. Numbers are rendered, null/absent is empty.
#[must_use]
pub fn coerce_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Parses a date column using the accepted formats.
///
/// ISO timestamps (`2021-03-04T00:00:00`) are accepted by their date part.
#[must_use]
pub fn parse_date(value: Option<&Value>) -> Option<NaiveDate> {
    let Some(Value::String(s)) = value else {
        return None;
    };
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    let date_part = trimmed.split(['T', ' ']).next().unwrap_or(trimmed);

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn builds_record_from_string_fields() {
        let record = Record::from_raw(&raw(json!({
            "Year": "2021",
            "Disease": "Malaria",
            "Area": "Pune",
            "No of cases": "10",
            "No of deaths": "1",
        })));

        assert_eq!(record.year, 2021);
        assert_eq!(record.disease, "Malaria");
        assert_eq!(record.area, "Pune");
        assert_eq!(record.case_count, 10);
        assert_eq!(record.death_count, 1);
        assert_eq!(record.started_on, None);
    }

    #[test]
    fn unparseable_counts_become_zero() {
        let record = Record::from_raw(&raw(json!({
            "Year": 2020,
            "Disease": "Dengue",
            "Area": "Nagpur",
            "No of cases": "abc",
            "No of deaths": null,
        })));

        assert_eq!(record.case_count, 0);
        assert_eq!(record.death_count, 0);
        assert_eq!(record.disease, "Dengue");
    }

    #[test]
    fn missing_fields_use_defaults() {
        let record = Record::from_raw(&RawRecord::new());
        assert_eq!(record, Record::default());
    }

    #[test]
    fn numeric_counts_accept_floats_and_reject_negatives() {
        assert_eq!(coerce_count(Some(&json!(12.0))), 12);
        assert_eq!(coerce_count(Some(&json!("7.0"))), 7);
        assert_eq!(coerce_count(Some(&json!(-3))), 0);
        assert_eq!(coerce_count(Some(&json!("-3"))), 0);
        assert_eq!(coerce_count(Some(&json!(" 42 "))), 42);
        assert_eq!(coerce_count(Some(&json!(true))), 0);
    }

    #[test]
    fn year_coercion() {
        assert_eq!(coerce_year(Some(&json!("2019"))), 2019);
        assert_eq!(coerce_year(Some(&json!(2019.0))), 2019);
        assert_eq!(coerce_year(Some(&json!("twenty"))), 0);
        assert_eq!(coerce_year(None), 0);
    }

    #[test]
    fn header_names_are_trimmed() {
        let record = Record::from_raw(&raw(json!({
            " Year ": "2018",
            "Disease ": "Fever",
            " No of cases": "4",
        })));

        assert_eq!(record.year, 2018);
        assert_eq!(record.disease, "Fever");
        assert_eq!(record.case_count, 4);
    }

    #[test]
    fn parses_dates_in_both_formats() {
        let record = Record::from_raw(&raw(json!({
            "Date of start": "05-08-2021",
            "Date of reporting": "2021-08-12T00:00:00",
        })));

        assert_eq!(record.started_on, NaiveDate::from_ymd_opt(2021, 8, 5));
        assert_eq!(record.reported_on, NaiveDate::from_ymd_opt(2021, 8, 12));
        assert_eq!(record.response_days(), Some(7));
    }

    #[test]
    fn bad_dates_are_absent() {
        assert_eq!(parse_date(Some(&json!("not a date"))), None);
        assert_eq!(parse_date(Some(&json!(""))), None);
        assert_eq!(parse_date(Some(&json!(20_210_805))), None);
    }
}
