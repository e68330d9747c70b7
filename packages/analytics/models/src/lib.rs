#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Query intent and aggregate result types for surveillance analytics.
//!
//! An [`Intent`] is the structured form of one user question. The
//! remaining types are the typed results of the aggregation and insight
//! functions in `surveillance_map_analytics`.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Which totals a question asks about.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Metric {
    /// Case counts only.
    Cases,
    /// Death counts only.
    Deaths,
    /// Both cases and deaths.
    #[default]
    Both,
}

/// Structured query extracted from one free-text question.
///
/// Empty `diseases`/`areas` mean "no filter" on that dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    /// Exact reporting year to filter on.
    pub year: Option<i32>,
    /// Which totals the headline reports.
    pub metric: Metric,
    /// Lower-case disease terms; a record matches if its disease contains any.
    pub diseases: Vec<String>,
    /// Lower-case area terms; a record matches if its area contains any.
    pub areas: Vec<String>,
}

impl Intent {
    /// Returns `true` if no filter is active.
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.year.is_none() && self.diseases.is_empty() && self.areas.is_empty()
    }
}

/// Summed counts for one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRow {
    /// Group label (disease or area name).
    pub category: String,
    /// Summed cases.
    pub total_cases: u64,
    /// Summed deaths.
    pub total_deaths: u64,
}

/// Cases and deaths for one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyTrend {
    /// Reporting year.
    pub year: i32,
    /// Summed cases.
    pub total_cases: u64,
    /// Summed deaths.
    pub total_deaths: u64,
}

/// Case total for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyCount {
    /// English month name (`"January"`).
    pub month: String,
    /// Summed cases.
    pub cases: u64,
}

/// Case total for one label (area or disease).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseCount {
    /// Area or disease name.
    pub name: String,
    /// Summed cases.
    pub cases: u64,
}

/// Mean outbreak response time for one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseTime {
    /// Disease or area name.
    pub name: String,
    /// Mean days between outbreak start and reporting.
    pub mean_days: f64,
}

/// Dimension to group response times by.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Grouping {
    /// Group by disease name.
    Disease,
    /// Group by area name.
    Area,
}
