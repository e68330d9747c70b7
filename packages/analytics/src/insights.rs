//! Per-disease and per-district analyses.
//!
//! Unlike the question filter, these functions name one disease or
//! district exactly (case-insensitive, surrounding whitespace ignored).
//! Rankings are stable: ties keep the order in which groups first appear.

use std::collections::BTreeMap;

use chrono::{Datelike as _, NaiveDate, TimeDelta};
use surveillance_map_analytics_models::{
    AggregateRow, CaseCount, Grouping, MonthlyCount, ResponseTime, YearlyTrend,
};
use surveillance_map_records_models::Record;

use crate::REGION_NAME;
use crate::aggregate::{Totals, aggregate_by, rank_by_cases};

/// English month names, January first.
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Diseases listed per district-year in the knowledge base.
const KNOWLEDGE_BASE_TOP: usize = 3;

fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

fn for_disease<'a>(records: &'a [Record], disease: &'a str) -> impl Iterator<Item = &'a Record> {
    records.iter().filter(move |r| same_name(&r.disease, disease))
}

fn for_area<'a>(records: &'a [Record], area: &'a str) -> impl Iterator<Item = &'a Record> {
    records.iter().filter(move |r| same_name(&r.area, area))
}

fn to_case_counts(rows: Vec<AggregateRow>, limit: usize) -> Vec<CaseCount> {
    rows.into_iter()
        .take(limit)
        .map(|row| CaseCount {
            name: row.category,
            cases: row.total_cases,
        })
        .collect()
}

/// Parses an English month name (any case) into `1..=12`.
#[must_use]
pub fn month_from_name(name: &str) -> Option<u32> {
    MONTH_NAMES
        .iter()
        .position(|m| same_name(m, name))
        .and_then(|idx| u32::try_from(idx + 1).ok())
}

/// Year-over-year cases and deaths for `disease`, oldest year first.
#[must_use]
pub fn yearly_trends(records: &[Record], disease: &str) -> Vec<YearlyTrend> {
    let mut by_year: BTreeMap<i32, Totals> = BTreeMap::new();
    for record in for_disease(records, disease) {
        by_year.entry(record.year).or_default().add(record);
    }

    by_year
        .into_iter()
        .map(|(year, totals)| YearlyTrend {
            year,
            total_cases: totals.cases,
            total_deaths: totals.deaths,
        })
        .collect()
}

/// Monthly case totals for `disease` by outbreak start month.
///
/// Always returns all twelve months; records without a start date are
/// ignored.
#[must_use]
pub fn seasonality(records: &[Record], disease: &str) -> Vec<MonthlyCount> {
    let mut cases = [0u64; 12];
    for record in for_disease(records, disease) {
        if let Some(start) = record.started_on {
            let month = &mut cases[start.month0() as usize];
            *month = month.saturating_add(record.case_count);
        }
    }

    MONTH_NAMES
        .iter()
        .zip(cases)
        .map(|(month, cases)| MonthlyCount {
            month: (*month).to_string(),
            cases,
        })
        .collect()
}

/// The `limit` districts with the most cases of `disease`.
#[must_use]
pub fn hotspots(records: &[Record], disease: &str, limit: usize) -> Vec<CaseCount> {
    let mut rows = aggregate_by(for_disease(records, disease), |r| {
        (!r.area.is_empty()).then(|| r.area.clone())
    });
    rank_by_cases(&mut rows);
    to_case_counts(rows, limit)
}

/// Case fatality rate of `disease` as a percentage.
///
/// Returns `None` when no cases were reported.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn fatality_rate(records: &[Record], disease: &str) -> Option<f64> {
    let totals = Totals::of(for_disease(records, disease));
    (totals.cases > 0).then(|| totals.deaths as f64 / totals.cases as f64 * 100.0)
}

/// The `limit` most common diseases in `district` by cases.
#[must_use]
pub fn district_profile(records: &[Record], district: &str, limit: usize) -> Vec<CaseCount> {
    let mut rows = aggregate_by(for_area(records, district), |r| {
        (!r.disease.is_empty()).then(|| r.disease.clone())
    });
    rank_by_cases(&mut rows);
    to_case_counts(rows, limit)
}

/// Per-disease cases and deaths in `district` for outbreaks starting in
/// `month` (`1..=12`), most cases first.
#[must_use]
pub fn monthly_risk(records: &[Record], district: &str, month: u32) -> Vec<AggregateRow> {
    let in_month = for_area(records, district)
        .filter(|r| r.started_on.is_some_and(|d| d.month() == month));
    let mut rows = aggregate_by(in_month, |r| {
        (!r.disease.is_empty()).then(|| r.disease.clone())
    });
    rank_by_cases(&mut rows);
    rows
}

/// Cases of `disease` in each of two districts.
///
/// Districts without any matching record are absent from the result.
#[must_use]
pub fn compare_districts(
    records: &[Record],
    disease: &str,
    first: &str,
    second: &str,
) -> Vec<CaseCount> {
    let matching = for_disease(records, disease)
        .filter(|r| same_name(&r.area, first) || same_name(&r.area, second));
    let rows = aggregate_by(matching, |r| Some(r.area.clone()));
    to_case_counts(rows, usize::MAX)
}

/// Records reported within `days` of the latest reporting date in the
/// dataset, newest first.
///
/// A window reaching past the representable date range covers every dated
/// record.
#[must_use]
pub fn recent_outbreaks(records: &[Record], days: i64) -> Vec<&Record> {
    let Some(latest) = records.iter().filter_map(|r| r.reported_on).max() else {
        return Vec::new();
    };
    let since: Option<NaiveDate> =
        TimeDelta::try_days(days).and_then(|window| latest.checked_sub_signed(window));

    let mut recent: Vec<&Record> = records
        .iter()
        .filter(|r| {
            r.reported_on
                .is_some_and(|d| since.is_none_or(|since| d >= since))
        })
        .collect();
    recent.sort_by(|a, b| b.reported_on.cmp(&a.reported_on));
    recent
}

/// Mean days between outbreak start and reporting, grouped by `grouping`,
/// slowest first.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average_response_time(records: &[Record], grouping: Grouping) -> Vec<ResponseTime> {
    let mut order: Vec<String> = Vec::new();
    let mut sums: BTreeMap<String, (i64, u32)> = BTreeMap::new();

    for record in records {
        let Some(days) = record.response_days() else {
            continue;
        };
        let key = match grouping {
            Grouping::Disease => &record.disease,
            Grouping::Area => &record.area,
        };
        if key.is_empty() {
            continue;
        }
        let entry = sums.entry(key.clone()).or_insert_with(|| {
            order.push(key.clone());
            (0, 0)
        });
        entry.0 = entry.0.saturating_add(days);
        entry.1 = entry.1.saturating_add(1);
    }

    let mut times: Vec<ResponseTime> = order
        .into_iter()
        .filter_map(|name| {
            let (total, count) = sums.get(&name)?;
            Some(ResponseTime {
                mean_days: *total as f64 / f64::from(*count),
                name,
            })
        })
        .collect();
    times.sort_by(|a, b| b.mean_days.total_cmp(&a.mean_days));
    times
}

/// Mean days between outbreak start and reporting over all records.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn overall_response_time(records: &[Record]) -> Option<f64> {
    let days: Vec<i64> = records.iter().filter_map(Record::response_days).collect();
    let total = days.iter().fold(0i64, |acc, d| acc.saturating_add(*d));
    (!days.is_empty()).then(|| total as f64 / days.len() as f64)
}

/// Generates self-contained plain-text insight sentences:
///
/// 1. totals per (disease, year),
/// 2. the top three diseases per (district, year),
/// 3. the overall case fatality rate per disease with both cases and
///    deaths reported.
///
/// Groups are emitted in sorted key order. Records without a disease, area
/// or year are left out of the groupings that need them.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn knowledge_base(records: &[Record]) -> Vec<String> {
    let mut disease_years: BTreeMap<(&str, i32), Totals> = BTreeMap::new();
    let mut area_years: BTreeMap<(&str, i32), BTreeMap<&str, u64>> = BTreeMap::new();
    let mut diseases: BTreeMap<&str, Totals> = BTreeMap::new();

    for record in records {
        let disease = record.disease.trim();
        if disease.is_empty() {
            continue;
        }

        diseases.entry(disease).or_default().add(record);

        if record.year == 0 {
            continue;
        }

        disease_years
            .entry((disease, record.year))
            .or_default()
            .add(record);

        let area = record.area.trim();
        if !area.is_empty() {
            let cases = area_years
                .entry((area, record.year))
                .or_default()
                .entry(disease)
                .or_default();
            *cases = cases.saturating_add(record.case_count);
        }
    }

    let mut insights = Vec::new();

    for ((disease, year), totals) in &disease_years {
        insights.push(format!(
            "For the year {year}, the disease {disease} had {} reported cases and {} deaths in {REGION_NAME}.",
            totals.cases, totals.deaths
        ));
    }

    for ((area, year), by_disease) in &area_years {
        let mut ranked: Vec<(&str, u64)> = by_disease.iter().map(|(d, c)| (*d, *c)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        let listed = ranked
            .iter()
            .take(KNOWLEDGE_BASE_TOP)
            .map(|(name, cases)| format!("{name} ({cases} cases)"))
            .collect::<Vec<_>>()
            .join(", ");
        insights.push(format!(
            "In the district of {area} during the year {year}, the most common diseases included: {listed}."
        ));
    }

    for (disease, totals) in &diseases {
        if totals.cases > 0 && totals.deaths > 0 {
            let rate = totals.deaths as f64 / totals.cases as f64 * 100.0;
            insights.push(format!(
                "The overall case fatality rate for {disease} is {rate:.2}%, based on {} cases and {} deaths.",
                totals.cases, totals.deaths
            ));
        }
    }

    log::debug!("Generated {} knowledge-base insights", insights.len());
    insights
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(year: i32, disease: &str, area: &str, cases: u64, deaths: u64) -> Record {
        Record {
            year,
            disease: disease.to_string(),
            area: area.to_string(),
            case_count: cases,
            death_count: deaths,
            ..Record::default()
        }
    }

    fn dated(mut record: Record, start: (i32, u32, u32), reported: (i32, u32, u32)) -> Record {
        record.started_on = NaiveDate::from_ymd_opt(start.0, start.1, start.2);
        record.reported_on = NaiveDate::from_ymd_opt(reported.0, reported.1, reported.2);
        record
    }

    fn dataset() -> Vec<Record> {
        vec![
            dated(
                record(2021, "Dengue", "Pune", 10, 1),
                (2021, 8, 1),
                (2021, 8, 5),
            ),
            dated(
                record(2021, "Dengue", "Nagpur", 30, 0),
                (2021, 9, 10),
                (2021, 9, 12),
            ),
            dated(
                record(2020, "dengue ", "Pune", 5, 1),
                (2020, 8, 3),
                (2020, 8, 13),
            ),
            record(2021, "Malaria", "Pune", 20, 2),
            record(2021, "Cholera", "Pune", 20, 0),
        ]
    }

    #[test]
    fn yearly_trends_are_sorted_by_year() {
        let trends = yearly_trends(&dataset(), "DENGUE");
        assert_eq!(
            trends,
            vec![
                YearlyTrend {
                    year: 2020,
                    total_cases: 5,
                    total_deaths: 1
                },
                YearlyTrend {
                    year: 2021,
                    total_cases: 40,
                    total_deaths: 1
                },
            ]
        );
    }

    #[test]
    fn seasonality_covers_all_months() {
        let months = seasonality(&dataset(), "dengue");
        assert_eq!(months.len(), 12);
        assert_eq!(months[7].month, "August");
        assert_eq!(months[7].cases, 15);
        assert_eq!(months[8].cases, 30);
        assert_eq!(months[0].cases, 0);
    }

    #[test]
    fn hotspots_rank_areas() {
        let spots = hotspots(&dataset(), "dengue", 5);
        assert_eq!(spots[0].name, "Nagpur");
        assert_eq!(spots[0].cases, 30);
        assert_eq!(spots[1].name, "Pune");
        assert_eq!(spots[1].cases, 15);
        assert_eq!(hotspots(&dataset(), "dengue", 1).len(), 1);
    }

    #[test]
    fn fatality_rate_percentage() {
        let rate = fatality_rate(&dataset(), "malaria").unwrap();
        assert!((rate - 10.0).abs() < 1e-9);
        assert_eq!(fatality_rate(&dataset(), "plague"), None);
    }

    #[test]
    fn district_profile_ties_keep_encounter_order() {
        let profile = district_profile(&dataset(), "pune", 2);
        assert_eq!(profile.len(), 2);
        assert_eq!(profile[0].name, "Malaria");
        assert_eq!(profile[1].name, "Cholera");
    }

    #[test]
    fn monthly_risk_filters_by_start_month() {
        let august = month_from_name("august").unwrap();
        let rows = monthly_risk(&dataset(), "Pune", august);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].category, "Dengue");
        assert_eq!(rows[1].category, "dengue ");
        assert!(monthly_risk(&dataset(), "Pune", 1).is_empty());
    }

    #[test]
    fn compares_two_districts() {
        let comparison = compare_districts(&dataset(), "Dengue", "nagpur", "PUNE");
        assert_eq!(comparison.len(), 2);
        assert_eq!(comparison[0].name, "Pune");
        assert_eq!(comparison[0].cases, 15);
        assert_eq!(comparison[1].cases, 30);
    }

    #[test]
    fn recent_outbreaks_window() {
        let data = dataset();
        let recent = recent_outbreaks(&data, 40);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].area, "Nagpur");
        assert!(recent_outbreaks(&[record(2021, "Fever", "Pune", 1, 0)], 30).is_empty());
    }

    #[test]
    fn oversized_window_covers_every_dated_record() {
        let data = dataset();
        assert_eq!(recent_outbreaks(&data, 1_000_000_000).len(), 3);
        assert_eq!(recent_outbreaks(&data, i64::MAX).len(), 3);
        assert_eq!(recent_outbreaks(&data, i64::MIN).len(), 3);
    }

    #[test]
    fn large_counts_saturate() {
        let data = [
            dated(
                record(2021, "Malaria", "Pune", u64::MAX, 1),
                (2021, 8, 1),
                (2021, 8, 2),
            ),
            dated(
                record(2021, "Malaria", "Pune", 1, 0),
                (2021, 8, 3),
                (2021, 8, 4),
            ),
        ];

        assert_eq!(yearly_trends(&data, "malaria")[0].total_cases, u64::MAX);
        assert_eq!(seasonality(&data, "malaria")[7].cases, u64::MAX);
        assert!(knowledge_base(&data).contains(
            &format!(
                "For the year 2021, the disease Malaria had {} reported cases and 1 deaths in Maharashtra.",
                u64::MAX
            )
        ));
    }

    #[test]
    fn response_times_by_group() {
        let data = dataset();
        let by_area = average_response_time(&data, Grouping::Area);
        assert_eq!(by_area[0].name, "Pune");
        assert!((by_area[0].mean_days - 7.0).abs() < 1e-9);
        assert!((by_area[1].mean_days - 2.0).abs() < 1e-9);

        let overall = overall_response_time(&data).unwrap();
        assert!((overall - 16.0 / 3.0).abs() < 1e-9);
        assert_eq!(overall_response_time(&[]), None);
    }

    #[test]
    fn knowledge_base_sentences() {
        let insights = knowledge_base(&[
            record(2021, "Malaria", "Pune", 20, 2),
            record(2021, "Dengue", "Pune", 10, 0),
            record(2021, "Fever", "Pune", 10, 0),
            record(2021, "Cholera", "Pune", 5, 0),
        ]);

        assert!(insights.contains(
            &"For the year 2021, the disease Malaria had 20 reported cases and 2 deaths in Maharashtra."
                .to_string()
        ));
        assert!(insights.contains(
            &"In the district of Pune during the year 2021, the most common diseases included: Malaria (20 cases), Dengue (10 cases), Fever (10 cases)."
                .to_string()
        ));
        assert!(insights.contains(
            &"The overall case fatality rate for Malaria is 10.00%, based on 20 cases and 2 deaths."
                .to_string()
        ));
        assert!(!insights.iter().any(|i| i.contains("fatality rate for Dengue")));
        assert_eq!(insights.len(), 4 + 1 + 1);
    }

    #[test]
    fn knowledge_base_trims_names() {
        let insights = knowledge_base(&[
            record(2021, "Dengue ", " Pune", 4, 1),
            record(2021, "Dengue", "Pune ", 6, 0),
        ]);

        assert_eq!(
            insights,
            vec![
                "For the year 2021, the disease Dengue had 10 reported cases and 1 deaths in Maharashtra."
                    .to_string(),
                "In the district of Pune during the year 2021, the most common diseases included: Dengue (10 cases)."
                    .to_string(),
                "The overall case fatality rate for Dengue is 10.00%, based on 10 cases and 1 deaths."
                    .to_string(),
            ]
        );
    }

    #[test]
    fn month_names_parse() {
        assert_eq!(month_from_name("January"), Some(1));
        assert_eq!(month_from_name(" DECEMBER "), Some(12));
        assert_eq!(month_from_name("Smarch"), None);
    }
}
