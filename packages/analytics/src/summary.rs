//! Renders filtered records as short summary lines.

use surveillance_map_analytics_models::{AggregateRow, Intent, Metric};
use surveillance_map_records_models::Record;

use crate::aggregate::{Totals, aggregate_by, rank_by_cases};

/// The single line emitted when nothing matched.
pub const NO_MATCH: &str = "No matching data found.";

/// How many diseases the breakdown lists.
pub const TOP_DISEASES: usize = 5;

/// Label for records without a disease name.
pub const UNKNOWN_DISEASE: &str = "Unknown";

/// Summarizes `records` for `intent`.
///
/// Returns `[NO_MATCH]` for an empty input. Otherwise the first line is a
/// headline with the totals requested by `intent.metric`, followed by up to
/// [`TOP_DISEASES`] lines `"<disease>: <cases> cases, <deaths> deaths"`
/// ordered by cases.
#[must_use]
pub fn summarize(records: &[&Record], intent: &Intent) -> Vec<String> {
    if records.is_empty() {
        return vec![NO_MATCH.to_string()];
    }

    let totals = Totals::of(records.iter().copied());
    let mut lines = Vec::with_capacity(TOP_DISEASES + 1);
    lines.push(headline(totals, intent));

    lines.extend(
        top_diseases(records, TOP_DISEASES)
            .iter()
            .map(|row| {
                format!(
                    "{}: {} cases, {} deaths",
                    row.category, row.total_cases, row.total_deaths
                )
            }),
    );

    lines
}

/// Returns `true` if `lines` is the no-match summary.
#[must_use]
pub fn is_no_match(lines: &[String]) -> bool {
    lines.first().is_none_or(|line| line == NO_MATCH)
}

/// Formats the headline line for `totals`.
#[must_use]
pub fn headline(totals: Totals, intent: &Intent) -> String {
    let year = intent
        .year
        .map_or_else(String::new, |year| format!(" in {year}"));

    match intent.metric {
        Metric::Deaths => format!("Total deaths{year}: {}", totals.deaths),
        Metric::Cases => format!("Total cases{year}: {}", totals.cases),
        Metric::Both => format!(
            "Summary{year}: {} cases and {} deaths",
            totals.cases, totals.deaths
        ),
    }
}

/// Groups `records` by disease and returns the `limit` largest by cases.
#[must_use]
pub fn top_diseases(records: &[&Record], limit: usize) -> Vec<AggregateRow> {
    let mut rows = aggregate_by(records.iter().copied(), |r| {
        Some(if r.disease.is_empty() {
            UNKNOWN_DISEASE.to_string()
        } else {
            r.disease.clone()
        })
    });
    rank_by_cases(&mut rows);
    rows.truncate(limit);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(year: i32, disease: &str, cases: u64, deaths: u64) -> Record {
        Record {
            year,
            disease: disease.to_string(),
            area: "Pune".to_string(),
            case_count: cases,
            death_count: deaths,
            ..Record::default()
        }
    }

    fn refs(records: &[Record]) -> Vec<&Record> {
        records.iter().collect()
    }

    #[test]
    fn single_record_with_year() {
        let records = [record(2021, "Malaria", 10, 1)];
        let intent = Intent {
            year: Some(2021),
            ..Intent::default()
        };

        assert_eq!(
            summarize(&refs(&records), &intent),
            vec![
                "Summary in 2021: 10 cases and 1 deaths".to_string(),
                "Malaria: 10 cases, 1 deaths".to_string(),
            ]
        );
    }

    #[test]
    fn empty_input_is_no_match() {
        let lines = summarize(&[], &Intent::default());
        assert_eq!(lines, vec![NO_MATCH.to_string()]);
        assert!(is_no_match(&lines));
    }

    #[test]
    fn huge_counts_do_not_overflow() {
        let records = [
            record(2021, "Malaria", u64::MAX, 0),
            record(2021, "Malaria", 1, 0),
        ];
        let lines = summarize(&refs(&records), &Intent::default());
        assert_eq!(
            lines[0],
            format!("Summary: {} cases and 0 deaths", u64::MAX)
        );
    }

    #[test]
    fn headline_follows_metric() {
        let totals = Totals {
            cases: 12,
            deaths: 3,
        };
        let deaths = Intent {
            metric: Metric::Deaths,
            year: Some(2019),
            ..Intent::default()
        };
        let cases = Intent {
            metric: Metric::Cases,
            ..Intent::default()
        };

        assert_eq!(headline(totals, &deaths), "Total deaths in 2019: 3");
        assert_eq!(headline(totals, &cases), "Total cases: 12");
        assert_eq!(
            headline(totals, &Intent::default()),
            "Summary: 12 cases and 3 deaths"
        );
    }

    #[test]
    fn lists_top_five_by_cases() {
        let records = [
            record(2021, "A", 1, 0),
            record(2021, "B", 7, 0),
            record(2021, "C", 3, 0),
            record(2021, "B", 1, 2),
            record(2021, "D", 4, 0),
            record(2021, "E", 2, 0),
            record(2021, "F", 5, 0),
        ];
        let lines = summarize(&refs(&records), &Intent::default());

        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "Summary: 23 cases and 2 deaths");
        assert_eq!(lines[1], "B: 8 cases, 2 deaths");
        assert_eq!(lines[2], "F: 5 cases, 0 deaths");
        assert_eq!(lines[5], "E: 2 cases, 0 deaths");
        assert!(!lines.iter().any(|l| l.starts_with("A:")));
    }

    #[test]
    fn ties_keep_encounter_order() {
        let records = [
            record(2021, "Dengue", 4, 0),
            record(2021, "Malaria", 4, 0),
            record(2021, "Fever", 4, 0),
        ];
        let lines = summarize(&refs(&records), &Intent::default());
        assert_eq!(lines[1], "Dengue: 4 cases, 0 deaths");
        assert_eq!(lines[2], "Malaria: 4 cases, 0 deaths");
        assert_eq!(lines[3], "Fever: 4 cases, 0 deaths");
    }

    #[test]
    fn totals_do_not_depend_on_order() {
        let records = [
            record(2021, "Dengue", 4, 1),
            record(2021, "Malaria", 9, 0),
            record(2021, "Fever", 2, 5),
        ];
        let forward = refs(&records);
        let mut reversed = forward.clone();
        reversed.reverse();

        let intent = Intent::default();
        assert_eq!(summarize(&forward, &intent)[0], summarize(&reversed, &intent)[0]);
    }

    #[test]
    fn zero_count_records_still_group() {
        let records = [record(2021, "Malaria", 0, 0), record(2021, "", 3, 0)];
        let lines = summarize(&refs(&records), &Intent::default());
        assert_eq!(lines[1], "Unknown: 3 cases, 0 deaths");
        assert_eq!(lines[2], "Malaria: 0 cases, 0 deaths");
    }
}
