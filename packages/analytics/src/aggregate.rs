//! Grouping and summing primitives shared by summaries, insights and the
//! geo-join.

use std::collections::BTreeMap;

use surveillance_map_analytics_models::AggregateRow;
use surveillance_map_records_models::Record;

/// Case and death totals over a set of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    /// Summed cases.
    pub cases: u64,
    /// Summed deaths.
    pub deaths: u64,
}

impl Totals {
    /// Sums cases and deaths over `records`.
    #[must_use]
    pub fn of<'a>(records: impl IntoIterator<Item = &'a Record>) -> Self {
        records.into_iter().fold(Self::default(), |acc, r| Self {
            cases: acc.cases.saturating_add(r.case_count),
            deaths: acc.deaths.saturating_add(r.death_count),
        })
    }

    /// Adds one record's counts, saturating at `u64::MAX`.
    pub const fn add(&mut self, record: &Record) {
        self.cases = self.cases.saturating_add(record.case_count);
        self.deaths = self.deaths.saturating_add(record.death_count);
    }
}

/// Groups records by `key`, summing cases and deaths per group.
///
/// Groups come back in the order their key was first encountered. Records
/// for which `key` returns `None` are skipped.
pub fn aggregate_by<'a, I, F>(records: I, mut key: F) -> Vec<AggregateRow>
where
    I: IntoIterator<Item = &'a Record>,
    F: FnMut(&'a Record) -> Option<String>,
{
    let mut index: BTreeMap<String, usize> = BTreeMap::new();
    let mut rows: Vec<AggregateRow> = Vec::new();

    for record in records {
        let Some(category) = key(record) else {
            continue;
        };

        let idx = *index.entry(category.clone()).or_insert_with(|| {
            rows.push(AggregateRow {
                category,
                total_cases: 0,
                total_deaths: 0,
            });
            rows.len() - 1
        });

        let row = &mut rows[idx];
        row.total_cases = row.total_cases.saturating_add(record.case_count);
        row.total_deaths = row.total_deaths.saturating_add(record.death_count);
    }

    rows
}

/// Sorts rows by cases, highest first. The sort is stable, so tied rows
/// keep their encounter order.
pub fn rank_by_cases(rows: &mut [AggregateRow]) {
    rows.sort_by(|a, b| b.total_cases.cmp(&a.total_cases));
}
