//! Selects the records an [`Intent`] asks about.

use surveillance_map_analytics_models::Intent;
use surveillance_map_records_models::Record;

/// Returns the records matching every active constraint of `intent`, in
/// store order.
///
/// An intent without filters returns every record.
#[must_use]
pub fn filter<'a>(records: &'a [Record], intent: &Intent) -> Vec<&'a Record> {
    let filtered: Vec<&Record> = records.iter().filter(|r| matches(r, intent)).collect();
    log::debug!(
        "Filter kept {} of {} records for {intent:?}",
        filtered.len(),
        records.len()
    );
    filtered
}

/// Returns `true` if `record` satisfies `intent`.
///
/// * `year`: exact equality when set.
/// * `diseases`: the lower-cased disease contains any term.
/// * `areas`: the lower-cased area contains any term.
#[must_use]
pub fn matches(record: &Record, intent: &Intent) -> bool {
    if let Some(year) = intent.year
        && record.year != year
    {
        return false;
    }

    contains_any(&record.disease, &intent.diseases) && contains_any(&record.area, &intent.areas)
}

/// An empty term list matches anything.
fn contains_any(field: &str, terms: &[String]) -> bool {
    if terms.is_empty() {
        return true;
    }
    let lower = field.to_lowercase();
    terms.iter().any(|term| lower.contains(term.as_str()))
}
