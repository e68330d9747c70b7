//! Closed-vocabulary intent extraction.
//!
//! Questions are classified by plain substring matching against fixed
//! keyword lists. The lists are never widened from dataset values.

use std::sync::LazyLock;

use regex::Regex;
use surveillance_map_analytics_models::{Intent, Metric};

/// First four-digit number starting with `20` is taken as the year.
static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"20[0-9]{2}").expect("valid regex"));

/// Keywords selecting [`Metric::Deaths`]. Checked before [`CASE_KEYWORDS`].
pub const DEATH_KEYWORDS: &[&str] = &["death", "fatalities", "mortality"];

/// Keywords selecting [`Metric::Cases`].
pub const CASE_KEYWORDS: &[&str] = &["case", "outbreak", "incident"];

/// Disease terms recognized in questions.
pub const DISEASE_TERMS: &[&str] = &[
    "malaria",
    "dengue",
    "chikungunya",
    "fever",
    "diarrheal",
    "poisoning",
];

/// District terms recognized in questions.
pub const AREA_TERMS: &[&str] = &["mumbai", "pune", "nagpur", "nashik", "aurangabad"];

/// The closed term lists an extractor matches against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    diseases: Vec<String>,
    areas: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new(DISEASE_TERMS, AREA_TERMS)
    }
}

impl Vocabulary {
    /// Builds a vocabulary from explicit term lists.
    ///
    /// Terms are lower-cased; later duplicates are dropped so a question can
    /// never produce the same term twice.
    #[must_use]
    pub fn new(diseases: &[&str], areas: &[&str]) -> Self {
        Self {
            diseases: normalize_terms(diseases),
            areas: normalize_terms(areas),
        }
    }

    /// Disease terms in match order.
    #[must_use]
    pub fn diseases(&self) -> &[String] {
        &self.diseases
    }

    /// Area terms in match order.
    #[must_use]
    pub fn areas(&self) -> &[String] {
        &self.areas
    }
}

fn normalize_terms(terms: &[&str]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(terms.len());
    for term in terms {
        let term = term.trim().to_lowercase();
        if !term.is_empty() && !out.contains(&term) {
            out.push(term);
        }
    }
    out
}

/// Turns free-text questions into [`Intent`]s.
#[derive(Debug, Clone, Default)]
pub struct IntentExtractor {
    vocabulary: Vocabulary,
}

impl IntentExtractor {
    /// Creates an extractor over an explicit vocabulary.
    #[must_use]
    pub const fn new(vocabulary: Vocabulary) -> Self {
        Self { vocabulary }
    }

    /// Extracts the year, metric, diseases and areas mentioned in `text`.
    ///
    /// Never fails. A question mentioning nothing known yields an intent
    /// with no filters and [`Metric::Both`].
    #[must_use]
    pub fn extract(&self, text: &str) -> Intent {
        let lower = text.to_lowercase();

        let intent = Intent {
            year: extract_year(text),
            metric: classify_metric(&lower),
            diseases: matching_terms(&self.vocabulary.diseases, &lower),
            areas: matching_terms(&self.vocabulary.areas, &lower),
        };

        log::debug!("Extracted intent {intent:?} from {text:?}");
        intent
    }
}

/// Extracts an [`Intent`] using the default vocabulary.
#[must_use]
pub fn extract_intent(text: &str) -> Intent {
    IntentExtractor::default().extract(text)
}

fn extract_year(text: &str) -> Option<i32> {
    YEAR_RE
        .find(text)
        .and_then(|m| m.as_str().parse::<i32>().ok())
}

/// Picks the metric for an already lower-cased question.
///
/// Death keywords win whenever present, so "case fatalities" asks about
/// deaths. "fatality" alone is not a death keyword.
#[must_use]
pub fn classify_metric(lower: &str) -> Metric {
    if DEATH_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Metric::Deaths
    } else if CASE_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Metric::Cases
    } else {
        Metric::Both
    }
}

fn matching_terms(terms: &[String], lower: &str) -> Vec<String> {
    terms
        .iter()
        .filter(|term| lower.contains(term.as_str()))
        .cloned()
        .collect()
}
