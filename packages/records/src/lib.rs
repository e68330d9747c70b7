#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory surveillance record store and upstream record sources.
//!
//! The [`store::RecordStore`] holds the whole dataset as one immutable
//! snapshot that is swapped atomically on refresh. Sources implement
//! [`sources::RecordSource`] and hand back fully materialized rows; the
//! store coerces them into typed records once, at load time.

pub mod retry;
pub mod sources;
pub mod store;

pub use store::{RecordSnapshot, RecordStore, RefreshOutcome};

use thiserror::Error;

/// Errors that can occur while loading surveillance records.
#[derive(Debug, Error)]
pub enum RecordsError {
    /// HTTP request to the record source failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Reading a local file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The source returned something that is not a page of rows.
    #[error("Source error: {message}")]
    Source {
        /// Description of what went wrong.
        message: String,
    },

    /// No usable source configuration was found.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },
}
