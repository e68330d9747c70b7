//! Upstream record sources.
//!
//! A source hands back every raw row it has, fully materialized and in a
//! stable order. Pagination, retries and file parsing stay inside the
//! source; the store only ever sees the finished `Vec`.

pub mod csv_file;
pub mod postgrest;

use std::sync::Arc;

use surveillance_map_records_models::RawRecord;

use crate::RecordsError;

pub use csv_file::CsvSource;
pub use postgrest::PostgrestSource;

/// Default table holding the surveillance rows.
pub const DEFAULT_TABLE: &str = "govdata";

/// A bulk source of raw surveillance rows.
#[async_trait::async_trait]
pub trait RecordSource: Send + Sync {
    /// Human-readable label for log messages.
    fn name(&self) -> &str;

    /// Fetches every row the source holds.
    ///
    /// # Errors
    ///
    /// Returns [`RecordsError`] if the rows cannot be fetched or parsed.
    async fn fetch_all(&self) -> Result<Vec<RawRecord>, RecordsError>;
}

/// Creates a record source from environment variables.
///
/// `RECORDS_CSV` wins when set, so a local cleaned export can be served
/// without network access. Otherwise `SUPABASE_URL` and `SUPABASE_KEY`
/// select the remote table (`RECORDS_TABLE`, default [`DEFAULT_TABLE`]).
///
/// # Errors
///
/// Returns [`RecordsError::Config`] if neither source is configured.
pub fn source_from_env() -> Result<Arc<dyn RecordSource>, RecordsError> {
    source_from_vars(|name| std::env::var(name).ok())
}

/// Same selection as [`source_from_env`], reading variables through `var`.
///
/// # Errors
///
/// Returns [`RecordsError::Config`] if neither source is configured.
pub fn source_from_vars(
    var: impl Fn(&str) -> Option<String>,
) -> Result<Arc<dyn RecordSource>, RecordsError> {
    if let Some(path) = var("RECORDS_CSV") {
        log::info!("Using CSV record source at {path}");
        return Ok(Arc::new(CsvSource::new(path)));
    }

    let url = var("SUPABASE_URL").ok_or_else(|| RecordsError::Config {
        message: "Set RECORDS_CSV, or SUPABASE_URL and SUPABASE_KEY".to_string(),
    })?;
    let key = var("SUPABASE_KEY").ok_or_else(|| RecordsError::Config {
        message: "SUPABASE_KEY environment variable not set".to_string(),
    })?;
    let table = var("RECORDS_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string());

    log::info!("Using PostgREST record source {url} (table {table})");
    Ok(Arc::new(PostgrestSource::new(url, key, table)))
}
