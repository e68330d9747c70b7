//! Paginated fetcher for a PostgREST table endpoint (Supabase and
//! compatible servers).
//!
//! Pages are requested with `offset`/`limit` query parameters until the
//! server returns a short or empty page.

use surveillance_map_records_models::RawRecord;

use super::RecordSource;
use crate::{RecordsError, retry};

/// Rows requested per page. Supabase caps responses at 1000 rows.
pub const DEFAULT_PAGE_SIZE: u64 = 1000;

/// Remote table source.
pub struct PostgrestSource {
    base_url: String,
    api_key: String,
    table: String,
    page_size: u64,
    client: reqwest::Client,
    label: String,
}

impl PostgrestSource {
    /// Creates a source for `table` on the project at `base_url`.
    #[must_use]
    pub fn new(base_url: String, api_key: String, table: String) -> Self {
        let label = format!("postgrest:{table}");
        Self {
            base_url,
            api_key,
            table,
            page_size: DEFAULT_PAGE_SIZE,
            client: reqwest::Client::new(),
            label,
        }
    }

    /// Overrides the page size.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size;
        self
    }

    fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.base_url.trim_end_matches('/'),
            self.table
        )
    }
}

#[async_trait::async_trait]
impl RecordSource for PostgrestSource {
    fn name(&self) -> &str {
        &self.label
    }

    async fn fetch_all(&self) -> Result<Vec<RawRecord>, RecordsError> {
        let url = self.table_url();
        let mut rows = Vec::new();
        let mut offset: u64 = 0;

        loop {
            let offset_param = offset.to_string();
            let limit_param = self.page_size.to_string();
            let body = retry::send_json(|| {
                self.client
                    .get(&url)
                    .query(&[
                        ("select", "*"),
                        ("offset", offset_param.as_str()),
                        ("limit", limit_param.as_str()),
                    ])
                    .header("apikey", &self.api_key)
                    .bearer_auth(&self.api_key)
            })
            .await?;

            let page = parse_page(body)?;
            let count = page.len() as u64;
            rows.extend(page);

            log::info!(
                "[{}] Page at offset {offset}: {count} rows (total: {})",
                self.label,
                rows.len()
            );

            if !has_more(count, self.page_size) {
                break;
            }
            offset += self.page_size;
        }

        Ok(rows)
    }
}

/// Returns `true` if a page of `count` rows may be followed by another.
const fn has_more(count: u64, page_size: u64) -> bool {
    count > 0 && count >= page_size
}

/// Splits a JSON array response into rows. Non-object entries are dropped.
fn parse_page(body: serde_json::Value) -> Result<Vec<RawRecord>, RecordsError> {
    let serde_json::Value::Array(items) = body else {
        return Err(RecordsError::Source {
            message: format!("expected a JSON array page, got {body}"),
        });
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            serde_json::Value::Object(map) => Some(map),
            other => {
                log::warn!("Skipping non-object row {other}");
                None
            }
        })
        .collect())
}
