//! Local CSV export of the cleaned dataset.

use std::path::PathBuf;

use surveillance_map_records_models::RawRecord;

use super::RecordSource;
use crate::RecordsError;

/// Reads every row from a CSV file with a header line.
pub struct CsvSource {
    path: PathBuf,
    label: String,
}

impl CsvSource {
    /// Creates a source reading from `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = format!("csv:{}", path.display());
        Self { path, label }
    }
}

#[async_trait::async_trait]
impl RecordSource for CsvSource {
    fn name(&self) -> &str {
        &self.label
    }

    async fn fetch_all(&self) -> Result<Vec<RawRecord>, RecordsError> {
        let bytes = tokio::fs::read(&self.path).await?;
        let rows = parse_csv(bytes.as_slice())?;
        log::info!("[{}] Read {} rows", self.label, rows.len());
        Ok(rows)
    }
}

/// Parses CSV text into raw rows keyed by trimmed header names.
///
/// Every cell is kept as a string; coercion happens when the rows become
/// records.
///
/// # Errors
///
/// Returns [`RecordsError::Csv`] if the input is not valid CSV.
pub fn parse_csv<R: std::io::Read>(reader: R) -> Result<Vec<RawRecord>, RecordsError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();

    for result in reader.records() {
        let record = result?;
        let row: RawRecord = headers
            .iter()
            .zip(record.iter())
            .filter(|(header, _)| !header.is_empty())
            .map(|(header, value)| {
                (
                    header.to_string(),
                    serde_json::Value::String(value.to_string()),
                )
            })
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use surveillance_map_records_models::Record;

    const SAMPLE: &str = "\
 Year ,Disease,Area,No of cases,No of deaths,Date of start
2021,Malaria,Pune,10,1,05-08-2021
2020,Dengue,Nagpur,abc,,
";

    #[test]
    fn parses_rows_with_trimmed_headers() {
        let rows = parse_csv(SAMPLE.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].contains_key("Year"));

        let records: Vec<Record> = rows.iter().map(Record::from_raw).collect();
        assert_eq!(records[0].year, 2021);
        assert_eq!(records[0].case_count, 10);
        assert!(records[0].started_on.is_some());
        assert_eq!(records[1].case_count, 0);
        assert_eq!(records[1].death_count, 0);
    }

    #[test]
    fn short_rows_are_tolerated() {
        let rows = parse_csv("Year,Disease,Area\n2019,Fever\n".as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].contains_key("Area"));
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let source = CsvSource::new("/nonexistent/surveillance.csv");
        assert!(matches!(
            source.fetch_all().await,
            Err(RecordsError::Io(_))
        ));
    }
}
