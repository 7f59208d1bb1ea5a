// File-backed price source
// reason: csv handles quoting and trimming of delimiter-separated lines
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

use pricecalc_core::application::runner::constants::DEFAULT_DELIMITER;
use pricecalc_core::domain::{parse_price, Record};
use pricecalc_core::port::{PriceSource, SourceError};

const FIELDS_PER_LINE: usize = 3;

/// Reads `id<d>title<d>price` lines from a text file
///
/// Fields are whitespace-trimmed and may be double-quoted. Blank lines are
/// skipped; any other line that does not decode fails the whole read.
pub struct FilePriceSource {
    path: PathBuf,
    delimiter: u8,
}

impl FilePriceSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: DEFAULT_DELIMITER as u8,
        }
    }

    /// Override the field delimiter (`,` by default)
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

#[async_trait]
impl PriceSource for FilePriceSource {
    async fn read(&mut self) -> Result<Vec<Record>, SourceError> {
        let origin = self.describe();
        let content = tokio::fs::read(&self.path)
            .await
            .map_err(|e| SourceError::Unavailable {
                origin: origin.clone(),
                reason: e.to_string(),
            })?;

        let records = parse_records(&content, self.delimiter, &origin)?;
        debug!(origin = %origin, records = records.len(), "Parsed price file");
        Ok(records)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Decode delimiter-separated lines into records
///
/// `origin` only labels errors.
pub fn parse_records(content: &[u8], delimiter: u8, origin: &str) -> Result<Vec<Record>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content);

    let malformed = |line: u64, reason: String| SourceError::MalformedRecord {
        origin: origin.to_string(),
        entry: line,
        reason,
    };

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let fallback_line = index as u64 + 1;
        let row = row.map_err(|e| {
            let line = e.position().map(|p| p.line()).unwrap_or(fallback_line);
            malformed(line, e.to_string())
        })?;
        let line = row.position().map(|p| p.line()).unwrap_or(fallback_line);

        // Whitespace-only line
        if row.len() == 1 && row[0].is_empty() {
            continue;
        }

        if row.len() != FIELDS_PER_LINE {
            return Err(malformed(
                line,
                format!("expected {} fields, found {}", FIELDS_PER_LINE, row.len()),
            ));
        }

        let price = parse_price(&row[2]).map_err(|e| malformed(line, e.to_string()))?;

        let record = Record::new(&row[0], &row[1], price).map_err(|e| malformed(line, e.to_string()))?;
        records.push(record);
    }

    Ok(records)
}
