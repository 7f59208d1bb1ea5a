// JSON price sinks (file and generic writer)
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncWrite, AsyncWriteExt, Stdout};
use tracing::{debug, warn};

use pricecalc_core::domain::Record;
use pricecalc_core::port::{PriceSink, SinkError};

/// Encode records as a pretty-printed JSON array (two-space indent)
pub fn encode_records(records: &[Record]) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec_pretty(records)
}

/// Writes records to a JSON file, replacing any existing file
///
/// The array is written to a temporary sibling first and renamed over the
/// target, so the destination either holds the complete new array or is
/// left untouched.
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn unavailable(&self, reason: impl Into<String>) -> SinkError {
        SinkError::Unavailable {
            destination: self.describe(),
            reason: reason.into(),
        }
    }

    fn temp_path(&self) -> Result<PathBuf, SinkError> {
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| self.unavailable("path does not name a file"))?;
        let tmp_name = format!(
            ".{}.{}.tmp",
            file_name.to_string_lossy(),
            uuid::Uuid::new_v4()
        );
        Ok(self.path.with_file_name(tmp_name))
    }
}

#[async_trait]
impl PriceSink for JsonFileSink {
    async fn write(&mut self, records: &[Record]) -> Result<(), SinkError> {
        let bytes = encode_records(records)
            .map_err(|e| self.unavailable(format!("failed encoding records: {e}")))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.unavailable(format!("failed creating {}: {e}", parent.display())))?;
        }

        let tmp_path = self.temp_path()?;
        if let Err(e) = tokio::fs::write(&tmp_path, &bytes).await {
            discard(&tmp_path).await;
            return Err(self.unavailable(format!("failed writing {}: {e}", tmp_path.display())));
        }
        if let Err(e) = tokio::fs::rename(&tmp_path, &self.path).await {
            discard(&tmp_path).await;
            return Err(self.unavailable(format!("failed replacing {}: {e}", self.path.display())));
        }

        debug!(
            destination = %self.path.display(),
            records = records.len(),
            bytes = bytes.len(),
            "Wrote JSON artifact"
        );
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

async fn discard(tmp_path: &Path) {
    if let Err(e) = tokio::fs::remove_file(tmp_path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %tmp_path.display(), error = %e, "Could not remove temp file");
        }
    }
}

/// Writes records as JSON (plus a trailing newline) to any async writer
///
/// Encoding finishes before the first byte is written, so an encoding
/// failure leaves the writer untouched.
pub struct JsonWriterSink<W> {
    writer: W,
    label: String,
}

impl JsonWriterSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout(), "stdout")
    }
}

impl<W> JsonWriterSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(writer: W, label: impl Into<String>) -> Self {
        Self {
            writer,
            label: label.into(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W> PriceSink for JsonWriterSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn write(&mut self, records: &[Record]) -> Result<(), SinkError> {
        let unavailable = |reason: String| SinkError::Unavailable {
            destination: self.label.clone(),
            reason,
        };

        let mut bytes = encode_records(records).map_err(|e| unavailable(e.to_string()))?;
        bytes.push(b'\n');

        self.writer
            .write_all(&bytes)
            .await
            .map_err(|e| unavailable(e.to_string()))?;
        self.writer
            .flush()
            .await
            .map_err(|e| unavailable(e.to_string()))
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn records() -> Vec<Record> {
        vec![
            Record::new("A", "Widget", Decimal::from_str("10.70").unwrap()).unwrap(),
            Record::new("B", "Gadget", Decimal::from_str("21.40").unwrap()).unwrap(),
        ]
    }

    #[test]
    fn test_encode_uses_two_space_indent() {
        let encoded = String::from_utf8(encode_records(&records()[..1]).unwrap()).unwrap();
        assert_eq!(
            encoded,
            "[\n  {\n    \"id\": \"A\",\n    \"title\": \"Widget\",\n    \"price\": 10.7\n  }\n]"
        );
        assert_eq!(encode_records(&[]).unwrap(), b"[]");
    }

    #[tokio::test]
    async fn test_file_sink_overwrites_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("result_7.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "stale").unwrap();

        let mut sink = JsonFileSink::new(&path);
        sink.write(&records()).await.unwrap();

        let written: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(written[1]["price"], serde_json::json!(21.4));

        let entries: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_file_sink_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("result_0.json");

        JsonFileSink::new(&path).write(&[]).await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }

    #[tokio::test]
    async fn test_file_sink_unwritable_destination() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let mut sink = JsonFileSink::new(blocker.join("result_7.json"));
        let err = sink.write(&records()).await.unwrap_err();

        assert!(matches!(err, SinkError::Unavailable { .. }));
        assert_eq!(std::fs::read_to_string(&blocker).unwrap(), "not a directory");
    }

    #[tokio::test]
    async fn test_writer_sink() {
        let mut sink = JsonWriterSink::new(Vec::new(), "buffer");
        sink.write(&records()).await.unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert!(out.ends_with("]\n"));
        assert!(out.contains("\"title\": \"Gadget\""));
    }
}
