// Price Sink Port
// Abstraction over where transformed records are persisted

use crate::domain::Record;
use async_trait::async_trait;
use thiserror::Error;

/// Sink errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    #[error("Sink unavailable: {destination}: {reason}")]
    Unavailable { destination: String, reason: String },
}

/// Price Sink trait
///
/// Implementations:
/// - JsonFileSink: pretty JSON array written to a file
/// - JsonWriterSink: same encoding to any async writer (stdout)
#[async_trait]
pub trait PriceSink: Send {
    /// Persist the entire sequence
    ///
    /// Either every record is written or an error is returned; callers
    /// never observe a partially written destination.
    ///
    /// # Errors
    /// - SinkError::Unavailable if the destination cannot be created or written
    async fn write(&mut self, records: &[Record]) -> Result<(), SinkError>;

    /// Short description of the destination for logs and reports
    fn describe(&self) -> String;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Sink that records every batch it receives
    #[derive(Clone, Default)]
    pub struct RecordingSink {
        batches: Arc<Mutex<Vec<Vec<Record>>>>,
    }

    impl RecordingSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn batches(&self) -> Vec<Vec<Record>> {
            self.batches.lock().unwrap().clone()
        }

        pub fn write_count(&self) -> usize {
            self.batches.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl PriceSink for RecordingSink {
        async fn write(&mut self, records: &[Record]) -> Result<(), SinkError> {
            self.batches.lock().unwrap().push(records.to_vec());
            Ok(())
        }

        fn describe(&self) -> String {
            "recording".to_string()
        }
    }

    /// Sink that always fails
    pub struct FailingSink {
        reason: String,
    }

    impl FailingSink {
        pub fn new(reason: impl Into<String>) -> Self {
            Self {
                reason: reason.into(),
            }
        }
    }

    #[async_trait]
    impl PriceSink for FailingSink {
        async fn write(&mut self, _records: &[Record]) -> Result<(), SinkError> {
            Err(SinkError::Unavailable {
                destination: "mock".to_string(),
                reason: self.reason.clone(),
            })
        }

        fn describe(&self) -> String {
            "failing".to_string()
        }
    }
}
