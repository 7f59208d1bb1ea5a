// Price Source Port
// Abstraction over where records come from (file, console, memory)

use crate::domain::Record;
use async_trait::async_trait;
use thiserror::Error;

/// Source errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("Source unavailable: {origin}: {reason}")]
    Unavailable { origin: String, reason: String },

    #[error("Malformed record at {origin}:{entry}: {reason}")]
    MalformedRecord {
        origin: String,
        /// 1-based line (file) or entry (console) number
        entry: u64,
        reason: String,
    },
}

/// Price Source trait
///
/// Implementations:
/// - FilePriceSource: delimiter-separated text file
/// - ConsolePriceSource: prompts for each field over a reader/writer pair
#[async_trait]
pub trait PriceSource: Send {
    /// Read the complete set of records available from the origin
    ///
    /// # Errors
    /// - SourceError::Unavailable if the origin cannot be opened or read
    /// - SourceError::MalformedRecord if an entry cannot be decoded; the
    ///   whole read fails, no partial list is returned
    async fn read(&mut self) -> Result<Vec<Record>, SourceError>;

    /// Short description of the origin for logs and reports
    fn describe(&self) -> String;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;

    /// Source that hands out a fixed list (fresh clone on every read)
    pub struct InMemorySource {
        records: Vec<Record>,
    }

    impl InMemorySource {
        pub fn new(records: Vec<Record>) -> Self {
            Self { records }
        }
    }

    #[async_trait]
    impl PriceSource for InMemorySource {
        async fn read(&mut self) -> Result<Vec<Record>, SourceError> {
            Ok(self.records.clone())
        }

        fn describe(&self) -> String {
            "memory".to_string()
        }
    }

    /// Source that always fails with the given error
    pub struct FailingSource {
        error: SourceError,
    }

    impl FailingSource {
        pub fn new(error: SourceError) -> Self {
            Self { error }
        }

        pub fn unavailable(reason: impl Into<String>) -> Self {
            Self::new(SourceError::Unavailable {
                origin: "mock".to_string(),
                reason: reason.into(),
            })
        }
    }

    #[async_trait]
    impl PriceSource for FailingSource {
        async fn read(&mut self) -> Result<Vec<Record>, SourceError> {
            Err(self.error.clone())
        }

        fn describe(&self) -> String {
            "failing".to_string()
        }
    }

    /// Source that panics on read (for panic isolation testing)
    pub struct PanickingSource;

    #[async_trait]
    impl PriceSource for PanickingSource {
        async fn read(&mut self) -> Result<Vec<Record>, SourceError> {
            panic!("source exploded");
        }

        fn describe(&self) -> String {
            "panicking".to_string()
        }
    }
}
