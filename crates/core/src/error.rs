// Central Error Type for the Application

use thiserror::Error;

use crate::domain::{DomainError, JobPhase, TaxRate};
use crate::port::{SinkError, SourceError};

/// Underlying cause of a failed price job
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobCause {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Transform(#[from] DomainError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Job failed for tax rate {tax_rate} during {phase}: {cause}")]
    JobFailed {
        tax_rate: TaxRate,
        phase: JobPhase,
        #[source]
        cause: JobCause,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Wrap a source failure with job context
    pub fn read_failed(tax_rate: TaxRate, err: SourceError) -> Self {
        AppError::JobFailed {
            tax_rate,
            phase: JobPhase::Read,
            cause: err.into(),
        }
    }

    /// Wrap a tax computation failure with job context
    pub fn transform_failed(tax_rate: TaxRate, err: DomainError) -> Self {
        AppError::JobFailed {
            tax_rate,
            phase: JobPhase::Transform,
            cause: err.into(),
        }
    }

    /// Wrap a sink failure with job context
    pub fn write_failed(tax_rate: TaxRate, err: SinkError) -> Self {
        AppError::JobFailed {
            tax_rate,
            phase: JobPhase::Write,
            cause: err.into(),
        }
    }

    /// Phase of a job failure, if this is one
    pub fn phase(&self) -> Option<JobPhase> {
        match self {
            AppError::JobFailed { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
