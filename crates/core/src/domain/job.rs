// Job Domain Model

use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, Result};
use crate::domain::TaxRate;

/// Job State
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobState::Pending => write!(f, "PENDING"),
            JobState::Running => write!(f, "RUNNING"),
            JobState::Succeeded => write!(f, "SUCCEEDED"),
            JobState::Failed => write!(f, "FAILED"),
        }
    }
}

/// Pipeline phase a job was in when it failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    /// Building the source/sink binding for the rate
    Setup,
    Read,
    /// Applying the tax rate to the records
    Transform,
    Write,
}

impl std::fmt::Display for JobPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobPhase::Setup => write!(f, "setup"),
            JobPhase::Read => write!(f, "read"),
            JobPhase::Transform => write!(f, "transform"),
            JobPhase::Write => write!(f, "write"),
        }
    }
}

/// Bookkeeping for one price job execution
///
/// Transitions: `Pending -> Running -> {Succeeded, Failed}`. A job that
/// could not even be set up goes straight from `Pending` to `Failed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRun {
    pub tax_rate: TaxRate,
    /// Human-readable description of the sink destination
    pub target: Option<String>,
    pub state: JobState,

    pub started_at: Option<i64>, // epoch ms
    pub finished_at: Option<i64>,

    pub records_written: usize,
    pub error: Option<String>,
}

impl JobRun {
    pub fn new(tax_rate: TaxRate) -> Self {
        Self {
            tax_rate,
            target: None,
            state: JobState::Pending,
            started_at: None,
            finished_at: None,
            records_written: 0,
            error: None,
        }
    }

    /// Transition to Running state with explicit timestamp
    pub fn start(&mut self, target: impl Into<String>, now_millis: i64) -> Result<()> {
        if self.state != JobState::Pending {
            return Err(DomainError::InvalidStateTransition {
                from: self.state.to_string(),
                to: JobState::Running.to_string(),
            });
        }
        self.state = JobState::Running;
        self.target = Some(target.into());
        self.started_at = Some(now_millis);
        Ok(())
    }

    /// Transition to Succeeded state with explicit timestamp
    pub fn succeed(&mut self, records_written: usize, now_millis: i64) -> Result<()> {
        if self.state != JobState::Running {
            return Err(DomainError::InvalidStateTransition {
                from: self.state.to_string(),
                to: JobState::Succeeded.to_string(),
            });
        }
        self.state = JobState::Succeeded;
        self.records_written = records_written;
        self.finished_at = Some(now_millis);
        Ok(())
    }

    /// Mark as Failed with explicit timestamp
    pub fn fail(&mut self, error: impl Into<String>, now_millis: i64) -> Result<()> {
        if self.is_finished() {
            return Err(DomainError::InvalidStateTransition {
                from: self.state.to_string(),
                to: JobState::Failed.to_string(),
            });
        }
        self.state = JobState::Failed;
        self.error = Some(error.into());
        self.finished_at = Some(now_millis);
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, JobState::Succeeded | JobState::Failed)
    }

    pub fn duration_ms(&self) -> Option<i64> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }
}
