// Run Summary - outcome of one pass over the configured tax rates

use serde::Serialize;

use crate::domain::{JobRun, JobState};

/// Ordered job outcomes, one per tax rate
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub jobs: Vec<JobRun>,
}

impl RunSummary {
    pub fn new(jobs: Vec<JobRun>) -> Self {
        Self { jobs }
    }

    pub fn failures(&self) -> impl Iterator<Item = &JobRun> {
        self.jobs.iter().filter(|j| j.state == JobState::Failed)
    }

    pub fn successes(&self) -> impl Iterator<Item = &JobRun> {
        self.jobs.iter().filter(|j| j.state == JobState::Succeeded)
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    pub fn is_success(&self) -> bool {
        self.failure_count() == 0
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
