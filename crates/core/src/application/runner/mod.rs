// Job Runner - one price job per configured tax rate

pub mod constants;
mod panic_guard;
mod summary;

pub use panic_guard::{execute_guarded, panic_message, PanicGuardResult};
pub use summary::RunSummary;

use crate::application::price_job::PriceJob;
use crate::domain::{JobPhase, JobRun, TaxRate};
use crate::port::{JobFactory, TimeProvider};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// Runs price jobs over an ordered list of tax rates
///
/// A failing job is logged and recorded in the summary; it never stops
/// the jobs for the remaining rates.
pub struct JobRunner {
    factory: Arc<dyn JobFactory>,
    time_provider: Arc<dyn TimeProvider>,
}

impl JobRunner {
    pub fn new(factory: Arc<dyn JobFactory>, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            factory,
            time_provider,
        }
    }

    /// Run one job per rate, strictly in the given order
    ///
    /// Each job finishes (artifacts written or failure recorded) before the
    /// next one is set up.
    pub async fn run(&self, tax_rates: &[TaxRate]) -> RunSummary {
        info!(jobs = tax_rates.len(), "Starting price jobs");

        let mut jobs = Vec::with_capacity(tax_rates.len());
        for tax_rate in tax_rates {
            let run = Self::execute(
                Arc::clone(&self.factory),
                Arc::clone(&self.time_provider),
                *tax_rate,
            )
            .await;
            jobs.push(run);
        }

        Self::finish(jobs)
    }

    /// Run jobs on at most `max_workers` concurrent tasks
    ///
    /// Every task owns its own source and sink; outcomes are merged back
    /// into rate order. `max_workers <= 1` is the sequential `run`.
    pub async fn run_concurrent(&self, tax_rates: &[TaxRate], max_workers: usize) -> RunSummary {
        if max_workers <= 1 {
            return self.run(tax_rates).await;
        }

        info!(
            jobs = tax_rates.len(),
            max_workers = max_workers,
            "Starting price jobs concurrently"
        );

        let semaphore = Arc::new(Semaphore::new(max_workers));
        let mut join_set = JoinSet::new();

        for (index, tax_rate) in tax_rates.iter().copied().enumerate() {
            let factory = Arc::clone(&self.factory);
            let time_provider = Arc::clone(&self.time_provider);
            let semaphore = Arc::clone(&semaphore);

            join_set.spawn(async move {
                // The semaphore is never closed, so acquire cannot fail
                let _permit = semaphore.acquire_owned().await.ok();
                (index, Self::execute(factory, time_provider, tax_rate).await)
            });
        }

        let mut slots: Vec<Option<JobRun>> = vec![None; tax_rates.len()];
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, run)) => slots[index] = Some(run),
                Err(join_err) => error!(error = ?join_err, "Price job task aborted"),
            }
        }

        let now = self.time_provider.now_millis();
        let jobs = slots
            .into_iter()
            .zip(tax_rates.iter().copied())
            .map(|(slot, tax_rate)| {
                slot.unwrap_or_else(|| {
                    let mut run = JobRun::new(tax_rate);
                    Self::record_failure(&mut run, "job task aborted", now);
                    run
                })
            })
            .collect();

        Self::finish(jobs)
    }

    /// Set up and process the job for one rate
    async fn execute(
        factory: Arc<dyn JobFactory>,
        time_provider: Arc<dyn TimeProvider>,
        tax_rate: TaxRate,
    ) -> JobRun {
        let mut run = JobRun::new(tax_rate);

        let binding = match execute_guarded(AssertUnwindSafe(|| factory.build(&tax_rate))) {
            PanicGuardResult::Success(Ok(binding)) => binding,
            PanicGuardResult::Success(Err(e)) => {
                error!(
                    tax_rate = %tax_rate,
                    phase = %JobPhase::Setup,
                    error = %e,
                    "Could not set up price job"
                );
                let message = format!("Job {} failed for tax rate {}: {}", JobPhase::Setup, tax_rate, e);
                Self::record_failure(&mut run, message, time_provider.now_millis());
                return run;
            }
            PanicGuardResult::Panicked(msg) => {
                let message = format!("Job {} panicked for tax rate {}: {}", JobPhase::Setup, tax_rate, msg);
                Self::record_failure(&mut run, message, time_provider.now_millis());
                return run;
            }
        };

        let target = binding.target.clone();
        if let Err(e) = run.start(target.clone(), time_provider.now_millis()) {
            warn!(tax_rate = %tax_rate, error = %e, "Unexpected job state");
        }
        info!(tax_rate = %tax_rate, target = %target, "Processing price job");

        // Spawned so a panicking source or sink only fails this job
        let job = PriceJob::from_binding(binding, tax_rate);
        let handle = tokio::task::spawn(job.process());

        match handle.await {
            Ok(Ok(records_written)) => {
                if let Err(e) = run.succeed(records_written, time_provider.now_millis()) {
                    warn!(tax_rate = %tax_rate, error = %e, "Unexpected job state");
                }
            }
            Ok(Err(e)) => {
                error!(
                    tax_rate = %tax_rate,
                    target = %target,
                    phase = ?e.phase(),
                    error = %e,
                    "Price job failed"
                );
                Self::record_failure(&mut run, e.to_string(), time_provider.now_millis());
            }
            Err(join_err) => {
                let message = if join_err.is_panic() {
                    let payload = join_err.into_panic();
                    let msg = panic_message(&*payload);
                    error!(tax_rate = %tax_rate, target = %target, panic_msg = %msg, "Price job panicked");
                    format!("Job panicked for tax rate {}: {}", tax_rate, msg)
                } else {
                    error!(tax_rate = %tax_rate, target = %target, "Price job cancelled");
                    format!("Job cancelled for tax rate {}", tax_rate)
                };
                Self::record_failure(&mut run, message, time_provider.now_millis());
            }
        }

        run
    }

    fn record_failure(run: &mut JobRun, message: impl Into<String>, now_millis: i64) {
        if let Err(e) = run.fail(message, now_millis) {
            warn!(tax_rate = %run.tax_rate, error = %e, "Unexpected job state");
        }
    }

    fn finish(jobs: Vec<JobRun>) -> RunSummary {
        let summary = RunSummary::new(jobs);
        if summary.is_success() {
            info!(jobs = summary.len(), "All price jobs succeeded");
        } else {
            warn!(
                jobs = summary.len(),
                failed = summary.failure_count(),
                "Price jobs finished with failures"
            );
        }
        summary
    }
}
