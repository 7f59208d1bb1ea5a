// Tax-Included Price Job - read, apply tax, write

use crate::domain::{DomainError, Record, TaxRate};
use crate::error::{AppError, Result};
use crate::port::{JobBinding, PriceSink, PriceSource};
use tracing::{debug, info, warn};

/// One bound (source, sink, tax rate) pipeline
///
/// `process` consumes the job, so a job runs at most once.
pub struct PriceJob {
    source: Box<dyn PriceSource>,
    sink: Box<dyn PriceSink>,
    tax_rate: TaxRate,
}

impl PriceJob {
    pub fn new(source: Box<dyn PriceSource>, sink: Box<dyn PriceSink>, tax_rate: TaxRate) -> Self {
        Self {
            source,
            sink,
            tax_rate,
        }
    }

    pub fn from_binding(binding: JobBinding, tax_rate: TaxRate) -> Self {
        Self::new(binding.source, binding.sink, tax_rate)
    }

    /// Run the pipeline once
    ///
    /// Returns the number of records written. Source, transform and sink
    /// failures come back as `AppError::JobFailed` tagged with the phase;
    /// no fallback list is ever substituted for a failed read, and nothing
    /// is written when a price cannot be computed.
    pub async fn process(mut self) -> Result<usize> {
        let origin = self.source.describe();
        let destination = self.sink.describe();

        let mut records = self
            .source
            .read()
            .await
            .map_err(|e| AppError::read_failed(self.tax_rate, e))?;

        debug!(
            tax_rate = %self.tax_rate,
            origin = %origin,
            records = records.len(),
            "Records read"
        );

        apply_tax(&mut records, &self.tax_rate)
            .map_err(|e| AppError::transform_failed(self.tax_rate, e))?;

        self.sink
            .write(&records)
            .await
            .map_err(|e| AppError::write_failed(self.tax_rate, e))?;

        info!(
            tax_rate = %self.tax_rate,
            destination = %destination,
            records = records.len(),
            "Price job completed"
        );

        Ok(records.len())
    }
}

/// Replace every base price with its tax-inclusive price
///
/// Stops at the first price that cannot be computed; records before it
/// are already transformed.
pub fn apply_tax(records: &mut [Record], tax_rate: &TaxRate) -> std::result::Result<(), DomainError> {
    for record in records.iter_mut() {
        record.price = tax_rate.apply(record.price).map_err(|e| {
            warn!(tax_rate = %tax_rate, record = %record.id, error = %e, "Price out of range");
            e
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::JobPhase;
    use crate::port::price_sink::mocks::{FailingSink, RecordingSink};
    use crate::port::price_source::mocks::{FailingSource, InMemorySource};
    use crate::port::SourceError;
    use crate::JobCause;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn record(id: &str, title: &str, price: &str) -> Record {
        Record::new(id, title, Decimal::from_str(price).unwrap()).unwrap()
    }

    fn prices(batch: &[Record]) -> Vec<Decimal> {
        batch.iter().map(|r| r.price).collect()
    }

    #[tokio::test]
    async fn test_process_applies_tax() {
        let sink = RecordingSink::new();
        let job = PriceJob::new(
            Box::new(InMemorySource::new(vec![
                record("A", "Widget", "10.00"),
                record("B", "Gadget", "20.00"),
            ])),
            Box::new(sink.clone()),
            "0.07".parse().unwrap(),
        );

        let written = job.process().await.unwrap();

        assert_eq!(written, 2);
        let batches = sink.batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(
            prices(&batches[0]),
            vec![Decimal::from_str("10.70").unwrap(), Decimal::from_str("21.40").unwrap()]
        );
        assert_eq!(batches[0][0].id, "A");
        assert_eq!(batches[0][1].title, "Gadget");
    }

    #[tokio::test]
    async fn test_empty_input_writes_empty_batch() {
        let sink = RecordingSink::new();
        let job = PriceJob::new(
            Box::new(InMemorySource::new(vec![])),
            Box::new(sink.clone()),
            "0.15".parse().unwrap(),
        );

        assert_eq!(job.process().await.unwrap(), 0);
        assert_eq!(sink.batches(), vec![Vec::<Record>::new()]);
    }

    #[tokio::test]
    async fn test_source_failure_skips_write() {
        let sink = RecordingSink::new();
        let job = PriceJob::new(
            Box::new(FailingSource::new(SourceError::MalformedRecord {
                origin: "prices.txt".to_string(),
                entry: 3,
                reason: "price \"abc\" is not a number".to_string(),
            })),
            Box::new(sink.clone()),
            "0.1".parse().unwrap(),
        );

        let err = job.process().await.unwrap_err();

        assert_eq!(err.phase(), Some(JobPhase::Read));
        match err {
            AppError::JobFailed { cause, .. } => {
                assert!(matches!(cause, JobCause::Source(SourceError::MalformedRecord { entry: 3, .. })));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(sink.write_count(), 0);
    }

    #[tokio::test]
    async fn test_sink_failure_is_write_phase() {
        let job = PriceJob::new(
            Box::new(InMemorySource::new(vec![record("A", "Widget", "1")])),
            Box::new(FailingSink::new("disk full")),
            "0.1".parse().unwrap(),
        );

        let err = job.process().await.unwrap_err();

        assert_eq!(err.phase(), Some(JobPhase::Write));
        assert!(err.to_string().contains("0.1"));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_apply_tax_zero_rate_is_identity() {
        let mut records = vec![record("A", "Widget", "10.00"), record("B", "Gadget", "0.99")];
        let before = records.clone();

        apply_tax(&mut records, &TaxRate::zero()).unwrap();

        assert_eq!(records, before);
    }

    #[tokio::test]
    async fn test_price_overflow_is_transform_phase() {
        let sink = RecordingSink::new();
        let job = PriceJob::new(
            Box::new(InMemorySource::new(vec![
                record("A", "Widget", "10.00"),
                record("B", "Huge", "70000000000000000000000000000"),
            ])),
            Box::new(sink.clone()),
            "0.15".parse().unwrap(),
        );

        let err = job.process().await.unwrap_err();

        assert_eq!(err.phase(), Some(JobPhase::Transform));
        match err {
            AppError::JobFailed { cause, .. } => {
                assert!(matches!(cause, JobCause::Transform(DomainError::PriceOverflow { .. })));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(sink.write_count(), 0);
    }
}
