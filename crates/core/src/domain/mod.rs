// Domain Layer - Records, tax rates and job bookkeeping

pub mod error;
pub mod job;
pub mod record;
pub mod tax_rate;

// Re-exports
pub use error::DomainError;
pub use job::{JobPhase, JobRun, JobState};
pub use record::{parse_price, Record};
pub use tax_rate::{TaxRate, PRICE_SCALE};
