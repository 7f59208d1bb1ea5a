// Application Layer - Use Cases and Business Logic

pub mod price_job;
pub mod runner;

// Re-exports
pub use price_job::{apply_tax, PriceJob};
pub use runner::{JobRunner, RunSummary};
