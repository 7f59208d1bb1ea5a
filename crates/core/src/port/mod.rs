// Port Layer - Interfaces for external dependencies

pub mod job_factory;
pub mod price_sink;
pub mod price_source;
pub mod time_provider; // For deterministic testing

// Re-exports
pub use job_factory::{JobBinding, JobFactory};
pub use price_sink::{PriceSink, SinkError};
pub use price_source::{PriceSource, SourceError};
pub use time_provider::TimeProvider;
