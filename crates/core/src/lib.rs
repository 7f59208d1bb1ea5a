// pricecalc Core - Domain Logic & Ports
// NO infrastructure dependencies: file formats and consoles live in adapters

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use error::{AppError, JobCause, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
