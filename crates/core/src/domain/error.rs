// Domain Error Types

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid job state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Invalid tax rate: {0}")]
    InvalidTaxRate(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Price overflow: {price} at tax rate {rate} exceeds the decimal range")]
    PriceOverflow { price: Decimal, rate: Decimal },
}

pub type Result<T> = std::result::Result<T, DomainError>;
