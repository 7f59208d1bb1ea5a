// Record Domain Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::error::{DomainError, Result};

/// One priced item
///
/// `price` always holds the price for the current pipeline stage: the
/// base price after reading, the tax-inclusive price after a job has
/// transformed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl Record {
    /// Create a validated record (non-empty id, non-negative price)
    pub fn new(id: impl Into<String>, title: impl Into<String>, price: Decimal) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::InvalidRecord("id must not be empty".to_string()));
        }
        if price.is_sign_negative() && !price.is_zero() {
            return Err(DomainError::InvalidRecord(format!(
                "price {} is negative",
                price
            )));
        }
        Ok(Self {
            id,
            title: title.into(),
            price,
        })
    }
}

/// Parse a plain decimal price (`10`, `10.00`, `.5`)
///
/// Digit separators such as `1_000` are rejected.
pub fn parse_price(raw: &str) -> Result<Decimal> {
    let not_a_number = || DomainError::InvalidRecord(format!("price {:?} is not a number", raw));
    if raw.contains('_') {
        return Err(not_a_number());
    }
    Decimal::from_str(raw).map_err(|_| not_a_number())
}
