// Tax Rate Domain Model

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::error::{DomainError, Result};

/// Number of decimal places kept on every tax-inclusive price
pub const PRICE_SCALE: u32 = 2;

/// Tax rate expressed as a fraction (0.07 = 7%)
///
/// Any non-negative value is legal, including rates above 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct TaxRate(Decimal);

impl TaxRate {
    /// Create a tax rate
    ///
    /// Rejects negative values and rates too large for `1 + rate` or the
    /// percentage to fit in a `Decimal`.
    pub fn new(rate: Decimal) -> Result<Self> {
        if rate.is_sign_negative() && !rate.is_zero() {
            return Err(DomainError::InvalidTaxRate(format!(
                "{} is negative",
                rate
            )));
        }
        if Decimal::ONE.checked_add(rate).is_none() || rate.checked_mul(Decimal::ONE_HUNDRED).is_none() {
            return Err(DomainError::InvalidTaxRate(format!(
                "{} is too large",
                rate
            )));
        }
        Ok(Self(rate.normalize()))
    }

    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Apply the rate to a base price: `round(price * (1 + rate), 2)`
    ///
    /// Midpoints round away from zero, which is half-up for the
    /// non-negative prices records carry. A product outside the `Decimal`
    /// range is `PriceOverflow`.
    pub fn apply(&self, price: Decimal) -> Result<Decimal> {
        let overflow = || DomainError::PriceOverflow {
            price,
            rate: self.0,
        };
        let factor = Decimal::ONE.checked_add(self.0).ok_or_else(overflow)?;
        let gross = price.checked_mul(factor).ok_or_else(overflow)?;
        Ok(gross.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Rate as a percentage (0.07 -> 7)
    pub fn percent(&self) -> Decimal {
        // `new` guarantees `rate * 100` is representable
        self.0
            .checked_mul(Decimal::ONE_HUNDRED)
            .unwrap_or(Decimal::MAX)
            .normalize()
    }

    /// Filesystem-safe percentage label
    ///
    /// Integral percentages render as plain integers (`7`), fractional ones
    /// swap the radix point for an underscore (`7_5`), so distinct rates
    /// never share a label.
    pub fn percent_label(&self) -> String {
        self.percent().to_string().replace('.', "_")
    }
}

impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaxRate {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        let rate = Decimal::from_str(s.trim())
            .map_err(|e| DomainError::InvalidTaxRate(format!("{:?}: {}", s, e)))?;
        Self::new(rate)
    }
}

impl TryFrom<Decimal> for TaxRate {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<f64> for TaxRate {
    type Error = DomainError;

    /// Goes through the shortest decimal representation of the float, so
    /// `0.07_f64` becomes exactly `0.07` rather than its binary expansion.
    fn try_from(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(DomainError::InvalidTaxRate(format!("{} is not finite", value)));
        }
        value.to_string().parse()
    }
}

impl From<TaxRate> for Decimal {
    fn from(rate: TaxRate) -> Self {
        rate.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_apply_rounds_to_cents() {
        let rate: TaxRate = "0.07".parse().unwrap();
        assert_eq!(rate.apply(dec("10.00")).unwrap(), dec("10.70"));
        assert_eq!(rate.apply(dec("20.00")).unwrap(), dec("21.40"));
        assert_eq!(rate.apply(dec("9.99")).unwrap(), dec("10.69"));
    }

    #[test]
    fn test_apply_midpoint_rounds_up() {
        // 0.05 * 1.1 = 0.055
        let rate: TaxRate = "0.1".parse().unwrap();
        assert_eq!(rate.apply(dec("0.05")).unwrap(), dec("0.06"));
    }

    #[test]
    fn test_zero_rate_keeps_price() {
        let rate = TaxRate::zero();
        assert_eq!(rate.apply(dec("10.00")).unwrap(), dec("10.00"));
        assert_eq!(rate.apply(dec("3.14")).unwrap(), dec("3.14"));
    }

    #[test]
    fn test_rate_above_one_is_legal() {
        let rate: TaxRate = "1.5".parse().unwrap();
        assert_eq!(rate.apply(dec("10")).unwrap(), dec("25"));
    }

    #[test]
    fn test_negative_rate_rejected() {
        assert!(matches!(
            "-0.01".parse::<TaxRate>(),
            Err(DomainError::InvalidTaxRate(_))
        ));
        assert!("abc".parse::<TaxRate>().is_err());
    }

    #[test]
    fn test_from_f64_uses_shortest_repr() {
        let rate = TaxRate::try_from(0.07_f64).unwrap();
        assert_eq!(rate.as_decimal(), dec("0.07"));
        assert!(TaxRate::try_from(f64::NAN).is_err());
    }

    #[test]
    fn test_percent_label() {
        assert_eq!(TaxRate::zero().percent_label(), "0");
        assert_eq!("0.07".parse::<TaxRate>().unwrap().percent_label(), "7");
        assert_eq!("0.10".parse::<TaxRate>().unwrap().percent_label(), "10");
        assert_eq!("0.15".parse::<TaxRate>().unwrap().percent_label(), "15");
        assert_eq!("0.075".parse::<TaxRate>().unwrap().percent_label(), "7_5");
        assert_eq!("1.25".parse::<TaxRate>().unwrap().percent_label(), "125");
    }

    #[test]
    fn test_zero_rate_rounds_high_precision_prices() {
        let rate = TaxRate::zero();
        assert_eq!(rate.apply(dec("0.0000001")).unwrap(), Decimal::ZERO);
        assert_eq!(rate.apply(dec("0.005")).unwrap(), dec("0.01"));
        assert_eq!(rate.apply(dec("12.345")).unwrap(), dec("12.35"));
        assert_eq!(rate.apply(dec("12.344999")).unwrap(), dec("12.34"));
    }

    #[test]
    fn test_tiny_rate_rounds_uniformly() {
        let rate: TaxRate = "0.0000001".parse().unwrap();
        assert_eq!(rate.apply(dec("10.00")).unwrap(), dec("10.00"));
        assert_eq!(rate.apply(dec("100000000")).unwrap(), dec("100000010.00"));
        assert_eq!(rate.percent_label(), "0_00001");
    }

    #[test]
    fn test_price_overflow_is_an_error() {
        let rate: TaxRate = "0.15".parse().unwrap();
        let price = dec("70000000000000000000000000000");

        assert_eq!(
            rate.apply(price),
            Err(DomainError::PriceOverflow {
                price,
                rate: dec("0.15"),
            })
        );
    }

    #[test]
    fn test_largest_representable_results() {
        let half_max = dec("39614081257132168796771975167");
        let rate: TaxRate = "1".parse().unwrap();
        assert_eq!(
            rate.apply(half_max).unwrap(),
            dec("79228162514264337593543950334")
        );
        assert_eq!(TaxRate::zero().apply(Decimal::MAX).unwrap(), Decimal::MAX);
    }

    #[test]
    fn test_rate_too_large_for_percent_rejected() {
        assert!(matches!(
            "79228162514264337593543950335".parse::<TaxRate>(),
            Err(DomainError::InvalidTaxRate(_))
        ));
        assert!("1000000000000000000000000000".parse::<TaxRate>().is_err());

        let largest: TaxRate = "792281625142643375935439503".parse().unwrap();
        assert_eq!(largest.percent_label(), "79228162514264337593543950300");
    }
}
