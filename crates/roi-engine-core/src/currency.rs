//! Currency precision, half-up rounding and caller-supplied conversion.
//!
//! Engine internals are f64; every figure handed to a caller passes through
//! [`to_decimal`] or a [`CurrencyFormatter`] exactly once.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::CalculationError;
use crate::types::{Currency, Money};

/// Digits kept for percentages (ROI, probabilities as %).
pub const PERCENT_DP: u32 = 2;
/// Digits kept for decimal rates.
pub const RATE_DP: u32 = 6;

/// Exchange rates supplied by the caller: units of each currency per one unit of `base`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    pub base: Currency,
    pub rates: BTreeMap<Currency, Decimal>,
}

impl RateTable {
    pub fn rate(&self, currency: Currency) -> Option<Decimal> {
        if currency == self.base {
            return Some(Decimal::ONE);
        }
        self.rates
            .get(&currency)
            .copied()
            .filter(|r| r.is_sign_positive() && !r.is_zero())
    }

    /// Units of `to` per unit of `from`.
    pub fn cross_rate(&self, from: Currency, to: Currency) -> Result<Decimal, CalculationError> {
        if from == to {
            return Ok(Decimal::ONE);
        }
        let from_rate = self.rate(from).ok_or(CalculationError::MissingRate {
            currency: from.to_string(),
        })?;
        let to_rate = self.rate(to).ok_or(CalculationError::MissingRate {
            currency: to.to_string(),
        })?;
        to_rate
            .checked_div(from_rate)
            .ok_or_else(|| CalculationError::DivisionByZero {
                context: format!("cross rate {from}/{to}"),
            })
    }

    pub fn convert(
        &self,
        amount: Money,
        from: Currency,
        to: Currency,
    ) -> Result<Money, CalculationError> {
        Ok(round_half_up(amount * self.cross_rate(from, to)?, to.precision()))
    }
}

pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert an engine figure into a rounded decimal, rejecting NaN and infinities.
pub fn to_decimal(value: f64, dp: u32, field: &str) -> Result<Decimal, CalculationError> {
    let exact = if value.is_finite() {
        Decimal::from_f64(value)
    } else {
        None
    };
    exact
        .map(|d| round_half_up(d, dp))
        .ok_or_else(|| CalculationError::NonFinite {
            field: field.to_string(),
        })
}

/// Renders monetary figures in the report currency.
#[derive(Debug, Clone)]
pub struct CurrencyFormatter {
    currency: Currency,
    conversion: Decimal,
}

impl CurrencyFormatter {
    /// Formatter for amounts already denominated in `currency`.
    pub fn new(currency: Currency) -> Self {
        CurrencyFormatter {
            currency,
            conversion: Decimal::ONE,
        }
    }

    /// Formatter converting `from` amounts into `to` with the caller's rates.
    pub fn converting(
        from: Currency,
        to: Currency,
        rates: &RateTable,
    ) -> Result<Self, CalculationError> {
        Ok(CurrencyFormatter {
            currency: to,
            conversion: rates.cross_rate(from, to)?,
        })
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Applied conversion rate (1 when no conversion was requested).
    pub fn conversion_rate(&self) -> Decimal {
        self.conversion
    }

    pub fn money(&self, value: f64, field: &str) -> Result<Money, CalculationError> {
        let raw = to_decimal(value, 12, field)?;
        let converted = raw
            .checked_mul(self.conversion)
            .ok_or_else(|| CalculationError::NonFinite {
                field: field.to_string(),
            })?;
        Ok(round_half_up(converted, self.currency.precision()))
    }

    /// Display string such as `$1,234.57` or `-¥1,235`.
    pub fn display(&self, amount: Money) -> String {
        let rounded = round_half_up(amount, self.currency.precision());
        let text = format!(
            "{:.*}",
            self.currency.precision() as usize,
            rounded.abs()
        );
        let (int_part, frac_part) = match text.split_once('.') {
            Some((i, f)) => (i.to_string(), Some(f.to_string())),
            None => (text, None),
        };
        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, ch) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        match frac_part {
            Some(f) => format!("{sign}{}{grouped}.{f}", self.currency.symbol()),
            None => format!("{sign}{}{grouped}", self.currency.symbol()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_rates() -> RateTable {
        RateTable {
            base: Currency::USD,
            rates: BTreeMap::from([
                (Currency::EUR, dec!(0.85)),
                (Currency::JPY, dec!(110)),
                (Currency::GBP, dec!(0.73)),
            ]),
        }
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(dec!(2.345), 2), dec!(2.35));
        assert_eq!(round_half_up(dec!(2.344), 2), dec!(2.34));
        assert_eq!(round_half_up(dec!(1234.5), 0), dec!(1235));
        assert_eq!(round_half_up(dec!(-2.345), 2), dec!(-2.35));
    }

    #[test]
    fn test_money_uses_currency_precision() {
        let usd = CurrencyFormatter::new(Currency::USD);
        assert_eq!(usd.money(1234.5678, "x").unwrap(), dec!(1234.57));
        let jpy = CurrencyFormatter::new(Currency::JPY);
        assert_eq!(jpy.money(1234.5678, "x").unwrap(), dec!(1235));
    }

    #[test]
    fn test_money_rejects_non_finite() {
        let usd = CurrencyFormatter::new(Currency::USD);
        assert_eq!(
            usd.money(f64::NAN, "npv"),
            Err(CalculationError::NonFinite { field: "npv".into() })
        );
    }

    #[test]
    fn test_converting_formatter() {
        let f = CurrencyFormatter::converting(Currency::USD, Currency::JPY, &sample_rates())
            .unwrap();
        assert_eq!(f.money(100.0, "x").unwrap(), dec!(11000));
        let f = CurrencyFormatter::converting(Currency::EUR, Currency::GBP, &sample_rates())
            .unwrap();
        // 0.73 / 0.85 = 0.858823...
        assert_eq!(f.money(100.0, "x").unwrap(), dec!(85.88));
    }

    #[test]
    fn test_missing_rate_is_reported() {
        let err = sample_rates()
            .cross_rate(Currency::USD, Currency::BRL)
            .unwrap_err();
        assert_eq!(err, CalculationError::MissingRate { currency: "BRL".into() });
    }

    #[test]
    fn test_convert_rounds_to_target_precision() {
        let converted = sample_rates()
            .convert(dec!(1000), Currency::USD, Currency::EUR)
            .unwrap();
        assert_eq!(converted, dec!(850.00));
    }

    #[test]
    fn test_display_groups_thousands() {
        let usd = CurrencyFormatter::new(Currency::USD);
        assert_eq!(usd.display(dec!(1234567.891)), "$1,234,567.89");
        assert_eq!(usd.display(dec!(-950)), "-$950.00");
        let jpy = CurrencyFormatter::new(Currency::JPY);
        assert_eq!(jpy.display(dec!(1234.5)), "¥1,235");
    }
}
