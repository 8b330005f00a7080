//! Supported currencies and the fixed exchange-rate table used by the generator.
//!
//! Rates are approximate constants expressed as units of the currency per one US dollar. They are
//! never refreshed from an external source, so conversions are deterministic.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// A currency the generator knows an exchange rate for.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Amd,
    Eur,
    Rub,
    Try,
    Gbp,
    Aed,
}

serde_plain::derive_display_from_serialize!(Currency);

impl Currency {
    pub const ALL: [Currency; 7] = [
        Currency::Usd,
        Currency::Amd,
        Currency::Eur,
        Currency::Rub,
        Currency::Try,
        Currency::Gbp,
        Currency::Aed,
    ];

    /// Units of this currency per one USD.
    pub const fn usd_rate(self) -> f64 {
        match self {
            Currency::Usd => 1.0,
            Currency::Amd => 390.0,
            Currency::Eur => 0.9,
            Currency::Rub => 80.0,
            Currency::Try => 20.0,
            Currency::Gbp => 0.8,
            Currency::Aed => 3.67,
        }
    }

    /// Converts a USD amount into this currency, rounded to cents.
    pub fn from_usd(self, usd_amount: f64) -> f64 {
        round2(usd_amount * self.usd_rate())
    }

    /// Converts an amount of this currency back into USD, rounded to cents.
    pub fn to_usd(self, amount: f64) -> f64 {
        round2(amount / self.usd_rate())
    }
}

/// Returns the rate such that `amount_in_to = amount_in_from * rate`.
pub fn cross_rate(from: Currency, to: Currency) -> f64 {
    if from == to {
        return 1.0;
    }
    to.usd_rate() / from.usd_rate()
}

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// The error returned when a currency code is not in the rate table.
#[derive(Clone, PartialEq, Eq)]
pub struct UnsupportedCurrency(String);

impl UnsupportedCurrency {
    /// The code that failed to parse.
    pub fn code(&self) -> &str {
        &self.0
    }
}

impl Debug for UnsupportedCurrency {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for UnsupportedCurrency {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Unsupported currency: {}", self.0)
    }
}

impl std::error::Error for UnsupportedCurrency {}

impl FromStr for Currency {
    type Err = UnsupportedCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Currency::ALL
            .into_iter()
            .find(|c| c.to_string() == code)
            .ok_or_else(|| UnsupportedCurrency(code.to_string()))
    }
}
