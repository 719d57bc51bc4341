use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Whole-rupiah amount. Rupiah has no minor units in circulation, so amounts
/// are kept as integers and sums stay exact.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(pub i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(self) -> i64 {
        self.0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Saturating multiplication by a period count.
    pub fn times(self, count: u32) -> Self {
        Self(self.0.saturating_mul(count as i64))
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = *self + rhs;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(self.0.saturating_neg())
    }
}

impl Mul<u32> for Money {
    type Output = Money;

    fn mul(self, rhs: u32) -> Money {
        self.times(rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, item| acc + item)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Money(value)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_rupiah(*self, &LocaleConfig::default()))
    }
}

/// Locale-aware formatting preferences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocaleConfig {
    pub language_tag: String,
    pub grouping_separator: char,
    pub symbol: String,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            language_tag: "id-ID".into(),
            grouping_separator: '.',
            symbol: "Rp".into(),
        }
    }
}

impl LocaleConfig {
    pub fn for_tag(tag: &str) -> Self {
        if tag.to_ascii_lowercase().starts_with("en") {
            Self {
                language_tag: tag.into(),
                grouping_separator: ',',
                symbol: "Rp".into(),
            }
        } else {
            Self {
                language_tag: tag.into(),
                ..Self::default()
            }
        }
    }
}

/// Renders an amount as `Rp1.250.000` (or `-Rp1.250.000` when negative).
pub fn format_rupiah(amount: Money, locale: &LocaleConfig) -> String {
    let digits = amount.0.unsigned_abs().to_string();
    let grouped = group_digits(&digits, locale.grouping_separator);
    if amount.is_negative() {
        format!("-{}{}", locale.symbol, grouped)
    } else {
        format!("{}{}", locale.symbol, grouped)
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::new();
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands_with_locale_separator() {
        let id = LocaleConfig::default();
        assert_eq!(format_rupiah(Money(1_250_000), &id), "Rp1.250.000");
        assert_eq!(format_rupiah(Money(-5_000), &id), "-Rp5.000");
        assert_eq!(format_rupiah(Money(0), &id), "Rp0");

        let en = LocaleConfig::for_tag("en-US");
        assert_eq!(format_rupiah(Money(999_999), &en), "Rp999,999");
    }

    #[test]
    fn arithmetic_saturates() {
        assert_eq!(Money(i64::MAX) + Money(1), Money(i64::MAX));
        assert_eq!(Money(10_000) * 3, Money(30_000));
        let total: Money = [Money(1), Money(2), Money(3)].iter().sum();
        assert_eq!(total, Money(6));
    }
}
