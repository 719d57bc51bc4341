//! Transaction records supplied by the surrounding application.
//!
//! Dates are kept exactly as the backing store returned them and parsed on
//! demand, so a single unparseable row can be skipped instead of failing the
//! whole fetch.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::currency::Money;
use crate::domain::cadence::{CadenceConfig, PaymentMethod};
use crate::errors::{DuesError, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a stored date. Accepts `YYYY-MM-DD`, RFC 3339 timestamps and
/// `YYYY-MM-DD HH:MM:SS`-style values whose first ten characters are a date.
pub fn parse_record_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        return Some(date);
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(stamp.date_naive());
    }
    trimmed
        .get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, DATE_FORMAT).ok())
}

fn format_record_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn default_periods() -> u32 {
    1
}

/// One settlement event for a student in a dues or savings scope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentRecord {
    pub id: Uuid,
    pub student_id: Uuid,
    pub scope_id: Uuid,
    pub date: String,
    pub period_label: String,
    #[serde(default = "default_periods")]
    pub periods_covered: u32,
    pub amount: Money,
    #[serde(default)]
    pub method: PaymentMethod,
    #[serde(default)]
    pub is_auto: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl PaymentRecord {
    pub fn new(
        student_id: Uuid,
        scope_id: Uuid,
        date: NaiveDate,
        period_label: impl Into<String>,
        amount: Money,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            student_id,
            scope_id,
            date: format_record_date(date),
            period_label: period_label.into(),
            periods_covered: 1,
            amount,
            method: PaymentMethod::default(),
            is_auto: false,
            note: None,
        }
    }

    /// Builds an auto-filled payment whose amount follows the cadence.
    pub fn auto(
        cadence: &CadenceConfig,
        student_id: Uuid,
        date: NaiveDate,
        period_label: impl Into<String>,
        periods_covered: u32,
    ) -> Self {
        let periods_covered = periods_covered.max(1);
        let mut record = Self::new(
            student_id,
            cadence.scope_id,
            date,
            period_label,
            cadence.default_amount(periods_covered),
        );
        record.periods_covered = periods_covered;
        record.method = cadence.default_method;
        record.is_auto = true;
        record
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_method(mut self, method: PaymentMethod) -> Self {
        self.method = method;
        self
    }

    pub fn parsed_date(&self) -> Result<NaiveDate> {
        parse_record_date(&self.date).ok_or_else(|| {
            DuesError::malformed(
                format!("payment {}", self.id),
                format!("unparseable date `{}`", self.date),
            )
        })
    }

    /// Returns the date when the record is usable as a ledger inflow.
    pub fn checked(&self) -> Result<NaiveDate> {
        let date = self.parsed_date()?;
        if self.amount.is_negative() {
            return Err(DuesError::malformed(
                format!("payment {}", self.id),
                format!("negative amount {}", self.amount.value()),
            ));
        }
        if self.periods_covered == 0 {
            return Err(DuesError::malformed(
                format!("payment {}", self.id),
                "periods_covered must be at least 1",
            ));
        }
        Ok(date)
    }

    pub fn belongs_to(&self, student_id: Uuid, scope_id: Uuid) -> bool {
        self.student_id == student_id && self.scope_id == scope_id
    }

    /// Auto-filled records are expected to carry `periods_covered ×
    /// amount_per_period`. Returns the expected amount when they do not.
    pub fn amount_mismatch(&self, cadence: &CadenceConfig) -> Option<Money> {
        if !self.is_auto {
            return None;
        }
        let expected = cadence.default_amount(self.periods_covered);
        (expected != self.amount).then_some(expected)
    }
}

/// Outflow from a class fund.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExpenseRecord {
    pub id: Uuid,
    pub scope_id: Uuid,
    pub date: String,
    pub category: String,
    pub amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ExpenseRecord {
    pub fn new(
        scope_id: Uuid,
        date: NaiveDate,
        category: impl Into<String>,
        amount: Money,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            scope_id,
            date: format_record_date(date),
            category: category.into(),
            amount,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn checked(&self) -> Result<NaiveDate> {
        let date = parse_record_date(&self.date).ok_or_else(|| {
            DuesError::malformed(
                format!("expense {}", self.id),
                format!("unparseable date `{}`", self.date),
            )
        })?;
        if self.amount.is_negative() {
            return Err(DuesError::malformed(
                format!("expense {}", self.id),
                format!("negative amount {}", self.amount.value()),
            ));
        }
        Ok(date)
    }
}

/// Target-based savings scheme. Progress is derived from payments, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SavingsGoal {
    pub scope_id: Uuid,
    pub name: String,
    pub target_amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
    pub cadence: CadenceConfig,
}

impl SavingsGoal {
    pub fn new(name: impl Into<String>, target_amount: Money, cadence: CadenceConfig) -> Self {
        Self {
            scope_id: cadence.scope_id,
            name: name.into(),
            target_amount,
            target_date: None,
            cadence,
        }
    }

    pub fn with_target_date(mut self, date: NaiveDate) -> Self {
        self.target_date = Some(date);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cadence::CadenceRule;

    #[test]
    fn parses_common_stored_date_shapes() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(parse_record_date("2024-03-15"), Some(expected));
        assert_eq!(parse_record_date(" 2024-03-15 "), Some(expected));
        assert_eq!(parse_record_date("2024-03-15T08:30:00+07:00"), Some(expected));
        assert_eq!(parse_record_date("2024-03-15 08:30:00"), Some(expected));
        assert_eq!(parse_record_date("15/03/2024"), None);
        assert_eq!(parse_record_date(""), None);
    }

    #[test]
    fn checked_rejects_bad_dates_and_negative_amounts() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let mut payment =
            PaymentRecord::new(Uuid::new_v4(), Uuid::new_v4(), date, "Januari 2024", Money(10));
        assert_eq!(payment.checked().unwrap(), date);

        payment.date = "not-a-date".into();
        assert!(matches!(
            payment.checked(),
            Err(DuesError::MalformedRecord { .. })
        ));

        let expense = ExpenseRecord::new(Uuid::new_v4(), date, "ATK", Money(-1));
        assert!(expense.checked().is_err());
    }

    #[test]
    fn checked_rejects_zero_periods_covered() {
        let json = serde_json::json!({
            "id": Uuid::new_v4(),
            "student_id": Uuid::new_v4(),
            "scope_id": Uuid::new_v4(),
            "date": "2024-02-01",
            "period_label": "Februari 2024",
            "periods_covered": 0,
            "amount": 10_000,
            "method": "cash",
            "is_auto": false
        });
        let record: PaymentRecord = serde_json::from_value(json).unwrap();
        assert!(matches!(
            record.checked(),
            Err(DuesError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn auto_payment_follows_cadence_amount() {
        let cadence = CadenceConfig::new(Uuid::new_v4(), CadenceRule::monthly(), Money(10_000));
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let record = PaymentRecord::auto(&cadence, Uuid::new_v4(), date, "Februari 2024", 3);
        assert_eq!(record.amount, Money(30_000));
        assert_eq!(record.periods_covered, 3);
        assert_eq!(record.amount_mismatch(&cadence), None);

        let mut tampered = record.clone();
        tampered.amount = Money(10_000);
        assert_eq!(tampered.amount_mismatch(&cadence), Some(Money(30_000)));
    }

    #[test]
    fn missing_optional_fields_use_defaults() {
        let json = serde_json::json!({
            "id": Uuid::nil(),
            "student_id": Uuid::nil(),
            "scope_id": Uuid::nil(),
            "date": "2024-01-10",
            "period_label": "Januari 2024",
            "amount": 5000
        });
        let record: PaymentRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.periods_covered, 1);
        assert_eq!(record.method, PaymentMethod::Cash);
        assert!(!record.is_auto);
    }
}
