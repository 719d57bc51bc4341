//! Recurring-payment configuration authored per class or savings scheme.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::currency::Money;
use crate::errors::{DuesError, Result};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Qris,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Cash => f.write_str("Tunai"),
            PaymentMethod::Qris => f.write_str("QRIS"),
        }
    }
}

/// Recurrence rule, discriminated by `kind` when serialized.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CadenceRule {
    /// Every day, or every `interval_days` days counted from `anchor`
    /// (1970-01-01 when no anchor is configured).
    Daily {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        interval_days: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        anchor: Option<NaiveDate>,
    },
    /// Fires on the listed weekdays; arrears are tracked per calendar month.
    Weekly { weekdays: Vec<Weekday> },
    /// One period per calendar month. `month_days` only suggests due dates.
    Monthly {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        month_days: Option<BTreeSet<u32>>,
    },
}

impl CadenceRule {
    pub fn every_day() -> Self {
        CadenceRule::Daily {
            interval_days: None,
            anchor: None,
        }
    }

    pub fn every_n_days(interval_days: u32, anchor: Option<NaiveDate>) -> Self {
        CadenceRule::Daily {
            interval_days: Some(interval_days),
            anchor,
        }
    }

    pub fn weekly(weekdays: impl IntoIterator<Item = Weekday>) -> Self {
        CadenceRule::Weekly {
            weekdays: weekdays.into_iter().collect(),
        }
    }

    pub fn monthly() -> Self {
        CadenceRule::Monthly { month_days: None }
    }

    pub fn monthly_on(days: impl IntoIterator<Item = u32>) -> Self {
        CadenceRule::Monthly {
            month_days: Some(days.into_iter().collect()),
        }
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            CadenceRule::Daily { .. } => "daily",
            CadenceRule::Weekly { .. } => "weekly",
            CadenceRule::Monthly { .. } => "monthly",
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            CadenceRule::Daily {
                interval_days: Some(0),
                ..
            } => Err(DuesError::InvalidCadence(
                "daily interval must be at least one day".into(),
            )),
            CadenceRule::Daily { .. } => Ok(()),
            CadenceRule::Weekly { weekdays } if weekdays.is_empty() => Err(
                DuesError::InvalidCadence("weekly cadence needs at least one weekday".into()),
            ),
            CadenceRule::Weekly { .. } => Ok(()),
            CadenceRule::Monthly {
                month_days: Some(days),
            } => {
                if days.is_empty() {
                    return Err(DuesError::InvalidCadence(
                        "monthly due dates must not be empty when provided".into(),
                    ));
                }
                if let Some(day) = days.iter().find(|day| !(1..=31).contains(*day)) {
                    return Err(DuesError::InvalidCadence(format!(
                        "monthly due date {} is outside 1..=31",
                        day
                    )));
                }
                Ok(())
            }
            CadenceRule::Monthly { month_days: None } => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CadenceConfig {
    pub id: Uuid,
    /// Class dues scope or named savings scheme the cadence applies to.
    pub scope_id: Uuid,
    #[serde(flatten)]
    pub rule: CadenceRule,
    pub amount_per_period: Money,
    #[serde(default)]
    pub default_method: PaymentMethod,
    #[serde(default = "CadenceConfig::default_active")]
    pub active: bool,
}

impl CadenceConfig {
    pub fn new(scope_id: Uuid, rule: CadenceRule, amount_per_period: Money) -> Self {
        Self {
            id: Uuid::new_v4(),
            scope_id,
            rule,
            amount_per_period,
            default_method: PaymentMethod::default(),
            active: true,
        }
    }

    fn default_active() -> bool {
        true
    }

    pub fn with_method(mut self, method: PaymentMethod) -> Self {
        self.default_method = method;
        self
    }

    /// Configuration-time check. Invalid cadences are rejected before they are
    /// ever stored, not discovered later during reconciliation.
    pub fn validate(&self) -> Result<()> {
        self.rule.validate()?;
        if !self.amount_per_period.is_positive() {
            return Err(DuesError::InvalidCadence(format!(
                "amount per period must be positive, got {}",
                self.amount_per_period.value()
            )));
        }
        Ok(())
    }

    /// Validates the rule and requires the cadence to be active.
    pub fn ensure_usable(&self) -> Result<()> {
        if !self.active {
            return Err(DuesError::InvalidCadence(format!(
                "cadence {} is inactive",
                self.id
            )));
        }
        self.validate()
    }

    /// Suggested amount for a payment covering `periods_covered` periods.
    pub fn default_amount(&self, periods_covered: u32) -> Money {
        self.amount_per_period.times(periods_covered.max(1))
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }
}

/// Picks the single active cadence configured for `scope_id`.
pub fn select_active(configs: &[CadenceConfig], scope_id: Uuid) -> Result<&CadenceConfig> {
    let mut active = configs
        .iter()
        .filter(|config| config.scope_id == scope_id && config.active);
    let first = active.next().ok_or_else(|| {
        DuesError::InvalidCadence(format!("no active cadence configured for scope {}", scope_id))
    })?;
    let extra = active.count();
    if extra > 0 {
        warn!(%scope_id, extra, "multiple active cadences configured for scope");
        return Err(DuesError::InvalidCadence(format!(
            "scope {} has {} active cadences, expected one",
            scope_id,
            extra + 1
        )));
    }
    first.validate()?;
    Ok(first)
}
