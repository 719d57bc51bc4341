//! Occurrence and labelling rules for configured cadences.
//!
//! Weekly cadences fire on several days per week but are labelled by the
//! containing calendar month, so weekly arrears are tracked per month and not
//! per occurrence.

use chrono::{Datelike, NaiveDate};

use super::calendar::MonthKey;
use super::label::{LabelFormatter, PeriodLabel};
use crate::domain::cadence::{CadenceConfig, CadenceRule};

/// Reference day for every-N-days cadences that carry no anchor of their own.
pub fn daily_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN)
}

impl CadenceRule {
    /// Whether a period fires on `date`. Monthly cadences fire on the first
    /// day of each month.
    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        match self {
            CadenceRule::Daily {
                interval_days: None | Some(1),
                ..
            } => true,
            CadenceRule::Daily {
                interval_days: Some(0),
                ..
            } => false,
            CadenceRule::Daily {
                interval_days: Some(every),
                anchor,
            } => {
                let epoch = anchor.unwrap_or_else(daily_epoch);
                (date - epoch).num_days().rem_euclid(*every as i64) == 0
            }
            CadenceRule::Weekly { weekdays } => weekdays.contains(&date.weekday()),
            CadenceRule::Monthly { .. } => date.day() == 1,
        }
    }

    /// Label of the period that `date` belongs to.
    pub fn canonical_label(&self, date: NaiveDate, labels: &dyn LabelFormatter) -> PeriodLabel {
        match self {
            CadenceRule::Daily { .. } => labels.day_label(date),
            CadenceRule::Weekly { .. } | CadenceRule::Monthly { .. } => {
                labels.month_label(MonthKey::of(date))
            }
        }
    }

    /// Informational due dates of a monthly cadence in `month`, clamped to
    /// the month length and deduplicated.
    pub fn suggested_due_dates(&self, month: MonthKey) -> Vec<NaiveDate> {
        match self {
            CadenceRule::Monthly {
                month_days: Some(days),
            } => {
                let mut dates: Vec<NaiveDate> =
                    days.iter().map(|day| month.clamp_day(*day)).collect();
                dates.dedup();
                dates
            }
            _ => Vec::new(),
        }
    }
}

/// `occursOn(date, cadence)`.
pub fn occurs_on(date: NaiveDate, cadence: &CadenceConfig) -> bool {
    cadence.rule.occurs_on(date)
}

/// `canonicalLabel(date, cadence)`.
pub fn canonical_label(
    date: NaiveDate,
    cadence: &CadenceConfig,
    labels: &dyn LabelFormatter,
) -> PeriodLabel {
    cadence.rule.canonical_label(date, labels)
}
