//! Period labels and the locale strategy that renders them.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::calendar::MonthKey;

const INDONESIAN_MONTHS: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

const ENGLISH_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Human-readable identifier of one billing period, as stored on payments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeriodLabel(String);

impl PeriodLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Exact comparison against a stored label.
    pub fn matches(&self, stored: &str) -> bool {
        self.0 == stored
    }

    /// Like [`PeriodLabel::matches`] but ignores surrounding whitespace and case.
    pub fn matches_loosely(&self, stored: &str) -> bool {
        let stored = stored.trim();
        self.0 == stored || self.0.to_lowercase() == stored.to_lowercase()
    }
}

impl fmt::Display for PeriodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PeriodLabel {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Renders period labels. Month labels are `"<MonthName> <Year>"`.
pub trait LabelFormatter: Send + Sync {
    fn month_name(&self, month: u32) -> &'static str;

    fn month_label(&self, month: MonthKey) -> PeriodLabel {
        PeriodLabel(format!("{} {}", self.month_name(month.month), month.year))
    }

    fn day_label(&self, date: NaiveDate) -> PeriodLabel {
        PeriodLabel(date.format("%Y-%m-%d").to_string())
    }

    /// Inverse of [`LabelFormatter::month_label`].
    fn parse_month_label(&self, label: &str) -> Option<MonthKey> {
        let (name, year) = label.trim().rsplit_once(' ')?;
        let year: i32 = year.parse().ok()?;
        let month = (1..=12).find(|m| self.month_name(*m).eq_ignore_ascii_case(name.trim()))?;
        MonthKey::new(year, month)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IndonesianLabels;

impl LabelFormatter for IndonesianLabels {
    fn month_name(&self, month: u32) -> &'static str {
        INDONESIAN_MONTHS
            .get(month.wrapping_sub(1) as usize)
            .copied()
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishLabels;

impl LabelFormatter for EnglishLabels {
    fn month_name(&self, month: u32) -> &'static str {
        ENGLISH_MONTHS
            .get(month.wrapping_sub(1) as usize)
            .copied()
            .unwrap_or("")
    }
}

/// Serializable choice of label strategy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LabelLocale {
    #[default]
    Indonesian,
    English,
}

impl LabelLocale {
    pub fn formatter(self) -> &'static dyn LabelFormatter {
        match self {
            LabelLocale::Indonesian => &IndonesianLabels,
            LabelLocale::English => &EnglishLabels,
        }
    }
}
