use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// First month of the second semester. Stored period labels were generated
/// with months 1..=6 and 7..=12 as the two halves of the school year.
pub const SECOND_SEMESTER_START: u32 = 7;

/// A calendar month. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Months since year zero; consecutive months differ by one.
    pub fn index(&self) -> i64 {
        self.year as i64 * 12 + self.month as i64 - 1
    }

    pub fn from_index(index: i64) -> Self {
        Self {
            year: index.div_euclid(12) as i32,
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn shift(&self, months: i64) -> Self {
        Self::from_index(self.index() + months)
    }

    pub fn next(&self) -> Self {
        self.shift(1)
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next()
            .first_day()
            .pred_opt()
            .unwrap_or_else(|| self.first_day())
    }

    pub fn days_in_month(&self) -> u32 {
        self.last_day().day()
    }

    /// Clamps `day` into this month (the 31st becomes the 30th in April).
    pub fn clamp_day(&self, day: u32) -> NaiveDate {
        let day = day.clamp(1, self.days_in_month());
        NaiveDate::from_ymd_opt(self.year, self.month, day).unwrap_or_else(|| self.first_day())
    }

    /// Inclusive iterator from `self` through `last`.
    pub fn through(self, last: MonthKey) -> impl DoubleEndedIterator<Item = MonthKey> {
        let start = self.index();
        let end = last.index();
        (start..=end).map(MonthKey::from_index)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Closed date interval `[start, end]`. A window whose end precedes its start
/// is empty, which is a valid input producing empty results.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn for_months(first: MonthKey, last: MonthKey) -> Self {
        Self::new(first.first_day(), last.last_day())
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Restricts the window so it never extends past `today`.
    pub fn truncate_to(&self, today: NaiveDate) -> Self {
        Self {
            start: self.start,
            end: self.end.min(today),
        }
    }

    pub fn days(&self) -> impl DoubleEndedIterator<Item = NaiveDate> {
        let start = self.start;
        let count = if self.is_empty() {
            0
        } else {
            (self.end - self.start).num_days() + 1
        };
        (0..count).map(move |offset| start + Duration::days(offset))
    }
}

/// Half-year window containing `today`: January–June while the month is at
/// most six, July–December otherwise. The end is truncated to `today`.
pub fn semester_window(today: NaiveDate) -> DateWindow {
    let year = today.year();
    let (first, last) = if today.month() < SECOND_SEMESTER_START {
        (1, SECOND_SEMESTER_START - 1)
    } else {
        (SECOND_SEMESTER_START, 12)
    };
    let first = MonthKey { year, month: first };
    let last = MonthKey { year, month: last };
    DateWindow::for_months(first, last).truncate_to(today)
}

/// Consecutive run of calendar months used for report series.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonthSpan {
    pub first: MonthKey,
    pub months: u32,
}

impl MonthSpan {
    pub fn new(first: MonthKey, months: u32) -> Self {
        Self { first, months }
    }

    /// `months` buckets ending with (and including) `last`.
    pub fn trailing(last: MonthKey, months: u32) -> Self {
        let months = months.max(1);
        Self {
            first: last.shift(-(months as i64 - 1)),
            months,
        }
    }

    pub fn last(&self) -> MonthKey {
        self.first.shift(self.months as i64 - 1)
    }

    pub fn contains(&self, month: MonthKey) -> bool {
        self.months > 0 && month >= self.first && month <= self.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = MonthKey> {
        let first = self.first;
        (0..self.months as i64).map(move |offset| first.shift(offset))
    }

    /// Keeps the most recent `max` months when the span is wider.
    pub fn capped(&self, max: u32) -> Self {
        if self.months <= max {
            *self
        } else {
            Self::trailing(self.last(), max)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_key_shifts_across_years() {
        let jan = MonthKey::new(2024, 1).unwrap();
        assert_eq!(jan.shift(-1), MonthKey::new(2023, 12).unwrap());
        assert_eq!(jan.shift(13), MonthKey::new(2025, 2).unwrap());
        assert_eq!(MonthKey::new(2024, 2).unwrap().last_day(), date(2024, 2, 29));
        assert_eq!(MonthKey::new(2024, 4).unwrap().clamp_day(31), date(2024, 4, 30));
        assert!(MonthKey::new(2024, 13).is_none());
    }

    #[test]
    fn semester_switches_at_july() {
        let first = semester_window(date(2024, 3, 15));
        assert_eq!(first.start, date(2024, 1, 1));
        assert_eq!(first.end, date(2024, 3, 15));

        let june = semester_window(date(2024, 6, 30));
        assert_eq!(june.start, date(2024, 1, 1));

        let second = semester_window(date(2024, 7, 1));
        assert_eq!(second.start, date(2024, 7, 1));
        assert_eq!(second.end, date(2024, 7, 1));
    }

    #[test]
    fn trailing_span_includes_last_month() {
        let span = MonthSpan::trailing(MonthKey::new(2024, 2).unwrap(), 6);
        let months: Vec<String> = span.iter().map(|m| m.to_string()).collect();
        assert_eq!(
            months,
            vec!["2023-09", "2023-10", "2023-11", "2023-12", "2024-01", "2024-02"]
        );
        assert_eq!(span.capped(3).first, MonthKey::new(2023, 12).unwrap());
    }

    #[test]
    fn empty_window_has_no_days() {
        let window = DateWindow::new(date(2024, 5, 2), date(2024, 5, 1));
        assert!(window.is_empty());
        assert_eq!(window.days().count(), 0);
        assert_eq!(DateWindow::new(date(2024, 5, 1), date(2024, 5, 3)).days().count(), 3);
    }
}
