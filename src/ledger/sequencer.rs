//! Expands a cadence into the ordered billing periods of a date window.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::calendar::{semester_window, DateWindow, MonthKey};
use super::label::{LabelFormatter, PeriodLabel};
use crate::domain::cadence::{CadenceConfig, CadenceRule};
use crate::errors::Result;

/// Upper bound on generated periods for a single call. Wider windows keep
/// the most recent periods.
pub const MAX_PERIODS: usize = 4096;

/// One billing period: its label plus the date it is anchored to.
///
/// Daily periods are anchored to their own date, monthly periods to the first
/// day of the month inside the window, and weekly periods to the first
/// occurrence inside the month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub label: PeriodLabel,
    pub date: NaiveDate,
}

/// `generate(cadence, window_start, window_end)`.
///
/// Pure function of its inputs. Periods anchored after `today` are never
/// produced. Fails with `InvalidCadence` for inactive or malformed cadences;
/// an empty window yields an empty sequence.
pub fn generate(
    cadence: &CadenceConfig,
    window: DateWindow,
    today: NaiveDate,
    labels: &dyn LabelFormatter,
) -> Result<Vec<Period>> {
    cadence.ensure_usable()?;
    let window = window.truncate_to(today);
    if window.is_empty() {
        debug!(cadence = %cadence.id, "empty window, no periods generated");
        return Ok(Vec::new());
    }

    let mut periods = match &cadence.rule {
        CadenceRule::Daily { .. } => daily_periods(&cadence.rule, window, labels),
        CadenceRule::Weekly { .. } => weekly_periods(&cadence.rule, window, labels),
        CadenceRule::Monthly { .. } => monthly_periods(window, labels),
    };

    periods.sort_by_key(|period| period.date);
    periods.dedup_by(|later, earlier| later.label == earlier.label);
    if periods.len() > MAX_PERIODS {
        let dropped = periods.len() - MAX_PERIODS;
        periods.drain(..dropped);
        warn!(
            cadence = %cadence.id,
            limit = MAX_PERIODS,
            kept_from = %periods[0].date,
            "period sequence truncated to the most recent periods"
        );
    }
    debug!(
        cadence = %cadence.id,
        kind = cadence.rule.kind_label(),
        count = periods.len(),
        "generated period sequence"
    );
    Ok(periods)
}

/// Periods of the semester containing `today`, up to `today`.
pub fn generate_semester(
    cadence: &CadenceConfig,
    today: NaiveDate,
    labels: &dyn LabelFormatter,
) -> Result<Vec<Period>> {
    generate(cadence, semester_window(today), today, labels)
}

fn daily_periods(
    rule: &CadenceRule,
    window: DateWindow,
    labels: &dyn LabelFormatter,
) -> Vec<Period> {
    window
        .days()
        .rev()
        .filter(|date| rule.occurs_on(*date))
        .take(MAX_PERIODS + 1)
        .map(|date| Period {
            label: rule.canonical_label(date, labels),
            date,
        })
        .collect()
}

fn weekly_periods(
    rule: &CadenceRule,
    window: DateWindow,
    labels: &dyn LabelFormatter,
) -> Vec<Period> {
    MonthKey::of(window.start)
        .through(MonthKey::of(window.end))
        .rev()
        .filter_map(|month| {
            let bounded = DateWindow::new(
                month.first_day().max(window.start),
                month.last_day().min(window.end),
            );
            bounded
                .days()
                .find(|date| rule.occurs_on(*date))
                .map(|date| Period {
                    label: labels.month_label(month),
                    date,
                })
        })
        .take(MAX_PERIODS + 1)
        .collect()
}

fn monthly_periods(window: DateWindow, labels: &dyn LabelFormatter) -> Vec<Period> {
    MonthKey::of(window.start)
        .through(MonthKey::of(window.end))
        .rev()
        .take(MAX_PERIODS + 1)
        .map(|month| Period {
            label: labels.month_label(month),
            date: month.first_day().max(window.start),
        })
        .collect()
}
