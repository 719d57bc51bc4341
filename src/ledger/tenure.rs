//! Coarse arrears estimate based on the month of a student's last payment.
//!
//! Powers the "most overdue" ranking across a whole class in O(1) per
//! student. It does not consult period labels and is allowed to disagree
//! with [`crate::ledger::reconcile`].

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::currency::Money;
use crate::domain::records::PaymentRecord;

/// `estimateGapMonths(last_payment_date, today)`.
///
/// Without a payment the student is treated as owing since January, i.e. the
/// number of months elapsed since the start of the year. Otherwise the month
/// of the last payment itself is not counted. Never negative.
pub fn estimate_gap_months(last_payment: Option<NaiveDate>, today: NaiveDate) -> u32 {
    match last_payment {
        None => today.month0(),
        Some(last) => {
            let now = today.year() as i64 * 12 + today.month() as i64;
            let then = last.year() as i64 * 12 + last.month() as i64;
            (now - then - 1).max(0) as u32
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenureGap {
    pub student_id: Uuid,
    pub last_payment: Option<NaiveDate>,
    pub gap_months: u32,
    /// `gap_months × amount_per_period`.
    pub estimated_arrears: Money,
}

/// Latest payment date per student in `scope_id`. Records with unparseable
/// dates are skipped with a warning.
pub fn last_payment_dates(scope_id: Uuid, payments: &[PaymentRecord]) -> HashMap<Uuid, NaiveDate> {
    let mut latest: HashMap<Uuid, NaiveDate> = HashMap::new();
    for payment in payments.iter().filter(|p| p.scope_id == scope_id) {
        let date = match payment.parsed_date() {
            Ok(date) => date,
            Err(err) => {
                warn!(error = %err, "skipping payment in last-payment scan");
                continue;
            }
        };
        latest
            .entry(payment.student_id)
            .and_modify(|current| *current = (*current).max(date))
            .or_insert(date);
    }
    latest
}

/// Ranks students by estimated gap, largest first; ties keep student id order.
/// Students without any arrears are omitted. `limit` caps the list length.
pub fn rank_most_overdue(
    students: &[Uuid],
    last_payments: &HashMap<Uuid, NaiveDate>,
    today: NaiveDate,
    amount_per_period: Money,
    limit: Option<usize>,
) -> Vec<TenureGap> {
    let mut ranked: Vec<TenureGap> = students
        .iter()
        .map(|student_id| {
            let last_payment = last_payments.get(student_id).copied();
            let gap_months = estimate_gap_months(last_payment, today);
            TenureGap {
                student_id: *student_id,
                last_payment,
                gap_months,
                estimated_arrears: amount_per_period.times(gap_months),
            }
        })
        .filter(|gap| gap.gap_months > 0)
        .collect();
    ranked.sort_by(|a, b| {
        b.gap_months
            .cmp(&a.gap_months)
            .then_with(|| a.student_id.cmp(&b.student_id))
    });
    if let Some(limit) = limit {
        ranked.truncate(limit);
    }
    ranked
}
