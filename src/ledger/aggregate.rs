//! Income, expense and balance views over every transaction source of a class.
//!
//! Balances are recomputed from the full record history on every call and
//! never cached. Cost is linear in the number of records, which is fine for a
//! single class but should be revisited before aggregating many classes at once.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::calendar::{MonthKey, MonthSpan};
use crate::currency::Money;
use crate::domain::records::{ExpenseRecord, PaymentRecord, SavingsGoal};

pub const DEFAULT_SERIES_MONTHS: u32 = 6;
pub const MAX_SERIES_MONTHS: u32 = 24;

const DUES_CATEGORY: &str = "Kas";
const SAVINGS_CATEGORY: &str = "Tabungan";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Income,
    Expense,
}

impl EntryKind {
    /// Value of the `Jenis` report column.
    pub fn label(&self) -> &'static str {
        match self {
            EntryKind::Income => "Pemasukan",
            EntryKind::Expense => "Pengeluaran",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    Dues,
    Savings,
    Expense,
}

/// One report row: Tanggal, Jenis, Kategori, Keterangan, Nominal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub date: NaiveDate,
    pub kind: EntryKind,
    pub source: EntrySource,
    pub category: String,
    pub description: String,
    /// Positive for income, negative for expenses.
    pub amount: Money,
    pub balance_after: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyBucket {
    pub month: MonthKey,
    pub income: Money,
    pub expense: Money,
}

impl MonthlyBucket {
    pub fn net(&self) -> Money {
        self.income - self.expense
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub total_income: Money,
    pub total_expense: Money,
    pub balance: Money,
    pub monthly_series: Vec<MonthlyBucket>,
    /// Records left out because their date or amount could not be used.
    pub skipped_records: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsProgress {
    pub collected: Money,
    pub target: Money,
    pub remaining: Money,
    pub percent_complete: f64,
    pub reached: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_left: Option<i64>,
}

struct Flow {
    date: NaiveDate,
    kind: EntryKind,
    source: EntrySource,
    category: String,
    description: String,
    amount: Money,
}

/// Stateless aggregator; the settings only bound the report series width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerAggregator {
    pub default_months: u32,
    pub max_months: u32,
}

impl Default for LedgerAggregator {
    fn default() -> Self {
        Self {
            default_months: DEFAULT_SERIES_MONTHS,
            max_months: MAX_SERIES_MONTHS,
        }
    }
}

impl LedgerAggregator {
    pub fn new(default_months: u32, max_months: u32) -> Self {
        let max_months = max_months.max(1);
        Self {
            default_months: default_months.clamp(1, max_months),
            max_months,
        }
    }

    /// `aggregate(payments, savings_payments, expenses, window?)`.
    ///
    /// Totals cover the whole history; `window` only shapes the monthly series
    /// and defaults to the trailing months ending with `today`'s month.
    pub fn aggregate(
        &self,
        payments: &[PaymentRecord],
        savings_payments: &[PaymentRecord],
        expenses: &[ExpenseRecord],
        window: Option<MonthSpan>,
        today: NaiveDate,
    ) -> LedgerSnapshot {
        let (flows, skipped_records) = collect_flows(payments, savings_payments, expenses);

        let mut total_income = Money::ZERO;
        let mut total_expense = Money::ZERO;
        for flow in &flows {
            match flow.kind {
                EntryKind::Income => total_income += flow.amount,
                EntryKind::Expense => total_expense += flow.amount,
            }
        }

        let span = self.series_span(window, today);
        let mut buckets: BTreeMap<MonthKey, MonthlyBucket> = span
            .iter()
            .map(|month| {
                (
                    month,
                    MonthlyBucket {
                        month,
                        income: Money::ZERO,
                        expense: Money::ZERO,
                    },
                )
            })
            .collect();
        for flow in &flows {
            if let Some(bucket) = buckets.get_mut(&MonthKey::of(flow.date)) {
                match flow.kind {
                    EntryKind::Income => bucket.income += flow.amount,
                    EntryKind::Expense => bucket.expense += flow.amount,
                }
            }
        }

        debug!(
            records = flows.len(),
            skipped = skipped_records,
            months = buckets.len(),
            "aggregated ledger"
        );
        LedgerSnapshot {
            total_income,
            total_expense,
            balance: total_income - total_expense,
            monthly_series: buckets.into_values().collect(),
            skipped_records,
        }
    }

    /// Chronological report rows with a running balance. Income precedes
    /// expenses on the same day.
    pub fn entries(
        &self,
        payments: &[PaymentRecord],
        savings_payments: &[PaymentRecord],
        expenses: &[ExpenseRecord],
    ) -> Vec<LedgerEntry> {
        let (mut flows, _) = collect_flows(payments, savings_payments, expenses);
        flows.sort_by_key(|flow| (flow.date, flow.kind == EntryKind::Expense));
        let mut balance = Money::ZERO;
        flows
            .into_iter()
            .map(|flow| {
                let amount = match flow.kind {
                    EntryKind::Income => flow.amount,
                    EntryKind::Expense => -flow.amount,
                };
                balance += amount;
                LedgerEntry {
                    date: flow.date,
                    kind: flow.kind,
                    source: flow.source,
                    category: flow.category,
                    description: flow.description,
                    amount,
                    balance_after: balance,
                }
            })
            .collect()
    }

    fn series_span(&self, window: Option<MonthSpan>, today: NaiveDate) -> MonthSpan {
        let span = window
            .unwrap_or_else(|| MonthSpan::trailing(MonthKey::of(today), self.default_months));
        if span.months > self.max_months {
            warn!(
                requested = span.months,
                limit = self.max_months,
                "report window capped"
            );
        }
        span.capped(self.max_months)
    }
}

/// Sum of the goal's scope payments against its target.
pub fn savings_progress(
    goal: &SavingsGoal,
    payments: &[PaymentRecord],
    today: NaiveDate,
) -> SavingsProgress {
    let collected: Money = payments
        .iter()
        .filter(|payment| payment.scope_id == goal.scope_id)
        .filter_map(|payment| match payment.checked() {
            Ok(_) => Some(payment.amount),
            Err(err) => {
                warn!(error = %err, goal = %goal.name, "skipping savings payment");
                None
            }
        })
        .sum();
    let target = goal.target_amount;
    let remaining = (target - collected).max(Money::ZERO);
    let percent_complete = if target.is_positive() {
        (collected.value() as f64 / target.value() as f64 * 100.0).min(100.0)
    } else {
        100.0
    };
    SavingsProgress {
        collected,
        target,
        remaining,
        percent_complete,
        reached: collected >= target,
        days_left: goal
            .target_date
            .map(|deadline| (deadline - today).num_days().max(0)),
    }
}

fn collect_flows(
    payments: &[PaymentRecord],
    savings_payments: &[PaymentRecord],
    expenses: &[ExpenseRecord],
) -> (Vec<Flow>, usize) {
    let mut flows = Vec::with_capacity(payments.len() + savings_payments.len() + expenses.len());
    let mut skipped = 0usize;

    let streams = [
        (payments, EntrySource::Dues, DUES_CATEGORY),
        (savings_payments, EntrySource::Savings, SAVINGS_CATEGORY),
    ];
    for (records, source, category) in streams {
        for payment in records {
            match payment.checked() {
                Ok(date) => flows.push(Flow {
                    date,
                    kind: EntryKind::Income,
                    source,
                    category: category.to_string(),
                    description: payment
                        .note
                        .clone()
                        .unwrap_or_else(|| payment.period_label.clone()),
                    amount: payment.amount,
                }),
                Err(err) => {
                    warn!(error = %err, "skipping malformed payment");
                    skipped += 1;
                }
            }
        }
    }

    for expense in expenses {
        match expense.checked() {
            Ok(date) => flows.push(Flow {
                date,
                kind: EntryKind::Expense,
                source: EntrySource::Expense,
                category: expense.category.clone(),
                description: expense.note.clone().unwrap_or_default(),
                amount: expense.amount,
            }),
            Err(err) => {
                warn!(error = %err, "skipping malformed expense");
                skipped += 1;
            }
        }
    }

    (flows, skipped)
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::domain::cadence::{CadenceConfig, CadenceRule};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn empty_input_has_zero_balance_and_full_series() {
        let snapshot = LedgerAggregator::default().aggregate(&[], &[], &[], None, date(2024, 3, 9));
        assert_eq!(snapshot.balance, Money::ZERO);
        assert_eq!(snapshot.monthly_series.len(), 6);
        assert_eq!(snapshot.monthly_series[0].month, MonthKey::new(2023, 10).unwrap());
        assert_eq!(snapshot.monthly_series[5].month, MonthKey::new(2024, 3).unwrap());
        assert!(snapshot
            .monthly_series
            .iter()
            .all(|bucket| bucket.income == Money::ZERO && bucket.expense == Money::ZERO));
    }

    #[test]
    fn oversized_window_is_capped_to_latest_months() {
        let aggregator = LedgerAggregator::new(6, 12);
        let span = MonthSpan::new(MonthKey::new(2020, 1).unwrap(), 60);
        let snapshot = aggregator.aggregate(&[], &[], &[], Some(span), date(2024, 1, 1));
        assert_eq!(snapshot.monthly_series.len(), 12);
        assert_eq!(
            snapshot.monthly_series.last().unwrap().month,
            MonthKey::new(2024, 12).unwrap()
        );
    }

    #[test]
    fn entries_carry_signed_amounts_and_running_balance() {
        let scope = Uuid::new_v4();
        let student = Uuid::new_v4();
        let label = "Februari 2024";
        let dues = PaymentRecord::new(student, scope, date(2024, 2, 1), label, Money(10_000));
        let savings = PaymentRecord::new(student, scope, date(2024, 2, 3), label, Money(5_000))
            .with_note("Tabungan study tour");
        let expense =
            ExpenseRecord::new(scope, date(2024, 2, 1), "ATK", Money(4_000)).with_note("Spidol");

        let rows = LedgerAggregator::default().entries(&[dues], &[savings], &[expense]);
        let summary: Vec<(&str, &str, i64, i64)> = rows
            .iter()
            .map(|row| {
                (
                    row.kind.label(),
                    row.category.as_str(),
                    row.amount.value(),
                    row.balance_after.value(),
                )
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Pemasukan", "Kas", 10_000, 10_000),
                ("Pengeluaran", "ATK", -4_000, 6_000),
                ("Pemasukan", "Tabungan", 5_000, 11_000),
            ]
        );
        assert_eq!(rows[0].description, "Februari 2024");
        assert_eq!(rows[2].description, "Tabungan study tour");
    }

    #[test]
    fn savings_progress_is_derived_from_scope_payments() {
        let cadence = CadenceConfig::new(Uuid::new_v4(), CadenceRule::monthly(), Money(50_000));
        let goal = SavingsGoal::new("Study tour", Money(200_000), cadence.clone())
            .with_target_date(date(2024, 6, 30));
        let student = Uuid::new_v4();
        let payments = vec![
            PaymentRecord::auto(&cadence, student, date(2024, 1, 5), "Januari 2024", 1),
            PaymentRecord::auto(&cadence, student, date(2024, 2, 5), "Februari 2024", 2),
            PaymentRecord::new(student, Uuid::new_v4(), date(2024, 2, 5), "x", Money(999_000)),
        ];
        let progress = savings_progress(&goal, &payments, date(2024, 6, 20));
        assert_eq!(progress.collected, Money(150_000));
        assert_eq!(progress.remaining, Money(50_000));
        assert!(!progress.reached);
        assert!((progress.percent_complete - 75.0).abs() < f64::EPSILON);
        assert_eq!(progress.days_left, Some(10));
    }
}
