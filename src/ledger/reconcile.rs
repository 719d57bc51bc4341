//! Matches a student's payments against a period sequence.
//!
//! The default [`LabelMatch`] strategy settles exactly the periods whose label
//! appears on a payment. A payment covering several periods still settles only
//! its own label; [`AdvanceCoverage`] is the alternative that also settles the
//! following periods. Both read the same stored `periods_covered`, so switching
//! strategy needs no data migration. [`LenientLabelMatch`] settles like
//! [`LabelMatch`] but tolerates hand-typed labels with stray case or padding.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::label::PeriodLabel;
use super::sequencer::Period;
use crate::currency::Money;
use crate::domain::cadence::CadenceConfig;
use crate::domain::records::PaymentRecord;

/// Decides which periods of a sequence are settled by a student's payments.
pub trait SettlementStrategy: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    /// Returns one flag per entry of `periods`. `payments` are already
    /// restricted to a single student and scope.
    fn settle(&self, periods: &[Period], payments: &[&PaymentRecord]) -> Vec<bool>;

    /// Whether a stored payment label refers to `period`.
    fn label_matches(&self, period: &PeriodLabel, stored: &str) -> bool {
        period.matches(stored)
    }
}

fn settle_by_label<S: SettlementStrategy + ?Sized>(
    strategy: &S,
    periods: &[Period],
    payments: &[&PaymentRecord],
) -> Vec<bool> {
    periods
        .iter()
        .map(|period| {
            payments
                .iter()
                .any(|payment| strategy.label_matches(&period.label, &payment.period_label))
        })
        .collect()
}

/// A period is settled iff some payment carries its label.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelMatch;

impl SettlementStrategy for LabelMatch {
    fn name(&self) -> &'static str {
        "label_match"
    }

    fn settle(&self, periods: &[Period], payments: &[&PaymentRecord]) -> Vec<bool> {
        settle_by_label(self, periods, payments)
    }
}

/// [`LabelMatch`] with case-insensitive, whitespace-trimmed label comparison.
#[derive(Debug, Clone, Copy, Default)]
pub struct LenientLabelMatch;

impl SettlementStrategy for LenientLabelMatch {
    fn name(&self) -> &'static str {
        "lenient_label_match"
    }

    fn settle(&self, periods: &[Period], payments: &[&PaymentRecord]) -> Vec<bool> {
        settle_by_label(self, periods, payments)
    }

    fn label_matches(&self, period: &PeriodLabel, stored: &str) -> bool {
        period.matches_loosely(stored)
    }
}

/// A payment with `periods_covered = k` settles its own period and the next
/// `k - 1` periods of the sequence.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdvanceCoverage;

impl SettlementStrategy for AdvanceCoverage {
    fn name(&self) -> &'static str {
        "advance_coverage"
    }

    fn settle(&self, periods: &[Period], payments: &[&PaymentRecord]) -> Vec<bool> {
        let mut settled = vec![false; periods.len()];
        for payment in payments {
            let Some(start) = periods
                .iter()
                .position(|period| self.label_matches(&period.label, &payment.period_label))
            else {
                continue;
            };
            let end = start
                .saturating_add(payment.periods_covered.max(1) as usize)
                .min(periods.len());
            for flag in &mut settled[start..end] {
                *flag = true;
            }
        }
        settled
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodStatus {
    pub label: PeriodLabel,
    pub settled: bool,
    /// Zero when settled, the cadence amount otherwise.
    pub amount_due: Money,
    /// Sum of payments recorded under this label.
    pub paid: Money,
}

/// Per-student reconciliation outcome. Derived on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub student_id: Uuid,
    pub scope_id: Uuid,
    pub periods: Vec<PeriodStatus>,
    pub total_outstanding: Money,
}

impl ReconciliationResult {
    pub fn outstanding_count(&self) -> usize {
        self.periods.iter().filter(|period| !period.settled).count()
    }

    pub fn settled_count(&self) -> usize {
        self.periods.len() - self.outstanding_count()
    }

    pub fn is_clear(&self) -> bool {
        self.total_outstanding == Money::ZERO
    }

    pub fn outstanding_labels(&self) -> impl Iterator<Item = &PeriodLabel> {
        self.periods
            .iter()
            .filter(|period| !period.settled)
            .map(|period| &period.label)
    }

    pub fn total_paid(&self) -> Money {
        self.periods.iter().map(|period| period.paid).sum()
    }
}

/// Side-effect-free reconciler; share one instance across threads freely.
#[derive(Debug)]
pub struct Reconciler {
    strategy: Box<dyn SettlementStrategy>,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(Box::new(LabelMatch))
    }
}

impl Reconciler {
    pub fn new(strategy: Box<dyn SettlementStrategy>) -> Self {
        Self { strategy }
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// `reconcile(student_id, scope_id, period_sequence, payment_records)`.
    pub fn reconcile(
        &self,
        student_id: Uuid,
        scope_id: Uuid,
        periods: &[Period],
        payments: &[PaymentRecord],
        cadence: &CadenceConfig,
    ) -> ReconciliationResult {
        let own: Vec<&PaymentRecord> = payments
            .iter()
            .filter(|payment| payment.belongs_to(student_id, scope_id))
            .collect();
        self.reconcile_filtered(student_id, scope_id, periods, &own, cadence.amount_per_period)
    }

    /// Reconciles every listed student against one shared payment set, in the
    /// order the students were given.
    pub fn reconcile_class(
        &self,
        scope_id: Uuid,
        students: &[Uuid],
        periods: &[Period],
        payments: &[PaymentRecord],
        cadence: &CadenceConfig,
    ) -> Vec<ReconciliationResult> {
        let mut by_student: HashMap<Uuid, Vec<&PaymentRecord>> = HashMap::new();
        for payment in payments.iter().filter(|p| p.scope_id == scope_id) {
            by_student.entry(payment.student_id).or_default().push(payment);
        }
        let results: Vec<ReconciliationResult> = students
            .iter()
            .map(|student_id| {
                let own = by_student
                    .get(student_id)
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                self.reconcile_filtered(
                    *student_id,
                    scope_id,
                    periods,
                    own,
                    cadence.amount_per_period,
                )
            })
            .collect();
        debug!(
            %scope_id,
            students = results.len(),
            periods = periods.len(),
            strategy = self.strategy.name(),
            "reconciled class"
        );
        results
    }

    fn reconcile_filtered(
        &self,
        student_id: Uuid,
        scope_id: Uuid,
        periods: &[Period],
        payments: &[&PaymentRecord],
        amount_per_period: Money,
    ) -> ReconciliationResult {
        let settled = self.strategy.settle(periods, payments);
        let periods: Vec<PeriodStatus> = periods
            .iter()
            .zip(settled)
            .map(|(period, settled)| {
                let paid = payments
                    .iter()
                    .filter(|payment| {
                        self.strategy
                            .label_matches(&period.label, &payment.period_label)
                    })
                    .map(|payment| payment.amount)
                    .sum();
                PeriodStatus {
                    label: period.label.clone(),
                    settled,
                    amount_due: if settled {
                        Money::ZERO
                    } else {
                        amount_per_period
                    },
                    paid,
                }
            })
            .collect();
        let total_outstanding = periods.iter().map(|period| period.amount_due).sum();
        ReconciliationResult {
            student_id,
            scope_id,
            periods,
            total_outstanding,
        }
    }
}
