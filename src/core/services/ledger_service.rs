use std::sync::Arc;

use crate::config::Config;
use crate::core::time::Clock;
use crate::domain::{ExpenseRecord, PaymentRecord, SavingsGoal};
use crate::ledger::{
    savings_progress, LedgerAggregator, LedgerEntry, LedgerSnapshot, MonthSpan, SavingsProgress,
};

/// Balance, report series and savings progress for one class.
pub struct LedgerService {
    aggregator: LedgerAggregator,
    clock: Arc<dyn Clock>,
}

impl LedgerService {
    pub fn new(config: &Config, clock: Arc<dyn Clock>) -> Self {
        Self {
            aggregator: config.aggregator(),
            clock,
        }
    }

    pub fn snapshot(
        &self,
        payments: &[PaymentRecord],
        savings_payments: &[PaymentRecord],
        expenses: &[ExpenseRecord],
        window: Option<MonthSpan>,
    ) -> LedgerSnapshot {
        self.aggregator.aggregate(
            payments,
            savings_payments,
            expenses,
            window,
            self.clock.today(),
        )
    }

    pub fn entries(
        &self,
        payments: &[PaymentRecord],
        savings_payments: &[PaymentRecord],
        expenses: &[ExpenseRecord],
    ) -> Vec<LedgerEntry> {
        self.aggregator.entries(payments, savings_payments, expenses)
    }

    pub fn savings_progress(
        &self,
        goal: &SavingsGoal,
        payments: &[PaymentRecord],
    ) -> SavingsProgress {
        savings_progress(goal, payments, self.clock.today())
    }
}
