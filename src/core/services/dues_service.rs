use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::core::time::Clock;
use crate::domain::{select_active, CadenceConfig, PaymentRecord};
use crate::errors::Result;
use crate::ledger::{
    generate_semester, last_payment_dates, rank_most_overdue, LabelFormatter, Period,
    PeriodLabel, ReconciliationResult, Reconciler, SettlementStrategy, TenureGap,
};

/// Student-facing dues status and the treasurer-facing overdue ranking.
///
/// The two views use different estimators on purpose: [`DuesService::class_status`]
/// matches period labels, [`DuesService::most_overdue`] looks only at the month
/// of each student's last payment.
pub struct DuesService {
    config: Config,
    clock: Arc<dyn Clock>,
    reconciler: Reconciler,
}

impl DuesService {
    pub fn new(config: Config, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            reconciler: Reconciler::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: Box<dyn SettlementStrategy>) -> Self {
        self.reconciler = Reconciler::new(strategy);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    fn labels(&self) -> &'static dyn LabelFormatter {
        self.config.label_locale.formatter()
    }

    /// Label a payment made today should be recorded under.
    pub fn current_label(&self, cadence: &CadenceConfig) -> PeriodLabel {
        cadence.rule.canonical_label(self.today(), self.labels())
    }

    /// Periods of the current semester up to today.
    pub fn semester_periods(&self, cadence: &CadenceConfig) -> Result<Vec<Period>> {
        generate_semester(cadence, self.today(), self.labels())
    }

    pub fn student_status(
        &self,
        student_id: Uuid,
        cadence: &CadenceConfig,
        payments: &[PaymentRecord],
    ) -> Result<ReconciliationResult> {
        let periods = self.semester_periods(cadence)?;
        Ok(self
            .reconciler
            .reconcile(student_id, cadence.scope_id, &periods, payments, cadence))
    }

    pub fn class_status(
        &self,
        cadence: &CadenceConfig,
        students: &[Uuid],
        payments: &[PaymentRecord],
    ) -> Result<Vec<ReconciliationResult>> {
        let periods = self.semester_periods(cadence)?;
        let results = self.reconciler.reconcile_class(
            cadence.scope_id,
            students,
            &periods,
            payments,
            cadence,
        );
        let in_arrears = results.iter().filter(|result| !result.is_clear()).count();
        info!(
            scope = %cadence.scope_id,
            students = results.len(),
            in_arrears,
            "computed class dues status"
        );
        Ok(results)
    }

    /// Resolves the scope's single active cadence before reconciling. Fails
    /// with `InvalidCadence` when the scope has not been configured.
    pub fn scope_status(
        &self,
        configs: &[CadenceConfig],
        scope_id: Uuid,
        students: &[Uuid],
        payments: &[PaymentRecord],
    ) -> Result<Vec<ReconciliationResult>> {
        let cadence = select_active(configs, scope_id)?;
        self.class_status(cadence, students, payments)
    }

    pub fn most_overdue(
        &self,
        cadence: &CadenceConfig,
        students: &[Uuid],
        payments: &[PaymentRecord],
    ) -> Vec<TenureGap> {
        let last_payments = last_payment_dates(cadence.scope_id, payments);
        rank_most_overdue(
            students,
            &last_payments,
            self.today(),
            cadence.amount_per_period,
            self.config.ranking_limit,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::FixedClock;
    use crate::currency::Money;
    use crate::domain::CadenceRule;
    use crate::errors::DuesError;
    use crate::ledger::AdvanceCoverage;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn service(today: NaiveDate) -> DuesService {
        DuesService::new(Config::default(), Arc::new(FixedClock::new(today)))
    }

    #[test]
    fn current_label_uses_configured_locale() {
        let cadence = CadenceConfig::new(Uuid::new_v4(), CadenceRule::monthly(), Money(10_000));
        assert_eq!(service(date(2024, 8, 2)).current_label(&cadence).as_str(), "Agustus 2024");
    }

    #[test]
    fn unconfigured_scope_is_reported() {
        let err = service(date(2024, 2, 1))
            .scope_status(&[], Uuid::new_v4(), &[Uuid::new_v4()], &[])
            .unwrap_err();
        assert!(matches!(err, DuesError::InvalidCadence(_)));
    }

    #[test]
    fn strategy_can_be_swapped() {
        let cadence = CadenceConfig::new(Uuid::new_v4(), CadenceRule::monthly(), Money(10_000));
        let student = Uuid::new_v4();
        let ahead = PaymentRecord::auto(&cadence, student, date(2024, 1, 2), "Januari 2024", 3);

        let today = date(2024, 3, 15);
        let default = service(today)
            .student_status(student, &cadence, std::slice::from_ref(&ahead))
            .unwrap();
        assert_eq!(default.total_outstanding, Money(20_000));

        let corrected = service(today)
            .with_strategy(Box::new(AdvanceCoverage))
            .student_status(student, &cadence, &[ahead])
            .unwrap();
        assert!(corrected.is_clear());
    }
}
