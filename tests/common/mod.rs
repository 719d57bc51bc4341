#![allow(dead_code)]

use chrono::NaiveDate;
use kas_core::currency::Money;
use kas_core::domain::{CadenceConfig, CadenceRule, ExpenseRecord, PaymentRecord};
use uuid::Uuid;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// Monthly class dues of Rp10.000 per period.
pub fn monthly_dues() -> CadenceConfig {
    CadenceConfig::new(Uuid::new_v4(), CadenceRule::monthly(), Money(10_000))
}

pub fn pay(cadence: &CadenceConfig, student: Uuid, on: NaiveDate, label: &str) -> PaymentRecord {
    PaymentRecord::new(student, cadence.scope_id, on, label, cadence.amount_per_period)
}

pub fn payments_totalling(scope: Uuid, amounts: &[i64]) -> Vec<PaymentRecord> {
    amounts
        .iter()
        .enumerate()
        .map(|(idx, amount)| {
            PaymentRecord::new(
                Uuid::new_v4(),
                scope,
                date(2024, 1, 1 + idx as u32),
                "Januari 2024",
                Money(*amount),
            )
        })
        .collect()
}

pub fn expenses_totalling(scope: Uuid, amounts: &[i64]) -> Vec<ExpenseRecord> {
    amounts
        .iter()
        .enumerate()
        .map(|(idx, amount)| {
            ExpenseRecord::new(scope, date(2024, 2, 1 + idx as u32), "Operasional", Money(*amount))
        })
        .collect()
}
