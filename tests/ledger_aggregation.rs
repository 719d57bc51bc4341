mod common;

use kas_core::currency::Money;
use kas_core::domain::PaymentRecord;
use kas_core::ledger::{EntryKind, LedgerAggregator, MonthKey, MonthSpan};
use uuid::Uuid;

use common::{date, expenses_totalling, payments_totalling};

#[test]
fn balance_is_income_minus_expense() {
    let scope = Uuid::new_v4();
    let payments = payments_totalling(scope, &[100_000, 50_000]);
    let savings = payments_totalling(scope, &[20_000, 30_000]);
    let expenses = expenses_totalling(scope, &[45_000, 15_000]);

    let snapshot = LedgerAggregator::default().aggregate(
        &payments,
        &savings,
        &expenses,
        None,
        date(2024, 3, 1),
    );

    assert_eq!(snapshot.total_income, Money(200_000));
    assert_eq!(snapshot.total_expense, Money(60_000));
    assert_eq!(snapshot.balance, Money(140_000));
    assert_eq!(snapshot.skipped_records, 0);
}

#[test]
fn malformed_rows_are_skipped_not_fatal() {
    let scope = Uuid::new_v4();
    let mut payments = payments_totalling(scope, &[10_000, 10_000, 10_000]);
    payments[1].date = "31/01/2024".into();
    let mut expenses = expenses_totalling(scope, &[5_000, 2_500]);
    expenses[0].amount = Money(-5_000);

    let snapshot =
        LedgerAggregator::default().aggregate(&payments, &[], &expenses, None, date(2024, 2, 20));

    assert_eq!(snapshot.skipped_records, 2);
    assert_eq!(snapshot.total_income, Money(20_000));
    assert_eq!(snapshot.total_expense, Money(2_500));
    assert_eq!(snapshot.balance, snapshot.total_income - snapshot.total_expense);
}

#[test]
fn monthly_series_buckets_each_stream_independently() {
    let scope = Uuid::new_v4();
    let student = Uuid::new_v4();
    let payments = vec![
        PaymentRecord::new(student, scope, date(2024, 1, 3), "Januari 2024", Money(10_000)),
        PaymentRecord::new(student, scope, date(2024, 3, 3), "Maret 2024", Money(10_000)),
        // Outside the requested window: counted in totals, not in the series.
        PaymentRecord::new(student, scope, date(2023, 6, 3), "Juni 2023", Money(10_000)),
    ];
    let expenses = expenses_totalling(scope, &[4_000]);
    let window = MonthSpan::new(MonthKey::new(2024, 1).unwrap(), 3);

    let snapshot = LedgerAggregator::default().aggregate(
        &payments,
        &[],
        &expenses,
        Some(window),
        date(2024, 3, 31),
    );

    let series: Vec<(String, i64, i64)> = snapshot
        .monthly_series
        .iter()
        .map(|bucket| {
            (
                bucket.month.to_string(),
                bucket.income.value(),
                bucket.expense.value(),
            )
        })
        .collect();
    assert_eq!(
        series,
        vec![
            ("2024-01".to_string(), 10_000, 0),
            ("2024-02".to_string(), 0, 4_000),
            ("2024-03".to_string(), 10_000, 0),
        ]
    );
    assert_eq!(snapshot.total_income, Money(30_000));
}

#[test]
fn report_rows_end_at_the_snapshot_balance() {
    let scope = Uuid::new_v4();
    let payments = payments_totalling(scope, &[25_000, 25_000]);
    let savings = payments_totalling(scope, &[10_000]);
    let expenses = expenses_totalling(scope, &[12_000, 3_000]);
    let aggregator = LedgerAggregator::default();

    let rows = aggregator.entries(&payments, &savings, &expenses);
    let snapshot = aggregator.aggregate(&payments, &savings, &expenses, None, date(2024, 3, 1));

    assert_eq!(rows.len(), 5);
    assert!(rows.windows(2).all(|pair| pair[0].date <= pair[1].date));
    assert!(rows
        .iter()
        .filter(|row| row.kind == EntryKind::Expense)
        .all(|row| row.amount.is_negative()));
    assert_eq!(rows.last().unwrap().balance_after, snapshot.balance);
}
