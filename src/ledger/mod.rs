//! Periodic dues and ledger reconciliation engine.
//!
//! Every function here is a pure computation over record snapshots handed in
//! by the caller; nothing is persisted and no shared state is held, so
//! independent students or classes can be processed in parallel.

pub mod aggregate;
pub mod cadence;
pub mod calendar;
pub mod label;
pub mod reconcile;
pub mod sequencer;
pub mod tenure;

pub use aggregate::{
    savings_progress, EntryKind, EntrySource, LedgerAggregator, LedgerEntry, LedgerSnapshot,
    MonthlyBucket, SavingsProgress,
};
pub use cadence::{canonical_label, daily_epoch, occurs_on};
pub use calendar::{semester_window, DateWindow, MonthKey, MonthSpan};
pub use label::{EnglishLabels, IndonesianLabels, LabelFormatter, LabelLocale, PeriodLabel};
pub use reconcile::{
    AdvanceCoverage, LabelMatch, LenientLabelMatch, PeriodStatus, ReconciliationResult, Reconciler,
    SettlementStrategy,
};
pub use sequencer::{generate, generate_semester, Period};
pub use tenure::{estimate_gap_months, last_payment_dates, rank_most_overdue, TenureGap};
