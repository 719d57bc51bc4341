#![doc(test(attr(deny(warnings))))]

//! Kas Core computes class dues status and class-fund ledgers: it expands a
//! configured payment cadence into billing periods, reconciles recorded
//! payments against them, estimates arrears for overdue rankings and
//! aggregates income and expenses into balances and monthly series.
//!
//! The crate performs no I/O on records. Callers fetch payments and expenses
//! from their store and pass immutable snapshots in.

pub mod config;
pub mod core;
pub mod currency;
pub mod domain;
pub mod errors;
pub mod ledger;
pub mod utils;

pub use errors::{DuesError, Result};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Kas Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
