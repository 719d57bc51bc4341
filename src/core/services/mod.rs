//! Facades that combine configuration, a clock and the engine for callers
//! that do not want to thread "today" and locale settings through every call.

pub mod dues_service;
pub mod ledger_service;

pub use dues_service::DuesService;
pub use ledger_service::LedgerService;
