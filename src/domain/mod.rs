//! Configuration and record types exchanged with the surrounding application.

pub mod cadence;
pub mod records;

pub use cadence::{select_active, CadenceConfig, CadenceRule, PaymentMethod};
pub use records::{parse_record_date, ExpenseRecord, PaymentRecord, SavingsGoal};
