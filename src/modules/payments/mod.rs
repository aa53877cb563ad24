//! Payments and the invoice ledger state machine.

pub mod models;
pub mod repositories;
pub mod services;

pub use models::{LedgerPolicy, LedgerState, NewPayment, Payment, PaymentMethod};
pub use services::PaymentLedger;
