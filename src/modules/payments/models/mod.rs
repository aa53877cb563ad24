pub mod ledger;
pub mod payment;

pub use ledger::{LedgerPolicy, LedgerState};
pub use payment::{NewPayment, Payment, PaymentMethod};
