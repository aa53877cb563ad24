use rust_decimal::Decimal;

/// Engine-wide Result type
pub type Result<T> = std::result::Result<T, EngineError>;

/// Main engine error type
///
/// `Validation`, `Overpayment` and `NotFound` are recoverable by the caller;
/// `SequenceConflict` means the whole operation may be retried as-is.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    /// Validation errors for business rules; the message names the field
    #[error("Validation error: {0}")]
    Validation(String),

    /// A payment would push the invoice ledger past its grand total
    #[error(
        "Overpayment: payment of {amount} would exceed invoice total {total_ttc} \
         (already paid: {already_paid})"
    )]
    Overpayment {
        amount: Decimal,
        already_paid: Decimal,
        total_ttc: Decimal,
    },

    /// Document number assignment lost every retry against concurrent writers
    #[error(
        "Sequence conflict: could not assign a document number for {tenant_id}/{kind}/{period} \
         after {attempts} attempts"
    )]
    SequenceConflict {
        tenant_id: i64,
        kind: String,
        period: String,
        attempts: u32,
    },

    /// Referenced document/payment absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Database operation errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal invariant failures
    #[error("Internal error: {0}")]
    Internal(String),
}

// Helper functions for common error scenarios
impl EngineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        EngineError::Validation(msg.into())
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        EngineError::NotFound(resource.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        EngineError::Configuration(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        EngineError::Internal(msg.into())
    }

    /// True when the caller can fix the request and resubmit
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::Validation(_)
                | EngineError::Overpayment { .. }
                | EngineError::NotFound(_)
        )
    }
}
