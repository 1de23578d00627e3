use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoanError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Insufficient information: {0}")]
    InsufficientInformation(String),

    #[error("Payment too low: {payment} does not exceed first-month interest of {first_interest}")]
    PaymentTooLow {
        payment: Decimal,
        first_interest: Decimal,
    },

    #[error("Infeasible parameters: {0}")]
    InfeasibleParameters(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for LoanError {
    fn from(e: serde_json::Error) -> Self {
        LoanError::SerializationError(e.to_string())
    }
}
