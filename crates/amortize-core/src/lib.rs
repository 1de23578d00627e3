pub mod amortization;
pub mod annuity;
pub mod error;
pub mod rates;
pub mod types;

pub use error::LoanError;
pub use types::*;

/// Standard result type for all amortize operations
pub type LoanResult<T> = Result<T, LoanError>;
