pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "amortization")]
pub mod amortization;

#[cfg(feature = "evaluation")]
pub mod evaluation;

#[cfg(feature = "applicant")]
pub mod applicant;

pub use error::LendingError;
pub use types::*;

/// Standard result type for all lending operations
pub type LendingResult<T> = Result<T, LendingError>;
