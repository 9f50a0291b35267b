pub mod error;
pub mod types;
pub mod validation;

#[cfg(feature = "valuation")]
pub mod valuation;

#[cfg(feature = "valuation")]
pub mod adapter;

pub use error::ValuationError;
pub use types::*;
pub use validation::{Issue, Validate, ValidationIssues};

#[cfg(feature = "valuation")]
pub use adapter::{compute_dcf, compute_epv, Computation};

/// Standard result type for all fail-fast valuation operations
pub type ValuationResult<T> = Result<T, ValuationError>;
