pub mod sensitivity;
pub mod valuation;
