pub mod dcf;
pub mod epv;

#[cfg(feature = "sensitivity")]
pub mod sensitivity;

pub use dcf::{dcf, parse_dcf_input, DcfBreakdown, DcfInput, DcfResult, DcfYear};
pub use epv::{epv, parse_epv_input, EpvInput, EpvResult};
