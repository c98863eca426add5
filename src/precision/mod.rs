//! Precision profile calculator
//!
//! Derives the parameters that configure the simulator's variable-precision
//! float type. The simulator emulates reduced formats on top of MPFR, which
//! needs an exponent range and a significand width rather than raw field
//! widths.

pub mod decompose;
pub mod range;

use thiserror::Error;

pub use decompose::{components, significand_length};
pub use range::{derive_mpfr_range, exponent_no_subnormal_range, MpfrRange, PrecisionProfile};

/// Error types for precision calculations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PrecisionError {
    #[error("Invalid {field} width {width}: {reason}")]
    InvalidFormatWidth {
        field: &'static str,
        width: u32,
        reason: &'static str,
    },

    #[error("Cannot decompose {0}: value must be finite and non-zero")]
    DomainError(f64),
}
