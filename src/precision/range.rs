//! MPFR exponent range derivation

use super::PrecisionError;
use serde::{Deserialize, Serialize};

/// Exponent codes reserved by IEEE 754 (all zeros and all ones)
const IEEE_SPECIAL_EXPONENTS: i64 = 2;

/// MPFR normalizes significands into [0.5, 1) instead of [1, 2)
const MPFR_OFFSET: i64 = 1;

/// Widest exponent field whose code space still fits in an `i64`
const MAX_EXPONENT_WIDTH: u32 = 62;

/// Parameters handed to the simulator's MPFR-backed float type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MpfrRange {
    /// MPFR precision (explicit significand bits plus the hidden bit)
    pub significand: u32,

    /// Smallest MPFR exponent, including the subnormal extension
    pub exponent_min: i64,

    /// Largest MPFR exponent
    pub exponent_max: i64,
}

impl MpfrRange {
    /// Build a range from values chosen by hand rather than derived
    pub fn explicit(
        significand: u32,
        exponent_min: i64,
        exponent_max: i64,
    ) -> Result<Self, String> {
        if significand < 1 {
            return Err(format!("significand must be at least 1, got {}", significand));
        }
        if exponent_min >= exponent_max {
            return Err(format!(
                "exponent_min ({}) must be below exponent_max ({})",
                exponent_min, exponent_max
            ));
        }
        Ok(Self {
            significand,
            exponent_min,
            exponent_max,
        })
    }
}

/// Computes the MPFR exponent range and precision that emulate an
/// IEEE 754-style format with the given field widths.
///
/// The minimum exponent is extended by `significand_width` so that the
/// subnormal range of the emulated format stays representable.
///
/// # Errors
/// Returns `PrecisionError::InvalidFormatWidth` if either width is zero, the
/// exponent field is too wide for a signed 64-bit exponent, or the format has
/// no usable exponent range at all.
pub fn derive_mpfr_range(
    exponent_width: u32,
    significand_width: u32,
) -> Result<MpfrRange, PrecisionError> {
    if exponent_width < 1 {
        return Err(PrecisionError::InvalidFormatWidth {
            field: "exponent",
            width: exponent_width,
            reason: "must be at least 1",
        });
    }
    if exponent_width > MAX_EXPONENT_WIDTH {
        return Err(PrecisionError::InvalidFormatWidth {
            field: "exponent",
            width: exponent_width,
            reason: "exceeds the 64-bit exponent range",
        });
    }
    if significand_width < 1 {
        return Err(PrecisionError::InvalidFormatWidth {
            field: "significand",
            width: significand_width,
            reason: "must be at least 1",
        });
    }
    let significand = significand_width
        .checked_add(1)
        .ok_or(PrecisionError::InvalidFormatWidth {
            field: "significand",
            width: significand_width,
            reason: "too wide",
        })?;

    let exponent_range = (1i64 << exponent_width) - IEEE_SPECIAL_EXPONENTS;
    let mut maximum = exponent_range / 2;
    let mut minimum = -exponent_range / 2 + 1;

    maximum += MPFR_OFFSET;
    minimum += MPFR_OFFSET;

    // subnormals
    minimum -= i64::from(significand_width);

    // A 1-bit exponent with a 1-bit significand collapses to a single exponent
    if minimum >= maximum {
        return Err(PrecisionError::InvalidFormatWidth {
            field: "exponent",
            width: exponent_width,
            reason: "leaves no usable exponent range",
        });
    }

    Ok(MpfrRange {
        significand,
        exponent_min: minimum,
        exponent_max: maximum,
    })
}

/// IEEE 754 exponent range of an exponent field, without subnormals.
///
/// Returns `(minimum, maximum)`.
pub fn exponent_no_subnormal_range(exponent_width: u32) -> Result<(i64, i64), PrecisionError> {
    if exponent_width <= 1 || exponent_width > MAX_EXPONENT_WIDTH {
        return Err(PrecisionError::InvalidFormatWidth {
            field: "exponent",
            width: exponent_width,
            reason: "must be between 2 and 62",
        });
    }

    let range = 1i64 << exponent_width;
    Ok((-range / 2 + 2, range / 2 - 1))
}

/// A target floating-point format together with its derived MPFR range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PrecisionProfile {
    pub exponent_width: u32,
    pub significand_width: u32,
    pub mpfr: MpfrRange,
}

impl PrecisionProfile {
    pub fn new(exponent_width: u32, significand_width: u32) -> Result<Self, PrecisionError> {
        let mpfr = derive_mpfr_range(exponent_width, significand_width)?;
        Ok(Self {
            exponent_width,
            significand_width,
            mpfr,
        })
    }

    /// IEEE single precision
    pub fn binary32() -> Self {
        Self {
            exponent_width: 8,
            significand_width: 23,
            mpfr: MpfrRange {
                significand: 24,
                exponent_min: -148,
                exponent_max: 128,
            },
        }
    }
}
