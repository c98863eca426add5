//! Float decomposition helpers

use super::PrecisionError;

const F64_EXPONENT_MASK: u64 = 0x7ff << 52;
const F64_EXPONENT_BIAS: i32 = 1022;
const F32_MANTISSA_BITS: u32 = 23;
const F32_MANTISSA_MASK: u32 = (1 << F32_MANTISSA_BITS) - 1;

/// Splits a value into a base-2 exponent and a significand in `[1, 2)`.
///
/// Negative inputs keep their sign on the significand.
///
/// # Errors
/// Zero, infinities and NaN have no such decomposition and yield
/// `PrecisionError::DomainError`.
pub fn components(value: f64) -> Result<(i32, f64), PrecisionError> {
    if value == 0.0 || !value.is_finite() {
        return Err(PrecisionError::DomainError(value));
    }

    let (fraction, exponent) = frexp(value);
    Ok((exponent - 1, fraction * 2.0))
}

/// Returns `(fraction, exponent)` with `|fraction|` in `[0.5, 1)` and
/// `value == fraction * 2^exponent`. Requires a finite non-zero input.
fn frexp(value: f64) -> (f64, i32) {
    let bits = value.to_bits();
    let biased = ((bits & F64_EXPONENT_MASK) >> 52) as i32;

    if biased == 0 {
        // subnormal: scale into the normal range first
        let (fraction, exponent) = frexp(value * 2f64.powi(54));
        return (fraction, exponent - 54);
    }

    let fraction = f64::from_bits((bits & !F64_EXPONENT_MASK) | ((F64_EXPONENT_BIAS as u64) << 52));
    (fraction, biased - F64_EXPONENT_BIAS)
}

/// Number of significant bits in the stored single-precision mantissa,
/// ignoring trailing zeros. Zero when the mantissa field is empty.
pub fn significand_length(value: f32) -> u32 {
    let mantissa = value.to_bits() & F32_MANTISSA_MASK;
    if mantissa == 0 {
        return 0;
    }
    F32_MANTISSA_BITS - mantissa.trailing_zeros()
}
