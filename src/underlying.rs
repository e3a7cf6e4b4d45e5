//! This module contains the bit-level views of an IEEE-754 binary64 that the accumulators need:
//! extracting the raw exponent field of a double, and measuring one unit in the last place. They are
//! hidden from the end-user except for the few that appear in the public API ([`biased_exponent`],
//! [`ulp`], [`half_ulp`]).
//!
//! Reminder of the binary64 layout, msb to lsb:
//!
//! ```text
//! s|eeeeeeeeeee|ffff…ffff
//! 1     11         52
//! ```
//!
//! An exponent field of `0` marks zero or a subnormal (no hidden bit, scale `2^-1074`), an
//! exponent field of `0x7ff` marks an infinity or a NaN.

/// Width of the stored significand field.
pub(crate) const SIGNIFICAND_BITS: u32 = f64::MANTISSA_DIGITS - 1;

/// Width of the exponent field.
pub(crate) const EXPONENT_BITS: u32 = 11;

/// Mask of the exponent field, once shifted down by [`SIGNIFICAND_BITS`].
pub(crate) const EXPONENT_MASK: u64 = (1 << EXPONENT_BITS) - 1;

/// The number of distinct values of the biased exponent field of an [`f64`] (= 2¹¹).
pub const EXPONENTS: usize = 1 << EXPONENT_BITS;

/// The *raw* biased exponent field of `x`, i.e. bits 52 to 62.
///
/// This is `0` for zeros and subnormals, and `0x7ff` for infinities and NaNs; it is always less
/// than [`EXPONENTS`].
///
/// ```
/// # use exact_accumulators::biased_exponent;
/// assert_eq!(biased_exponent(1.0), 1023);
/// assert_eq!(biased_exponent(-2.0), 1024);
/// assert_eq!(biased_exponent(f64::MIN_POSITIVE / 2.0), 0);
/// ```
#[inline]
pub const fn biased_exponent(x: f64) -> usize {
  ((x.to_bits() >> SIGNIFICAND_BITS) & EXPONENT_MASK) as usize
}

/// The unit in the last place of `x`: the gap between `|x|` and the next double away from zero,
/// or, for the largest finite exponent, the gap that *would* be there.
///
/// Infinities have an infinite ulp, NaNs have a NaN ulp.
///
/// ```
/// # use exact_accumulators::ulp;
/// assert_eq!(ulp(1.0), f64::EPSILON);
/// assert_eq!(ulp(-1.0), f64::EPSILON);
/// assert_eq!(ulp(0.0), f64::from_bits(1));
/// ```
#[inline]
pub const fn ulp(x: f64) -> f64 {
  let exp = biased_exponent(x) as u64;
  if exp == EXPONENT_MASK {
    return if x.is_nan() { x } else { f64::INFINITY }
  }
  // Normal numbers with exponent field `exp` have an ulp of 2^(exp - 1075). Once that drops
  // below the smallest normal, it has to be written as a subnormal bit pattern instead, and the
  // subnormals themselves share the ulp of exponent 1.
  if exp > SIGNIFICAND_BITS as u64 {
    f64::from_bits((exp - SIGNIFICAND_BITS as u64) << SIGNIFICAND_BITS)
  } else if exp == 0 {
    f64::from_bits(1)
  } else {
    f64::from_bits(1 << (exp - 1))
  }
}

/// Half of [`ulp`]`(x)`.
///
/// Note that for zeros and subnormals this rounds (ties to even) to `0.0`, since half of the
/// smallest subnormal is not representable.
#[inline]
pub const fn half_ulp(x: f64) -> f64 {
  ulp(x) * 0.5
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fields() {
    assert_eq!(biased_exponent(0.0), 0);
    assert_eq!(biased_exponent(-0.0), 0);
    assert_eq!(biased_exponent(f64::from_bits(1)), 0);
    assert_eq!(biased_exponent(f64::MIN_POSITIVE), 1);
    assert_eq!(biased_exponent(1.0), 1023);
    assert_eq!(biased_exponent(1.5), 1023);
    assert_eq!(biased_exponent(f64::MAX), 2046);
    assert_eq!(biased_exponent(f64::INFINITY), 2047);
    assert_eq!(biased_exponent(f64::NAN), 2047);
  }

  #[test]
  fn ulp_normal() {
    assert_eq!(ulp(1.0), f64::EPSILON);
    assert_eq!(ulp(1.9999), f64::EPSILON);
    assert_eq!(ulp(2.0), 2.0 * f64::EPSILON);
    assert_eq!(ulp(1e16), 2.0);
    assert_eq!(ulp(-1e16), 2.0);
    assert_eq!(ulp(f64::MAX), 2f64.powi(971));
  }

  #[test]
  fn ulp_small() {
    let tiny = f64::from_bits(1);
    assert_eq!(ulp(0.0), tiny);
    assert_eq!(ulp(tiny), tiny);
    assert_eq!(ulp(f64::MIN_POSITIVE), tiny);
    assert_eq!(ulp(f64::MIN_POSITIVE * 2.0), tiny * 2.0);
    // 2^-1022 * 2^52 = 2^-970, the first binade whose ulp is a normal number
    assert_eq!(ulp(2f64.powi(-970)), f64::MIN_POSITIVE);
    assert_eq!(ulp(2f64.powi(-971)), f64::MIN_POSITIVE / 2.0);
  }

  #[test]
  fn ulp_special() {
    assert_eq!(ulp(f64::INFINITY), f64::INFINITY);
    assert_eq!(ulp(f64::NEG_INFINITY), f64::INFINITY);
    assert!(ulp(f64::NAN).is_nan());
  }

  #[test]
  fn ulp_is_gap_to_next() {
    for x in [1.0, 3.0, 1e-300, 7.5e200, 0.1, 123456.789, f64::MIN_POSITIVE * 3.0] {
      assert_eq!(ulp(x), x.next_up() - x, "{x:e}");
      assert_eq!(ulp(-x), x.next_up() - x, "{x:e}");
    }
  }

  #[test]
  fn half_ulp_rounds_to_zero_below_normals() {
    assert_eq!(half_ulp(1.0), f64::EPSILON / 2.0);
    assert_eq!(half_ulp(0.0), 0.0);
    assert_eq!(half_ulp(f64::from_bits(7)), 0.0);
    assert_eq!(half_ulp(f64::MIN_POSITIVE * 2.0), f64::from_bits(1));
  }
}
