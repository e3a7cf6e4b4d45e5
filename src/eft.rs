//! Error-free transformations: operations that return the rounded result of an addition or a
//! multiplication, *together with* the exact rounding error committed, as a second double.
//!
//! For finite inputs whose result does not overflow, each pair `(hi, lo)` returned here satisfies
//! `hi + lo == exact result` in infinite precision, with `hi` the round-to-nearest-even result
//! and `|lo| ≤ ulp(hi) / 2`. If `hi` is not finite, `lo` is meaningless (typically NaN).
//!
//! All of these are pure, branch-free, and never allocate; they only rely on the host performing
//! IEEE-754 binary64 arithmetic in round-to-nearest-even, which Rust guarantees.

/// Knuth's *two-sum*: `(s, e)` with `s = fl(a + b)` and `s + e = a + b` exactly, for any ordering
/// of `|a|` and `|b|`.
///
/// ```
/// # use exact_accumulators::two_sum;
/// assert_eq!(two_sum(1e16, 1.0), (1e16, 1.0));
/// assert_eq!(two_sum(1.0, 2.0), (3.0, 0.0));
/// ```
#[inline]
pub fn two_sum(a: f64, b: f64) -> (f64, f64) {
  let s = a + b;
  let z = s - a;
  let e = (a - (s - z)) + (b - z);
  (s, e)
}

/// Dekker's *fast two-sum*: as [`two_sum`], in 3 operations instead of 6, but only valid if
/// `|a| ≥ |b|` (or `a` is zero).
#[inline]
pub fn fast_two_sum(a: f64, b: f64) -> (f64, f64) {
  debug_assert!(!(a.abs() < b.abs()) || a == 0.0, "fast_two_sum needs |a| ≥ |b|: {a:e}, {b:e}");
  let s = a + b;
  let e = b - (s - a);
  (s, e)
}

/// *Two-product*: `(p, e)` with `p = fl(a × b)` and `p + e = a × b` exactly.
///
/// The error is obtained with a single fused multiply-add, which computes `a × b - p` with only
/// one rounding (and that rounding is exact, since the difference is representable). The result
/// is exact as long as `a × b` neither overflows nor underflows below the subnormal range.
///
/// ```
/// # use exact_accumulators::two_product;
/// let x = 1.0 + f64::EPSILON;
/// assert_eq!(two_product(x, x), (1.0 + 2.0 * f64::EPSILON, f64::EPSILON * f64::EPSILON));
/// ```
#[inline]
pub fn two_product(a: f64, b: f64) -> (f64, f64) {
  let p = a * b;
  let e = a.mul_add(b, -p);
  (p, e)
}

/// Correctly round a value known as three parts, `s0 + s1 + rest`, where:
///
///   - `s0 = fl(s0 + s1)` (`s1` is no more than half a gap away from `s0`), and
///   - `s2` carries the *sign* of `rest`, which is tiny compared to `s1` (or zero).
///
/// Then `s0` is already the correctly rounded value, *except* if `s1` is exactly half the gap to
/// the neighbour of `s0` in its direction (a tie, which `fl` broke towards `s0` because it was
/// even) and the rest pushes past that midpoint. In that case, the answer is the neighbour.
///
/// The tie check does not compare `s1` against [`half_ulp`](crate::half_ulp)`(s0)`, because the
/// gap below a power of two is half the gap above it. Instead: `s0 + 2·s1` is exactly
/// representable iff `2·s1` is a whole gap.
#[inline]
pub fn round3(s0: f64, s1: f64, s2: f64) -> f64 {
  if s1 == 0.0 || s2 == 0.0 || (s1 > 0.0) != (s2 > 0.0) {
    return s0
  }
  let (neighbour, err) = two_sum(s0, 2.0 * s1);
  if err == 0.0 && neighbour != s0 { neighbour } else { s0 }
}
