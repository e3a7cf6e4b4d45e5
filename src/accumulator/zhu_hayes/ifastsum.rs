//! Correctly rounded sum of a slice of doubles: the *iFastSum* reduction of Zhu and Hayes.
//!
//! The input is collapsed repeatedly with [`two_sum`], each pass moving the bulk of the value
//! into a running sum `s` and leaving only the (non-zero) rounding errors behind, until a bound on
//! what remains is too small to move `s` by half an ulp. Ties, and cases where the bound is not
//! tight enough to decide, are settled by recursing on the residuals.

use crate::eft::{two_sum, round3};
use crate::underlying::half_ulp;

/// The exact sum of `x`, rounded to nearest (ties to even).
///
/// On return `x` holds garbage (the residuals of the reduction). The order of `x` does not matter:
/// the first pass alternates signs, so its running sum stays within the largest element until
/// one sign runs out. So the result is exact as long as the sum itself, plus the rounding errors
/// of that pass, stays finite.
pub fn ifastsum(x: &mut Vec<f64>) -> f64 {
  if x.is_empty() {
    return 0.0
  }
  let s = collapse_balanced(x);
  reduce(x, s, false)
}

/// Replace `x` by the rounding errors of summing it with [`two_sum`], and return the sum.
fn collapse(x: &mut [f64]) -> f64 {
  let mut s = 0.0;
  for xi in x.iter_mut() {
    (s, *xi) = two_sum(s, *xi);
  }
  s
}

/// As [`collapse`], but taking the elements in an order that moves the running sum back towards
/// zero whenever possible: a negative one next if it is non-negative, a positive one otherwise.
fn collapse_balanced(x: &mut [f64]) -> f64 {
  let (positive, negative): (Vec<f64>, Vec<f64>) = x.iter().partition(|&&x| x >= 0.0);
  let (mut positive, mut negative) = (positive.into_iter(), negative.into_iter());
  let mut s = 0.0;
  for xi in x.iter_mut() {
    let next =
      if s >= 0.0 { negative.next().or_else(|| positive.next()) }
      else { positive.next().or_else(|| negative.next()) };
    let Some(y) = next else { break };
    (s, *xi) = two_sum(s, y);
  }
  s
}

/// A nested level of the reduction, on the residuals left by the one above.
fn refine(x: &mut Vec<f64>) -> f64 {
  let s = collapse(x);
  reduce(x, s, true)
}

/// One level of the reduction, after the first pass left `s` and its residuals in `x`. On
/// return, `x` holds residuals whose exact sum is the exact sum of `x` on entry plus `s` minus
/// the return value; `nested` calls return as soon as the result is a faithful approximation,
/// the outermost one settles the rounding.
fn reduce(x: &mut Vec<f64>, mut s: f64, nested: bool) -> f64 {
  loop {
    if !s.is_finite() {
      return s
    }
    let mut count = 0;
    let mut st = 0.0;
    let mut sm = 0.0f64;
    for i in 0 .. x.len() {
      let (t, b) = two_sum(st, x[i]);
      st = t;
      if b != 0.0 {
        x[count] = b;
        count += 1;
        sm = sm.max(st.abs());
      }
    }

    // Bound on the magnitude of the residuals left in `x[.. count]`, plus `w` below.
    let em = (count + 1) as f64 * half_ulp(sm);
    let (t, w) = two_sum(s, st);
    s = t;
    x.truncate(count);
    x.push(w);

    if em == 0.0 || em < half_ulp(s) {
      if nested {
        return s
      }
      // `s` is within an ulp, but is it the nearest? Move `w` by the bound both ways.
      let (w1, e1) = two_sum(w, em);
      let (w2, e2) = two_sum(w, -em);
      if w1 + s != s || w2 + s != s || round3(s, w1, e1) != s || round3(s, w2, e2) != s {
        let (t, s1) = two_sum(s, refine(x));
        let s2 = refine(x);
        s = round3(t, s1, s2);
      }
      return s
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test::{Exact, stream, cancelling};
  use proptest::prelude::*;

  fn sum(x: &[f64]) -> f64 {
    ifastsum(&mut x.to_vec())
  }

  #[test]
  fn trivial() {
    assert_eq!(sum(&[]), 0.0);
    assert_eq!(sum(&[0.0]), 0.0);
    assert_eq!(sum(&[-2.5]), -2.5);
    assert_eq!(sum(&[1.0, 2.0, 3.0]), 6.0);
  }

  #[test]
  fn cancellation() {
    assert_eq!(sum(&[1e16, 1.0, -1e16]), 1.0);
    assert_eq!(sum(&[1e100, 1.0, -1e100, 1e-100]), 1.0);
    assert_eq!(sum(&[0.1; 10]), 1.0);
  }

  #[test]
  fn ties() {
    let h = 2f64.powi(-53);
    let t = 2f64.powi(-106);
    assert_eq!(sum(&[1.0, h, t]), 1.0 + f64::EPSILON);
    assert_eq!(sum(&[1.0, h, -t]), 1.0);
    assert_eq!(sum(&[t, h, 1.0]), 1.0 + f64::EPSILON);
    assert_eq!(sum(&[1.0, h]), 1.0);
    // 1 + 3·2^-53 is a tie between 1 + 2^-52 and 1 + 2^-51: to even
    assert_eq!(sum(&[1.0, h, h, h]), 1.0 + 2.0 * f64::EPSILON);
  }

  #[test]
  fn residuals_account_for_the_rest() {
    let mut x = vec![1.0, 2f64.powi(-60), 3.0, -2f64.powi(-70)];
    let exact = x.iter().fold(Exact::new(), |e, &x| e.add(x));
    let s = refine(&mut x);
    let rest = x.iter().fold(Exact::new(), |e, &x| e.add(x));
    assert_eq!(rest.add(s), exact);
  }

  #[test]
  fn no_spurious_overflow() {
    let max = f64::MAX;
    assert_eq!(sum(&[max, max, -max]), max);
    assert_eq!(sum(&[max, max, -max, -max, 1.0]), 1.0);
    assert_eq!(sum(&[-max, -max, 0.5, max, max]), 0.5);
    // Overflows only because the sum itself does
    assert_eq!(sum(&[max, max]), f64::INFINITY);
    assert!(sum(&[f64::INFINITY, -max, f64::NEG_INFINITY]).is_nan());
  }

  proptest!{
    #![proptest_config(ProptestConfig::with_cases(crate::PROPTEST_CASES))]

    #[test]
    fn matches_oracle(x in stream(0 .. 500)) {
      let exact = x.iter().fold(Exact::new(), |e, &x| e.add(x));
      prop_assert_eq!(sum(&x), exact.to_f64());
    }

    #[test]
    fn cancellation_matches_oracle(x in cancelling(1 .. 200)) {
      let exact = x.iter().fold(Exact::new(), |e, &x| e.add(x));
      prop_assert_eq!(sum(&x), exact.to_f64());
    }
  }
}
