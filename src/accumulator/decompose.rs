//! Compound operations (squares, products, absolute differences, squared differences) expressed
//! as a handful of calls to `add`, using the error-free transformations in [`crate::eft`].
//!
//! Each operation here turns its exact mathematical value into a short sum of doubles *without
//! any rounding*, and feeds the terms one at a time to [`Accumulator::add`]. Therefore, if `add`
//! is exact, so is the compound operation; if `add` is merely compensated, the compound operation
//! carries the same bounded error as `add` and nothing more.
//!
//! Concrete accumulators opt in with [`exact_operations!`], which expands to the corresponding
//! [`Accumulator`] methods.

use crate::Accumulator;
use crate::eft::{two_sum, two_product};

/// `x²` as `p + e`.
#[inline]
pub(crate) fn add2<A: Accumulator + ?Sized>(acc: &mut A, x: f64) {
  let (p, e) = two_product(x, x);
  acc.add(p).add(e);
}

/// `a × b` as `p + e`.
#[inline]
pub(crate) fn add_product<A: Accumulator + ?Sized>(acc: &mut A, a: f64, b: f64) {
  let (p, e) = two_product(a, b);
  acc.add(p).add(e);
}

#[inline]
pub(crate) fn add_abs<A: Accumulator + ?Sized>(acc: &mut A, x: f64) {
  acc.add(x.abs());
}

/// The pair `(hi, lo)`, with `hi + lo = |a - b|` exactly, non-overlapping, and `hi ≥ 0`.
///
/// `a - b` is first split into `s + e` by [`two_sum`], and the pair is then negated as a whole if
/// it represents a negative number. Which one is negative is decided by the leading term: the
/// trailing one is at most half an ulp of it, so it can only decide the sign when `s` is zero,
/// and then `e` is zero too. Zeros come out as `+0.0`.
#[inline]
pub(crate) fn l1_pair(a: f64, b: f64) -> (f64, f64) {
  let (s, e) = two_sum(a, -b);
  let keep =
    if s >= 0.0 {
      e >= 0.0 || e.abs() <= s.abs()
    } else {
      !(e <= 0.0 || e.abs() <= s.abs())
    };
  let (s, e) = if keep { (s, e) } else { (-s, -e) };
  // -0 + 0 = +0, and nonzero values are unchanged
  (s + 0.0, e + 0.0)
}

/// `|a - b|` as the two terms of [`l1_pair`].
#[inline]
pub(crate) fn add_l1<A: Accumulator + ?Sized>(acc: &mut A, a: f64, b: f64) {
  let (s, e) = l1_pair(a, b);
  acc.add(s).add(e);
}

/// `(a - b)²` as 8 terms: with `a - b = s + e`, expand `(s + e)² = s² + 2·s·e + e²`, and split
/// each product with [`two_product`] (the cross term `s·e` is added twice).
#[inline]
pub(crate) fn add_l2<A: Accumulator + ?Sized>(acc: &mut A, a: f64, b: f64) {
  let (s, e) = two_sum(a, -b);
  let (ss, ss_err) = two_product(s, s);
  let (se, se_err) = two_product(s, e);
  let (ee, ee_err) = two_product(e, e);
  acc
    .add(ss).add(ss_err)
    .add(se).add(se_err)
    .add(se).add(se_err)
    .add(ee).add(ee_err);
}

/// Expands to the [`Accumulator`] methods `add2`, `add_product`, `add_abs`, `add_l1`, `add_l2`,
/// implemented by decomposition into `add`s. Use inside an `impl Accumulator for …` block, and
/// declare [`Capabilities::ALL`](crate::Capabilities::ALL).
macro_rules! exact_operations {
  () => {
    fn add2(&mut self, x: f64) -> Result<&mut Self, $crate::UnsupportedOperation> {
      $crate::accumulator::decompose::add2(self, x);
      Ok(self)
    }

    fn add_product(&mut self, a: f64, b: f64) -> Result<&mut Self, $crate::UnsupportedOperation> {
      $crate::accumulator::decompose::add_product(self, a, b);
      Ok(self)
    }

    fn add_abs(&mut self, x: f64) -> Result<&mut Self, $crate::UnsupportedOperation> {
      $crate::accumulator::decompose::add_abs(self, x);
      Ok(self)
    }

    fn add_l1(&mut self, a: f64, b: f64) -> Result<&mut Self, $crate::UnsupportedOperation> {
      $crate::accumulator::decompose::add_l1(self, a, b);
      Ok(self)
    }

    fn add_l2(&mut self, a: f64, b: f64) -> Result<&mut Self, $crate::UnsupportedOperation> {
      $crate::accumulator::decompose::add_l2(self, a, b);
      Ok(self)
    }
  };
}

pub(crate) use exact_operations;

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{Capabilities, NaiveAccumulator, DistilledAccumulator, ZhuHayesAccumulator};
  use crate::test::{Exact, RationalAccumulator, factor, factors};
  use proptest::prelude::*;

  /// Records the terms it is given, in order.
  #[derive(Default)]
  struct Recorder(Vec<f64>);

  impl Accumulator for Recorder {
    fn capabilities(&self) -> Capabilities { Capabilities::ALL }
    fn is_exact(&self) -> bool { false }
    fn clear(&mut self) -> &mut Self { self.0.clear(); self }
    fn add(&mut self, z: f64) -> &mut Self { self.0.push(z); self }
    fn double_value(&self) -> f64 { self.0.iter().sum() }
    exact_operations!{}
  }

  #[test]
  fn term_counts() {
    let mut rec = Recorder::default();
    rec.add2(3.0).unwrap();
    assert_eq!(rec.0, [9.0, 0.0]);
    rec.clear().add_product(0.1, 3.0).unwrap();
    assert_eq!(rec.0.len(), 2);
    rec.clear().add_abs(-2.5).unwrap();
    assert_eq!(rec.0, [2.5]);
    rec.clear().add_l1(1.0, 4.0).unwrap();
    assert_eq!(rec.0, [3.0, 0.0]);
    rec.clear().add_l2(1.0, 4.0).unwrap();
    assert_eq!(rec.0, [9.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
  }

  #[test]
  fn l1_pair_sign() {
    assert_eq!(l1_pair(1.0, 4.0), (3.0, 0.0));
    assert_eq!(l1_pair(4.0, 1.0), (3.0, 0.0));
    assert_eq!(l1_pair(1e16, -1.0), (1e16, 1.0));
    assert_eq!(l1_pair(-1.0, 1e16), (1e16, 1.0));
    assert_eq!(l1_pair(-1e16, 1.0), (1e16, 1.0));
    // 1e16 + 3 lies halfway between 1e16 + 2 and 1e16 + 4; it rounds to the even one, 1e16 + 4
    assert_eq!(l1_pair(1e16, -3.0), (1e16 + 4.0, -1.0));
    assert_eq!(l1_pair(-3.0, 1e16), (1e16 + 4.0, -1.0));
  }

  #[test]
  fn l1_pair_zero() {
    let (s, e) = l1_pair(2.5, 2.5);
    assert!(s == 0.0 && s.is_sign_positive());
    assert!(e == 0.0 && e.is_sign_positive());
    for (a, b) in [(-0.0, 0.0), (0.0, -0.0), (-0.0, -0.0), (-1.5, -1.5)] {
      let (s, e) = l1_pair(a, b);
      assert!(s == 0.0 && s.is_sign_positive(), "{a} {b}: {s:?}");
      assert!(e == 0.0 && e.is_sign_positive(), "{a} {b}: {e:?}");
    }
    // A negated pair with an exact trailing zero
    let (s, e) = l1_pair(1.0, 4.0);
    assert!(s == 3.0 && e.is_sign_positive());
  }

  #[test]
  fn l2_cancellation() {
    // 1e16 + 2 - (-1) is not a double, so neither is its square
    let mut acc = ZhuHayesAccumulator::new();
    acc.add_l2(1e16 + 2.0, -1.0).unwrap();
    let exact = Exact::new().add_square_diff(1e16 + 2.0, -1.0);
    assert_eq!(acc.double_value(), exact.to_f64());
    let mut naive = NaiveAccumulator::new();
    naive.add_l2(1e16 + 2.0, -1.0).unwrap();
    assert_ne!(naive.double_value(), exact.to_f64());
  }

  proptest!{
    #![proptest_config(ProptestConfig::with_cases(crate::PROPTEST_CASES))]

    #[test]
    fn l1_pair_is_exact(a in factor(), b in factor()) {
      let (s, e) = l1_pair(a, b);
      prop_assert!(s >= 0.0);
      prop_assert!(e.abs() <= crate::half_ulp(s));
      prop_assert_eq!(Exact::new().add(s).add(e), Exact::new().add_abs_diff(a, b));
    }

    #[test]
    fn l1_symmetric(a in factor(), b in factor()) {
      prop_assert_eq!(l1_pair(a, b), l1_pair(b, a));
      let mut ab = DistilledAccumulator::new();
      let mut ba = DistilledAccumulator::new();
      ab.add_l1(a, b).unwrap();
      ba.add_l1(b, a).unwrap();
      prop_assert_eq!(ab.double_value(), ba.double_value());
    }

    #[test]
    fn products_match_oracle((a, b) in factors(1 .. 64)) {
      let mut distilled = DistilledAccumulator::new();
      let mut zhu_hayes = ZhuHayesAccumulator::new();
      let mut oracle = RationalAccumulator::default();
      distilled.add_products(&a, &b).unwrap();
      zhu_hayes.add_products(&a, &b).unwrap();
      oracle.add_products(&a, &b).unwrap();
      prop_assert_eq!(distilled.double_value(), oracle.double_value());
      prop_assert_eq!(zhu_hayes.double_value(), oracle.double_value());
    }

    #[test]
    fn squares_match_oracle(x in prop::collection::vec(factor(), 1 .. 64)) {
      let mut distilled = DistilledAccumulator::new();
      let mut zhu_hayes = ZhuHayesAccumulator::new();
      let mut oracle = RationalAccumulator::default();
      for &x in &x {
        distilled.add2(x).unwrap();
        zhu_hayes.add2(x).unwrap();
        oracle.add2(x).unwrap();
      }
      prop_assert_eq!(distilled.double_value(), oracle.double_value());
      prop_assert_eq!(zhu_hayes.double_value(), oracle.double_value());
    }

    #[test]
    fn distances_match_oracle((a, b) in factors(1 .. 64)) {
      let mut distilled = DistilledAccumulator::new();
      let mut zhu_hayes = ZhuHayesAccumulator::new();
      let mut oracle = RationalAccumulator::default();
      distilled.add_l1_distance(&a, &b).unwrap();
      zhu_hayes.add_l1_distance(&a, &b).unwrap();
      oracle.add_l1_distance(&a, &b).unwrap();
      prop_assert_eq!(distilled.double_value(), oracle.double_value());
      prop_assert_eq!(zhu_hayes.double_value(), oracle.double_value());

      distilled.clear().add_l2_distance(&a, &b).unwrap();
      zhu_hayes.clear().add_l2_distance(&a, &b).unwrap();
      oracle.clear().add_l2_distance(&a, &b).unwrap();
      prop_assert_eq!(distilled.double_value(), oracle.double_value());
      prop_assert_eq!(zhu_hayes.double_value(), oracle.double_value());
    }
  }

  /// The decomposition equivalence property: `add_product` then `double_value` is `a × b`
  /// correctly rounded, for a few thousand single products.
  #[test]
  fn single_product_is_correctly_rounded() {
    use proptest::test_runner::{Config, TestRunner};
    let mut runner = TestRunner::new(Config::with_cases(2000));
    runner.run(&(factor(), factor()), |(a, b)| {
      let expected = Exact::new().add_product(a, b).to_f64();
      let mut distilled = DistilledAccumulator::new();
      let mut zhu_hayes = ZhuHayesAccumulator::new();
      distilled.add_product(a, b).unwrap();
      zhu_hayes.add_product(a, b).unwrap();
      prop_assert_eq!(distilled.double_value(), expected);
      prop_assert_eq!(zhu_hayes.double_value(), expected);
      Ok(())
    }).unwrap();
  }
}
