//! This module and its submodules contain the accumulators: stateful reducers that consume a
//! stream of doubles (or pairs of doubles, for products and distances) and maintain a running
//! result, under different accuracy contracts.
//!
//!   - [`NaiveAccumulator`], [`FloatAccumulator`]: a plain running sum, rounding at every step.
//!   - [`KahanAccumulator`], [`KahanEftAccumulator`]: compensated summation; the error is bounded
//!     independently of the length of the stream, but not zero.
//!   - [`DistilledAccumulator`]: a growable non-overlapping expansion, renormalised on every
//!     add. Exact.
//!   - [`ZhuHayesAccumulator`]: one running two-sum per binary64 exponent, with a correctly
//!     rounded final reduction. Exact, and O(1) amortised per element.
//!
//! "Exact" here means: as long as every intermediate value stays finite, [`double_value`] is the
//! infinitely precise sum of everything added so far, correctly rounded to the nearest double
//! (ties to even). Exact accumulators get exact compound operations (products, squares, L1/L2
//! distances) by decomposing them into a few exact `add`s.
//!
//! None of the accumulators are meant to be shared between threads while being mutated; each is
//! a plain value that exclusively owns its buffers.
//!
//! [`double_value`]: Accumulator::double_value

use crate::UnsupportedOperation;

/// The [`Operation`](capability::Operation) and [`Capabilities`](capability::Capabilities) model,
/// and the [`UnsupportedOperation`] error
pub(crate) mod capability;

/// Exact compound operations, built from EFTs on top of an exact `add`
pub(crate) mod decompose;

/// Naive running sums in binary64 and binary32
mod naive;

/// Compensated (Kahan) summation
mod kahan;

/// Cascading distillation into a floating point expansion
mod distill;

/// Zhu and Hayes' online exact summation
pub(crate) mod zhu_hayes;

pub use capability::{Capabilities, Operation};
pub use naive::{NaiveAccumulator, FloatAccumulator};
pub use kahan::{KahanAccumulator, KahanEftAccumulator};
pub use distill::DistilledAccumulator;
pub use zhu_hayes::{ZhuHayesAccumulator, NACCUMULATORS, NADDS};

/// The common interface of all accumulators.
///
/// Three operations are always available: [`clear`](Self::clear), [`add`](Self::add), and
/// [`add_all`](Self::add_all). Everything else is a *capability*: an implementation declares which
/// ones it supports in [`capabilities`](Self::capabilities), and calling one outside that set
/// returns an [`UnsupportedOperation`] that names the receiver and the operation. Unsupported
/// operations never fall back to some default value.
///
/// All operations mutate in place and return `&mut Self`, so they can be chained:
///
/// ```
/// # use exact_accumulators::*;
/// let mut acc = ZhuHayesAccumulator::new();
/// acc.add(1.0).add(2.0).add(3.0);
/// assert_eq!(acc.double_value(), 6.0);
///
/// acc.clear().add_product(3.0, 0.5)?.add(-1.0);
/// assert_eq!(acc.double_value(), 0.5);
/// # Ok::<(), UnsupportedOperation>(())
/// ```
///
/// Bulk operations fold their elements in input order, one at a time; for accumulators that are
/// not exact, the order matters, and it is never rearranged.
pub trait Accumulator {
  /// The operations this accumulator implements.
  fn capabilities(&self) -> Capabilities;

  /// Whether [`double_value`](Self::double_value) is the correctly rounded exact result of every
  /// supported operation (while all intermediate values are finite).
  fn is_exact(&self) -> bool;

  /// Whether the accumulator is guaranteed never to overflow. None of the floating point
  /// accumulators in this crate are.
  fn no_overflow(&self) -> bool {
    false
  }

  /// Reset to the additive identity. Buffers keep their capacity.
  fn clear(&mut self) -> &mut Self;

  /// Add `z` to the running result.
  fn add(&mut self, z: f64) -> &mut Self;

  /// Add every element of `z`, in order.
  fn add_all(&mut self, z: &[f64]) -> &mut Self {
    for &z in z {
      self.add(z);
    }
    self
  }

  /// Add `x²`.
  fn add2(&mut self, x: f64) -> Result<&mut Self, UnsupportedOperation> {
    let _ = x;
    Err(unsupported::<Self>(Operation::Add2))
  }

  /// Add `a × b`.
  fn add_product(&mut self, a: f64, b: f64) -> Result<&mut Self, UnsupportedOperation> {
    let _ = (a, b);
    Err(unsupported::<Self>(Operation::AddProduct))
  }

  /// Add `a[i] × b[i]` for every `i`, in order (i.e. a dot product).
  ///
  /// # Panics
  ///
  /// If `a` and `b` have different lengths.
  fn add_products(&mut self, a: &[f64], b: &[f64]) -> Result<&mut Self, UnsupportedOperation> {
    check::<Self>(self, Operation::AddProducts)?;
    assert_eq!(a.len(), b.len(), "add_products: mismatched lengths");
    for (&a, &b) in a.iter().zip(b) {
      self.add_product(a, b)?;
    }
    Ok(self)
  }

  /// Add `|x|`.
  fn add_abs(&mut self, x: f64) -> Result<&mut Self, UnsupportedOperation> {
    let _ = x;
    Err(unsupported::<Self>(Operation::AddAbs))
  }

  /// Add `|a - b|`.
  fn add_l1(&mut self, a: f64, b: f64) -> Result<&mut Self, UnsupportedOperation> {
    let _ = (a, b);
    Err(unsupported::<Self>(Operation::AddL1))
  }

  /// Add `(a - b)²`.
  fn add_l2(&mut self, a: f64, b: f64) -> Result<&mut Self, UnsupportedOperation> {
    let _ = (a, b);
    Err(unsupported::<Self>(Operation::AddL2))
  }

  /// Add `|a[i] - b[i]|` for every `i`, in order.
  ///
  /// # Panics
  ///
  /// If `a` and `b` have different lengths.
  fn add_l1_distance(&mut self, a: &[f64], b: &[f64]) -> Result<&mut Self, UnsupportedOperation> {
    check::<Self>(self, Operation::AddL1Distance)?;
    assert_eq!(a.len(), b.len(), "add_l1_distance: mismatched lengths");
    for (&a, &b) in a.iter().zip(b) {
      self.add_l1(a, b)?;
    }
    Ok(self)
  }

  /// Add `(a[i] - b[i])²` for every `i`, in order.
  ///
  /// # Panics
  ///
  /// If `a` and `b` have different lengths.
  fn add_l2_distance(&mut self, a: &[f64], b: &[f64]) -> Result<&mut Self, UnsupportedOperation> {
    check::<Self>(self, Operation::AddL2Distance)?;
    assert_eq!(a.len(), b.len(), "add_l2_distance: mismatched lengths");
    for (&a, &b) in a.iter().zip(b) {
      self.add_l2(a, b)?;
    }
    Ok(self)
  }

  /// The current result, as a double.
  fn double_value(&self) -> f64;

  /// The current result, as a float. Unless overridden, this is the double result rounded again.
  fn float_value(&self) -> f32 {
    self.double_value() as f32
  }
}

/// Aux function: the error for calling `op` on an `A`.
pub(crate) fn unsupported<A: ?Sized>(op: Operation) -> UnsupportedOperation {
  UnsupportedOperation { receiver: core::any::type_name::<A>(), operation: op }
}

/// Aux function: `Ok` iff `op` is in the capabilities of `acc`.
pub(crate) fn check<A: Accumulator + ?Sized>(acc: &A, op: Operation) -> Result<(), UnsupportedOperation> {
  if acc.capabilities().contains(op) { Ok(()) } else { Err(unsupported::<A>(op)) }
}
