use super::*;

use crate::eft::{two_sum, round3};

/// An exact accumulator that keeps its value as a *floating point expansion*: a short sequence of
/// doubles, most significant first, whose exact sum is the exact sum of everything added so far.
///
/// Every `add` appends the new term and re-distills the whole expansion, running [`two_sum`]
/// over adjacent pairs from the least to the most significant end, until a whole pass changes
/// nothing. At that fixed point, every adjacent pair `(t[i], t[i+1])` is non-overlapping
/// (`fl(t[i] + t[i+1]) = t[i]`), zeros have sunk to the end (and are dropped), and `t[0]` is the
/// sum rounded to nearest, save for a tie which [`round3`] settles with the sign of `t[2]`.
///
/// For typical data the expansion stays a few terms long (the exponent range of a double can
/// never hold more than ~40 non-overlapping terms), but nothing bounds how many passes a single
/// `add` may take when big terms cancel, so the worst case is O(terms) passes of O(terms) each.
///
/// If the leading term ever becomes infinite or NaN, the accumulator stops refining and only
/// propagates non-finite values, IEEE style, until [`clear`](Accumulator::clear).
///
/// ```
/// # use exact_accumulators::*;
/// let mut acc = DistilledAccumulator::new();
/// acc.add_all(&[1e16, 1.0, -1e16]);
/// assert_eq!(acc.double_value(), 1.0);
/// assert_eq!(acc.terms(), [1.0]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DistilledAccumulator {
  terms: Vec<f64>,
}

impl DistilledAccumulator {
  pub const fn new() -> Self {
    Self { terms: Vec::new() }
  }

  /// An empty accumulator with room for `capacity` terms before growing.
  pub fn with_capacity(capacity: usize) -> Self {
    Self { terms: Vec::with_capacity(capacity) }
  }

  /// The expansion, most significant term first. Its exact sum is the exact value of the
  /// accumulator; it contains no zeros.
  pub fn terms(&self) -> &[f64] {
    &self.terms
  }

  /// Whether the leading term has overflowed (or some NaN has been added).
  #[inline]
  fn is_non_finite(&self) -> bool {
    self.terms.first().is_some_and(|t| !t.is_finite())
  }

  /// Append `z`, growing the buffer by half its size when full.
  #[inline]
  fn push(&mut self, z: f64) {
    let capacity = self.terms.capacity();
    if self.terms.len() == capacity {
      self.terms.reserve_exact(capacity / 2 + 1);
    }
    self.terms.push(z);
  }

  /// Give up on exactness, and keep only the IEEE result of adding `z` to the leading term.
  #[cold]
  fn overflow(&mut self, z: f64) {
    let lead = self.terms.first().copied().unwrap_or(0.0) + z;
    if !self.is_non_finite() {
      tracing::debug!(lead, "distilled accumulator is no longer finite");
    }
    self.terms.clear();
    self.terms.push(lead);
  }

  /// Run [`two_sum`] passes over adjacent terms until none changes anything, then drop the
  /// trailing zeros.
  fn distill(&mut self) {
    let terms = &mut self.terms;
    loop {
      let mut changed = false;
      for i in (1 .. terms.len()).rev() {
        let (s, e) = two_sum(terms[i - 1], terms[i]);
        if !s.is_finite() {
          terms.clear();
          return self.overflow(s)
        }
        // `!=` rather than comparing bits: a -0.0 turning into 0.0 is not progress.
        if s != terms[i - 1] || e != terms[i] {
          terms[i - 1] = s;
          terms[i] = e;
          changed = true;
        }
      }
      if !changed { break }
    }
    self.compact();
  }

  /// Drop the trailing exact zeros. After a distillation pass, zeros can only be trailing: a
  /// zero followed by `x ≠ 0` would have been swapped by [`two_sum`].
  fn compact(&mut self) {
    let len = self.terms.iter().rposition(|&t| t != 0.0).map_or(0, |i| i + 1);
    self.terms.truncate(len);
  }
}

impl Accumulator for DistilledAccumulator {
  fn capabilities(&self) -> Capabilities {
    Capabilities::ALL
  }

  fn is_exact(&self) -> bool {
    true
  }

  fn clear(&mut self) -> &mut Self {
    self.terms.clear();
    self
  }

  fn add(&mut self, z: f64) -> &mut Self {
    if self.is_non_finite() || !z.is_finite() {
      self.overflow(z);
      return self
    }
    if z != 0.0 {
      self.push(z);
      self.distill();
    }
    self
  }

  decompose::exact_operations!{}

  fn double_value(&self) -> f64 {
    match *self.terms.as_slice() {
      [] => 0.0,
      [t0] => t0,
      [t0, t1] => t0 + t1,
      [t0, t1, t2, ..] => round3(t0, t1, t2),
    }
  }
}
