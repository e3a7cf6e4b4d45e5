use super::*;

use crate::eft::two_sum;
use crate::underlying::{biased_exponent, EXPONENTS};

mod ifastsum;
pub(crate) use ifastsum::ifastsum;

/// The number of buckets: one per biased exponent of a double.
pub const NACCUMULATORS: usize = EXPONENTS;

/// The most increments the buckets may absorb before they are compacted.
///
/// Every value added to bucket `j` has biased exponent `j`, hence is a multiple of the same
/// power of two `q` and less than `2^53·q` in magnitude. After `k` additions the bucket sum is
/// less than `k·2^53·q`, its rounding error is at most `k·2^52·q·2^-53`, and the sum of all
/// those errors, `e[j]`, stays a multiple of `q` below `k²/2·q`. Keeping `k ≤ 2^26` means `e[j]`
/// fits in 53 bits, so accumulating it never rounds.
pub const NADDS: usize = 1 << 26;

/// Exact online summation after Zhu and Hayes (ACM TOMS Algorithm 908, simplified).
///
/// Each value is added to the bucket of its own exponent, as a pair `(s[j], e[j])` updated with a
/// single [`two_sum`]: `s[j]` takes the rounded sum and `e[j]` accumulates the rounding errors,
/// which, as long as the bucket has seen fewer than [`NADDS`] values, never round themselves.
/// So each `add` is O(1) with no branches on the data, regardless of how the values cancel.
///
/// Every [`NADDS`] additions the buckets are *compacted*: the (at most `2·NACCUMULATORS`) nonzero
/// values they hold are summed again into a fresh set of buckets, restoring the bound. Querying
/// the value runs the *iFastSum* reduction over the nonzero buckets, which returns the
/// exact sum correctly rounded.
///
/// If a bucket overflows, or a non-finite value is added, the accumulator gives up on exactness
/// and thereafter only keeps the IEEE sum of the non-finite value with whatever else is added,
/// until cleared. Note that this also happens when a single bucket overflows even though the
/// exact sum would be finite, e.g. `f64::MAX + f64::MAX - f64::MAX`.
///
/// The state is four arrays of [`NACCUMULATORS`] doubles (64KiB), allocated once on creation.
///
/// ```
/// # use exact_accumulators::*;
/// let mut acc = ZhuHayesAccumulator::new();
/// acc.add_all(&[1e16, 1.0, -1e16]);
/// assert_eq!(acc.double_value(), 1.0);
/// ```
#[derive(Clone)]
pub struct ZhuHayesAccumulator {
  /// Bucket sums.
  a1: Box<[f64]>,
  /// Bucket errors.
  a2: Box<[f64]>,
  /// Scratch buckets for compaction.
  b1: Box<[f64]>,
  b2: Box<[f64]>,
  /// Increments since the buckets were last compacted (a compaction counts as `2·NACCUMULATORS`).
  i: usize,
  threshold: usize,
  compactions: u64,
  /// Set once exactness is lost; then the running IEEE sum of the non-finite values.
  non_finite: Option<f64>,
}

impl ZhuHayesAccumulator {
  pub fn new() -> Self {
    Self::with_compaction_threshold(NADDS)
  }

  /// An accumulator that compacts every `threshold` increments instead of every [`NADDS`].
  ///
  /// Compacting more often than necessary only costs time; the point is being able to exercise
  /// compactions without adding tens of millions of values.
  ///
  /// # Panics
  ///
  /// If `threshold` is not in `(2·NACCUMULATORS, NADDS]`: above [`NADDS`] the buckets may round,
  /// and at or below `2·NACCUMULATORS` a compaction would trigger another right away.
  pub fn with_compaction_threshold(threshold: usize) -> Self {
    assert!(
      2 * NACCUMULATORS < threshold && threshold <= NADDS,
      "compaction threshold {threshold} not in ({}, {NADDS}]", 2 * NACCUMULATORS,
    );
    let buckets = || vec![0.0; NACCUMULATORS].into_boxed_slice();
    Self {
      a1: buckets(),
      a2: buckets(),
      b1: buckets(),
      b2: buckets(),
      i: 0,
      threshold,
      compactions: 0,
      non_finite: None,
    }
  }

  /// How many times the buckets have been compacted since creation or the last `clear`.
  pub fn compactions(&self) -> u64 {
    self.compactions
  }

  /// Re-sum the contents of the buckets into fresh ones. Happens on its own every so often, but
  /// can be called at any time; it never changes the value.
  pub fn compact(&mut self) -> &mut Self {
    if self.non_finite.is_some() {
      return self
    }
    self.b1.fill(0.0);
    self.b2.fill(0.0);
    let mut pending = self.nonzero();
    let replayed = pending.len();
    // A value that would overflow its bucket has the bucket's sign; retry it once the rest,
    // possibly of the opposite sign, is in.
    while !pending.is_empty() {
      let before = pending.len();
      pending.retain(|&x| increment(&mut self.b1, &mut self.b2, x).is_err());
      if pending.len() == before {
        let x = pending[0];
        return self.overflow(self.b1[biased_exponent(x)] + x)
      }
    }
    core::mem::swap(&mut self.a1, &mut self.b1);
    core::mem::swap(&mut self.a2, &mut self.b2);
    self.i = 2 * NACCUMULATORS;
    self.compactions += 1;
    tracing::debug!(replayed, compactions = self.compactions, "compacted zhu-hayes buckets");
    self
  }

  /// Switch to (or stay in) non-finite mode, folding `z` into the non-finite running sum.
  #[cold]
  fn overflow(&mut self, z: f64) -> &mut Self {
    match &mut self.non_finite {
      Some(value) => *value += z,
      None => {
        tracing::debug!(value = z, "zhu-hayes accumulator is no longer finite");
        self.non_finite = Some(z);
      },
    }
    self
  }

  /// The nonzero contents of the buckets, in increasing order of bucket.
  fn nonzero(&self) -> Vec<f64> {
    self.a1.iter()
      .zip(self.a2.iter())
      .flat_map(|(&s, &e)| [s, e])
      .filter(|&x| x != 0.0)
      .collect()
  }
}

/// Add `x` to the bucket pair of its exponent. Fails with the overflowed bucket sum if it is no
/// longer finite.
#[inline]
fn increment(s: &mut [f64], e: &mut [f64], x: f64) -> Result<(), f64> {
  let j = biased_exponent(x);
  let (sum, carry) = two_sum(s[j], x);
  if !sum.is_finite() {
    return Err(sum)
  }
  s[j] = sum;
  e[j] += carry;
  Ok(())
}

impl Default for ZhuHayesAccumulator {
  fn default() -> Self {
    Self::new()
  }
}

impl core::fmt::Debug for ZhuHayesAccumulator {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    let buckets = self.a1.iter().zip(self.a2.iter()).filter(|&(&s, &e)| s != 0.0 || e != 0.0);
    f.debug_struct("ZhuHayesAccumulator")
      .field("nonzero_buckets", &buckets.count())
      .field("increments", &self.i)
      .field("threshold", &self.threshold)
      .field("compactions", &self.compactions)
      .field("non_finite", &self.non_finite)
      .finish()
  }
}

impl Accumulator for ZhuHayesAccumulator {
  fn capabilities(&self) -> Capabilities {
    Capabilities::ALL
  }

  fn is_exact(&self) -> bool {
    true
  }

  fn clear(&mut self) -> &mut Self {
    self.a1.fill(0.0);
    self.a2.fill(0.0);
    self.i = 0;
    self.compactions = 0;
    self.non_finite = None;
    self
  }

  #[inline]
  fn add(&mut self, x: f64) -> &mut Self {
    if self.non_finite.is_some() || !x.is_finite() {
      return self.overflow(x)
    }
    if let Err(overflow) = increment(&mut self.a1, &mut self.a2, x) {
      return self.overflow(overflow)
    }
    self.i += 1;
    if self.i >= self.threshold {
      self.compact();
    }
    self
  }

  decompose::exact_operations!{}

  fn double_value(&self) -> f64 {
    if let Some(value) = self.non_finite {
      return value
    }
    ifastsum(&mut self.nonzero())
  }
}
