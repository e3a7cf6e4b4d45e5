use super::*;

use crate::eft::fast_two_sum;

/// Compensated summation state: a running sum, plus a running estimate of the low-order part
/// that has been rounded off of it.
///
/// The update is Neumaier's refinement of Kahan's: the rounding error of `sum + y` is recovered
/// with a fast two-sum ordered by magnitude, so it is captured even when the incoming term is
/// larger than the running sum. (Kahan's own recurrence loses the `1.0` in
/// `[1e16, 1.0, -1e16]`, since it folds the compensation into the *next* term before adding.)
#[derive(Debug, Clone, Copy, Default)]
struct Compensated {
  sum: f64,
  comp: f64,
}

impl Compensated {
  const ZERO: Self = Self { sum: 0.0, comp: 0.0 };

  #[inline]
  fn add(&mut self, y: f64) {
    let (sum, err) =
      if self.sum.abs() >= y.abs() { fast_two_sum(self.sum, y) } else { fast_two_sum(y, self.sum) };
    self.comp += err;
    self.sum = sum;
  }

  #[inline]
  fn value(&self) -> f64 {
    self.sum + self.comp
  }
}

/// Compensated (Kahan–Babuška–Neumaier) summation.
///
/// The error of the result is bounded by about `2u·Σ|zᵢ|` plus a rounding of the result itself
/// (`u` being half an ulp of 1), regardless of the number of terms; it is not exact.
///
/// Supports sums and products; a product `a × b` is rounded *before* being compensated, so
/// `add_product` carries the rounding error of the product on top of that of the sum.
///
/// ```
/// # use exact_accumulators::*;
/// let mut acc = KahanAccumulator::new();
/// acc.add_all(&[1e16, 1.0, -1e16]);
/// assert_eq!(acc.double_value(), 1.0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct KahanAccumulator(Compensated);

impl KahanAccumulator {
  pub const fn new() -> Self {
    Self(Compensated::ZERO)
  }
}

impl Accumulator for KahanAccumulator {
  fn capabilities(&self) -> Capabilities {
    Capabilities::BASIC
      .with(Operation::AddProduct)
      .with(Operation::AddProducts)
  }

  fn is_exact(&self) -> bool {
    false
  }

  fn clear(&mut self) -> &mut Self {
    self.0 = Compensated::ZERO;
    self
  }

  #[inline]
  fn add(&mut self, z: f64) -> &mut Self {
    self.0.add(z);
    self
  }

  fn add_product(&mut self, a: f64, b: f64) -> Result<&mut Self, UnsupportedOperation> {
    self.0.add(a * b);
    Ok(self)
  }

  fn double_value(&self) -> f64 {
    self.0.value()
  }
}

/// Compensated summation, where every compound operation is first split *exactly* into doubles
/// (with the error-free transformations), and each of those is then added with compensation.
///
/// Which operations are exact? None, strictly: plain `add` is compensated just like in
/// [`KahanAccumulator`]. But unlike there, `add_product`, `add2`, `add_l1`, and `add_l2` add no
/// error of their own beyond that of the compensated sum, since the products and differences are
/// never rounded.
#[derive(Debug, Clone, Copy, Default)]
pub struct KahanEftAccumulator(Compensated);

impl KahanEftAccumulator {
  pub const fn new() -> Self {
    Self(Compensated::ZERO)
  }
}

impl Accumulator for KahanEftAccumulator {
  fn capabilities(&self) -> Capabilities {
    Capabilities::ALL
  }

  fn is_exact(&self) -> bool {
    false
  }

  fn clear(&mut self) -> &mut Self {
    self.0 = Compensated::ZERO;
    self
  }

  #[inline]
  fn add(&mut self, z: f64) -> &mut Self {
    self.0.add(z);
    self
  }

  decompose::exact_operations!{}

  fn double_value(&self) -> f64 {
    self.0.value()
  }
}
