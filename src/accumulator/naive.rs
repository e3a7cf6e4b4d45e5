use super::*;

/// The plain running sum: every operation is evaluated in binary64 and rounded into the sum.
///
/// Fast, and exact only by luck: summing `[1e16, 1.0, -1e16]` gives `0.0`. Useful as a baseline,
/// and when the data is known to be well conditioned.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaiveAccumulator {
  sum: f64,
}

impl NaiveAccumulator {
  pub const fn new() -> Self {
    Self { sum: 0.0 }
  }
}

impl Accumulator for NaiveAccumulator {
  fn capabilities(&self) -> Capabilities {
    Capabilities::ALL
  }

  fn is_exact(&self) -> bool {
    false
  }

  fn clear(&mut self) -> &mut Self {
    self.sum = 0.0;
    self
  }

  #[inline]
  fn add(&mut self, z: f64) -> &mut Self {
    self.sum += z;
    self
  }

  fn add2(&mut self, x: f64) -> Result<&mut Self, UnsupportedOperation> {
    self.sum += x * x;
    Ok(self)
  }

  fn add_product(&mut self, a: f64, b: f64) -> Result<&mut Self, UnsupportedOperation> {
    self.sum += a * b;
    Ok(self)
  }

  fn add_abs(&mut self, x: f64) -> Result<&mut Self, UnsupportedOperation> {
    self.sum += x.abs();
    Ok(self)
  }

  fn add_l1(&mut self, a: f64, b: f64) -> Result<&mut Self, UnsupportedOperation> {
    self.sum += (a - b).abs();
    Ok(self)
  }

  fn add_l2(&mut self, a: f64, b: f64) -> Result<&mut Self, UnsupportedOperation> {
    let d = a - b;
    self.sum += d * d;
    Ok(self)
  }

  fn double_value(&self) -> f64 {
    self.sum
  }
}

/// A plain running sum in binary32: each double is rounded to a float, then added and rounded
/// again.
///
/// Only sums are supported (`add`, `add_all`, `add_abs`); products and distances of doubles are
/// refused rather than silently computed at a precision nobody asked for.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatAccumulator {
  sum: f32,
}

impl FloatAccumulator {
  pub const fn new() -> Self {
    Self { sum: 0.0 }
  }
}

impl Accumulator for FloatAccumulator {
  fn capabilities(&self) -> Capabilities {
    Capabilities::BASIC.with(Operation::AddAbs)
  }

  fn is_exact(&self) -> bool {
    false
  }

  fn clear(&mut self) -> &mut Self {
    self.sum = 0.0;
    self
  }

  #[inline]
  fn add(&mut self, z: f64) -> &mut Self {
    self.sum += z as f32;
    self
  }

  fn add_abs(&mut self, x: f64) -> Result<&mut Self, UnsupportedOperation> {
    self.sum += x.abs() as f32;
    Ok(self)
  }

  fn double_value(&self) -> f64 {
    self.sum.into()
  }

  fn float_value(&self) -> f32 {
    self.sum
  }
}
