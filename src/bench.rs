//! Re-export some internals for benchmarking purposes; available with feature = "bench".

/// The correctly rounded sum of `x`, destroying its contents.
pub fn ifastsum(x: &mut Vec<f64>) -> f64 {
  crate::accumulator::zhu_hayes::ifastsum(x)
}

/// `|a - b|` as a non-overlapping pair.
pub fn l1_pair(a: f64, b: f64) -> (f64, f64) {
  crate::accumulator::decompose::l1_pair(a, b)
}

// Export these for inspection with `cargo asm`.

#[unsafe(no_mangle)]
pub fn two_sum_f64(a: f64, b: f64) -> (f64, f64) {
  crate::two_sum(a, b)
}

#[unsafe(no_mangle)]
pub fn two_product_f64(a: f64, b: f64) -> (f64, f64) {
  crate::two_product(a, b)
}

#[unsafe(no_mangle)]
pub fn kahan_add(acc: &mut crate::KahanAccumulator, z: f64) {
  use crate::Accumulator;
  acc.add(z);
}

#[unsafe(no_mangle)]
pub fn zhu_hayes_add(acc: &mut crate::ZhuHayesAccumulator, z: f64) {
  use crate::Accumulator;
  acc.add(z);
}
