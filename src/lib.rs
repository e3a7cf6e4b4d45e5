//! This crate provides streaming floating point **accumulators**: stateful reducers that consume a
//! sequence of doubles and maintain a running sum, under contracts ranging from naive (fast,
//! lossy) through compensated (bounded error) to **exact**: the result equals the infinitely
//! precise sum of everything added, correctly rounded to the nearest double.
//!
//! # Introduction
//!
//! Summing doubles one by one rounds at every step, and the errors add up; when large terms
//! cancel, nothing of the true result may be left. For instance, `1e16 + 1.0 - 1e16` evaluates to
//! `0.0`. The exact accumulators in this crate give `1.0`, in every order, for any stream.
//!
//! They are built on *error-free transformations* ([`two_sum`], [`two_product`]), which return
//! the rounded result of an operation together with the exact error of that rounding.
//!
//! The following references are useful background:
//!
//!   - [Accurate floating-point summation](https://doi.org/10.1137/050645671), Rump, Ogita, Oishi
//!     (2008)
//!   - [Algorithm 908: Online exact summation of floating-point streams](https://doi.org/10.1145/1824801.1824815),
//!     Zhu, Hayes (2010)
//!   - [Correct rounding and a hybrid approach to exact floating-point summation](https://doi.org/10.1137/070710020),
//!     Zhu, Hayes (2009)
//!
//! # Usage
//!
//! ```
//! use exact_accumulators::{Accumulator, NaiveAccumulator, KahanAccumulator, ZhuHayesAccumulator};
//!
//! let data = [1e16, 1.0, -1e16];
//! assert_eq!(NaiveAccumulator::new().add_all(&data).double_value(), 0.0);
//! assert_eq!(KahanAccumulator::new().add_all(&data).double_value(), 1.0);
//! assert_eq!(ZhuHayesAccumulator::new().add_all(&data).double_value(), 1.0);
//!
//! // Exact accumulators also take exact dot products and distances.
//! let mut acc = ZhuHayesAccumulator::new();
//! acc.add_products(&[0.1, 0.2], &[3.0, -1.5])?;
//! assert_eq!(acc.double_value(), 0.0);
//!
//! // Operations an accumulator does not implement fail, rather than fall back to something else.
//! use exact_accumulators::FloatAccumulator;
//! assert!(FloatAccumulator::new().add_product(1.0, 2.0).is_err());
//! # Ok::<(), exact_accumulators::UnsupportedOperation>(())
//! ```
//!
//! # Accumulators
//!
//! | Accumulator              | Exact | Per element          | Operations                       |
//! |--------------------------|-------|----------------------|----------------------------------|
//! | [`NaiveAccumulator`]     | no    | 1 add                | all                              |
//! | [`FloatAccumulator`]     | no    | 1 add (binary32)     | sums only                        |
//! | [`KahanAccumulator`]     | no    | 4 adds               | sums, products                   |
//! | [`KahanEftAccumulator`]  | no    | 4 adds per term      | all                              |
//! | [`DistilledAccumulator`] | yes   | O(terms) or worse    | all                              |
//! | [`ZhuHayesAccumulator`]  | yes   | O(1)                 | all                              |
//!
//! All of them are single-threaded values with no interior mutability. Non-finite values are not
//! errors: they propagate by the usual IEEE-754 rules, and exactness only holds while every
//! intermediate value stays finite.
//!
//! This crate includes benchmarks; run them with `cargo bench -F bench`.

mod accumulator;
mod eft;
mod underlying;

pub use accumulator::{
  Accumulator,
  Capabilities,
  Operation,
  NaiveAccumulator,
  FloatAccumulator,
  KahanAccumulator,
  KahanEftAccumulator,
  DistilledAccumulator,
  ZhuHayesAccumulator,
  NACCUMULATORS,
  NADDS,
};
pub use accumulator::capability::UnsupportedOperation;
pub use eft::{two_sum, fast_two_sum, two_product, round3};
pub use underlying::{biased_exponent, ulp, half_ulp, EXPONENTS};

/// Re-export some internals for benchmarking purposes, only on `feature = "bench"`.
#[cfg(feature = "bench")]
pub mod bench;


#[cfg(test)]
const PROPTEST_CASES: u32 = if cfg!(debug_assertions) {0x100} else {0x1000};
