use core::fmt;

/// One of the operations in the [`Accumulator`](super::Accumulator) interface that a concrete
/// accumulator may or may not support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Operation {
  Add,
  AddAll,
  Add2,
  AddProduct,
  AddProducts,
  AddAbs,
  AddL1,
  AddL2,
  AddL1Distance,
  AddL2Distance,
}

impl Operation {
  /// Every operation, in declaration order.
  pub const ALL: [Operation; 10] = [
    Operation::Add,
    Operation::AddAll,
    Operation::Add2,
    Operation::AddProduct,
    Operation::AddProducts,
    Operation::AddAbs,
    Operation::AddL1,
    Operation::AddL2,
    Operation::AddL1Distance,
    Operation::AddL2Distance,
  ];

  /// The name of the corresponding method.
  pub const fn name(self) -> &'static str {
    match self {
      Operation::Add => "add",
      Operation::AddAll => "add_all",
      Operation::Add2 => "add2",
      Operation::AddProduct => "add_product",
      Operation::AddProducts => "add_products",
      Operation::AddAbs => "add_abs",
      Operation::AddL1 => "add_l1",
      Operation::AddL2 => "add_l2",
      Operation::AddL1Distance => "add_l1_distance",
      Operation::AddL2Distance => "add_l2_distance",
    }
  }

  const fn bit(self) -> u16 {
    1 << self as u8
  }
}

impl fmt::Display for Operation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// The set of [`Operation`]s an accumulator declares it supports.
///
/// ```
/// # use exact_accumulators::{Capabilities, Operation};
/// const SUMS: Capabilities = Capabilities::BASIC.with(Operation::AddAbs);
/// assert!(SUMS.contains(Operation::AddAll));
/// assert!(!SUMS.contains(Operation::AddProduct));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Capabilities(u16);

impl Capabilities {
  /// No operation at all.
  pub const NONE: Self = Self(0);

  /// `add` and `add_all`, which every accumulator has.
  pub const BASIC: Self = Self::NONE.with(Operation::Add).with(Operation::AddAll);

  /// Every operation in the interface.
  pub const ALL: Self = {
    let mut set = Self::NONE;
    let mut i = 0;
    while i < Operation::ALL.len() {
      set = set.with(Operation::ALL[i]);
      i += 1
    }
    set
  };

  /// `self` plus `op`.
  #[must_use]
  pub const fn with(self, op: Operation) -> Self {
    Self(self.0 | op.bit())
  }

  /// `self` minus `op`.
  #[must_use]
  pub const fn without(self, op: Operation) -> Self {
    Self(self.0 & !op.bit())
  }

  pub const fn contains(self, op: Operation) -> bool {
    self.0 & op.bit() != 0
  }

  /// The operations in `self`, in declaration order.
  pub fn iter(self) -> impl Iterator<Item = Operation> {
    Operation::ALL.into_iter().filter(move |&op| self.contains(op))
  }
}

impl fmt::Debug for Capabilities {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_set().entries(self.iter()).finish()
  }
}

/// The error returned when calling an operation outside the receiver's declared
/// [`Capabilities`]. It names both the receiver type and the operation.
///
/// ```
/// # use exact_accumulators::*;
/// let mut acc = FloatAccumulator::new();
/// let err = acc.add_product(2.0, 3.0).unwrap_err();
/// assert_eq!(err.operation, Operation::AddProduct);
/// assert!(err.to_string().contains("FloatAccumulator"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unsupported operation: {receiver} does not implement `{operation}`")]
pub struct UnsupportedOperation {
  /// Type name of the accumulator the operation was called on.
  pub receiver: &'static str,
  pub operation: Operation,
}
