//! A checked index into the register file. Holding a `Register` means the index is known to name
//! one of the eight registers, so the processor can index with it directly.

use std::fmt::{Display, Formatter};

pub const REGISTER_COUNT: usize = 8;

#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Default)]
pub struct Register(u8);

impl Register {
  /// Returns `None` for indices outside the register file.
  pub fn new(index: u8) -> Option<Register> {
    match (index as usize) < REGISTER_COUNT {
      true  => Some(Register(index)),
      false => None
    }
  }

  /// The raw field value, as packed into an instruction word.
  pub fn code(&self) -> u8 {
    self.0
  }

  /// Converts the register to an index into the register file.
  pub fn idx(&self) -> usize {
    self.0 as usize
  }

  pub fn all() -> impl Iterator<Item = Register> {
    (0..REGISTER_COUNT as u8).map(Register)
  }
}

impl Display for Register {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}
