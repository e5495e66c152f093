/*!

  Micro-1 words are 32 bit signed integers. An instruction occupies the low twelve bits of a
  single word; the remaining bits are reserved and always zero in assembled code:

    [Reserved:20][Opcode:4][Arg1:4][Arg2:4]

  Both argument fields hold register indices. The fields are four bits wide but only eight
  registers exist, so the assembler refuses any operand outside 0-7 and the decoder reports such
  a word as malformed rather than indexing past the register file.

  Instructions and data share the same store and carry no tag bit. Whether a word is an
  instruction or a constant is decided only by where the loader placed it, which is why `loadc`
  reads its operand from the word that follows it instead of from an argument field.

*/

mod assembly;
mod binary;

pub use assembly::{encode_constant, encode_instruction, to_hex_text, tokenize_line};
pub use binary::{encode_word, try_decode_word, FIELD_MASK, HALT_WORD, RESERVED_MASK};

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::{Display as StrumDisplay, EnumIter, EnumString, IntoStaticStr};

use crate::register::Register;

/// The sole unit of storage and of instruction encoding.
pub type Word = i32;

/**
  Opcodes of the processor.

  The discriminant of each variant is its opcode value, so the order below is the mnemonic table
  of the assembler and must not change.
*/
#[derive(
StrumDisplay, IntoStaticStr, EnumString, EnumIter, TryFromPrimitive, IntoPrimitive,
Clone,        Copy,          Eq, PartialEq,  Debug,    Hash
)]
#[repr(u8)]
pub enum Opcode {
  #[strum(serialize = "halt")]   Halt,    // halt
  #[strum(serialize = "load")]   Load,    // load a b    reg[a] = cell[reg[b]]
  #[strum(serialize = "loadc")]  LoadC,   // loadc a     reg[a] = next word
  #[strum(serialize = "store")]  Store,   // store a b   cell[reg[a]] = reg[b]
  #[strum(serialize = "add")]    Add,     // add a b     reg[a] += reg[b]
  #[strum(serialize = "mul")]    Mul,     // mul a b     reg[a] *= reg[b]
  #[strum(serialize = "sub")]    Sub,     // sub a b     reg[a] -= reg[b]
  #[strum(serialize = "div")]    Div,     // div a b     reg[a] /= reg[b]
  #[strum(serialize = "and")]    And,     // and a b     reg[a] = reg[a] && reg[b]
  #[strum(serialize = "or")]     Or,      // or a b      reg[a] = reg[a] || reg[b]
  #[strum(serialize = "not")]    Not,     // not a b     reg[a] = !reg[b]
  #[strum(serialize = "lshift")] LShift,  // lshift a b  reg[a] = reg[b] << 1
  #[strum(serialize = "rshift")] RShift,  // rshift a b  reg[a] = reg[b] >> 1
  #[strum(serialize = "bwc")]    Bwc,     // bwc a b     reg[a] = reg[a] & reg[b]
  #[strum(serialize = "bwd")]    Bwd,     // bwd a b     reg[a] = reg[a] | reg[b]
  #[strum(serialize = "if")]     If,      // if a b      if reg[a] != 0 { pc = reg[b] }
}

impl Opcode {
  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }

  /// Case-insensitive mnemonic lookup. `None` is the "unknown mnemonic" answer; what to do about
  /// it is up to the caller.
  pub fn from_mnemonic(mnemonic: &str) -> Option<Opcode> {
    Opcode::from_str(&mnemonic.to_ascii_lowercase()).ok()
  }

  /// The number of operands the assembler requires for this opcode.
  pub fn arity(&self) -> usize {
    match self {
      Opcode::LoadC => 1,
      _             => 2
    }
  }
}

/// Holds the unencoded fields of an instruction word.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Instruction {
  pub opcode : Opcode,
  pub arg1   : Register,
  pub arg2   : Register,
}

impl Instruction {
  pub fn new(opcode: Opcode, arg1: Register, arg2: Register) -> Instruction {
    Instruction { opcode, arg1, arg2 }
  }
}

impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self.opcode.arity() {
      1 => write!(f, "{} {}", self.opcode, self.arg1),
      _ => write!(f, "{} {} {}", self.opcode, self.arg1, self.arg2)
    }
  }
}
