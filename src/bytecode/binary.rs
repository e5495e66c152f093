/*!
  This module is responsible for the encoding and decoding of binary instructions.

*/
use std::convert::TryFrom;

use super::{Instruction, Opcode, Word};
use crate::error::DecodeError;
use crate::register::Register;

// If you change these you must also change `encode_word` and `try_decode_word`.
const OPCODE_SHIFT: u32 = 8;
const ARG1_SHIFT  : u32 = 4;
const ARG2_SHIFT  : u32 = 0;

/// Width mask of each of the three instruction fields.
pub const FIELD_MASK: Word = 0xF;
/// Bits 12-31, which no instruction uses.
pub const RESERVED_MASK: Word = !0xFFF;
/// `halt` with both operands zero; also what a bare `halt` line assembles to.
pub const HALT_WORD: Word = 0;

/// Packs the instruction fields into a word. Register indices are already known to be in range.
pub fn encode_word(instruction: &Instruction) -> Word {
  // [Reserved:20][Opcode:4][Arg1:4][Arg2:4]
  ((instruction.opcode.code() as Word) << OPCODE_SHIFT)
    | ((instruction.arg1.code() as Word) << ARG1_SHIFT)
    | ((instruction.arg2.code() as Word) << ARG2_SHIFT)
}

/**
  Extracts the instruction fields from a word.

  A word with reserved bits set, or with an argument field naming a register that does not exist,
  is not an instruction the assembler could have produced. The processor treats both cases as an
  unrecognized opcode.
*/
pub fn try_decode_word(word: Word) -> Result<Instruction, DecodeError> {
  if word & RESERVED_MASK != 0 {
    return Err(DecodeError::ReservedBits(word));
  }

  let field = |shift: u32| ((word >> shift) & FIELD_MASK) as u8;
  let register = |shift: u32| {
    let index = field(shift);
    Register::new(index).ok_or(DecodeError::RegisterIndex { word, index })
  };

  let code = field(OPCODE_SHIFT);
  let opcode = Opcode::try_from(code).map_err(|_| DecodeError::Opcode(code))?;

  Ok(Instruction {
    opcode,
    arg1: register(ARG1_SHIFT)?,
    arg2: register(ARG2_SHIFT)?,
  })
}
