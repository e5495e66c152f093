/*!
  The human readable textual form of bytecode is called assembly. This module turns single
  assembly tokens into words: mnemonics with register operands into instruction words, and
  hexadecimal literals into data words. Deciding which of the two a source line is belongs to
  the loader.
*/

use std::convert::TryFrom;

use nom::{
  bytes::complete::{is_not, tag_no_case},
  character::complete::{char as one_char, hex_digit1, space0, space1},
  combinator::{all_consuming, opt, rest},
  multi::separated_list,
  sequence::{delimited, pair, preceded, terminated},
  IResult,
};

use super::{encode_word, Instruction, Opcode, Word};
use crate::error::AssemblyError;
use crate::register::Register;

fn token(input: &str) -> IResult<&str, &str> {
  is_not(" \t#")(input)
}

fn comment(input: &str) -> IResult<&str, &str> {
  preceded(one_char('#'), rest)(input)
}

fn line(input: &str) -> IResult<&str, Vec<&str>> {
  all_consuming(
    terminated(
      delimited(space0, separated_list(space1, token), space0),
      opt(comment)
    )
  )(input)
}

// [-][0x]digits
fn hex_literal(input: &str) -> IResult<&str, (Option<char>, &str)> {
  all_consuming(
    pair(
      opt(one_char('-')),
      preceded(opt(tag_no_case("0x")), hex_digit1)
    )
  )(input)
}

/// Splits one source line into its tokens. Tokens are separated by spaces or tabs, and `#` starts
/// a comment that runs to the end of the line. A blank line yields no tokens.
pub fn tokenize_line(text: &str) -> Result<Vec<&str>, AssemblyError> {
  match line(text) {
    Ok((_rest, tokens)) => Ok(tokens),
    Err(_e)             => Err(AssemblyError::Syntax(text.to_string()))
  }
}

fn register_operand(text: &str) -> Result<Register, AssemblyError> {
  text
    .parse::<i64>()
    .ok()
    .and_then(|index| u8::try_from(index).ok())
    .and_then(Register::new)
    .ok_or_else(|| AssemblyError::RegisterRange(text.to_string()))
}

/**
  Assembles an opcode and its operand tokens into an instruction word.

  `loadc` takes exactly one register; its constant is the following word, so the second field is
  left zero. Every other opcode takes exactly two. Each operand must be a decimal integer naming
  one of the registers 0-7. The operand count is checked before the operands themselves.
*/
pub fn encode_instruction(opcode: Opcode, operands: &[&str]) -> Result<Word, AssemblyError> {
  if operands.len() != opcode.arity() {
    return Err(AssemblyError::ArgumentCount {
      opcode,
      expected: opcode.arity(),
      found: operands.len()
    });
  }

  let arg1 = register_operand(operands[0])?;
  let arg2 = match operands.get(1) {
    Some(operand) => register_operand(operand)?,
    None          => Register::default()
  };

  Ok(encode_word(&Instruction::new(opcode, arg1, arg2)))
}

/**
  Parses a hexadecimal literal into a data word. The `0x` prefix is optional, and a leading `-`
  negates the value. Literals up to `ffffffff` are accepted and reinterpreted as two's
  complement, so that the text of a memory dump can be loaded back unchanged.
*/
pub fn encode_constant(text: &str) -> Result<Word, AssemblyError> {
  let invalid = || AssemblyError::InvalidConstant(text.to_string());

  let (_rest, (sign, digits)) = hex_literal(text).map_err(|_| invalid())?;
  let magnitude = u32::from_str_radix(digits, 16).map_err(|_| invalid())?;

  match sign {
    Some(_) => Word::try_from(-(magnitude as i64)).map_err(|_| invalid()),
    None    => Ok(magnitude as Word)
  }
}

/// The eight digit text form of a word, as emitted by the assembler and shown in dumps.
pub fn to_hex_text(word: Word) -> String {
  format!("{:08x}", word)
}
