use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::bytecode::{Opcode, Word};

/// Errors raised by word store accesses. These are fatal to the current run.
#[derive(Error, Debug, Clone, Copy, Eq, PartialEq)]
pub enum MemoryError {
  #[error("address {address} is outside memory [0, {capacity})")]
  OutOfRange { address: Word, capacity: usize },

  #[error("a program of {len} words does not fit in memory of {capacity} words")]
  ImageTooLarge { len: usize, capacity: usize },
}

/// Errors that can occur while translating a single token or line of assembly.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum AssemblyError {
  #[error("`{0}` is not an operation")]
  UnknownMnemonic(String),

  #[error("{opcode} requires {expected} argument(s) but was given {found}")]
  ArgumentCount {
    opcode: Opcode,
    expected: usize,
    found: usize,
  },

  #[error("invalid register value `{0}`: must be in range 0-7")]
  RegisterRange(String),

  #[error("`{0}` is not a hexadecimal word")]
  InvalidConstant(String),

  #[error("could not split line into tokens: `{0}`")]
  Syntax(String),
}

/// Errors that abort loading a program. Nothing is written to memory when one occurs.
#[derive(Error, Debug)]
pub enum LoadError {
  #[error("could not read {}: {}", .path.display(), .source)]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("line {line}: {source}")]
  Assembly {
    line: usize,
    #[source]
    source: AssemblyError,
  },

  #[error(transparent)]
  Memory(#[from] MemoryError),
}

/// Reasons a word cannot be executed as an instruction.
#[derive(Error, Debug, Clone, Copy, Eq, PartialEq)]
pub enum DecodeError {
  #[error("reserved bits are set in {0:#010x}")]
  ReservedBits(Word),

  #[error("{word:#010x} names register {index}, but only registers 0-7 exist")]
  RegisterIndex { word: Word, index: u8 },

  #[error("{0} is not an opcode")]
  Opcode(u8),
}
