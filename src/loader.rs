/*!
  Turns program files into memory images.

  Assembly files (`.asm` by default) are translated line by line:

    * A line holding only `halt` assembles to the halt word and ends the instruction region.
      Every later line is one hexadecimal data word, where a bare `halt` stands for zero.
    * The line after a `loadc` is its constant: one hexadecimal token, taken as a constant even
      when it spells a mnemonic (`add` is 0xadd there).
    * Elsewhere, a line holding a single token that is not a mnemonic is a hexadecimal constant.
      A constant that spells a mnemonic needs the `0x` prefix outside a `loadc` operand.
    * Any other line is a mnemonic followed by its register operands.

  Blank lines and `#` comments produce no word. Any other file is read as whitespace-separated
  hexadecimal words with no assembly stage.

  Translation stops at the first bad line, and the error names that line. An image is only ever
  built completely; a failed translation never reaches memory.
*/

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bimap::BiMap;
use log::{info, warn};

use crate::bytecode::{
  encode_constant, encode_instruction, to_hex_text, tokenize_line, Opcode, Word, HALT_WORD,
};
use crate::config::Config;
use crate::error::{AssemblyError, LoadError};

/// Extension of the sibling file that assembled words are written to.
pub const HEX_EXTENSION: &str = "hex";

/// Memory address <-> 1-based source line. Each assembled line yields exactly one word, so the
/// relation is a bijection.
pub type SourceMap = BiMap<usize, usize>;

#[derive(Debug, Default)]
pub struct Program {
  pub words      : Vec<Word>,
  /// Only assembled programs have one.
  pub source_map : Option<SourceMap>,
  /// Set when writing the assembled words to the sibling hex file failed. The program itself is
  /// still complete and loadable.
  pub persist_error : Option<io::Error>,
}

impl Program {

  pub fn len(&self) -> usize {
    self.words.len()
  }

  pub fn is_empty(&self) -> bool {
    self.words.is_empty()
  }

  pub fn line_of_address(&self, address: usize) -> Option<usize> {
    self.source_map.as_ref()?.get_by_left(&address).copied()
  }

  pub fn address_of_line(&self, line: usize) -> Option<usize> {
    self.source_map.as_ref()?.get_by_right(&line).copied()
  }

  /// One eight digit hex word per line, newline terminated. Loading this text as a hex image
  /// reproduces `words`.
  pub fn to_hex_text(&self) -> String {
    self
      .words
      .iter()
      .map(|word| to_hex_text(*word) + "\n")
      .collect()
  }

  pub fn persist(&self, path: &Path) -> io::Result<()> {
    fs::write(path, self.to_hex_text())
  }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Region {
  Instructions,
  /// The line right after a `loadc`.
  Constant,
  Data,
}

fn is_halt(token: &str) -> bool {
  token.eq_ignore_ascii_case(Opcode::Halt.into())
}

/// Translates the tokens of one non-blank line, tracking the region the next line falls in.
fn assemble_statement(tokens: &[&str], region: &mut Region) -> Result<Word, AssemblyError> {
  match (*region, tokens) {

    (Region::Data, [token]) if is_halt(token) => Ok(HALT_WORD),

    (Region::Data, [token]) => encode_constant(token),

    (Region::Data, _) => Err(AssemblyError::InvalidConstant(tokens.join(" "))),

    (Region::Instructions, [token]) if is_halt(token) => {
      *region = Region::Data;
      Ok(HALT_WORD)
    }

    (Region::Instructions, [token]) => {
      match Opcode::from_mnemonic(token) {
        // A mnemonic on its own is missing its operands.
        Some(opcode) => encode_instruction(opcode, &[]),
        None         => encode_constant(token)
      }
    }

    (Region::Constant, [token]) => {
      *region = Region::Instructions;
      encode_constant(token)
    }

    (Region::Constant, _) => Err(AssemblyError::InvalidConstant(tokens.join(" "))),

    (Region::Instructions, [mnemonic, operands @ ..]) => {
      let opcode = Opcode::from_mnemonic(mnemonic)
        .ok_or_else(|| AssemblyError::UnknownMnemonic(mnemonic.to_string()))?;
      let word = encode_instruction(opcode, operands)?;
      if opcode == Opcode::LoadC {
        *region = Region::Constant;
      }
      Ok(word)
    }

    (_, []) => unreachable!("Unreachable: blank lines are skipped before translation."),
  }
}

/// Assembles program text into an image, recording which line each word came from.
pub fn assemble(text: &str) -> Result<Program, LoadError> {
  let mut words      = Vec::new();
  let mut source_map = SourceMap::new();
  let mut region     = Region::Instructions;

  for (i, line) in text.lines().enumerate() {
    let line_number = i + 1;
    let at_line = |source| LoadError::Assembly { line: line_number, source };

    let tokens = tokenize_line(line).map_err(at_line)?;
    if tokens.is_empty() {
      continue;
    }

    let word = assemble_statement(&tokens, &mut region).map_err(at_line)?;
    source_map.insert(words.len(), line_number);
    words.push(word);
  }

  Ok(Program { words, source_map: Some(source_map), persist_error: None })
}

/// Reads whitespace-separated hexadecimal words.
pub fn parse_hex_image(text: &str) -> Result<Program, LoadError> {
  let mut words = Vec::new();

  for (i, line) in text.lines().enumerate() {
    for token in line.split_whitespace() {
      let word = encode_constant(token)
        .map_err(|source| LoadError::Assembly { line: i + 1, source })?;
      words.push(word);
    }
  }

  Ok(Program { words, source_map: None, persist_error: None })
}

pub fn is_assembly_file(path: &Path, config: &Config) -> bool {
  path
    .extension()
    .and_then(OsStr::to_str)
    .map_or(false, |extension| extension.eq_ignore_ascii_case(&config.assembly_extension))
}

/// The file assembled words are persisted to: the source path with the hex extension.
pub fn persist_path(path: &Path) -> PathBuf {
  path.with_extension(HEX_EXTENSION)
}

/**
  Reads a program file and builds its image, assembling it first if it is an assembly file.

  With `Config::persist_assembly` set, the assembled words are also written next to the source.
  A failure to write them is logged and left in `Program::persist_error`; it does not fail the
  load.
*/
pub fn load_file(path: &Path, config: &Config) -> Result<Program, LoadError> {
  let text = fs::read_to_string(path)
    .map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;

  if !is_assembly_file(path, config) {
    let program = parse_hex_image(&text)?;
    info!("Read {} words from {}", program.len(), path.display());
    return Ok(program);
  }

  let mut program = assemble(&text)?;
  info!("Assembled {} words from {}", program.len(), path.display());

  if config.persist_assembly {
    let target = persist_path(path);
    let result = match target.as_path() == path {
      true  => Err(io::Error::new(io::ErrorKind::AlreadyExists, "refusing to overwrite the source file")),
      false => program.persist(&target)
    };
    if let Err(e) = result {
      warn!("Could not write {}: {}", target.display(), e);
      program.persist_error = Some(e);
    }
  }

  Ok(program)
}
