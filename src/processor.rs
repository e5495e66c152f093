//! The fetch-decode-execute engine. One call to `Processor::step` runs exactly one instruction
//! against a `WordStore`; looping, step budgets and breakpoints are the driver's business.

use std::fmt::{Display, Formatter};

use log::{trace, warn};
use prettytable::Table;

use crate::bytecode::{try_decode_word, Opcode, Word};
use crate::error::{DecodeError, MemoryError};
use crate::memory::WordStore;
use crate::register::{Register, REGISTER_COUNT};
use crate::table::make_word_table;

/// What the driver should do after a step.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Status {
  Running,
  /// Reached through `halt` or a word that is not an instruction.
  Halted,
}

impl Status {
  pub fn is_halted(&self) -> bool {
    *self == Status::Halted
  }
}

/// Observable processor state: the register file, program counter and instruction register.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct CpuState {
  pub registers : [Word; REGISTER_COUNT],
  /// Address of the next word to fetch.
  pub pc        : Word,
  /// The most recently fetched word, including a `loadc` constant.
  pub ir        : Word,
}

/// Runtime faults that do not abort the run. Each is logged when it happens and kept until the
/// next step for the driver to inspect.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Diagnostic {
  /// `div` with a zero divisor. The destination register keeps its value.
  DivideByZero { pc: Word },
  /// The fetched word does not decode; the processor halts.
  UnrecognizedOpcode { pc: Word, error: DecodeError },
}

impl Display for Diagnostic {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Diagnostic::DivideByZero { pc } => {
        write!(f, "Cannot divide by 0 (instruction at {})", pc)
      }
      Diagnostic::UnrecognizedOpcode { pc, error } => {
        write!(f, "Unrecognized instruction at {}: {}", pc, error)
      }
    }
  }
}

#[derive(Clone, Debug, Default)]
pub struct Processor {
  state           : CpuState,
  last_diagnostic : Option<Diagnostic>,
}

impl Processor {

  pub fn new() -> Processor {
    Processor::default()
  }

  /// Zeroes registers, PC and IR.
  pub fn reset(&mut self) {
    *self = Processor::default();
  }

  pub fn inspect(&self) -> CpuState {
    self.state
  }

  pub fn register(&self, register: Register) -> Word {
    self.state.registers[register.idx()]
  }

  pub fn set_register(&mut self, register: Register, value: Word) {
    self.state.registers[register.idx()] = value;
  }

  pub fn set_pc(&mut self, address: Word) {
    self.state.pc = address;
  }

  pub(crate) fn set_ir(&mut self, word: Word) {
    self.state.ir = word;
  }

  /// Registers, PC and IR, in hex.
  pub fn register_table(&self) -> Table {
    let mut table = make_word_table("Register", &self.state.registers, None);
    table.add_row(row![r->"PC =", format!("{:x}", self.state.pc)]);
    table.add_row(row![r->"IR =", format!("{:x}", self.state.ir)]);
    table
  }

  /// The diagnostic raised by the most recent step, if it raised one.
  pub fn last_diagnostic(&self) -> Option<Diagnostic> {
    self.last_diagnostic
  }

  /**
    Fetches, decodes and executes one instruction.

    All effects are computed on a copy of the state and committed together at the end, and the
    only write to memory (`store`) is the last fallible operation. A step that fails with a
    memory error therefore leaves the processor and memory exactly as they were.
  */
  pub fn step(&mut self, memory: &mut WordStore) -> Result<Status, MemoryError> {
    // A diagnostic belongs to the step that raised it, including when this step fails.
    self.last_diagnostic = None;
    let mut next = self.state;
    let pc = next.pc;

    // Fetch
    next.ir = memory.read(pc)?;
    next.pc = pc.wrapping_add(1);

    // Decode
    let instruction = match try_decode_word(next.ir) {
      Ok(instruction) => instruction,
      Err(error)      => {
        self.commit(next, Some(Diagnostic::UnrecognizedOpcode { pc, error }));
        return Ok(Status::Halted);
      }
    };
    trace!("{:>4}: {}", pc, instruction);

    // Execute
    let a = instruction.arg1.idx();
    let b = instruction.arg2.idx();
    let reg = self.state.registers;
    let mut diagnostic = None;

    match instruction.opcode {

      Opcode::Halt => {
        self.commit(next, None);
        return Ok(Status::Halted);
      }

      Opcode::Load => {
        next.registers[a] = memory.read(reg[b])?;
      }

      Opcode::LoadC => {
        next.ir = memory.read(next.pc)?;
        next.pc = next.pc.wrapping_add(1);
        next.registers[a] = next.ir;
      }

      Opcode::Store => {
        memory.write(reg[a], reg[b])?;
      }

      Opcode::Add => next.registers[a] = reg[a].wrapping_add(reg[b]),
      Opcode::Mul => next.registers[a] = reg[a].wrapping_mul(reg[b]),
      Opcode::Sub => next.registers[a] = reg[a].wrapping_sub(reg[b]),

      Opcode::Div => {
        match reg[b] {
          0       => diagnostic = Some(Diagnostic::DivideByZero { pc }),
          divisor => next.registers[a] = reg[a].wrapping_div(divisor)
        }
      }

      Opcode::And => next.registers[a] = (reg[a] != 0 && reg[b] != 0) as Word,
      Opcode::Or  => next.registers[a] = (reg[a] != 0 || reg[b] != 0) as Word,
      Opcode::Not => next.registers[a] = (reg[b] == 0) as Word,

      Opcode::LShift => next.registers[a] = reg[b].wrapping_shl(1),
      // Arithmetic shift: `Word` is signed.
      Opcode::RShift => next.registers[a] = reg[b] >> 1,

      Opcode::Bwc => next.registers[a] = reg[a] & reg[b],
      Opcode::Bwd => next.registers[a] = reg[a] | reg[b],

      Opcode::If => {
        if reg[a] != 0 {
          next.pc = reg[b];
        }
      }

    } // end match on opcode

    self.commit(next, diagnostic);
    Ok(Status::Running)
  }

  fn commit(&mut self, state: CpuState, diagnostic: Option<Diagnostic>) {
    if let Some(diagnostic) = &diagnostic {
      warn!("{}", diagnostic);
    }
    self.state = state;
    self.last_diagnostic = diagnostic;
  }
}

impl Display for Processor {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "Registers:\n{}", self.register_table())
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::bytecode::{encode_word, Instruction};

  fn r(index: u8) -> Register {
    Register::new(index).unwrap()
  }

  fn word(opcode: Opcode, a: u8, b: u8) -> Word {
    encode_word(&Instruction::new(opcode, r(a), r(b)))
  }

  /// A processor and a store holding `program` from address 0.
  fn setup(program: &[Word]) -> (Processor, WordStore) {
    let mut memory = WordStore::new(16);
    memory.load_image(program).unwrap();
    (Processor::new(), memory)
  }

  /// Runs the single instruction `opcode a b` with `reg[a] = x` and `reg[b] = y`, returning
  /// the new value of `reg[a]`.
  fn binary(opcode: Opcode, x: Word, y: Word) -> Word {
    let (mut cpu, mut memory) = setup(&[word(opcode, 0, 1)]);
    cpu.set_register(r(0), x);
    cpu.set_register(r(1), y);
    assert_eq!(cpu.step(&mut memory), Ok(Status::Running));
    cpu.register(r(0))
  }

  #[test]
  fn halt_changes_nothing_but_fetch_state() {
    let mut memory = WordStore::new(16);
    memory.write(5, word(Opcode::Halt, 0, 0)).unwrap();
    let mut cpu = Processor::new();
    cpu.set_pc(5);
    cpu.set_register(r(3), 12);
    let before = cpu.inspect();

    assert_eq!(cpu.step(&mut memory), Ok(Status::Halted));
    assert_eq!(cpu.inspect().registers, before.registers);
    assert_eq!(cpu.inspect().pc, 6);
    assert_eq!(cpu.inspect().ir, 0);
  }

  #[test]
  fn load_reads_through_a_register() {
    let (mut cpu, mut memory) = setup(&[word(Opcode::Load, 0, 1)]);
    memory.write(5, 42).unwrap();
    cpu.set_register(r(1), 5);
    cpu.step(&mut memory).unwrap();
    assert_eq!(cpu.register(r(0)), 42);
  }

  #[test]
  fn loadc_consumes_the_following_word() {
    let (mut cpu, mut memory) = setup(&[word(Opcode::LoadC, 2, 0), 0x2a]);
    assert_eq!(cpu.step(&mut memory), Ok(Status::Running));
    let state = cpu.inspect();
    assert_eq!(state.registers[2], 0x2a);
    assert_eq!(state.pc, 2);
    assert_eq!(state.ir, 0x2a);
  }

  #[test]
  fn store_writes_through_a_register() {
    let (mut cpu, mut memory) = setup(&[word(Opcode::Store, 3, 4)]);
    cpu.set_register(r(3), 9);
    cpu.set_register(r(4), -5);
    cpu.step(&mut memory).unwrap();
    assert_eq!(memory.read(9), Ok(-5));
  }

  #[test]
  fn arithmetic_wraps() {
    assert_eq!(binary(Opcode::Add, 3, 4), 7);
    assert_eq!(binary(Opcode::Sub, 3, 4), -1);
    assert_eq!(binary(Opcode::Mul, -6, 7), -42);
    assert_eq!(binary(Opcode::Div, 43, 5), 8);
    assert_eq!(binary(Opcode::Div, -43, 5), -8);
    assert_eq!(binary(Opcode::Add, Word::max_value(), 1), Word::min_value());
    assert_eq!(binary(Opcode::Div, Word::min_value(), -1), Word::min_value());
  }

  #[test]
  fn divide_by_zero_is_recovered() {
    let (mut cpu, mut memory) = setup(&[word(Opcode::Div, 0, 1), word(Opcode::Add, 0, 0)]);
    cpu.set_register(r(0), 17);
    assert_eq!(cpu.step(&mut memory), Ok(Status::Running));
    assert_eq!(cpu.register(r(0)), 17);
    assert_eq!(cpu.inspect().pc, 1);
    assert_eq!(cpu.last_diagnostic(), Some(Diagnostic::DivideByZero { pc: 0 }));

    // The diagnostic belongs to the step that raised it.
    cpu.step(&mut memory).unwrap();
    assert_eq!(cpu.register(r(0)), 34);
    assert_eq!(cpu.last_diagnostic(), None);
  }

  #[test]
  fn failed_step_drops_the_previous_diagnostic() {
    let (mut cpu, mut memory) = setup(&[word(Opcode::Div, 0, 1), word(Opcode::Load, 0, 2)]);
    cpu.set_register(r(2), 1000);
    cpu.step(&mut memory).unwrap();
    assert_eq!(cpu.last_diagnostic(), Some(Diagnostic::DivideByZero { pc: 0 }));

    let before = cpu.inspect();
    assert_eq!(
      cpu.step(&mut memory),
      Err(MemoryError::OutOfRange { address: 1000, capacity: 16 })
    );
    assert_eq!(cpu.last_diagnostic(), None);
    assert_eq!(cpu.inspect(), before);
  }

  #[test]
  fn logic_is_boolean() {
    assert_eq!(binary(Opcode::And, 5, -3), 1);
    assert_eq!(binary(Opcode::And, 5, 0), 0);
    assert_eq!(binary(Opcode::Or, 0, 9), 1);
    assert_eq!(binary(Opcode::Or, 0, 0), 0);
    assert_eq!(binary(Opcode::Not, 123, 0), 1);
    assert_eq!(binary(Opcode::Not, 0, 7), 0);
  }

  #[test]
  fn bitwise_is_bitwise() {
    assert_eq!(binary(Opcode::Bwc, 0b1100, 0b1010), 0b1000);
    assert_eq!(binary(Opcode::Bwd, 0b1100, 0b1010), 0b1110);
  }

  #[test]
  fn shifts_read_the_second_register() {
    assert_eq!(binary(Opcode::LShift, 100, 3), 6);
    assert_eq!(binary(Opcode::RShift, 100, 12), 6);
    assert_eq!(binary(Opcode::RShift, 0, -8), -4);
    assert_eq!(binary(Opcode::RShift, 0, -1), -1);
    assert_eq!(binary(Opcode::LShift, 0, Word::min_value()), 0);
  }

  #[test]
  fn if_jumps_only_when_nonzero() {
    let (mut cpu, mut memory) = setup(&[word(Opcode::If, 0, 1)]);
    cpu.set_register(r(1), 9);
    cpu.step(&mut memory).unwrap();
    assert_eq!(cpu.inspect().pc, 1);

    let (mut cpu, mut memory) = setup(&[word(Opcode::If, 0, 1)]);
    cpu.set_register(r(0), -2);
    cpu.set_register(r(1), 9);
    cpu.step(&mut memory).unwrap();
    assert_eq!(cpu.inspect().pc, 9);
  }

  #[test]
  fn malformed_word_halts_with_diagnostic() {
    let (mut cpu, mut memory) = setup(&[0x7fff]);
    assert_eq!(cpu.step(&mut memory), Ok(Status::Halted));
    assert_eq!(
      cpu.last_diagnostic(),
      Some(Diagnostic::UnrecognizedOpcode { pc: 0, error: DecodeError::ReservedBits(0x7fff) })
    );
    assert_eq!(cpu.inspect().ir, 0x7fff);
  }

  #[test]
  fn fetch_past_the_end_fails() {
    let (mut cpu, mut memory) = setup(&[]);
    cpu.set_pc(16);
    assert_eq!(
      cpu.step(&mut memory),
      Err(MemoryError::OutOfRange { address: 16, capacity: 16 })
    );
    assert_eq!(cpu.inspect().pc, 16);
  }

  #[test]
  fn failed_step_is_not_half_applied() {
    // loadc as the last word: the constant fetch runs off the end.
    let mut memory = WordStore::new(4);
    memory.write(3, word(Opcode::LoadC, 1, 0)).unwrap();
    let mut cpu = Processor::new();
    cpu.set_pc(3);
    let before = cpu.inspect();
    assert!(cpu.step(&mut memory).is_err());
    assert_eq!(cpu.inspect(), before);

    // store through a negative address.
    let (mut cpu, mut memory) = setup(&[word(Opcode::Store, 0, 1)]);
    cpu.set_register(r(0), -1);
    let before_memory = memory.clone();
    let before = cpu.inspect();
    assert!(cpu.step(&mut memory).is_err());
    assert_eq!(cpu.inspect(), before);
    assert_eq!(memory, before_memory);
  }
}
