//! A simulated Micro-1 computer: one word store and one processor, behind the single interface
//! that every driver (the shell, the `--run` mode, tests) goes through.

use std::convert::TryFrom;
use std::fmt::{Display, Formatter};
use std::path::Path;

use log::{info, log_enabled, trace, Level};
use prettytable::Table;

use crate::bytecode::Word;
use crate::config::Config;
use crate::error::{LoadError, MemoryError};
use crate::loader::{self, Program, SourceMap};
use crate::memory::WordStore;
use crate::processor::{CpuState, Diagnostic, Processor, Status};
use crate::register::Register;
use crate::table::{make_word_table, TABLE_DISPLAY_FORMAT};

/// How a bounded run ended.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RunSummary {
  /// Steps completed, including the one that halted.
  pub executed : usize,
  /// `Running` means the budget ran out first.
  pub status   : Status,
}

pub struct Machine {
  config     : Config,
  memory     : WordStore,
  processor  : Processor,
  // Present when the loaded program was assembled.
  source_map : Option<SourceMap>,
}

impl Machine {

  pub fn new(config: Config) -> Machine {
    Machine {
      memory     : WordStore::new(config.capacity),
      processor  : Processor::new(),
      source_map : None,
      config,
    }
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  // region Loading

  /**
    Replaces memory with the program image and points the processor at its first word. PC and IR
    are reset; registers are kept, so a driver may set them up before or after loading.
  */
  pub fn load_program(&mut self, program: &Program) -> Result<(), MemoryError> {
    self.memory.load_image(&program.words)?;
    self.processor.set_pc(0);
    self.processor.set_ir(0);
    self.source_map = program.source_map.clone();
    info!("Loaded {} words", program.len());
    Ok(())
  }

  /// Loads a program file. The returned `Program` carries any error from persisting the
  /// assembled words, which does not prevent the load.
  pub fn load_file(&mut self, path: &Path) -> Result<Program, LoadError> {
    let program = loader::load_file(path, &self.config)?;
    self.load_program(&program)?;
    Ok(program)
  }

  /// Zeroes memory and the processor, as if the machine had just been built.
  pub fn reset(&mut self) {
    self.memory.clear();
    self.processor.reset();
    self.source_map = None;
  }

  // endregion

  // region Execution

  pub fn step(&mut self) -> Result<Status, MemoryError> {
    if log_enabled!(Level::Trace) {
      let pc = self.processor.inspect().pc;
      if let Some(line) = self.source_line(pc) {
        trace!("Stepping from source line {}", line);
      }
    }

    let status = self.processor.step(&mut self.memory)?;

    #[cfg(feature = "trace_computation")] println!("{}", self);

    Ok(status)
  }

  /// Steps until `halt` or until `budget` steps have run. A memory error ends the run.
  pub fn run(&mut self, budget: usize) -> Result<RunSummary, MemoryError> {
    let mut executed = 0;
    while executed < budget {
      let status = self.step()?;
      executed += 1;
      if status.is_halted() {
        return Ok(RunSummary { executed, status });
      }
    }
    Ok(RunSummary { executed, status: Status::Running })
  }

  /// `run` with the configured step budget.
  pub fn run_to_halt(&mut self) -> Result<RunSummary, MemoryError> {
    self.run(self.config.step_budget)
  }

  // endregion

  // region Inspection

  pub fn inspect(&self) -> CpuState {
    self.processor.inspect()
  }

  pub fn last_diagnostic(&self) -> Option<Diagnostic> {
    self.processor.last_diagnostic()
  }

  pub fn register(&self, register: Register) -> Word {
    self.processor.register(register)
  }

  pub fn set_register(&mut self, register: Register, value: Word) {
    self.processor.set_register(register, value);
  }

  pub fn set_pc(&mut self, address: Word) {
    self.processor.set_pc(address);
  }

  pub fn memory(&self) -> &WordStore {
    &self.memory
  }

  pub fn memory_mut(&mut self) -> &mut WordStore {
    &mut self.memory
  }

  /// The assembly source line the word at `address` came from.
  pub fn source_line(&self, address: Word) -> Option<usize> {
    let address = usize::try_from(address).ok()?;
    self.source_map.as_ref()?.get_by_left(&address).copied()
  }

  /// Memory contents in hex, with an arrow at the next word to fetch.
  pub fn memory_table(&self) -> Table {
    let pc = usize::try_from(self.processor.inspect().pc).ok();
    make_word_table("Cell", self.memory.cells(), pc)
  }

  /// Registers, PC and IR in hex.
  pub fn register_table(&self) -> Table {
    self.processor.register_table()
  }

  // endregion
}

impl Default for Machine {
  fn default() -> Machine {
    Machine::new(Config::default())
  }
}

impl Display for Machine {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let m_table = self.memory_table();
    let r_table = self.register_table();

    let mut combined_table = table!([m_table, r_table]);

    combined_table.set_titles(row![ub->"Memory", ub->"Processor"]);
    combined_table.set_format(*TABLE_DISPLAY_FORMAT);

    write!(f, "{}", combined_table)
  }
}
