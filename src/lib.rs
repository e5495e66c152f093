/*!

  An assembler and instruction-set simulator for the Micro-1, a small processor with sixteen
  opcodes, eight registers and a word-addressed memory.

  The pipeline is:
    ```text
    source text -> [`loader::assemble`] -> `Program` -> [`Machine::load_program`] ->⋯

    ⋯-> `WordStore` <-> [`Processor::step`], one instruction per call
    ```
  Files that are not assembly are read as hexadecimal words and skip the assembler. Everything a
  driver needs (loading, stepping, inspecting, dumping) goes through `Machine`.

*/

#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;

pub mod bytecode;
pub mod config;
pub mod error;
pub mod loader;
pub mod machine;
pub mod memory;
pub mod processor;
pub mod register;
pub mod shell;
mod table;

pub use crate::bytecode::{Instruction, Opcode, Word};
pub use crate::config::Config;
pub use crate::error::{AssemblyError, DecodeError, LoadError, MemoryError};
pub use crate::loader::Program;
pub use crate::machine::{Machine, RunSummary};
pub use crate::memory::WordStore;
pub use crate::processor::{CpuState, Diagnostic, Processor, Status};
pub use crate::register::Register;
