/*!
  The interactive console. It is a thin adapter: every command is one call into `Machine`
  followed by printing the result. The loop reads from any `BufRead` and writes to any `Write`
  so that it can be driven by a terminal or by a test.

  Commands:

    load FILE   loads an assembly or hex file into memory
    memory      dumps memory
    registers   dumps registers, PC and IR
    step N      executes the next N instructions or until halt
    run         executes until halt, within the configured step budget
    reset       zeroes memory and registers
    help        displays the command list
    quit        leaves the console
*/

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::str::FromStr;

use strum_macros::EnumString;

use crate::machine::{Machine, RunSummary};
use crate::processor::Status;

const PROMPT: &str = "-> ";

#[derive(EnumString, Copy, Clone, Debug, Eq, PartialEq)]
enum Command {
  #[strum(serialize = "load")]      Load,
  #[strum(serialize = "memory")]    Memory,
  #[strum(serialize = "registers")] Registers,
  #[strum(serialize = "step")]      Step,
  #[strum(serialize = "run")]       Run,
  #[strum(serialize = "reset")]     Reset,
  #[strum(serialize = "help")]      Help,
  #[strum(serialize = "quit")]      Quit,
}

/// Whether the control loop should keep reading commands.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Flow {
  Continue,
  Quit,
}

/// How a batch of steps ended.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Outcome {
  Halted,
  Failed,
  /// Every requested step ran and the program is still going.
  Exhausted,
}

pub struct Shell {
  machine: Machine,
}

impl Shell {

  pub fn new(machine: Machine) -> Shell {
    Shell { machine }
  }

  pub fn machine(&self) -> &Machine {
    &self.machine
  }

  pub fn machine_mut(&mut self) -> &mut Machine {
    &mut self.machine
  }

  /**
    The read-execute-print loop: display a prompt, read a command, execute it, display the
    result. Ends on `quit` or at the end of input. Only failures to read or write the console
    itself are returned; every machine error is reported and the loop carries on.
  */
  pub fn control_loop<R, W>(&mut self, input: R, output: &mut W) -> io::Result<()>
    where R: BufRead, W: Write
  {
    writeln!(output, "type \"help\" for commands")?;
    let mut lines = input.lines();
    loop {
      write!(output, "{}", PROMPT)?;
      output.flush()?;

      let line = match lines.next() {
        Some(line) => line?,
        None       => break
      };
      if self.execute(&line, output)? == Flow::Quit {
        break;
      }
    }
    writeln!(output, "bye")
  }

  /// Executes one command line.
  pub fn execute<W: Write>(&mut self, line: &str, output: &mut W) -> io::Result<Flow> {
    let mut words = line.split_whitespace();
    let name = match words.next() {
      Some(name) => name,
      None       => return Ok(Flow::Continue)
    };
    let argument = words.next();

    let command = match Command::from_str(name) {
      Ok(command) => command,
      Err(_)      => {
        writeln!(output, "unrecognized command: {}", name)?;
        return Ok(Flow::Continue);
      }
    };

    match command {

      Command::Load => match argument {
        Some(path) => self.load(Path::new(path), output)?,
        None       => writeln!(output, "usage: load FILE")?
      },

      Command::Memory => writeln!(output, "{}", self.machine.memory_table())?,

      Command::Registers => writeln!(output, "{}", self.machine.register_table())?,

      Command::Step => match argument.and_then(|n| n.parse::<usize>().ok()) {
        Some(count) => {
          self.step(count, output)?;
          writeln!(output, "done")?;
        }
        None        => writeln!(output, "invalid number of steps")?
      },

      Command::Run => {
        let budget = self.machine.config().step_budget;
        if self.step(budget, output)? == Outcome::Exhausted {
          writeln!(output, "warning: step budget of {} exhausted", budget)?;
        }
        writeln!(output, "done")?;
      }

      Command::Reset => {
        self.machine.reset();
        writeln!(output, "done")?;
      }

      Command::Help => help(output)?,

      Command::Quit => return Ok(Flow::Quit),

    }
    Ok(Flow::Continue)
  }

  fn load<W: Write>(&mut self, path: &Path, output: &mut W) -> io::Result<()> {
    match self.machine.load_file(path) {
      Ok(program) => {
        if let Some(e) = &program.persist_error {
          writeln!(output, "warning: assembled words were not saved: {}", e)?;
        }
        writeln!(output, "done")
      }
      Err(e) => writeln!(output, "{}", e)
    }
  }

  /// Steps one instruction at a time so that every diagnostic is reported as it happens.
  fn step<W: Write>(&mut self, count: usize, output: &mut W) -> io::Result<Outcome> {
    for _ in 0..count {
      let result = self.machine.run(1);
      if let Some(diagnostic) = self.machine.last_diagnostic() {
        writeln!(output, "{}", diagnostic)?;
      }
      match result {
        Ok(RunSummary { status: Status::Halted, .. }) => {
          writeln!(output, "program terminated")?;
          return Ok(Outcome::Halted);
        }
        Ok(_)  => {}
        Err(e) => {
          writeln!(output, "error: {}", e)?;
          return Ok(Outcome::Failed);
        }
      }
    }
    Ok(Outcome::Exhausted)
  }
}

fn help<W: Write>(output: &mut W) -> io::Result<()> {
  writeln!(output, "load fileName \t loads an assembly (.asm) or hex memory image into memory")?;
  writeln!(output, "memory \t\t dumps memory to console")?;
  writeln!(output, "registers \t dumps registers to console")?;
  writeln!(output, "step N \t\t executes next N instructions or until halt")?;
  writeln!(output, "run \t\t executes until halt")?;
  writeln!(output, "reset \t\t clears memory and registers")?;
  writeln!(output, "help \t\t displays this message")?;
  writeln!(output, "quit \t\t terminate console")
}
