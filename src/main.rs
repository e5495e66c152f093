use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::info;

use micro1::shell::Shell;
use micro1::{Config, Machine, Status};

/// Assembler and simulator for the Micro-1 processor.
#[derive(Parser, Debug)]
#[command(name = "micro1", version, about)]
struct Cli {
  /// Program to load. `.asm` files are assembled; anything else is read as hex words.
  file: Option<PathBuf>,

  /// Number of words of memory.
  #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
  capacity: Option<u32>,

  /// Most instructions `run` executes before giving up.
  #[arg(long)]
  steps: Option<usize>,

  /// Write assembled programs next to their source as `.hex`.
  #[arg(long)]
  persist: bool,

  /// Run FILE to halt and dump the machine instead of starting the console.
  #[arg(long, requires = "file")]
  run: bool,
}

impl Cli {
  fn apply(&self, config: &mut Config) {
    if let Some(capacity) = self.capacity {
      config.capacity = capacity as usize;
    }
    if let Some(steps) = self.steps {
      config.step_budget = steps;
    }
    if self.persist {
      config.persist_assembly = true;
    }
  }
}

fn main() -> anyhow::Result<()> {
  env_logger::init();

  let cli = Cli::parse();
  let mut config = Config::load();
  cli.apply(&mut config);

  let mut machine = Machine::new(config);

  if let Some(path) = &cli.file {
    let program = machine
      .load_file(path)
      .with_context(|| format!("failed to load {}", path.display()))?;
    if let Some(e) = &program.persist_error {
      eprintln!("warning: assembled words were not saved: {}", e);
    }
  }

  if cli.run {
    let summary = machine.run_to_halt()?;
    match summary.status {
      Status::Halted  => info!("Halted after {} steps", summary.executed),
      Status::Running => eprintln!("warning: step budget of {} exhausted", summary.executed),
    }
    println!("{}", machine);
    return Ok(());
  }

  let stdin = io::stdin();
  let mut stdout = io::stdout();
  Shell::new(machine).control_loop(stdin.lock(), &mut stdout)?;
  Ok(())
}
