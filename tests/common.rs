//! Shared helpers for the integration tests.
use std::fs;
use std::path::{Path, PathBuf};

use micro1::loader::assemble;
use micro1::{Machine, Register};

pub fn r(index: u8) -> Register {
  Register::new(index).unwrap()
}

/// A default machine with `text` assembled into memory.
#[allow(dead_code)]
pub fn machine_with(text: &str) -> Machine {
  let mut machine = Machine::default();
  machine.load_program(&assemble(text).unwrap()).unwrap();
  machine
}

/// A fresh directory under the system temp dir, removed with everything in it when dropped.
#[allow(dead_code)]
pub struct ScratchDir {
  path: PathBuf,
}

#[allow(dead_code)]
impl ScratchDir {
  /// `test_name` keeps concurrently running tests out of each other's way.
  pub fn new(test_name: &str) -> ScratchDir {
    let path = std::env::temp_dir().join(format!("micro1-{}-{}", test_name, std::process::id()));
    let _ = fs::remove_dir_all(&path);
    fs::create_dir_all(&path).unwrap();
    ScratchDir { path }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn join<P: AsRef<Path>>(&self, name: P) -> PathBuf {
    self.path.join(name)
  }
}

impl Drop for ScratchDir {
  fn drop(&mut self) {
    let _ = fs::remove_dir_all(&self.path);
  }
}
