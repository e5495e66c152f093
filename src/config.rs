/*!
  Simulator configuration.

  Values come from, in increasing priority:

    1. Built-in defaults
    2. Environment variables (`MICRO1_CAPACITY`, `MICRO1_STEP_BUDGET`, `MICRO1_PERSIST`)
    3. Command-line flags, applied by the binary on top of `Config::load()`

  A malformed environment value is ignored with a warning rather than failing startup.
*/

use std::env;
use std::str::FromStr;

use log::{debug, warn};

use crate::memory::DEFAULT_CAPACITY;

pub const CAPACITY_VAR    : &str = "MICRO1_CAPACITY";
pub const STEP_BUDGET_VAR : &str = "MICRO1_STEP_BUDGET";
pub const PERSIST_VAR     : &str = "MICRO1_PERSIST";

pub const DEFAULT_STEP_BUDGET: usize = 10_000;
pub const DEFAULT_ASSEMBLY_EXTENSION: &str = "asm";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
  /// Number of words in the store.
  pub capacity           : usize,
  /// Most steps a `run` executes before giving up on reaching `halt`.
  pub step_budget        : usize,
  /// Write assembled programs to a sibling `.hex` file.
  pub persist_assembly   : bool,
  /// Files with this extension (case-insensitive) are assembled; all others are read as hex.
  pub assembly_extension : String,
}

impl Default for Config {
  fn default() -> Config {
    Config {
      capacity           : DEFAULT_CAPACITY,
      step_budget        : DEFAULT_STEP_BUDGET,
      persist_assembly   : false,
      assembly_extension : DEFAULT_ASSEMBLY_EXTENSION.to_string(),
    }
  }
}

impl Config {

  /// Defaults overridden by the environment.
  pub fn load() -> Config {
    let mut config = Config::default();
    config.apply_overrides(|name| env::var(name).ok());
    debug!("Loaded configuration: {:?}", config);
    config
  }

  /// Applies overrides from any key/value source; `lookup` returns `None` for unset keys.
  pub fn apply_overrides<F>(&mut self, lookup: F)
    where F: Fn(&str) -> Option<String>
  {
    if let Some(capacity) = parse_override::<usize>(CAPACITY_VAR, lookup(CAPACITY_VAR)) {
      match capacity {
        0 => warn!("Ignoring {}: memory needs at least one word", CAPACITY_VAR),
        _ => self.capacity = capacity
      }
    }
    if let Some(budget) = parse_override::<usize>(STEP_BUDGET_VAR, lookup(STEP_BUDGET_VAR)) {
      self.step_budget = budget;
    }
    if let Some(value) = lookup(PERSIST_VAR) {
      match parse_flag(&value) {
        Some(persist) => self.persist_assembly = persist,
        None          => warn!("Ignoring {}: `{}` is not a boolean", PERSIST_VAR, value)
      }
    }
  }
}

fn parse_override<T: FromStr>(name: &str, value: Option<String>) -> Option<T> {
  let value = value?;
  match value.trim().parse::<T>() {
    Ok(parsed) => Some(parsed),
    Err(_)     => {
      warn!("Ignoring {}: `{}` is not a valid value", name, value);
      None
    }
  }
}

fn parse_flag(value: &str) -> Option<bool> {
  match value.trim().to_ascii_lowercase().as_str() {
    "1" | "true" | "yes" | "on"  => Some(true),
    "0" | "false" | "no" | "off" => Some(false),
    _                            => None
  }
}
