//! The word store: a fixed number of word cells addressed from zero. It has no notion of
//! instructions or data; interpretation is entirely up to whoever reads a cell.

use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use crate::bytecode::Word;
use crate::error::MemoryError;
use crate::table::make_word_table;

pub const DEFAULT_CAPACITY: usize = 256;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WordStore {
  cells: Vec<Word>,
}

impl WordStore {

  pub fn new(capacity: usize) -> WordStore {
    WordStore { cells: vec![0; capacity] }
  }

  pub fn capacity(&self) -> usize {
    self.cells.len()
  }

  /// Converts an address to an index into `cells`. There is no wraparound: negative addresses
  /// and addresses at or past the capacity are errors.
  fn idx(&self, address: Word) -> Result<usize, MemoryError> {
    usize::try_from(address)
      .ok()
      .filter(|&i| i < self.cells.len())
      .ok_or(MemoryError::OutOfRange { address, capacity: self.cells.len() })
  }

  pub fn read(&self, address: Word) -> Result<Word, MemoryError> {
    let i = self.idx(address)?;
    Ok(self.cells[i])
  }

  pub fn write(&mut self, address: Word, value: Word) -> Result<(), MemoryError> {
    let i = self.idx(address)?;
    self.cells[i] = value;
    Ok(())
  }

  /// Every cell as `(address, value)`, in ascending address order.
  pub fn snapshot(&self) -> Vec<(usize, Word)> {
    self.cells.iter().copied().enumerate().collect()
  }

  pub fn clear(&mut self) {
    for cell in self.cells.iter_mut() {
      *cell = 0;
    }
  }

  /**
    Zeroes the store and copies `image` in from address 0. An image larger than the store is
    refused before anything is touched.
  */
  pub fn load_image(&mut self, image: &[Word]) -> Result<(), MemoryError> {
    if image.len() > self.cells.len() {
      return Err(MemoryError::ImageTooLarge { len: image.len(), capacity: self.cells.len() });
    }
    self.clear();
    self.cells[..image.len()].copy_from_slice(image);
    Ok(())
  }

  pub(crate) fn cells(&self) -> &[Word] {
    &self.cells
  }
}

impl Default for WordStore {
  fn default() -> WordStore {
    WordStore::new(DEFAULT_CAPACITY)
  }
}

impl Display for WordStore {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "Memory:\n{}", make_word_table("Cell", &self.cells, None))
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn new_store_is_zeroed() {
    let store = WordStore::default();
    assert_eq!(store.capacity(), DEFAULT_CAPACITY);
    assert!(store.snapshot().iter().all(|&(_, value)| value == 0));
  }

  #[test]
  fn write_then_read() {
    let mut store = WordStore::new(4);
    store.write(3, -7).unwrap();
    assert_eq!(store.read(3), Ok(-7));
    store.write(3, 9).unwrap();
    assert_eq!(store.read(3), Ok(9));
  }

  #[test]
  fn out_of_range_addresses_fail_without_wrapping() {
    let mut store = WordStore::new(4);
    assert_eq!(store.read(4), Err(MemoryError::OutOfRange { address: 4, capacity: 4 }));
    assert_eq!(store.read(-1), Err(MemoryError::OutOfRange { address: -1, capacity: 4 }));
    assert_eq!(store.write(100, 1), Err(MemoryError::OutOfRange { address: 100, capacity: 4 }));
    assert!(store.snapshot().iter().all(|&(_, value)| value == 0));
  }

  #[test]
  fn snapshot_is_in_address_order() {
    let mut store = WordStore::new(3);
    store.write(0, 10).unwrap();
    store.write(2, 0x2a).unwrap();
    assert_eq!(store.snapshot(), vec![(0, 10), (1, 0), (2, 0x2a)]);
  }

  #[test]
  fn load_image_replaces_previous_contents() {
    let mut store = WordStore::new(4);
    store.write(3, 99).unwrap();
    store.load_image(&[1, 2]).unwrap();
    assert_eq!(store.snapshot(), vec![(0, 1), (1, 2), (2, 0), (3, 0)]);
  }

  #[test]
  fn oversized_image_leaves_store_untouched() {
    let mut store = WordStore::new(2);
    store.write(1, 5).unwrap();
    assert_eq!(
      store.load_image(&[1, 2, 3]),
      Err(MemoryError::ImageTooLarge { len: 3, capacity: 2 })
    );
    assert_eq!(store.read(1), Ok(5));
  }

  #[test]
  fn dump_shows_hex_values() {
    let mut store = WordStore::new(2);
    store.write(1, 0x2a).unwrap();
    store.write(0, -1).unwrap();
    let dump = store.to_string();
    assert!(dump.contains("Cell[1] ="));
    assert!(dump.contains("2a"));
    assert!(dump.contains("ffffffff"));
  }
}
