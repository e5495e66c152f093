//! Table rendering shared by the memory and register dumps.

use prettytable::{format as TableFormat, Table};

use crate::bytecode::Word;

lazy_static! {
  pub static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

/**
  Builds an `Address │ Contents` table for a run of words, with contents in hexadecimal. The row
  at `highlight`, if any, gets an arrow; the machine uses it to mark the program counter.
*/
pub fn make_word_table<'a, I>(name: &str, words: I, highlight: Option<usize>) -> Table
  where I: IntoIterator<Item = &'a Word>
{
  let mut table = Table::new();

  table.set_format(*TABLE_DISPLAY_FORMAT);
  table.set_titles(row![ubr->"Address", ubl->"Contents"]);

  for (i, word) in words.into_iter().enumerate() {
    match Some(i) == highlight {

      true  => {
        table.add_row(row![r->format!("* --> {}[{}] =", name, i), format!("{:x}", word)]);
      }

      false => {
        table.add_row(row![r->format!("{}[{}] =", name, i), format!("{:x}", word)]);
      }

    } // end match on highlight
  } // end for
  table
}
