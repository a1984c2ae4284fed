//! CSV reading helpers shared by the table loaders.

pub(crate) mod cell;
pub mod header;
pub mod reader;

pub use header::{DeathHeaders, INDEX_COLUMNS, normalize_header};
pub use reader::{read_csv_table, validate_encoding};
