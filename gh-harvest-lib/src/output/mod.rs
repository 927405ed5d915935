//! Input and output files.
//!
//! - [`read_identifiers`]: the deduplicated logins from the input CSV
//! - [`CsvSink`]: the concurrent, block-atomic CSV writer plus the error log

mod input;
mod sink;

pub use input::{DEFAULT_LOGIN_COLUMN, parse_identifiers, read_identifiers};
pub use sink::CsvSink;
