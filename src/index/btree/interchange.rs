//! `"key,value"` text interchange used by extract and load.
//!
//! One entry per line, decimal integers, no header line.

use std::io::Write;

use crate::common::{Error, Result};

/// Outcome of a bulk load.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Lines inserted as new entries.
    pub inserted: usize,
    /// Keys that were already present, in input order. Their stored values
    /// were left untouched.
    pub skipped: Vec<u64>,
}

/// Parse one `"<key>,<value>"` line. `line_no` is 1-based, for the error.
///
/// Whitespace around either number is ignored.
///
/// # Errors
/// Returns `Error::MalformedInput` unless the line holds exactly two
/// unsigned integers separated by a comma.
pub fn parse_line(line_no: usize, line: &str) -> Result<(u64, u64)> {
    let malformed = || Error::MalformedInput {
        line: line_no,
        content: line.to_string(),
    };

    let (key, value) = line.trim().split_once(',').ok_or_else(malformed)?;
    let key = key.trim().parse::<u64>().map_err(|_| malformed())?;
    let value = value.trim().parse::<u64>().map_err(|_| malformed())?;
    Ok((key, value))
}

/// Write one entry as a `"<key>,<value>\n"` line.
pub fn write_line<W: Write>(out: &mut W, key: u64, value: u64) -> Result<()> {
    writeln!(out, "{},{}", key, value)?;
    Ok(())
}
