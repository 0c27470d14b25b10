//! Human-readable and JSON renderings of a resolved equation set

use crate::resolver::SolutionEntry;
use std::fmt;
use std::io::{self, Write};

/// The OPTION report: a blank separator line, then one block per equation
///
/// ```text
///
/// OPTION 0
/// From Equation: Eq(a_tan, r*alpha):
/// a_tan = [6]
/// ```
pub struct Report<'a> {
    target: &'a str,
    entries: &'a [SolutionEntry],
}

impl<'a> Report<'a> {
    pub fn new(target: &'a str, entries: &'a [SolutionEntry]) -> Self {
        Self { target, entries }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        for entry in self.entries {
            writeln!(f)?;
            writeln!(f, "OPTION {}", entry.index)?;
            writeln!(f, "From Equation: {}:", entry.equation)?;
            writeln!(f, "{} = {}", self.target, entry.resolution)?;
        }
        Ok(())
    }
}

pub fn render(target: &str, entries: &[SolutionEntry]) -> String {
    Report::new(target, entries).to_string()
}

pub fn write_report<W: Write>(out: &mut W, target: &str, entries: &[SolutionEntry]) -> io::Result<()> {
    write!(out, "{}", Report::new(target, entries))?;
    out.flush()
}

/// Entries as a pretty-printed JSON array
pub fn to_json(entries: &[SolutionEntry]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(entries)
}
