//! Error types for corrscan.

use std::fmt;

/// All errors produced by corrscan operations.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanError {
    /// CSV parsing failed.
    CsvParse { line: usize, message: String },
    /// Column length does not match the rest of the table.
    DimensionMismatch { expected: usize, actual: usize },
    /// A statistical test declined to produce a result for a column pair.
    ///
    /// Raised for degeneracies the analysis does not anticipate, e.g. a
    /// normality test on a group with fewer than three observations.
    TestFailure {
        test: &'static str,
        column_a: String,
        column_b: String,
    },
    /// I/O error during file reading.
    Io(String),
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CsvParse { line, message } => {
                write!(f, "CSV parse error at line {line}: {message}")
            }
            Self::DimensionMismatch { expected, actual } => {
                write!(f, "expected {expected} rows, got {actual}")
            }
            Self::TestFailure {
                test,
                column_a,
                column_b,
            } => {
                write!(
                    f,
                    "{test} test failed for columns '{column_a}' and '{column_b}'"
                )
            }
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for ScanError {}

impl From<std::io::Error> for ScanError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
