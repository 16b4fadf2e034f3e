//! Exploratory profiling of raw tabular data.
//!
//! Unlike the [`association`](crate::association) layer, which cleans its
//! input first, profiling tolerates dirty data — missing values are
//! expected input, not errors. Three views are provided:
//!
//! - [`missing_value_audit`] — per-column counts of missing and
//!   missing-looking values (mask nulls, `"NaN"`-style sentinel strings,
//!   empty strings, whitespace-only strings) with a total and percentage
//! - [`identify_column_roles`] — the coarse role of each column (binary,
//!   categorical, continuous, unknown)
//! - [`numeric_summary`] — mean, median, and standard deviation of a
//!   numeric column's observed values
//!
//! # Example
//!
//! ```
//! use corrscan::csv_parser::CsvParser;
//! use corrscan::profiling::missing_value_audit;
//!
//! let csv = "x,zone\n1.0,N\nNA,S\n3.0,N\n4.0,S\n";
//! let df = CsvParser::new().parse_str(csv).unwrap();
//! let audit = missing_value_audit(&df);
//!
//! assert_eq!(audit[0].name, "x");
//! assert_eq!(audit[0].null_count, 1);
//! assert_eq!(audit[0].missing_pct, 25.0);
//! ```

use crate::dataframe::{Column, DataFrame};

/// Sentinel strings counted as missing-looking by the audit.
const NAN_SENTINELS: &[&str] = &["NaN", "nan", "none"];

/// Distinct-value bound of the role cascade: a numeric column with fewer
/// distinct values than this acts as categorical.
const ROLE_DISTINCT_BOUND: usize = 10;

// ── Missing-value audit ───────────────────────────────────────────────

/// Missing-value counts for one column.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingAudit {
    /// Column name.
    pub name: String,
    /// Values missing in the null mask.
    pub null_count: usize,
    /// Observed string values equal to a NaN sentinel.
    pub nan_string_count: usize,
    /// Observed empty strings.
    pub empty_count: usize,
    /// Observed whitespace-only (non-empty) strings.
    pub whitespace_count: usize,
    /// Sum of the four counts above.
    pub total_missing: usize,
    /// `total_missing` as a percentage of rows, rounded to 2 decimals.
    pub missing_pct: f64,
}

/// Audits every column for missing and missing-looking values.
///
/// Mask nulls are counted for all columns; the three string categories
/// apply to string-typed columns only. Note that a frame loaded through
/// [`CsvParser`](crate::csv_parser::CsvParser) with default null markers
/// already converts the sentinels to mask nulls, so the string counts
/// pick up only what the load kept as data.
pub fn missing_value_audit(df: &DataFrame) -> Vec<MissingAudit> {
    df.iter()
        .map(|(name, col)| audit_column(name, col, df.row_count()))
        .collect()
}

fn audit_column(name: &str, col: &Column, row_count: usize) -> MissingAudit {
    let null_count = col.null_count();
    let mut nan_string_count = 0;
    let mut empty_count = 0;
    let mut whitespace_count = 0;

    let mut inspect = |s: &str| {
        if NAN_SENTINELS.contains(&s) {
            nan_string_count += 1;
        } else if s.is_empty() {
            empty_count += 1;
        } else if s.chars().all(char::is_whitespace) {
            whitespace_count += 1;
        }
    };

    match col {
        Column::Categorical {
            dictionary,
            codes,
            nulls,
        } => {
            for idx in nulls.valid_indices() {
                inspect(&dictionary[codes[idx] as usize]);
            }
        }
        Column::Text { values, nulls } => {
            for idx in nulls.valid_indices() {
                inspect(&values[idx]);
            }
        }
        Column::Numeric { .. } | Column::Boolean { .. } => {}
    }

    let total_missing = null_count + nan_string_count + empty_count + whitespace_count;
    let missing_pct = if row_count > 0 {
        round2(total_missing as f64 / row_count as f64 * 100.0)
    } else {
        0.0
    };

    MissingAudit {
        name: name.to_string(),
        null_count,
        nan_string_count,
        empty_count,
        whitespace_count,
        total_missing,
        missing_pct,
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

// ── Column roles ──────────────────────────────────────────────────────

/// Coarse role of a column in exploratory analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    /// Exactly two distinct observed values, whatever the storage type.
    Binary,
    /// Group labels: strings, or low-cardinality numerics.
    Categorical,
    /// Numeric values compared by magnitude.
    Continuous,
    /// Nothing above applied.
    Unknown,
}

impl std::fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Binary => write!(f, "Binary"),
            Self::Categorical => write!(f, "Categorical"),
            Self::Continuous => write!(f, "Continuous"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Determines the role of a single column.
///
/// Cascade order matters: the binary check runs first, so a two-valued
/// numeric or string column is Binary, not Categorical. A numeric column
/// with fewer than 10 distinct values is Categorical. The analyzer's
/// classifier ([`classify`](crate::association::classify)) turns
/// continuous at *more than* 10 distinct values, so the two disagree at
/// exactly 10.
pub fn column_role(col: &Column) -> ColumnRole {
    if col.distinct_count() == 2 {
        return ColumnRole::Binary;
    }
    match col {
        Column::Categorical { .. } | Column::Text { .. } => ColumnRole::Categorical,
        Column::Numeric { .. } if col.distinct_count() < ROLE_DISTINCT_BOUND => {
            ColumnRole::Categorical
        }
        Column::Numeric { .. } => ColumnRole::Continuous,
        Column::Boolean { .. } => ColumnRole::Unknown,
    }
}

/// Roles for every column, in column order.
///
/// ```
/// use corrscan::csv_parser::CsvParser;
/// use corrscan::profiling::{identify_column_roles, ColumnRole};
///
/// let csv = "zone,floors\nN,1\nS,2\nN,3\nS,1\nN,2\n";
/// let df = CsvParser::new().parse_str(csv).unwrap();
/// let roles = identify_column_roles(&df);
///
/// assert_eq!(roles[0], ("zone".to_string(), ColumnRole::Binary));
/// assert_eq!(roles[1], ("floors".to_string(), ColumnRole::Categorical));
/// ```
pub fn identify_column_roles(df: &DataFrame) -> Vec<(String, ColumnRole)> {
    df.iter()
        .map(|(name, col)| (name.to_string(), column_role(col)))
        .collect()
}

// ── Numeric summary ───────────────────────────────────────────────────

/// Location and spread of a numeric column's observed values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericSummary {
    /// Number of observed values.
    pub valid_count: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Median.
    pub median: f64,
    /// Sample standard deviation.
    pub std_dev: f64,
}

/// Summarizes a numeric column over its observed values.
///
/// Returns `None` for non-numeric columns and for columns with no
/// observed values.
pub fn numeric_summary(col: &Column) -> Option<NumericSummary> {
    let valid = col.valid_numeric_values()?;
    if valid.is_empty() {
        return None;
    }
    Some(NumericSummary {
        valid_count: valid.len(),
        mean: u_numflow::stats::mean(&valid).unwrap_or(f64::NAN),
        median: u_numflow::stats::median(&valid).unwrap_or(f64::NAN),
        std_dev: u_numflow::stats::std_dev(&valid).unwrap_or(f64::NAN),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────
