//! CSV loading with automatic type inference.
//!
//! Reads delimited text into a [`DataFrame`](crate::dataframe::DataFrame).
//! Record reading is delegated to the `csv` crate; this module owns the
//! typing layer on top of it:
//!
//! - null markers recognized per field: empty, `NA`, `N/A`, `null`,
//!   `None`, `NaN` and case variants (configurable)
//! - inference priority per column: Numeric → Boolean → Categorical → Text
//! - low-cardinality strings are dictionary-encoded as Categorical
//!
//! # Example
//!
//! ```
//! use corrscan::csv_parser::CsvParser;
//! use corrscan::dataframe::DataType;
//!
//! let csv = "building,area,heated\nB-104,210.5,true\nB-209,88.0,false\n";
//! let df = CsvParser::new().parse_str(csv).unwrap();
//! assert_eq!(df.row_count(), 2);
//! assert_eq!(df.schema()[1], ("area", DataType::Numeric));
//! assert_eq!(df.schema()[2], ("heated", DataType::Boolean));
//! ```

use crate::dataframe::{Column, DataFrame, NullMask};
use crate::error::ScanError;
use std::collections::{HashMap, HashSet};

/// Field values read as missing.
const DEFAULT_NULL_MARKERS: &[&str] = &[
    "", "NA", "N/A", "na", "n/a", "null", "NULL", "None", "none", "NaN", "nan", "NAN",
];

/// A string column is dictionary-encoded when its distinct/observed ratio
/// stays below this bound.
const CATEGORICAL_RATIO: f64 = 0.5;

/// Upper bound on dictionary size for categorical encoding.
const MAX_DICTIONARY: usize = 1000;

/// CSV reader configuration and entry point.
///
/// ```
/// use corrscan::csv_parser::CsvParser;
///
/// let df = CsvParser::new().delimiter(b';').parse_str("a;b\n1;2\n").unwrap();
/// assert_eq!(df.column_names(), &["a", "b"]);
/// ```
#[derive(Debug, Clone)]
pub struct CsvParser {
    delimiter: u8,
    has_header: bool,
    null_markers: Vec<String>,
}

impl CsvParser {
    /// Parser with default settings: comma delimiter, header row,
    /// standard null markers.
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            has_header: true,
            null_markers: DEFAULT_NULL_MARKERS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }

    /// Sets the field delimiter.
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets whether the first record is a header row.
    pub fn has_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Replaces the null markers.
    pub fn null_markers(mut self, markers: Vec<String>) -> Self {
        self.null_markers = markers;
        self
    }

    /// Parses CSV text into a DataFrame.
    pub fn parse_str(&self, input: &str) -> Result<DataFrame, ScanError> {
        let input = input.strip_prefix('\u{feff}').unwrap_or(input);

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(self.has_header)
            .from_reader(input.as_bytes());

        let headers: Vec<String> = if self.has_header {
            reader
                .headers()
                .map_err(|e| ScanError::CsvParse {
                    line: 1,
                    message: e.to_string(),
                })?
                .iter()
                .map(|s| s.to_string())
                .collect()
        } else {
            Vec::new()
        };

        let mut raw_columns: Vec<Vec<String>> = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let line = i + if self.has_header { 2 } else { 1 };
            let record = record.map_err(|e| ScanError::CsvParse {
                line,
                message: e.to_string(),
            })?;
            if raw_columns.is_empty() {
                raw_columns = vec![Vec::new(); record.len()];
            }
            if record.len() != raw_columns.len() {
                return Err(ScanError::CsvParse {
                    line,
                    message: format!("expected {} fields, got {}", raw_columns.len(), record.len()),
                });
            }
            for (col, field) in record.iter().enumerate() {
                raw_columns[col].push(field.to_string());
            }
        }

        if raw_columns.is_empty() {
            return Ok(DataFrame::new());
        }

        let names: Vec<String> = if self.has_header {
            headers
        } else {
            (0..raw_columns.len()).map(|i| format!("col_{i}")).collect()
        };
        if names.len() != raw_columns.len() {
            return Err(ScanError::CsvParse {
                line: 1,
                message: format!(
                    "header has {} fields, records have {}",
                    names.len(),
                    raw_columns.len()
                ),
            });
        }

        let mut df = DataFrame::new();
        for (name, raw) in names.into_iter().zip(raw_columns.iter()) {
            df.add_column(name, self.build_column(raw))
                .expect("raw columns share one length");
        }
        Ok(df)
    }

    /// Reads and parses a CSV file.
    pub fn parse_file(&self, path: &str) -> Result<DataFrame, ScanError> {
        let content = std::fs::read_to_string(path)?;
        self.parse_str(&content)
    }

    // ── Typing layer ─────────────────────────────────────────────

    fn is_null(&self, field: &str) -> bool {
        let trimmed = field.trim();
        self.null_markers.iter().any(|m| m == trimmed)
    }

    /// Infers the column type from non-null fields and builds the column.
    fn build_column(&self, raw: &[String]) -> Column {
        let trimmed: Vec<&str> = raw.iter().map(|s| s.trim()).collect();
        let null_flags: Vec<bool> = trimmed.iter().map(|s| self.is_null(s)).collect();

        let non_null: Vec<&str> = trimmed
            .iter()
            .zip(&null_flags)
            .filter(|&(_, &null)| !null)
            .map(|(&v, _)| v)
            .collect();

        // All-null columns default to numeric.
        if non_null.is_empty() {
            return Column::numeric(vec![0.0; raw.len()], NullMask::all_null(raw.len()));
        }

        if non_null.iter().all(|s| s.parse::<f64>().is_ok()) {
            return build_numeric(&trimmed, &null_flags);
        }
        if non_null.iter().all(|s| parse_bool(s).is_some()) {
            return build_boolean(&trimmed, &null_flags);
        }

        let distinct: HashSet<&str> = non_null.iter().copied().collect();
        let ratio = distinct.len() as f64 / non_null.len() as f64;
        if ratio < CATEGORICAL_RATIO && distinct.len() <= MAX_DICTIONARY {
            build_categorical(&trimmed, &null_flags)
        } else {
            build_text(&trimmed, &null_flags)
        }
    }
}

impl Default for CsvParser {
    fn default() -> Self {
        Self::new()
    }
}

// ── Column builders ───────────────────────────────────────────────────

fn build_numeric(fields: &[&str], null_flags: &[bool]) -> Column {
    let mut values = Vec::with_capacity(fields.len());
    let mut nulls = NullMask::empty();
    for (&field, &null) in fields.iter().zip(null_flags) {
        if null {
            values.push(0.0);
            nulls.push(false);
        } else {
            values.push(field.parse::<f64>().unwrap_or(0.0));
            nulls.push(true);
        }
    }
    Column::numeric(values, nulls)
}

fn build_boolean(fields: &[&str], null_flags: &[bool]) -> Column {
    let mut values = Vec::with_capacity(fields.len());
    let mut nulls = NullMask::empty();
    for (&field, &null) in fields.iter().zip(null_flags) {
        if null {
            values.push(false);
            nulls.push(false);
        } else {
            values.push(parse_bool(field).unwrap_or(false));
            nulls.push(true);
        }
    }
    Column::boolean(values, nulls)
}

fn build_categorical(fields: &[&str], null_flags: &[bool]) -> Column {
    let mut lookup: HashMap<&str, u32> = HashMap::new();
    let mut dictionary: Vec<String> = Vec::new();
    let mut codes = Vec::with_capacity(fields.len());
    let mut nulls = NullMask::empty();
    for (&field, &null) in fields.iter().zip(null_flags) {
        if null {
            codes.push(0);
            nulls.push(false);
            continue;
        }
        let code = *lookup.entry(field).or_insert_with(|| {
            dictionary.push(field.to_string());
            (dictionary.len() - 1) as u32
        });
        codes.push(code);
        nulls.push(true);
    }
    Column::categorical(dictionary, codes, nulls)
}

fn build_text(fields: &[&str], null_flags: &[bool]) -> Column {
    let mut values = Vec::with_capacity(fields.len());
    let mut nulls = NullMask::empty();
    for (&field, &null) in fields.iter().zip(null_flags) {
        if null {
            values.push(String::new());
            nulls.push(false);
        } else {
            values.push(field.to_string());
            nulls.push(true);
        }
    }
    Column::text(values, nulls)
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "yes" | "t" | "y" => Some(true),
        "false" | "no" | "f" | "n" => Some(false),
        _ => None,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataframe::DataType;

    #[test]
    fn simple_frame() {
        let df = CsvParser::new().parse_str("a,b\n1,2\n3,4\n").unwrap();
        assert_eq!(df.row_count(), 2);
        assert_eq!(df.column_names(), &["a", "b"]);
        let a = df.column_by_name("a").unwrap();
        assert_eq!(a.as_numeric().unwrap(), &[1.0, 3.0]);
    }

    #[test]
    fn numeric_inference_with_signs_and_exponents() {
        let df = CsvParser::new()
            .parse_str("x\n-1.5\n2.3e4\n0\n")
            .unwrap();
        let x = df.column_by_name("x").unwrap();
        assert_eq!(x.data_type(), DataType::Numeric);
        assert_eq!(x.as_numeric().unwrap(), &[-1.5, 2.3e4, 0.0]);
    }

    #[test]
    fn boolean_inference_mixed_spellings() {
        let df = CsvParser::new()
            .parse_str("flag\ntrue\nNo\nY\nf\n")
            .unwrap();
        let flag = df.column_by_name("flag").unwrap();
        assert_eq!(flag.data_type(), DataType::Boolean);
    }

    #[test]
    fn categorical_inference_low_cardinality() {
        // 2 distinct / 5 observed = 0.4 < 0.5
        let df = CsvParser::new()
            .parse_str("zone\nN\nS\nN\nS\nN\n")
            .unwrap();
        let zone = df.column_by_name("zone").unwrap();
        assert_eq!(zone.data_type(), DataType::Categorical);
        assert_eq!(zone.distinct_count(), 2);
    }

    #[test]
    fn text_inference_high_cardinality() {
        let df = CsvParser::new()
            .parse_str("id\nB-1\nB-2\nB-3\nB-4\n")
            .unwrap();
        assert_eq!(
            df.column_by_name("id").unwrap().data_type(),
            DataType::Text
        );
    }

    #[test]
    fn null_markers_become_mask_nulls() {
        let df = CsvParser::new()
            .parse_str("x\n1.0\nNA\n3.0\n\n5.0\nnan\n")
            .unwrap();
        let x = df.column_by_name("x").unwrap();
        assert_eq!(x.data_type(), DataType::Numeric);
        assert_eq!(x.null_count(), 3);
        assert!(!x.is_valid(1));
        assert!(!x.is_valid(3));
        assert!(!x.is_valid(5));
    }

    #[test]
    fn all_null_column_defaults_to_numeric() {
        let df = CsvParser::new().parse_str("x\nNA\nnull\n").unwrap();
        let x = df.column_by_name("x").unwrap();
        assert_eq!(x.data_type(), DataType::Numeric);
        assert_eq!(x.null_count(), 2);
    }

    #[test]
    fn custom_null_markers() {
        let df = CsvParser::new()
            .null_markers(vec!["-999".to_string()])
            .parse_str("x\n1\n-999\n3\n")
            .unwrap();
        assert_eq!(df.column_by_name("x").unwrap().null_count(), 1);
    }

    #[test]
    fn quoted_fields_pass_through() {
        let df = CsvParser::new()
            .parse_str("name,note\nB-1,\"big, drafty\"\nB-2,small\n")
            .unwrap();
        let note = df.column_by_name("note").unwrap();
        assert_eq!(
            note.cell(0),
            Some(crate::dataframe::CellValue::Str("big, drafty"))
        );
    }

    #[test]
    fn bom_is_stripped() {
        let df = CsvParser::new().parse_str("\u{feff}a\n1\n").unwrap();
        assert_eq!(df.column_names(), &["a"]);
    }

    #[test]
    fn without_header_names_are_synthesized() {
        let df = CsvParser::new()
            .has_header(false)
            .parse_str("1,2\n3,4\n")
            .unwrap();
        assert_eq!(df.column_names(), &["col_0", "col_1"]);
        assert_eq!(df.row_count(), 2);
    }

    #[test]
    fn ragged_record_is_an_error() {
        let err = CsvParser::new().parse_str("a,b\n1,2\n3\n").unwrap_err();
        assert!(matches!(err, ScanError::CsvParse { .. }));
    }

    #[test]
    fn empty_input_yields_empty_frame() {
        let df = CsvParser::new().parse_str("").unwrap();
        assert!(df.is_empty());
        let df = CsvParser::new().parse_str("a,b\n").unwrap();
        assert!(df.is_empty());
    }

    #[test]
    fn fields_are_trimmed_before_typing() {
        let df = CsvParser::new().parse_str("x\n 1.5 \n 2.5 \n").unwrap();
        let x = df.column_by_name("x").unwrap();
        assert_eq!(x.data_type(), DataType::Numeric);
        assert_eq!(x.as_numeric().unwrap(), &[1.5, 2.5]);
    }
}
