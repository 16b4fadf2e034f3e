//! Column-major tabular data model.
//!
//! A [`DataFrame`] holds named, typed columns of equal length. Missing
//! values are tracked per column by a bit-packed [`NullMask`], so the
//! stored value arrays stay dense.
//!
//! The model supports the two views the analysis layer needs: a typed
//! per-cell view ([`CellValue`], hashable so cells can key
//! cross-tabulations and group maps) and whole-row filtering
//! ([`DataFrame::drop_null_rows`], which materializes the fully-observed
//! subset of the data).
//!
//! # Example
//!
//! ```
//! use corrscan::dataframe::{Column, DataFrame, NullMask};
//!
//! let mut df = DataFrame::new();
//! df.add_column(
//!     "load".to_string(),
//!     Column::numeric(vec![120.5, 98.2, 143.0], NullMask::all_valid(3)),
//! ).unwrap();
//! assert_eq!(df.row_count(), 3);
//! assert_eq!(df.column_count(), 1);
//! ```

use crate::error::ScanError;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

// ── NullMask ──────────────────────────────────────────────────────────

/// Bit-packed per-row validity, one bit per row in `Vec<u64>` words.
///
/// A set bit means the row holds an observed value; a cleared bit means
/// the value is missing.
#[derive(Debug, Clone, PartialEq)]
pub struct NullMask {
    words: Vec<u64>,
    len: usize,
}

impl NullMask {
    /// Mask of length `len` with every row observed.
    pub fn all_valid(len: usize) -> Self {
        let n_words = len.div_ceil(64);
        let mut words = vec![u64::MAX; n_words];
        let trailing = len % 64;
        if trailing != 0 && n_words > 0 {
            words[n_words - 1] = (1u64 << trailing) - 1;
        }
        Self { words, len }
    }

    /// Mask of length `len` with every row missing.
    pub fn all_null(len: usize) -> Self {
        Self {
            words: vec![0u64; len.div_ceil(64)],
            len,
        }
    }

    /// Empty mask, to be grown with [`push`](Self::push).
    pub fn empty() -> Self {
        Self {
            words: Vec::new(),
            len: 0,
        }
    }

    /// Whether the value at `idx` is observed.
    #[inline]
    pub fn is_valid(&self, idx: usize) -> bool {
        debug_assert!(idx < self.len, "index {idx} out of bounds (len={})", self.len);
        (self.words[idx / 64] >> (idx % 64)) & 1 == 1
    }

    /// Marks the value at `idx` as missing.
    pub fn set_null(&mut self, idx: usize) {
        debug_assert!(idx < self.len, "index {idx} out of bounds (len={})", self.len);
        self.words[idx / 64] &= !(1u64 << (idx % 64));
    }

    /// Appends one row, observed or missing.
    pub fn push(&mut self, valid: bool) {
        let idx = self.len;
        self.len += 1;
        if idx / 64 >= self.words.len() {
            self.words.push(0);
        }
        if valid {
            self.words[idx / 64] |= 1u64 << (idx % 64);
        }
    }

    /// Number of tracked rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the mask tracks zero rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of missing rows.
    pub fn null_count(&self) -> usize {
        let observed: usize = self.words.iter().map(|w| w.count_ones() as usize).sum();
        self.len - observed
    }

    /// Number of observed rows.
    pub fn valid_count(&self) -> usize {
        self.len - self.null_count()
    }

    /// Iterator over the indices of observed rows, ascending.
    pub fn valid_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(|&i| self.is_valid(i))
    }
}

// ── DataType ──────────────────────────────────────────────────────────

/// Storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// `f64` values.
    Numeric,
    /// True/false values.
    Boolean,
    /// Dictionary-encoded low-cardinality strings.
    Categorical,
    /// Free-form strings.
    Text,
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Numeric => write!(f, "Numeric"),
            Self::Boolean => write!(f, "Boolean"),
            Self::Categorical => write!(f, "Categorical"),
            Self::Text => write!(f, "Text"),
        }
    }
}

// ── CellValue ─────────────────────────────────────────────────────────

/// A typed view of one observed cell.
///
/// Equality and hashing of numeric cells use the `f64` bit pattern, so a
/// `CellValue` can key a `HashMap` (for cross-tabulation and grouping)
/// with the same identity the distinct-value count uses.
#[derive(Debug, Clone, Copy)]
pub enum CellValue<'a> {
    Num(f64),
    Bool(bool),
    Str(&'a str),
}

impl PartialEq for CellValue<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Num(a), Self::Num(b)) => a.to_bits() == b.to_bits(),
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for CellValue<'_> {}

impl Hash for CellValue<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::Num(v) => {
                0u8.hash(state);
                v.to_bits().hash(state);
            }
            Self::Bool(b) => {
                1u8.hash(state);
                b.hash(state);
            }
            Self::Str(s) => {
                2u8.hash(state);
                s.hash(state);
            }
        }
    }
}

// ── Column ────────────────────────────────────────────────────────────

/// A typed column with a null mask.
///
/// Missing positions hold a placeholder in the value array (`0.0`,
/// `false`, dictionary index 0, or the empty string) and must be read
/// through the mask.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric {
        values: Vec<f64>,
        nulls: NullMask,
    },
    Boolean {
        values: Vec<bool>,
        nulls: NullMask,
    },
    /// `dictionary` holds the distinct strings ever inserted; `codes`
    /// maps each row to a dictionary entry.
    Categorical {
        dictionary: Vec<String>,
        codes: Vec<u32>,
        nulls: NullMask,
    },
    Text {
        values: Vec<String>,
        nulls: NullMask,
    },
}

impl Column {
    /// Creates a numeric column.
    pub fn numeric(values: Vec<f64>, nulls: NullMask) -> Self {
        Self::Numeric { values, nulls }
    }

    /// Creates a boolean column.
    pub fn boolean(values: Vec<bool>, nulls: NullMask) -> Self {
        Self::Boolean { values, nulls }
    }

    /// Creates a dictionary-encoded categorical column.
    pub fn categorical(dictionary: Vec<String>, codes: Vec<u32>, nulls: NullMask) -> Self {
        Self::Categorical {
            dictionary,
            codes,
            nulls,
        }
    }

    /// Creates a text column.
    pub fn text(values: Vec<String>, nulls: NullMask) -> Self {
        Self::Text { values, nulls }
    }

    /// Storage type of this column.
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Numeric { .. } => DataType::Numeric,
            Self::Boolean { .. } => DataType::Boolean,
            Self::Categorical { .. } => DataType::Categorical,
            Self::Text { .. } => DataType::Text,
        }
    }

    /// Number of rows, missing rows included.
    pub fn len(&self) -> usize {
        self.nulls().len()
    }

    /// Whether the column has zero rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The column's null mask.
    pub fn nulls(&self) -> &NullMask {
        match self {
            Self::Numeric { nulls, .. }
            | Self::Boolean { nulls, .. }
            | Self::Categorical { nulls, .. }
            | Self::Text { nulls, .. } => nulls,
        }
    }

    /// Number of missing values.
    pub fn null_count(&self) -> usize {
        self.nulls().null_count()
    }

    /// Number of observed values.
    pub fn valid_count(&self) -> usize {
        self.nulls().valid_count()
    }

    /// Whether the value at `idx` is observed.
    pub fn is_valid(&self, idx: usize) -> bool {
        self.nulls().is_valid(idx)
    }

    /// The raw numeric values, or `None` for non-numeric columns.
    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            Self::Numeric { values, .. } => Some(values),
            _ => None,
        }
    }

    /// Observed numeric values, missing rows excluded.
    pub fn valid_numeric_values(&self) -> Option<Vec<f64>> {
        match self {
            Self::Numeric { values, nulls } => {
                Some(nulls.valid_indices().map(|i| values[i]).collect())
            }
            _ => None,
        }
    }

    /// Typed view of the cell at `idx`, or `None` when it is missing.
    pub fn cell(&self, idx: usize) -> Option<CellValue<'_>> {
        if !self.is_valid(idx) {
            return None;
        }
        Some(match self {
            Self::Numeric { values, .. } => CellValue::Num(values[idx]),
            Self::Boolean { values, .. } => CellValue::Bool(values[idx]),
            Self::Categorical {
                dictionary, codes, ..
            } => CellValue::Str(&dictionary[codes[idx] as usize]),
            Self::Text { values, .. } => CellValue::Str(&values[idx]),
        })
    }

    /// Number of distinct observed values.
    ///
    /// Counts values actually present, not dictionary capacity: a
    /// categorical column whose dictionary kept entries no surviving row
    /// references reports only the referenced ones. Numeric identity is
    /// the `f64` bit pattern.
    pub fn distinct_count(&self) -> usize {
        match self {
            Self::Numeric { values, nulls } => {
                let mut seen: HashSet<u64> = HashSet::new();
                for i in nulls.valid_indices() {
                    seen.insert(values[i].to_bits());
                }
                seen.len()
            }
            Self::Boolean { values, nulls } => {
                let mut seen: HashSet<bool> = HashSet::new();
                for i in nulls.valid_indices() {
                    seen.insert(values[i]);
                }
                seen.len()
            }
            Self::Categorical { codes, nulls, .. } => {
                let mut seen: HashSet<u32> = HashSet::new();
                for i in nulls.valid_indices() {
                    seen.insert(codes[i]);
                }
                seen.len()
            }
            Self::Text { values, nulls } => {
                let mut seen: HashSet<&str> = HashSet::new();
                for i in nulls.valid_indices() {
                    seen.insert(values[i].as_str());
                }
                seen.len()
            }
        }
    }

    /// New column holding the rows at `indices`, in that order.
    pub fn take(&self, indices: &[usize]) -> Column {
        match self {
            Self::Numeric { values, nulls } => {
                let mut out = Vec::with_capacity(indices.len());
                let mut mask = NullMask::empty();
                for &i in indices {
                    out.push(values[i]);
                    mask.push(nulls.is_valid(i));
                }
                Self::Numeric {
                    values: out,
                    nulls: mask,
                }
            }
            Self::Boolean { values, nulls } => {
                let mut out = Vec::with_capacity(indices.len());
                let mut mask = NullMask::empty();
                for &i in indices {
                    out.push(values[i]);
                    mask.push(nulls.is_valid(i));
                }
                Self::Boolean {
                    values: out,
                    nulls: mask,
                }
            }
            Self::Categorical {
                dictionary,
                codes,
                nulls,
            } => {
                let mut out = Vec::with_capacity(indices.len());
                let mut mask = NullMask::empty();
                for &i in indices {
                    out.push(codes[i]);
                    mask.push(nulls.is_valid(i));
                }
                Self::Categorical {
                    dictionary: dictionary.clone(),
                    codes: out,
                    nulls: mask,
                }
            }
            Self::Text { values, nulls } => {
                let mut out = Vec::with_capacity(indices.len());
                let mut mask = NullMask::empty();
                for &i in indices {
                    out.push(values[i].clone());
                    mask.push(nulls.is_valid(i));
                }
                Self::Text {
                    values: out,
                    nulls: mask,
                }
            }
        }
    }
}

// ── DataFrame ─────────────────────────────────────────────────────────

/// Named columns of equal length, in insertion order.
///
/// # Example
///
/// ```
/// use corrscan::dataframe::{Column, DataFrame, NullMask};
///
/// let mut df = DataFrame::new();
/// let mut nulls = NullMask::all_valid(3);
/// nulls.set_null(1);
/// df.add_column("x".to_string(), Column::numeric(vec![1.0, 0.0, 3.0], nulls)).unwrap();
/// df.add_column(
///     "zone".to_string(),
///     Column::text(vec!["N".into(), "S".into(), "N".into()], NullMask::all_valid(3)),
/// ).unwrap();
///
/// let cleaned = df.drop_null_rows();
/// assert_eq!(cleaned.row_count(), 2); // row 1 dropped everywhere
/// assert_eq!(cleaned.column_count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DataFrame {
    names: Vec<String>,
    columns: Vec<Column>,
    row_count: usize,
}

impl DataFrame {
    /// Creates an empty DataFrame.
    pub fn new() -> Self {
        Self {
            names: Vec::new(),
            columns: Vec::new(),
            row_count: 0,
        }
    }

    /// Appends a named column.
    ///
    /// The first column fixes the row count; later columns must match it
    /// or the call fails with [`ScanError::DimensionMismatch`].
    pub fn add_column(&mut self, name: String, column: Column) -> Result<(), ScanError> {
        let len = column.len();
        if self.columns.is_empty() {
            self.row_count = len;
        } else if len != self.row_count {
            return Err(ScanError::DimensionMismatch {
                expected: self.row_count,
                actual: len,
            });
        }
        self.names.push(name);
        self.columns.push(column);
        Ok(())
    }

    /// Number of rows.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of columns.
    #[inline]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Whether the DataFrame has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column names, in column order.
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Column at `index`.
    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Column with the given name.
    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.columns[i])
    }

    /// Iterator over `(name, column)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names
            .iter()
            .map(|s| s.as_str())
            .zip(self.columns.iter())
    }

    /// Column names with their storage types.
    pub fn schema(&self) -> Vec<(&str, DataType)> {
        self.iter().map(|(n, c)| (n, c.data_type())).collect()
    }

    /// Fully-observed subset: every row with a missing value in any
    /// column is removed from every column.
    ///
    /// One missing cell drops the whole row from every downstream
    /// computation, shrinking the sample uniformly across column pairs.
    /// The result is freshly allocated and contains no missing values.
    pub fn drop_null_rows(&self) -> DataFrame {
        let keep: Vec<usize> = (0..self.row_count)
            .filter(|&i| self.columns.iter().all(|c| c.is_valid(i)))
            .collect();

        let mut out = DataFrame::new();
        for (name, col) in self.iter() {
            out.add_column(name.to_string(), col.take(&keep))
                .expect("taken columns share one length");
        }
        out
    }
}

impl Default for DataFrame {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── NullMask ─────────────────────────────────────────────────

    #[test]
    fn mask_all_valid() {
        let mask = NullMask::all_valid(100);
        assert_eq!(mask.len(), 100);
        assert_eq!(mask.null_count(), 0);
        assert!((0..100).all(|i| mask.is_valid(i)));
    }

    #[test]
    fn mask_all_null() {
        let mask = NullMask::all_null(70);
        assert_eq!(mask.null_count(), 70);
        assert_eq!(mask.valid_count(), 0);
    }

    #[test]
    fn mask_set_null_and_count() {
        let mut mask = NullMask::all_valid(10);
        mask.set_null(2);
        mask.set_null(9);
        assert_eq!(mask.null_count(), 2);
        assert!(!mask.is_valid(2));
        assert!(mask.is_valid(3));
    }

    #[test]
    fn mask_push_across_word_boundary() {
        let mut mask = NullMask::empty();
        for i in 0..130 {
            mask.push(i % 4 != 0);
        }
        assert_eq!(mask.len(), 130);
        let expected = (0..130).filter(|i| i % 4 == 0).count();
        assert_eq!(mask.null_count(), expected);
        assert!(mask.is_valid(65));
        assert!(!mask.is_valid(64));
    }

    #[test]
    fn mask_word_boundary_lengths() {
        assert_eq!(NullMask::all_valid(64).null_count(), 0);
        let m = NullMask::all_valid(65);
        assert_eq!(m.null_count(), 0);
        assert!(m.is_valid(64));
    }

    #[test]
    fn mask_valid_indices() {
        let mut mask = NullMask::all_valid(5);
        mask.set_null(0);
        mask.set_null(3);
        let idx: Vec<usize> = mask.valid_indices().collect();
        assert_eq!(idx, vec![1, 2, 4]);
    }

    // ── CellValue ────────────────────────────────────────────────

    #[test]
    fn cell_value_identity() {
        assert_eq!(CellValue::Num(1.5), CellValue::Num(1.5));
        assert_ne!(CellValue::Num(1.5), CellValue::Num(2.5));
        assert_eq!(CellValue::Str("a"), CellValue::Str("a"));
        assert_ne!(CellValue::Str("a"), CellValue::Num(1.0));
        // NaN keys are self-equal through the bit pattern
        assert_eq!(CellValue::Num(f64::NAN), CellValue::Num(f64::NAN));
    }

    #[test]
    fn cell_value_as_map_key() {
        let mut map = std::collections::HashMap::new();
        map.insert(CellValue::Num(3.0), 1usize);
        *map.entry(CellValue::Num(3.0)).or_insert(0) += 1;
        map.insert(CellValue::Str("x"), 5);
        assert_eq!(map[&CellValue::Num(3.0)], 2);
        assert_eq!(map.len(), 2);
    }

    // ── Column ───────────────────────────────────────────────────

    #[test]
    fn numeric_column_cells() {
        let mut nulls = NullMask::all_valid(3);
        nulls.set_null(1);
        let col = Column::numeric(vec![1.0, 0.0, 3.0], nulls);
        assert_eq!(col.data_type(), DataType::Numeric);
        assert_eq!(col.cell(0), Some(CellValue::Num(1.0)));
        assert_eq!(col.cell(1), None);
        assert_eq!(col.valid_numeric_values(), Some(vec![1.0, 3.0]));
    }

    #[test]
    fn categorical_column_cells() {
        let dict = vec!["low".to_string(), "high".to_string()];
        let col = Column::categorical(dict, vec![0, 1, 0], NullMask::all_valid(3));
        assert_eq!(col.cell(1), Some(CellValue::Str("high")));
        assert_eq!(col.distinct_count(), 2);
    }

    #[test]
    fn boolean_column_cells() {
        let col = Column::boolean(vec![true, false, true], NullMask::all_valid(3));
        assert_eq!(col.cell(2), Some(CellValue::Bool(true)));
        assert_eq!(col.distinct_count(), 2);
    }

    #[test]
    fn distinct_count_ignores_nulls() {
        let mut nulls = NullMask::all_valid(4);
        nulls.set_null(3);
        let col = Column::numeric(vec![1.0, 1.0, 2.0, 9.0], nulls);
        assert_eq!(col.distinct_count(), 2);
    }

    #[test]
    fn distinct_count_observed_categories_only() {
        // dictionary has 3 entries but only 2 are referenced by valid rows
        let dict = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let mut nulls = NullMask::all_valid(3);
        nulls.set_null(2);
        let col = Column::categorical(dict, vec![0, 1, 2], nulls);
        assert_eq!(col.distinct_count(), 2);
    }

    #[test]
    fn take_preserves_order_and_validity() {
        let mut nulls = NullMask::all_valid(4);
        nulls.set_null(2);
        let col = Column::numeric(vec![10.0, 20.0, 0.0, 40.0], nulls);
        let taken = col.take(&[3, 0]);
        assert_eq!(taken.len(), 2);
        assert_eq!(taken.cell(0), Some(CellValue::Num(40.0)));
        assert_eq!(taken.cell(1), Some(CellValue::Num(10.0)));
        assert_eq!(taken.null_count(), 0);
    }

    // ── DataFrame ────────────────────────────────────────────────

    #[test]
    fn add_column_length_mismatch() {
        let mut df = DataFrame::new();
        df.add_column(
            "a".into(),
            Column::numeric(vec![1.0, 2.0], NullMask::all_valid(2)),
        )
        .unwrap();
        let err = df
            .add_column(
                "b".into(),
                Column::numeric(vec![1.0], NullMask::all_valid(1)),
            )
            .unwrap_err();
        assert!(matches!(err, ScanError::DimensionMismatch { .. }));
    }

    #[test]
    fn lookup_and_schema() {
        let mut df = DataFrame::new();
        df.add_column(
            "x".into(),
            Column::numeric(vec![1.0], NullMask::all_valid(1)),
        )
        .unwrap();
        df.add_column(
            "label".into(),
            Column::text(vec!["hi".into()], NullMask::all_valid(1)),
        )
        .unwrap();

        assert!(df.column_by_name("x").is_some());
        assert!(df.column_by_name("missing").is_none());
        assert_eq!(
            df.schema(),
            vec![("x", DataType::Numeric), ("label", DataType::Text)]
        );
    }

    #[test]
    fn drop_null_rows_removes_whole_rows() {
        let mut df = DataFrame::new();
        let mut n1 = NullMask::all_valid(4);
        n1.set_null(1);
        df.add_column("a".into(), Column::numeric(vec![1.0, 0.0, 3.0, 4.0], n1))
            .unwrap();
        let mut n2 = NullMask::all_valid(4);
        n2.set_null(3);
        df.add_column(
            "b".into(),
            Column::text(
                vec!["w".into(), "x".into(), "y".into(), String::new()],
                n2,
            ),
        )
        .unwrap();

        let cleaned = df.drop_null_rows();
        assert_eq!(cleaned.row_count(), 2);
        assert_eq!(cleaned.column_count(), 2);
        // surviving rows are 0 and 2, order kept
        let a = cleaned.column_by_name("a").unwrap();
        assert_eq!(a.cell(0), Some(CellValue::Num(1.0)));
        assert_eq!(a.cell(1), Some(CellValue::Num(3.0)));
        // no nulls remain anywhere
        assert_eq!(a.null_count(), 0);
        assert_eq!(cleaned.column_by_name("b").unwrap().null_count(), 0);
    }

    #[test]
    fn drop_null_rows_no_missing_is_identity() {
        let mut df = DataFrame::new();
        df.add_column(
            "a".into(),
            Column::numeric(vec![1.0, 2.0], NullMask::all_valid(2)),
        )
        .unwrap();
        let cleaned = df.drop_null_rows();
        assert_eq!(cleaned, df);
    }

    #[test]
    fn drop_null_rows_can_empty_the_frame() {
        let mut df = DataFrame::new();
        df.add_column(
            "a".into(),
            Column::numeric(vec![0.0, 0.0], NullMask::all_null(2)),
        )
        .unwrap();
        let cleaned = df.drop_null_rows();
        assert_eq!(cleaned.row_count(), 0);
        assert_eq!(cleaned.column_count(), 1);
    }
}
