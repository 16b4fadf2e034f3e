//! Pairwise association analysis.
//!
//! Given a [`DataFrame`], classifies every column as categorical or
//! continuous, then runs the statistically appropriate association test
//! for every unordered column pair:
//!
//! | pair | test |
//! |------|------|
//! | categorical × categorical | chi-squared independence on the contingency table |
//! | categorical × continuous | one-way ANOVA, or Kruskal-Wallis when a group fails normality |
//! | continuous × continuous | Pearson, or Spearman when a column fails normality |
//!
//! Rows with any missing value are dropped before anything else, so every
//! pair is evaluated on the same fully-observed subset. Normality is a
//! Shapiro-Wilk test at α = 0.05. Degenerate pairs the analysis
//! anticipates (an empty contingency table, fewer than two groups) become
//! [`Skipped`](TestOutcome::Skipped) rows rather than errors; a
//! statistical kernel declining for any other reason aborts the analysis
//! with [`ScanError::TestFailure`].
//!
//! # Example
//!
//! ```
//! use corrscan::association::analyze_associations;
//! use corrscan::csv_parser::CsvParser;
//!
//! let csv = "\
//! usage,zone
//! gas,N
//! gas,N
//! gas,N
//! electricity,S
//! electricity,S
//! electricity,S
//! gas,S
//! electricity,N
//! ";
//! let df = CsvParser::new().parse_str(csv).unwrap();
//! let rows = analyze_associations(&df).unwrap();
//!
//! assert_eq!(rows.len(), 1); // one unordered pair
//! assert_eq!(rows[0].column_a, "usage");
//! assert_eq!(rows[0].column_b, "zone");
//! assert!(rows[0].p_value().is_some());
//! assert!(rows[0].coefficient().is_none()); // independence tests carry no effect size
//! ```

use crate::dataframe::{CellValue, Column, DataFrame};
use crate::error::ScanError;
use crate::kruskal::kruskal_wallis_test;
use std::collections::HashMap;

/// Significance level of the Shapiro-Wilk gate: a sample counts as
/// normal iff its p-value exceeds this.
const NORMALITY_ALPHA: f64 = 0.05;

/// A numeric column is continuous iff it has strictly more distinct
/// values than this.
const CONTINUOUS_DISTINCT_THRESHOLD: usize = 10;

// ── Column classification ─────────────────────────────────────────────

/// How a column is compared: by group membership or by magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Categorical,
    Continuous,
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Categorical => write!(f, "categorical"),
            Self::Continuous => write!(f, "continuous"),
        }
    }
}

/// Classifies a column, assumed missing-value-free.
///
/// Numeric with more than 10 distinct values → continuous; everything
/// else (low-cardinality numeric, boolean, string) → categorical. Total
/// and side-effect-free.
///
/// ```
/// use corrscan::association::{classify, ColumnKind};
/// use corrscan::dataframe::{Column, NullMask};
///
/// let wide = Column::numeric((0..12).map(f64::from).collect(), NullMask::all_valid(12));
/// assert_eq!(classify(&wide), ColumnKind::Continuous);
///
/// let narrow = Column::numeric(vec![1.0, 2.0, 1.0, 2.0], NullMask::all_valid(4));
/// assert_eq!(classify(&narrow), ColumnKind::Categorical);
/// ```
pub fn classify(column: &Column) -> ColumnKind {
    match column {
        Column::Numeric { .. } if column.distinct_count() > CONTINUOUS_DISTINCT_THRESHOLD => {
            ColumnKind::Continuous
        }
        _ => ColumnKind::Categorical,
    }
}

// ── Result rows ───────────────────────────────────────────────────────

/// The closed menu of association tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestKind {
    ChiSquared,
    Anova,
    KruskalWallis,
    Pearson,
    Spearman,
}

impl TestKind {
    /// Human-readable test name.
    pub fn name(self) -> &'static str {
        match self {
            Self::ChiSquared => "chi-squared",
            Self::Anova => "one-way ANOVA",
            Self::KruskalWallis => "Kruskal-Wallis",
            Self::Pearson => "Pearson",
            Self::Spearman => "Spearman",
        }
    }
}

impl std::fmt::Display for TestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a pair was skipped instead of tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The cross-tabulation of a categorical pair had zero cells.
    EmptyContingencyTable,
    /// A group comparison found fewer than two non-empty groups.
    NotEnoughValidGroups,
}

impl SkipReason {
    /// The reason string carried in the result table.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmptyContingencyTable => "Empty contingency table",
            Self::NotEnoughValidGroups => "Not enough valid groups",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one pair's test: a completed test or an anticipated
/// degeneracy.
#[derive(Debug, Clone, PartialEq)]
pub enum TestOutcome {
    Completed {
        /// Which test ran.
        test: TestKind,
        /// The test's p-value, reported as computed.
        p_value: f64,
        /// Correlation coefficient; `Some` only for Pearson/Spearman with
        /// a finite value. A non-finite coefficient is suppressed while
        /// the p-value is kept.
        coefficient: Option<f64>,
    },
    Skipped(SkipReason),
}

/// One row of the association table: an unordered column pair and its
/// outcome. Rows are immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct AssociationRow {
    /// First column of the pair, in dataset column order.
    pub column_a: String,
    /// Second column of the pair.
    pub column_b: String,
    /// What happened for this pair.
    pub outcome: TestOutcome,
}

impl AssociationRow {
    /// The flattened `p-value` field: `None` for skipped pairs.
    pub fn p_value(&self) -> Option<f64> {
        match &self.outcome {
            TestOutcome::Completed { p_value, .. } => Some(*p_value),
            TestOutcome::Skipped(_) => None,
        }
    }

    /// The flattened `Correlation Coefficient` field.
    pub fn coefficient(&self) -> Option<f64> {
        match &self.outcome {
            TestOutcome::Completed { coefficient, .. } => *coefficient,
            TestOutcome::Skipped(_) => None,
        }
    }

    /// The failure reason for skipped pairs.
    pub fn skip_reason(&self) -> Option<&'static str> {
        match &self.outcome {
            TestOutcome::Completed { .. } => None,
            TestOutcome::Skipped(reason) => Some(reason.as_str()),
        }
    }

    /// Which test ran, if one did.
    pub fn test(&self) -> Option<TestKind> {
        match &self.outcome {
            TestOutcome::Completed { test, .. } => Some(*test),
            TestOutcome::Skipped(_) => None,
        }
    }
}

// ── Analysis ──────────────────────────────────────────────────────────

/// Runs the pairwise association analysis over a DataFrame.
///
/// Steps: drop every row containing a missing value; classify every
/// column once from the cleaned data; enumerate unordered column pairs
/// in dataset column order, `(c0,c1), (c0,c2), …, (c1,c2), …`; dispatch
/// each pair to its test. Returns one [`AssociationRow`] per pair, in
/// enumeration order — `C(n, 2)` rows for `n` columns.
///
/// The same input always yields the same table. Errors only surface for
/// degeneracies the analysis does not anticipate (see
/// [`ScanError::TestFailure`]); anticipated ones become skipped rows.
pub fn analyze_associations(df: &DataFrame) -> Result<Vec<AssociationRow>, ScanError> {
    let cleaned = df.drop_null_rows();
    let n = cleaned.column_count();
    let names = cleaned.column_names();

    // One classification per column, applied uniformly to every pair.
    let kinds: Vec<ColumnKind> = (0..n)
        .map(|i| classify(cleaned.column(i).expect("index within column count")))
        .collect();

    let mut rows = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            let a = cleaned.column(i).expect("index within column count");
            let b = cleaned.column(j).expect("index within column count");
            let pair = Pair {
                name_a: &names[i],
                name_b: &names[j],
            };
            let outcome = match (kinds[i], kinds[j]) {
                (ColumnKind::Categorical, ColumnKind::Categorical) => {
                    contingency_test(a, b, pair)?
                }
                (ColumnKind::Categorical, ColumnKind::Continuous) => {
                    group_comparison_test(a, b, pair)?
                }
                (ColumnKind::Continuous, ColumnKind::Categorical) => {
                    group_comparison_test(b, a, pair)?
                }
                (ColumnKind::Continuous, ColumnKind::Continuous) => {
                    correlation_test(a, b, pair)?
                }
            };
            rows.push(AssociationRow {
                column_a: names[i].clone(),
                column_b: names[j].clone(),
                outcome,
            });
        }
    }
    Ok(rows)
}

/// Column-pair names, for error reporting.
#[derive(Clone, Copy)]
struct Pair<'a> {
    name_a: &'a str,
    name_b: &'a str,
}

impl Pair<'_> {
    fn failure(self, test: &'static str) -> ScanError {
        ScanError::TestFailure {
            test,
            column_a: self.name_a.to_string(),
            column_b: self.name_b.to_string(),
        }
    }
}

// ── categorical × categorical ─────────────────────────────────────────

fn contingency_test(
    a: &Column,
    b: &Column,
    pair: Pair<'_>,
) -> Result<TestOutcome, ScanError> {
    // Cross-tabulate co-occurring values; categories are indexed in
    // first-observation order.
    let mut row_ids: HashMap<CellValue<'_>, usize> = HashMap::new();
    let mut col_ids: HashMap<CellValue<'_>, usize> = HashMap::new();
    let mut counts: HashMap<(usize, usize), f64> = HashMap::new();

    for idx in 0..a.len() {
        let (Some(va), Some(vb)) = (a.cell(idx), b.cell(idx)) else {
            continue;
        };
        let next = row_ids.len();
        let ri = *row_ids.entry(va).or_insert(next);
        let next = col_ids.len();
        let ci = *col_ids.entry(vb).or_insert(next);
        *counts.entry((ri, ci)).or_insert(0.0) += 1.0;
    }

    let (n_rows, n_cols) = (row_ids.len(), col_ids.len());
    if n_rows * n_cols == 0 {
        return Ok(TestOutcome::Skipped(SkipReason::EmptyContingencyTable));
    }

    let mut table = vec![0.0; n_rows * n_cols];
    for ((ri, ci), count) in counts {
        table[ri * n_cols + ci] = count;
    }

    let test = u_analytics::testing::chi_squared_independence(&table, n_rows, n_cols)
        .ok_or_else(|| pair.failure(TestKind::ChiSquared.name()))?;

    Ok(TestOutcome::Completed {
        test: TestKind::ChiSquared,
        p_value: test.p_value,
        coefficient: None,
    })
}

// ── categorical × continuous ──────────────────────────────────────────

fn group_comparison_test(
    cat: &Column,
    cont: &Column,
    pair: Pair<'_>,
) -> Result<TestOutcome, ScanError> {
    let values = cont.as_numeric().expect("continuous column is numeric");

    // One group per observed category, in first-observation order.
    let mut order: Vec<CellValue<'_>> = Vec::new();
    let mut groups: HashMap<CellValue<'_>, Vec<f64>> = HashMap::new();
    for idx in 0..cat.len() {
        let Some(key) = cat.cell(idx) else { continue };
        groups
            .entry(key)
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(values[idx]);
    }

    let valid_groups: Vec<&[f64]> = order
        .iter()
        .filter_map(|key| groups.get(key))
        .map(Vec::as_slice)
        .filter(|g| !g.is_empty())
        .collect();

    if valid_groups.len() < 2 {
        return Ok(TestOutcome::Skipped(SkipReason::NotEnoughValidGroups));
    }

    // Normality gate over every group before choosing the test.
    let mut normal = Vec::with_capacity(valid_groups.len());
    for group in &valid_groups {
        let sw = u_analytics::testing::shapiro_wilk_test(group)
            .ok_or_else(|| pair.failure("Shapiro-Wilk"))?;
        normal.push(sw.p_value > NORMALITY_ALPHA);
    }

    if normal.iter().all(|&is_normal| is_normal) {
        let anova = u_analytics::testing::one_way_anova(&valid_groups)
            .ok_or_else(|| pair.failure(TestKind::Anova.name()))?;
        Ok(TestOutcome::Completed {
            test: TestKind::Anova,
            p_value: anova.p_value,
            coefficient: None,
        })
    } else {
        let kw = kruskal_wallis_test(&valid_groups)
            .ok_or_else(|| pair.failure(TestKind::KruskalWallis.name()))?;
        Ok(TestOutcome::Completed {
            test: TestKind::KruskalWallis,
            p_value: kw.p_value,
            coefficient: None,
        })
    }
}

// ── continuous × continuous ───────────────────────────────────────────

fn correlation_test(
    a: &Column,
    b: &Column,
    pair: Pair<'_>,
) -> Result<TestOutcome, ScanError> {
    let xs = a.valid_numeric_values().expect("continuous column is numeric");
    let ys = b.valid_numeric_values().expect("continuous column is numeric");

    // Both columns are tested before the branch is chosen.
    let normal_a = u_analytics::testing::shapiro_wilk_test(&xs)
        .ok_or_else(|| pair.failure("Shapiro-Wilk"))?
        .p_value
        > NORMALITY_ALPHA;
    let normal_b = u_analytics::testing::shapiro_wilk_test(&ys)
        .ok_or_else(|| pair.failure("Shapiro-Wilk"))?
        .p_value
        > NORMALITY_ALPHA;

    let refs = [xs.as_slice(), ys.as_slice()];
    let (test, matrix, pairwise) = if normal_a && normal_b {
        (
            TestKind::Pearson,
            u_analytics::correlation::correlation_matrix(&refs),
            u_analytics::correlation::pearson(&xs, &ys),
        )
    } else {
        (
            TestKind::Spearman,
            u_analytics::correlation::spearman_matrix(&refs),
            u_analytics::correlation::spearman(&xs, &ys),
        )
    };

    let matrix = matrix.ok_or_else(|| pair.failure(test.name()))?;
    let pairwise = pairwise.ok_or_else(|| pair.failure(test.name()))?;

    // A non-finite coefficient is reported as absent; the p-value from
    // the same test is still reported as-is.
    let raw = matrix.get(0, 1);
    let coefficient = raw.is_finite().then_some(raw);

    Ok(TestOutcome::Completed {
        test,
        p_value: pairwise.p_value,
        coefficient,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────
