//! # corrscan
//!
//! Pairwise association scanning and exploratory profiling for tabular
//! data.
//!
//! corrscan answers the first questions asked of an unfamiliar dataset:
//! where are the missing values, what role does each column play, and
//! which columns move together. The association scan classifies every
//! column as categorical or continuous, then runs the statistically
//! appropriate test for every unordered column pair — chi-squared
//! independence, one-way ANOVA or Kruskal-Wallis, Pearson or Spearman —
//! choosing between the parametric and rank-based variants with a
//! Shapiro-Wilk normality gate.
//!
//! ## Modules
//!
//! - [`dataframe`] — Column-major tabular model (DataFrame, Column, NullMask)
//! - [`csv_parser`] — CSV loading with automatic type inference
//! - [`profiling`] — Missing-value audit, column roles, numeric summaries
//! - [`association`] — The pairwise association scan
//! - [`kruskal`] — Kruskal-Wallis H test
//! - [`error`] — Error types
//!
//! ## Quick Start
//!
//! ```
//! use corrscan::association::analyze_associations;
//! use corrscan::csv_parser::CsvParser;
//! use corrscan::profiling::missing_value_audit;
//!
//! let csv = "\
//! usage,zone,parking
//! gas,N,yes
//! electricity,S,no
//! gas,N,no
//! electricity,S,yes
//! gas,S,yes
//! electricity,N,no
//! gas,N,yes
//! NA,S,no
//! ";
//! let df = CsvParser::new().parse_str(csv).unwrap();
//!
//! let audit = missing_value_audit(&df);
//! assert_eq!(audit[0].null_count, 1); // the NA in `usage`
//!
//! // 3 columns → C(3, 2) = 3 pairs, evaluated on the 7 complete rows
//! let rows = analyze_associations(&df).unwrap();
//! assert_eq!(rows.len(), 3);
//! assert_eq!(rows[0].column_a, "usage");
//! assert_eq!(rows[0].column_b, "zone");
//! ```

pub mod association;
pub mod csv_parser;
pub mod dataframe;
pub mod error;
pub mod kruskal;
pub mod profiling;
