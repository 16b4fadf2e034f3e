//! Kruskal-Wallis H test.
//!
//! Nonparametric one-way analysis of variance on ranks, used when group
//! distributions fail a normality check and a classic ANOVA would be
//! unreliable. The statistic is computed on mid-ranks with the standard
//! tie correction, and the p-value comes from the chi-squared
//! approximation with `k - 1` degrees of freedom.
//!
//! Reference: Kruskal & Wallis (1952). "Use of ranks in one-criterion
//! variance analysis", JASA.

use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Result of a Kruskal-Wallis test.
#[derive(Debug, Clone, Copy)]
pub struct KruskalWallisResult {
    /// Tie-corrected H statistic.
    pub statistic: f64,
    /// P-value from the chi-squared approximation.
    pub p_value: f64,
}

/// Runs the Kruskal-Wallis test across two or more groups.
///
/// Returns `None` when the test is undefined: fewer than 2 groups, an
/// empty group, fewer than 2 pooled observations, non-finite input, or
/// all pooled values identical (the tie correction vanishes).
///
/// ```
/// use corrscan::kruskal::kruskal_wallis_test;
///
/// let low = [1.0, 2.0, 3.0];
/// let high = [4.0, 5.0, 6.0];
/// let result = kruskal_wallis_test(&[&low, &high]).unwrap();
/// assert!(result.p_value < 0.05);
/// ```
pub fn kruskal_wallis_test(groups: &[&[f64]]) -> Option<KruskalWallisResult> {
    let k = groups.len();
    if k < 2 || groups.iter().any(|g| g.is_empty()) {
        return None;
    }
    let n: usize = groups.iter().map(|g| g.len()).sum();
    if n < 2 {
        return None;
    }
    if groups.iter().any(|g| g.iter().any(|v| !v.is_finite())) {
        return None;
    }

    // Pool the observations, remembering group membership, and sort.
    let mut pooled: Vec<(usize, f64)> = Vec::with_capacity(n);
    for (gi, group) in groups.iter().enumerate() {
        pooled.extend(group.iter().map(|&v| (gi, v)));
    }
    pooled.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    // Mid-ranks: every member of a tie run gets the run's average rank.
    let mut rank_sums = vec![0.0_f64; k];
    let mut tie_term = 0.0_f64;
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && pooled[j].1 == pooled[i].1 {
            j += 1;
        }
        // 1-based ranks i+1..=j average to (i + j + 1) / 2
        let mid_rank = (i + j + 1) as f64 / 2.0;
        for &(gi, _) in &pooled[i..j] {
            rank_sums[gi] += mid_rank;
        }
        let t = (j - i) as f64;
        tie_term += t * t * t - t;
        i = j;
    }

    let n_f = n as f64;
    let correction = 1.0 - tie_term / (n_f * n_f * n_f - n_f);
    if correction <= 0.0 {
        // every pooled value identical
        return None;
    }

    let mut h = 0.0;
    for (gi, group) in groups.iter().enumerate() {
        h += rank_sums[gi] * rank_sums[gi] / group.len() as f64;
    }
    h = 12.0 / (n_f * (n_f + 1.0)) * h - 3.0 * (n_f + 1.0);
    h /= correction;

    let df = (k - 1) as f64;
    let chi2 = ChiSquared::new(df).ok()?;
    let p_value = (1.0 - chi2.cdf(h)).clamp(0.0, 1.0);

    Some(KruskalWallisResult {
        statistic: h,
        p_value,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────
