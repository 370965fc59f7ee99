//! FILENAME: frame/src/nanops.rs
//! NA-skipping numeric kernels.
//!
//! Each kernel reduces a slice of f64 where NaN marks a missing observation.
//! With `skipna` missing values are ignored; without it any missing value makes
//! the result missing. A slice with no valid observations reduces to NaN
//! (except `count`, which reduces to 0).

use serde::{Deserialize, Serialize};

// ============================================================================
// REDUCTION OPS
// ============================================================================

/// Supported reductions along an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReduceOp {
    Sum,
    Mean,
    Var,
    Std,
    Skew,
    Prod,
    Median,
    Min,
    Max,
    Count,
}

impl Default for ReduceOp {
    fn default() -> Self {
        ReduceOp::Sum
    }
}

impl ReduceOp {
    pub fn apply(self, values: &[f64], skipna: bool) -> f64 {
        match self {
            ReduceOp::Sum => nansum(values, skipna),
            ReduceOp::Mean => nanmean(values, skipna),
            ReduceOp::Var => nanvar(values, skipna),
            ReduceOp::Std => nanvar(values, skipna).sqrt(),
            ReduceOp::Skew => nanskew(values, skipna),
            ReduceOp::Prod => nanprod(values, skipna),
            ReduceOp::Median => nanmedian(values, skipna),
            ReduceOp::Min => nanmin(values, skipna),
            ReduceOp::Max => nanmax(values, skipna),
            ReduceOp::Count => count(values) as f64,
        }
    }
}

/// The observations a kernel works on, or None when the result is missing.
fn valid(values: &[f64], skipna: bool) -> Option<Vec<f64>> {
    if !skipna && values.iter().any(|v| v.is_nan()) {
        return None;
    }
    let observed: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if observed.is_empty() {
        None
    } else {
        Some(observed)
    }
}

pub fn count(values: &[f64]) -> usize {
    values.iter().filter(|v| !v.is_nan()).count()
}

pub fn nansum(values: &[f64], skipna: bool) -> f64 {
    valid(values, skipna).map_or(f64::NAN, |v| v.iter().sum())
}

pub fn nanprod(values: &[f64], skipna: bool) -> f64 {
    valid(values, skipna).map_or(f64::NAN, |v| v.iter().product())
}

pub fn nanmean(values: &[f64], skipna: bool) -> f64 {
    valid(values, skipna).map_or(f64::NAN, |v| v.iter().sum::<f64>() / v.len() as f64)
}

/// Unbiased (n - 1) variance.
pub fn nanvar(values: &[f64], skipna: bool) -> f64 {
    let Some(v) = valid(values, skipna) else {
        return f64::NAN;
    };
    let n = v.len() as f64;
    if v.len() < 2 {
        return f64::NAN;
    }
    let mean = v.iter().sum::<f64>() / n;
    v.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0)
}

/// Adjusted Fisher-Pearson skewness.
pub fn nanskew(values: &[f64], skipna: bool) -> f64 {
    let Some(v) = valid(values, skipna) else {
        return f64::NAN;
    };
    if v.len() < 3 {
        return f64::NAN;
    }
    let n = v.len() as f64;
    let mean = v.iter().sum::<f64>() / n;
    let m2 = v.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    let m3 = v.iter().map(|x| (x - mean).powi(3)).sum::<f64>() / n;
    if m2 == 0.0 {
        return 0.0;
    }
    let g1 = m3 / m2.powf(1.5);
    g1 * (n * (n - 1.0)).sqrt() / (n - 2.0)
}

pub fn nanmedian(values: &[f64], skipna: bool) -> f64 {
    let Some(mut v) = valid(values, skipna) else {
        return f64::NAN;
    };
    v.sort_by(f64::total_cmp);
    let mid = v.len() / 2;
    if v.len() % 2 == 0 {
        (v[mid - 1] + v[mid]) / 2.0
    } else {
        v[mid]
    }
}

pub fn nanmin(values: &[f64], skipna: bool) -> f64 {
    valid(values, skipna).map_or(f64::NAN, |v| v.into_iter().fold(f64::INFINITY, f64::min))
}

pub fn nanmax(values: &[f64], skipna: bool) -> f64 {
    valid(values, skipna).map_or(f64::NAN, |v| v.into_iter().fold(f64::NEG_INFINITY, f64::max))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAN: f64 = f64::NAN;

    #[test]
    fn test_sum_skips_missing() {
        assert_eq!(nansum(&[1.0, NAN, 2.0], true), 3.0);
        assert!(nansum(&[1.0, NAN, 2.0], false).is_nan());
        assert!(nansum(&[NAN, NAN], true).is_nan());
    }

    #[test]
    fn test_mean_var_std() {
        let values = [2.0, 4.0, NAN, 6.0];
        assert_eq!(nanmean(&values, true), 4.0);
        assert_eq!(nanvar(&values, true), 4.0);
        assert_eq!(ReduceOp::Std.apply(&values, true), 2.0);
        assert!(nanvar(&[1.0], true).is_nan());
    }

    #[test]
    fn test_median_min_max_prod() {
        assert_eq!(nanmedian(&[3.0, 1.0, NAN, 2.0], true), 2.0);
        assert_eq!(nanmedian(&[4.0, 1.0, 3.0, 2.0], true), 2.5);
        assert_eq!(nanmin(&[3.0, NAN, -1.0], true), -1.0);
        assert_eq!(nanmax(&[3.0, NAN, -1.0], true), 3.0);
        assert_eq!(nanprod(&[2.0, NAN, 3.0], true), 6.0);
    }

    #[test]
    fn test_skew_symmetric_is_zero() {
        assert!(nanskew(&[1.0, 2.0, 3.0], true).abs() < 1e-12);
        assert!(nanskew(&[1.0, 2.0, 10.0], true) > 0.0);
        assert!(nanskew(&[1.0, 2.0], true).is_nan());
    }

    #[test]
    fn test_count() {
        assert_eq!(ReduceOp::Count.apply(&[NAN, 1.0, 2.0], true), 2.0);
        assert_eq!(ReduceOp::Count.apply(&[NAN], true), 0.0);
    }
}
