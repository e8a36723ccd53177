//! Augmented Dickey-Fuller unit-root test and the differencing range it implies.
//!
//! Regression (constant, no trend):
//! `Δy_t = α + γ y_{t-1} + Σ_{i=1..k} β_i Δy_{t-i} + e_t`
//!
//! `k` is picked by minimum AIC over `0..=maxlag` on a common sample, then the
//! regression is refit on every row available for that `k`. The statistic is the
//! t-value of `γ`; its p-value comes from MacKinnon's (1994) response surface.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use statrs::function::erf::erfc;
use tracing::debug;

use crate::ols::ols;

/// Below this p-value the unit root is rejected.
pub const SIGNIFICANCE: f64 = 0.05;

// MacKinnon (1994), constant-only regression, one series.
const TAU_MAX: f64 = 2.74;
const TAU_MIN: f64 = -18.83;
const TAU_STAR: f64 = -1.61;
const TAU_SMALL_P: [f64; 3] = [2.1659, 1.4412, 0.038269];
const TAU_LARGE_P: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdfOutcome {
    pub statistic: f64,
    pub p_value: f64,
    pub used_lag: usize,
    pub nobs: usize,
}

/// Inclusive range of differencing orders the order search may try.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifferencingRange {
    pub min: usize,
    pub max: usize,
}

impl DifferencingRange {
    pub fn only(d: usize) -> Self {
        Self { min: d, max: d }
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + Clone {
        self.min..=self.max
    }

    pub fn len(&self) -> usize {
        self.max + 1 - self.min
    }

    pub fn is_empty(&self) -> bool {
        self.max < self.min
    }

    pub fn contains(&self, d: usize) -> bool {
        (self.min..=self.max).contains(&d)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StationarityVerdict {
    /// Unit root rejected; only `d = 0` is tried.
    Stationary { p_value: f64 },
    /// Unit root not rejected; `d` in `1..=max_d`.
    NonStationary { p_value: f64 },
    /// The test could not be computed; `d = 1` only.
    Undetermined,
}

impl StationarityVerdict {
    pub fn differencing_range(&self, max_d: usize) -> DifferencingRange {
        match self {
            StationarityVerdict::Stationary { .. } => DifferencingRange::only(0),
            StationarityVerdict::NonStationary { .. } => DifferencingRange {
                min: 1,
                max: max_d.max(1),
            },
            StationarityVerdict::Undetermined => DifferencingRange::only(1),
        }
    }

    pub fn p_value(&self) -> Option<f64> {
        match self {
            StationarityVerdict::Stationary { p_value }
            | StationarityVerdict::NonStationary { p_value } => Some(*p_value),
            StationarityVerdict::Undetermined => None,
        }
    }
}

/// Classify `values` and derive the differencing range.
pub fn classify(values: &[f64]) -> StationarityVerdict {
    let verdict = match adf_test(values) {
        Some(outcome) if outcome.p_value < SIGNIFICANCE => StationarityVerdict::Stationary {
            p_value: outcome.p_value,
        },
        Some(outcome) => StationarityVerdict::NonStationary {
            p_value: outcome.p_value,
        },
        None => StationarityVerdict::Undetermined,
    };
    debug!(?verdict, n = values.len(), "stationarity classified");
    verdict
}

/// Run the ADF test. `None` when the sample is too short or degenerate.
pub fn adf_test(values: &[f64]) -> Option<AdfOutcome> {
    let n = values.len();
    let nobs_diff = n.checked_sub(1)?;

    // maxlag = ceil(12 (n/100)^(1/4)), capped so the regression keeps enough rows.
    let schwert = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize;
    let cap = (n / 2).checked_sub(2)?;
    let maxlag = schwert.min(cap);

    let diffs: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
    if variance(&diffs) <= f64::EPSILON {
        return None;
    }

    // Lag search on the common sample that has `maxlag` lags for every row.
    let mut best: Option<(f64, usize)> = None;
    for lag in 0..=maxlag {
        let Some(fit) = adf_regression(values, &diffs, lag, maxlag) else {
            continue;
        };
        let aic = fit.aic();
        if best.is_none_or(|(best_aic, _)| aic < best_aic) {
            best = Some((aic, lag));
        }
    }
    let (_, used_lag) = best?;

    let fit = adf_regression(values, &diffs, used_lag, used_lag)?;
    let statistic = fit.t_value(1);
    if !statistic.is_finite() {
        return None;
    }

    Some(AdfOutcome {
        statistic,
        p_value: mackinnon_p_value(statistic),
        used_lag,
        nobs: nobs_diff - used_lag,
    })
}

/// OLS of `Δy_t` on `[1, y_{t-1}, Δy_{t-1}, .., Δy_{t-lag}]` for rows `t >= first_row`.
fn adf_regression(
    levels: &[f64],
    diffs: &[f64],
    lag: usize,
    first_row: usize,
) -> Option<crate::ols::OlsFit> {
    let rows: Vec<usize> = (first_row..diffs.len()).collect();
    let cols = 2 + lag;
    if rows.len() <= cols {
        return None;
    }

    let x = DMatrix::from_fn(rows.len(), cols, |r, c| {
        let t = rows[r];
        match c {
            0 => 1.0,
            1 => levels[t],
            _ => diffs[t - (c - 1)],
        }
    });
    let y = DVector::from_iterator(rows.len(), rows.iter().map(|&t| diffs[t]));
    ols(&x, &y)
}

/// Approximate p-value of the ADF statistic (constant, one series).
pub fn mackinnon_p_value(statistic: f64) -> f64 {
    if statistic > TAU_MAX {
        return 1.0;
    }
    if statistic < TAU_MIN {
        return 0.0;
    }
    let poly = if statistic <= TAU_STAR {
        polyval(&TAU_SMALL_P, statistic)
    } else {
        polyval(&TAU_LARGE_P, statistic)
    };
    // Standard normal CDF.
    0.5 * erfc(-poly / std::f64::consts::SQRT_2)
}

fn polyval(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

fn variance(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    let mean = xs.iter().sum::<f64>() / xs.len() as f64;
    xs.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / xs.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn white_noise(n: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n).map(|_| 50.0 + rng.gen_range(-10.0..10.0)).collect()
    }

    fn trending(n: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|t| 5.0 * t as f64 + rng.gen_range(0.0..3.0))
            .collect()
    }

    #[test]
    fn p_value_surface_matches_known_critical_values() {
        // 5% and 1% critical values for the constant-only case.
        assert!((mackinnon_p_value(-2.86) - 0.05).abs() < 0.005);
        assert!((mackinnon_p_value(-3.43) - 0.01).abs() < 0.003);
        assert_eq!(mackinnon_p_value(3.0), 1.0);
        assert_eq!(mackinnon_p_value(-20.0), 0.0);
    }

    #[test]
    fn white_noise_is_stationary() {
        let values = white_noise(200, 7);
        let outcome = adf_test(&values).unwrap();
        assert!(outcome.p_value < SIGNIFICANCE, "{outcome:?}");

        let verdict = classify(&values);
        assert!(matches!(verdict, StationarityVerdict::Stationary { .. }));
        assert_eq!(verdict.differencing_range(2), DifferencingRange::only(0));
    }

    #[test]
    fn strong_trend_is_non_stationary() {
        let values = trending(120, 11);
        let verdict = classify(&values);
        assert!(
            matches!(verdict, StationarityVerdict::NonStationary { .. }),
            "{verdict:?}"
        );
        let range = verdict.differencing_range(2);
        assert_eq!(range.iter().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn constant_series_is_undetermined() {
        let values = vec![10.0; 60];
        assert!(adf_test(&values).is_none());
        let verdict = classify(&values);
        assert_eq!(verdict, StationarityVerdict::Undetermined);
        assert_eq!(verdict.differencing_range(2), DifferencingRange::only(1));
    }

    #[test]
    fn too_short_series_is_undetermined() {
        assert!(adf_test(&[1.0, 4.0, 2.0]).is_none());
        assert_eq!(classify(&[]), StationarityVerdict::Undetermined);
    }
}
