//! ARMA estimation on a differenced series.
//!
//! Contract: `(series, order) -> ArmaFit | FitFailure`. The series is differenced
//! `d` times (and demeaned when `d = 0`), then AR/MA coefficients are fitted by
//! conditional sum of squares: pre-sample residuals are zero and the first `p`
//! observations only seed the AR lags.
//!
//! The likelihood starts at a burn-in offset. Orders compared by AIC must share
//! it, otherwise a larger `p` is scored on fewer observations and wins by default.

use levenberg_marquardt::{LeastSquaresProblem, LevenbergMarquardt};
use nalgebra::{DMatrix, DVector, Dyn, Owned};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::order::ModelOrder;

/// Residual variance never drops below this, so perfectly fitted (e.g. constant)
/// series keep a finite AIC and a defined forecast variance.
pub const SIGMA2_FLOOR: f64 = 1e-12;

/// Residual degrees of freedom required beyond the estimated coefficients.
const MIN_DEGREES_OF_FREEDOM: usize = 3;

const JACOBIAN_STEP: f64 = 1e-7;

/// Why a candidate order could not be estimated.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitFailure {
    #[error("not enough observations: need {needed}, have {available}")]
    NotEnoughObservations { needed: usize, available: usize },

    #[error("singular estimation problem")]
    Singular,

    #[error("optimizer did not converge")]
    NotConverged,

    #[error("autoregressive part is not stationary")]
    NonStationary,

    #[error("moving-average part is not invertible")]
    NonInvertible,

    #[error("non-finite residuals")]
    NonFinite,

    #[error("search budget exhausted before estimation")]
    BudgetExhausted,
}

/// Estimated ARIMA model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmaFit {
    pub order: ModelOrder,
    /// `φ_1..φ_p` in `w_t = Σ φ_i w_{t-i} + e_t + Σ θ_j e_{t-j}`.
    pub ar: Vec<f64>,
    /// `θ_1..θ_q`.
    pub ma: Vec<f64>,
    /// Mean of the differenced series (always 0 when `d > 0`).
    pub mean: f64,
    pub sigma2: f64,
    pub aic: f64,
    /// Residuals aligned with the differenced series; the first `p` are zero.
    pub residuals: Vec<f64>,
    /// Residuals entering the likelihood (`len(differenced) - burn_in`).
    pub nobs: usize,
}

impl ArmaFit {
    /// Estimated parameters: coefficients, mean when `d = 0`, and the variance.
    pub fn parameter_count(&self) -> usize {
        self.order.coefficient_count() + usize::from(self.order.d == 0) + 1
    }
}

pub type FitResult = Result<ArmaFit, FitFailure>;

/// Apply `(1 - B)` `d` times.
pub fn difference(values: &[f64], d: usize) -> Vec<f64> {
    let mut out = values.to_vec();
    for _ in 0..d {
        out = out.windows(2).map(|w| w[1] - w[0]).collect();
    }
    out
}

/// Estimate `order` on `values`, conditioning on its own `p` lags.
pub fn estimate(values: &[f64], order: ModelOrder) -> FitResult {
    estimate_conditioned(values, order, order.p)
}

/// Estimate `order` with the likelihood starting `burn_in` observations into the
/// differenced series (never fewer than `p`).
///
/// Residuals before the burn-in are still computed and seed the MA lags; they just
/// do not enter the objective, the variance or the AIC.
pub fn estimate_conditioned(values: &[f64], order: ModelOrder, burn_in: usize) -> FitResult {
    let (p, q) = (order.p, order.q);
    let burn_in = burn_in.max(p);
    let w = difference(values, order.d);
    let needed = burn_in + p + q + MIN_DEGREES_OF_FREEDOM;
    if w.len() < needed || order.coefficient_count() == 0 {
        return Err(FitFailure::NotEnoughObservations {
            needed: needed + order.d,
            available: values.len(),
        });
    }

    let mean = if order.d == 0 {
        w.iter().sum::<f64>() / w.len() as f64
    } else {
        0.0
    };
    let z: Vec<f64> = w.iter().map(|v| v - mean).collect();

    let problem = CssProblem {
        z: &z,
        p,
        q,
        burn_in,
        params: DVector::zeros(p + q),
    };
    let (problem, report) = LevenbergMarquardt::new().minimize(problem);
    if !report.termination.was_successful() {
        return Err(FitFailure::NotConverged);
    }

    let params = problem.params;
    if params.iter().any(|v| !v.is_finite()) {
        return Err(FitFailure::NonFinite);
    }
    let ar = params.as_slice()[..p].to_vec();
    let ma = params.as_slice()[p..].to_vec();

    if !is_stationary(&ar) {
        return Err(FitFailure::NonStationary);
    }
    if !is_invertible(&ma) {
        return Err(FitFailure::NonInvertible);
    }

    let residuals = css_residuals(&z, &ar, &ma).ok_or(FitFailure::NonFinite)?;
    let nobs = z.len() - burn_in;
    let rss: f64 = residuals[burn_in..].iter().map(|e| e * e).sum();
    let sigma2 = (rss / nobs as f64).max(SIGMA2_FLOOR);
    if !sigma2.is_finite() {
        return Err(FitFailure::NonFinite);
    }

    let mut fit = ArmaFit {
        order,
        ar,
        ma,
        mean,
        sigma2,
        aic: f64::NAN,
        residuals,
        nobs,
    };
    fit.aic = aic(sigma2, nobs, fit.parameter_count());
    Ok(fit)
}

/// Gaussian AIC: `n ln(2π σ²) + n + 2k`.
pub fn aic(sigma2: f64, nobs: usize, parameters: usize) -> f64 {
    let n = nobs as f64;
    n * (2.0 * std::f64::consts::PI * sigma2).ln() + n + 2.0 * parameters as f64
}

/// CSS residuals of the demeaned series `z`; `None` if the recursion blows up.
fn css_residuals(z: &[f64], ar: &[f64], ma: &[f64]) -> Option<Vec<f64>> {
    let p = ar.len();
    let mut e = vec![0.0; z.len()];
    for t in p..z.len() {
        let mut value = z[t];
        for (i, phi) in ar.iter().enumerate() {
            value -= phi * z[t - i - 1];
        }
        for (j, theta) in ma.iter().enumerate() {
            if let Some(lag) = t.checked_sub(j + 1) {
                value -= theta * e[lag];
            }
        }
        if !value.is_finite() {
            return None;
        }
        e[t] = value;
    }
    Some(e)
}

/// Schur-Cohn step-down test: roots of `1 - Σ a_j z^j` lie outside the unit circle.
pub fn is_stationary(coefficients: &[f64]) -> bool {
    let mut a = coefficients.to_vec();
    while let Some(&reflection) = a.last() {
        if !reflection.is_finite() || reflection.abs() >= 1.0 {
            return false;
        }
        let k = a.len();
        let scale = 1.0 - reflection * reflection;
        let next: Vec<f64> = (0..k - 1)
            .map(|j| (a[j] + reflection * a[k - 2 - j]) / scale)
            .collect();
        a = next;
    }
    true
}

/// MA polynomial `1 + Σ θ_j z^j` has all roots outside the unit circle.
pub fn is_invertible(ma: &[f64]) -> bool {
    let negated: Vec<f64> = ma.iter().map(|theta| -theta).collect();
    is_stationary(&negated)
}

/// Least-squares view of the CSS objective for Levenberg-Marquardt.
struct CssProblem<'a> {
    z: &'a [f64],
    p: usize,
    q: usize,
    burn_in: usize,
    params: DVector<f64>,
}

impl CssProblem<'_> {
    fn residuals_for(&self, params: &DVector<f64>) -> Option<DVector<f64>> {
        let (ar, ma) = params.as_slice().split_at(self.p);
        debug_assert_eq!(ma.len(), self.q);
        let e = css_residuals(self.z, ar, ma)?;
        Some(DVector::from_column_slice(&e[self.burn_in..]))
    }
}

impl LeastSquaresProblem<f64, Dyn, Dyn> for CssProblem<'_> {
    type ResidualStorage = Owned<f64, Dyn>;
    type JacobianStorage = Owned<f64, Dyn, Dyn>;
    type ParameterStorage = Owned<f64, Dyn>;

    fn set_params(&mut self, x: &DVector<f64>) {
        self.params.copy_from(x);
    }

    fn params(&self) -> DVector<f64> {
        self.params.clone()
    }

    fn residuals(&self) -> Option<DVector<f64>> {
        self.residuals_for(&self.params)
    }

    /// Forward-difference Jacobian.
    fn jacobian(&self) -> Option<DMatrix<f64>> {
        let base = self.residuals_for(&self.params)?;
        let mut jac = DMatrix::zeros(base.len(), self.params.len());
        for k in 0..self.params.len() {
            let step = JACOBIAN_STEP * self.params[k].abs().max(1.0);
            let mut shifted = self.params.clone();
            shifted[k] += step;
            let moved = self.residuals_for(&shifted)?;
            jac.set_column(k, &((moved - &base) / step));
        }
        Some(jac)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn gaussian(rng: &mut StdRng) -> f64 {
        // Box-Muller.
        let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
        let u2: f64 = rng.r#gen();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }

    fn simulate_ar1(phi: f64, n: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut y = Vec::with_capacity(n);
        let mut prev = 0.0;
        for _ in 0..n {
            prev = phi * prev + gaussian(&mut rng);
            y.push(20.0 + prev);
        }
        y
    }

    fn simulate_ma1(theta: f64, n: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut prev_e = 0.0;
        (0..n)
            .map(|_| {
                let e = gaussian(&mut rng);
                let y = e + theta * prev_e;
                prev_e = e;
                y
            })
            .collect()
    }

    #[test]
    fn differencing_reduces_length_per_pass() {
        let values = [1.0, 4.0, 9.0, 16.0, 25.0];
        assert_eq!(difference(&values, 0), values.to_vec());
        assert_eq!(difference(&values, 1), vec![3.0, 5.0, 7.0, 9.0]);
        assert_eq!(difference(&values, 2), vec![2.0, 2.0, 2.0]);
    }

    #[test]
    fn step_down_test_matches_known_regions() {
        assert!(is_stationary(&[]));
        assert!(is_stationary(&[0.5]));
        assert!(is_stationary(&[-0.9]));
        assert!(!is_stationary(&[1.0]));
        assert!(!is_stationary(&[1.2]));
        assert!(is_stationary(&[0.5, 0.3]));
        assert!(!is_stationary(&[0.5, 0.6]));
        assert!(!is_stationary(&[0.2, -1.1]));

        assert!(is_invertible(&[0.4]));
        assert!(!is_invertible(&[-1.0]));
    }

    #[test]
    fn recovers_ar1_coefficient() {
        let values = simulate_ar1(0.6, 600, 42);
        let fit = estimate(&values, ModelOrder::new(1, 0, 0).unwrap()).unwrap();
        assert!((fit.ar[0] - 0.6).abs() < 0.1, "phi = {}", fit.ar[0]);
        assert!((fit.mean - 20.0).abs() < 0.5);
        assert!((fit.sigma2 - 1.0).abs() < 0.2);
        assert_eq!(fit.parameter_count(), 3);
        assert_eq!(fit.nobs, 599);
    }

    #[test]
    fn recovers_ma1_coefficient() {
        let values = simulate_ma1(0.5, 800, 3);
        let fit = estimate(&values, ModelOrder::new(0, 0, 1).unwrap()).unwrap();
        assert!((fit.ma[0] - 0.5).abs() < 0.12, "theta = {}", fit.ma[0]);
        assert!(fit.aic.is_finite());
    }

    #[test]
    fn constant_series_fits_with_floored_variance() {
        let values = vec![10.0; 60];
        let fit = estimate(&values, ModelOrder::new(0, 1, 1).unwrap()).unwrap();
        assert_eq!(fit.sigma2, SIGMA2_FLOOR);
        assert!(fit.aic.is_finite());
        assert!(fit.residuals.iter().all(|e| *e == 0.0));
    }

    #[test]
    fn short_series_is_rejected() {
        let err = estimate(&[1.0, 2.0, 3.0, 4.0], ModelOrder::new(2, 1, 2).unwrap()).unwrap_err();
        assert!(matches!(err, FitFailure::NotEnoughObservations { .. }));
    }

    #[test]
    fn shared_burn_in_scores_orders_on_one_sample() {
        let values = simulate_ar1(0.0, 120, 8);
        let low = estimate_conditioned(&values, ModelOrder::new(1, 0, 0).unwrap(), 3).unwrap();
        let high = estimate_conditioned(&values, ModelOrder::new(3, 0, 0).unwrap(), 3).unwrap();
        assert_eq!(low.nobs, 117);
        assert_eq!(high.nobs, 117);

        // Own-lag conditioning keeps the longer sample.
        let own = estimate(&values, ModelOrder::new(1, 0, 0).unwrap()).unwrap();
        assert_eq!(own.nobs, 119);
    }

    #[test]
    fn burn_in_never_drops_below_ar_order() {
        let values = simulate_ar1(0.5, 80, 2);
        let fit = estimate_conditioned(&values, ModelOrder::new(2, 0, 0).unwrap(), 0).unwrap();
        assert_eq!(fit.nobs, 78);
    }

    #[test]
    fn more_parameters_cost_aic() {
        let fewer = aic(2.0, 100, 2);
        let more = aic(2.0, 100, 3);
        assert!((more - fewer - 2.0).abs() < 1e-12);
    }
}
