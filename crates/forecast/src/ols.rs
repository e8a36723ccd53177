//! Ordinary least squares for the unit-root regression.

use nalgebra::{DMatrix, DVector};

/// Pivots below this fraction of their diagonal entry mark a collinear design.
const RELATIVE_PIVOT_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Clone, PartialEq)]
pub struct OlsFit {
    pub coefficients: DVector<f64>,
    pub std_errors: DVector<f64>,
    pub rss: f64,
    pub nobs: usize,
}

impl OlsFit {
    pub fn t_value(&self, column: usize) -> f64 {
        self.coefficients[column] / self.std_errors[column]
    }

    /// Gaussian log-likelihood AIC, one parameter per regressor.
    pub fn aic(&self) -> f64 {
        let n = self.nobs as f64;
        let k = self.coefficients.len() as f64;
        let llf = -n / 2.0 * ((2.0 * std::f64::consts::PI).ln() + (self.rss / n).ln() + 1.0);
        -2.0 * llf + 2.0 * k
    }
}

/// Fit `y = X b + e`. Returns `None` for collinear designs or too few rows.
pub fn ols(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<OlsFit> {
    let (n, k) = x.shape();
    if n <= k || y.len() != n {
        return None;
    }

    let xtx = x.transpose() * x;
    let chol = xtx.clone().cholesky()?;
    let l = chol.l();
    for i in 0..k {
        let diag = xtx[(i, i)];
        if diag <= 0.0 || l[(i, i)] * l[(i, i)] < RELATIVE_PIVOT_TOLERANCE * diag {
            return None;
        }
    }

    let coefficients = chol.solve(&(x.transpose() * y));
    let residuals = y - x * &coefficients;
    let rss = residuals.norm_squared();
    let s2 = rss / (n - k) as f64;
    let inverse = chol.inverse();
    let std_errors = DVector::from_iterator(k, (0..k).map(|i| (s2 * inverse[(i, i)]).sqrt()));

    if !(rss.is_finite() && std_errors.iter().all(|se| se.is_finite())) {
        return None;
    }

    Some(OlsFit {
        coefficients,
        std_errors,
        rss,
        nobs: n,
    })
}
