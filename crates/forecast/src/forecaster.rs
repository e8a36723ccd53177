use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::{debug, warn};

use crate::arima::{ArmaFit, estimate_conditioned};
use crate::error::ForecastError;
use crate::order::ModelOrder;
use crate::series::DailySeries;

/// Point forecast and uncertainty band for the days after the history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub order: ModelOrder,
    pub dates: Vec<NaiveDate>,
    /// Point forecasts, floored at zero.
    pub values: Vec<f64>,
    /// `(lower, upper)` per step, centered on the unfloored point forecast.
    ///
    /// Only the point is floored, so `lower` may be negative while the value is zero.
    pub intervals: Vec<(f64, f64)>,
}

impl ForecastResult {
    pub fn horizon(&self) -> usize {
        self.values.len()
    }

    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    /// Population standard deviation of the point forecasts.
    pub fn std_dev(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let mean = self.mean();
        let var = self
            .values
            .iter()
            .map(|v| (v - mean) * (v - mean))
            .sum::<f64>()
            / self.values.len() as f64;
        var.sqrt()
    }
}

/// Re-estimate `order` on the full series and project `periods` days ahead.
///
/// `confidence` is the two-sided level of the intervals (e.g. 0.95).
pub fn forecast(
    series: &DailySeries,
    order: ModelOrder,
    periods: usize,
    confidence: f64,
) -> Result<ForecastResult, ForecastError> {
    forecast_conditioned(series, order, order.p, periods, confidence)
}

/// [`forecast`] with the likelihood burn-in used during order selection, so the
/// final fit is the one that was ranked.
pub fn forecast_conditioned(
    series: &DailySeries,
    order: ModelOrder,
    burn_in: usize,
    periods: usize,
    confidence: f64,
) -> Result<ForecastResult, ForecastError> {
    if periods == 0 {
        return Err(ForecastError::InvalidInput(
            "periods must be at least 1".to_string(),
        ));
    }
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(ForecastError::InvalidInput(
            "confidence must be in (0, 1)".to_string(),
        ));
    }

    let fit = estimate_conditioned(series.values(), order, burn_in).map_err(|failure| {
        warn!(%order, %failure, "final re-estimation failed");
        ForecastError::ForecastUnavailable(format!("{order} re-estimation failed: {failure}"))
    })?;

    let points = point_forecasts(series.values(), &fit, periods);
    let psi = psi_weights(&fit, periods);
    let z = Normal::new(0.0, 1.0)
        .map_err(|e| ForecastError::InvalidInput(format!("standard normal: {e}")))?
        .inverse_cdf(0.5 + confidence / 2.0);

    let mut cumulative = 0.0;
    let mut values = Vec::with_capacity(periods);
    let mut intervals = Vec::with_capacity(periods);
    for (point, weight) in points.iter().zip(&psi) {
        cumulative += weight * weight;
        let half_width = z * (fit.sigma2 * cumulative).sqrt();
        values.push(point.max(0.0));
        intervals.push((point - half_width, point + half_width));
    }

    debug!(%order, sigma2 = fit.sigma2, periods, "forecast produced");

    Ok(ForecastResult {
        order,
        dates: series.future_dates(periods),
        values,
        intervals,
    })
}

/// Coefficients `φ*_i` of `φ(B)(1 - B)^d = 1 - Σ φ*_i B^i`.
pub fn integrated_ar(ar: &[f64], d: usize) -> Vec<f64> {
    let mut poly: Vec<f64> = std::iter::once(1.0).chain(ar.iter().map(|a| -a)).collect();
    for _ in 0..d {
        let mut next = vec![0.0; poly.len() + 1];
        for (i, c) in poly.iter().enumerate() {
            next[i] += c;
            next[i + 1] -= c;
        }
        poly = next;
    }
    poly.iter().skip(1).map(|c| -c).collect()
}

/// Recursive point forecasts on the level scale.
fn point_forecasts(levels: &[f64], fit: &ArmaFit, periods: usize) -> Vec<f64> {
    let d = fit.order.d;
    let phi = integrated_ar(&fit.ar, d);
    let n = levels.len();

    // Residual of level index t sits at differenced index t - d.
    let residual_at = |t: usize| -> f64 {
        if t < d || t >= n {
            return 0.0;
        }
        fit.residuals.get(t - d).copied().unwrap_or(0.0)
    };

    let mut extended: Vec<f64> = levels.iter().map(|y| y - fit.mean).collect();
    let mut out = Vec::with_capacity(periods);
    for h in 0..periods {
        let t = n + h;
        let mut value = 0.0;
        for (i, c) in phi.iter().enumerate() {
            if let Some(lag) = t.checked_sub(i + 1) {
                value += c * extended[lag];
            }
        }
        for (j, theta) in fit.ma.iter().enumerate() {
            if let Some(lag) = t.checked_sub(j + 1) {
                value += theta * residual_at(lag);
            }
        }
        extended.push(value);
        out.push(value + fit.mean);
    }
    out
}

/// MA(∞) weights `ψ_0..ψ_{h-1}` of the integrated model.
pub fn psi_weights(fit: &ArmaFit, horizon: usize) -> Vec<f64> {
    let phi = integrated_ar(&fit.ar, fit.order.d);
    let mut psi = Vec::with_capacity(horizon);
    for j in 0..horizon {
        if j == 0 {
            psi.push(1.0);
            continue;
        }
        let mut value = fit.ma.get(j - 1).copied().unwrap_or(0.0);
        for (i, c) in phi.iter().enumerate().take(j) {
            value += c * psi[j - i - 1];
        }
        psi.push(value);
    }
    psi
}
