use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ForecastError;

/// Knobs of the forecasting pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Forecast horizon in days.
    pub periods: usize,
    pub max_p: usize,
    /// Upper bound of the differencing range tried for non-stationary series.
    pub max_d: usize,
    pub max_q: usize,
    /// Two-sided confidence level of the forecast intervals.
    pub confidence: f64,
    /// Minimum number of distinct sales days.
    pub min_history: usize,
    /// Wall-clock budget for the order search; `None` disables the bound.
    pub search_budget: Option<Duration>,
    /// Estimate grid-search candidates on the rayon pool.
    pub parallel: bool,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            periods: 30,
            max_p: 3,
            max_d: 2,
            max_q: 3,
            confidence: 0.95,
            min_history: 10,
            search_budget: Some(Duration::from_secs(10)),
            parallel: true,
        }
    }
}

impl ForecastConfig {
    pub fn with_periods(mut self, periods: usize) -> Self {
        self.periods = periods;
        self
    }

    pub fn with_orders(mut self, max_p: usize, max_d: usize, max_q: usize) -> Self {
        self.max_p = max_p;
        self.max_d = max_d;
        self.max_q = max_q;
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_min_history(mut self, min_history: usize) -> Self {
        self.min_history = min_history;
        self
    }

    pub fn with_search_budget(mut self, budget: Option<Duration>) -> Self {
        self.search_budget = budget;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn validate(&self) -> Result<(), ForecastError> {
        if self.periods == 0 {
            return Err(ForecastError::InvalidInput(
                "periods must be at least 1".to_string(),
            ));
        }
        if self.max_d == 0 {
            return Err(ForecastError::InvalidInput(
                "max_d must be at least 1 so non-stationary series can be differenced".to_string(),
            ));
        }
        if self.max_p == 0 && self.max_q == 0 {
            return Err(ForecastError::InvalidInput(
                "max_p and max_q cannot both be zero".to_string(),
            ));
        }
        if !(self.confidence.is_finite() && self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(ForecastError::InvalidInput(
                "confidence must be in (0, 1)".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = ForecastConfig::default();
        assert_eq!(cfg.periods, 30);
        assert_eq!((cfg.max_p, cfg.max_d, cfg.max_q), (3, 2, 3));
        assert_eq!(cfg.min_history, 10);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_degenerate_settings() {
        assert!(ForecastConfig::default().with_periods(0).validate().is_err());
        assert!(ForecastConfig::default().with_orders(0, 2, 0).validate().is_err());
        assert!(ForecastConfig::default().with_orders(3, 0, 3).validate().is_err());
        assert!(ForecastConfig::default().with_confidence(1.0).validate().is_err());
    }
}
