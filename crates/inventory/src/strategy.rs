use serde::Serialize;
use tracing::debug;

use stockcast_core::{ProductId, SalesEvent};
use stockcast_forecast::{DailySeries, ForecastConfig, ForecastError, ForecastJob, ForecastOutcome};

use crate::error::PlanningError;
use crate::policy::{DemandEstimate, PolicyConfig};

/// Demand estimate plus whatever the strategy derived it from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemandAssessment {
    pub strategy: &'static str,
    pub estimate: DemandEstimate,
    /// Present for forecast-backed strategies.
    pub forecast: Option<ForecastOutcome>,
}

/// Source of the daily demand figures fed into the policy calculator.
///
/// Callers pick a strategy explicitly; strategies never fall through to each other.
pub trait DemandStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn assess(
        &self,
        product_id: ProductId,
        events: &[SalesEvent],
    ) -> Result<DemandAssessment, PlanningError>;
}

/// Fit a forecast and summarize it: mean and population standard deviation of the
/// point forecasts.
#[derive(Debug, Clone, Default)]
pub struct ExactForecastStrategy {
    config: ForecastConfig,
}

impl ExactForecastStrategy {
    pub const NAME: &'static str = "exact_forecast";

    pub fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }
}

impl DemandStrategy for ExactForecastStrategy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn assess(
        &self,
        product_id: ProductId,
        events: &[SalesEvent],
    ) -> Result<DemandAssessment, PlanningError> {
        let outcome = ForecastJob::new(product_id, events)
            .with_config(self.config.clone())
            .run()?;

        let estimate = DemandEstimate {
            avg_daily_demand: outcome.forecast.mean(),
            demand_std: outcome.forecast.std_dev(),
        };

        Ok(DemandAssessment {
            strategy: Self::NAME,
            estimate,
            forecast: Some(outcome),
        })
    }
}

/// Listing-scan shortcut: mean of the gap-filled daily history, with the spread
/// assumed to be `std_fraction` of that mean instead of estimated.
///
/// This is a deliberate approximation. No model is fitted and no minimum history
/// applies; a product without sales gets zero demand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoricalApproximation {
    std_fraction: f64,
}

impl Default for HistoricalApproximation {
    fn default() -> Self {
        Self::new(PolicyConfig::default().approximate_std_fraction)
    }
}

impl HistoricalApproximation {
    pub const NAME: &'static str = "historical_approximation";

    pub fn new(std_fraction: f64) -> Self {
        Self { std_fraction }
    }

    pub fn std_fraction(&self) -> f64 {
        self.std_fraction
    }
}

impl DemandStrategy for HistoricalApproximation {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn assess(
        &self,
        product_id: ProductId,
        events: &[SalesEvent],
    ) -> Result<DemandAssessment, PlanningError> {
        let avg_daily_demand = match DailySeries::from_events(product_id, events) {
            Ok(series) => series.mean(),
            Err(ForecastError::InsufficientHistory { .. }) => 0.0,
            Err(e) => return Err(e.into()),
        };

        debug!(
            product = %product_id,
            avg_daily_demand,
            std_fraction = self.std_fraction,
            "approximate demand"
        );

        Ok(DemandAssessment {
            strategy: Self::NAME,
            estimate: DemandEstimate {
                avg_daily_demand,
                demand_std: self.std_fraction * avg_daily_demand,
            },
            forecast: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Days, NaiveDate};

    fn history(product: ProductId, quantities: &[u64]) -> Vec<SalesEvent> {
        let start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        quantities
            .iter()
            .enumerate()
            .map(|(i, q)| SalesEvent::new(product, start + Days::new(i as u64), *q))
            .collect()
    }

    #[test]
    fn approximation_uses_fixed_fraction_of_mean() {
        let product = ProductId::new();
        let events = history(product, &[4, 6, 8, 2]);
        let assessment = HistoricalApproximation::default()
            .assess(product, &events)
            .unwrap();
        assert_eq!(assessment.strategy, HistoricalApproximation::NAME);
        assert!((assessment.estimate.avg_daily_demand - 5.0).abs() < 1e-12);
        assert!((assessment.estimate.demand_std - 1.5).abs() < 1e-12);
        assert!(assessment.forecast.is_none());
    }

    #[test]
    fn default_fraction_follows_policy_config() {
        assert_eq!(
            HistoricalApproximation::default().std_fraction(),
            PolicyConfig::default().approximate_std_fraction
        );
    }

    #[test]
    fn approximation_counts_gap_days_as_zero() {
        let product = ProductId::new();
        let start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let events = vec![
            SalesEvent::new(product, start, 6),
            SalesEvent::new(product, start + Days::new(2), 3),
        ];
        let assessment = HistoricalApproximation::new(0.5).assess(product, &events).unwrap();
        assert!((assessment.estimate.avg_daily_demand - 3.0).abs() < 1e-12);
        assert!((assessment.estimate.demand_std - 1.5).abs() < 1e-12);
    }

    #[test]
    fn approximation_without_history_is_zero() {
        let assessment = HistoricalApproximation::default()
            .assess(ProductId::new(), &[])
            .unwrap();
        assert_eq!(assessment.estimate.avg_daily_demand, 0.0);
        assert_eq!(assessment.estimate.demand_std, 0.0);
    }

    #[test]
    fn exact_strategy_summarizes_the_forecast() {
        let product = ProductId::new();
        let events = history(product, &[10; 45]);
        let assessment = ExactForecastStrategy::default()
            .assess(product, &events)
            .unwrap();
        assert_eq!(assessment.strategy, ExactForecastStrategy::NAME);
        assert!((assessment.estimate.avg_daily_demand - 10.0).abs() < 1e-6);
        assert!(assessment.estimate.demand_std < 1e-6);
        assert_eq!(assessment.forecast.unwrap().forecast.horizon(), 30);
    }

    #[test]
    fn exact_strategy_surfaces_insufficient_history() {
        let product = ProductId::new();
        let events = history(product, &[1, 2, 3]);
        let err = ExactForecastStrategy::default()
            .assess(product, &events)
            .unwrap_err();
        assert!(matches!(
            err,
            PlanningError::Forecast(ForecastError::InsufficientHistory { found: 3, .. })
        ));
    }
}
