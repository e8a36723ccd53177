use serde::{Deserialize, Serialize};
use tracing::info;

use stockcast_core::{ProductId, SalesEvent};

use crate::config::ForecastConfig;
use crate::error::ForecastError;
use crate::forecaster::{ForecastResult, forecast_conditioned};
use crate::selection::{Selection, select_order};
use crate::series::DailySeries;
use crate::stationarity::{StationarityVerdict, classify};

/// Everything the pipeline derived for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastOutcome {
    pub product_id: ProductId,
    pub series: DailySeries,
    pub stationarity: StationarityVerdict,
    pub selection: Selection,
    pub forecast: ForecastResult,
}

/// Forecast job for one product's sales history.
///
/// Model:
/// - Aggregate events into a gap-free daily series.
/// - Bound differencing with the ADF test.
/// - Grid-search `(p, d, q)` by AIC.
/// - Re-estimate the winner on the full series and project the horizon.
#[derive(Debug, Clone)]
pub struct ForecastJob<'a> {
    product_id: ProductId,
    events: &'a [SalesEvent],
    config: ForecastConfig,
}

impl<'a> ForecastJob<'a> {
    pub fn new(product_id: ProductId, events: &'a [SalesEvent]) -> Self {
        Self {
            product_id,
            events,
            config: ForecastConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ForecastConfig) -> Self {
        self.config = config;
        self
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    pub fn run(&self) -> Result<ForecastOutcome, ForecastError> {
        self.config.validate()?;

        let series = DailySeries::from_events(self.product_id, self.events)?;
        series.ensure_min_history(self.config.min_history)?;

        let stationarity = classify(series.values());
        let d_range = stationarity.differencing_range(self.config.max_d);

        let selection = select_order(
            series.values(),
            d_range,
            self.config.max_p,
            self.config.max_q,
            self.config.search_budget,
            self.config.parallel,
        )?;

        let forecast = forecast_conditioned(
            &series,
            selection.order,
            selection.burn_in,
            self.config.periods,
            self.config.confidence,
        )?;

        info!(
            product = %self.product_id,
            days = series.len(),
            p_value = ?stationarity.p_value(),
            order = %selection.order,
            fell_back = selection.fell_back(),
            periods = self.config.periods,
            "demand forecast completed"
        );

        Ok(ForecastOutcome {
            product_id: self.product_id,
            series,
            stationarity,
            selection,
            forecast,
        })
    }
}
