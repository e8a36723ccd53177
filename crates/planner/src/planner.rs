use tracing::{info, warn};

use stockcast_core::DomainError;
use stockcast_forecast::ForecastError;
use stockcast_inventory::{
    DemandAssessment, DemandStrategy, ExactForecastStrategy, HistoricalApproximation,
    InventoryMetrics, PlanningError, calculate,
};

use crate::config::PlannerConfig;
use crate::report::{ForecastSection, RestockReport, ScanEntry};
use crate::snapshot::ProductSnapshot;

/// Stateless request pipeline; every call recomputes from the snapshot it is given.
#[derive(Debug, Clone, Default)]
pub struct RestockPlanner {
    config: PlannerConfig,
}

impl RestockPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Forecast-backed report for one product.
    pub fn forecast(&self, snapshot: &ProductSnapshot) -> Result<RestockReport, PlanningError> {
        let config = snapshot.request.apply(&self.config);
        let strategy = ExactForecastStrategy::new(config.forecast.clone());
        let (assessment, metrics) = self.plan_with(&strategy, snapshot, &config)?;

        let outcome = assessment.forecast.ok_or_else(|| {
            ForecastError::ForecastUnavailable("strategy returned no forecast".to_string())
        })?;

        Ok(RestockReport {
            model_order: outcome.selection.order,
            forecast: ForecastSection::from(&outcome.forecast),
            metrics,
        })
    }

    /// Approximate metrics for every product, for listing pages.
    ///
    /// A product that cannot be planned (e.g. invalid profile) gets an entry with
    /// `error` set instead of aborting the scan.
    pub fn scan(&self, snapshots: &[ProductSnapshot]) -> Vec<ScanEntry> {
        let entries: Vec<ScanEntry> = snapshots
            .iter()
            .map(|snapshot| {
                let config = snapshot.request.apply(&self.config);
                let strategy = HistoricalApproximation::new(config.policy.approximate_std_fraction);
                match self.plan_with(&strategy, snapshot, &config) {
                    Ok((_, metrics)) => ScanEntry {
                        product_id: snapshot.product_id,
                        metrics: Some(metrics),
                        error: None,
                    },
                    Err(e) => {
                        warn!(
                            product = %snapshot.product_id,
                            error = %e,
                            "product skipped in scan"
                        );
                        ScanEntry {
                            product_id: snapshot.product_id,
                            metrics: None,
                            error: Some(e.to_string()),
                        }
                    }
                }
            })
            .collect();

        let reorder = entries.iter().filter(|e| e.reorder_needed()).count();
        info!(products = entries.len(), reorder, "inventory scan completed");
        entries
    }

    /// Run `strategy` and feed its estimate through the policy calculator.
    pub fn plan_with(
        &self,
        strategy: &dyn DemandStrategy,
        snapshot: &ProductSnapshot,
        config: &PlannerConfig,
    ) -> Result<(DemandAssessment, InventoryMetrics), PlanningError> {
        snapshot.profile.validate()?;
        if snapshot.sales.iter().any(|e| e.product_id != snapshot.product_id) {
            return Err(DomainError::invariant("sales history contains another product").into());
        }

        let assessment = strategy.assess(snapshot.product_id, &snapshot.sales)?;
        let metrics = calculate(assessment.estimate, &snapshot.profile, &config.policy)?;

        info!(
            product = %snapshot.product_id,
            strategy = strategy.name(),
            eoq = metrics.eoq,
            reorder_point = metrics.reorder_point,
            status = ?metrics.stock_status,
            "restock plan computed"
        );
        Ok((assessment, metrics))
    }
}
