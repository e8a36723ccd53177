use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::debug;

use stockcast_core::{DomainError, DomainResult, ProductProfile};

const DAYS_PER_YEAR: f64 = 365.0;

/// Policy knobs shared by both demand strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Target probability of not stocking out during lead time.
    pub service_level: f64,
    /// Demand spread assumed by the approximate strategy, as a fraction of mean demand.
    pub approximate_std_fraction: f64,
    /// Decimal places of the reported figures.
    pub decimals: u32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            service_level: 0.95,
            approximate_std_fraction: 0.3,
            decimals: 2,
        }
    }
}

impl PolicyConfig {
    pub fn with_service_level(mut self, service_level: f64) -> Self {
        self.service_level = service_level;
        self
    }
}

/// Daily demand summary fed into the policy formulas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemandEstimate {
    pub avg_daily_demand: f64,
    pub demand_std: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Reorder,
    Ok,
}

/// Reorder parameters for one product. Figures are rounded at this boundary only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryMetrics {
    pub avg_daily_demand: f64,
    pub demand_std: f64,
    pub annual_demand: f64,
    pub eoq: f64,
    pub safety_stock: f64,
    pub reorder_point: f64,
    pub current_stock: u64,
    pub stock_status: StockStatus,
}

impl InventoryMetrics {
    pub fn reorder_needed(&self) -> bool {
        self.stock_status == StockStatus::Reorder
    }
}

/// `sqrt(2 D S / H)`; zero when annual demand or holding cost is not positive.
pub fn economic_order_quantity(annual_demand: f64, ordering_cost: f64, holding_cost: f64) -> f64 {
    if annual_demand <= 0.0 || holding_cost <= 0.0 {
        return 0.0;
    }
    (2.0 * annual_demand * ordering_cost / holding_cost).sqrt()
}

/// `z * σ_daily * sqrt(lead time)`.
pub fn safety_stock(demand_std: f64, lead_time_days: f64, z: f64) -> f64 {
    z * demand_std * lead_time_days.sqrt()
}

pub fn reorder_point(avg_daily_demand: f64, lead_time_days: f64, safety_stock: f64) -> f64 {
    avg_daily_demand * lead_time_days + safety_stock
}

/// Standard normal quantile of the service level (0.95 -> ~1.645).
pub fn service_level_z(service_level: f64) -> DomainResult<f64> {
    if !(service_level.is_finite() && service_level > 0.0 && service_level < 1.0) {
        return Err(DomainError::validation("service_level must be in (0, 1)"));
    }
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| DomainError::invariant(format!("standard normal: {e}")))?;
    Ok(normal.inverse_cdf(service_level))
}

/// Apply the policy formulas to a demand estimate.
pub fn calculate(
    estimate: DemandEstimate,
    profile: &ProductProfile,
    config: &PolicyConfig,
) -> DomainResult<InventoryMetrics> {
    profile.validate()?;
    if !(estimate.avg_daily_demand.is_finite() && estimate.demand_std.is_finite()) {
        return Err(DomainError::validation("demand estimate must be finite"));
    }
    let z = service_level_z(config.service_level)?;

    let lead_time = f64::from(profile.lead_time_days);
    let annual_demand = estimate.avg_daily_demand * DAYS_PER_YEAR;
    let eoq = economic_order_quantity(
        annual_demand,
        profile.ordering_cost,
        profile.holding_cost_per_unit_year(),
    );
    let safety = safety_stock(estimate.demand_std, lead_time, z);
    let rop = reorder_point(estimate.avg_daily_demand, lead_time, safety);

    let stock_status = if profile.current_stock as f64 <= rop {
        StockStatus::Reorder
    } else {
        StockStatus::Ok
    };

    debug!(
        annual_demand,
        eoq,
        safety_stock = safety,
        reorder_point = rop,
        ?stock_status,
        "policy computed"
    );

    let round = |v: f64| round_to(v, config.decimals);
    Ok(InventoryMetrics {
        avg_daily_demand: round(estimate.avg_daily_demand),
        demand_std: round(estimate.demand_std),
        annual_demand: round(annual_demand),
        eoq: round(eoq),
        safety_stock: round(safety),
        reorder_point: round(rop),
        current_stock: profile.current_stock,
        stock_status,
    })
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn profile() -> ProductProfile {
        ProductProfile::with_unit_cost(50.0)
            .ordering_cost(500.0)
            .holding_cost_percentage(0.2)
            .lead_time_days(7)
    }

    #[test]
    fn reorder_point_is_exact() {
        assert_eq!(reorder_point(10.0, 7.0, 5.0), 75.0);
    }

    #[test]
    fn eoq_is_zero_for_degenerate_economics() {
        assert_eq!(economic_order_quantity(0.0, 500.0, 10.0), 0.0);
        assert_eq!(economic_order_quantity(-1.0, 500.0, 10.0), 0.0);
        assert_eq!(economic_order_quantity(3650.0, 500.0, 0.0), 0.0);

        let metrics = calculate(
            DemandEstimate {
                avg_daily_demand: 10.0,
                demand_std: 2.0,
            },
            &profile().holding_cost_percentage(0.0),
            &PolicyConfig::default(),
        )
        .unwrap();
        assert_eq!(metrics.eoq, 0.0);
    }

    #[test]
    fn eoq_matches_closed_form() {
        // sqrt(2 * 3650 * 500 / 10) = sqrt(365000)
        let eoq = economic_order_quantity(3650.0, 500.0, 10.0);
        assert!((eoq - 365_000f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn service_level_quantile() {
        assert!((service_level_z(0.95).unwrap() - 1.6449).abs() < 1e-3);
        assert!(service_level_z(1.0).is_err());
        assert!(service_level_z(0.0).is_err());
    }

    #[test]
    fn metrics_are_rounded_at_the_boundary() {
        let metrics = calculate(
            DemandEstimate {
                avg_daily_demand: 10.0 / 3.0,
                demand_std: 1.0,
            },
            &profile(),
            &PolicyConfig::default(),
        )
        .unwrap();
        assert_eq!(metrics.avg_daily_demand, 3.33);
        // 1216.666.. computed from the unrounded mean.
        assert_eq!(metrics.annual_demand, 1216.67);
        // 1.6449 * sqrt(7) = 4.3519..
        assert_eq!(metrics.safety_stock, 4.35);
        // 23.333.. + 4.3519.. = 27.685..
        assert_eq!(metrics.reorder_point, 27.69);
    }

    #[test]
    fn stock_status_flips_around_reorder_point() {
        let estimate = DemandEstimate {
            avg_daily_demand: 10.0,
            demand_std: 0.0,
        };
        let config = PolicyConfig::default();
        let with_stock = |stock| calculate(estimate, &profile().current_stock(stock), &config);

        let below = with_stock(69).unwrap();
        assert_eq!(below.reorder_point, 70.0);
        assert_eq!(below.stock_status, StockStatus::Reorder);
        assert!(below.reorder_needed());

        let at = with_stock(70).unwrap();
        assert_eq!(at.stock_status, StockStatus::Reorder);

        let above = with_stock(71).unwrap();
        assert_eq!(above.stock_status, StockStatus::Ok);
    }

    #[test]
    fn stock_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&StockStatus::Reorder).unwrap(), "\"reorder\"");
        assert_eq!(serde_json::to_string(&StockStatus::Ok).unwrap(), "\"ok\"");
    }

    #[test]
    fn invalid_profile_is_rejected() {
        let err = calculate(
            DemandEstimate {
                avg_daily_demand: 1.0,
                demand_std: 0.0,
            },
            &ProductProfile::with_unit_cost(-5.0),
            &PolicyConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: raising the ordering cost strictly raises EOQ.
        #[test]
        fn eoq_increases_with_ordering_cost(
            annual_demand in 1.0f64..1e6,
            holding in 0.01f64..1e3,
            ordering in 0.0f64..1e4,
            bump in 1.0f64..1e4,
        ) {
            let low = economic_order_quantity(annual_demand, ordering, holding);
            let high = economic_order_quantity(annual_demand, ordering + bump, holding);
            prop_assert!(high > low);
        }

        /// Property: safety stock grows with both demand spread and lead time.
        #[test]
        fn safety_stock_is_monotonic(
            std in 0.1f64..100.0,
            extra_std in 0.1f64..100.0,
            lead in 1u32..120,
            extra_lead in 1u32..60,
        ) {
            let z = service_level_z(0.95).unwrap();
            let base = safety_stock(std, f64::from(lead), z);
            prop_assert!(safety_stock(std + extra_std, f64::from(lead), z) > base);
            prop_assert!(safety_stock(std, f64::from(lead + extra_lead), z) > base);
        }
    }
}
