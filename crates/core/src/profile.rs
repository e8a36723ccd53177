use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// Cost and lead-time attributes of a product, as held by the product store.
///
/// Read-only input to the policy calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductProfile {
    pub unit_cost: f64,
    #[serde(default = "default_ordering_cost")]
    pub ordering_cost: f64,
    /// Yearly holding cost as a fraction of unit cost, in \[0, 1\].
    #[serde(default = "default_holding_cost_percentage")]
    pub holding_cost_percentage: f64,
    #[serde(default = "default_lead_time_days")]
    pub lead_time_days: u32,
    #[serde(default)]
    pub current_stock: u64,
}

fn default_ordering_cost() -> f64 {
    500.0
}

fn default_holding_cost_percentage() -> f64 {
    0.2
}

fn default_lead_time_days() -> u32 {
    7
}

impl ProductProfile {
    /// Profile with the product-store defaults for everything except unit cost:
    /// ordering cost 500, 20% holding cost, 7 day lead time, empty stock.
    pub fn with_unit_cost(unit_cost: f64) -> Self {
        Self {
            unit_cost,
            ordering_cost: default_ordering_cost(),
            holding_cost_percentage: default_holding_cost_percentage(),
            lead_time_days: default_lead_time_days(),
            current_stock: 0,
        }
    }

    pub fn ordering_cost(mut self, ordering_cost: f64) -> Self {
        self.ordering_cost = ordering_cost;
        self
    }

    pub fn holding_cost_percentage(mut self, fraction: f64) -> Self {
        self.holding_cost_percentage = fraction;
        self
    }

    pub fn lead_time_days(mut self, days: u32) -> Self {
        self.lead_time_days = days;
        self
    }

    pub fn current_stock(mut self, stock: u64) -> Self {
        self.current_stock = stock;
        self
    }

    /// Cost of holding one unit for a year.
    pub fn holding_cost_per_unit_year(&self) -> f64 {
        self.unit_cost * self.holding_cost_percentage
    }

    pub fn validate(&self) -> DomainResult<()> {
        if !(self.unit_cost.is_finite() && self.unit_cost > 0.0) {
            return Err(DomainError::validation("unit_cost must be a positive number"));
        }
        if !(self.ordering_cost.is_finite() && self.ordering_cost >= 0.0) {
            return Err(DomainError::validation(
                "ordering_cost must be a non-negative number",
            ));
        }
        if !(0.0..=1.0).contains(&self.holding_cost_percentage) {
            return Err(DomainError::validation(
                "holding_cost_percentage must be a fraction in [0, 1]",
            ));
        }
        Ok(())
    }
}

impl ValueObject for ProductProfile {}
