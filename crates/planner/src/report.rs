use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stockcast_core::ProductId;
use stockcast_forecast::{ForecastResult, ModelOrder};
use stockcast_inventory::InventoryMetrics;

/// Forecast-backed restocking report. Field names and order are the REST contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestockReport {
    pub model_order: ModelOrder,
    pub forecast: ForecastSection,
    pub metrics: InventoryMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSection {
    pub dates: Vec<NaiveDate>,
    pub values: Vec<f64>,
    /// `[low, high]` per date.
    pub confidence_intervals: Vec<[f64; 2]>,
}

impl From<&ForecastResult> for ForecastSection {
    fn from(result: &ForecastResult) -> Self {
        Self {
            dates: result.dates.clone(),
            values: result.values.clone(),
            confidence_intervals: result
                .intervals
                .iter()
                .map(|(low, high)| [*low, *high])
                .collect(),
        }
    }
}

/// One row of a bulk listing scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanEntry {
    pub product_id: ProductId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<InventoryMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScanEntry {
    pub fn reorder_needed(&self) -> bool {
        self.metrics.as_ref().is_some_and(InventoryMetrics::reorder_needed)
    }
}
