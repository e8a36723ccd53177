use serde::{Deserialize, Serialize};

use stockcast_core::{ProductId, ProductProfile, SalesEvent};

use crate::config::ForecastRequest;

/// Read-only view of one product handed over by the product/sales stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub product_id: ProductId,
    pub profile: ProductProfile,
    #[serde(default)]
    pub sales: Vec<SalesEvent>,
    /// Per-request overrides of the planner configuration.
    #[serde(default)]
    pub request: ForecastRequest,
}

impl ProductSnapshot {
    pub fn new(product_id: ProductId, profile: ProductProfile, sales: Vec<SalesEvent>) -> Self {
        Self {
            product_id,
            profile,
            sales,
            request: ForecastRequest::default(),
        }
    }

    pub fn with_request(mut self, request: ForecastRequest) -> Self {
        self.request = request;
        self
    }
}
