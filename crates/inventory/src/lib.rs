//! Inventory policy module.
//!
//! Turns a daily demand estimate plus a product's cost/lead-time profile into
//! reorder parameters (EOQ, safety stock, reorder point). Implemented purely as
//! deterministic logic (no IO, no storage).
//!
//! Demand comes from one of two named strategies:
//! - [`ExactForecastStrategy`]: fit a forecast and summarize it.
//! - [`HistoricalApproximation`]: historical mean, spread as a fixed fraction of it.

pub mod error;
pub mod policy;
pub mod strategy;

pub use error::PlanningError;
pub use policy::{
    DemandEstimate, InventoryMetrics, PolicyConfig, StockStatus, calculate,
    economic_order_quantity, reorder_point, safety_stock, service_level_z,
};
pub use strategy::{
    DemandAssessment, DemandStrategy, ExactForecastStrategy, HistoricalApproximation,
};
