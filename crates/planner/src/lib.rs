//! Restocking planner: the request-level pipeline.
//!
//! Takes materialized product snapshots (sales history + profile), runs a demand
//! strategy and the policy calculator, and returns the report shapes the REST
//! layer serializes verbatim.

pub mod config;
pub mod planner;
pub mod report;
pub mod snapshot;

pub use config::{ForecastRequest, PlannerConfig};
pub use planner::RestockPlanner;
pub use report::{ForecastSection, RestockReport, ScanEntry};
pub use snapshot::ProductSnapshot;
