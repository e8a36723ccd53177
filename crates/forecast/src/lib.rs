//! `stockcast-forecast`
//!
//! **Responsibility:** daily demand forecasting for a single product.
//!
//! Pipeline (each stage is a pure function of its inputs):
//! - [`series`]: sales events -> gap-free daily series
//! - [`stationarity`]: ADF unit-root test -> admissible differencing orders
//! - [`selection`]: AIC grid search over `(p, d, q)`
//! - [`forecaster`]: re-estimate the chosen order and project the horizon
//!
//! This crate owns no state and performs no IO: callers hand in materialized
//! sales history and get a plain [`ForecastResult`] back.

pub mod arima;
pub mod config;
pub mod error;
pub mod forecaster;
pub mod job;
pub mod ols;
pub mod order;
pub mod selection;
pub mod series;
pub mod stationarity;

pub use arima::{ArmaFit, FitFailure, FitResult, estimate, estimate_conditioned};
pub use config::ForecastConfig;
pub use error::ForecastError;
pub use forecaster::{ForecastResult, forecast, forecast_conditioned};
pub use job::{ForecastJob, ForecastOutcome};
pub use order::ModelOrder;
pub use selection::{CandidateOutcome, Selection, candidate_orders, select_order};
pub use series::{DailySeries, MAX_SPAN_DAYS};
pub use stationarity::{AdfOutcome, DifferencingRange, StationarityVerdict, adf_test, classify};
