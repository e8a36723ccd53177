use thiserror::Error;

use stockcast_core::DomainError;
use stockcast_forecast::ForecastError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlanningError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Forecast(#[from] ForecastError),
}
