use thiserror::Error;

/// Failures that reach the caller of the forecasting pipeline.
///
/// Per-candidate estimation problems never show up here; they are absorbed by
/// the order search (see [`crate::FitFailure`]).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ForecastError {
    /// Fewer observed sales days than the configured minimum. Supply more data.
    #[error("insufficient sales history: need at least {required} observed days, got {found}")]
    InsufficientHistory { required: usize, found: usize },

    /// The final model could not be estimated, or the order search ran out of time.
    #[error("forecast unavailable: {0}")]
    ForecastUnavailable(String),

    #[error("invalid forecast input: {0}")]
    InvalidInput(String),
}
