//! AIC grid search over ARIMA orders.
//!
//! Candidates are estimated independently (optionally on the rayon pool) and
//! ranked afterwards in enumeration order, so the result never depends on which
//! worker finished first.

use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::arima::{FitFailure, estimate_conditioned};
use crate::error::ForecastError;
use crate::order::ModelOrder;
use crate::stationarity::DifferencingRange;

/// Score of one candidate order, or why it could not be scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateOutcome {
    pub order: ModelOrder,
    pub aic: Result<f64, FitFailure>,
}

/// Winner of the grid search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub order: ModelOrder,
    /// `None` when every candidate failed and [`ModelOrder::FALLBACK`] was used.
    pub aic: Option<f64>,
    /// Differenced observations every candidate was conditioned on.
    pub burn_in: usize,
    pub evaluated: usize,
    pub failed: usize,
}

impl Selection {
    pub fn fell_back(&self) -> bool {
        self.aic.is_none()
    }
}

/// Every `(p, d, q)` with `p <= max_p`, `d` in `d_range`, `q <= max_q`, except
/// `p = q = 0`. Ordered by `p`, then `d`, then `q`.
pub fn candidate_orders(max_p: usize, d_range: DifferencingRange, max_q: usize) -> Vec<ModelOrder> {
    let mut orders = Vec::with_capacity((max_p + 1) * d_range.len() * (max_q + 1));
    for p in 0..=max_p {
        for d in d_range.iter() {
            for q in 0..=max_q {
                if let Some(order) = ModelOrder::new(p, d, q) {
                    orders.push(order);
                }
            }
        }
    }
    orders
}

/// Pick the lowest-AIC order; ties go to the earliest candidate.
///
/// Every candidate is conditioned on the first `max_p` differenced observations, so
/// orders with the same `d` are scored on the same sample.
///
/// Fails only when `budget` runs out before every candidate was attempted.
pub fn select_order(
    values: &[f64],
    d_range: DifferencingRange,
    max_p: usize,
    max_q: usize,
    budget: Option<Duration>,
    parallel: bool,
) -> Result<Selection, ForecastError> {
    let orders = candidate_orders(max_p, d_range, max_q);
    let deadline = budget.map(|b| Instant::now() + b);

    let score = |order: &ModelOrder| -> CandidateOutcome {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            return CandidateOutcome {
                order: *order,
                aic: Err(FitFailure::BudgetExhausted),
            };
        }
        CandidateOutcome {
            order: *order,
            aic: estimate_conditioned(values, *order, max_p).map(|fit| fit.aic),
        }
    };

    let outcomes: Vec<CandidateOutcome> = if parallel {
        orders.par_iter().map(score).collect()
    } else {
        orders.iter().map(score).collect()
    };

    rank(outcomes, max_p)
}

/// Rank scored candidates in their enumeration order.
pub fn rank(
    outcomes: Vec<CandidateOutcome>,
    burn_in: usize,
) -> Result<Selection, ForecastError> {
    let evaluated = outcomes.len();
    let mut failed = 0;
    let mut best: Option<(ModelOrder, f64)> = None;

    for outcome in &outcomes {
        match outcome.aic {
            Ok(aic) if aic.is_finite() => {
                debug!(order = %outcome.order, aic, "candidate scored");
                if best.is_none_or(|(_, best_aic)| aic < best_aic) {
                    best = Some((outcome.order, aic));
                }
            }
            Ok(aic) => {
                debug!(order = %outcome.order, aic, "candidate discarded: non-finite AIC");
                failed += 1;
            }
            Err(FitFailure::BudgetExhausted) => {
                warn!(order = %outcome.order, "order search budget exhausted");
                return Err(ForecastError::ForecastUnavailable(
                    "order search exceeded its time budget".to_string(),
                ));
            }
            Err(failure) => {
                debug!(order = %outcome.order, %failure, "candidate failed");
                failed += 1;
            }
        }
    }

    let selection = match best {
        Some((order, aic)) => {
            info!(%order, aic, evaluated, failed, "order selected");
            Selection {
                order,
                aic: Some(aic),
                burn_in,
                evaluated,
                failed,
            }
        }
        None => {
            warn!(
                evaluated,
                fallback = %ModelOrder::FALLBACK,
                "every candidate failed; using fallback order"
            );
            Selection {
                order: ModelOrder::FALLBACK,
                aic: None,
                burn_in,
                evaluated,
                failed,
            }
        }
    };
    Ok(selection)
}
