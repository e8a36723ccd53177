use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use stockcast_core::{ProductId, SalesEvent};

use crate::error::ForecastError;

/// Longest history accepted, first to last sale (about a century of days).
pub const MAX_SPAN_DAYS: i64 = 36_500;

/// Gap-free daily sales series for one product.
///
/// Dates are implicit: `values[i]` belongs to `start + i days`, so the series is
/// contiguous and strictly increasing by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySeries {
    start: NaiveDate,
    values: Vec<f64>,
    /// Days that had at least one sales event (gap-filled zeros excluded).
    observed_days: usize,
}

impl DailySeries {
    /// Aggregate events per day and fill missing days with zero.
    ///
    /// Every event must reference `product_id`.
    pub fn from_events(
        product_id: ProductId,
        events: &[SalesEvent],
    ) -> Result<Self, ForecastError> {
        let mut per_day: BTreeMap<NaiveDate, u64> = BTreeMap::new();
        for event in events {
            if event.product_id != product_id {
                return Err(ForecastError::InvalidInput(format!(
                    "sales event for product {} in history of product {product_id}",
                    event.product_id
                )));
            }
            let total = per_day.entry(event.date).or_insert(0);
            *total = total.checked_add(event.quantity).ok_or_else(|| {
                ForecastError::InvalidInput(format!("daily quantity overflows on {}", event.date))
            })?;
        }

        let (Some((&first, _)), Some((&last, _))) =
            (per_day.first_key_value(), per_day.last_key_value())
        else {
            return Err(ForecastError::InsufficientHistory {
                required: 1,
                found: 0,
            });
        };

        let span = (last - first).num_days();
        if span >= MAX_SPAN_DAYS {
            return Err(ForecastError::InvalidInput(format!(
                "sales history spans {span} days ({first} to {last}), limit is {MAX_SPAN_DAYS}"
            )));
        }
        let len = span as usize + 1;
        let values = first
            .iter_days()
            .take(len)
            .map(|day| per_day.get(&day).copied().unwrap_or(0) as f64)
            .collect();

        Ok(Self {
            start: first,
            values,
            observed_days: per_day.len(),
        })
    }

    /// Series from already-daily values starting at `start`.
    ///
    /// Non-zero days count as observed.
    pub fn from_values(start: NaiveDate, values: Vec<f64>) -> Self {
        let observed_days = values.iter().filter(|v| **v != 0.0).count();
        Self {
            start,
            values,
            observed_days,
        }
    }

    /// Reject histories with fewer than `min_days` observed sales days.
    pub fn ensure_min_history(&self, min_days: usize) -> Result<(), ForecastError> {
        if self.observed_days < min_days {
            return Err(ForecastError::InsufficientHistory {
                required: min_days,
                found: self.observed_days,
            });
        }
        Ok(())
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn observed_days(&self) -> usize {
        self.observed_days
    }

    pub fn first_date(&self) -> NaiveDate {
        self.start
    }

    pub fn last_date(&self) -> NaiveDate {
        self.start + Days::new(self.values.len().saturating_sub(1) as u64)
    }

    /// `(date, quantity)` pairs in chronological order.
    pub fn points(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.start.iter_days().zip(self.values.iter().copied())
    }

    /// The `periods` calendar days following the last observation.
    pub fn future_dates(&self, periods: usize) -> Vec<NaiveDate> {
        self.last_date().iter_days().skip(1).take(periods).collect()
    }

    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }
}
