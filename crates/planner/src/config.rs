use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use stockcast_forecast::ForecastConfig;
use stockcast_inventory::PolicyConfig;

/// Planner configuration: forecasting knobs plus policy knobs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    pub forecast: ForecastConfig,
    pub policy: PolicyConfig,
}

impl PlannerConfig {
    /// Read `STOCKCAST_*` variables, keeping defaults for anything unset.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`PlannerConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let mut forecast = defaults.forecast;
        let mut policy = defaults.policy;

        forecast.periods = parse_or(&lookup, "STOCKCAST_PERIODS", forecast.periods);
        forecast.max_p = parse_or(&lookup, "STOCKCAST_MAX_P", forecast.max_p);
        forecast.max_d = parse_or(&lookup, "STOCKCAST_MAX_D", forecast.max_d);
        forecast.max_q = parse_or(&lookup, "STOCKCAST_MAX_Q", forecast.max_q);
        forecast.min_history = parse_or(&lookup, "STOCKCAST_MIN_HISTORY", forecast.min_history);

        // 0 disables the search budget.
        let budget_ms = forecast.search_budget.map_or(0, |b| b.as_millis() as u64);
        forecast.search_budget = match parse_or(&lookup, "STOCKCAST_SEARCH_BUDGET_MS", budget_ms) {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        };

        policy.service_level = parse_or(&lookup, "STOCKCAST_SERVICE_LEVEL", policy.service_level);

        Self { forecast, policy }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(e) => {
            warn!(key, value = %raw, error = %e, "invalid configuration value; using default");
            default
        }
    }
}

/// Per-request overrides (`periods`, `service_level`, `max_p`/`max_d`/`max_q`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub periods: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_p: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_d: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_q: Option<usize>,
}

impl ForecastRequest {
    /// `base` with this request's overrides applied.
    pub fn apply(&self, base: &PlannerConfig) -> PlannerConfig {
        let mut config = base.clone();
        if let Some(periods) = self.periods {
            config.forecast.periods = periods;
        }
        if let Some(max_p) = self.max_p {
            config.forecast.max_p = max_p;
        }
        if let Some(max_d) = self.max_d {
            config.forecast.max_d = max_d;
        }
        if let Some(max_q) = self.max_q {
            config.forecast.max_q = max_q;
        }
        if let Some(service_level) = self.service_level {
            config.policy.service_level = service_level;
        }
        config
    }
}
