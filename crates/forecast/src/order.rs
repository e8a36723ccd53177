use serde::{Deserialize, Serialize};

use stockcast_core::ValueObject;

/// ARIMA order `(p, d, q)`: AR lags, differencing passes, MA lags.
///
/// `p = 0 && q = 0` is rejected by [`ModelOrder::new`]; a pure-differencing model
/// carries no estimable structure.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
}

impl ModelOrder {
    /// Order used when every candidate of the grid search fails.
    pub const FALLBACK: ModelOrder = ModelOrder { p: 1, d: 1, q: 1 };

    pub fn new(p: usize, d: usize, q: usize) -> Option<Self> {
        if p == 0 && q == 0 {
            return None;
        }
        Some(Self { p, d, q })
    }

    /// Number of ARMA coefficients (excludes mean and variance).
    pub fn coefficient_count(&self) -> usize {
        self.p + self.q
    }
}

impl core::fmt::Display for ModelOrder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "ARIMA({}, {}, {})", self.p, self.d, self.q)
    }
}

impl ValueObject for ModelOrder {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pure_differencing_is_rejected() {
        assert!(ModelOrder::new(0, 1, 0).is_none());
        assert!(ModelOrder::new(0, 0, 0).is_none());
        assert_eq!(
            ModelOrder::new(0, 2, 1),
            Some(ModelOrder { p: 0, d: 2, q: 1 })
        );
    }

    #[test]
    fn serializes_as_pdq_object() {
        let json = serde_json::to_value(ModelOrder::FALLBACK).unwrap();
        assert_eq!(json, serde_json::json!({"p": 1, "d": 1, "q": 1}));
    }
}
