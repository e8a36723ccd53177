use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::id::ProductId;
use crate::value_object::ValueObject;

/// One recorded sale: `quantity` units of `product_id` sold on `date`.
///
/// Several events may share a date; consumers sum them rather than keep the last one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesEvent {
    pub product_id: ProductId,
    #[serde(alias = "sale_date")]
    pub date: NaiveDate,
    pub quantity: u64,
}

impl SalesEvent {
    pub fn new(product_id: ProductId, date: NaiveDate, quantity: u64) -> Self {
        Self {
            product_id,
            date,
            quantity,
        }
    }
}

impl ValueObject for SalesEvent {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_legacy_sale_date_field() {
        let product_id = ProductId::new();
        let raw = format!(
            r#"{{"product_id":"{product_id}","sale_date":"2024-03-01","quantity":4}}"#
        );
        let event: SalesEvent = serde_json::from_str(&raw).unwrap();
        assert_eq!(event.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(event.quantity, 4);
        assert_eq!(event.product_id, product_id);
    }
}
