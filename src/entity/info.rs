//! Read models assembled from several tables

use chrono::NaiveDateTime;

use super::{CarStatus, Money};

/// A car joined with its catalog model and, once sold, its sale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarFullInfo {
    pub vin: String,
    pub car_model_name: String,
    pub car_model_brand: String,
    pub price: Money,
    pub date_start: NaiveDateTime,
    pub status: CarStatus,
    pub sales_date: Option<NaiveDateTime>,
    pub sales_cost: Option<Money>,
}

/// One row of the best-selling models report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSaleStats {
    pub model_id: u32,
    pub car_model_name: String,
    pub brand: String,
    /// Number of sales of cars of this model
    pub sales_number: usize,
    /// Mean sale cost across those sales
    pub mean_price: Money,
}
