//! Sale records

use chrono::NaiveDateTime;

use crate::error::Result;
use crate::table::{check_field_count, Record};

use super::{format_timestamp, parse_timestamp, Money};

/// A completed sale, keyed by sales number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sale {
    pub sales_number: String,
    /// VIN of the car that was sold
    pub car_vin: String,
    pub cost: Money,
    pub sales_date: NaiveDateTime,
}

impl Record for Sale {
    const FIELD_COUNT: usize = 4;

    fn key(&self) -> String {
        self.sales_number.clone()
    }

    fn set_key(&mut self, key: &str) -> Result<()> {
        self.sales_number = key.to_string();
        Ok(())
    }

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.sales_number.clone(),
            self.car_vin.clone(),
            self.cost.to_string(),
            format_timestamp(&self.sales_date),
        ]
    }

    fn from_fields(fields: &[&str]) -> Result<Self> {
        check_field_count(fields, Self::FIELD_COUNT)?;

        Ok(Sale {
            sales_number: fields[0].to_string(),
            car_vin: fields[1].to_string(),
            cost: fields[2].parse()?,
            sales_date: parse_timestamp(fields[3])?,
        })
    }
}
