//! Car records

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;

use crate::error::{CarLotError, Result};
use crate::table::{check_field_count, Record};

use super::{format_timestamp, parse_timestamp, Money};

/// Availability of a car on the lot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CarStatus {
    Available,
    Reserved,
    Sold,
}

impl CarStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CarStatus::Available => "available",
            CarStatus::Reserved => "reserved",
            CarStatus::Sold => "sold",
        }
    }
}

impl fmt::Display for CarStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CarStatus {
    type Err = CarLotError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "available" => Ok(CarStatus::Available),
            "reserved" => Ok(CarStatus::Reserved),
            "sold" => Ok(CarStatus::Sold),
            other => Err(CarLotError::MalformedRecord(format!(
                "unknown car status {:?}",
                other
            ))),
        }
    }
}

/// A car on the lot, keyed by VIN
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Car {
    pub vin: String,
    /// Id of the catalog model
    pub model: u32,
    pub price: Money,
    /// When the car was put on sale
    pub date_start: NaiveDateTime,
    pub status: CarStatus,
}

impl Record for Car {
    const FIELD_COUNT: usize = 5;

    fn key(&self) -> String {
        self.vin.clone()
    }

    fn set_key(&mut self, key: &str) -> Result<()> {
        self.vin = key.to_string();
        Ok(())
    }

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.vin.clone(),
            self.model.to_string(),
            self.price.to_string(),
            format_timestamp(&self.date_start),
            self.status.to_string(),
        ]
    }

    fn from_fields(fields: &[&str]) -> Result<Self> {
        check_field_count(fields, Self::FIELD_COUNT)?;

        let model = fields[1].parse().map_err(|_| {
            CarLotError::MalformedRecord(format!("invalid model id {:?}", fields[1]))
        })?;

        Ok(Car {
            vin: fields[0].to_string(),
            model,
            price: fields[2].parse()?,
            date_start: parse_timestamp(fields[3])?,
            status: fields[4].parse()?,
        })
    }
}
