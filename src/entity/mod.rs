//! Entity Module
//!
//! The records kept by the dealership store and their field encodings.
//!
//! ## Record Layouts (fields joined by `;`)
//! ```text
//! cars.txt    vin;model_id;price;date_start;status
//! models.txt  id;name;brand
//! sales.txt   sales_number;car_vin;cost;sales_date
//! ```

mod car;
mod info;
mod model;
mod money;
mod sale;

use chrono::NaiveDateTime;

use crate::error::{CarLotError, Result};

pub use car::{Car, CarStatus};
pub use info::{CarFullInfo, ModelSaleStats};
pub use model::Model;
pub use money::Money;
pub use sale::Sale;

/// Timestamp layout used in record fields
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a record timestamp
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|e| CarLotError::MalformedRecord(format!("invalid timestamp {:?}: {}", s, e)))
}

/// Format a record timestamp
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(DATE_FORMAT).to_string()
}
