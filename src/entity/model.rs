//! Catalog model records

use crate::error::{CarLotError, Result};
use crate::table::{check_field_count, Record};

/// A catalog model, keyed by numeric id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    pub id: u32,
    pub name: String,
    pub brand: String,
}

impl Record for Model {
    const FIELD_COUNT: usize = 3;

    fn key(&self) -> String {
        self.id.to_string()
    }

    fn set_key(&mut self, key: &str) -> Result<()> {
        self.id = key
            .parse()
            .map_err(|_| CarLotError::InvalidField(format!("model id {:?} is not numeric", key)))?;
        Ok(())
    }

    fn to_fields(&self) -> Vec<String> {
        vec![self.id.to_string(), self.name.clone(), self.brand.clone()]
    }

    fn from_fields(fields: &[&str]) -> Result<Self> {
        check_field_count(fields, Self::FIELD_COUNT)?;

        let id = fields[0].parse().map_err(|_| {
            CarLotError::MalformedRecord(format!("invalid model id {:?}", fields[0]))
        })?;

        Ok(Model {
            id,
            name: fields[1].to_string(),
            brand: fields[2].to_string(),
        })
    }
}
