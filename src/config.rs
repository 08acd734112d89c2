//! Configuration for CarLot
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Default slot capacity in bytes (excluding the terminator byte)
pub const DEFAULT_SLOT_CAPACITY: usize = 500;

/// Main configuration for a CarLot instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all data files
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── cars.txt / cars_index.txt
    ///     ├── models.txt / models_index.txt
    ///     └── sales.txt / sales_index.txt
    pub data_dir: PathBuf,

    /// Content bytes per slot; every slot occupies `slot_capacity + 1` bytes
    pub slot_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./carlot_data"),
            slot_capacity: DEFAULT_SLOT_CAPACITY,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all storage)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the slot capacity (in bytes)
    pub fn slot_capacity(mut self, capacity: usize) -> Self {
        self.config.slot_capacity = capacity;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
