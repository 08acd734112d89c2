//! # CarLot
//!
//! A car dealership store kept in flat files, with:
//! - Fixed-width record slots updated in place
//! - A sorted key index per table for point lookups
//! - Slot reuse through a free-list
//! - Car, catalog model and sale tables with a best-sellers report
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        CarService                            │
//! │        (sell / revert / rename / report, one lock)           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┼────────────┐
//!          ▼            ▼            ▼
//!   ┌────────────┐┌────────────┐┌────────────┐
//!   │ Table<Car> ││Table<Model>││ Table<Sale>│
//!   └─────┬──────┘└─────┬──────┘└─────┬──────┘
//!         │             │             │
//!         ▼             ▼             ▼
//!   ┌───────────────────────────────────────┐
//!   │   SlotStore (data)  +  KeyIndex (keys) │
//!   └───────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod storage;
pub mod table;
pub mod entity;
pub mod service;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CarLotError, Result};
pub use config::Config;
pub use entity::{Car, CarFullInfo, CarStatus, Model, ModelSaleStats, Money, Sale};
pub use service::CarService;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of CarLot
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
