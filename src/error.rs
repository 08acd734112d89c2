//! Error types for CarLot
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using CarLotError
pub type Result<T> = std::result::Result<T, CarLotError>;

/// Unified error type for CarLot operations
#[derive(Debug, Error)]
pub enum CarLotError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Slot Store Errors
    // -------------------------------------------------------------------------
    #[error("Record of {len} bytes exceeds slot capacity of {capacity} bytes")]
    CapacityExceeded { len: usize, capacity: usize },

    #[error("Slot {slot} out of range (slot count {slot_count})")]
    OutOfRange { slot: u64, slot_count: u64 },

    #[error("Storage error: {0}")]
    Storage(String),

    // -------------------------------------------------------------------------
    // Key Errors
    // -------------------------------------------------------------------------
    #[error("Key not found: {0}")]
    NotFound(String),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    // -------------------------------------------------------------------------
    // Record Encoding Errors
    // -------------------------------------------------------------------------
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Invalid field: {0}")]
    InvalidField(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
