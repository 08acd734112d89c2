//! Storage Module
//!
//! Flat-file persistence for fixed-width records plus a sorted key index.
//!
//! ## Responsibilities
//! - Store encoded records in fixed-capacity slots addressed by slot number
//! - Overwrite slots in place without moving neighbours
//! - Reuse released slots through a free-list
//! - Map record keys to slot numbers in ascending key order
//!
//! ## Data File Format
//! ```text
//! ┌──────────────────────────────────────────┬────┐
//! │ Slot 0: content, padded with ' ' to C    │ \n │  offset 0
//! ├──────────────────────────────────────────┼────┤
//! │ Slot 1: content, padded with ' ' to C    │ \n │  offset C + 1
//! ├──────────────────────────────────────────┼────┤
//! │ ... (stride = C + 1 bytes per slot)      │    │
//! └──────────────────────────────────────────┴────┘
//! ```
//! A slot consisting only of padding is free.
//!
//! ## Index File Format
//! ```text
//! key;slot_number\n     (one line per live key, ascending by key)
//! ```

mod key_index;
mod slot_store;

pub use key_index::KeyIndex;
pub use slot_store::{SlotIter, SlotStore};

/// Byte used to pad slot content up to the slot capacity
pub(crate) const PAD_BYTE: u8 = b' ';

/// Byte closing every slot
pub(crate) const TERMINATOR: u8 = b'\n';

/// Strip trailing padding from raw slot content
pub(crate) fn trim_padding(content: &[u8]) -> &[u8] {
    let end = content
        .iter()
        .rposition(|&b| b != PAD_BYTE)
        .map_or(0, |pos| pos + 1);
    &content[..end]
}
