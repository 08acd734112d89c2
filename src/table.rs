//! Table Module
//!
//! Binds one record type to a slot file and its key index.
//!
//! ## Responsibilities
//! - Encode records as `;`-joined text and decode them back
//! - Keep every indexed key pointing at a slot holding that key
//! - Point reads by key and tolerant full scans

use std::marker::PhantomData;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{CarLotError, Result};
use crate::storage::{KeyIndex, SlotIter, SlotStore};

/// Field delimiter inside an encoded record
pub const FIELD_DELIMITER: char = ';';

/// Fail with `MalformedRecord` unless there are exactly `expected` fields
pub fn check_field_count(fields: &[&str], expected: usize) -> Result<()> {
    if fields.len() != expected {
        return Err(CarLotError::MalformedRecord(format!(
            "expected {} fields, found {} in {:?}",
            expected,
            fields.len(),
            fields.join(FIELD_DELIMITER.to_string().as_str())
        )));
    }
    Ok(())
}

/// A record type that can live in a [`Table`]
///
/// The first field returned by `to_fields` must be the key.
pub trait Record: Sized {
    /// Number of fields in the encoded form
    const FIELD_COUNT: usize;

    /// The unique key of this record
    fn key(&self) -> String;

    /// Rewrite the key field
    fn set_key(&mut self, key: &str) -> Result<()>;

    /// Field values in storage order
    fn to_fields(&self) -> Vec<String>;

    /// Rebuild a record from its fields
    ///
    /// Fails with `MalformedRecord` unless there are exactly `FIELD_COUNT`.
    fn from_fields(fields: &[&str]) -> Result<Self>;
}

/// A keyed table of fixed-slot records
///
/// Files (inside the data directory):
///   {name}.txt        slot file
///   {name}_index.txt  key index
pub struct Table<R: Record> {
    /// Table name, used for file names and logs
    name: String,
    store: SlotStore,
    index: KeyIndex,
    _record: PhantomData<R>,
}

impl<R: Record> Table<R> {
    /// Open or create a table's files in `dir`
    pub fn open(dir: &Path, name: &str, slot_capacity: usize) -> Result<Self> {
        let store = SlotStore::open(&dir.join(format!("{}.txt", name)), slot_capacity)?;
        let index = KeyIndex::open(&dir.join(format!("{}_index.txt", name)))?;

        Ok(Self {
            name: name.to_string(),
            store,
            index,
            _record: PhantomData,
        })
    }

    // =========================================================================
    // Encoding
    // =========================================================================

    /// Encode a record as delimiter-joined text
    pub fn encode(record: &R) -> Result<Vec<u8>> {
        let fields = record.to_fields();
        debug_assert_eq!(fields.len(), R::FIELD_COUNT);

        if fields.first().map_or(true, |key| key.is_empty()) {
            return Err(CarLotError::InvalidField("record key is empty".to_string()));
        }
        if let Some(bad) = fields
            .iter()
            .find(|f| f.contains([FIELD_DELIMITER, '\n', '\r']))
        {
            return Err(CarLotError::InvalidField(format!(
                "field {:?} contains a delimiter or line separator",
                bad
            )));
        }

        let delimiter = FIELD_DELIMITER.to_string();
        Ok(fields.join(delimiter.as_str()).into_bytes())
    }

    /// Decode slot content into a record
    ///
    /// Fails with `MalformedRecord` on bad UTF-8, a wrong field count, or a
    /// field that does not parse.
    pub fn decode(content: &[u8]) -> Result<R> {
        let text = std::str::from_utf8(content)
            .map_err(|e| CarLotError::MalformedRecord(format!("record is not UTF-8: {}", e)))?;

        let fields: Vec<&str> = text.split(FIELD_DELIMITER).collect();
        R::from_fields(&fields)
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Insert a new record, returning its slot
    ///
    /// Fails with `DuplicateKey` if the key is already present.
    pub fn put(&mut self, record: &R) -> Result<u64> {
        let key = record.key();
        if self.index.contains(&key) {
            return Err(CarLotError::DuplicateKey(key));
        }

        let content = Self::encode(record)?;
        let slot = self.store.allocate(&content)?;

        if let Err(e) = self.index.insert(&key, slot) {
            self.store.release(slot)?;
            return Err(e);
        }

        debug!(table = %self.name, key = %key, slot, "record inserted");
        Ok(slot)
    }

    /// Fetch a record by key
    ///
    /// A missing key is `Ok(None)`; a stored record that fails to decode is
    /// an error.
    pub fn get(&self, key: &str) -> Result<Option<R>> {
        match self.index.lookup(key) {
            Some(slot) => Ok(Some(self.read_slot(slot)?)),
            None => Ok(None),
        }
    }

    /// Overwrite an existing record in its current slot
    ///
    /// The record must keep its key; use [`Table::rekey`] to change it.
    pub fn update_in_place(&mut self, key: &str, record: &R) -> Result<()> {
        if record.key() != key {
            return Err(CarLotError::InvalidField(format!(
                "cannot change key {:?} to {:?} in place",
                key,
                record.key()
            )));
        }

        let slot = self
            .index
            .lookup(key)
            .ok_or_else(|| CarLotError::NotFound(key.to_string()))?;

        let content = Self::encode(record)?;
        self.store.update(slot, &content)
    }

    /// Move a record to a new key, returning the rewritten record
    ///
    /// The record is written to a freshly allocated slot under `new_key`,
    /// then the old entry is dropped and its slot released.
    pub fn rekey(&mut self, old_key: &str, new_key: &str) -> Result<R> {
        let old_slot = self
            .index
            .lookup(old_key)
            .ok_or_else(|| CarLotError::NotFound(old_key.to_string()))?;

        let mut record = self.read_slot(old_slot)?;
        if old_key == new_key {
            return Ok(record);
        }
        if self.index.contains(new_key) {
            return Err(CarLotError::DuplicateKey(new_key.to_string()));
        }

        record.set_key(new_key)?;
        let content = Self::encode(&record)?;
        let new_slot = self.store.allocate(&content)?;

        self.index.remove(old_key)?;
        self.index.insert(new_key, new_slot)?;
        self.store.release(old_slot)?;

        debug!(
            table = %self.name,
            old_key,
            new_key,
            old_slot,
            new_slot,
            "record rekeyed"
        );
        Ok(record)
    }

    /// Delete a record, returning it
    ///
    /// Drops the index entry and releases the slot for reuse.
    pub fn remove(&mut self, key: &str) -> Result<R> {
        let slot = self
            .index
            .lookup(key)
            .ok_or_else(|| CarLotError::NotFound(key.to_string()))?;

        let record = self.read_slot(slot)?;
        self.index.remove(key)?;
        self.store.release(slot)?;

        debug!(table = %self.name, key, slot, "record removed");
        Ok(record)
    }

    /// Lazily scan every live record in slot order
    ///
    /// Blank slots, rows that fail to decode, and rows whose key is not
    /// indexed at that slot are skipped. I/O errors are yielded.
    pub fn scan_all(&self) -> Result<TableScan<'_, R>> {
        Ok(TableScan {
            table: self.name.as_str(),
            slots: self.store.scan()?,
            index: &self.index,
            _record: PhantomData,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Whether a key is present
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains(key)
    }

    /// Slot currently holding a key
    pub fn slot_of(&self, key: &str) -> Option<u64> {
        self.index.lookup(key)
    }

    /// Number of live records
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Underlying slot file
    pub fn store(&self) -> &SlotStore {
        &self.store
    }

    /// Underlying key index
    pub fn index(&self) -> &KeyIndex {
        &self.index
    }

    fn read_slot(&self, slot: u64) -> Result<R> {
        Self::decode(&self.store.read(slot)?)
    }
}

/// Iterator over the live records of a table
pub struct TableScan<'a, R: Record> {
    table: &'a str,
    slots: SlotIter,
    index: &'a KeyIndex,
    _record: PhantomData<R>,
}

impl<'a, R: Record> Iterator for TableScan<'a, R> {
    type Item = Result<R>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (slot, content) = match self.slots.next()? {
                Ok(row) => row,
                Err(e) => return Some(Err(e)),
            };

            if content.is_empty() {
                continue;
            }

            let record = match Table::<R>::decode(&content) {
                Ok(record) => record,
                Err(e) => {
                    warn!(table = self.table, slot, error = %e, "skipping malformed row");
                    continue;
                }
            };

            if self.index.lookup(&record.key()) != Some(slot) {
                debug!(table = self.table, slot, "skipping orphaned row");
                continue;
            }

            return Some(Ok(record));
        }
    }
}
