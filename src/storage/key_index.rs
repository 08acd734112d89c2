//! Key Index
//!
//! Sorted key → slot mapping persisted as a flat text file.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{CarLotError, Result};

/// Field separator between key and slot number on an index line
const SEPARATOR: char = ';';

/// Ordered index of live keys
///
/// The whole index is held in a `BTreeMap` for O(log n) lookups and is
/// rewritten to disk, in ascending key order, after every mutation.
/// Keys are unique: inserting a key that is already present fails.
pub struct KeyIndex {
    /// Path of the index file
    path: PathBuf,
    /// key → slot number
    entries: BTreeMap<String, u64>,
}

impl KeyIndex {
    /// Open or create an index file and load every entry into memory
    ///
    /// If the file holds the same key twice, the first line wins.
    pub fn open(path: &Path) -> Result<Self> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;

        let reader = BufReader::new(File::open(path)?);
        let mut entries = BTreeMap::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let (key, slot) = Self::parse_line(&line).ok_or_else(|| {
                CarLotError::Storage(format!(
                    "{}: invalid index line {}: {:?}",
                    path.display(),
                    line_no + 1,
                    line
                ))
            })?;

            if entries.contains_key(key) {
                warn!(path = %path.display(), key, "duplicate key in index file, keeping first");
                continue;
            }
            entries.insert(key.to_string(), slot);
        }

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// Add a key → slot entry
    ///
    /// Fails with `DuplicateKey` if the key is already indexed.
    pub fn insert(&mut self, key: &str, slot: u64) -> Result<()> {
        if key.is_empty() || key.contains(['\n', '\r']) {
            return Err(CarLotError::InvalidField(format!(
                "index key {:?} must be non-empty and single-line",
                key
            )));
        }
        if self.entries.contains_key(key) {
            return Err(CarLotError::DuplicateKey(key.to_string()));
        }

        self.entries.insert(key.to_string(), slot);
        if let Err(e) = self.persist() {
            self.entries.remove(key);
            return Err(e);
        }
        Ok(())
    }

    /// Find the slot for an exact key match
    pub fn lookup(&self, key: &str) -> Option<u64> {
        self.entries.get(key).copied()
    }

    /// Delete the entry for a key, returning the slot it pointed to
    ///
    /// Removing an absent key is not an error and leaves the file untouched.
    pub fn remove(&mut self, key: &str) -> Result<Option<u64>> {
        let Some(slot) = self.entries.remove(key) else {
            return Ok(None);
        };

        if let Err(e) = self.persist() {
            self.entries.insert(key.to_string(), slot);
            return Err(e);
        }
        Ok(Some(slot))
    }

    /// Whether a key is indexed
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate over `(key, slot)` pairs in ascending key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.entries.iter().map(|(k, &slot)| (k.as_str(), slot))
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Path of the index file
    pub fn path(&self) -> &Path {
        &self.path
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// "VIN123;42" → Some(("VIN123", 42))
    fn parse_line(line: &str) -> Option<(&str, u64)> {
        let (key, slot) = line.rsplit_once(SEPARATOR)?;
        if key.is_empty() {
            return None;
        }
        Some((key, slot.trim().parse().ok()?))
    }

    /// Rewrite the index file from memory
    ///
    /// Writes a sibling temp file and renames it over the index.
    fn persist(&self) -> Result<()> {
        let tmp_path = self.path.with_extension("tmp");

        {
            let mut writer = BufWriter::new(File::create(&tmp_path)?);
            for (key, slot) in &self.entries {
                writeln!(writer, "{}{}{}", key, SEPARATOR, slot)?;
            }
            writer.flush()?;
        }

        fs::rename(&tmp_path, &self.path)?;

        debug!(path = %self.path.display(), entries = self.entries.len(), "index rewritten");
        Ok(())
    }
}
