//! Slot Store
//!
//! Append-mostly data file of fixed-width slots with in-place updates.

use std::collections::BTreeSet;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{CarLotError, Result};

use super::{trim_padding, PAD_BYTE, TERMINATOR};

/// Fixed-width slot file
///
/// Slot `n` starts at byte `n * stride` where `stride = capacity + 1`.
/// Slots are never moved; released slots are blanked and handed out again
/// by [`SlotStore::allocate`].
pub struct SlotStore {
    /// Path of the data file (scans open their own handle on it)
    path: PathBuf,
    /// Read/write handle used for point reads and writes
    file: File,
    /// Content bytes per slot, excluding the terminator
    capacity: usize,
    /// Number of slots physically present in the file
    slot_count: u64,
    /// Released slots, lowest first
    free: BTreeSet<u64>,
}

impl SlotStore {
    /// Open or create a slot file
    ///
    /// On open:
    /// 1. Create the file if it doesn't exist
    /// 2. Validate the file length is a whole number of slots
    /// 3. Rebuild the free-list from blank slots
    pub fn open(path: &Path, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(CarLotError::Config(
                "slot capacity must be at least 1 byte".to_string(),
            ));
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let stride = capacity as u64 + 1;
        let file_len = file.metadata()?.len();
        if file_len % stride != 0 {
            return Err(CarLotError::Storage(format!(
                "{}: length {} is not a multiple of slot stride {}",
                path.display(),
                file_len,
                stride
            )));
        }

        let mut store = Self {
            path: path.to_path_buf(),
            file,
            capacity,
            slot_count: file_len / stride,
            free: BTreeSet::new(),
        };

        let mut free = BTreeSet::new();
        for row in store.scan()? {
            let (slot, content) = row?;
            if content.is_empty() {
                free.insert(slot);
            }
        }
        store.free = free;

        debug!(
            path = %store.path.display(),
            slots = store.slot_count,
            free = store.free.len(),
            "slot store opened"
        );

        Ok(store)
    }

    /// Append a record at the end of the file
    ///
    /// The slot number is derived from the actual end-of-file offset, so it
    /// is always the next unoccupied slot.
    pub fn append(&mut self, content: &[u8]) -> Result<u64> {
        let frame = self.frame(content)?;
        self.append_frame(&frame)
    }

    /// Store a record in the lowest free slot, or append if none is free
    pub fn allocate(&mut self, content: &[u8]) -> Result<u64> {
        let frame = self.frame(content)?;

        match self.free.first().copied() {
            Some(slot) => {
                self.write_frame(slot, &frame)?;
                self.free.remove(&slot);
                debug!(slot, "reused free slot");
                Ok(slot)
            }
            None => self.append_frame(&frame),
        }
    }

    /// Read the content of a slot with trailing padding stripped
    ///
    /// A free slot reads as empty content.
    pub fn read(&self, slot: u64) -> Result<Vec<u8>> {
        self.check_range(slot)?;

        let mut buf = vec![0u8; self.capacity];
        let mut file = &self.file;
        file.seek(SeekFrom::Start(slot * self.stride()))?;
        file.read_exact(&mut buf)?;

        Ok(trim_padding(&buf).to_vec())
    }

    /// Overwrite a slot in place
    pub fn update(&mut self, slot: u64, content: &[u8]) -> Result<()> {
        self.check_range(slot)?;
        let frame = self.frame(content)?;
        self.write_frame(slot, &frame)?;
        self.free.remove(&slot);
        Ok(())
    }

    /// Blank a slot and hand it to the free-list
    ///
    /// Releasing an already free slot is a no-op.
    pub fn release(&mut self, slot: u64) -> Result<()> {
        self.check_range(slot)?;
        if self.free.contains(&slot) {
            return Ok(());
        }

        let mut frame = vec![PAD_BYTE; self.capacity];
        frame.push(TERMINATOR);
        self.write_frame(slot, &frame)?;
        self.free.insert(slot);

        debug!(slot, "released slot");
        Ok(())
    }

    /// Iterate over every slot in ascending slot order, free ones included
    ///
    /// Each call opens a fresh handle, so the scan is restartable and does not
    /// disturb point reads. Slots appended after the call are not visited.
    pub fn scan(&self) -> Result<SlotIter> {
        let file = File::open(&self.path)?;
        Ok(SlotIter {
            reader: BufReader::new(file),
            capacity: self.capacity,
            next_slot: 0,
            slot_count: self.slot_count,
            failed: false,
        })
    }

    /// Flush file contents to disk
    pub fn sync(&self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Content bytes per slot
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Distance in bytes between consecutive slot starts
    pub fn stride(&self) -> u64 {
        self.capacity as u64 + 1
    }

    /// Number of slots in the file, free ones included
    pub fn slot_count(&self) -> u64 {
        self.slot_count
    }

    /// Number of released slots waiting for reuse
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Whether a slot is on the free-list
    pub fn is_free(&self, slot: u64) -> bool {
        self.free.contains(&slot)
    }

    /// Path of the data file
    pub fn path(&self) -> &Path {
        &self.path
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Build the on-disk image of a slot: content + padding + terminator
    fn frame(&self, content: &[u8]) -> Result<Vec<u8>> {
        if content.len() > self.capacity {
            return Err(CarLotError::CapacityExceeded {
                len: content.len(),
                capacity: self.capacity,
            });
        }
        if trim_padding(content).is_empty() {
            return Err(CarLotError::InvalidField(
                "record content must not be blank".to_string(),
            ));
        }
        if content.contains(&TERMINATOR) {
            return Err(CarLotError::InvalidField(
                "record content must not contain a line separator".to_string(),
            ));
        }

        let mut frame = Vec::with_capacity(self.capacity + 1);
        frame.extend_from_slice(content);
        frame.resize(self.capacity, PAD_BYTE);
        frame.push(TERMINATOR);
        Ok(frame)
    }

    fn append_frame(&mut self, frame: &[u8]) -> Result<u64> {
        let mut file = &self.file;
        let offset = file.seek(SeekFrom::End(0))?;
        if offset % self.stride() != 0 {
            return Err(CarLotError::Storage(format!(
                "{}: end offset {} is not slot aligned",
                self.path.display(),
                offset
            )));
        }

        file.write_all(frame)?;

        let slot = offset / self.stride();
        self.slot_count = slot + 1;
        debug!(slot, "appended slot");
        Ok(slot)
    }

    fn write_frame(&self, slot: u64, frame: &[u8]) -> Result<()> {
        let mut file = &self.file;
        file.seek(SeekFrom::Start(slot * self.stride()))?;
        file.write_all(frame)?;
        Ok(())
    }

    fn check_range(&self, slot: u64) -> Result<()> {
        if slot >= self.slot_count {
            return Err(CarLotError::OutOfRange {
                slot,
                slot_count: self.slot_count,
            });
        }
        Ok(())
    }
}

/// Sequential iterator over `(slot_number, content)` pairs
pub struct SlotIter {
    reader: BufReader<File>,
    capacity: usize,
    next_slot: u64,
    /// Stop after this many slots (snapshot taken when the scan started)
    slot_count: u64,
    /// Set after an I/O error so the iterator ends instead of repeating it
    failed: bool,
}

impl Iterator for SlotIter {
    type Item = Result<(u64, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.next_slot >= self.slot_count {
            return None;
        }

        let mut buf = vec![0u8; self.capacity + 1];
        if let Err(e) = self.reader.read_exact(&mut buf) {
            self.failed = true;
            return Some(Err(CarLotError::Io(e)));
        }

        let slot = self.next_slot;
        self.next_slot += 1;

        Some(Ok((slot, trim_padding(&buf[..self.capacity]).to_vec())))
    }
}
