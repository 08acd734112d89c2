//! Tests for SlotStore
//!
//! These tests verify:
//! - Fixed-stride layout and slot numbering
//! - Capacity and range checks
//! - In-place updates
//! - Free-list release/reuse and its rebuild on reopen
//! - Raw scans

use std::fs;
use std::path::PathBuf;

use carlot::storage::SlotStore;
use carlot::CarLotError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

const CAPACITY: usize = 16;

fn setup_temp_store() -> (TempDir, PathBuf, SlotStore) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("data.txt");
    let store = SlotStore::open(&path, CAPACITY).unwrap();
    (temp_dir, path, store)
}

fn scan_contents(store: &SlotStore) -> Vec<(u64, Vec<u8>)> {
    store.scan().unwrap().map(|r| r.unwrap()).collect()
}

// =============================================================================
// Open Tests
// =============================================================================

#[test]
fn test_open_creates_empty_file() {
    let (_temp, path, store) = setup_temp_store();

    assert!(path.exists());
    assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    assert_eq!(store.slot_count(), 0);
    assert_eq!(store.free_count(), 0);
    assert_eq!(store.stride(), CAPACITY as u64 + 1);
}

#[test]
fn test_open_rejects_zero_capacity() {
    let temp_dir = TempDir::new().unwrap();
    let result = SlotStore::open(&temp_dir.path().join("data.txt"), 0);

    assert!(matches!(result, Err(CarLotError::Config(_))));
}

#[test]
fn test_open_rejects_misaligned_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("data.txt");
    fs::write(&path, b"abc").unwrap();

    let result = SlotStore::open(&path, CAPACITY);

    assert!(matches!(result, Err(CarLotError::Storage(_))));
}

// =============================================================================
// Append / Read Tests
// =============================================================================

#[test]
fn test_append_assigns_sequential_slots() {
    let (_temp, path, mut store) = setup_temp_store();

    assert_eq!(store.append(b"first").unwrap(), 0);
    assert_eq!(store.append(b"second").unwrap(), 1);
    assert_eq!(store.append(b"third").unwrap(), 2);

    assert_eq!(store.slot_count(), 3);
    assert_eq!(fs::metadata(&path).unwrap().len(), 3 * store.stride());
}

#[test]
fn test_slot_layout_is_padded_and_terminated() {
    let (_temp, path, mut store) = setup_temp_store();

    store.append(b"abc").unwrap();

    let raw = fs::read(&path).unwrap();
    let mut expected = b"abc".to_vec();
    expected.resize(CAPACITY, b' ');
    expected.push(b'\n');
    assert_eq!(raw, expected);
}

#[test]
fn test_read_strips_padding() {
    let (_temp, _path, mut store) = setup_temp_store();

    let slot = store.append(b"a;b;c").unwrap();

    assert_eq!(store.read(slot).unwrap(), b"a;b;c".to_vec());
}

#[test]
fn test_record_at_exact_capacity() {
    let (_temp, _path, mut store) = setup_temp_store();
    let content = vec![b'x'; CAPACITY];

    let slot = store.append(&content).unwrap();

    assert_eq!(store.read(slot).unwrap(), content);
}

#[test]
fn test_append_over_capacity_fails() {
    let (_temp, path, mut store) = setup_temp_store();
    let content = vec![b'x'; CAPACITY + 1];

    let result = store.append(&content);

    assert!(matches!(
        result,
        Err(CarLotError::CapacityExceeded { len, capacity }) if len == CAPACITY + 1 && capacity == CAPACITY
    ));
    assert_eq!(store.slot_count(), 0);
    assert_eq!(fs::metadata(&path).unwrap().len(), 0);
}

#[test]
fn test_blank_and_multiline_content_rejected() {
    let (_temp, _path, mut store) = setup_temp_store();

    assert!(matches!(store.append(b""), Err(CarLotError::InvalidField(_))));
    assert!(matches!(store.append(b"   "), Err(CarLotError::InvalidField(_))));
    assert!(matches!(store.append(b"a\nb"), Err(CarLotError::InvalidField(_))));
    assert_eq!(store.slot_count(), 0);
}

#[test]
fn test_read_out_of_range() {
    let (_temp, _path, mut store) = setup_temp_store();
    store.append(b"only").unwrap();

    let result = store.read(1);

    assert!(matches!(
        result,
        Err(CarLotError::OutOfRange { slot: 1, slot_count: 1 })
    ));
}

// =============================================================================
// Update Tests
// =============================================================================

#[test]
fn test_update_in_place_keeps_neighbours() {
    let (_temp, path, mut store) = setup_temp_store();
    store.append(b"zero").unwrap();
    store.append(b"one").unwrap();
    store.append(b"two").unwrap();

    store.update(1, b"ONE-UPDATED").unwrap();

    assert_eq!(store.read(0).unwrap(), b"zero".to_vec());
    assert_eq!(store.read(1).unwrap(), b"ONE-UPDATED".to_vec());
    assert_eq!(store.read(2).unwrap(), b"two".to_vec());
    assert_eq!(store.slot_count(), 3);
    assert_eq!(fs::metadata(&path).unwrap().len(), 3 * store.stride());
}

#[test]
fn test_update_shorter_content_clears_tail() {
    let (_temp, _path, mut store) = setup_temp_store();
    let slot = store.append(b"a-long-record").unwrap();

    store.update(slot, b"short").unwrap();

    assert_eq!(store.read(slot).unwrap(), b"short".to_vec());
}

#[test]
fn test_update_errors() {
    let (_temp, _path, mut store) = setup_temp_store();
    let slot = store.append(b"record").unwrap();

    assert!(matches!(
        store.update(5, b"x"),
        Err(CarLotError::OutOfRange { slot: 5, .. })
    ));
    assert!(matches!(
        store.update(slot, &vec![b'y'; CAPACITY + 1]),
        Err(CarLotError::CapacityExceeded { .. })
    ));
    assert_eq!(store.read(slot).unwrap(), b"record".to_vec());
}

// =============================================================================
// Free-List Tests
// =============================================================================

#[test]
fn test_release_blanks_slot() {
    let (_temp, _path, mut store) = setup_temp_store();
    store.append(b"keep").unwrap();
    let slot = store.append(b"drop").unwrap();

    store.release(slot).unwrap();

    assert!(store.is_free(slot));
    assert_eq!(store.free_count(), 1);
    assert!(store.read(slot).unwrap().is_empty());
    assert_eq!(store.slot_count(), 2);
}

#[test]
fn test_release_twice_is_noop() {
    let (_temp, _path, mut store) = setup_temp_store();
    let slot = store.append(b"drop").unwrap();

    store.release(slot).unwrap();
    store.release(slot).unwrap();

    assert_eq!(store.free_count(), 1);
}

#[test]
fn test_allocate_reuses_lowest_free_slot() {
    let (_temp, _path, mut store) = setup_temp_store();
    for content in [b"s0", b"s1", b"s2", b"s3"] {
        store.append(content).unwrap();
    }
    store.release(2).unwrap();
    store.release(1).unwrap();

    assert_eq!(store.allocate(b"new-a").unwrap(), 1);
    assert_eq!(store.allocate(b"new-b").unwrap(), 2);
    assert_eq!(store.allocate(b"new-c").unwrap(), 4);

    assert_eq!(store.free_count(), 0);
    assert_eq!(store.read(1).unwrap(), b"new-a".to_vec());
    assert_eq!(store.read(2).unwrap(), b"new-b".to_vec());
    assert_eq!(store.slot_count(), 5);
}

#[test]
fn test_append_ignores_free_list() {
    let (_temp, _path, mut store) = setup_temp_store();
    store.append(b"s0").unwrap();
    store.release(0).unwrap();

    assert_eq!(store.append(b"s1").unwrap(), 1);
    assert!(store.is_free(0));
}

#[test]
fn test_update_of_free_slot_takes_it_off_free_list() {
    let (_temp, _path, mut store) = setup_temp_store();
    store.append(b"s0").unwrap();
    store.release(0).unwrap();

    store.update(0, b"back").unwrap();

    assert!(!store.is_free(0));
    assert_eq!(store.allocate(b"next").unwrap(), 1);
}

#[test]
fn test_reopen_rebuilds_free_list() {
    let (_temp, path, mut store) = setup_temp_store();
    store.append(b"s0").unwrap();
    store.append(b"s1").unwrap();
    store.append(b"s2").unwrap();
    store.release(1).unwrap();
    drop(store);

    let mut reopened = SlotStore::open(&path, CAPACITY).unwrap();

    assert_eq!(reopened.slot_count(), 3);
    assert_eq!(reopened.free_count(), 1);
    assert!(reopened.is_free(1));
    assert_eq!(reopened.allocate(b"again").unwrap(), 1);
}

// =============================================================================
// Scan Tests
// =============================================================================

#[test]
fn test_scan_empty_store() {
    let (_temp, _path, store) = setup_temp_store();

    assert!(scan_contents(&store).is_empty());
}

#[test]
fn test_scan_visits_every_slot_in_order() {
    let (_temp, _path, mut store) = setup_temp_store();
    store.append(b"a").unwrap();
    store.append(b"b").unwrap();
    store.append(b"c").unwrap();
    store.release(1).unwrap();

    let rows = scan_contents(&store);

    assert_eq!(
        rows,
        vec![(0, b"a".to_vec()), (1, Vec::new()), (2, b"c".to_vec())]
    );
}

#[test]
fn test_scan_is_restartable() {
    let (_temp, _path, mut store) = setup_temp_store();
    store.append(b"a").unwrap();
    store.append(b"b").unwrap();

    let first = scan_contents(&store);
    let second = scan_contents(&store);

    assert_eq!(first, second);
}

#[test]
fn test_scan_does_not_disturb_point_reads() {
    let (_temp, _path, mut store) = setup_temp_store();
    store.append(b"a").unwrap();
    store.append(b"b").unwrap();

    let mut scan = store.scan().unwrap();
    let (slot, _) = scan.next().unwrap().unwrap();
    assert_eq!(slot, 0);

    assert_eq!(store.read(1).unwrap(), b"b".to_vec());

    let (slot, content) = scan.next().unwrap().unwrap();
    assert_eq!(slot, 1);
    assert_eq!(content, b"b".to_vec());
    assert!(scan.next().is_none());
}
