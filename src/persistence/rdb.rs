//! Disk save/load wrapper around the v9 RDB codec (`crate::rdb`).
//!
//! This module used to carry its own string-only, version-"0001" encoding;
//! that shape has been folded into `crate::rdb`, which understands all five
//! value types and the version this crate speaks over `PSYNC`. What remains
//! here is just the file-handling glue: open a path, stream bytes through
//! the real codec, write them back out.

use crate::error::{Result, SlotKvError};
use crate::storage::KvStore;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Save every database in `store` to `path` as a v9 RDB file.
pub fn save_stored_value_rdb<P: AsRef<Path>>(path: P, store: &dyn KvStore) -> Result<()> {
    let payload = crate::rdb::encode_all(store)?;
    let mut file = File::create(path)
        .map_err(|e| SlotKvError::Persistence(format!("Failed to create RDB file: {}", e)))?;
    file.write_all(&payload)
        .map_err(|e| SlotKvError::Persistence(format!("Failed to write RDB file: {}", e)))?;
    file.flush()
        .map_err(|e| SlotKvError::Persistence(format!("Failed to flush RDB file: {}", e)))
}

/// Load a v9 RDB file from `path`, applying every entry to `store`.
pub fn load_stored_value_rdb<P: AsRef<Path>>(path: P, store: &dyn KvStore) -> Result<()> {
    let mut file = File::open(path)
        .map_err(|e| SlotKvError::Persistence(format!("Failed to open RDB file: {}", e)))?;
    let mut payload = Vec::new();
    file.read_to_end(&mut payload)
        .map_err(|e| SlotKvError::Persistence(format!("Failed to read RDB file: {}", e)))?;
    crate::rdb::decode_into(store, &payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{StorageAdapter, StoredValue};
    use bytes::Bytes;
    use tempfile::NamedTempFile;

    #[test]
    fn save_and_load_round_trip() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path();

        let store = StorageAdapter::new();
        store
            .set_value(0, "key1".to_string(), StoredValue::new_string(Bytes::from("value1")))
            .unwrap();
        store
            .set_value(1, "key3".to_string(), StoredValue::new_string(Bytes::from("value3")))
            .unwrap();

        save_stored_value_rdb(path, &store).unwrap();

        let restored = StorageAdapter::new();
        load_stored_value_rdb(path, &restored).unwrap();

        assert_eq!(
            restored.get_value(0, "key1").unwrap().unwrap().as_string().unwrap(),
            Bytes::from("value1"),
        );
        assert_eq!(
            restored.get_value(1, "key3").unwrap().unwrap().as_string().unwrap(),
            Bytes::from("value3"),
        );
    }
}
