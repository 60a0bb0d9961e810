use super::memory::{apply_batch, scan_prefix};
use crate::domain::errors::KVStoreError;
use crate::ports::outbound::{BatchOperation, KeyValueStore, ScanResult};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

type Entries = BTreeMap<Vec<u8>, Vec<u8>>;

fn io_error(e: std::io::Error) -> KVStoreError {
    KVStoreError::IOError {
        message: e.to_string(),
    }
}

/// File-backed key-value store for deployments without RocksDB.
///
/// The whole keyspace lives in memory and is rewritten to a single file on
/// every mutation (temp file, fsync, rename). Suitable for development and
/// small catalogues.
///
/// File format: repeated `[key_len:u32 LE][key][value_len:u32 LE][value]`.
#[derive(Debug)]
pub struct FileBackedKVStore {
    data: Entries,
    path: PathBuf,
}

impl FileBackedKVStore {
    /// Open the store at `path`, creating it lazily on first write.
    ///
    /// A truncated or otherwise malformed file is reported as corruption
    /// instead of being silently discarded.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, KVStoreError> {
        let path = path.as_ref().to_path_buf();

        let data = match std::fs::File::open(&path) {
            Ok(mut file) => {
                let mut bytes = Vec::new();
                file.read_to_end(&mut bytes).map_err(io_error)?;
                let data = decode(&bytes)?;
                tracing::info!(
                    path = %path.display(),
                    bytes = bytes.len(),
                    keys = data.len(),
                    "Loaded key-value file"
                );
                data
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "No key-value file yet, starting empty");
                Entries::new()
            }
            Err(e) => return Err(io_error(e)),
        };

        Ok(Self { data, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, data: &Entries) -> Result<(), KVStoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }

        let bytes = encode(data)?;

        let temp_path = self.path.with_extension("tmp");
        let mut file = std::fs::File::create(&temp_path).map_err(io_error)?;
        file.write_all(&bytes).map_err(io_error)?;
        file.sync_all().map_err(io_error)?;
        std::fs::rename(&temp_path, &self.path).map_err(io_error)?;

        Ok(())
    }

    /// Persist a modified copy, then swap it in. Memory never runs ahead of disk.
    fn commit(&mut self, next: Entries) -> Result<(), KVStoreError> {
        self.save(&next)?;
        self.data = next;
        Ok(())
    }
}

fn encode(data: &Entries) -> Result<Vec<u8>, KVStoreError> {
    let len_prefix = |len: usize| {
        u32::try_from(len)
            .map(u32::to_le_bytes)
            .map_err(|_| KVStoreError::IOError {
                message: format!("entry of {len} bytes exceeds the file format limit"),
            })
    };

    let mut bytes = Vec::new();
    for (key, value) in data {
        bytes.extend_from_slice(&len_prefix(key.len())?);
        bytes.extend_from_slice(key);
        bytes.extend_from_slice(&len_prefix(value.len())?);
        bytes.extend_from_slice(value);
    }
    Ok(bytes)
}

fn decode(bytes: &[u8]) -> Result<Entries, KVStoreError> {
    fn chunk<'a>(bytes: &'a [u8], cursor: &mut usize) -> Result<&'a [u8], KVStoreError> {
        let truncated = || KVStoreError::CorruptionError {
            message: format!("truncated entry at byte {cursor}"),
        };
        let header = bytes.get(*cursor..*cursor + 4).ok_or_else(truncated)?;
        let len = u32::from_le_bytes([header[0], header[1], header[2], header[3]]) as usize;
        let start = *cursor + 4;
        let body = bytes.get(start..start + len).ok_or_else(truncated)?;
        *cursor = start + len;
        Ok(body)
    }

    let mut data = Entries::new();
    let mut cursor = 0;
    while cursor < bytes.len() {
        let key = chunk(bytes, &mut cursor)?.to_vec();
        let value = chunk(bytes, &mut cursor)?.to_vec();
        data.insert(key, value);
    }
    Ok(data)
}

impl KeyValueStore for FileBackedKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        let mut next = self.data.clone();
        next.insert(key.to_vec(), value.to_vec());
        self.commit(next)
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError> {
        if !self.data.contains_key(key) {
            return Ok(());
        }
        let mut next = self.data.clone();
        next.remove(key);
        self.commit(next)
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        let mut next = self.data.clone();
        apply_batch(&mut next, operations);
        self.commit(next)
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        Ok(self.data.contains_key(key))
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError> {
        Ok(scan_prefix(&self.data, prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lots.kv");

        {
            let mut store = FileBackedKVStore::open(&path).unwrap();
            store
                .atomic_batch_write(vec![
                    BatchOperation::put(b"lot/a/1".to_vec(), b"one".to_vec()),
                    BatchOperation::put(b"lot/a/2".to_vec(), b"two".to_vec()),
                ])
                .unwrap();
            store.delete(b"lot/a/1").unwrap();
        }

        let store = FileBackedKVStore::open(&path).unwrap();
        assert_eq!(store.get(b"lot/a/1").unwrap(), None);
        assert_eq!(store.get(b"lot/a/2").unwrap(), Some(b"two".to_vec()));
        assert_eq!(store.prefix_scan(b"lot/a/").unwrap().len(), 1);
    }

    #[test]
    fn test_missing_file_opens_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileBackedKVStore::open(dir.path().join("nested/none.kv")).unwrap();
        assert!(store.prefix_scan(b"").unwrap().is_empty());
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper/lots.kv");

        let mut store = FileBackedKVStore::open(&path).unwrap();
        store.put(b"k", b"v").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_truncated_file_is_corruption() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lots.kv");

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&3u32.to_le_bytes());
        bytes.extend_from_slice(b"key");
        bytes.extend_from_slice(&10u32.to_le_bytes());
        bytes.extend_from_slice(b"short");
        std::fs::write(&path, bytes).unwrap();

        assert!(matches!(
            FileBackedKVStore::open(&path),
            Err(KVStoreError::CorruptionError { .. })
        ));
    }
}
