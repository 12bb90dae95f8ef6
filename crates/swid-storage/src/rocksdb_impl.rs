//! RocksDB storage implementation.

use crate::{
    column_families::all_column_families,
    errors::{Result, StorageError},
    traits::{decode, encode, Batch, Storage},
};
use async_trait::async_trait;
use rocksdb::{Options, WriteBatch, DB};
use serde::{de::DeserializeOwned, Serialize};
use std::{path::Path, sync::Arc};
use tokio::sync::Mutex;
use tracing::debug;

/// RocksDB storage implementation
pub struct RocksDbStorage {
    db: Arc<DB>,
    /// Serializes every conditional insert
    claim_lock: Mutex<()>,
}

impl RocksDbStorage {
    /// Open RocksDB database at the specified path
    ///
    /// Creates all required column families if they don't exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let db = DB::open_cf(&opts, &path, all_column_families())?;

        debug!("Opened RocksDB at {:?}", path.as_ref());

        Ok(Self {
            db: Arc::new(db),
            claim_lock: Mutex::new(()),
        })
    }

    /// Open a database in a fresh temporary directory
    ///
    /// The directory is removed when the returned `TempDir` is dropped, so
    /// callers must keep it alive as long as the storage is used.
    pub fn open_test() -> Result<(Self, tempfile::TempDir)> {
        let temp_dir = tempfile::TempDir::new()?;
        let storage = Self::open(temp_dir.path())?;
        Ok((storage, temp_dir))
    }

    fn cf_handle(&self, cf: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(cf)
            .ok_or_else(|| StorageError::UnknownColumnFamily(cf.to_string()))
    }

    fn read_raw(&self, cf: &str, key_bytes: &[u8]) -> Result<Option<Vec<u8>>> {
        let cf_handle = self.cf_handle(cf)?;
        Ok(self.db.get_cf(cf_handle, key_bytes)?)
    }

    fn write_raw(&self, cf: &str, key_bytes: &[u8], value_bytes: &[u8]) -> Result<()> {
        let cf_handle = self.cf_handle(cf)?;
        Ok(self.db.put_cf(cf_handle, key_bytes, value_bytes)?)
    }
}

#[async_trait]
impl Storage for RocksDbStorage {
    async fn get<K, V>(&self, cf: &str, key: &K) -> Result<Option<V>>
    where
        K: Serialize + Send + Sync,
        V: DeserializeOwned,
    {
        let key_bytes = encode(key)?;

        match self.read_raw(cf, &key_bytes)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn put<K, V>(&self, cf: &str, key: &K, value: &V) -> Result<()>
    where
        K: Serialize + Send + Sync,
        V: Serialize + Send + Sync,
    {
        let key_bytes = encode(key)?;
        let value_bytes = encode(value)?;
        self.write_raw(cf, &key_bytes, &value_bytes)
    }

    async fn put_if_absent<K, V>(&self, cf: &str, key: &K, value: &V) -> Result<bool>
    where
        K: Serialize + Send + Sync,
        V: Serialize + Send + Sync,
    {
        let key_bytes = encode(key)?;
        let value_bytes = encode(value)?;

        let _guard = self.claim_lock.lock().await;

        if self.read_raw(cf, &key_bytes)?.is_some() {
            return Ok(false);
        }

        self.write_raw(cf, &key_bytes, &value_bytes)?;
        Ok(true)
    }

    async fn exists<K>(&self, cf: &str, key: &K) -> Result<bool>
    where
        K: Serialize + Send + Sync,
    {
        let key_bytes = encode(key)?;
        Ok(self.read_raw(cf, &key_bytes)?.is_some())
    }

    async fn get_by_prefix<K, V>(&self, cf: &str, prefix: &K) -> Result<Vec<(Vec<u8>, V)>>
    where
        K: Serialize + Send + Sync,
        V: DeserializeOwned,
    {
        let cf_handle = self.cf_handle(cf)?;
        let prefix_bytes = encode(prefix)?;

        let mut results = Vec::new();

        // Seek to the prefix; keys are sorted, so stop at the first non-match
        let iter = self.db.iterator_cf(
            cf_handle,
            rocksdb::IteratorMode::From(&prefix_bytes, rocksdb::Direction::Forward),
        );

        for item in iter {
            let (key, value) = item?;

            if !key.starts_with(&prefix_bytes) {
                break;
            }
            results.push((key.to_vec(), decode(&value)?));
        }

        Ok(results)
    }

    async fn scan_all<V>(&self, cf: &str) -> Result<Vec<(Vec<u8>, V)>>
    where
        V: DeserializeOwned,
    {
        let cf_handle = self.cf_handle(cf)?;

        let mut results = Vec::new();
        let iter = self.db.iterator_cf(cf_handle, rocksdb::IteratorMode::Start);

        for item in iter {
            let (key, value) = item?;
            results.push((key.to_vec(), decode(&value)?));
        }

        Ok(results)
    }

    fn batch(&self) -> Box<dyn Batch> {
        Box::new(RocksDbBatch {
            db: Arc::clone(&self.db),
            write_batch: WriteBatch::default(),
        })
    }
}

/// RocksDB batch implementation
pub struct RocksDbBatch {
    db: Arc<DB>,
    write_batch: WriteBatch,
}

#[async_trait]
impl Batch for RocksDbBatch {
    fn put_raw(&mut self, cf: &str, key: Vec<u8>, value: Vec<u8>) -> Result<()> {
        let cf_handle = self
            .db
            .cf_handle(cf)
            .ok_or_else(|| StorageError::UnknownColumnFamily(cf.to_string()))?;

        self.write_batch.put_cf(cf_handle, &key, &value);

        Ok(())
    }

    fn delete_raw(&mut self, cf: &str, key: Vec<u8>) -> Result<()> {
        let cf_handle = self
            .db
            .cf_handle(cf)
            .ok_or_else(|| StorageError::UnknownColumnFamily(cf.to_string()))?;

        self.write_batch.delete_cf(cf_handle, &key);

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.db.write(self.write_batch)?;

        debug!("Batch committed successfully");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column_families::*;
    use crate::traits::BatchExt;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct TestRecord {
        name: String,
        value: u64,
    }

    fn record(name: &str, value: u64) -> TestRecord {
        TestRecord {
            name: name.to_string(),
            value,
        }
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let (storage, _dir) = RocksDbStorage::open_test().unwrap();
        let key = "did:key:z6MkA".to_string();

        storage
            .put(CF_ENTITY_RECORDS, &key, &record("a", 1))
            .await
            .unwrap();

        let result: Option<TestRecord> = storage.get(CF_ENTITY_RECORDS, &key).await.unwrap();
        assert_eq!(result, Some(record("a", 1)));
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let (storage, _dir) = RocksDbStorage::open_test().unwrap();

        let result: Option<TestRecord> = storage
            .get(CF_ENTITY_RECORDS, &"missing".to_string())
            .await
            .unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_exists() {
        let (storage, _dir) = RocksDbStorage::open_test().unwrap();
        let key = "k".to_string();

        assert!(!storage.exists(CF_ENTITY_RECORDS, &key).await.unwrap());
        storage
            .put(CF_ENTITY_RECORDS, &key, &record("k", 0))
            .await
            .unwrap();
        assert!(storage.exists(CF_ENTITY_RECORDS, &key).await.unwrap());
        assert!(!storage.exists(CF_CHANNEL_CLAIMS, &key).await.unwrap());
    }

    #[tokio::test]
    async fn test_put_if_absent_keeps_first_writer() {
        let (storage, _dir) = RocksDbStorage::open_test().unwrap();
        let name = "scout_one_abc123".to_string();

        let first = storage
            .put_if_absent(CF_CHANNEL_CLAIMS, &name, &"did:key:first".to_string())
            .await
            .unwrap();
        let second = storage
            .put_if_absent(CF_CHANNEL_CLAIMS, &name, &"did:key:second".to_string())
            .await
            .unwrap();

        assert!(first);
        assert!(!second);

        let owner: Option<String> = storage.get(CF_CHANNEL_CLAIMS, &name).await.unwrap();
        assert_eq!(owner.as_deref(), Some("did:key:first"));
    }

    #[tokio::test]
    async fn test_concurrent_put_if_absent_has_one_winner() {
        let (storage, _dir) = RocksDbStorage::open_test().unwrap();
        let storage = Arc::new(storage);

        let mut handles = Vec::new();
        for i in 0..16 {
            let storage = Arc::clone(&storage);
            handles.push(tokio::spawn(async move {
                storage
                    .put_if_absent(CF_CHANNEL_CLAIMS, &"contested".to_string(), &i)
                    .await
                    .unwrap()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_batch_moves_index_entry() {
        let (storage, _dir) = RocksDbStorage::open_test().unwrap();
        let old_key = ("did:key:zOld".to_string(), "did:key:zChild".to_string());
        let new_key = ("did:key:zNew".to_string(), "did:key:zChild".to_string());

        storage
            .put(CF_RECORDS_BY_REGISTRAR, &old_key, &old_key.1)
            .await
            .unwrap();

        let mut batch = storage.batch();
        batch.delete(CF_RECORDS_BY_REGISTRAR, &old_key).unwrap();
        batch
            .put(CF_RECORDS_BY_REGISTRAR, &new_key, &new_key.1)
            .unwrap();
        assert!(storage
            .exists(CF_RECORDS_BY_REGISTRAR, &old_key)
            .await
            .unwrap());
        batch.commit().await.unwrap();

        assert!(!storage
            .exists(CF_RECORDS_BY_REGISTRAR, &old_key)
            .await
            .unwrap());
        assert!(storage
            .exists(CF_RECORDS_BY_REGISTRAR, &new_key)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_unknown_column_family() {
        let (storage, _dir) = RocksDbStorage::open_test().unwrap();
        let err = storage
            .put("no_such_cf", &"k".to_string(), &1u8)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::UnknownColumnFamily(cf) if cf == "no_such_cf"));
    }

    #[tokio::test]
    async fn test_get_by_prefix() {
        let (storage, _dir) = RocksDbStorage::open_test().unwrap();

        let registrar = "did:key:z6MkRegistrar".to_string();
        let other = "did:key:z6MkOther".to_string();

        for (owner, child) in [(&registrar, "a"), (&registrar, "b"), (&other, "c")] {
            storage
                .put(
                    CF_RECORDS_BY_REGISTRAR,
                    &(owner.clone(), child.to_string()),
                    &child.to_string(),
                )
                .await
                .unwrap();
        }

        let results: Vec<(Vec<u8>, String)> = storage
            .get_by_prefix(CF_RECORDS_BY_REGISTRAR, &registrar)
            .await
            .unwrap();

        let children: Vec<String> = results.into_iter().map(|(_, v)| v).collect();
        assert_eq!(children, vec!["a".to_string(), "b".to_string()]);
    }
}
