//! Key-value seam between the registry and its backend.

use crate::errors::Result;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

/// Column-family key-value store used by the registry
///
/// Keys and values are bincode-encoded. Listings return the raw key bytes
/// next to each decoded value.
#[async_trait]
pub trait Storage: Send + Sync {
    /// `Ok(None)` when the key is absent
    async fn get<K, V>(&self, cf: &str, key: &K) -> Result<Option<V>>
    where
        K: Serialize + Send + Sync,
        V: DeserializeOwned;

    async fn put<K, V>(&self, cf: &str, key: &K, value: &V) -> Result<()>
    where
        K: Serialize + Send + Sync,
        V: Serialize + Send + Sync;

    /// Insert only if the key is absent
    ///
    /// The check and the write are atomic with respect to every other
    /// `put_if_absent` on the same storage. Returns `false` when the key
    /// was already taken.
    async fn put_if_absent<K, V>(&self, cf: &str, key: &K, value: &V) -> Result<bool>
    where
        K: Serialize + Send + Sync,
        V: Serialize + Send + Sync;

    async fn exists<K>(&self, cf: &str, key: &K) -> Result<bool>
    where
        K: Serialize + Send + Sync;

    /// Every entry whose encoded key starts with the encoded `prefix`
    ///
    /// A tuple key `(a, b)` shares its encoded prefix with `a`, which is
    /// how secondary indexes are listed.
    async fn get_by_prefix<K, V>(&self, cf: &str, prefix: &K) -> Result<Vec<(Vec<u8>, V)>>
    where
        K: Serialize + Send + Sync,
        V: DeserializeOwned;

    /// Every entry in a column family, in key order
    async fn scan_all<V>(&self, cf: &str) -> Result<Vec<(Vec<u8>, V)>>
    where
        V: DeserializeOwned;

    /// Start a write batch; nothing is visible until `commit`
    fn batch(&self) -> Box<dyn Batch>;
}

/// Atomic group of writes over pre-encoded bytes
///
/// Use [`BatchExt`] for typed keys and values.
#[async_trait]
pub trait Batch: Send {
    fn put_raw(&mut self, cf: &str, key: Vec<u8>, value: Vec<u8>) -> Result<()>;

    fn delete_raw(&mut self, cf: &str, key: Vec<u8>) -> Result<()>;

    async fn commit(self: Box<Self>) -> Result<()>;
}

/// Typed writes on a [`Batch`]
pub trait BatchExt: Batch {
    fn put<K, V>(&mut self, cf: &str, key: &K, value: &V) -> Result<()>
    where
        K: Serialize,
        V: Serialize,
    {
        self.put_raw(cf, encode(key)?, encode(value)?)
    }

    fn delete<K>(&mut self, cf: &str, key: &K) -> Result<()>
    where
        K: Serialize,
    {
        self.delete_raw(cf, encode(key)?)
    }
}

impl<T: Batch + ?Sized> BatchExt for T {}

pub(crate) fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    Ok(bincode::serialize(value)?)
}

pub(crate) fn decode<V: DeserializeOwned>(bytes: &[u8]) -> Result<V> {
    Ok(bincode::deserialize(bytes)?)
}
