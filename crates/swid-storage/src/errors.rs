//! Storage error types.

use thiserror::Error;

/// Registry storage failures
#[derive(Debug, Error)]
pub enum StorageError {
    /// RocksDB rejected a read, write or open
    #[error("RocksDB error: {0}")]
    Database(#[from] rocksdb::Error),

    /// A key or stored value did not round-trip through bincode
    #[error("Encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    /// Column family was not created at open
    #[error("Unknown column family: {0}")]
    UnknownColumnFamily(String),

    /// Temporary database directory could not be created
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;
