//! # swid-storage
//!
//! Storage abstraction layer for the SWID registry using RocksDB.
//!
//! The [`Storage`] trait keeps the registry testable against any key-value
//! backend; [`RocksDbStorage`] is the production implementation.

#![warn(clippy::all)]

pub mod column_families;
pub mod errors;
pub mod rocksdb_impl;
pub mod traits;

pub use column_families::*;
pub use errors::{Result, StorageError};
pub use rocksdb_impl::RocksDbStorage;
pub use traits::{Batch, BatchExt, Storage};
