//! # swid-crypto
//!
//! Cryptographic primitives for the SWID registry.
//!
//! - Ed25519 key generation and PKCS#8 PEM encoding
//! - `did:key` identifiers (multicodec `ed25519-pub`, base58btc multibase)
//! - Timestamps shared by every subsystem
//!
//! ## Security Properties
//!
//! - Private key material is zeroized on drop
//! - No unsafe code

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod constants;
pub mod did;
pub mod errors;
pub mod keys;
pub mod utils;

pub use constants::*;
pub use did::*;
pub use errors::{CryptoError, Result};
pub use keys::{Ed25519KeyPair, PrivateKeyPem};
pub use utils::*;
