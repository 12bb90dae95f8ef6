//! Identifier and key encoding constants.

/// Size of Ed25519 public keys in bytes
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Method prefix of every identifier issued by the registry
pub const DID_KEY_PREFIX: &str = "did:key:";

/// Multibase prefix for base58btc
pub const MULTIBASE_BASE58BTC: char = 'z';

/// Multicodec varint for `ed25519-pub`
pub const ED25519_PUB_MULTICODEC: [u8; 2] = [0xed, 0x01];
