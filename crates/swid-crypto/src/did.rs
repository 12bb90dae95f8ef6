//! `did:key` encoding.
//!
//! `did:key:z<base58btc(0xed 0x01 || public_key)>`

use crate::{constants::*, errors::*, keys::Ed25519KeyPair};

/// Encode an Ed25519 public key as a `did:key` identifier
pub fn did_key_from_public_key(public_key: &[u8; PUBLIC_KEY_SIZE]) -> String {
    let mut bytes = Vec::with_capacity(ED25519_PUB_MULTICODEC.len() + PUBLIC_KEY_SIZE);
    bytes.extend_from_slice(&ED25519_PUB_MULTICODEC);
    bytes.extend_from_slice(public_key);

    format!(
        "{}{}{}",
        DID_KEY_PREFIX,
        MULTIBASE_BASE58BTC,
        bs58::encode(bytes).into_string()
    )
}

/// The multibase public-key portion of a `did:key` (the part after `did:key:`)
pub fn public_key_multibase(did: &str) -> Result<&str> {
    let key_part = did
        .strip_prefix(DID_KEY_PREFIX)
        .ok_or_else(|| CryptoError::InvalidDid(format!("missing {} prefix", DID_KEY_PREFIX)))?;

    if !key_part.starts_with(MULTIBASE_BASE58BTC) {
        return Err(CryptoError::InvalidDid(
            "did:key must use base58btc encoding (z prefix)".to_string(),
        ));
    }

    Ok(key_part)
}

/// Decode the Ed25519 public key embedded in a `did:key`
pub fn public_key_from_did_key(did: &str) -> Result<[u8; PUBLIC_KEY_SIZE]> {
    let multibase = public_key_multibase(did)?;
    let bytes = bs58::decode(&multibase[1..])
        .into_vec()
        .map_err(|e| CryptoError::InvalidDid(e.to_string()))?;

    let key = bytes
        .strip_prefix(&ED25519_PUB_MULTICODEC[..])
        .ok_or_else(|| CryptoError::InvalidDid("not an ed25519-pub key".to_string()))?;

    key.try_into().map_err(|_| CryptoError::InvalidKeySize {
        expected: PUBLIC_KEY_SIZE,
        actual: key.len(),
    })
}

/// Derive the identifier owned by a PKCS#8 PEM private key
pub fn did_from_private_key_pem(pem: &str) -> Result<String> {
    Ok(Ed25519KeyPair::from_pkcs8_pem(pem)?.did())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_did_key_shape() {
        let did = Ed25519KeyPair::from_seed(&[42u8; 32]).did();
        // ed25519 did:key values always start with z6Mk
        assert!(did.starts_with("did:key:z6Mk"), "unexpected did: {}", did);
    }

    #[test]
    fn test_public_key_recovered_from_did() {
        let keypair = Ed25519KeyPair::from_seed(&[9u8; 32]);
        let recovered = public_key_from_did_key(&keypair.did()).unwrap();
        assert_eq!(recovered, keypair.public_key_bytes());
    }

    #[test]
    fn test_did_from_private_key_pem() {
        let keypair = Ed25519KeyPair::generate();
        let pem = keypair.to_pkcs8_pem().unwrap();
        assert_eq!(did_from_private_key_pem(pem.expose()).unwrap(), keypair.did());
    }

    #[test]
    fn test_rejects_foreign_methods() {
        assert!(public_key_multibase("did:web:example.com").is_err());
        assert!(public_key_multibase("did:key:f00d").is_err());
        assert!(public_key_from_did_key("did:key:z111").is_err());
    }

    #[test]
    fn test_public_key_multibase_strips_prefix() {
        let did = Ed25519KeyPair::from_seed(&[3u8; 32]).did();
        let part = public_key_multibase(&did).unwrap();
        assert_eq!(format!("did:key:{}", part), did);
    }
}
