//! BLS12-381 transaction signatures.
//!
//! Minimal-pubkey-size variant as used by Amadeus transactions:
//! - Public keys in G1 (48 bytes compressed)
//! - Signatures in G2 (96 bytes compressed)
//! - Messages hashed to G2 with hash_to_curve (XMD:SHA-256, SSWU, random oracle)
//!
//! Keys and signatures travel base58-encoded, like addresses.

use crate::util::errors::{AgentError, AgentResult};
use blst::min_pk::{PublicKey, SecretKey, Signature};
use blst::BLST_ERROR;
use num_bigint::BigUint;
use zeroize::Zeroizing;

/// Domain separation tag for transaction signatures.
pub const TX_DST: &[u8] = b"AMADEUS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_TX_";

/// Order r of the BLS12-381 scalar field, big-endian.
const SCALAR_FIELD_ORDER: [u8; 32] = [
    0x73, 0xed, 0xa7, 0x53, 0x29, 0x9d, 0x7d, 0x48, 0x33, 0x39, 0xd8, 0x08, 0x09, 0xa1, 0xd8, 0x05,
    0x53, 0xbd, 0xa4, 0x02, 0xff, 0xfe, 0x5b, 0xfe, 0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x01,
];

/// Reads `raw` as a little-endian integer and reduces it modulo r.
///
/// Returns the canonical scalar as a fixed-width big-endian private key.
pub fn reduce_secret_key(raw: &[u8]) -> AgentResult<Zeroizing<[u8; 32]>> {
    let order = BigUint::from_bytes_be(&SCALAR_FIELD_ORDER);
    let scalar = BigUint::from_bytes_le(raw) % &order;
    if scalar.bits() == 0 {
        return Err(AgentError::Decode(
            "secret key reduces to the zero scalar".to_string(),
        ));
    }

    let be = Zeroizing::new(scalar.to_bytes_be());
    let mut key = Zeroizing::new([0u8; 32]);
    key[32 - be.len()..].copy_from_slice(&be);
    Ok(key)
}

fn secret_key_from_b58(secret_key_b58: &str) -> AgentResult<SecretKey> {
    let raw = Zeroizing::new(
        bs58::decode(secret_key_b58.trim())
            .into_vec()
            .map_err(|e| AgentError::Decode(format!("secret key is not valid base58: {}", e)))?,
    );
    if raw.is_empty() {
        return Err(AgentError::Decode("secret key is empty".to_string()));
    }

    let key = reduce_secret_key(&raw)?;
    SecretKey::from_bytes(key.as_ref())
        .map_err(|e| AgentError::Decode(format!("invalid BLS secret key: {:?}", e)))
}

fn decode_payload(signing_payload_hex: &str) -> AgentResult<Vec<u8>> {
    let trimmed = signing_payload_hex.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let payload = hex::decode(digits)
        .map_err(|e| AgentError::Decode(format!("signing payload is not valid hex: {}", e)))?;
    if payload.is_empty() {
        return Err(AgentError::Decode("signing payload is empty".to_string()));
    }
    Ok(payload)
}

fn decode_b58(value: &str, what: &str) -> AgentResult<Vec<u8>> {
    bs58::decode(value.trim())
        .into_vec()
        .map_err(|e| AgentError::Decode(format!("{} is not valid base58: {}", what, e)))
}

/// Signs a hex-encoded signing payload with a base58-encoded secret key.
///
/// Returns the compressed G2 signature, base58-encoded.
pub fn sign(signing_payload_hex: &str, secret_key_b58: &str) -> AgentResult<String> {
    let payload = decode_payload(signing_payload_hex)?;
    let secret = secret_key_from_b58(secret_key_b58)?;
    let signature = secret.sign(&payload, TX_DST, &[]);
    Ok(bs58::encode(signature.compress()).into_string())
}

/// Base58-encoded compressed G1 public key for a secret key.
pub fn derive_public_key(secret_key_b58: &str) -> AgentResult<String> {
    let secret = secret_key_from_b58(secret_key_b58)?;
    Ok(bs58::encode(secret.sk_to_pk().compress()).into_string())
}

pub fn verify(
    signing_payload_hex: &str,
    signature_b58: &str,
    public_key_b58: &str,
) -> AgentResult<bool> {
    let payload = decode_payload(signing_payload_hex)?;
    let signature = Signature::from_bytes(&decode_b58(signature_b58, "signature")?)
        .map_err(|e| AgentError::Decode(format!("invalid BLS signature: {:?}", e)))?;
    let public_key = PublicKey::from_bytes(&decode_b58(public_key_b58, "public key")?)
        .map_err(|e| AgentError::Decode(format!("invalid BLS public key: {:?}", e)))?;

    let result = signature.verify(true, &payload, TX_DST, &[], &public_key, true);
    Ok(result == BLST_ERROR::BLST_SUCCESS)
}
