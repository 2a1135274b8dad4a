//! Wallet seam for phase 2.
//!
//! The orchestrator never signs. A `TransactionSigner` is called by the
//! coordinator between the two phases, standing in for the wallet holder.

use super::extract::UnsignedTransaction;
use crate::crypto::bls;
use crate::util::errors::{AgentError, AgentResult};
use async_trait::async_trait;
use log::info;
use std::fmt;
use zeroize::Zeroizing;

/// Base58-encoded transaction signature. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(String);

impl Signature {
    pub fn new(encoded: impl Into<String>) -> AgentResult<Self> {
        let encoded = encoded.into().trim().to_string();
        if encoded.is_empty() {
            return Err(AgentError::Validation("signature is empty".to_string()));
        }
        Ok(Self(encoded))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[async_trait]
pub trait TransactionSigner: Send + Sync {
    async fn sign(&self, unsigned: &UnsignedTransaction) -> AgentResult<Signature>;
}

/// Signs with a locally held base58 secret key.
pub struct LocalBlsSigner {
    secret_key: Zeroizing<String>,
}

impl LocalBlsSigner {
    pub fn new(secret_key_b58: impl Into<String>) -> Self {
        Self {
            secret_key: Zeroizing::new(secret_key_b58.into()),
        }
    }

    pub fn public_key(&self) -> AgentResult<String> {
        bls::derive_public_key(&self.secret_key)
    }
}

impl fmt::Debug for LocalBlsSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalBlsSigner")
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl TransactionSigner for LocalBlsSigner {
    async fn sign(&self, unsigned: &UnsignedTransaction) -> AgentResult<Signature> {
        let encoded = bls::sign(&unsigned.signing_payload, &self.secret_key)?;
        info!(
            "Signed transaction payload: payload_bytes={}",
            unsigned.signing_payload.len() / 2
        );
        Signature::new(encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_signature_is_rejected() {
        assert!(Signature::new("  ").is_err());
        assert_eq!(Signature::new(" abc ").unwrap().as_str(), "abc");
    }

    #[tokio::test]
    async fn local_signer_matches_signing_module() {
        let secret = bs58::encode([9u8; 32]).into_string();
        let signer = LocalBlsSigner::new(secret.clone());
        let unsigned = UnsignedTransaction {
            signing_payload: "deadbeef".to_string(),
            blob: "abcd".to_string(),
        };

        let signature = signer.sign(&unsigned).await.unwrap();
        assert_eq!(signature.as_str(), bls::sign("deadbeef", &secret).unwrap());
        assert!(bls::verify("deadbeef", signature.as_str(), &signer.public_key().unwrap()).unwrap());
        assert!(!format!("{:?}", signer).contains(&secret));
    }

    #[tokio::test]
    async fn malformed_payload_never_yields_a_signature() {
        let signer = LocalBlsSigner::new(bs58::encode([9u8; 32]).into_string());
        let unsigned = UnsignedTransaction {
            signing_payload: "zz".to_string(),
            blob: "abcd".to_string(),
        };
        assert!(matches!(signer.sign(&unsigned).await, Err(AgentError::Decode(_))));
    }
}
