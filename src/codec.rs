//! Hex wire transactions and the digest a signature must cover.

use sha2::{Digest as _, Sha256};

use crate::Result;
use crate::error::Error;

/// `sha256(sha256(transaction bytes))`, the exact preimage the node verifies signatures against.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SignableDigest([u8; 32]);

impl SignableDigest {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

/// Decodes a hex transaction into its raw bytes.
pub fn decode_transaction(transaction_hex: &str) -> Result<Vec<u8>> {
    hex::decode(transaction_hex.trim()).map_err(|e| Error::malformed_hex("transaction", e))
}

/// Computes the signable digest of a hex transaction.
pub fn signable_digest(transaction_hex: &str) -> Result<SignableDigest> {
    let bytes = decode_transaction(transaction_hex)?;
    Ok(digest_bytes(&bytes))
}

#[must_use]
pub fn digest_bytes(bytes: &[u8]) -> SignableDigest {
    let first = Sha256::digest(bytes);
    SignableDigest(Sha256::digest(first).into())
}
