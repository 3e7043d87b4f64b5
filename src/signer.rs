//! secp256k1 ECDSA over transaction digests.
//!
//! Nonces come from k256's RFC6979 implementation, so two digests signed with one key never
//! share a nonce.

use k256::ecdsa::signature::hazmat::PrehashSigner as _;
use k256::ecdsa::{Signature, SigningKey};

use crate::Result;
use crate::codec::SignableDigest;
use crate::error::Error;
use crate::keys::PRIVATE_KEY_LEN;

/// DER-encoded ECDSA signature over a [`SignableDigest`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransactionSignature(Vec<u8>);

impl TransactionSignature {
    #[must_use]
    pub fn as_der(&self) -> &[u8] {
        &self.0
    }

    /// Hex of the DER bytes, as the node expects in `TransactionSignatureHex`.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

/// Signs `digest` with a raw 32-byte private key.
pub fn sign(digest: &SignableDigest, private_key: &[u8]) -> Result<TransactionSignature> {
    if private_key.len() != PRIVATE_KEY_LEN {
        return Err(Error::signing(format!(
            "private key must be {PRIVATE_KEY_LEN} bytes, got {}",
            private_key.len()
        )));
    }
    let signing_key = SigningKey::from_slice(private_key)
        .map_err(|e| Error::signing(format!("invalid private key: {e}")))?;

    let signature: Signature = signing_key
        .sign_prehash(digest.as_bytes())
        .map_err(|e| Error::signing(format!("failed to sign digest: {e}")))?;

    Ok(TransactionSignature(signature.to_der().as_bytes().to_vec()))
}
