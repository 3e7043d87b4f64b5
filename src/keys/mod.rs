//! Seed handling and secp256k1 key derivation.
//!
//! A seed is either 32 bytes of hex (used directly as the secret scalar) or a BIP39 English
//! mnemonic, stretched with an optional passphrase and derived along `m/44'/0'/{account}'/0/0`.
//! The form is decided once in [`SeedForm::parse`] and never re-inspected afterwards.

pub mod address;

use std::fmt;

use bip32::{DerivationPath, XPrv};
use bip39::{Language, Mnemonic};
use k256::ecdsa::SigningKey;
use k256::elliptic_curve::sec1::ToEncodedPoint as _;
use secrecy::zeroize::Zeroizing;
use secrecy::{ExposeSecret as _, SecretBox, SecretString};

use crate::Result;
use crate::codec::SignableDigest;
use crate::error::Error;
use crate::signer::{self, TransactionSignature};
use crate::types::Network;

pub use address::{address, parse_address};

pub const PRIVATE_KEY_LEN: usize = 32;
pub const PUBLIC_KEY_LEN: usize = 33;

/// How the secret was supplied.
#[non_exhaustive]
#[derive(Debug)]
pub enum SeedForm {
    /// Raw secret scalar.
    Hex(SecretBox<[u8; PRIVATE_KEY_LEN]>),
    /// BIP39 phrase, checksum already verified.
    Mnemonic(SecretString),
}

impl SeedForm {
    /// Classifies and validates a seed string.
    ///
    /// Anything that decodes as hex is treated as a raw key and must be exactly 32 bytes.
    pub fn parse(seed: &str) -> Result<SeedForm> {
        let seed = seed.trim();
        if seed.is_empty() {
            return Err(Error::invalid_seed("seed must be provided"));
        }

        if let Ok(bytes) = hex::decode(seed) {
            let bytes = Zeroizing::new(bytes);
            let scalar: [u8; PRIVATE_KEY_LEN] = bytes.as_slice().try_into().map_err(|_e| {
                Error::invalid_seed(format!(
                    "seed hex must encode {PRIVATE_KEY_LEN} bytes, got {}",
                    bytes.len()
                ))
            })?;
            return Ok(SeedForm::Hex(SecretBox::new(Box::new(scalar))));
        }

        Mnemonic::parse_in_normalized(Language::English, seed)
            .map_err(|e| Error::invalid_seed(format!("invalid mnemonic seed phrase: {e}")))?;
        Ok(SeedForm::Mnemonic(SecretString::from(seed.to_owned())))
    }
}

/// Compressed public key plus its secret scalar, fixed for the lifetime of a client.
pub struct KeyPair {
    public_key: [u8; PUBLIC_KEY_LEN],
    private_key: SecretBox<[u8; PRIVATE_KEY_LEN]>,
    network: Network,
}

impl KeyPair {
    /// Builds a key pair from a raw secret scalar.
    pub fn from_private_key(private_key: &[u8], network: Network) -> Result<KeyPair> {
        let scalar: [u8; PRIVATE_KEY_LEN] = private_key.try_into().map_err(|_e| {
            Error::invalid_seed(format!(
                "private key must be {PRIVATE_KEY_LEN} bytes, got {}",
                private_key.len()
            ))
        })?;
        let signing_key = SigningKey::from_slice(&scalar)
            .map_err(|e| Error::invalid_seed(format!("private key is not a valid scalar: {e}")))?;

        let point = signing_key.verifying_key().to_encoded_point(true);
        let public_key: [u8; PUBLIC_KEY_LEN] = point.as_bytes().try_into().map_err(|_e| {
            Error::signing(format!(
                "compressed public key has unexpected length {}",
                point.len()
            ))
        })?;

        Ok(KeyPair {
            public_key,
            private_key: SecretBox::new(Box::new(scalar)),
            network,
        })
    }

    #[must_use]
    pub fn public_key(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.public_key
    }

    #[must_use]
    pub fn network(&self) -> Network {
        self.network
    }

    /// Base58-check address of this key on its network.
    #[must_use]
    pub fn address(&self) -> String {
        address(&self.public_key, self.network)
    }

    /// Signs a transaction digest with the held private key.
    pub fn sign(&self, digest: &SignableDigest) -> Result<TransactionSignature> {
        signer::sign(digest, self.private_key.expose_secret())
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &hex::encode(self.public_key))
            .field("private_key", &"[REDACTED]")
            .field("network", &self.network)
            .finish()
    }
}

/// Derives the key pair for a seed.
///
/// A hex seed must come with an empty passphrase and account index 0. The network only selects
/// the address encoding; the same seed yields the same key material on both networks.
pub fn derive(
    seed: &str,
    passphrase: &str,
    account_index: u32,
    network: Network,
) -> Result<KeyPair> {
    derive_from_form(&SeedForm::parse(seed)?, passphrase, account_index, network)
}

pub fn derive_from_form(
    seed: &SeedForm,
    passphrase: &str,
    account_index: u32,
    network: Network,
) -> Result<KeyPair> {
    match seed {
        SeedForm::Hex(scalar) => {
            if !passphrase.is_empty() || account_index != 0 {
                return Err(Error::conflicting_parameters(
                    "seed hex provided, but passphrase or index params were also provided",
                ));
            }
            KeyPair::from_private_key(scalar.expose_secret(), network)
        }
        SeedForm::Mnemonic(phrase) => {
            let mnemonic = Mnemonic::parse_in_normalized(Language::English, phrase.expose_secret())
                .map_err(|e| Error::invalid_seed(format!("invalid mnemonic seed phrase: {e}")))?;
            let seed = Zeroizing::new(mnemonic.to_seed(passphrase));

            let path = account_path(account_index)?;
            let child = XPrv::derive_from_path(&seed[..], &path)
                .map_err(|e| Error::invalid_seed(format!("key derivation failed: {e}")))?;
            let scalar: Zeroizing<[u8; PRIVATE_KEY_LEN]> =
                Zeroizing::new(child.private_key().to_bytes().into());

            KeyPair::from_private_key(scalar.as_slice(), network)
        }
    }
}

fn account_path(account_index: u32) -> Result<DerivationPath> {
    format!("m/44'/0'/{account_index}'/0/0")
        .parse()
        .map_err(|e| Error::validation(format!("invalid account index {account_index}: {e}")))
}
