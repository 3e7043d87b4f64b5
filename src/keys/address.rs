//! Base58-check public key addresses.
//!
//! Layout: `version (1) || compressed public key (33) || sha256d(version || key)[..4]`.

use k256::PublicKey;

use crate::Result;
use crate::error::Error;
use crate::keys::PUBLIC_KEY_LEN;
use crate::types::Network;

/// Encodes a compressed public key as a base58-check address for `network`.
#[must_use]
pub fn address(public_key: &[u8; PUBLIC_KEY_LEN], network: Network) -> String {
    let mut payload = Vec::with_capacity(1 + PUBLIC_KEY_LEN);
    payload.push(network.address_version());
    payload.extend_from_slice(public_key);
    bs58::encode(payload).with_check().into_string()
}

/// Decodes an address, verifying its checksum, version byte and curve point.
pub fn parse_address(address: &str) -> Result<(Network, [u8; PUBLIC_KEY_LEN])> {
    let payload = bs58::decode(address.trim())
        .with_check(None)
        .into_vec()
        .map_err(|e| Error::validation(format!("invalid base58-check address: {e}")))?;

    let Some((&version, key)) = payload.split_first() else {
        return Err(Error::validation("address payload is empty"));
    };
    let network = Network::from_address_version(version)
        .ok_or_else(|| Error::validation(format!("unknown address version byte {version:#04x}")))?;
    let public_key: [u8; PUBLIC_KEY_LEN] = key.try_into().map_err(|_e| {
        Error::validation(format!(
            "address must carry a {PUBLIC_KEY_LEN} byte public key, got {}",
            key.len()
        ))
    })?;
    PublicKey::from_sec1_bytes(&public_key)
        .map_err(|e| Error::validation(format!("address public key is not on the curve: {e}")))?;

    Ok((network, public_key))
}
