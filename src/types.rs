use std::str::FromStr;

use strum_macros::Display;

use crate::Result;
use crate::error::Error;

pub const MAINNET_NODE_URL: &str = "https://node.deso.org";
pub const TESTNET_NODE_URL: &str = "https://test.deso.org";

const MAINNET_EXPLORER_URL: &str = "https://deso.org";
const TESTNET_EXPLORER_URL: &str = "https://testnet.deso.org";

/// Which DeSo network keys, addresses and node URLs belong to.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, Display, Eq, Hash, PartialEq)]
#[strum(serialize_all = "lowercase")]
pub enum Network {
    #[default]
    Main,
    Test,
}

impl Network {
    /// Version byte prefixed to public keys in base58-check addresses.
    #[must_use]
    pub const fn address_version(self) -> u8 {
        match self {
            Network::Main => 0x19,
            Network::Test => 0xCD,
        }
    }

    #[must_use]
    pub const fn from_address_version(version: u8) -> Option<Network> {
        match version {
            0x19 => Some(Network::Main),
            0xCD => Some(Network::Test),
            _ => None,
        }
    }

    #[must_use]
    pub const fn default_node_url(self) -> &'static str {
        match self {
            Network::Main => MAINNET_NODE_URL,
            Network::Test => TESTNET_NODE_URL,
        }
    }

    /// Block explorer link for a transaction hash.
    #[must_use]
    pub fn explorer_url(self, txn_hash_hex: &str) -> String {
        let base = match self {
            Network::Main => MAINNET_EXPLORER_URL,
            Network::Test => TESTNET_EXPLORER_URL,
        };
        format!("{base}/txn/{txn_hash_hex}")
    }

    pub fn parse(value: &str) -> Result<Network> {
        match value.trim().to_ascii_lowercase().as_str() {
            "main" | "mainnet" => Ok(Network::Main),
            "test" | "testnet" => Ok(Network::Test),
            other => Err(Error::validation(format!(
                "invalid network `{other}`; expected one of: main|test"
            ))),
        }
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Network::parse(s)
    }
}

/// Where a transaction sits from the node's point of view.
///
/// Ordered by progress: a later observation never moves a transaction backwards.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum TransactionStatus {
    NotFound,
    InMempool,
    Committed,
}
