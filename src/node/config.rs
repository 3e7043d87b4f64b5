use secrecy::SecretString;
use url::Url;

use crate::Result;
use crate::error::Error;
use crate::node::policy::PostPolicies;
use crate::types::Network;

pub const SEED_ENV_VAR: &str = "SEED_HEX";
pub const PUBLIC_KEY_ENV_VAR: &str = "PUBLIC_KEY";
pub const NETWORK_ENV_VAR: &str = "DESO_NETWORK";
pub const PASSPHRASE_ENV_VAR: &str = "DESO_PASSPHRASE";
pub const ACCOUNT_INDEX_ENV_VAR: &str = "DESO_ACCOUNT_INDEX";
pub const NODE_URL_ENV_VAR: &str = "DESO_NODE_URL";

/// Signing values as they arrive from the environment, unvalidated.
#[derive(Clone, Debug)]
pub struct RawClientConfig {
    pub seed: SecretString,
    pub passphrase: Option<SecretString>,
    pub account_index: Option<String>,
    pub network: Option<String>,
    pub public_key: Option<String>,
    pub node_url: Option<String>,
}

impl RawClientConfig {
    /// Reads `SEED_HEX` (required) and the optional `PUBLIC_KEY` / `DESO_*` variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`RawClientConfig::from_env`], with the variable source supplied by the caller.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let seed = non_empty(SEED_ENV_VAR).ok_or_else(|| {
            Error::validation(format!("environment variable {SEED_ENV_VAR} not set"))
        })?;

        Ok(Self {
            seed: SecretString::from(seed),
            passphrase: non_empty(PASSPHRASE_ENV_VAR).map(SecretString::from),
            account_index: non_empty(ACCOUNT_INDEX_ENV_VAR),
            network: non_empty(NETWORK_ENV_VAR),
            public_key: non_empty(PUBLIC_KEY_ENV_VAR),
            node_url: non_empty(NODE_URL_ENV_VAR),
        })
    }
}

/// Validated client configuration.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub node_url: Url,
    pub network: Network,
    pub seed: SecretString,
    pub passphrase: SecretString,
    pub account_index: u32,
    /// Public key posts are attributed to; the seed-derived address when absent.
    pub public_key: Option<String>,
    pub policies: PostPolicies,
}

impl ClientConfig {
    pub fn from_raw(raw: RawClientConfig, policies: PostPolicies) -> Result<Self> {
        let network = raw
            .network
            .as_deref()
            .map_or(Ok(Network::default()), Network::parse)?;
        let account_index = raw
            .account_index
            .as_deref()
            .map(|index| {
                index.trim().parse::<u32>().map_err(|e| {
                    Error::validation(format!("invalid account index `{index}`: {e}"))
                })
            })
            .transpose()?
            .unwrap_or(0);

        let mut config = Self::new(network, raw.seed, policies)?
            .with_account_index(account_index);
        if let Some(passphrase) = raw.passphrase {
            config = config.with_passphrase(passphrase);
        }
        if let Some(public_key) = raw.public_key {
            config = config.with_public_key(public_key);
        }
        if let Some(node_url) = raw.node_url {
            config = config.with_node_url(&node_url)?;
        }
        Ok(config)
    }

    /// Configuration for the network's default node, no passphrase and account 0.
    pub fn new(network: Network, seed: SecretString, policies: PostPolicies) -> Result<Self> {
        policies.validate()?;

        Ok(Self {
            node_url: parse_node_url(network.default_node_url())?,
            network,
            seed,
            passphrase: SecretString::from(String::new()),
            account_index: 0,
            public_key: None,
            policies,
        })
    }

    pub fn with_node_url(mut self, node_url: &str) -> Result<Self> {
        self.node_url = parse_node_url(node_url)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_passphrase(mut self, passphrase: SecretString) -> Self {
        self.passphrase = passphrase;
        self
    }

    #[must_use]
    pub fn with_account_index(mut self, account_index: u32) -> Self {
        self.account_index = account_index;
        self
    }

    #[must_use]
    pub fn with_public_key<S: Into<String>>(mut self, public_key: S) -> Self {
        self.public_key = Some(public_key.into());
        self
    }
}

/// Parses a node base URL so that relative endpoint joins land under its path.
fn parse_node_url(node_url: &str) -> Result<Url> {
    let mut url = Url::parse(node_url.trim())
        .map_err(|e| Error::validation(format!("invalid node url `{node_url}`: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(Error::validation(format!(
            "node url `{node_url}` cannot be used as a base"
        )));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
