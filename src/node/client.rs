use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ORIGIN};
use reqwest::{Client as ReqwestClient, Method};
use secrecy::ExposeSecret as _;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::Result;
use crate::codec::signable_digest;
use crate::error::Error;
use crate::keys::{self, KeyPair};
use crate::node::config::ClientConfig;
use crate::node::types::{
    ConstructedTransaction, GetTxnPayload, GetTxnResponse, SignedAtomicTransaction,
    SignedTransaction, SubmitAtomicTransactionPayload, SubmitPostRequest, SubmitTransactionPayload,
    SubmittedTransaction, TxnStatusQuery, UnsignedTransaction, ensure_aligned,
};
use crate::node::waiter::{CommitmentWaiter, TxnLookup};
use crate::types::{Network, TransactionStatus};

const SUBMIT_POST: &str = "api/v0/submit-post";
const SUBMIT_TRANSACTION: &str = "api/v0/submit-transaction";
const SUBMIT_ATOMIC_TRANSACTION: &str = "api/v0/submit-atomic-transaction";
const GET_TXN: &str = "api/v0/get-txn";

/// Client for one node, holding the key pair every transaction is signed with.
///
/// Cloning is cheap and clones share the same immutable key pair, so concurrent submissions can
/// each hold their own handle.
#[derive(Clone, Debug)]
pub struct NodeClient {
    host: Url,
    keys: Arc<KeyPair>,
    public_key_base58: String,
    poll_interval: Duration,
    client: ReqwestClient,
}

impl NodeClient {
    /// Derives the key pair from `config` and prepares a client for its node.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Self::with_client(config, ReqwestClient::new())
    }

    /// Same as [`NodeClient::new`] with a caller-provided HTTP client.
    pub fn with_client(config: &ClientConfig, client: ReqwestClient) -> Result<Self> {
        let keys = keys::derive(
            config.seed.expose_secret(),
            config.passphrase.expose_secret(),
            config.account_index,
            config.network,
        )?;
        let public_key_base58 = resolve_public_key(&keys, config.public_key.as_deref())?;

        #[cfg(feature = "tracing")]
        tracing::info!(
            node_url = %config.node_url,
            network = %config.network,
            public_key = %public_key_base58,
            "node client initialized"
        );

        Ok(Self {
            host: config.node_url.clone(),
            keys: Arc::new(keys),
            public_key_base58,
            poll_interval: config.policies.commit.poll_interval,
            client,
        })
    }

    /// Builds a client around an already derived key pair.
    #[must_use]
    pub fn from_key_pair(host: Url, keys: KeyPair, client: ReqwestClient) -> Self {
        let public_key_base58 = keys.address();
        Self {
            host,
            keys: Arc::new(keys),
            public_key_base58,
            poll_interval: crate::node::policy::DEFAULT_POLL_INTERVAL,
            client,
        }
    }

    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    #[must_use]
    pub fn host(&self) -> &Url {
        &self.host
    }

    #[must_use]
    pub fn network(&self) -> Network {
        self.keys.network()
    }

    #[must_use]
    pub fn key_pair(&self) -> &KeyPair {
        &self.keys
    }

    /// Public key posts from this client are attributed to.
    #[must_use]
    pub fn public_key_base58(&self) -> &str {
        &self.public_key_base58
    }

    /// Asks the node to construct an unsigned post transaction.
    pub async fn submit_post(&self, request: &SubmitPostRequest) -> Result<UnsignedTransaction> {
        let constructed: ConstructedTransaction =
            self.post_json(SUBMIT_POST, &request.to_payload()).await?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            fee_nanos = ?constructed.fee_nanos,
            atomic = constructed.inner_transaction_hexes.as_ref().is_some_and(|inner| !inner.is_empty()),
            "node constructed post transaction"
        );

        Ok(constructed.into())
    }

    /// Submits a single signed transaction.
    pub async fn submit_transaction(
        &self,
        transaction_hex: &str,
        signature_hex: &str,
    ) -> Result<SubmittedTransaction> {
        let payload = SubmitTransactionPayload {
            unsigned_transaction_hex: transaction_hex,
            transaction_signature_hex: signature_hex,
        };
        self.post_json(SUBMIT_TRANSACTION, &payload).await
    }

    /// Submits an atomic bundle; `signature_hexes[i]` must sign `inner_hexes[i]`.
    pub async fn submit_atomic_transaction(
        &self,
        incomplete_atomic_hex: &str,
        inner_hexes: &[String],
        signature_hexes: &[String],
    ) -> Result<SubmittedTransaction> {
        ensure_aligned(inner_hexes, signature_hexes)?;

        let payload = SubmitAtomicTransactionPayload {
            incomplete_atomic_transaction_hex: incomplete_atomic_hex,
            unsigned_inner_transactions_hex: inner_hexes,
            transaction_signatures_hex: signature_hexes,
        };
        self.post_json(SUBMIT_ATOMIC_TRANSACTION, &payload).await
    }

    /// Looks a transaction up in the committed index or, with `committed_only = false`, the
    /// mempool.
    pub async fn get_transaction(
        &self,
        txn_hash_hex: &str,
        committed_only: bool,
    ) -> Result<GetTxnResponse> {
        let txn_status = if committed_only {
            TxnStatusQuery::Committed
        } else {
            TxnStatusQuery::InMempool
        };
        let payload = GetTxnPayload {
            txn_hash_hex,
            txn_status,
        };
        self.post_json(GET_TXN, &payload).await
    }

    /// Current status of a transaction.
    ///
    /// When neither index has it, the committed index is asked once more so a transaction that
    /// leaves the mempool between the two queries is not reported as missing.
    pub async fn transaction_status(&self, txn_hash_hex: &str) -> Result<TransactionStatus> {
        if self.get_transaction(txn_hash_hex, true).await?.found {
            return Ok(TransactionStatus::Committed);
        }
        if self.get_transaction(txn_hash_hex, false).await?.found {
            return Ok(TransactionStatus::InMempool);
        }
        if self.get_transaction(txn_hash_hex, true).await?.found {
            return Ok(TransactionStatus::Committed);
        }
        Ok(TransactionStatus::NotFound)
    }

    /// Signs every transaction the node asked signatures for.
    ///
    /// Any failure aborts the whole transaction; nothing partially signed is returned.
    pub fn sign(&self, unsigned: &UnsignedTransaction) -> Result<SignedTransaction> {
        match unsigned {
            UnsignedTransaction::Simple { transaction_hex } => {
                let signature = self.keys.sign(&signable_digest(transaction_hex)?)?;
                Ok(SignedTransaction::Simple {
                    transaction_hex: transaction_hex.clone(),
                    signature_hex: signature.to_hex(),
                })
            }
            UnsignedTransaction::Atomic {
                incomplete_atomic_hex,
                inner_hexes,
            } => {
                let signature_hexes = inner_hexes
                    .iter()
                    .map(|inner| {
                        let digest = signable_digest(inner)?;
                        Ok(self.keys.sign(&digest)?.to_hex())
                    })
                    .collect::<Result<Vec<_>>>()?;

                Ok(SignedTransaction::Atomic(SignedAtomicTransaction::new(
                    incomplete_atomic_hex.clone(),
                    inner_hexes.clone(),
                    signature_hexes,
                )?))
            }
        }
    }

    /// Submits a transaction signed by [`NodeClient::sign`].
    pub async fn submit_signed(&self, signed: &SignedTransaction) -> Result<SubmittedTransaction> {
        match signed {
            SignedTransaction::Simple {
                transaction_hex,
                signature_hex,
            } => self.submit_transaction(transaction_hex, signature_hex).await,
            SignedTransaction::Atomic(atomic) => {
                self.submit_atomic_transaction(
                    atomic.incomplete_atomic_hex(),
                    atomic.inner_hexes(),
                    atomic.signature_hexes(),
                )
                .await
            }
        }
    }

    /// Signs `unsigned` locally and submits it through the matching endpoint.
    pub async fn sign_and_submit(
        &self,
        unsigned: &UnsignedTransaction,
    ) -> Result<SubmittedTransaction> {
        let signed = self.sign(unsigned)?;
        let submitted = self.submit_signed(&signed).await?;

        #[cfg(feature = "tracing")]
        tracing::info!(
            txn_hash_hex = %submitted.txn_hash_hex,
            atomic = unsigned.is_atomic(),
            explorer = %self.network().explorer_url(&submitted.txn_hash_hex),
            "transaction submitted"
        );

        Ok(submitted)
    }

    /// Polls until `txn_hash_hex` commits or `timeout` elapses.
    pub async fn wait_for_commitment(&self, txn_hash_hex: &str, timeout: Duration) -> Result<()> {
        CommitmentWaiter::new(self, self.poll_interval)
            .wait_for_commitment(txn_hash_hex, timeout)
            .await
    }

    async fn post_json<P, R>(&self, path: &str, payload: &P) -> Result<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self
            .client
            .request(Method::POST, self.endpoint(path)?)
            .json(payload)
            .build()?;

        crate::request::<R>(&self.client, request, Some(self.origin_headers()?)).await
    }

    fn origin_headers(&self) -> Result<HeaderMap> {
        let origin = HeaderValue::from_str(&self.host.origin().ascii_serialization())
            .map_err(|e| Error::validation(format!("node url is not a valid origin: {e}")))?;
        let mut headers = HeaderMap::new();
        headers.insert(ORIGIN, origin);
        Ok(headers)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.host.join(path)?)
    }
}

#[async_trait]
impl TxnLookup for NodeClient {
    async fn lookup_transaction(
        &self,
        txn_hash_hex: &str,
        committed_only: bool,
    ) -> Result<GetTxnResponse> {
        self.get_transaction(txn_hash_hex, committed_only).await
    }
}

/// Picks the key posts are attributed to, refusing one that contradicts the seed.
///
/// Keys in a foreign address format cannot be checked locally and are passed through for the
/// node to judge.
fn resolve_public_key(keys: &KeyPair, configured: Option<&str>) -> Result<String> {
    let Some(configured) = configured.map(str::trim) else {
        return Ok(keys.address());
    };

    match keys::parse_address(configured) {
        Ok((network, public_key)) => {
            if network != keys.network() || &public_key != keys.public_key() {
                return Err(Error::validation(format!(
                    "configured public key {configured} does not belong to the configured seed"
                )));
            }
        }
        Err(error) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                public_key = configured,
                %error,
                "configured public key is not in a locally verifiable format"
            );
            #[cfg(not(feature = "tracing"))]
            drop(error);
        }
    }

    Ok(configured.to_owned())
}
