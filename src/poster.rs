//! One-call publishing: build, sign, submit and wait for commitment.

use crate::Result;
use crate::node::{
    ClientConfig, NodeClient, PostPolicies, RawClientConfig, SubmitPostRequest,
    SubmittedTransaction,
};

/// Entry point for callers that only want a message on chain.
///
/// Safe to share between tasks; concurrent posts are independent transactions.
#[derive(Clone, Debug)]
pub struct Poster {
    client: NodeClient,
    policies: PostPolicies,
}

impl Poster {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self::with_client(NodeClient::new(config)?, config.policies))
    }

    /// Builds a poster from `SEED_HEX`, `PUBLIC_KEY` and the `DESO_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let config = ClientConfig::from_raw(RawClientConfig::from_env()?, PostPolicies::default())?;
        Self::new(&config)
    }

    #[must_use]
    pub fn with_client(client: NodeClient, policies: PostPolicies) -> Self {
        Self { client, policies }
    }

    #[must_use]
    pub fn client(&self) -> &NodeClient {
        &self.client
    }

    /// Publishes `text` and returns once the node reports it committed.
    pub async fn post_message(&self, text: &str) -> Result<()> {
        let request = SubmitPostRequest::builder()
            .updater_public_key_base58_check(self.client.public_key_base58())
            .body(text)
            .min_fee_rate_nanos_per_kb(self.policies.min_fee_rate_nanos_per_kb)
            .build();

        self.post(&request).await.map(|_submitted| ())
    }

    /// Runs the full pipeline for an arbitrary post request.
    pub async fn post(&self, request: &SubmitPostRequest) -> Result<SubmittedTransaction> {
        #[cfg(feature = "tracing")]
        tracing::debug!(body_len = request.body.len(), "constructing submit-post transaction");

        let unsigned = self.client.submit_post(request).await?;
        let submitted = self.client.sign_and_submit(&unsigned).await?;

        #[cfg(feature = "tracing")]
        tracing::info!(
            txn_hash_hex = %submitted.txn_hash_hex,
            timeout = ?self.policies.commit.timeout,
            "waiting for commitment"
        );

        self.client
            .wait_for_commitment(&submitted.txn_hash_hex, self.policies.commit.timeout)
            .await?;

        Ok(submitted)
    }
}
