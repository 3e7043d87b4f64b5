use std::borrow::Cow;
use std::collections::BTreeMap;

use bon::Builder;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Result;
use crate::error::Error;
use crate::node::policy::DEFAULT_MIN_FEE_RATE_NANOS_PER_KB;

/// Parameters for constructing an unsigned post transaction.
///
/// ```rust,ignore
/// let request = SubmitPostRequest::builder()
///     .updater_public_key_base58_check(poster_key)
///     .body("gm")
///     .build();
/// ```
#[derive(Clone, Debug, Builder)]
pub struct SubmitPostRequest {
    #[builder(into)]
    pub updater_public_key_base58_check: String,
    #[builder(into)]
    pub body: String,
    /// Post being replied to.
    pub parent_post_hash_hex: Option<String>,
    pub reposted_post_hash_hex: Option<String>,
    pub title: Option<String>,
    #[builder(default)]
    pub image_urls: Vec<String>,
    #[builder(default)]
    pub video_urls: Vec<String>,
    /// Defaults to `{"Node": "1"}` when absent.
    pub post_extra_data: Option<BTreeMap<String, String>>,
    #[builder(default = DEFAULT_MIN_FEE_RATE_NANOS_PER_KB)]
    pub min_fee_rate_nanos_per_kb: u64,
    #[builder(default)]
    pub is_hidden: bool,
    #[builder(default)]
    pub in_tutorial: bool,
}

impl SubmitPostRequest {
    pub(crate) fn to_payload(&self) -> SubmitPostPayload<'_> {
        let post_extra_data = self.post_extra_data.as_ref().map_or_else(
            || Cow::Owned(BTreeMap::from([("Node".to_owned(), "1".to_owned())])),
            Cow::Borrowed,
        );

        SubmitPostPayload {
            updater_public_key_base58_check: &self.updater_public_key_base58_check,
            post_hash_hex_to_modify: "",
            parent_stake_id: self.parent_post_hash_hex.as_deref().unwrap_or_default(),
            reposted_post_hash_hex: self.reposted_post_hash_hex.as_deref().unwrap_or_default(),
            title: self.title.as_deref().unwrap_or_default(),
            body_obj: PostBody {
                body: &self.body,
                image_urls: &self.image_urls,
                video_urls: &self.video_urls,
            },
            post_extra_data,
            sub: "",
            is_hidden: self.is_hidden,
            min_fee_rate_nanos_per_kb: self.min_fee_rate_nanos_per_kb,
            in_tutorial: self.in_tutorial,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmitPostPayload<'a> {
    #[serde(rename = "UpdaterPublicKeyBase58Check")]
    updater_public_key_base58_check: &'a str,
    #[serde(rename = "PostHashHexToModify")]
    post_hash_hex_to_modify: &'a str,
    #[serde(rename = "ParentStakeID")]
    parent_stake_id: &'a str,
    #[serde(rename = "RepostedPostHashHex")]
    reposted_post_hash_hex: &'a str,
    #[serde(rename = "Title")]
    title: &'a str,
    #[serde(rename = "BodyObj")]
    body_obj: PostBody<'a>,
    #[serde(rename = "PostExtraData")]
    post_extra_data: Cow<'a, BTreeMap<String, String>>,
    #[serde(rename = "Sub")]
    sub: &'a str,
    #[serde(rename = "IsHidden")]
    is_hidden: bool,
    #[serde(rename = "MinFeeRateNanosPerKB")]
    min_fee_rate_nanos_per_kb: u64,
    #[serde(rename = "InTutorial")]
    in_tutorial: bool,
}

#[derive(Debug, Serialize)]
struct PostBody<'a> {
    #[serde(rename = "Body")]
    body: &'a str,
    #[serde(rename = "ImageURLs")]
    image_urls: &'a [String],
    #[serde(rename = "VideoURLs")]
    video_urls: &'a [String],
}

/// Node answer to a construction request such as `submit-post`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ConstructedTransaction {
    pub(crate) transaction_hex: String,
    #[serde(default)]
    pub(crate) inner_transaction_hexes: Option<Vec<String>>,
    #[serde(default)]
    pub(crate) fee_nanos: Option<u64>,
}

/// A transaction the node built for us, not yet signed.
///
/// The shape is fixed by the node's response: inner transactions present means atomic.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum UnsignedTransaction {
    Simple {
        transaction_hex: String,
    },
    Atomic {
        incomplete_atomic_hex: String,
        inner_hexes: Vec<String>,
    },
}

impl UnsignedTransaction {
    /// Classifies a node response; an absent or empty inner list is a simple transaction.
    #[must_use]
    pub fn from_node_parts(transaction_hex: String, inner_hexes: Option<Vec<String>>) -> Self {
        match inner_hexes {
            Some(inner_hexes) if !inner_hexes.is_empty() => UnsignedTransaction::Atomic {
                incomplete_atomic_hex: transaction_hex,
                inner_hexes,
            },
            _ => UnsignedTransaction::Simple { transaction_hex },
        }
    }

    #[must_use]
    pub fn is_atomic(&self) -> bool {
        matches!(self, UnsignedTransaction::Atomic { .. })
    }
}

impl From<ConstructedTransaction> for UnsignedTransaction {
    fn from(value: ConstructedTransaction) -> Self {
        UnsignedTransaction::from_node_parts(value.transaction_hex, value.inner_transaction_hexes)
    }
}

/// Signed inner transactions of an atomic bundle, aligned by position.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SignedAtomicTransaction {
    incomplete_atomic_hex: String,
    inner_hexes: Vec<String>,
    signature_hexes: Vec<String>,
}

impl SignedAtomicTransaction {
    pub fn new(
        incomplete_atomic_hex: String,
        inner_hexes: Vec<String>,
        signature_hexes: Vec<String>,
    ) -> Result<Self> {
        ensure_aligned(&inner_hexes, &signature_hexes)?;
        Ok(Self {
            incomplete_atomic_hex,
            inner_hexes,
            signature_hexes,
        })
    }

    #[must_use]
    pub fn incomplete_atomic_hex(&self) -> &str {
        &self.incomplete_atomic_hex
    }

    #[must_use]
    pub fn inner_hexes(&self) -> &[String] {
        &self.inner_hexes
    }

    #[must_use]
    pub fn signature_hexes(&self) -> &[String] {
        &self.signature_hexes
    }
}

pub(crate) fn ensure_aligned(inner_hexes: &[String], signature_hexes: &[String]) -> Result<()> {
    if inner_hexes.len() != signature_hexes.len() {
        return Err(Error::invariant(format!(
            "atomic transaction has {} inner transactions but {} signatures",
            inner_hexes.len(),
            signature_hexes.len()
        )));
    }
    Ok(())
}

#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SignedTransaction {
    Simple {
        transaction_hex: String,
        signature_hex: String,
    },
    Atomic(SignedAtomicTransaction),
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmitTransactionPayload<'a> {
    #[serde(rename = "UnsignedTransactionHex")]
    pub(crate) unsigned_transaction_hex: &'a str,
    #[serde(rename = "TransactionSignatureHex")]
    pub(crate) transaction_signature_hex: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmitAtomicTransactionPayload<'a> {
    #[serde(rename = "IncompleteAtomicTransactionHex")]
    pub(crate) incomplete_atomic_transaction_hex: &'a str,
    #[serde(rename = "UnsignedInnerTransactionsHex")]
    pub(crate) unsigned_inner_transactions_hex: &'a [String],
    #[serde(rename = "TransactionSignaturesHex")]
    pub(crate) transaction_signatures_hex: &'a [String],
}

/// Node acknowledgement of a submitted transaction.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SubmittedTransaction {
    #[serde(rename = "TxnHashHex")]
    pub txn_hash_hex: String,
    /// Remaining response fields, kept for callers that need them.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Which index `get-txn` should search.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub(crate) enum TxnStatusQuery {
    Committed,
    InMempool,
}

#[derive(Debug, Serialize)]
pub(crate) struct GetTxnPayload<'a> {
    #[serde(rename = "TxnHashHex")]
    pub(crate) txn_hash_hex: &'a str,
    #[serde(rename = "TxnStatus")]
    pub(crate) txn_status: TxnStatusQuery,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct GetTxnResponse {
    #[serde(rename = "TxnFound", default)]
    pub found: bool,
}
