//! Node-facing half of the pipeline.
//!
//! - request construction of an unsigned post
//! - sign the transaction (or every inner transaction of an atomic bundle) locally
//! - submit through the simple or atomic endpoint, as the node's answer dictates
//! - poll `get-txn` until the transaction commits

mod client;
mod config;
mod policy;
mod types;
mod waiter;

pub use client::NodeClient;
pub use config::{
    ACCOUNT_INDEX_ENV_VAR, ClientConfig, NETWORK_ENV_VAR, NODE_URL_ENV_VAR, PASSPHRASE_ENV_VAR,
    PUBLIC_KEY_ENV_VAR, RawClientConfig, SEED_ENV_VAR,
};
pub use policy::{
    CommitPolicy, DEFAULT_COMMIT_TIMEOUT, DEFAULT_MIN_FEE_RATE_NANOS_PER_KB, DEFAULT_POLL_INTERVAL,
    PostPolicies,
};
pub use types::{
    GetTxnResponse, SignedAtomicTransaction, SignedTransaction, SubmitPostRequest,
    SubmittedTransaction, UnsignedTransaction,
};
pub use waiter::{Clock, CommitmentWaiter, TokioClock, TxnLookup};
