//! Polling a node until a submitted transaction commits.
//!
//! The loop is bounded by a caller-supplied timeout measured from the first poll, and every lookup
//! races the time left before it. Transport failures and node-side 5xx answers are retried until
//! then; any other error ends the wait.
//! Dropping the future abandons the wait without touching the submitted transaction.

use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::Result;
use crate::error::Error;
use crate::node::types::GetTxnResponse;

/// Source of transaction lookups, normally a [`crate::NodeClient`].
#[async_trait]
pub trait TxnLookup: Send + Sync {
    /// Queries the committed index when `committed_only`, the mempool otherwise.
    async fn lookup_transaction(
        &self,
        txn_hash_hex: &str,
        committed_only: bool,
    ) -> Result<GetTxnResponse>;
}

#[async_trait]
impl<T: TxnLookup + ?Sized> TxnLookup for &T {
    async fn lookup_transaction(
        &self,
        txn_hash_hex: &str,
        committed_only: bool,
    ) -> Result<GetTxnResponse> {
        (**self).lookup_transaction(txn_hash_hex, committed_only).await
    }
}

/// Time source and sleep primitive for the poll loop.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    async fn sleep(&self, duration: Duration);
}

/// Wall-clock time backed by the tokio timer.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

enum Poll {
    Committed,
    Pending,
    Transient(Error),
}

#[derive(Debug)]
pub struct CommitmentWaiter<L, C = TokioClock> {
    lookup: L,
    clock: C,
    poll_interval: Duration,
}

impl<L: TxnLookup> CommitmentWaiter<L, TokioClock> {
    pub fn new(lookup: L, poll_interval: Duration) -> Self {
        Self::with_clock(lookup, TokioClock, poll_interval)
    }
}

impl<L: TxnLookup, C: Clock> CommitmentWaiter<L, C> {
    pub fn with_clock(lookup: L, clock: C, poll_interval: Duration) -> Self {
        Self {
            lookup,
            clock,
            poll_interval,
        }
    }

    /// Returns once the node reports `txn_hash_hex` committed, or [`crate::error::Kind::Timeout`]
    /// after `timeout` has elapsed without that answer.
    ///
    /// Each lookup only gets the time left before the deadline, so a stalled node cannot hold the
    /// wait past `timeout`.
    pub async fn wait_for_commitment(&self, txn_hash_hex: &str, timeout: Duration) -> Result<()> {
        let started = self.clock.now();
        let mut attempts: u32 = 0;

        loop {
            let waited = self.clock.now().saturating_duration_since(started);
            if waited >= timeout {
                return Err(timed_out(txn_hash_hex, attempts, waited));
            }
            let remaining = timeout.saturating_sub(waited);
            attempts = attempts.saturating_add(1);

            let outcome = tokio::select! {
                biased;
                outcome = self.poll(txn_hash_hex) => outcome?,
                () = self.clock.sleep(remaining) => {
                    let waited = self.clock.now().saturating_duration_since(started);
                    return Err(timed_out(txn_hash_hex, attempts, waited));
                }
            };

            match outcome {
                Poll::Committed => {
                    #[cfg(feature = "tracing")]
                    tracing::info!(txn_hash_hex, attempts, "transaction committed");
                    return Ok(());
                }
                Poll::Pending => {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(txn_hash_hex, attempts, "transaction not yet committed");
                }
                Poll::Transient(error) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(txn_hash_hex, attempts, %error, "retrying after failed poll");
                    #[cfg(not(feature = "tracing"))]
                    drop(error);
                }
            }

            let waited = self.clock.now().saturating_duration_since(started);
            let remaining = timeout.saturating_sub(waited);
            if !remaining.is_zero() {
                self.clock.sleep(self.poll_interval.min(remaining)).await;
            }
        }
    }

    async fn poll(&self, txn_hash_hex: &str) -> Result<Poll> {
        match self.lookup.lookup_transaction(txn_hash_hex, true).await {
            Ok(GetTxnResponse { found: true }) => Ok(Poll::Committed),
            Ok(GetTxnResponse { found: false }) => Ok(Poll::Pending),
            Err(error) if error.is_transient() => Ok(Poll::Transient(error)),
            Err(error) => Err(error),
        }
    }
}

fn timed_out(txn_hash_hex: &str, attempts: u32, waited: Duration) -> Error {
    #[cfg(feature = "tracing")]
    tracing::warn!(txn_hash_hex, attempts, ?waited, "gave up waiting for commitment");
    #[cfg(not(feature = "tracing"))]
    let _: u32 = attempts;
    Error::timeout(txn_hash_hex.to_owned(), waited)
}
