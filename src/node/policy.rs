use std::time::Duration;

use crate::Result;
use crate::error::Error;

pub const DEFAULT_MIN_FEE_RATE_NANOS_PER_KB: u64 = 1000;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_COMMIT_TIMEOUT: Duration = Duration::from_secs(30);

/// How long and how often to ask the node whether a transaction committed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CommitPolicy {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for CommitPolicy {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_COMMIT_TIMEOUT,
        }
    }
}

impl CommitPolicy {
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub(crate) fn validate(self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(Error::validation("commit poll interval must be non-zero"));
        }
        if self.timeout.is_zero() {
            return Err(Error::validation("commit timeout must be non-zero"));
        }
        if self.poll_interval > self.timeout {
            return Err(Error::validation(format!(
                "commit poll interval {:?} exceeds timeout {:?}",
                self.poll_interval, self.timeout
            )));
        }
        Ok(())
    }
}

/// Defaults applied to every post this client publishes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PostPolicies {
    pub min_fee_rate_nanos_per_kb: u64,
    pub commit: CommitPolicy,
}

impl Default for PostPolicies {
    fn default() -> Self {
        Self {
            min_fee_rate_nanos_per_kb: DEFAULT_MIN_FEE_RATE_NANOS_PER_KB,
            commit: CommitPolicy::default(),
        }
    }
}

impl PostPolicies {
    #[must_use]
    pub const fn with_min_fee_rate(mut self, nanos_per_kb: u64) -> Self {
        self.min_fee_rate_nanos_per_kb = nanos_per_kb;
        self
    }

    #[must_use]
    pub const fn with_commit(mut self, commit: CommitPolicy) -> Self {
        self.commit = commit;
        self
    }

    pub(crate) fn validate(self) -> Result<()> {
        if self.min_fee_rate_nanos_per_kb == 0 {
            return Err(Error::validation("min fee rate must be at least 1 nano per KB"));
        }
        self.commit.validate()
    }
}
