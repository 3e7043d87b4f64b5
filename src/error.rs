use std::backtrace::Backtrace;
use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

use reqwest::{Method, StatusCode};

/// Broad classification of every failure the pipeline can surface.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Kind {
    /// Seed is neither 32 bytes of hex nor a valid mnemonic phrase.
    InvalidSeed,
    /// A hex seed was combined with a passphrase or a non-zero account index.
    ConflictingParameters,
    /// Transaction text from the node is not hexadecimal.
    MalformedHex,
    /// The private key or digest could not produce a signature.
    Signing,
    /// Caller broke a structural contract, e.g. mismatched signature counts.
    InvariantViolation,
    /// The node answered with a non-2xx status.
    Status,
    /// The request never produced an HTTP response.
    Transport,
    /// Commitment was not observed before the deadline.
    Timeout,
    /// Configuration values are missing or malformed.
    Validation,
    /// Unexpected payloads or URL construction failures.
    Internal,
}

#[derive(Debug)]
pub struct Error {
    kind: Kind,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    backtrace: Backtrace,
}

impl Error {
    pub fn with_source<S: StdError + Send + Sync + 'static>(kind: Kind, source: S) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
            backtrace: Backtrace::capture(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    #[must_use]
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    #[must_use]
    pub fn inner(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// Returns the typed payload of this error, e.g. [`Status`] for node rejections.
    #[must_use]
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        let e = self.source.as_deref()?;
        e.downcast_ref::<E>()
    }

    pub fn validation<S: Into<String>>(reason: S) -> Self {
        Self::message(Kind::Validation, reason)
    }

    pub fn invalid_seed<S: Into<String>>(reason: S) -> Self {
        Self::message(Kind::InvalidSeed, reason)
    }

    pub fn conflicting_parameters<S: Into<String>>(reason: S) -> Self {
        Self::message(Kind::ConflictingParameters, reason)
    }

    pub fn signing<S: Into<String>>(reason: S) -> Self {
        Self::message(Kind::Signing, reason)
    }

    pub fn invariant<S: Into<String>>(reason: S) -> Self {
        Self::message(Kind::InvariantViolation, reason)
    }

    pub fn malformed_hex(field: &str, source: hex::FromHexError) -> Self {
        Self::with_source(
            Kind::MalformedHex,
            Validation {
                reason: format!("{field} is not valid hex: {source}"),
            },
        )
    }

    pub fn status<S: Into<String>>(
        status_code: StatusCode,
        method: Method,
        path: String,
        message: S,
    ) -> Self {
        Self::with_source(
            Kind::Status,
            Status {
                status_code,
                method,
                path,
                message: message.into(),
            },
        )
    }

    #[must_use]
    pub fn timeout(txn_hash_hex: String, waited: Duration) -> Self {
        Self::with_source(
            Kind::Timeout,
            Timeout {
                txn_hash_hex,
                waited,
            },
        )
    }

    /// Whether a poll loop may retry after this error.
    ///
    /// Only failures that never reached the node, or a node-side 5xx, are worth another attempt.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self.kind {
            Kind::Transport => true,
            Kind::Status => self
                .downcast_ref::<Status>()
                .is_some_and(|status| status.status_code.is_server_error()),
            _ => false,
        }
    }

    fn message<S: Into<String>>(kind: Kind, reason: S) -> Self {
        Self::with_source(
            kind,
            Validation {
                reason: reason.into(),
            },
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(src) => write!(f, "{:?}: {}", self.kind, src),
            None => write!(f, "{:?}", self.kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

/// Non-2xx answer from the node, carrying its body verbatim.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Status {
    pub status_code: StatusCode,
    pub method: Method,
    pub path: String,
    pub message: String,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error({}) making {} call to {} with {}",
            self.status_code, self.method, self.path, self.message
        )
    }
}

impl StdError for Status {}

#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Validation {
    pub reason: String,
}

impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

impl StdError for Validation {}

#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Timeout {
    pub txn_hash_hex: String,
    pub waited: Duration,
}

impl fmt::Display for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "timed out after {:?} waiting for txn to commit: {}",
            self.waited, self.txn_hash_hex
        )
    }
}

impl StdError for Timeout {}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        // A body that arrived but does not parse is the node's fault, not the network's.
        let kind = if e.is_decode() {
            Kind::Internal
        } else {
            Kind::Transport
        };
        Error::with_source(kind, e)
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Error::with_source(Kind::Internal, e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::with_source(Kind::Internal, e)
    }
}

#[cfg(feature = "tracing")]
impl From<serde_path_to_error::Error<serde_json::Error>> for Error {
    fn from(e: serde_path_to_error::Error<serde_json::Error>) -> Self {
        Error::with_source(Kind::Internal, e)
    }
}
