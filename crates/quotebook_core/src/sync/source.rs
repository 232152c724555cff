//! Remote source contract.

use crate::model::quote::{Quote, QuoteCollection};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Remote source could not be used for this cycle.
///
/// Every variant is non-fatal; callers skip the cycle and wait for the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Connection, DNS, TLS or timeout failure.
    Transport { endpoint: String, reason: String },
    /// Remote answered with a non-success status.
    Status { endpoint: String, status: u16 },
    /// Response body was not a usable JSON array.
    Payload { endpoint: String, reason: String },
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport { endpoint, reason } => {
                write!(f, "remote unavailable ({endpoint}): {reason}")
            }
            Self::Status { endpoint, status } => {
                write!(f, "remote unavailable ({endpoint}): HTTP {status}")
            }
            Self::Payload { endpoint, reason } => {
                write!(f, "remote returned unusable data ({endpoint}): {reason}")
            }
        }
    }
}

impl Error for RemoteError {}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Remote collection provider.
pub trait QuoteSource {
    /// Short identifier used in log events.
    fn source_id(&self) -> &str;

    /// Fetches the remote collection already mapped into quotes.
    fn fetch(&self) -> RemoteResult<QuoteCollection>;

    /// Sends one quote to the remote; response content is ignored.
    fn push(&self, quote: &Quote) -> RemoteResult<()>;
}
