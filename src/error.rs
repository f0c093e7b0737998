use std::io;
use std::time::Duration;

use thiserror::Error as ThisError;

use crate::frame;

#[derive(Debug, ThisError)]
pub enum Error {
    /// A value that has no wire representation. Raised before anything is written.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),
    #[error("connection reset by peer")]
    ConnectionReset,
    /// The byte stream can no longer be trusted; the socket has to be replaced.
    #[error("protocol error; {0}")]
    Protocol(#[from] frame::Error),
    #[error("protocol error; frame exceeds the {limit} byte limit")]
    FrameTooLarge { limit: usize },
    #[error("client is closed")]
    Closed,
    #[error("could not resolve address {0}")]
    Resolve(String),
    #[error("`{command}` rejected by the server with status `{status}`{}", fmt_detail(.detail))]
    Server {
        command: String,
        status: String,
        detail: Option<String>,
    },
    #[error("unexpected response to `{command}`: {reason}")]
    BadResponse { command: String, reason: String },
    #[error("a cluster needs at least one shard")]
    NoShards,
    #[error("shard worker failed: {0}")]
    Worker(String),
    #[error("{} of {total} shards failed: {failed:?}", .failed.len())]
    PartialFailure { failed: Vec<usize>, total: usize },
}

impl Error {
    /// Whether the failure is likely to go away after reconnecting.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::Io(_)
                | Error::Timeout(_)
                | Error::ConnectionReset
                | Error::Protocol(_)
                | Error::FrameTooLarge { .. }
        )
    }

    pub(crate) fn bad_response(command: &str, reason: impl Into<String>) -> Error {
        Error::BadResponse {
            command: command.to_string(),
            reason: reason.into(),
        }
    }
}

fn fmt_detail(detail: &Option<String>) -> String {
    match detail {
        Some(detail) => format!(": {detail}"),
        None => String::new(),
    }
}
