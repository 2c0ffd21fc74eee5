use std::io;

use thiserror::Error;

use super::types::AttemptStage;

/// Failures while talking to a mail exchanger. None of them is fatal: the
/// prober folds every variant into [`ProbeVerdict::Inconclusive`](super::ProbeVerdict).
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("no socket address resolved for {host}")]
    NoAddress { host: String },
    #[error("connection to {host} failed: {source}")]
    Connect {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("timed out during {stage}")]
    Timeout { stage: AttemptStage },
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("I/O error during {stage}: {source}")]
    Io {
        stage: AttemptStage,
        #[source]
        source: io::Error,
    },
}

impl ProbeError {
    pub(crate) fn connect(host: &str, source: io::Error) -> Self {
        Self::Connect {
            host: host.to_string(),
            source,
        }
    }

    /// Wraps an I/O error raised while exchanging `stage`, singling out
    /// read/write deadlines.
    pub(crate) fn io(stage: AttemptStage, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => Self::Timeout { stage },
            io::ErrorKind::InvalidData => Self::Protocol(source.to_string()),
            _ => Self::Io { stage, source },
        }
    }

    /// Whether the host could not be reached at all, as opposed to a host
    /// that answered something unhelpful.
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            Self::NoAddress { .. }
                | Self::Connect { .. }
                | Self::Timeout {
                    stage: AttemptStage::Connect
                }
        )
    }
}
