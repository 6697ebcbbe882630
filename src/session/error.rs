use std::io;
use std::net::SocketAddr;

use thiserror::Error;

use super::types::Stage;

/// Failure of an established mail dialog. The session has been torn down
/// by the time one of these is returned.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{prefix} at {stage} (Error {code})", prefix = .stage.failure_prefix())]
    ProtocolFailure {
        stage: Stage,
        code: u16,
        message: String,
    },
    #[error("{prefix} at {stage} ({source})", prefix = .stage.failure_prefix())]
    Io {
        stage: Stage,
        #[source]
        source: io::Error,
    },
    #[error("{prefix} at {stage} (malformed reply {line:?})", prefix = .stage.failure_prefix())]
    MalformedReply { stage: Stage, line: String },
}

impl SessionError {
    pub(crate) fn io(stage: Stage, source: io::Error) -> Self {
        Self::Io { stage, source }
    }

    pub(crate) fn malformed(stage: Stage, line: impl Into<String>) -> Self {
        Self::MalformedReply {
            stage,
            line: line.into(),
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            Self::ProtocolFailure { stage, .. }
            | Self::Io { stage, .. }
            | Self::MalformedReply { stage, .. } => *stage,
        }
    }

    /// Reply code that caused the abort, if the server answered at all.
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::ProtocolFailure { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Failure to open the transport.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("Connection to SMTP server timed out")]
    Timeout { addr: SocketAddr },
    #[error("Connection to SMTP server unsuccessful ({source})")]
    Refused {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("Connection to SMTP server unsuccessful (socket setup failed: {source})")]
    Configure {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("Connection to SMTP server unsuccessful (no address to connect to)")]
    NoAddress,
}

impl ConnectError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
