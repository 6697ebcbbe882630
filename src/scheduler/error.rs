use thiserror::Error;

use crate::address::AddressError;
use crate::resolver::ResolveError;
use crate::session::{ConnectError, SessionError};

/// Why a delivery attempt failed. The display text is the status recorded
/// for the message.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Invalid TO address ({source})")]
    InvalidRecipient {
        #[source]
        source: AddressError,
    },
    #[error("Invalid FROM address ({source})")]
    InvalidSender {
        #[source]
        source: AddressError,
    },
    #[error(
        "SMTP server not entered, and could not determine SMTP server for recipient's domain ({source})"
    )]
    Resolution {
        domain: String,
        #[source]
        source: ResolveError,
    },
    #[error("Could not resolve SMTP server {server} ({source})")]
    ServerLookup {
        server: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Connect(#[from] ConnectError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl DeliveryError {
    pub(crate) fn resolution(domain: impl Into<String>, source: ResolveError) -> Self {
        Self::Resolution {
            domain: domain.into(),
            source,
        }
    }

    pub(crate) fn server_lookup(server: impl Into<String>, source: std::io::Error) -> Self {
        Self::ServerLookup {
            server: server.into(),
            source,
        }
    }

    /// `true` when the recipient domain has no mail exchanger.
    pub fn is_no_mail_server(&self) -> bool {
        matches!(self, Self::Resolution { source, .. } if source.is_no_mail_server())
    }
}
