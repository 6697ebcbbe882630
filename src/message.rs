use std::fmt;

use chrono::{DateTime, Local};

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

/// Subject used when a message is submitted without one.
pub const DEFAULT_SUBJECT: &str = "(No Subject)";

/// Identifier handed out by the [`MessageStore`](crate::MessageStore).
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(pub(crate) u64);

impl MessageId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Delivery state of a message. `Pending` moves to exactly one terminal value.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "with-serde", serde(tag = "state", content = "reason"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageStatus {
    Pending,
    Success,
    Failure(String),
}

impl MessageStatus {
    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure(reason.into())
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_pending()
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("Pending"),
            Self::Success => f.write_str("Success"),
            Self::Failure(reason) => f.write_str(reason),
        }
    }
}

/// An email as submitted by a caller.
///
/// `server` overrides mail exchanger resolution when set. The submission
/// time is captured at construction.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    to: String,
    from: String,
    subject: String,
    body: String,
    server: Option<String>,
    submitted_at: DateTime<Local>,
}

impl Message {
    pub fn new(
        to: impl Into<String>,
        from: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        let subject = subject.into();
        let subject = if subject.is_empty() {
            DEFAULT_SUBJECT.to_string()
        } else {
            subject
        };
        Self {
            to: to.into(),
            from: from.into(),
            subject,
            body: body.into(),
            server: None,
            submitted_at: Local::now(),
        }
    }

    /// Sets the explicit SMTP server. Blank values leave resolution enabled.
    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        let server = server.into();
        let trimmed = server.trim();
        self.server = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn server(&self) -> Option<&str> {
        self.server.as_deref()
    }

    pub fn submitted_at(&self) -> DateTime<Local> {
        self.submitted_at
    }
}
