use std::time::Duration;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

use crate::session::TcpConnector;

/// Controls how a [`Mailer`](crate::Mailer) talks to mail servers.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOptions {
    pub port: u16,
    /// Name announced with `HELO`.
    pub helo_domain: String,
    pub connect_timeout: Duration,
    /// Deadline for each read and write once connected. `None` never times out.
    pub command_timeout: Option<Duration>,
    /// Sender of the status notification that follows a delayed delivery.
    pub notification_sender: String,
}

impl Default for DeliveryOptions {
    fn default() -> Self {
        Self {
            port: 25,
            helo_domain: "localhost".to_string(),
            connect_timeout: Duration::from_secs(2),
            command_timeout: None,
            notification_sender: "noreply@localhost".to_string(),
        }
    }
}

impl DeliveryOptions {
    /// `HELO` argument, falling back to `localhost` when blank.
    pub fn helo_name(&self) -> &str {
        let trimmed = self.helo_domain.trim();
        if trimmed.is_empty() {
            "localhost"
        } else {
            trimmed
        }
    }

    pub fn connector(&self) -> TcpConnector {
        TcpConnector::new(self.connect_timeout, self.command_timeout)
    }
}
