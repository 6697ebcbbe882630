use std::io;
use std::net::{IpAddr, SocketAddr, ToSocketAddrs};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::address::{domain_of, validate_address};
use crate::message::{Message, MessageStatus};
use crate::resolver::{DnsResolver, MailServerResolver};
use crate::session::{Connector, OutgoingMail, SmtpSession, TcpConnector};

use super::error::DeliveryError;
use super::options::DeliveryOptions;

/// Performs single delivery attempts: address checks, server resolution,
/// connection and the SMTP dialog. No retries.
pub struct Mailer<C: Connector = TcpConnector> {
    options: DeliveryOptions,
    resolver: Arc<dyn MailServerResolver>,
    connector: C,
}

impl Mailer {
    /// Mailer resolving through system DNS and connecting over TCP.
    pub fn new(options: DeliveryOptions) -> Self {
        let connector = options.connector();
        Self::with_parts(options, Arc::new(DnsResolver), connector)
    }
}

impl Default for Mailer {
    fn default() -> Self {
        Self::new(DeliveryOptions::default())
    }
}

impl<C: Connector> Mailer<C> {
    pub fn with_parts(
        options: DeliveryOptions,
        resolver: Arc<dyn MailServerResolver>,
        connector: C,
    ) -> Self {
        Self {
            options,
            resolver,
            connector,
        }
    }

    pub fn options(&self) -> &DeliveryOptions {
        &self.options
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Delivers `message` once.
    pub fn send(&self, message: &Message) -> Result<(), DeliveryError> {
        validate_address(message.to())
            .map_err(|source| DeliveryError::InvalidRecipient { source })?;
        validate_address(message.from())
            .map_err(|source| DeliveryError::InvalidSender { source })?;

        let addrs = self.server_addresses(message)?;
        let mail = OutgoingMail::compose_now(message);

        let stream = self.connector.connect(&addrs)?;
        let mut session = SmtpSession::new(stream);
        session.deliver(self.options.helo_name(), &mail)?;

        info!(to = message.to(), server = ?addrs.first(), "message delivered");
        Ok(())
    }

    /// Like [`send`](Self::send), collapsed into the status recorded for the message.
    pub fn deliver(&self, message: &Message) -> MessageStatus {
        match self.send(message) {
            Ok(()) => MessageStatus::Success,
            Err(err) => {
                warn!(to = message.to(), error = %err, "delivery failed");
                MessageStatus::failure(err.to_string())
            }
        }
    }

    fn server_addresses(&self, message: &Message) -> Result<Vec<SocketAddr>, DeliveryError> {
        let port = self.options.port;
        if let Some(server) = message.server() {
            return explicit_addresses(server, port);
        }

        let domain = domain_of(message.to()).unwrap_or_default();
        let ip = self
            .resolver
            .resolve_mail_server(domain)
            .map_err(|source| DeliveryError::resolution(domain, source))?;
        debug!(domain, %ip, "mail server resolved");
        Ok(vec![SocketAddr::new(ip, port)])
    }
}

/// Addresses of a caller supplied server: `ip`, `ip:port`, `host` or `host:port`.
fn explicit_addresses(server: &str, port: u16) -> Result<Vec<SocketAddr>, DeliveryError> {
    if let Ok(addr) = server.parse::<SocketAddr>() {
        return Ok(vec![addr]);
    }
    if let Ok(ip) = server.parse::<IpAddr>() {
        return Ok(vec![SocketAddr::new(ip, port)]);
    }

    let (host, port) = match server.rsplit_once(':') {
        Some((host, custom)) => match custom.parse::<u16>() {
            Ok(custom) => (host, custom),
            Err(_) => (server, port),
        },
        None => (server, port),
    };
    let addrs: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(|source| DeliveryError::server_lookup(server, source))?
        .collect();
    if addrs.is_empty() {
        return Err(DeliveryError::server_lookup(
            server,
            io::Error::new(io::ErrorKind::NotFound, "no address"),
        ));
    }
    Ok(addrs)
}
