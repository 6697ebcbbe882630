use std::io::{self, ErrorKind, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

use tracing::debug;

use super::error::ConnectError;

/// Byte stream a mail dialog runs over.
pub trait Transport: Read + Write {
    /// Closes both directions. Called once when the session ends.
    fn shutdown(&mut self) -> io::Result<()>;
}

impl Transport for TcpStream {
    fn shutdown(&mut self) -> io::Result<()> {
        TcpStream::shutdown(self, Shutdown::Both)
    }
}

/// Opens transports to a mail server.
pub trait Connector: Send + Sync {
    type Stream: Transport + Send;

    /// Tries `addrs` in order and returns the first stream that connects.
    fn connect(&self, addrs: &[SocketAddr]) -> Result<Self::Stream, ConnectError>;
}

/// Plain TCP connector. `command_timeout` bounds every read and write once
/// connected; `None` waits indefinitely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpConnector {
    pub connect_timeout: Duration,
    pub command_timeout: Option<Duration>,
}

impl TcpConnector {
    pub fn new(connect_timeout: Duration, command_timeout: Option<Duration>) -> Self {
        Self {
            connect_timeout,
            command_timeout,
        }
    }

    fn open(&self, addr: &SocketAddr) -> Result<TcpStream, ConnectError> {
        let stream = TcpStream::connect_timeout(addr, self.connect_timeout).map_err(|err| {
            match err.kind() {
                ErrorKind::TimedOut | ErrorKind::WouldBlock => ConnectError::Timeout { addr: *addr },
                _ => ConnectError::Refused {
                    addr: *addr,
                    source: err,
                },
            }
        })?;
        let configure = |source| ConnectError::Configure {
            addr: *addr,
            source,
        };
        stream
            .set_read_timeout(self.command_timeout)
            .map_err(configure)?;
        stream
            .set_write_timeout(self.command_timeout)
            .map_err(configure)?;
        Ok(stream)
    }
}

impl Default for TcpConnector {
    fn default() -> Self {
        Self::new(Duration::from_secs(2), None)
    }
}

impl Connector for TcpConnector {
    type Stream = TcpStream;

    fn connect(&self, addrs: &[SocketAddr]) -> Result<TcpStream, ConnectError> {
        let mut last_err = None;
        for addr in addrs {
            match self.open(addr) {
                Ok(stream) => {
                    debug!(%addr, "connected to SMTP server");
                    return Ok(stream);
                }
                Err(err) => {
                    debug!(%addr, error = %err, "connection attempt failed");
                    last_err = Some(err);
                }
            }
        }
        Err(last_err.unwrap_or(ConnectError::NoAddress))
    }
}
