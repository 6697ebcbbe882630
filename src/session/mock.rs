//! In-memory transport and connector replaying canned server replies.

use std::io::{self, Cursor, Read, Write};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use super::{ConnectError, Connector, Transport};

#[derive(Debug, Default)]
pub(crate) struct TransportLog {
    pub written: Vec<u8>,
    pub shutdowns: usize,
}

impl TransportLog {
    pub fn written_text(&self) -> String {
        String::from_utf8_lossy(&self.written).into_owned()
    }

    /// Command lines sent by the client, without the DATA content.
    pub fn commands(&self) -> Vec<String> {
        let text = self.written_text();
        let mut commands = Vec::new();
        let mut in_data = false;
        for line in text.split("\r\n") {
            if in_data {
                if line == "." {
                    in_data = false;
                    commands.push(line.to_string());
                }
                continue;
            }
            if line.is_empty() {
                continue;
            }
            if line == "DATA" {
                in_data = true;
            }
            commands.push(line.to_string());
        }
        commands
    }
}

pub(crate) type SharedLog = Arc<Mutex<TransportLog>>;

pub(crate) struct ScriptedTransport {
    input: Cursor<Vec<u8>>,
    log: SharedLog,
    fail_writes: bool,
}

impl ScriptedTransport {
    /// Transport whose reads return `replies`, each terminated by CRLF.
    pub fn new(replies: &[&str]) -> (Self, SharedLog) {
        let mut input = Vec::new();
        for reply in replies {
            input.extend_from_slice(reply.as_bytes());
            input.extend_from_slice(b"\r\n");
        }
        Self::from_bytes(input)
    }

    pub fn from_bytes(input: Vec<u8>) -> (Self, SharedLog) {
        let log = SharedLog::default();
        let transport = Self {
            input: Cursor::new(input),
            log: Arc::clone(&log),
            fail_writes: false,
        };
        (transport, log)
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }
}

impl Read for ScriptedTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.input.read(buf)
    }
}

impl Write for ScriptedTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer went away"));
        }
        self.log
            .lock()
            .expect("log lock")
            .written
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Transport for ScriptedTransport {
    fn shutdown(&mut self) -> io::Result<()> {
        self.log.lock().expect("log lock").shutdowns += 1;
        Ok(())
    }
}

/// Connector handing out one scripted transport per connection.
#[derive(Default)]
pub(crate) struct ScriptedConnector {
    replies: Vec<String>,
    refuse: bool,
    attempts: Mutex<Vec<Vec<SocketAddr>>>,
    logs: Mutex<Vec<SharedLog>>,
}

impl ScriptedConnector {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: replies.iter().map(|reply| reply.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Connector whose every attempt is refused.
    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }

    /// A server that accepts everything.
    pub fn accepting() -> Self {
        Self::new(&["220 ready", "250 hi", "250 ok", "250 ok", "354 go", "250 queued", "221 bye"])
    }

    pub fn attempts(&self) -> Vec<Vec<SocketAddr>> {
        self.attempts.lock().expect("attempts lock").clone()
    }

    pub fn logs(&self) -> Vec<SharedLog> {
        self.logs.lock().expect("logs lock").clone()
    }
}

impl Connector for ScriptedConnector {
    type Stream = ScriptedTransport;

    fn connect(&self, addrs: &[SocketAddr]) -> Result<ScriptedTransport, ConnectError> {
        self.attempts
            .lock()
            .expect("attempts lock")
            .push(addrs.to_vec());
        let addr = *addrs.first().ok_or(ConnectError::NoAddress)?;
        if self.refuse {
            return Err(ConnectError::Refused {
                addr,
                source: io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
            });
        }
        let replies: Vec<&str> = self.replies.iter().map(String::as_str).collect();
        let (transport, log) = ScriptedTransport::new(&replies);
        self.logs.lock().expect("logs lock").push(log);
        Ok(transport)
    }
}
