//! Client side of a single SMTP mail transaction.
//!
//! [`SmtpSession::deliver`] drives `HELO`, `MAIL FROM`, `RCPT TO`, `DATA`,
//! the message content and `QUIT` over any [`Transport`]. Each command
//! waits for one reply and the first unexpected code aborts the dialog
//! without sending `QUIT`. The transport is shut down exactly once, on
//! every exit path.

mod content;
mod error;
mod transport;
mod types;

#[cfg(test)]
pub(crate) mod mock;

pub use content::OutgoingMail;
pub use error::{ConnectError, SessionError};
pub use transport::{Connector, TcpConnector, Transport};
pub use types::{SessionState, SmtpReply, Stage};

use std::io::{BufRead, BufReader, Write};

use tracing::debug;

pub struct SmtpSession<S: Transport> {
    stream: BufReader<S>,
    state: SessionState,
    torn_down: bool,
}

impl<S: Transport> SmtpSession<S> {
    /// Wraps a freshly connected transport. The server greeting has not
    /// been read yet.
    pub fn new(stream: S) -> Self {
        Self {
            stream: BufReader::new(stream),
            state: SessionState::Disconnected,
            torn_down: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Runs the whole dialog for `mail`, then tears the session down.
    pub fn deliver(&mut self, helo: &str, mail: &OutgoingMail) -> Result<(), SessionError> {
        let result = self.run(helo, mail);
        if let Err(err) = &result {
            debug!(stage = %err.stage(), state = ?self.state, error = %err, "SMTP dialog aborted");
        }
        self.teardown();
        result
    }

    fn run(&mut self, helo: &str, mail: &OutgoingMail) -> Result<(), SessionError> {
        self.expect_reply(Stage::Greeting)?;
        self.command(Stage::Helo, &format!("HELO {helo}"))?;
        self.command(Stage::MailFrom, &format!("MAIL FROM:<{}>", mail.from()))?;
        self.command(Stage::RcptTo, &format!("RCPT TO:<{}>", mail.to()))?;
        self.command(Stage::Data, "DATA")?;
        self.write(Stage::Content, mail.data_section().as_bytes())?;
        self.command(Stage::EndOfData, ".")?;
        self.command(Stage::Quit, "QUIT")?;
        Ok(())
    }

    fn command(&mut self, stage: Stage, line: &str) -> Result<SmtpReply, SessionError> {
        self.send_line(stage, line)?;
        self.expect_reply(stage)
    }

    fn send_line(&mut self, stage: Stage, line: &str) -> Result<(), SessionError> {
        let mut data = line.as_bytes().to_vec();
        data.extend_from_slice(b"\r\n");
        self.write(stage, &data)
    }

    fn write(&mut self, stage: Stage, data: &[u8]) -> Result<(), SessionError> {
        let stream = self.stream.get_mut();
        stream
            .write_all(data)
            .and_then(|()| stream.flush())
            .map_err(|err| SessionError::io(stage, err))
    }

    fn expect_reply(&mut self, stage: Stage) -> Result<SmtpReply, SessionError> {
        let reply = self.read_reply(stage)?;
        if let Some(expected) = stage.expected_code() {
            if reply.code != expected {
                return Err(SessionError::ProtocolFailure {
                    stage,
                    code: reply.code,
                    message: reply.message,
                });
            }
        }
        self.state = stage.reached();
        debug!(%stage, code = reply.code, state = ?self.state, "SMTP reply accepted");
        Ok(reply)
    }

    /// Reads one reply, folding `NNN-` continuation lines into it.
    fn read_reply(&mut self, stage: Stage) -> Result<SmtpReply, SessionError> {
        let mut code = None;
        let mut lines = Vec::new();
        loop {
            let line = self.read_line(stage)?;
            let bytes = line.as_bytes();
            if bytes.len() < 3 || !bytes[..3].iter().all(u8::is_ascii_digit) {
                return Err(SessionError::malformed(stage, line));
            }
            let separator = bytes.get(3).copied();
            let continuation = match separator {
                None | Some(b' ') => false,
                Some(b'-') => true,
                Some(_) => return Err(SessionError::malformed(stage, line)),
            };
            let parsed = line[..3]
                .parse::<u16>()
                .map_err(|_| SessionError::malformed(stage, line.as_str()))?;
            match code {
                Some(existing) if existing != parsed => {
                    return Err(SessionError::malformed(stage, line));
                }
                _ => code = Some(parsed),
            }
            lines.push(line.get(4..).unwrap_or_default().to_string());
            if !continuation {
                break;
            }
        }
        Ok(SmtpReply {
            code: code.ok_or_else(|| SessionError::malformed(stage, ""))?,
            message: lines.join("\n"),
        })
    }

    fn read_line(&mut self, stage: Stage) -> Result<String, SessionError> {
        let mut raw = Vec::new();
        let read = self
            .stream
            .read_until(b'\n', &mut raw)
            .map_err(|err| SessionError::io(stage, err))?;
        if read == 0 {
            return Err(SessionError::io(
                stage,
                std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "connection closed while reading reply",
                ),
            ));
        }
        if raw.ends_with(b"\n") {
            raw.pop();
            if raw.ends_with(b"\r") {
                raw.pop();
            }
        }
        Ok(String::from_utf8_lossy(&raw).into_owned())
    }

    /// Shuts the transport down. Only the first call has any effect.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        if let Err(err) = Transport::shutdown(self.stream.get_mut()) {
            debug!(error = %err, "transport shutdown failed");
        }
    }
}

impl<S: Transport> Drop for SmtpSession<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}
