use std::fmt;

use chrono::{DateTime, Local, TimeZone};

use crate::encoding::{CHARSET, dot_stuff, encode_body, encode_header_value};
use crate::message::Message;

/// Envelope, header lines and wire body of one message, ready for `DATA`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    from: String,
    to: String,
    headers: Vec<String>,
    body: String,
}

impl OutgoingMail {
    /// Composes `message` dated now, in local time.
    pub fn compose_now(message: &Message) -> Self {
        Self::compose(message, &Local::now())
    }

    pub fn compose<Tz>(message: &Message, date: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let headers = vec![
            format!("Subject: {}", encode_header_value(message.subject())),
            format!("Date: {}", date.to_rfc2822()),
            format!("To: {}", message.to()),
            format!("From: {}", message.from()),
            "MIME-Version: 1.0".to_string(),
            format!("Content-Type: text/plain; charset={CHARSET}"),
            "Content-Transfer-Encoding: quoted-printable".to_string(),
        ];
        let body = encode_body(&dot_stuff(message.body()));
        Self {
            from: message.from().to_string(),
            to: message.to().to_string(),
            headers,
            body,
        }
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Everything written between the `354` reply and the terminating `.`:
    /// header lines, blank line, body and its closing CRLF.
    pub fn data_section(&self) -> String {
        let mut out = String::with_capacity(self.body.len() + 256);
        for header in &self.headers {
            out.push_str(header);
            out.push_str("\r\n");
        }
        out.push_str("\r\n");
        out.push_str(&self.body);
        out.push_str("\r\n");
        out
    }
}
