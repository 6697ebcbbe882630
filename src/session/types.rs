use std::fmt;

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpReply {
    pub code: u16,
    pub message: String,
}

/// Step of the mail dialog. Every step except [`Stage::Content`] waits for
/// exactly one reply.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Greeting,
    Helo,
    MailFrom,
    RcptTo,
    Data,
    Content,
    EndOfData,
    Quit,
}

impl Stage {
    /// Reply code required to move past this stage.
    pub fn expected_code(self) -> Option<u16> {
        match self {
            Stage::Greeting => Some(220),
            Stage::Helo | Stage::MailFrom | Stage::RcptTo | Stage::EndOfData => Some(250),
            Stage::Data => Some(354),
            Stage::Content => None,
            Stage::Quit => Some(221),
        }
    }

    /// State entered once the stage succeeds.
    pub fn reached(self) -> SessionState {
        match self {
            Stage::Greeting => SessionState::Connected,
            Stage::Helo => SessionState::Greeted,
            Stage::MailFrom => SessionState::MailAccepted,
            Stage::RcptTo => SessionState::RecipientAccepted,
            Stage::Data | Stage::Content => SessionState::DataReady,
            Stage::EndOfData => SessionState::Completed,
            Stage::Quit => SessionState::Closed,
        }
    }

    pub(crate) fn failure_prefix(self) -> &'static str {
        match self {
            Stage::Greeting | Stage::Helo => "Connection to SMTP server unsuccessful",
            Stage::Quit => "Error disconnecting from SMTP server",
            _ => "Error sending mail",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Greeting => "greeting",
            Stage::Helo => "HELO",
            Stage::MailFrom => "MAIL FROM",
            Stage::RcptTo => "RCPT TO",
            Stage::Data => "DATA",
            Stage::Content => "message content",
            Stage::EndOfData => "end of data",
            Stage::Quit => "QUIT",
        };
        f.write_str(label)
    }
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Disconnected,
    Connected,
    Greeted,
    MailAccepted,
    RecipientAccepted,
    DataReady,
    Completed,
    Closed,
}
