#![forbid(unsafe_code)]
//! directmail_lib: direct-to-MX SMTP delivery
//!
//! Messages are submitted to a [`DeliveryScheduler`], recorded in a
//! [`MessageStore`] and delivered by a [`Mailer`] straight to the
//! recipient's mail exchanger, now or after a delay.

pub mod address;
pub mod encoding;
pub mod message;
pub mod resolver;
pub mod scheduler;
pub mod session;
pub mod store;

pub use address::{AddressError, domain_of, validate_address};
pub use encoding::{dot_stuff, encode_body, encode_header_value};
pub use message::{Message, MessageId, MessageStatus};
pub use resolver::{
    DnsResolver, MailServerResolver, MxRecord, ResolveError, resolve_mail_server,
};
pub use scheduler::{
    CANCELLED_STATUS, DeliveryError, DeliveryOptions, DeliveryScheduler, Mailer, Submission,
};
pub use session::{
    ConnectError, Connector, OutgoingMail, SessionError, SessionState, SmtpSession, Stage,
    TcpConnector, Transport,
};
pub use store::{MessageSnapshot, MessageStore, StoreError};
