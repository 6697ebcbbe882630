//! Wire-safe text transforms.
//!
//! Everything sent after `DATA` goes through one of these: header values
//! become RFC 2047 encoded words, the body is dot-stuffed and then
//! quoted-printable encoded. Both transforms declare [`CHARSET`], so
//! non-ASCII characters are escaped as their ISO-8859-15 byte.

mod body;
mod charset;
mod header;
mod stuffing;

pub use body::encode_body;
pub use header::encode_header_value;
pub use stuffing::dot_stuff;

/// Character set tag used by the encoded words and the `Content-Type` header.
pub const CHARSET: &str = "ISO-8859-15";

#[cfg(test)]
mod tests;
