//! Envelope address checks.
//!
//! Only the syntax the SMTP dialog depends on is enforced: the address is
//! written verbatim into `MAIL FROM:<..>`, `RCPT TO:<..>` and the `To`/`From`
//! headers, so anything that could break those lines is rejected.

use thiserror::Error;

/// Longest local part accepted (RFC 5321 §4.5.3.1.1).
const LOCAL_MAX_LENGTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address is empty")]
    Empty,
    #[error("must contain exactly one '@'")]
    AtSign,
    #[error("local part length {0} invalid (1..=64)")]
    LocalLength(usize),
    #[error("domain is empty")]
    EmptyDomain,
    #[error("forbidden character {0:?}")]
    ForbiddenChar(char),
}

/// Checks that `addr` can be used as an envelope address.
pub fn validate_address(addr: &str) -> Result<(), AddressError> {
    if addr.is_empty() {
        return Err(AddressError::Empty);
    }
    if let Some(c) = addr.chars().find(|c| is_forbidden(*c)) {
        return Err(AddressError::ForbiddenChar(c));
    }

    let (local, domain) = split_address(addr).ok_or(AddressError::AtSign)?;

    let local_len = local.chars().count();
    if local_len == 0 || local_len > LOCAL_MAX_LENGTH {
        return Err(AddressError::LocalLength(local_len));
    }
    if domain.is_empty() {
        return Err(AddressError::EmptyDomain);
    }
    Ok(())
}

/// Domain part of `addr` (everything after the `@`), if there is one.
pub fn domain_of(addr: &str) -> Option<&str> {
    split_address(addr.trim())
        .map(|(_, domain)| domain)
        .filter(|domain| !domain.is_empty())
}

fn split_address(addr: &str) -> Option<(&str, &str)> {
    let (local, domain) = addr.split_once('@')?;
    if domain.contains('@') {
        return None;
    }
    Some((local, domain))
}

// pas d'espace ni de contrôle : l'adresse finit telle quelle sur le fil
fn is_forbidden(c: char) -> bool {
    c.is_whitespace() || c.is_control() || matches!(c, '<' | '>')
}
