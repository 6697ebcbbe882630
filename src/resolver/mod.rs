//! Mail exchanger resolution.
//!
//! The public entry point is [`resolve_mail_server`], which performs a
//! synchronous MX lookup with the system resolver and resolves the selected
//! exchange to a numeric address. Delivery code goes through the
//! [`MailServerResolver`] trait so the lookup can be replaced.

mod dns;
mod error;
mod types;

pub use error::ResolveError;
pub use types::MxRecord;

use std::net::IpAddr;

use trust_dns_resolver::Resolver;

use dns::{SystemHosts, normalize_domain, resolve_with};

/// Lookup the mail server of `domain` using the system resolver.
///
/// The domain is normalized via IDNA before querying DNS.
pub fn resolve_mail_server(domain: &str) -> Result<IpAddr, ResolveError> {
    DnsResolver.resolve_mail_server(domain)
}

/// Finds the address of the mail server accepting mail for a domain.
pub trait MailServerResolver: Send + Sync {
    fn resolve_mail_server(&self, domain: &str) -> Result<IpAddr, ResolveError>;
}

/// [`MailServerResolver`] backed by the system DNS configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct DnsResolver;

impl MailServerResolver for DnsResolver {
    fn resolve_mail_server(&self, domain: &str) -> Result<IpAddr, ResolveError> {
        let ascii = normalize_domain(domain)?;
        let resolver = Resolver::from_system_conf().map_err(ResolveError::resolver_init)?;
        resolve_with(&resolver, &SystemHosts, &ascii)
    }
}

impl<F> MailServerResolver for F
where
    F: Fn(&str) -> Result<IpAddr, ResolveError> + Send + Sync,
{
    fn resolve_mail_server(&self, domain: &str) -> Result<IpAddr, ResolveError> {
        self(domain)
    }
}
