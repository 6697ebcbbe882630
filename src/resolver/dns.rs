use std::io;
use std::net::{IpAddr, ToSocketAddrs};

use tracing::debug;
use trust_dns_resolver::{
    Resolver,
    error::{ResolveError as DnsError, ResolveErrorKind},
};

use super::{MxRecord, ResolveError};

/// Resolves the mail server of `ascii_domain` to a numeric address.
///
/// The first MX answer wins, in the order the lookup returned them; the
/// preference value is not consulted. Its exchange name loses the trailing
/// root `.` and is then resolved through `hosts`.
pub(crate) fn resolve_with<M, H>(
    mx: &M,
    hosts: &H,
    ascii_domain: &str,
) -> Result<IpAddr, ResolveError>
where
    M: LookupMx,
    H: ResolveHost,
{
    let records = mx.lookup_mx(ascii_domain).map_err(ResolveError::lookup)?;

    let record = records
        .first()
        .ok_or_else(|| ResolveError::NoMailServerFound {
            domain: ascii_domain.to_string(),
        })?;

    let host = normalize_exchange(&record.exchange);
    debug!(domain = ascii_domain, exchange = %host, preference = record.preference, "MX selected");

    let addresses = hosts
        .resolve_host(&host)
        .map_err(|source| ResolveError::host_resolution(host.as_str(), source))?;

    addresses
        .into_iter()
        .next()
        .ok_or(ResolveError::NoAddress { host })
}

pub(crate) fn normalize_domain(domain: &str) -> Result<String, ResolveError> {
    let trimmed = domain.trim();
    if trimmed.is_empty() {
        return Err(ResolveError::EmptyDomain);
    }
    idna::domain_to_ascii(trimmed).map_err(ResolveError::idna)
}

pub(crate) fn normalize_exchange(exchange: &str) -> String {
    let trimmed = exchange.trim_end_matches('.');
    trimmed.to_ascii_lowercase()
}

pub(crate) trait LookupMx {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, DnsError>;
}

impl LookupMx for Resolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, DnsError> {
        let lookup = match Resolver::mx_lookup(self, domain) {
            Ok(lookup) => lookup,
            Err(err) if matches!(err.kind(), ResolveErrorKind::NoRecordsFound { .. }) => {
                return Ok(Vec::new());
            }
            Err(err) => return Err(err),
        };
        let mut records = Vec::new();
        for mx in lookup.iter() {
            records.push(MxRecord::new(mx.preference(), mx.exchange().to_utf8()));
        }
        Ok(records)
    }
}

/// Standard name resolution of a host name.
pub(crate) trait ResolveHost {
    fn resolve_host(&self, host: &str) -> io::Result<Vec<IpAddr>>;
}

pub(crate) struct SystemHosts;

impl ResolveHost for SystemHosts {
    fn resolve_host(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        Ok((host, 0u16).to_socket_addrs()?.map(|addr| addr.ip()).collect())
    }
}
