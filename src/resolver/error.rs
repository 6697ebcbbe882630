use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("domain is empty")]
    EmptyDomain,
    #[error("domain IDNA conversion failed")]
    IdnaConversion {
        #[source]
        source: idna::Errors,
    },
    #[error("resolver initialization failed: {source}")]
    ResolverInit {
        #[source]
        source: std::io::Error,
    },
    #[error("no mail server found for {domain}")]
    NoMailServerFound { domain: String },
    #[error("MX lookup failed: {source}")]
    Lookup {
        #[source]
        source: trust_dns_resolver::error::ResolveError,
    },
    #[error("could not resolve mail server {host}: {source}")]
    HostResolution {
        host: String,
        #[source]
        source: std::io::Error,
    },
    #[error("mail server {host} has no address")]
    NoAddress { host: String },
}

impl ResolveError {
    pub(crate) fn idna(source: idna::Errors) -> Self {
        Self::IdnaConversion { source }
    }

    pub(crate) fn resolver_init(source: std::io::Error) -> Self {
        Self::ResolverInit { source }
    }

    pub(crate) fn lookup(source: trust_dns_resolver::error::ResolveError) -> Self {
        Self::Lookup { source }
    }

    pub(crate) fn host_resolution(host: impl Into<String>, source: std::io::Error) -> Self {
        Self::HostResolution {
            host: host.into(),
            source,
        }
    }

    /// `true` for failures meaning the domain has no mail exchanger at all.
    pub fn is_no_mail_server(&self) -> bool {
        matches!(self, Self::NoMailServerFound { .. })
    }
}
