use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolverError {
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
    #[error("domain {domain} does not exist")]
    DomainNotFound { domain: String },
    #[error("DNS lookup for {domain} timed out")]
    Timeout { domain: String },
    #[error("DNS lookup failed: {source}")]
    Lookup {
        #[source]
        source: trust_dns_resolver::error::ResolveError,
    },
}

impl ResolverError {
    pub(crate) fn idna(source: idna::Errors) -> Self {
        Self::IdnaConversion { source }
    }

    pub(crate) fn resolver_init(source: std::io::Error) -> Self {
        Self::ResolverInit { source }
    }

    pub(crate) fn not_found(domain: &str) -> Self {
        Self::DomainNotFound {
            domain: domain.to_string(),
        }
    }

    pub(crate) fn timeout(domain: &str) -> Self {
        Self::Timeout {
            domain: domain.to_string(),
        }
    }

    pub(crate) fn lookup(source: trust_dns_resolver::error::ResolveError) -> Self {
        Self::Lookup { source }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
