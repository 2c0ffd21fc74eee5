use std::io;
use std::time::Duration;

use trust_dns_resolver::Resolver;
use trust_dns_resolver::config::ResolverOpts;
use trust_dns_resolver::error::{ResolveError, ResolveErrorKind};
use trust_dns_resolver::proto::error::ProtoErrorKind;
use trust_dns_resolver::proto::op::ResponseCode;
use trust_dns_resolver::system_conf::read_system_conf;

use super::{LookupMx, MxRecord, ResolverError, normalize_exchange};

/// [`LookupMx`] backed by the system resolver configuration.
///
/// Each query makes a single attempt bounded by the configured timeout.
pub struct DnsResolver {
    inner: Resolver,
}

impl DnsResolver {
    pub fn from_system_conf(timeout: Duration) -> Result<Self, ResolverError> {
        let (config, mut opts) = read_system_conf().map_err(ResolverError::resolver_init)?;
        apply_timeout(&mut opts, timeout);
        let inner = Resolver::new(config, opts).map_err(ResolverError::resolver_init)?;
        Ok(Self { inner })
    }
}

fn apply_timeout(opts: &mut ResolverOpts, timeout: Duration) {
    opts.timeout = timeout;
    opts.attempts = 1;
}

impl LookupMx for DnsResolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolverError> {
        match self.inner.mx_lookup(domain) {
            Ok(lookup) => Ok(lookup
                .iter()
                .map(|mx| {
                    MxRecord::new(mx.preference(), normalize_exchange(mx.exchange().to_utf8()))
                })
                .collect()),
            Err(err) => match classify(domain, err) {
                Lookup::Empty => Ok(Vec::new()),
                Lookup::Failed(err) => Err(err),
            },
        }
    }

    fn has_address(&self, domain: &str) -> Result<bool, ResolverError> {
        match self.inner.lookup_ip(domain) {
            Ok(lookup) => Ok(lookup.iter().next().is_some()),
            Err(err) => match classify(domain, err) {
                Lookup::Empty => Ok(false),
                Lookup::Failed(err) => Err(err),
            },
        }
    }
}

#[derive(Debug)]
enum Lookup {
    /// The name exists but has no record of the requested type.
    Empty,
    Failed(ResolverError),
}

fn classify(domain: &str, err: ResolveError) -> Lookup {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. } => {
            if *response_code == ResponseCode::NXDomain {
                Lookup::Failed(ResolverError::not_found(domain))
            } else if *response_code == ResponseCode::NoError {
                Lookup::Empty
            } else {
                Lookup::Failed(ResolverError::lookup(err))
            }
        }
        ResolveErrorKind::Timeout => Lookup::Failed(ResolverError::timeout(domain)),
        ResolveErrorKind::Proto(proto) if matches!(proto.kind(), ProtoErrorKind::Timeout) => {
            Lookup::Failed(ResolverError::timeout(domain))
        }
        ResolveErrorKind::Io(io_err) if io_err.kind() == io::ErrorKind::TimedOut => {
            Lookup::Failed(ResolverError::timeout(domain))
        }
        _ => Lookup::Failed(ResolverError::lookup(err)),
    }
}
