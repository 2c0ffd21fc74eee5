//! Domain resolution (second stage of the pipeline).
//!
//! [`resolve`] turns a domain into an ordered list of [`MxCandidate`]s. MX
//! records come first; a domain without MX but with an address record is its
//! own single candidate. DNS access goes through [`LookupMx`], implemented
//! for the system resolver by [`DnsResolver`].

mod dns;
mod error;
mod types;

pub use dns::DnsResolver;
pub use error::ResolverError;
pub use types::{MxCandidate, MxRecord};

/// DNS queries needed by [`resolve`].
pub trait LookupMx {
    /// MX records for `domain`, in answer order. An existing name without MX
    /// records yields an empty vector; a non-existent name is an error.
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolverError>;

    /// Whether `domain` carries at least one A/AAAA record.
    fn has_address(&self, domain: &str) -> Result<bool, ResolverError>;
}

impl<T: LookupMx + ?Sized> LookupMx for &T {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolverError> {
        (**self).lookup_mx(domain)
    }

    fn has_address(&self, domain: &str) -> Result<bool, ResolverError> {
        (**self).has_address(domain)
    }
}

/// Resolve `domain` into mail exchangers sorted by ascending priority.
///
/// Ties keep the DNS answer order and exact duplicates are dropped. When the
/// domain publishes no MX, it is returned as the only candidate (priority 0)
/// provided it has an address record; otherwise
/// [`ResolverError::DomainNotFound`] is returned, as for a domain whose only
/// MX is the null record `0 .`. No retry is attempted.
pub fn resolve<L>(lookup: &L, domain: &str) -> Result<Vec<MxCandidate>, ResolverError>
where
    L: LookupMx + ?Sized,
{
    let ascii = normalize_domain(domain)?;
    let records = lookup.lookup_mx(&ascii)?;

    if records.is_empty() {
        return if lookup.has_address(&ascii)? {
            Ok(vec![MxCandidate::new(ascii, 0)])
        } else {
            Err(ResolverError::not_found(&ascii))
        };
    }

    let mut candidates: Vec<MxCandidate> = Vec::with_capacity(records.len());
    for record in records {
        let candidate = MxCandidate::from(record);
        // null MX (RFC 7505): the domain accepts no mail
        if candidate.host.is_empty() {
            continue;
        }
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }
    if candidates.is_empty() {
        return Err(ResolverError::not_found(&ascii));
    }
    // stable: ties keep answer order
    candidates.sort_by_key(|c| c.priority);
    Ok(candidates)
}

pub(crate) fn normalize_domain(domain: &str) -> Result<String, ResolverError> {
    let trimmed = domain.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        return Err(ResolverError::EmptyDomain);
    }
    idna::domain_to_ascii(trimmed).map_err(ResolverError::idna)
}

pub(crate) fn normalize_exchange(exchange: String) -> String {
    let trimmed = exchange.trim_end_matches('.');
    trimmed.to_ascii_lowercase()
}
