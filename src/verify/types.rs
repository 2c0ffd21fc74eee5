use std::fmt;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

pub const MSG_INVALID_FORMAT: &str = "Invalid email format";
pub const MSG_DOMAIN_NOT_FOUND: &str = "Domain does not exist";
pub const MSG_DNS_TIMEOUT: &str = "DNS lookup timed out";
pub const MSG_VERIFIED: &str = "Email address verified";
pub const MSG_MAILBOX_MISSING: &str = "Mailbox does not exist: ";
pub const MSG_INCONCLUSIVE: &str = "Could not fully verify, but format and domain are valid: ";

/// Pipeline position of an address. Verification stops at the first failing
/// stage.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    SyntaxChecked,
    DomainResolved,
    Probed,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Start => "start",
            Self::SyntaxChecked => "syntax",
            Self::DomainResolved => "dns",
            Self::Probed => "smtp",
            Self::Done => "done",
        })
    }
}

/// Final verdict for one address. Built once by the verifier, never mutated.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub address: String,
    pub is_valid: bool,
    pub message: String,
}

impl VerificationResult {
    pub(crate) fn new(address: &str, is_valid: bool, message: impl Into<String>) -> Self {
        Self {
            address: address.to_string(),
            is_valid,
            message: message.into(),
        }
    }

    pub(crate) fn invalid_format(address: &str) -> Self {
        Self::new(address, false, MSG_INVALID_FORMAT)
    }

    pub(crate) fn domain_not_found(address: &str) -> Self {
        Self::new(address, false, MSG_DOMAIN_NOT_FOUND)
    }

    pub(crate) fn dns_timeout(address: &str) -> Self {
        Self::new(address, false, MSG_DNS_TIMEOUT)
    }

    pub(crate) fn verified(address: &str) -> Self {
        Self::new(address, true, MSG_VERIFIED)
    }

    pub(crate) fn mailbox_missing(address: &str, reason: &str) -> Self {
        Self::new(address, false, format!("{MSG_MAILBOX_MISSING}{reason}"))
    }

    pub(crate) fn inconclusive(address: &str, reason: &str) -> Self {
        Self::new(address, true, format!("{MSG_INCONCLUSIVE}{reason}"))
    }
}

/// Results of a batch, one per input address, in input order.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchReport {
    pub results: Vec<VerificationResult>,
}

impl BatchReport {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VerificationResult> {
        self.results.iter()
    }

    pub fn valid_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_valid).count()
    }

    /// Share of valid addresses in percent; `0.0` for an empty report.
    pub fn valid_percent(&self) -> f64 {
        if self.results.is_empty() {
            0.0
        } else {
            self.valid_count() as f64 * 100.0 / self.results.len() as f64
        }
    }

    pub(crate) fn push(&mut self, result: VerificationResult) {
        self.results.push(result);
    }
}

impl<'a> IntoIterator for &'a BatchReport {
    type Item = &'a VerificationResult;
    type IntoIter = std::slice::Iter<'a, VerificationResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}
