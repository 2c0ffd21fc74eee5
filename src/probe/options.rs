use std::borrow::Cow;
use std::time::Duration;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

/// Address used in `MAIL FROM` when nothing else is configured. It lives in a
/// reserved domain so probes never impersonate a real sender.
pub const DEFAULT_MAIL_FROM: &str = "verification@example.com";

/// Controls how [`SmtpProber`](crate::probe::SmtpProber) interrogates
/// mail exchangers.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOptions {
    pub port: u16,
    pub helo_domain: Option<String>,
    pub mail_from: String,
    pub connect_timeout: Duration,
    pub command_timeout: Duration,
    /// How many candidates may be tried. Only unreachable hosts make the
    /// prober move on to the next one.
    pub max_hosts: usize,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            port: 25,
            helo_domain: None,
            mail_from: DEFAULT_MAIL_FROM.to_string(),
            connect_timeout: Duration::from_secs(10),
            command_timeout: Duration::from_secs(10),
            max_hosts: 1,
        }
    }
}

impl ProbeOptions {
    /// Returns the hostname used in `EHLO`/`HELO`. Defaults to the domain of
    /// the envelope sender, then to `localhost`.
    pub fn helo_name(&self) -> Cow<'_, str> {
        if let Some(helo) = self.helo_domain.as_deref().filter(|h| !h.trim().is_empty()) {
            return Cow::Borrowed(helo);
        }
        match self.mail_from.rsplit_once('@') {
            Some((_, domain)) if !domain.is_empty() => Cow::Borrowed(domain),
            _ => Cow::Borrowed("localhost"),
        }
    }

    pub(crate) fn host_budget(&self) -> usize {
        self.max_hosts.max(1)
    }
}
