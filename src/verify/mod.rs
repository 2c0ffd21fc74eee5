//! Verification orchestrator.
//!
//! [`Verifier`] runs syntax check, domain resolution and mailbox probe for
//! each address, stopping at the first failing stage, and turns the outcome
//! into a [`VerificationResult`]. Batches are processed sequentially, in input
//! order, with a random pause between two addresses.

mod observer;
mod options;
mod pacing;
mod types;

pub use observer::{TracingObserver, VerifyObserver};
pub use options::{PacingRange, VerifyConfig};
pub use pacing::{Sleep, ThreadSleep};
pub use types::{
    BatchReport, MSG_DNS_TIMEOUT, MSG_DOMAIN_NOT_FOUND, MSG_INCONCLUSIVE, MSG_INVALID_FORMAT,
    MSG_MAILBOX_MISSING, MSG_VERIFIED, Stage, VerificationResult,
};

use crate::probe::{Probe, ProbeVerdict};
use crate::resolver::{self, LookupMx};
use crate::syntax;

pub struct Verifier<'a, R, P> {
    config: &'a VerifyConfig,
    resolver: R,
    prober: P,
    observer: Box<dyn VerifyObserver + 'a>,
    sleeper: Box<dyn Sleep + 'a>,
}

impl<'a, R, P> Verifier<'a, R, P>
where
    R: LookupMx,
    P: Probe,
{
    /// Verifier logging through [`TracingObserver`] and pausing on the real
    /// clock.
    pub fn new(config: &'a VerifyConfig, resolver: R, prober: P) -> Self {
        Self {
            config,
            resolver,
            prober,
            observer: Box::new(TracingObserver),
            sleeper: Box::new(ThreadSleep),
        }
    }

    pub fn with_observer(mut self, observer: impl VerifyObserver + 'a) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn with_sleeper(mut self, sleeper: impl Sleep + 'a) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    /// Verify a single address. Never fails: every outcome, network errors
    /// included, becomes a [`VerificationResult`] with a non-empty message.
    pub fn verify_one(&self, address: &str) -> VerificationResult {
        let result = self.run_stages(address);
        self.observer.on_result(1, 1, &result);
        result
    }

    /// Verify every address in order. One result per input, no pause before
    /// the first address nor after the last.
    pub fn verify_batch<I>(&self, addresses: I) -> BatchReport
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let addresses: Vec<I::Item> = addresses.into_iter().collect();
        let total = addresses.len();
        let mut report = BatchReport::default();
        let mut rng = rand::thread_rng();

        for (i, address) in addresses.iter().enumerate() {
            if i > 0 {
                self.sleeper.sleep(self.config.pacing.sample(&mut rng));
            }
            let result = self.run_stages(address.as_ref());
            self.observer.on_result(i + 1, total, &result);
            report.push(result);
        }
        report
    }

    fn run_stages(&self, address: &str) -> VerificationResult {
        self.observer.on_stage(address, Stage::Start, "verification started");

        let domain = match syntax::split(address) {
            Some((_, domain)) if syntax::check(address) => domain,
            _ => {
                let reasons = syntax::diagnose(address).join("; ");
                self.observer.on_stage(address, Stage::Done, &reasons);
                return VerificationResult::invalid_format(address);
            }
        };
        self.observer
            .on_stage(address, Stage::SyntaxChecked, "format is valid");

        let candidates = match resolver::resolve(&self.resolver, domain) {
            Ok(candidates) => candidates,
            Err(err) => {
                self.observer
                    .on_stage(address, Stage::Done, &err.to_string());
                return if err.is_timeout() {
                    VerificationResult::dns_timeout(address)
                } else {
                    VerificationResult::domain_not_found(address)
                };
            }
        };
        let hosts: Vec<&str> = candidates.iter().map(|c| c.host.as_str()).collect();
        self.observer.on_stage(
            address,
            Stage::DomainResolved,
            &format!("mail exchangers: {}", hosts.join(", ")),
        );

        let verdict = self
            .prober
            .probe(&candidates, &self.config.probe.mail_from, address);
        self.observer
            .on_stage(address, Stage::Probed, &verdict.to_string());

        let result = match verdict {
            ProbeVerdict::Accepted => VerificationResult::verified(address),
            ProbeVerdict::Rejected(reason) => VerificationResult::mailbox_missing(address, &reason),
            ProbeVerdict::Inconclusive(reason) => {
                VerificationResult::inconclusive(address, &reason)
            }
        };
        self.observer.on_stage(address, Stage::Done, &result.message);
        result
    }
}

#[cfg(test)]
mod tests;
