//! SMTP mailbox probing (third stage of the pipeline).
//!
//! [`SmtpProber`] opens a session with the preferred mail exchanger, runs
//! `EHLO`/`MAIL FROM`/`RCPT TO` and classifies the recipient reply into a
//! [`ProbeVerdict`]. No message is ever sent: the session ends with `QUIT`
//! right after `RCPT TO`.

mod error;
mod options;
mod session;
mod types;

pub use error::ProbeError;
pub use options::{DEFAULT_MAIL_FROM, ProbeOptions};
pub use types::{AttemptStage, ProbeVerdict, SmtpEvent, SmtpReply};

use std::io;
use std::net::{SocketAddr, ToSocketAddrs};

use tracing::{debug, info};

use crate::resolver::MxCandidate;
use session::SmtpSession;

/// Mailbox probe seam used by the verifier.
pub trait Probe {
    fn probe(&self, candidates: &[MxCandidate], from: &str, to: &str) -> ProbeVerdict;
}

impl<T: Probe + ?Sized> Probe for &T {
    fn probe(&self, candidates: &[MxCandidate], from: &str, to: &str) -> ProbeVerdict {
        (**self).probe(candidates, from, to)
    }
}

/// [`Probe`] speaking SMTP over plain TCP.
#[derive(Debug, Clone, Copy)]
pub struct SmtpProber<'a> {
    options: &'a ProbeOptions,
}

impl<'a> SmtpProber<'a> {
    pub fn new(options: &'a ProbeOptions) -> Self {
        Self { options }
    }
}

impl Probe for SmtpProber<'_> {
    /// Candidates are tried in order. The first host that answers at the SMTP
    /// level decides; unreachable hosts are skipped while the
    /// [`max_hosts`](ProbeOptions::max_hosts) budget lasts.
    fn probe(&self, candidates: &[MxCandidate], from: &str, to: &str) -> ProbeVerdict {
        probe_candidates(candidates, self.options.host_budget(), |candidate| {
            probe_host(candidate, from, to, self.options)
        })
    }
}

fn probe_candidates<F>(candidates: &[MxCandidate], budget: usize, mut probe_host: F) -> ProbeVerdict
where
    F: FnMut(&MxCandidate) -> Result<ProbeVerdict, ProbeError>,
{
    let mut last = ProbeVerdict::Inconclusive("no mail exchanger to probe".to_string());
    for candidate in candidates.iter().take(budget) {
        match probe_host(candidate) {
            Ok(verdict) => {
                info!(host = %candidate.host, %verdict, "probe finished");
                return verdict;
            }
            Err(err) => {
                info!(host = %candidate.host, error = %err, "probe failed");
                let unreachable = err.is_unreachable();
                last = ProbeVerdict::Inconclusive(err.to_string());
                if !unreachable {
                    break;
                }
            }
        }
    }
    last
}

fn probe_host(
    candidate: &MxCandidate,
    from: &str,
    to: &str,
    options: &ProbeOptions,
) -> Result<ProbeVerdict, ProbeError> {
    let addrs = resolve_socket_addrs(&candidate.host, options.port)
        .map_err(|err| ProbeError::connect(&candidate.host, err))?;
    let mut session = SmtpSession::connect(
        &candidate.host,
        &addrs,
        options.connect_timeout,
        options.command_timeout,
    )?;

    let verdict = run_dialogue(&mut session, from, to, options)?;
    session.quit();
    debug!(
        host = %candidate.host,
        dialogue = %session.dialogue(),
        "session closed"
    );
    Ok(verdict)
}

fn run_dialogue(
    session: &mut SmtpSession,
    from: &str,
    to: &str,
    options: &ProbeOptions,
) -> Result<ProbeVerdict, ProbeError> {
    let greeting = session.read_greeting()?;
    if !greeting.is_positive_completion() {
        return Ok(ProbeVerdict::Inconclusive(format!(
            "unexpected greeting: {greeting}"
        )));
    }

    let helo = options.helo_name();
    let ehlo = session.command(AttemptStage::Ehlo, &format!("EHLO {helo}"))?;
    if !ehlo.is_positive_completion() {
        // pre-ESMTP servers only know HELO
        let reply = if ehlo.is_permanent_failure() {
            session.command(AttemptStage::Helo, &format!("HELO {helo}"))?
        } else {
            ehlo
        };
        if !reply.is_positive_completion() {
            return Ok(ProbeVerdict::Inconclusive(format!(
                "greeting refused: {reply}"
            )));
        }
    }

    let mail_reply = session.command(AttemptStage::MailFrom, &format!("MAIL FROM:<{from}>"))?;
    if !mail_reply.is_positive_completion() {
        return Ok(ProbeVerdict::Inconclusive(format!(
            "MAIL FROM rejected: {mail_reply}"
        )));
    }

    let rcpt_reply = session.command(AttemptStage::RcptTo, &format!("RCPT TO:<{to}>"))?;
    Ok(classify_recipient(&rcpt_reply))
}

fn classify_recipient(reply: &SmtpReply) -> ProbeVerdict {
    if reply.is_positive_completion() {
        ProbeVerdict::Accepted
    } else if reply.is_permanent_failure() {
        ProbeVerdict::Rejected(reply.to_string())
    } else if reply.is_transient_failure() {
        ProbeVerdict::Inconclusive(format!("temporary failure: {reply}"))
    } else {
        ProbeVerdict::Inconclusive(format!("unexpected response: {reply}"))
    }
}

fn resolve_socket_addrs(host: &str, port: u16) -> io::Result<Vec<SocketAddr>> {
    (host, port).to_socket_addrs().map(|iter| iter.collect())
}
