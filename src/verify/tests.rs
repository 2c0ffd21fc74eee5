use std::cell::{Cell, RefCell};
use std::net::TcpListener;
use std::time::Duration;

use super::*;
use crate::probe::tests::spawn_mock_server;
use crate::probe::{ProbeOptions, SmtpProber};
use crate::resolver::tests::StubResolver;
use crate::resolver::{MxCandidate, MxRecord};

struct StubProber {
    verdict: ProbeVerdict,
    calls: Cell<usize>,
    seen: RefCell<Vec<(Vec<MxCandidate>, String, String)>>,
}

impl StubProber {
    fn answering(verdict: ProbeVerdict) -> Self {
        Self {
            verdict,
            calls: Cell::new(0),
            seen: RefCell::new(Vec::new()),
        }
    }
}

impl Probe for StubProber {
    fn probe(&self, candidates: &[MxCandidate], from: &str, to: &str) -> ProbeVerdict {
        self.calls.set(self.calls.get() + 1);
        self.seen
            .borrow_mut()
            .push((candidates.to_vec(), from.to_string(), to.to_string()));
        self.verdict.clone()
    }
}

#[derive(Default)]
struct RecordingSleep {
    delays: RefCell<Vec<Duration>>,
}

impl Sleep for RecordingSleep {
    fn sleep(&self, delay: Duration) {
        self.delays.borrow_mut().push(delay);
    }
}

#[derive(Default)]
struct RecordingObserver {
    stages: RefCell<Vec<Stage>>,
    results: RefCell<Vec<(usize, usize, bool)>>,
}

impl VerifyObserver for RecordingObserver {
    fn on_stage(&self, _address: &str, stage: Stage, _detail: &str) {
        self.stages.borrow_mut().push(stage);
    }

    fn on_result(&self, index: usize, total: usize, result: &VerificationResult) {
        self.results
            .borrow_mut()
            .push((index, total, result.is_valid));
    }
}

fn quiet_config() -> VerifyConfig {
    VerifyConfig {
        pacing: PacingRange::none(),
        ..VerifyConfig::standard()
    }
}

fn example_mx() -> StubResolver {
    StubResolver::records(vec![MxRecord::new(10, "mx.example.com")])
}

#[test]
fn malformed_address_stops_before_any_lookup() {
    let config = quiet_config();
    let resolver = example_mx();
    let prober = StubProber::answering(ProbeVerdict::Accepted);
    let verifier = Verifier::new(&config, &resolver, &prober);

    let result = verifier.verify_one("not-an-email");
    assert!(!result.is_valid);
    assert_eq!(result.message, "Invalid email format");
    assert_eq!(resolver.calls.get(), 0);
    assert_eq!(prober.calls.get(), 0);
}

#[test]
fn blank_address_is_invalid_format() {
    let config = quiet_config();
    let resolver = example_mx();
    let prober = StubProber::answering(ProbeVerdict::Accepted);
    let verifier = Verifier::new(&config, &resolver, &prober);

    assert_eq!(verifier.verify_one("").message, MSG_INVALID_FORMAT);
}

#[test]
fn missing_domain_is_reported_without_probe() {
    let config = quiet_config();
    let resolver = StubResolver::not_found();
    let prober = StubProber::answering(ProbeVerdict::Accepted);
    let verifier = Verifier::new(&config, &resolver, &prober);

    let result = verifier.verify_one("user@nonexistent-domain-xyz123.invalid");
    assert_eq!(
        result,
        VerificationResult {
            address: "user@nonexistent-domain-xyz123.invalid".to_string(),
            is_valid: false,
            message: "Domain does not exist".to_string(),
        }
    );
    assert_eq!(resolver.calls.get(), 1);
    assert_eq!(prober.calls.get(), 0);
}

#[test]
fn domain_without_mx_or_address_does_not_exist() {
    let config = quiet_config();
    let resolver = StubResolver::records(Vec::new());
    let prober = StubProber::answering(ProbeVerdict::Accepted);
    let verifier = Verifier::new(&config, &resolver, &prober);

    let result = verifier.verify_one("user@bare.example");
    assert_eq!(result.message, MSG_DOMAIN_NOT_FOUND);
    assert_eq!(prober.calls.get(), 0);
}

#[test]
fn dns_timeout_has_its_own_message() {
    let config = quiet_config();
    let resolver = StubResolver::timing_out();
    let prober = StubProber::answering(ProbeVerdict::Accepted);
    let verifier = Verifier::new(&config, &resolver, &prober);

    let result = verifier.verify_one("user@slow.example");
    assert!(!result.is_valid);
    assert_eq!(result.message, "DNS lookup timed out");
    assert_eq!(prober.calls.get(), 0);
}

#[test]
fn probe_receives_sorted_candidates_and_sender() {
    let config = quiet_config();
    let resolver = StubResolver::records(vec![
        MxRecord::new(20, "mx2.example.com"),
        MxRecord::new(10, "mx1.example.com"),
    ]);
    let prober = StubProber::answering(ProbeVerdict::Accepted);
    let verifier = Verifier::new(&config, &resolver, &prober);

    let result = verifier.verify_one("alice@example.com");
    assert!(result.is_valid);
    assert_eq!(result.message, "Email address verified");

    let seen = prober.seen.borrow();
    let (candidates, from, to) = &seen[0];
    assert_eq!(candidates[0].host, "mx1.example.com");
    assert_eq!(candidates[1].host, "mx2.example.com");
    assert_eq!(from, "verification@example.com");
    assert_eq!(to, "alice@example.com");
}

#[test]
fn rejection_and_inconclusive_messages() {
    let config = quiet_config();
    let resolver = example_mx();

    let rejecting = StubProber::answering(ProbeVerdict::Rejected(
        "550 5.1.1 User unknown".to_string(),
    ));
    let result = Verifier::new(&config, &resolver, &rejecting).verify_one("ghost@example.com");
    assert!(!result.is_valid);
    assert_eq!(result.message, "Mailbox does not exist: 550 5.1.1 User unknown");

    let unsure = StubProber::answering(ProbeVerdict::Inconclusive(
        "temporary failure: 451 try later".to_string(),
    ));
    let result = Verifier::new(&config, &resolver, &unsure).verify_one("maybe@example.com");
    assert!(result.is_valid);
    assert_eq!(
        result.message,
        "Could not fully verify, but format and domain are valid: temporary failure: 451 try later"
    );
}

#[test]
fn verification_is_repeatable() {
    let config = quiet_config();
    let resolver = example_mx();
    let prober = StubProber::answering(ProbeVerdict::Rejected("550 nope".to_string()));
    let verifier = Verifier::new(&config, &resolver, &prober);

    let first = verifier.verify_one("bob@example.com");
    let second = verifier.verify_one("bob@example.com");
    assert_eq!(first, second);
}

#[test]
fn stages_are_reported_in_order() {
    let config = quiet_config();
    let resolver = example_mx();
    let prober = StubProber::answering(ProbeVerdict::Accepted);
    let observer = RecordingObserver::default();
    let verifier = Verifier::new(&config, &resolver, &prober).with_observer(&observer);

    verifier.verify_one("alice@example.com");
    assert_eq!(
        *observer.stages.borrow(),
        vec![
            Stage::Start,
            Stage::SyntaxChecked,
            Stage::DomainResolved,
            Stage::Probed,
            Stage::Done,
        ]
    );
    assert_eq!(*observer.results.borrow(), vec![(1, 1, true)]);
}

#[test]
fn batch_keeps_input_order_and_never_aborts() {
    let config = quiet_config();
    let resolver = StubResolver::new(|domain| match domain {
        "example.com" => Ok(vec![MxRecord::new(10, "mx.example.com")]),
        other => Err(crate::resolver::ResolverError::not_found(other)),
    });
    let prober = StubProber::answering(ProbeVerdict::Accepted);
    let sleeper = RecordingSleep::default();
    let verifier = Verifier::new(&config, &resolver, &prober).with_sleeper(&sleeper);

    let input = ["a@example.com", "broken", "b@missing.example", "c@example.com"];
    let report = verifier.verify_batch(input);

    let addresses: Vec<&str> = report.iter().map(|r| r.address.as_str()).collect();
    assert_eq!(addresses, input);
    let messages: Vec<&str> = report.iter().map(|r| r.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            MSG_VERIFIED,
            MSG_INVALID_FORMAT,
            MSG_DOMAIN_NOT_FOUND,
            MSG_VERIFIED
        ]
    );
    assert_eq!(report.valid_count(), 2);
    assert_eq!(prober.calls.get(), 2);
}

#[test]
fn batch_pauses_between_addresses_only() {
    let config = VerifyConfig {
        pacing: PacingRange::new(Duration::from_millis(1000), Duration::from_millis(5000)),
        ..VerifyConfig::standard()
    };
    let resolver = example_mx();
    let prober = StubProber::answering(ProbeVerdict::Accepted);
    let sleeper = RecordingSleep::default();
    let observer = RecordingObserver::default();
    let verifier = Verifier::new(&config, &resolver, &prober)
        .with_sleeper(&sleeper)
        .with_observer(&observer);

    let report = verifier.verify_batch(vec![
        "a@example.com".to_string(),
        "b@example.com".to_string(),
        "c@example.com".to_string(),
        "d@example.com".to_string(),
    ]);
    assert_eq!(report.len(), 4);

    let delays = sleeper.delays.borrow();
    assert_eq!(delays.len(), 3);
    for delay in delays.iter() {
        assert!(
            *delay >= Duration::from_secs(1) && *delay <= Duration::from_secs(5),
            "{delay:?}"
        );
    }

    let progress: Vec<(usize, usize)> = observer
        .results
        .borrow()
        .iter()
        .map(|(i, n, _)| (*i, *n))
        .collect();
    assert_eq!(progress, vec![(1, 4), (2, 4), (3, 4), (4, 4)]);
}

#[test]
fn single_address_batch_never_sleeps() {
    let config = VerifyConfig::standard();
    let resolver = example_mx();
    let prober = StubProber::answering(ProbeVerdict::Accepted);
    let sleeper = RecordingSleep::default();
    let verifier = Verifier::new(&config, &resolver, &prober).with_sleeper(&sleeper);

    verifier.verify_batch(["a@example.com"]);
    assert!(sleeper.delays.borrow().is_empty());
}

#[test]
fn empty_batch_yields_empty_report() {
    let config = VerifyConfig::standard();
    let resolver = example_mx();
    let prober = StubProber::answering(ProbeVerdict::Accepted);
    let sleeper = RecordingSleep::default();
    let verifier = Verifier::new(&config, &resolver, &prober).with_sleeper(&sleeper);

    let report = verifier.verify_batch(Vec::<String>::new());
    assert!(report.is_empty());
    assert!(sleeper.delays.borrow().is_empty());
    assert_eq!(resolver.calls.get(), 0);
}

fn loopback_resolver() -> StubResolver {
    StubResolver::records(vec![MxRecord::new(10, "127.0.0.1")])
}

fn loopback_config(port: u16) -> VerifyConfig {
    VerifyConfig {
        probe: ProbeOptions {
            port,
            connect_timeout: Duration::from_secs(2),
            command_timeout: Duration::from_secs(2),
            ..ProbeOptions::default()
        },
        ..quiet_config()
    }
}

#[test]
fn smtp_acceptance_verifies_address() {
    let (port, handle) = spawn_mock_server(
        "220 mock.smtp.test ESMTP\r\n",
        vec![
            ("EHLO", "250 mock.smtp.test\r\n"),
            ("MAIL FROM:<verification@example.com>", "250 Ok\r\n"),
            ("RCPT TO:<alice@example.com>", "250 Ok\r\n"),
            ("QUIT", "221 Bye\r\n"),
        ],
    );
    let config = loopback_config(port);
    let resolver = loopback_resolver();
    let verifier = Verifier::new(&config, &resolver, SmtpProber::new(&config.probe));

    let result = verifier.verify_one("alice@example.com");
    assert_eq!(result.message, "Email address verified");
    assert!(result.is_valid);
    handle.join().expect("server thread");
}

#[test]
fn smtp_rejection_marks_mailbox_missing() {
    let (port, handle) = spawn_mock_server(
        "220 mock.smtp.test ESMTP\r\n",
        vec![
            ("EHLO", "250 mock.smtp.test\r\n"),
            ("MAIL FROM:", "250 Ok\r\n"),
            ("RCPT TO:", "550 User unknown\r\n"),
            ("QUIT", "221 Bye\r\n"),
        ],
    );
    let config = loopback_config(port);
    let resolver = loopback_resolver();
    let verifier = Verifier::new(&config, &resolver, SmtpProber::new(&config.probe));

    let result = verifier.verify_one("ghost@example.com");
    assert!(!result.is_valid);
    assert_eq!(result.message, "Mailbox does not exist: 550 User unknown");
    handle.join().expect("server thread");
}

#[test]
fn refused_connection_still_counts_as_valid() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let config = loopback_config(port);
    let resolver = loopback_resolver();
    let verifier = Verifier::new(&config, &resolver, SmtpProber::new(&config.probe));

    let result = verifier.verify_one("alice@example.com");
    assert!(result.is_valid);
    assert!(
        result.message.starts_with(MSG_INCONCLUSIVE),
        "{}",
        result.message
    );
}
