//! Address shape checks (first stage of the pipeline).
//!
//! [`check`] is the gate used by the verifier; [`diagnose`] only explains a
//! rejection for the logs and never influences the verdict.

mod domain;
mod local;

use std::sync::LazyLock;

use regex::Regex;

use domain::check_domain;
use local::check_local;

static ADDRESS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@(?:[A-Za-z0-9-]+\.)+[A-Za-z]{2,}$")
        .expect("address pattern is a valid regex")
});

/// Returns `true` when `address` looks like `local@domain.tld`.
///
/// The local part accepts letters, digits and `._%+-`; the domain is made of
/// dot-separated labels of letters, digits and hyphens, the last one being at
/// least two letters long. Garbage input simply yields `false`.
pub fn check(address: &str) -> bool {
    ADDRESS_PATTERN.is_match(address)
}

/// Splits an address on its last `@`. Returns `None` when there is no `@`.
pub fn split(address: &str) -> Option<(&str, &str)> {
    address.rsplit_once('@')
}

/// Lists the reasons why [`check`] rejects `address`.
///
/// The returned vector is empty for addresses accepted by [`check`].
pub fn diagnose(address: &str) -> Vec<String> {
    if check(address) {
        return Vec::new();
    }

    let mut reasons = Vec::new();
    let parts: Vec<&str> = address.split('@').collect();
    if parts.len() != 2 {
        reasons.push("must contain exactly one '@'".to_string());
        return reasons;
    }
    let (local, domain) = (parts[0], parts[1]);

    check_local(local, &mut reasons);
    check_domain(domain, &mut reasons);

    if reasons.is_empty() {
        reasons.push("does not match the address pattern".to_string());
    }
    reasons
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_basic() {
        assert!(check("alice@example.com"));
        assert!(check("first.last+tag@mail.example.co.uk"));
        assert!(check("a_b%c-d@sub-domain.example.org"));
    }

    #[test]
    fn rejects_shapes() {
        assert!(!check("not-an-email"));
        assert!(!check("a@@b.com"));
        assert!(!check("@example.com"));
        assert!(!check("alice@"));
        assert!(!check("alice@localhost"));
        assert!(!check("alice@example.c"));
        assert!(!check("alice@example.c0m"));
        assert!(!check("al ice@example.com"));
        assert!(!check("alice@exa_mple.com"));
        assert!(!check(""));
    }

    #[test]
    fn split_uses_last_at() {
        assert_eq!(split("alice@example.com"), Some(("alice", "example.com")));
        assert_eq!(split("nope"), None);
    }

    #[test]
    fn diagnose_is_empty_for_valid_address() {
        assert!(diagnose("alice@example.com").is_empty());
    }

    #[test]
    fn diagnose_explains_missing_at() {
        let reasons = diagnose("not-an-email");
        assert_eq!(reasons, vec!["must contain exactly one '@'".to_string()]);
    }

    #[test]
    fn diagnose_explains_short_tld() {
        let reasons = diagnose("alice@example.c");
        assert!(reasons.iter().any(|r| r.contains("top-level")), "{reasons:?}");
    }

    proptest! {
        #[test]
        fn no_at_sign_is_rejected(s in "[^@]*") {
            prop_assert!(!check(&s));
        }

        #[test]
        fn dotless_domain_is_rejected(local in "[A-Za-z0-9._%+-]{1,16}", domain in "[^.@]{0,24}") {
            let address = format!("{local}@{domain}");
            prop_assert!(!check(&address));
        }

        #[test]
        fn check_never_panics(s in "\\PC*") {
            let _ = check(&s);
            let _ = diagnose(&s);
        }
    }
}
