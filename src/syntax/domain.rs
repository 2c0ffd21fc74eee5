/// Valide le domaine: labels séparés par des points, TLD alphabétique >= 2.
/// Push des raisons invalidantes dans `reasons`.
pub(crate) fn check_domain(domain: &str, reasons: &mut Vec<String>) {
    if domain.is_empty() {
        reasons.push("domain is empty".to_string());
        return;
    }

    // au moins un point
    if !domain.contains('.') {
        reasons.push("domain must contain at least one dot".to_string());
    }

    let labels: Vec<&str> = domain.split('.').collect();
    for label in &labels {
        if label.is_empty() {
            reasons.push("empty domain label".to_string());
            continue;
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            reasons.push(format!("domain label '{}' has invalid chars", label));
        }
    }

    if labels.len() > 1 {
        if let Some(tld) = labels.last() {
            if tld.len() < 2 || !tld.chars().all(|c| c.is_ascii_alphabetic()) {
                reasons.push(format!(
                    "top-level label '{}' must be at least two letters",
                    tld
                ));
            }
        }
    }
}
