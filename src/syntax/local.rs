/// Valide la partie locale: 1+ caractères parmi lettres, chiffres et `._%+-`.
/// Push des raisons invalidantes dans `reasons`.
pub(crate) fn check_local(local: &str, reasons: &mut Vec<String>) {
    if local.is_empty() {
        reasons.push("local part is empty".to_string());
        return;
    }
    if !local.chars().all(is_local_char) {
        reasons.push(format!("local part '{local}' has invalid chars"));
    }
}

fn is_local_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '%' | '+' | '-')
}
