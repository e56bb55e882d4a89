//! Worker identity normalization and display names.

/// Normalize an identity for comparison.
///
/// Strips a `Name <address>` wrapper down to the address, trims whitespace
/// and lowercases. Returns an empty string for blank input.
pub fn normalize(raw: &str) -> String {
    let raw = raw.trim();
    let address = match (raw.find('<'), raw.rfind('>')) {
        (Some(open), Some(close)) if close > open + 1 => &raw[open + 1..close],
        _ => raw,
    };
    address.trim().to_lowercase()
}

/// Short display name derived from an email-style identity.
///
/// `lydia.huang@example.com` becomes `Lydia H.`; an identity without a dot
/// in its local part becomes just the capitalized local part.
pub fn display_name(identity: &str) -> String {
    let local = identity.split('@').next().unwrap_or_default();
    let mut parts = local.split('.');
    let first = parts.next().filter(|s| !s.is_empty()).map(capitalize);
    let last_initial = parts
        .next()
        .and_then(|s| s.chars().next())
        .map(|c| c.to_uppercase().collect::<String>());

    match (first, last_initial) {
        (Some(first), Some(initial)) => format!("{first} {initial}."),
        (Some(first), None) => first,
        (None, _) => local.to_string(),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(head) => head.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
