use std::collections::{BTreeMap, HashMap};

/// Header name prefixes that carry credentials. A header whose lower-cased
/// name equals or starts with any of these never survives into a template.
const SENSITIVE_HEADER_PREFIXES: &[&str] = &[
    "authorization",
    "cookie",
    "x-api-key",
    "api-key",
    "apikey",
    "x-auth",
    "x-token",
    "x-csrf",
    "csrf",
    "xsrf",
];

/// Values longer than this are dropped outright; anything that size is a
/// session blob or an opaque token, not a shape-relevant header.
const MAX_HEADER_VALUE_LEN: usize = 200;

/// Bodies are capped at this many characters before persistence.
pub const MAX_BODY_LEN: usize = 4000;

const TRUNCATION_MARKER: &str = "\n... [truncated]";

/// Protocol pseudo-headers (`:authority` etc.) and credential-carrying
/// headers must never be persisted.
pub fn is_sensitive_header(name: &str) -> bool {
    let lowered = name.to_ascii_lowercase();
    if lowered.starts_with(':') {
        return true;
    }
    SENSITIVE_HEADER_PREFIXES
        .iter()
        .any(|prefix| lowered.starts_with(prefix))
}

/// Keep only non-sensitive, reasonably-sized headers, in a stable order.
pub fn sanitize_headers(headers: &HashMap<String, String>) -> BTreeMap<String, String> {
    headers
        .iter()
        .filter(|(name, value)| !is_sensitive_header(name) && value.len() <= MAX_HEADER_VALUE_LEN)
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

/// Cap a body at `max_chars`, appending a marker when cut. Lossy one-way
/// transform by design.
pub fn truncate_body(body: Option<&str>, max_chars: usize) -> Option<String> {
    let body = body?;
    if body.chars().count() <= max_chars {
        return Some(body.to_string());
    }
    let mut truncated: String = body.chars().take(max_chars).collect();
    truncated.push_str(TRUNCATION_MARKER);
    Some(truncated)
}
