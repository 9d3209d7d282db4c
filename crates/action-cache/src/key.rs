use sha2::{Digest, Sha256};
use url::Url;

/// Query parameters that vary per page load and must not vary the key.
const VOLATILE_QUERY_PARAMS: &[&str] = &["_t", "_ts", "timestamp", "nonce", "rand", "cb", "_"];

const KEY_HEX_LEN: usize = 16;

/// Canonicalize a URL for identity comparison: strip volatile query
/// parameters, then sort the survivors. Unparseable input passes through
/// unchanged. Idempotent.
pub fn canonicalize_url(raw: &str) -> String {
    let Ok(mut parsed) = Url::parse(raw) else {
        return raw.to_string();
    };

    let mut pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(name, _)| !VOLATILE_QUERY_PARAMS.contains(&name.as_ref()))
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();
    pairs.sort();

    if pairs.is_empty() {
        parsed.set_query(None);
    } else {
        parsed
            .query_pairs_mut()
            .clear()
            .extend_pairs(pairs.iter().map(|(name, value)| (name.as_str(), value.as_str())));
    }

    parsed.to_string()
}

/// Normalize a task description: whitespace-trimmed, lower-cased.
pub fn normalize_task(task: &str) -> String {
    task.trim().to_lowercase()
}

/// Compute the stable fingerprint for a `(url, task, variable keys)` triple.
///
/// Variable keys are sorted before hashing — they carry set semantics, so
/// two meaning-equivalent orderings address the same entry. Deterministic
/// and idempotent; the digest is NUL-separated to keep component boundaries
/// unambiguous.
pub fn compute_key(url: &str, task: &str, variable_keys: &[String]) -> String {
    let canonical = canonicalize_url(url);
    let normalized = normalize_task(task);
    let mut keys = variable_keys.to_vec();
    keys.sort();

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hasher.update([0u8]);
    hasher.update(normalized.as_bytes());
    for key in &keys {
        hasher.update([0u8]);
        hasher.update(key.as_bytes());
    }

    let digest = hex::encode(hasher.finalize());
    digest[..KEY_HEX_LEN].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_volatile_params_and_sorts_the_rest() {
        let canonical = canonicalize_url("https://x.com/search?q=test&_ts=1699999999&sort=desc");
        assert_eq!(canonical, "https://x.com/search?q=test&sort=desc");

        let reordered = canonicalize_url("https://x.com/search?sort=desc&q=test&nonce=abc");
        assert_eq!(reordered, canonical);
    }

    #[test]
    fn canonicalize_is_idempotent() {
        for raw in [
            "https://x.com/search?b=2&a=1&_t=99",
            "https://x.com/plain",
            "https://x.com/enc?q=hello%20world&cb=1",
            "not a url at all",
        ] {
            let once = canonicalize_url(raw);
            assert_eq!(canonicalize_url(&once), once, "for {raw}");
        }
    }

    #[test]
    fn drops_query_entirely_when_only_volatile_params_remain() {
        assert_eq!(
            canonicalize_url("https://x.com/feed?_ts=1&nonce=zz"),
            "https://x.com/feed"
        );
    }

    #[test]
    fn task_normalization_trims_and_lowercases() {
        assert_eq!(normalize_task("  Find Top Posts "), "find top posts");
    }

    #[test]
    fn key_is_stable_across_calls_and_volatile_noise() {
        let keys = vec!["limit".to_string(), "sort".to_string()];
        let first = compute_key("https://x.com/search?q=test&_ts=1699999999", "  Find Top Posts ", &keys);
        let second = compute_key("https://x.com/search?q=test&_ts=1700000000", "find top posts", &keys);
        assert_eq!(first, second);
        assert_eq!(first.len(), KEY_HEX_LEN);
    }

    #[test]
    fn variable_key_order_does_not_matter() {
        let forward = vec!["limit".to_string(), "sort".to_string()];
        let backward = vec!["sort".to_string(), "limit".to_string()];
        assert_eq!(
            compute_key("https://x.com/search", "task", &forward),
            compute_key("https://x.com/search", "task", &backward),
        );
    }

    #[test]
    fn distinct_inputs_get_distinct_keys() {
        let base = compute_key("https://x.com/search", "find posts", &[]);
        assert_ne!(base, compute_key("https://x.com/search", "find replies", &[]));
        assert_ne!(base, compute_key("https://x.com/other", "find posts", &[]));
        assert_ne!(
            base,
            compute_key("https://x.com/search", "find posts", &["limit".to_string()]),
        );
    }
}
