use std::collections::HashSet;

use flowcap_core_types::{ApiRequestRecord, RequestTemplate};
use sha2::{Digest, Sha256};
use url::Url;

use crate::sanitize::{sanitize_headers, truncate_body, MAX_BODY_LEN};

/// How many unique templates a run keeps by default.
pub const DEFAULT_MAX_TEMPLATES: usize = 30;

const MUTATING_METHODS: &[&str] = &["POST", "PUT", "PATCH", "DELETE"];
const ID_HEX_LEN: usize = 12;

/// Stable template id over `(method, host, pathname)` — query strings and
/// fragments never vary the id.
pub fn template_id(method: &str, url: &str) -> String {
    let key = match Url::parse(url) {
        Ok(parsed) => format!("{} {}{}", method, parsed.host_str().unwrap_or(""), parsed.path()),
        Err(_) => format!("{} {}", method, url),
    };
    let digest = Sha256::digest(key.as_bytes());
    format!("rt_{}", &hex::encode(digest)[..ID_HEX_LEN])
}

fn score(request: &ApiRequestRecord) -> i32 {
    let content_type = request
        .response_content_type
        .as_deref()
        .unwrap_or("")
        .to_ascii_lowercase();
    let body = request.response_body.as_deref().unwrap_or("").trim_start();
    let json_shaped =
        content_type.contains("json") || body.starts_with('{') || body.starts_with('[');

    let mut score = 0;
    if json_shaped {
        score += 10;
    }
    if MUTATING_METHODS.contains(&request.method.as_str()) {
        score += 2;
    }
    if request.path.contains("/graphql") {
        score += 2;
    }
    score
}

/// Select, rank, deduplicate, and sanitize the requests worth persisting.
///
/// Scoring decides which requests survive the cap; within equal scores the
/// capture order is preserved. Duplicates of one endpoint collapse onto the
/// first (highest-scored) instance seen.
pub fn build_templates(
    api_requests: &[ApiRequestRecord],
    max_templates: usize,
) -> Vec<RequestTemplate> {
    let mut scored: Vec<(i32, &ApiRequestRecord)> =
        api_requests.iter().map(|r| (score(r), r)).collect();
    // Stable sort: ties keep capture order.
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    let mut templates = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for (_, request) in scored {
        if templates.len() >= max_templates {
            break;
        }
        let id = template_id(&request.method, &request.url);
        if !seen.insert(id.clone()) {
            continue;
        }
        templates.push(RequestTemplate {
            id,
            method: request.method.clone(),
            url: request.url.clone(),
            headers: sanitize_headers(&request.request_headers),
            body: truncate_body(request.request_body.as_deref(), MAX_BODY_LEN),
            content_type_hint: request.response_content_type.clone(),
        });
    }

    templates
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn request(method: &str, url: &str, path: &str) -> ApiRequestRecord {
        ApiRequestRecord {
            method: method.to_string(),
            url: url.to_string(),
            path: path.to_string(),
            domain: "api.example.com".to_string(),
            status: 200,
            request_headers: HashMap::new(),
            request_body: None,
            response_content_type: None,
            response_body: None,
            timestamp: "2024-05-01T12:00:00Z".to_string(),
        }
    }

    fn json_request(method: &str, url: &str, path: &str) -> ApiRequestRecord {
        let mut r = request(method, url, path);
        r.response_content_type = Some("application/json; charset=utf-8".to_string());
        r
    }

    #[test]
    fn template_id_ignores_query_strings() {
        let a = template_id("GET", "https://api.example.com/items?page=1");
        let b = template_id("GET", "https://api.example.com/items?page=2");
        let c = template_id("POST", "https://api.example.com/items");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("rt_"));
        assert_eq!(a.len(), 3 + 12);
    }

    #[test]
    fn json_responses_outrank_static_assets() {
        let requests = vec![
            request("GET", "https://cdn.example.com/app.css", "/app.css"),
            json_request("GET", "https://api.example.com/items", "/items"),
        ];

        let templates = build_templates(&requests, 30);

        assert_eq!(templates.len(), 2);
        assert_eq!(templates[0].url, "https://api.example.com/items");
    }

    #[test]
    fn body_shape_counts_as_json_without_content_type() {
        let mut r = request("GET", "https://api.example.com/raw", "/raw");
        r.response_body = Some("  [1, 2, 3]".to_string());
        let requests = vec![
            request("GET", "https://cdn.example.com/logo.png", "/logo.png"),
            r,
        ];

        let templates = build_templates(&requests, 30);
        assert_eq!(templates[0].url, "https://api.example.com/raw");
    }

    #[test]
    fn mutating_and_graphql_requests_get_bumped() {
        let requests = vec![
            json_request("GET", "https://api.example.com/a", "/a"),
            json_request("POST", "https://api.example.com/graphql", "/graphql"),
            json_request("DELETE", "https://api.example.com/b", "/b"),
        ];

        let templates = build_templates(&requests, 30);

        // graphql POST: 10 + 2 + 2; DELETE: 10 + 2; plain GET: 10.
        assert!(templates[0].url.ends_with("/graphql"));
        assert!(templates[1].url.ends_with("/b"));
        assert!(templates[2].url.ends_with("/a"));
    }

    #[test]
    fn duplicates_collapse_onto_first_instance() {
        let requests = vec![
            json_request("GET", "https://api.example.com/items?page=1", "/items?page=1"),
            json_request("GET", "https://api.example.com/items?page=2", "/items?page=2"),
        ];

        let templates = build_templates(&requests, 30);

        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].url, "https://api.example.com/items?page=1");
    }

    #[test]
    fn cap_keeps_only_highest_scored_unique_ids() {
        let mut requests: Vec<_> = (0..5)
            .map(|i| {
                json_request(
                    "GET",
                    &format!("https://api.example.com/json/{i}"),
                    &format!("/json/{i}"),
                )
            })
            .collect();
        requests.push(request("GET", "https://cdn.example.com/app.js", "/app.js"));

        let templates = build_templates(&requests, 3);

        assert_eq!(templates.len(), 3);
        assert!(templates.iter().all(|t| t.url.contains("/json/")));
    }

    #[test]
    fn sanitization_applies_to_kept_templates() {
        let mut r = json_request("POST", "https://api.example.com/login", "/login");
        r.request_headers
            .insert("Authorization".to_string(), "Bearer secret".to_string());
        r.request_headers
            .insert("content-type".to_string(), "application/json".to_string());
        r.request_body = Some("p".repeat(5000));

        let templates = build_templates(&[r], 30);

        let t = &templates[0];
        assert!(!t.headers.contains_key("Authorization"));
        assert!(t.headers.contains_key("content-type"));
        let body = t.body.as_deref().unwrap();
        assert!(body.ends_with("... [truncated]"));
        assert!(body.len() < 5000);
    }
}
