//! Flowcap request template extraction.
//!
//! Turns raw captured API requests into a small, ranked, credential-free
//! set of templates worth persisting for replay guidance: JSON-bearing and
//! state-mutating endpoints score highest, duplicates collapse onto one
//! stable id per `(method, host, path)`, credential headers are stripped,
//! and bodies are truncated — templates describe shape, not replay bytes.
//!
//! Also extracts structural response schemas as the lossless alternative
//! to blunt body truncation.

mod builder;
mod sanitize;
pub mod schema;

pub use builder::{build_templates, template_id, DEFAULT_MAX_TEMPLATES};
pub use sanitize::{is_sensitive_header, sanitize_headers, truncate_body, MAX_BODY_LEN};
pub use schema::{extract_response_schema, render_schema, SchemaField, SchemaNode};
