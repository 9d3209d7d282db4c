//! Flowcap action/API correlation.
//!
//! Links recorded user actions to the backend calls they plausibly
//! triggered: each request is claimed by the earliest action it fired
//! within the trailing window of, once, in a single greedy pass. The
//! result partitions the full request set into per-action triggered calls
//! and uncorrelated background traffic.

mod engine;
mod render;

pub use engine::{correlate, DEFAULT_WINDOW_MS};
pub use render::render_timeline;
