use flowcap_core_types::{ActionApiTimeline, ActionKind};

/// Background traffic is summarized, not dumped.
const BACKGROUND_PREVIEW_CAP: usize = 10;

/// Render the correlated timeline as a readable report.
///
/// Pure formatting over the timeline structure; one numbered line per
/// action, one `->` line per triggered call, then a capped preview of
/// background traffic.
pub fn render_timeline(timeline: &ActionApiTimeline) -> String {
    let mut lines: Vec<String> = Vec::new();

    for ca in &timeline.correlated_actions {
        let action = &ca.action;
        let heading = match action.kind {
            ActionKind::Navigate => format!("Navigate to: {}", action.url),
            ActionKind::Click => format!(
                "Click: {} (\"{}\")",
                action.selector.as_deref().unwrap_or(""),
                preview(action.description.as_deref().unwrap_or(""), 50),
            ),
            ActionKind::Type => format!(
                "Type \"{}\" into: {}",
                action.value.as_deref().unwrap_or(""),
                action.selector.as_deref().unwrap_or(""),
            ),
            ActionKind::Press => format!(
                "Press {} on: {}",
                action.key.as_deref().unwrap_or(""),
                action.selector.as_deref().unwrap_or(""),
            ),
            _ => format!(
                "{}: {}",
                action.kind,
                action
                    .description
                    .as_deref()
                    .or(action.selector.as_deref())
                    .unwrap_or(""),
            ),
        };

        lines.push(format!("{}. {}", ca.index, heading));
        for api in &ca.triggered_apis {
            lines.push(format!(
                "   -> {} {} ({}, {}ms later)",
                api.method,
                strip_query(&api.path),
                api.status,
                api.delay_ms,
            ));
        }
        if ca.triggered_apis.is_empty() {
            lines.push("   (no API calls triggered)".to_string());
        }
    }

    if !timeline.uncorrelated_apis.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "Background API calls ({} total):",
            timeline.uncorrelated_apis.len(),
        ));
        for api in timeline.uncorrelated_apis.iter().take(BACKGROUND_PREVIEW_CAP) {
            lines.push(format!(
                "  - {} {} ({})",
                api.method,
                strip_query(&api.path),
                api.status,
            ));
        }
        if timeline.uncorrelated_apis.len() > BACKGROUND_PREVIEW_CAP {
            lines.push(format!(
                "  ... and {} more",
                timeline.uncorrelated_apis.len() - BACKGROUND_PREVIEW_CAP,
            ));
        }
    }

    lines.join("\n")
}

fn strip_query(path: &str) -> &str {
    path.split('?').next().unwrap_or(path)
}

fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
