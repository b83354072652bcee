//! Fragment extraction: locate the first complete JSON object embedded in
//! arbitrary prose.
//!
//! Uses a string-aware balanced-delimiter scan anchored at each `{` in
//! document order, not a greedy regex — prose can contain stray closing
//! braces, and a single regex can straddle two fragments. Markdown code
//! fences are unwrapped first so fenced payloads scan in place.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static RE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*\n?(.*?)```").unwrap());

/// Unwrap fenced code blocks, keeping their contents in document position.
fn strip_code_fences(text: &str) -> String {
    RE_FENCE.replace_all(text, "$1").into_owned()
}

/// Return the balanced `{...}` slice starting at `start`, or `None` when the
/// text ends before the brace closes. Braces inside JSON strings are ignored.
fn balanced_slice(text: &str, start: usize) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (rel, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + rel + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Extract the first syntactically complete JSON object from free text, in
/// document order. Directive payloads are objects, so only `{` anchors are
/// considered. Returns `None` when no complete fragment exists — the
/// integrator maps that to a retryable format error.
pub fn extract_fragment(text: &str) -> Option<Value> {
    let text = strip_code_fences(text);

    let mut search_from = 0;
    while let Some(rel) = text[search_from..].find('{') {
        let anchor = search_from + rel;
        if let Some(slice) = balanced_slice(&text, anchor) {
            if let Ok(value) = serde_json::from_str::<Value>(slice) {
                tracing::debug!("Extracted JSON fragment at offset {}", anchor);
                return Some(value);
            }
        }
        // Balanced but unparseable (or unterminated): retry from the next
        // opening brace, which also descends into nested candidates.
        search_from = anchor + 1;
    }
    None
}
