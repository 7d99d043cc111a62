//! `{placeholder}` substitution for administrator-edited notification templates.
//!
//! Placeholders are dotted paths (`{course.name}`) resolved by recursive
//! lookup into the event payload. A placeholder whose path does not resolve
//! to a scalar is left verbatim, which is what lets the content resolver
//! detect an incomplete substitution and fall back to code defaults.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;

use crate::types::EventData;

/// Placeholder keys: identifier segments joined by dots. Anything else between
/// braces is never interpreted.
pub const PLACEHOLDER_PATTERN: &str = r"\{([A-Za-z0-9_]+(?:\.[A-Za-z0-9_]+)*)\}";

/// Any brace-delimited token left in rendered text.
const LEFTOVER_PATTERN: &str = r"\{[^{}]*\}";

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PLACEHOLDER_PATTERN).expect("valid regex"));

static LEFTOVER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(LEFTOVER_PATTERN).expect("valid regex"));

/// Look up a dotted path (`user.name`) in the event payload.
pub fn lookup_path<'a>(data: &'a EventData, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = data.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Render a JSON value as substitution text.
///
/// Only scalars and arrays of scalars render; `null` and objects count as
/// unresolved.
pub fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => items
            .iter()
            .map(render_value)
            .collect::<Option<Vec<_>>>()
            .map(|parts| parts.join(",")),
        Value::Null | Value::Object(_) => None,
    }
}

/// Replace every resolvable placeholder in `text`. Unresolved ones stay literal.
pub fn substitute(text: &str, data: &EventData) -> String {
    PLACEHOLDER_RE
        .replace_all(text, |caps: &Captures<'_>| {
            lookup_path(data, &caps[1])
                .and_then(render_value)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Whether rendered text still contains a `{…}` token.
pub fn has_unresolved_placeholders(text: &str) -> bool {
    LEFTOVER_RE.is_match(text)
}

/// Extract the placeholder paths referenced by a template, in order of appearance.
pub fn placeholders(text: &str) -> Vec<String> {
    PLACEHOLDER_RE
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}
