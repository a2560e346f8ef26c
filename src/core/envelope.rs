// RunShape - core/envelope.rs
//
// The fetch step stores responses as JSON: the decoded body, or an error
// record like {"error": "non_json_response", "text": "<html ...>"}. This
// module recovers the HTML from such a record. Pure and total: anything it
// does not recognise is passed through as HTML.

use serde_json::Value;
use std::borrow::Cow;

/// HTML recovered from an input document, plus any error kind the fetch
/// step recorded alongside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope<'a> {
    pub html: Cow<'a, str>,
    pub error: Option<String>,
}

/// Object fields that may carry the page markup, in priority order.
const HTML_FIELDS: &[&str] = &["text", "html"];

/// Recover the HTML carried by `raw`.
///
/// - Input that does not start with `{` or `"` is returned unchanged.
/// - A JSON string is the HTML.
/// - A JSON object yields its `text` or `html` string field, and its
///   `error` string field if present. An object with an `error` but no
///   markup yields empty HTML.
/// - Invalid JSON, arrays and other objects pass through unchanged.
pub fn unwrap_input(raw: &str) -> Envelope<'_> {
    let passthrough = || Envelope {
        html: Cow::Borrowed(raw),
        error: None,
    };

    let trimmed = raw.trim_start();
    if !(trimmed.starts_with('{') || trimmed.starts_with('"')) {
        return passthrough();
    }

    let value: Value = match serde_json::from_str(trimmed) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!(error = %e, "Input looks like JSON but does not parse; treating as HTML");
            return passthrough();
        }
    };

    match value {
        Value::String(html) => Envelope {
            html: Cow::Owned(html),
            error: None,
        },
        Value::Object(map) => {
            let error = map.get("error").and_then(Value::as_str).map(str::to_string);
            let html = HTML_FIELDS
                .iter()
                .find_map(|f| map.get(*f).and_then(Value::as_str));
            match (html, error) {
                (Some(html), error) => Envelope {
                    html: Cow::Owned(html.to_string()),
                    error,
                },
                (None, Some(error)) => Envelope {
                    html: Cow::Borrowed(""),
                    error: Some(error),
                },
                (None, None) => passthrough(),
            }
        }
        _ => passthrough(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_html_passthrough() {
        let env = unwrap_input("<p>x</p>");
        assert!(matches!(env.html, Cow::Borrowed("<p>x</p>")));
        assert_eq!(env.error, None);
    }

    #[test]
    fn test_non_json_response_record() {
        let env = unwrap_input(r#"{"error": "non_json_response", "text": "<p>13:13</p>"}"#);
        assert_eq!(env.html, "<p>13:13</p>");
        assert_eq!(env.error.as_deref(), Some("non_json_response"));
    }

    #[test]
    fn test_html_field_and_json_string() {
        assert_eq!(unwrap_input(r#"{"html": "<table></table>"}"#).html, "<table></table>");
        assert_eq!(unwrap_input(r#"  "<p>a</p>""#).html, "<p>a</p>");
    }

    #[test]
    fn test_error_without_markup_yields_empty() {
        let env = unwrap_input(r#"{"error": "storage_state_missing", "path": "tmp/s.json"}"#);
        assert_eq!(env.html, "");
        assert_eq!(env.error.as_deref(), Some("storage_state_missing"));
    }

    #[test]
    fn test_other_json_passthrough() {
        let raw = r#"{"data": [1, 2, 3]}"#;
        assert_eq!(unwrap_input(raw).html, raw);
        let broken = "{ not json <p>";
        assert_eq!(unwrap_input(broken).html, broken);
    }
}
