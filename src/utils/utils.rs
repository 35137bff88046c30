// Start of file: /src/utils/utils.rs

// The utils module organizes useful functions, used by other modules.

use serde::Serialize;
use anyhow::Result;

// Convert any `Serialize` type into a two-space-indented JSON string.
pub fn to_two_space_indented_json<T: Serialize>(value: &T) -> Result<String> {
    let json_value: serde_json::Value = serde_json::to_value(value)?;
    let pretty_json: String = serde_json::to_string_pretty(&json_value)?;
    Ok(pretty_json)
}

// Trimmed, non-empty value of an optional form field.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// Absolute http(s) URL with a host, as accepted by the video and book forms.
pub fn is_http_url(value: &str) -> bool {
    match url::Url::parse(value) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some(),
        Err(_) => false,
    }
}

// Escapes text for XML element content and attribute values.
pub fn xml_escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indents_with_two_spaces() {
        let json = to_two_space_indented_json(&serde_json::json!({ "a": 1 })).unwrap();
        assert_eq!(json, "{\n  \"a\": 1\n}");
    }

    #[test]
    fn blank_fields_count_as_missing() {
        assert_eq!(non_empty(Some("  ")), None);
        assert_eq!(non_empty(Some(" quiz ")), Some("quiz"));
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn accepts_only_web_urls() {
        assert!(is_http_url("https://youtu.be/abc"));
        assert!(is_http_url("http://files.learnflow.africa/book.pdf"));
        assert!(!is_http_url("ftp://files.learnflow.africa/book.pdf"));
        assert!(!is_http_url("not a url"));
    }

    #[test]
    fn escapes_xml_metacharacters() {
        assert_eq!(xml_escape("a&b<c>\"'"), "a&amp;b&lt;c&gt;&quot;&apos;");
    }
}

// End of file: /src/utils/utils.rs
