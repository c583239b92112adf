//! Header codec.
//!
//! Converts between the raw multi-line header text a transport reports and
//! the string map the rest of the crate works with, plus the normalization
//! applied to request headers before dispatch.

use std::collections::HashMap;

/// Parse a raw header blob (`Name: value` lines) into a map.
///
/// Names are lower-cased and values trimmed. Duplicate names are combined by
/// comma-joining their values in arrival order. Blank lines and lines without
/// a colon are skipped.
pub fn parse_headers(raw: &str) -> HashMap<String, String> {
    let mut parsed: HashMap<String, String> = HashMap::new();
    for line in raw.lines() {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim().to_ascii_lowercase();
        if name.is_empty() {
            continue;
        }
        let value = value.trim();
        match parsed.get_mut(&name) {
            Some(existing) => {
                existing.push_str(", ");
                existing.push_str(value);
            }
            None => {
                parsed.insert(name, value.to_string());
            }
        }
    }
    parsed
}

/// Render header pairs back into a raw blob, one `Name: value` line per pair.
pub fn render_headers(headers: &[(String, String)]) -> String {
    let mut raw = String::new();
    for (name, value) in headers {
        raw.push_str(name);
        raw.push_str(": ");
        raw.push_str(value);
        raw.push_str("\r\n");
    }
    raw
}

/// Remove every entry whose name case-insensitively equals `content-type`.
pub fn remove_content_type(headers: &mut HashMap<String, String>) {
    headers.retain(|name, _| !name.eq_ignore_ascii_case("content-type"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_lowercases_names_and_trims_values() {
        let parsed = parse_headers("Content-Type:  application/json \r\nX-Request-Id: abc\r\n");
        assert_eq!(
            parsed.get("content-type").map(String::as_str),
            Some("application/json")
        );
        assert_eq!(parsed.get("x-request-id").map(String::as_str), Some("abc"));
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn parse_combines_duplicate_names_in_order() {
        let parsed = parse_headers("Vary: Accept\r\nVary: Origin\r\n");
        assert_eq!(parsed.get("vary").map(String::as_str), Some("Accept, Origin"));
    }

    #[test]
    fn parse_skips_blank_and_colonless_lines() {
        let parsed = parse_headers("\r\ngarbage line\r\nServer: test\r\n\r\n");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed.get("server").map(String::as_str), Some("test"));
    }

    #[test]
    fn parse_keeps_colons_inside_values() {
        let parsed = parse_headers("Location: http://localhost:8080/next\r\n");
        assert_eq!(
            parsed.get("location").map(String::as_str),
            Some("http://localhost:8080/next")
        );
    }

    #[test]
    fn render_then_parse_round_trips_lowercase_pairs() {
        let pairs = vec![
            ("content-length".to_string(), "12".to_string()),
            ("server".to_string(), "test".to_string()),
        ];
        let parsed = parse_headers(&render_headers(&pairs));
        assert_eq!(parsed.get("content-length").map(String::as_str), Some("12"));
        assert_eq!(parsed.get("server").map(String::as_str), Some("test"));
    }

    #[test]
    fn remove_content_type_matches_any_casing() {
        let mut headers = HashMap::from([
            ("Content-Type".to_string(), "application/json".to_string()),
            ("CONTENT-TYPE".to_string(), "text/plain".to_string()),
            ("Accept".to_string(), "*/*".to_string()),
        ]);
        remove_content_type(&mut headers);
        assert_eq!(headers.len(), 1);
        assert!(headers.contains_key("Accept"));
    }
}
