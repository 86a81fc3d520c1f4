use crate::models::RawSourceRecord;
use tracing::{debug, warn};

/// Locates the JSON array literal following `marker` in an HTML document and
/// returns it as a syntactically balanced substring.
///
/// The payload sits inside arbitrary script/HTML content that may itself
/// contain `[` and `]` inside string literals (URLs, descriptions), so this
/// walks the text with an explicit state machine instead of a regex: a
/// nesting depth counter, an in-string flag, and an escape-pending flag.
///
/// Returns `None` if the marker is absent or the array is unterminated.
/// Neither case is an error; both mean "no listings in this document".
pub fn find_balanced_array<'a>(html: &'a str, marker: &str) -> Option<&'a str> {
    let marker_pos = html.find(marker)?;
    let after_marker = &html[marker_pos + marker.len()..];
    let rel_start = after_marker.find('[')?;
    let start = marker_pos + marker.len() + rel_start;

    let mut depth: usize = 0;
    let mut in_string = false;
    let mut escape_pending = false;

    for (i, c) in html[start..].char_indices() {
        if escape_pending {
            // The escaped character is consumed; the flag does not re-arm.
            escape_pending = false;
            continue;
        }
        match c {
            '\\' if in_string => escape_pending = true,
            '"' => in_string = !in_string,
            '[' if !in_string => depth += 1,
            ']' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&html[start..start + i + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    // Document ended before the array closed: truncated payload, tolerated.
    None
}

/// Extracts the JSON array keyed by `marker` and parses it.
///
/// Degrades to an empty vec on a missing marker, a truncated array, or a
/// JSON parse failure; a bad page must never abort the caller's
/// multi-page loop.
pub fn extract_embedded_array(html: &str, marker: &str) -> Vec<serde_json::Value> {
    let Some(chunk) = find_balanced_array(html, marker) else {
        debug!("No '{}' array found in document ({} bytes)", marker, html.len());
        return Vec::new();
    };

    match serde_json::from_str::<Vec<serde_json::Value>>(chunk) {
        Ok(values) => values,
        Err(e) => {
            warn!("Embedded '{}' array is not valid JSON: {}", marker, e);
            Vec::new()
        }
    }
}

/// Extracts and deserializes the raw listing records embedded in a page.
///
/// Elements that fail to deserialize are skipped individually so one odd
/// record does not drop the rest of the page.
pub fn extract_records(html: &str, marker: &str) -> Vec<RawSourceRecord> {
    extract_embedded_array(html, marker)
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<RawSourceRecord>(value) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping malformed listing record: {}", e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_array_from_surrounding_html() {
        let html = r#"<html><script>window.__DATA__ = {"vehicles": [{"id": 1}, {"id": 2}]};</script></html>"#;
        let values = extract_embedded_array(html, "\"vehicles\"");
        assert_eq!(values.len(), 2);
        assert_eq!(values[0]["id"], 1);
    }

    #[test]
    fn matches_direct_parse_of_isolated_substring() {
        let payload = r#"[{"id": 1, "tags": ["a", "b"]}, {"id": 2, "nested": [[1, 2], [3]]}]"#;
        let html = format!("<body>noise [unbalanced \"vehicles\": {payload} trailing ] text");
        let chunk = find_balanced_array(&html, "\"vehicles\":").unwrap();
        assert_eq!(chunk, payload);
        let direct: Vec<serde_json::Value> = serde_json::from_str(payload).unwrap();
        assert_eq!(extract_embedded_array(&html, "\"vehicles\":"), direct);
    }

    #[test]
    fn brackets_inside_strings_do_not_terminate() {
        let html = r#"pre "vehicles": [{"desc": "great [deal] here", "url": "http://x/a]b["}] post"#;
        let values = extract_embedded_array(html, "\"vehicles\"");
        assert_eq!(values.len(), 1);
        assert_eq!(values[0]["desc"], "great [deal] here");
    }

    #[test]
    fn escaped_quotes_inside_strings_are_handled() {
        let html = r#""vehicles": [{"desc": "he said \"nice [car]\" loudly", "path": "a\\"}] tail"#;
        let values = extract_embedded_array(html, "\"vehicles\"");
        assert_eq!(values.len(), 1);
        assert_eq!(values[0]["desc"], r#"he said "nice [car]" loudly"#);
        assert_eq!(values[0]["path"], "a\\");
    }

    #[test]
    fn missing_marker_yields_empty() {
        assert!(extract_embedded_array("<html>nothing here</html>", "\"vehicles\"").is_empty());
    }

    #[test]
    fn marker_without_array_yields_empty() {
        assert!(extract_embedded_array("\"vehicles\": null", "\"vehicles\"").is_empty());
    }

    #[test]
    fn truncated_array_yields_empty() {
        let html = r#""vehicles": [{"id": 1}, {"id": 2"#;
        assert!(find_balanced_array(html, "\"vehicles\"").is_none());
        assert!(extract_embedded_array(html, "\"vehicles\"").is_empty());
    }

    #[test]
    fn balanced_but_invalid_json_yields_empty() {
        let html = r#""vehicles": [{"id": }]"#;
        assert!(find_balanced_array(html, "\"vehicles\"").is_some());
        assert!(extract_embedded_array(html, "\"vehicles\"").is_empty());
    }

    #[test]
    fn records_skip_malformed_elements() {
        let html = r#""vehicles": [{"id": 1, "make": 13, "model": 2, "total_price": 100}, {"id": "not-a-number"}]"#;
        let records = extract_records(html, "\"vehicles\"");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 1);
    }

    #[test]
    fn empty_array_is_valid_and_empty() {
        let html = r#"<script>"vehicles": []</script>"#;
        assert!(extract_embedded_array(html, "\"vehicles\"").is_empty());
    }
}
