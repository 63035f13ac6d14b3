//! JSON Span Extraction
//!
//! Locates JSON object text inside free-form model output. Two strategies:
//! - `extract_object_span`: greedy match from the first `{` to the last `}`
//! - `balanced_object_candidates`: brace-depth scan that yields the largest
//!   balanced prefix first, then each balanced top-level object

/// Greedy brace match: the span from the first `{` to the last `}` in the
/// text, inclusive. `None` when no such span exists.
pub fn extract_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Brace-depth ranges of every top-level object, as `(start, end_exclusive)`
/// byte offsets. Braces inside string literals are ignored; an object that
/// never closes contributes no range.
fn balanced_object_ranges(text: &str) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut depth: usize = 0;
    let mut start: Option<usize> = None;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text.char_indices() {
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
            '"' if depth > 0 => in_string = true,
            '{' => {
                if depth == 0 {
                    start = Some(offset);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if let Some(s) = start.take() {
                        ranges.push((s, offset + 1));
                    }
                }
            }
            _ => {}
        }
    }

    ranges
}

/// Candidate substrings for truncate-to-last-balanced-object recovery, most
/// preferred first.
///
/// The first candidate runs from the first object's opening brace to the last
/// point where brace depth returned to zero (the largest balanced prefix).
/// When the text holds several top-level objects, each is then offered on its
/// own, last to first.
pub fn balanced_object_candidates(text: &str) -> Vec<&str> {
    let ranges = balanced_object_ranges(text);
    let (Some(first), Some(last)) = (ranges.first(), ranges.last()) else {
        return Vec::new();
    };

    let mut candidates = vec![&text[first.0..last.1]];
    if ranges.len() > 1 {
        candidates.extend(ranges.iter().rev().map(|(s, e)| &text[*s..*e]));
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    /// First candidate that parses, as the truncation tier walks them.
    fn first_parsing(text: &str) -> Option<(&str, Value)> {
        balanced_object_candidates(text)
            .into_iter()
            .find_map(|c| serde_json::from_str::<Value>(c).ok().map(|v| (c, v)))
    }

    #[test]
    fn test_extract_object_span_strips_prose() {
        let text = "Here is the analysis:\n```json\n{\"overallScore\": 7}\n```\nThanks!";
        assert_eq!(extract_object_span(text), Some("{\"overallScore\": 7}"));
    }

    #[test]
    fn test_extract_object_span_is_greedy() {
        let text = "{\"a\": 1} and {\"b\": 2}";
        assert_eq!(extract_object_span(text), Some(text));
    }

    #[test]
    fn test_extract_object_span_without_braces() {
        assert_eq!(extract_object_span("no json here"), None);
        assert_eq!(extract_object_span("} backwards {"), None);
    }

    #[test]
    fn test_truncated_tail_is_dropped() {
        let text = r#"{"overallScore": 6, "components": []} {"overallScore": 8, "comp"#;
        let (candidate, value) = first_parsing(text).unwrap();
        assert_eq!(candidate, r#"{"overallScore": 6, "components": []}"#);
        assert_eq!(value["overallScore"], 6);
    }

    #[test]
    fn test_braces_inside_strings_are_ignored() {
        let text = r#"prefix {"quote": "we use {curly} braces", "n": 1} suffix"#;
        let (_, value) = first_parsing(text).unwrap();
        assert_eq!(value["quote"], "we use {curly} braces");
    }

    #[test]
    fn test_largest_prefix_preferred_then_individual_objects() {
        let text = r#"{"a": 1} noise {"b": 2}"#;
        let candidates = balanced_object_candidates(text);
        assert_eq!(candidates[0], text);
        assert_eq!(candidates[1], r#"{"b": 2}"#);
        assert_eq!(candidates[2], r#"{"a": 1}"#);

        let (candidate, _) = first_parsing(text).unwrap();
        assert_eq!(candidate, r#"{"b": 2}"#);
    }

    #[test]
    fn test_any_text_with_a_valid_object_yields_json() {
        let samples = [
            r#"{"ok": true}"#,
            r#"garbage { not json } more {"ok": true} tail {"#,
            r#"}}}{"nested": {"deep": [1, 2, {"x": "}"}]}}"#,
            "```json\n{\"ok\": [1,2,3]}\n``` and then {\"broken\": ",
        ];
        for sample in samples {
            let (candidate, _) = first_parsing(sample)
                .unwrap_or_else(|| panic!("no JSON recovered from {sample:?}"));
            assert!(serde_json::from_str::<Value>(candidate).is_ok());
        }
    }

    #[test]
    fn test_unclosed_object_yields_nothing() {
        assert!(first_parsing(r#"{"overallScore": 7, "#).is_none());
        assert!(balanced_object_candidates("plain text").is_empty());
    }
}
