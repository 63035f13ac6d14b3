//! JSON Repair
//!
//! Rewrites near-JSON emitted by a text model into parseable JSON. Handles the
//! defects models actually produce:
//! - markdown code fences around the payload
//! - smart quotes and single-quoted strings
//! - unquoted object keys
//! - trailing, doubled and missing commas
//! - `//` and `/* */` comments
//! - Python-style literals (`True`, `False`, `None`)
//! - raw control characters and unescaped quotes inside strings
//! - output truncated mid-structure (unterminated strings, unclosed brackets)
//!
//! The result is not guaranteed to parse; callers still run `serde_json` on it.

/// Repair `input` into a best-effort JSON document.
pub fn repair_json(input: &str) -> String {
    let text = normalize_quotes(&strip_code_fences(input));
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 16);
    let mut closers: Vec<char> = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' | '\'' => {
                insert_missing_comma(&mut out);
                i = read_string(&chars, i, &mut out);
                continue;
            }
            '{' | '[' => {
                insert_missing_comma(&mut out);
                out.push(c);
                closers.push(if c == '{' { '}' } else { ']' });
            }
            '}' | ']' => {
                if let Some(pos) = closers.iter().rposition(|&e| e == c) {
                    while closers.len() > pos + 1 {
                        if let Some(inner) = closers.pop() {
                            close_with(&mut out, inner);
                        }
                    }
                    closers.pop();
                    close_with(&mut out, c);
                }
                // A closer with no matching opener is dropped.
            }
            ',' => match last_significant(&out) {
                None | Some('{') | Some('[') | Some(',') | Some(':') => {}
                _ => out.push(','),
            },
            ':' => out.push(':'),
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
                continue;
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                i += 2;
                continue;
            }
            c if c.is_whitespace() => out.push(c),
            c if c == '-' || c.is_ascii_digit() => {
                insert_missing_comma(&mut out);
                while i < chars.len() && is_number_char(chars[i]) {
                    out.push(chars[i]);
                    i += 1;
                }
                continue;
            }
            c if is_ident_start(c) => {
                let start = i;
                while i < chars.len() && is_ident_char(chars[i]) {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                insert_missing_comma(&mut out);
                if next_significant(&chars, i) == Some(':') {
                    push_quoted(&mut out, &word);
                } else {
                    match word.as_str() {
                        "true" | "True" | "TRUE" => out.push_str("true"),
                        "false" | "False" | "FALSE" => out.push_str("false"),
                        "null" | "None" | "NULL" | "undefined" | "NaN" => out.push_str("null"),
                        _ => push_quoted(&mut out, &word),
                    }
                }
                continue;
            }
            // Stray punctuation outside strings carries no JSON meaning.
            _ => {}
        }
        i += 1;
    }

    match last_significant(&out) {
        Some(',') => strip_trailing_comma(&mut out),
        Some(':') => out.push_str(" null"),
        _ => {}
    }
    while let Some(closer) = closers.pop() {
        close_with(&mut out, closer);
    }

    out
}

fn strip_code_fences(input: &str) -> String {
    input
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn normalize_quotes(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{00AB}' | '\u{00BB}' => '"',
            '\u{2018}' | '\u{2019}' | '\u{201A}' => '\'',
            other => other,
        })
        .collect()
}

/// Copy a string literal starting at `chars[start]` (a `"` or `'`) into `out`
/// as a double-quoted JSON string. Returns the index just past the literal.
fn read_string(chars: &[char], start: usize, out: &mut String) -> usize {
    let quote = chars[start];
    let mut i = start + 1;
    out.push('"');

    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            match chars.get(i + 1) {
                Some('\'') => out.push('\''),
                Some(&next) if "\"\\/bfnrtu".contains(next) => {
                    out.push('\\');
                    out.push(next);
                }
                Some(&next) => out.push(next),
                None => {}
            }
            i += 2;
            continue;
        }
        if c == quote && closes_string(chars, i + 1) {
            out.push('"');
            return i + 1;
        }
        match c {
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {}
            c => out.push(c),
        }
        i += 1;
    }

    // Unterminated: the model stopped mid-string.
    out.push('"');
    i
}

/// A quote ends a string only when what follows could continue JSON; models
/// often leave quotes inside quoted speech unescaped.
fn closes_string(chars: &[char], after: usize) -> bool {
    let mut i = after;
    let mut saw_newline = false;
    while i < chars.len() {
        let c = chars[i];
        if c == '\n' {
            saw_newline = true;
        } else if !c.is_whitespace() {
            return saw_newline || matches!(c, ',' | '}' | ']' | ':');
        }
        i += 1;
    }
    true
}

fn push_quoted(out: &mut String, word: &str) {
    out.push('"');
    for c in word.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
}

fn close_with(out: &mut String, closer: char) {
    match last_significant(out) {
        Some(',') => strip_trailing_comma(out),
        Some(':') => out.push_str(" null"),
        _ => {}
    }
    out.push(closer);
}

fn strip_trailing_comma(out: &mut String) {
    let trimmed_len = out.trim_end().len();
    out.truncate(trimmed_len);
    if out.ends_with(',') {
        out.pop();
    }
}

/// Ensure a comma separates consecutive values.
fn insert_missing_comma(out: &mut String) {
    if let Some(last) = last_significant(out) {
        if last == '"' || last == '}' || last == ']' || last.is_ascii_alphanumeric() {
            out.push(',');
        }
    }
}

fn last_significant(out: &str) -> Option<char> {
    out.trim_end().chars().last()
}

fn next_significant(chars: &[char], from: usize) -> Option<char> {
    chars[from..].iter().copied().find(|c| !c.is_whitespace())
}

fn is_number_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '-'
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn repaired(input: &str) -> Value {
        let fixed = repair_json(input);
        serde_json::from_str(&fixed)
            .unwrap_or_else(|e| panic!("repair produced invalid JSON {fixed:?}: {e}"))
    }

    #[test]
    fn test_valid_json_untouched() {
        let input = r#"{"overallScore": 7, "tags": ["a", "b"], "ok": true, "none": null}"#;
        assert_eq!(repaired(input), serde_json::from_str::<Value>(input).unwrap());
    }

    #[test]
    fn test_trailing_commas() {
        assert_eq!(
            repaired(r#"{"a": [1, 2, 3,], "b": {"c": 1,},}"#),
            json!({"a": [1, 2, 3], "b": {"c": 1}})
        );
    }

    #[test]
    fn test_unquoted_keys_and_single_quotes() {
        assert_eq!(
            repaired("{overallScore: 6, speaker: 'Sarah', quote: 'it\\'s slow'}"),
            json!({"overallScore": 6, "speaker": "Sarah", "quote": "it's slow"})
        );
    }

    #[test]
    fn test_smart_quotes() {
        assert_eq!(
            repaired("{\u{201C}speaker\u{201D}: \u{201C}John\u{201D}}"),
            json!({"speaker": "John"})
        );
    }

    #[test]
    fn test_code_fences_and_comments() {
        let input = "```json\n{\n  // overall\n  \"overallScore\": 5, /* mid */ \"x\": 1\n}\n```";
        assert_eq!(repaired(input), json!({"overallScore": 5, "x": 1}));
    }

    #[test]
    fn test_python_literals() {
        assert_eq!(
            repaired(r#"{"a": True, "b": False, "c": None}"#),
            json!({"a": true, "b": false, "c": null})
        );
    }

    #[test]
    fn test_missing_commas() {
        assert_eq!(
            repaired("{\"a\": 1\n\"b\": [\"x\"\n\"y\"]\n\"c\": {}}"),
            json!({"a": 1, "b": ["x", "y"], "c": {}})
        );
    }

    #[test]
    fn test_unescaped_inner_quotes() {
        assert_eq!(
            repaired(r#"{"quote": "She said "we need this" yesterday", "n": 1}"#),
            json!({"quote": "She said \"we need this\" yesterday", "n": 1})
        );
    }

    #[test]
    fn test_raw_newlines_in_strings() {
        assert_eq!(
            repaired("{\"quote\": \"line one\nline two\", \"n\": 2}"),
            json!({"quote": "line one\nline two", "n": 2})
        );
    }

    #[test]
    fn test_truncated_output_is_closed() {
        assert_eq!(
            repaired(r#"{"overallScore": 7, "components": [{"name": "Discovery", "keyFindings": ["asked ab"#),
            json!({"overallScore": 7, "components": [{"name": "Discovery", "keyFindings": ["asked ab"]}]})
        );
        assert_eq!(repaired(r#"{"a": 1, "b":"#), json!({"a": 1, "b": null}));
    }

    #[test]
    fn test_stray_closers_dropped() {
        assert_eq!(repaired(r#"{"a": [1, 2]]}"#), json!({"a": [1, 2]}));
    }
}
