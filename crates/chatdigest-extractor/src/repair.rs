//! Best-effort repair of almost-JSON
//!
//! LLMs routinely return JSON that a strict parser rejects. The repairer
//! walks the text once, tracking whether it is inside a string and which
//! brackets are open, and rewrites the common defects:
//!
//! - Markdown code fences and chatter before the first bracket
//! - smart quotes used as delimiters, full-width `，` and `：` between tokens
//! - unescaped `"` and raw control characters inside strings
//! - unquoted object keys
//! - missing commas between adjacent values (`}{`)
//! - trailing commas before `}` or `]`
//! - truncated output: cut back to the last complete element of the record
//!   array (top level, or inside a wrapper object), or close whatever is
//!   still open
//!
//! Anything after the first complete top-level value is dropped.

use std::fmt::Write;

/// Characters that may follow a closing quote
const AFTER_STRING: [char; 6] = [',', ':', '}', ']', '，', '：'];

/// Strip a Markdown code fence, returning the fenced body
///
/// Text without a fence is returned trimmed.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(open) = trimmed.find("```") else {
        return trimmed;
    };
    let after_open = &trimmed[open + 3..];
    // The rest of the opening line is the language tag
    let body_start = after_open.find('\n').map(|i| i + 1).unwrap_or(after_open.len());
    let body = &after_open[body_start..];
    match body.find("```") {
        Some(close) => body[..close].trim(),
        None => body.trim(),
    }
}

/// Byte offset of the first `[` or `{`
pub fn json_start(text: &str) -> Option<usize> {
    text.find(['[', '{'])
}

/// Rewrite `text` into something a strict JSON parser is likely to accept
///
/// # Examples
///
/// ```
/// use chatdigest_extractor::repair_json;
///
/// let fixed = repair_json(r#"{"topic":"a","contributors":["x"],"detail":"y",}"#);
/// assert_eq!(fixed, r#"{"topic":"a","contributors":["x"],"detail":"y"}"#);
/// ```
pub fn repair_json(text: &str) -> String {
    let body = strip_code_fences(text);
    let Some(start) = json_start(body) else {
        return body.to_string();
    };
    let chars: Vec<char> = body[start..].chars().collect();

    let mut repairer = Repairer::default();
    repairer.run(&chars);
    repairer.finish()
}

#[derive(Default)]
struct Repairer {
    out: String,
    stack: Vec<char>,
    /// Opening quote of the current string, if inside one
    string_quote: Option<char>,
    /// Output length just after the last complete element of the record array
    last_element_end: Option<usize>,
    complete: bool,
}

impl Repairer {
    fn run(&mut self, chars: &[char]) {
        let mut i = 0;
        while i < chars.len() && !self.complete {
            let c = chars[i];

            if let Some(quote) = self.string_quote {
                i += self.string_char(chars, i, quote);
                continue;
            }

            match c {
                '"' | '“' | '”' => {
                    self.separate_value();
                    self.out.push('"');
                    self.string_quote = Some(c);
                }
                '{' | '[' => {
                    self.separate_value();
                    self.out.push(c);
                    self.stack.push(c);
                    if c == '[' && record_array_depth(&self.stack) == Some(self.stack.len()) {
                        self.last_element_end = None;
                    }
                }
                '}' | ']' => self.close(),
                '，' => self.out.push(','),
                '：' => self.out.push(':'),
                c if (c.is_ascii_alphabetic() || c == '_') && self.expects_key() => {
                    let end = chars[i..]
                        .iter()
                        .position(|ch| !(ch.is_ascii_alphanumeric() || *ch == '_'))
                        .map_or(chars.len(), |len| i + len);
                    let ident: String = chars[i..end].iter().collect();
                    if matches!(next_significant(chars, end), Some(':' | '：')) {
                        let _ = write!(self.out, "\"{}\"", ident);
                    } else {
                        self.out.push_str(&ident);
                    }
                    i = end;
                    continue;
                }
                _ => self.out.push(c),
            }
            i += 1;
        }
    }

    /// Handle one character inside a string; returns how many were consumed
    fn string_char(&mut self, chars: &[char], i: usize, quote: char) -> usize {
        let c = chars[i];
        match c {
            '\\' => {
                if let Some(&next) = chars.get(i + 1) {
                    self.out.push('\\');
                    self.out.push(next);
                    return 2;
                }
            }
            '"' | '“' | '”' => {
                // Smart quotes only delimit strings they opened
                let can_close = c == '"' || quote != '"';
                if can_close && closes_string(chars, i + 1) {
                    self.out.push('"');
                    self.string_quote = None;
                } else if c == '"' {
                    self.out.push_str("\\\"");
                } else {
                    self.out.push(c);
                }
            }
            '\n' => self.out.push_str("\\n"),
            '\r' => self.out.push_str("\\r"),
            '\t' => self.out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(self.out, "\\u{:04x}", c as u32);
            }
            _ => self.out.push(c),
        }
        1
    }

    /// Insert the comma a new value needs after a finished one
    fn separate_value(&mut self) {
        if !self.stack.is_empty() && matches!(last_significant(&self.out), Some('}' | ']' | '"')) {
            self.out.push(',');
        }
    }

    fn expects_key(&self) -> bool {
        self.stack.last() == Some(&'{') && matches!(last_significant(&self.out), Some('{' | ','))
    }

    fn close(&mut self) {
        let Some(open) = self.stack.pop() else {
            return;
        };
        trim_trailing_comma(&mut self.out);
        self.out.push(closer(open));
        if self.stack.is_empty() {
            self.complete = true;
        } else if record_array_depth(&self.stack) == Some(self.stack.len()) {
            self.last_element_end = Some(self.out.len());
        }
    }

    fn finish(mut self) -> String {
        if self.complete {
            return self.out;
        }

        if let (Some(depth), Some(end)) = (record_array_depth(&self.stack), self.last_element_end) {
            self.out.truncate(end);
            self.stack.truncate(depth);
            while let Some(open) = self.stack.pop() {
                self.out.push(closer(open));
            }
            return self.out;
        }

        if self.string_quote.is_some() {
            self.out.push('"');
        }
        trim_trailing_comma(&mut self.out);
        if last_significant(&self.out) == Some(':') {
            self.out.push_str("null");
        }
        while let Some(open) = self.stack.pop() {
            trim_trailing_comma(&mut self.out);
            self.out.push(closer(open));
        }
        self.out
    }
}

/// Depth of the array holding the records: a top-level array, or an array
/// directly inside a top-level wrapper object
fn record_array_depth(stack: &[char]) -> Option<usize> {
    match stack {
        ['[', ..] => Some(1),
        ['{', '[', ..] => Some(2),
        _ => None,
    }
}

fn closer(open: char) -> char {
    if open == '{' {
        '}'
    } else {
        ']'
    }
}

/// Whether a quote at `from - 1` ends its string
///
/// It does when the next significant character is a separator or closer,
/// when nothing follows, or when another string starts on a later line.
fn closes_string(chars: &[char], from: usize) -> bool {
    let mut saw_newline = false;
    for &c in &chars[from.min(chars.len())..] {
        if c == '\n' || c == '\r' {
            saw_newline = true;
        } else if !c.is_whitespace() {
            return AFTER_STRING.contains(&c) || (saw_newline && matches!(c, '"' | '“' | '”'));
        }
    }
    true
}

fn next_significant(chars: &[char], from: usize) -> Option<char> {
    chars[from.min(chars.len())..]
        .iter()
        .copied()
        .find(|c| !c.is_whitespace())
}

fn last_significant(out: &str) -> Option<char> {
    out.trim_end().chars().next_back()
}

fn trim_trailing_comma(out: &mut String) {
    let len = out.trim_end().len();
    if out[..len].ends_with(',') {
        out.truncate(len - 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn parse(text: &str) -> Value {
        let repaired = repair_json(text);
        serde_json::from_str(&repaired).unwrap_or_else(|e| panic!("{}: {}", e, repaired))
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fences("Sure!\n```\n{}\n```\nDone"), "{}");
        assert_eq!(strip_code_fences("  [1] "), "[1]");
        assert_eq!(strip_code_fences("```json\n[1, 2"), "[1, 2");
    }

    #[test]
    fn test_trailing_commas() {
        assert_eq!(
            parse(r#"{"topic":"a","contributors":["x",],"detail":"y",}"#),
            json!({"topic": "a", "contributors": ["x"], "detail": "y"})
        );
        assert_eq!(parse("[1, 2, ]"), json!([1, 2]));
    }

    #[test]
    fn test_inner_quotes_are_escaped() {
        let value = parse(r#"[{"content": "he said "hello" and left", "sender": "a"}]"#);
        assert_eq!(value[0]["content"], "he said \"hello\" and left");
        assert_eq!(value[0]["sender"], "a");
    }

    #[test]
    fn test_control_characters_in_strings() {
        let value = parse("[{\"detail\": \"line one\nline\ttwo\"}]");
        assert_eq!(value[0]["detail"], "line one\nline\ttwo");
    }

    #[test]
    fn test_smart_quotes_and_full_width_punctuation() {
        let value = parse("[{“topic”：“午饭”，“detail”：“他说“好吃”就走了”}]");
        assert_eq!(value[0]["topic"], "午饭");
        assert_eq!(value[0]["detail"], "他说“好吃”就走了");
    }

    #[test]
    fn test_smart_quotes_inside_ascii_strings_are_kept() {
        let value = parse(r#"[{"detail": "他说：“好吃”，然后走了"}]"#);
        assert_eq!(value[0]["detail"], "他说：“好吃”，然后走了");
    }

    #[test]
    fn test_unquoted_keys() {
        let value = parse(r#"[{topic: "a", contributors: ["x"], detail: "true story"}]"#);
        assert_eq!(value[0]["topic"], "a");
        assert_eq!(value[0]["detail"], "true story");
    }

    #[test]
    fn test_missing_comma_between_objects() {
        assert_eq!(parse(r#"[{"a": 1}{"b": 2} {"c": 3}]"#), json!([{"a": 1}, {"b": 2}, {"c": 3}]));
    }

    #[test]
    fn test_missing_comma_between_lines() {
        let value = parse("{\"a\": \"x\"\n \"b\": \"y\"}");
        assert_eq!(value, json!({"a": "x", "b": "y"}));
    }

    #[test]
    fn test_truncated_array_keeps_complete_elements() {
        let value = parse(r#"[{"topic": "a", "detail": "x"}, {"topic": "b", "det"#);
        assert_eq!(value, json!([{"topic": "a", "detail": "x"}]));
    }

    #[test]
    fn test_truncated_wrapper_keeps_complete_elements() {
        let value = parse(
            r#"{"topics": [{"topic": "a", "contributors": ["x"], "detail": "y"}, {"topic": "b", "contri"#,
        );
        assert_eq!(
            value,
            json!({"topics": [{"topic": "a", "contributors": ["x"], "detail": "y"}]})
        );
    }

    #[test]
    fn test_truncated_second_wrapper_array_keeps_earlier_keys() {
        let value = parse(r#"{"done": [{"a": 1}], "topics": [{"b": 2}, {"c": "#);
        assert_eq!(value, json!({"done": [{"a": 1}], "topics": [{"b": 2}]}));
    }

    #[test]
    fn test_truncated_object_is_closed() {
        assert_eq!(parse(r#"{"topic": "a", "detail": "cut of"#), json!({"topic": "a", "detail": "cut of"}));
        assert_eq!(parse(r#"{"topic": "a", "detail":"#), json!({"topic": "a", "detail": null}));
    }

    #[test]
    fn test_chatter_around_value_is_ignored() {
        let value = parse("Here you go:\n[{\"a\": 1}]\nLet me know if you need more.");
        assert_eq!(value, json!([{"a": 1}]));
    }

    #[test]
    fn test_valid_json_is_unchanged() {
        let text = r#"[{"a": "x \"quoted\" y", "b": [1, 2, {"c": null}]}]"#;
        assert_eq!(repair_json(text), text);
    }

    #[test]
    fn test_no_json_at_all() {
        assert_eq!(repair_json("no structure here"), "no structure here");
    }
}
