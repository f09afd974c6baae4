//! Pattern-based record recovery
//!
//! Last step of the parse chain. Each extractor tries a strict pattern
//! matching a whole object in canonical field order, then a loose one that
//! tolerates extra fields in between. Matches become JSON objects so they go
//! through the same record validation as parsed output.

use regex::{Captures, Regex};
use serde_json::{json, Value};
use std::sync::LazyLock;

static TOPIC_STRICT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)\{\s*"topic":\s*"([^"]+)"\s*,\s*"contributors":\s*\[([^\]]+)\]\s*,\s*"detail":\s*"([^"]*(?:\\.[^"]*)*)"\s*\}"#,
    )
    .expect("valid topic pattern")
});

static TOPIC_LOOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)"topic":\s*"([^"]+)"[^}]*"contributors":\s*\[([^\]]+)\][^}]*"detail":\s*"([^"]*(?:\\.[^"]*)*)""#,
    )
    .expect("valid topic pattern")
});

static USER_TITLE_STRICT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)\{\s*"name":\s*"([^"]+)"\s*,\s*"qq":\s*(\d+)\s*,\s*"title":\s*"([^"]+)"\s*,\s*"mbti":\s*"([^"]+)"\s*,\s*"reason":\s*"([^"]*(?:\\.[^"]*)*)"\s*\}"#,
    )
    .expect("valid user title pattern")
});

static USER_TITLE_LOOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)"name":\s*"([^"]+)"[^}]*"qq":\s*(\d+)[^}]*"title":\s*"([^"]+)"[^}]*"mbti":\s*"([^"]+)"[^}]*"reason":\s*"([^"]*(?:\\.[^"]*)*)""#,
    )
    .expect("valid user title pattern")
});

static QUOTE_STRICT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)\{\s*"content":\s*"([^"]*(?:\\.[^"]*)*)"\s*,\s*"sender":\s*"([^"]+)"\s*,\s*"reason":\s*"([^"]*(?:\\.[^"]*)*)"\s*\}"#,
    )
    .expect("valid quote pattern")
});

static QUOTE_LOOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)"content":\s*"([^"]*(?:\\.[^"]*)*)"[^}]*"sender":\s*"([^"]+)"[^}]*"reason":\s*"([^"]*(?:\\.[^"]*)*)""#,
    )
    .expect("valid quote pattern")
});

static QUOTED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""([^"]+)""#).expect("valid quoted pattern"));

/// Recover topic objects, at most `max`
pub fn topics(text: &str, max: usize) -> Vec<Value> {
    matches(text, &TOPIC_STRICT, &TOPIC_LOOSE, max)
        .map(|caps| {
            let contributors: Vec<String> = QUOTED
                .captures_iter(&caps[2])
                .map(|c| c[1].trim().to_string())
                .collect();
            json!({
                "topic": caps[1].trim(),
                "contributors": contributors,
                "detail": unescape(&caps[3]),
            })
        })
        .collect()
}

/// Recover user title objects, at most `max`
pub fn user_titles(text: &str, max: usize) -> Vec<Value> {
    matches(text, &USER_TITLE_STRICT, &USER_TITLE_LOOSE, max)
        .map(|caps| {
            // Ids too long for i64 stay strings and are rejected downstream
            let qq = caps[2]
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or_else(|_| Value::from(&caps[2]));
            json!({
                "name": caps[1].trim(),
                "qq": qq,
                "title": caps[3].trim(),
                "mbti": caps[4].trim(),
                "reason": unescape(&caps[5]),
            })
        })
        .collect()
}

/// Recover golden quote objects, at most `max`
pub fn golden_quotes(text: &str, max: usize) -> Vec<Value> {
    matches(text, &QUOTE_STRICT, &QUOTE_LOOSE, max)
        .map(|caps| {
            json!({
                "content": unescape(&caps[1]),
                "sender": caps[2].trim(),
                "reason": unescape(&caps[3]),
            })
        })
        .collect()
}

/// Captures of the strict pattern, or of the loose one if the strict one found nothing
fn matches<'t>(
    text: &'t str,
    strict: &'static Regex,
    loose: &'static Regex,
    max: usize,
) -> impl Iterator<Item = Captures<'t>> {
    let pattern = if strict.is_match(text) { strict } else { loose };
    pattern.captures_iter(text).take(max)
}

/// Undo the escapes the patterns leave in captured text
fn unescape(raw: &str) -> String {
    raw.trim()
        .replace("\\\"", "\"")
        .replace("\\n", " ")
        .replace("\\t", " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topics_strict() {
        let text = r#"garbage [{"topic": "Lunch", "contributors": ["a", "b"], "detail": "They said \"yes\""}, oops"#;
        let found = topics(text, 5);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["topic"], "Lunch");
        assert_eq!(found[0]["contributors"], json!(["a", "b"]));
        assert_eq!(found[0]["detail"], "They said \"yes\"");
    }

    #[test]
    fn test_topics_loose_tolerates_extra_fields() {
        let text = r#"{"topic": "Games", "mood": "fun", "contributors": ["c"], "score": 3, "detail": "long talk"#;
        // Unterminated detail: loose pattern needs the closing quote
        assert!(topics(text, 5).is_empty());

        let text = r#"{"topic": "Games", "mood": "fun", "contributors": ["c"], "score": 3, "detail": "long talk"}"#;
        let found = topics(text, 5);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["detail"], "long talk");
    }

    #[test]
    fn test_topics_cap() {
        let one = r#"{"topic": "t", "contributors": ["a"], "detail": "d"}"#;
        let text = [one, one, one].join(",");
        assert_eq!(topics(&text, 2).len(), 2);
    }

    #[test]
    fn test_user_titles() {
        let text = r#"{"name": "alice", "qq": 123456, "title": "Night Owl", "mbti": "intp", "reason": "posts at 3am"}"#;
        let found = user_titles(text, 8);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["qq"], 123456);
        assert_eq!(found[0]["mbti"], "intp");
    }

    #[test]
    fn test_user_title_oversized_id_stays_string() {
        let text = r#"{"name": "a", "qq": 99999999999999999999999, "title": "t", "mbti": "ENFP", "reason": "r"}"#;
        let found = user_titles(text, 8);
        assert!(found[0]["qq"].is_string());
    }

    #[test]
    fn test_golden_quotes() {
        let text = r#"{"content": "line\none", "sender": "bob", "reason": "bold"} {"content": "x", "sender": "c", "reason": "y"}"#;
        let found = golden_quotes(text, 5);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0]["content"], "line one");
    }

    #[test]
    fn test_no_match() {
        assert!(topics("plain prose", 5).is_empty());
        assert!(user_titles("plain prose", 5).is_empty());
        assert!(golden_quotes("plain prose", 5).is_empty());
    }
}
