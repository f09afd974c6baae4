//! Parse LLM output into JSON elements
//!
//! Parsing runs an ordered chain of strategies and stops at the first one
//! that yields at least one element:
//!
//! 1. [`ParseStrategy::Direct`]: strict parse of the first JSON value holding objects
//! 2. [`ParseStrategy::Repaired`]: strict parse after [`repair_json`]
//! 3. [`ParseStrategy::Regex`]: the artifact's pattern-based fallback
//!
//! Every failed strategy leaves a [`ParseFailure`] behind for logging.

use crate::repair::{json_start, repair_json, strip_code_fences};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

/// One step of the parse chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStrategy {
    /// Strict parse of the response as given
    Direct,
    /// Strict parse after best-effort repair
    Repaired,
    /// Pattern-based extraction
    Regex,
}

impl fmt::Display for ParseStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParseStrategy::Direct => "direct",
            ParseStrategy::Repaired => "repaired",
            ParseStrategy::Regex => "regex",
        };
        f.write_str(name)
    }
}

/// Why a strategy produced nothing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    /// No `[` or `{` in the text
    #[error("no JSON value found")]
    NoJson,

    /// The candidate text is not valid JSON
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    /// Valid JSON, but neither an array nor an object
    #[error("expected an array or object, found {0}")]
    UnexpectedShape(&'static str),

    /// Valid JSON with no elements
    #[error("no elements")]
    Empty,

    /// The fallback patterns matched nothing
    #[error("no fallback pattern matched")]
    NoMatch,
}

/// Result of running the whole chain
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParseOutcome {
    /// Elements from the first successful strategy
    pub elements: Vec<Value>,

    /// Which strategy succeeded, if any
    pub strategy: Option<ParseStrategy>,

    /// Failures of the strategies tried before it
    pub failures: Vec<(ParseStrategy, ParseFailure)>,
}

impl ParseOutcome {
    /// Whether every strategy failed
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Strict parse of the first JSON value in `text` that holds records
///
/// Code fences and chatter before the value are skipped. A complete value
/// without any object in it (`[3]`, `[]`) is passed over in favour of the
/// next one; anything after the chosen value is ignored.
pub fn parse_direct(text: &str) -> Result<Vec<Value>, ParseFailure> {
    let body = strip_code_fences(text);
    let mut rest = &body[json_start(body).ok_or(ParseFailure::NoJson)?..];
    let mut skipped: Option<ParseFailure> = None;

    loop {
        let mut stream = serde_json::Deserializer::from_str(rest).into_iter::<Value>();
        let value = match stream.next() {
            Some(Ok(value)) => value,
            Some(Err(e)) => return Err(ParseFailure::InvalidJson(e.to_string())),
            None => return Err(skipped.unwrap_or(ParseFailure::NoJson)),
        };

        let failure = match into_elements(value).and_then(with_records) {
            Ok(elements) => return Ok(elements),
            Err(failure) => failure,
        };
        debug!("Skipping JSON value without records: {}", failure);

        let remaining = &rest[stream.byte_offset()..];
        let first = skipped.get_or_insert(failure);
        match json_start(remaining) {
            Some(next) => rest = &remaining[next..],
            None => return Err(first.clone()),
        }
    }
}

/// Strict parse after [`repair_json`]
pub fn parse_repaired(text: &str) -> Result<Vec<Value>, ParseFailure> {
    let repaired = repair_json(text);
    debug!("Repaired response preview: {}", preview(&repaired));
    parse_direct(&repaired)
}

/// Run the chain with `fallback` as the regex step
///
/// # Examples
///
/// ```
/// use chatdigest_extractor::{run_parse_chain, ParseStrategy};
///
/// let outcome = run_parse_chain(r#"[{"a": 1},]"#, |_| Vec::new());
/// assert_eq!(outcome.strategy, Some(ParseStrategy::Repaired));
/// assert_eq!(outcome.elements.len(), 1);
/// ```
pub fn run_parse_chain<F>(text: &str, fallback: F) -> ParseOutcome
where
    F: FnOnce(&str) -> Vec<Value>,
{
    let mut outcome = ParseOutcome::default();

    let structured: [(ParseStrategy, fn(&str) -> Result<Vec<Value>, ParseFailure>); 2] = [
        (ParseStrategy::Direct, parse_direct),
        (ParseStrategy::Repaired, parse_repaired),
    ];

    for (strategy, parse) in structured {
        match parse(text).and_then(non_empty) {
            Ok(elements) => {
                outcome.elements = elements;
                outcome.strategy = Some(strategy);
                return outcome;
            }
            Err(failure) => {
                debug!("{} parse failed: {}", strategy, failure);
                outcome.failures.push((strategy, failure));
            }
        }
    }

    match non_empty(fallback(text)) {
        Ok(elements) => {
            warn!("Structured parse failed, recovered {} elements by pattern", elements.len());
            outcome.elements = elements;
            outcome.strategy = Some(ParseStrategy::Regex);
        }
        Err(_) => outcome.failures.push((ParseStrategy::Regex, ParseFailure::NoMatch)),
    }
    outcome
}

/// Turn a parsed value into a list of elements
///
/// An array yields its items. An object yields itself, unless it is a
/// wrapper whose only field is an array, which yields the array's items.
fn into_elements(value: Value) -> Result<Vec<Value>, ParseFailure> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(map) if map.len() == 1 && map.values().all(Value::is_array) => Ok(map
            .into_iter()
            .next()
            .and_then(|(_, inner)| match inner {
                Value::Array(items) => Some(items),
                _ => None,
            })
            .unwrap_or_default()),
        Value::Object(map) => Ok(vec![Value::Object(map)]),
        Value::Null => Err(ParseFailure::UnexpectedShape("null")),
        Value::Bool(_) => Err(ParseFailure::UnexpectedShape("boolean")),
        Value::Number(_) => Err(ParseFailure::UnexpectedShape("number")),
        Value::String(_) => Err(ParseFailure::UnexpectedShape("string")),
    }
}

/// Require at least one object among the elements
fn with_records(elements: Vec<Value>) -> Result<Vec<Value>, ParseFailure> {
    if elements.is_empty() {
        Err(ParseFailure::Empty)
    } else if elements.iter().any(Value::is_object) {
        Ok(elements)
    } else {
        Err(ParseFailure::UnexpectedShape("array without objects"))
    }
}

fn non_empty(elements: Vec<Value>) -> Result<Vec<Value>, ParseFailure> {
    if elements.is_empty() {
        Err(ParseFailure::Empty)
    } else {
        Ok(elements)
    }
}

/// First 300 characters of `text`, for logs
pub(crate) fn preview(text: &str) -> String {
    text.chars().take(300).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_direct_array() {
        let elements = parse_direct(r#"[{"a": 1}, {"a": 2}]"#).unwrap();
        assert_eq!(elements.len(), 2);
    }

    #[test]
    fn test_direct_with_markdown_wrapper() {
        let response = "```json\n[{\"a\": 1}]\n```";
        assert_eq!(parse_direct(response).unwrap(), vec![json!({"a": 1})]);
    }

    #[test]
    fn test_direct_ignores_trailing_chatter() {
        let response = "Result: [{\"a\": 1}] hope this helps [x]";
        assert_eq!(parse_direct(response).unwrap(), vec![json!({"a": 1})]);
    }

    #[test]
    fn test_single_object_is_one_element() {
        let elements = parse_direct(r#"{"topic": "a", "contributors": ["x"], "detail": "y"}"#).unwrap();
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0]["topic"], "a");
    }

    #[test]
    fn test_wrapper_object_is_unwrapped() {
        let elements = parse_direct(r#"{"topics": [{"topic": "a"}, {"topic": "b"}]}"#).unwrap();
        assert_eq!(elements.len(), 2);
    }

    #[test]
    fn test_direct_failures() {
        assert_eq!(parse_direct("This is not JSON"), Err(ParseFailure::NoJson));
        assert!(matches!(parse_direct("[1, 2,]"), Err(ParseFailure::InvalidJson(_))));
    }

    #[test]
    fn test_direct_skips_values_without_records() {
        let response = "Found [3] topics:\n[{\"topic\":\"a\",\"contributors\":[\"x\"],\"detail\":\"y\"}]";
        let outcome = run_parse_chain(response, |text| crate::fallback::topics(text, 5));

        assert_eq!(outcome.strategy, Some(ParseStrategy::Direct));
        assert_eq!(
            outcome.elements,
            vec![json!({"topic": "a", "contributors": ["x"], "detail": "y"})]
        );
    }

    #[test]
    fn test_direct_rejects_arrays_of_scalars() {
        assert_eq!(
            parse_direct("[1, 2] and [\"x\"]"),
            Err(ParseFailure::UnexpectedShape("array without objects"))
        );
        assert_eq!(parse_direct("[] then [7]"), Err(ParseFailure::Empty));
    }

    #[test]
    fn test_chain_prefers_direct() {
        let outcome = run_parse_chain(r#"[{"a": 1}]"#, |_| panic!("fallback must not run"));
        assert_eq!(outcome.strategy, Some(ParseStrategy::Direct));
        assert!(outcome.failures.is_empty());
    }

    #[test]
    fn test_chain_repairs_trailing_comma_object() {
        let outcome = run_parse_chain(r#"{"topic":"a","contributors":["x"],"detail":"y",}"#, |_| Vec::new());
        assert_eq!(outcome.strategy, Some(ParseStrategy::Repaired));
        assert_eq!(
            outcome.elements,
            vec![json!({"topic": "a", "contributors": ["x"], "detail": "y"})]
        );
        assert_eq!(outcome.failures.len(), 1);
    }

    #[test]
    fn test_empty_array_falls_through_to_fallback() {
        let outcome = run_parse_chain("[]", |_| vec![json!({"a": 1})]);
        assert_eq!(outcome.strategy, Some(ParseStrategy::Regex));
        assert_eq!(outcome.failures[0], (ParseStrategy::Direct, ParseFailure::Empty));
    }

    #[test]
    fn test_chain_exhausted() {
        let outcome = run_parse_chain("nothing useful here", |_| Vec::new());
        assert!(outcome.is_empty());
        assert_eq!(outcome.strategy, None);
        assert_eq!(outcome.failures.len(), 3);
        assert_eq!(outcome.failures[2], (ParseStrategy::Regex, ParseFailure::NoMatch));
    }
}
