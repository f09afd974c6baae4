//! The three extractable artifacts
//!
//! An [`Artifact`] bundles everything that differs between extractions:
//! the prompt, the LLM parameters, the fallback patterns and how a JSON
//! element becomes a validated record. The shared flow lives in
//! [`Extractor::run_extraction`](crate::Extractor::run_extraction).

use crate::fallback;
use crate::input::{ChatLine, UserSummary};
use crate::prompt;
use chatdigest_domain::{GoldenQuote, TopicSummary, UserTitle};
use serde_json::{Map, Value};
use tracing::warn;

/// Most contributors kept per topic
pub const MAX_CONTRIBUTORS: usize = 5;

/// One kind of structured record extracted by the LLM
pub trait Artifact: Send + Sync {
    /// What the prompt is built from
    type Input: ?Sized + Sync;

    /// The validated record type
    type Record: Send;

    /// Tag used in logs
    fn data_type(&self) -> &'static str;

    /// Most records kept per run
    fn max_count(&self) -> usize;

    /// Completion token budget
    fn max_tokens(&self) -> u32 {
        10_000
    }

    /// Sampling temperature
    fn temperature(&self) -> f32 {
        0.6
    }

    /// Prompt for `input`, or `None` when there is nothing to analyse
    fn build_prompt(&self, input: &Self::Input) -> Option<String>;

    /// Pattern-based recovery of elements from unparseable text
    fn regex_fallback(&self, text: &str) -> Vec<Value>;

    /// Validate one element into a record
    fn construct_record(&self, element: &Value) -> Result<Self::Record, String>;

    /// Validate every element, dropping failures, up to [`max_count`](Self::max_count)
    fn construct_records(&self, elements: &[Value]) -> Vec<Self::Record> {
        let mut records = Vec::new();
        for (idx, element) in elements.iter().enumerate() {
            if records.len() >= self.max_count() {
                break;
            }
            match self.construct_record(element) {
                Ok(record) => records.push(record),
                Err(reason) => warn!("Dropping {} element {}: {}", self.data_type(), idx, reason),
            }
        }
        records
    }
}

/// Discussion topics from the chat text
#[derive(Debug, Clone, Copy)]
pub struct TopicArtifact {
    /// Most topics kept
    pub max_topics: usize,
}

impl Artifact for TopicArtifact {
    type Input = [ChatLine];
    type Record = TopicSummary;

    fn data_type(&self) -> &'static str {
        "topics"
    }

    fn max_count(&self) -> usize {
        self.max_topics
    }

    fn build_prompt(&self, input: &[ChatLine]) -> Option<String> {
        (!input.is_empty()).then(|| prompt::topics_prompt(input, self.max_topics))
    }

    fn regex_fallback(&self, text: &str) -> Vec<Value> {
        fallback::topics(text, self.max_topics)
    }

    fn construct_record(&self, element: &Value) -> Result<TopicSummary, String> {
        let obj = as_object(element)?;
        let topic = required_str(obj, "topic")?;
        let detail = obj
            .get("detail")
            .and_then(Value::as_str)
            .ok_or_else(|| "Missing or invalid 'detail'".to_string())?
            .trim()
            .to_string();

        let contributors: Vec<String> = obj
            .get("contributors")
            .and_then(Value::as_array)
            .ok_or_else(|| "Missing or invalid 'contributors'".to_string())?
            .iter()
            .filter_map(|c| match c {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|c| !c.is_empty())
            .take(MAX_CONTRIBUTORS)
            .collect();
        if contributors.is_empty() {
            return Err("'contributors' is empty".to_string());
        }

        Ok(TopicSummary {
            topic,
            contributors,
            detail,
        })
    }
}

/// Titles and personality types for the most active members
#[derive(Debug, Clone, Copy)]
pub struct UserTitleArtifact {
    /// Most members titled
    pub max_user_titles: usize,
}

impl Artifact for UserTitleArtifact {
    type Input = [UserSummary];
    type Record = UserTitle;

    fn data_type(&self) -> &'static str {
        "user_titles"
    }

    fn max_count(&self) -> usize {
        self.max_user_titles
    }

    fn max_tokens(&self) -> u32 {
        1_500
    }

    fn temperature(&self) -> f32 {
        0.5
    }

    fn build_prompt(&self, input: &[UserSummary]) -> Option<String> {
        (!input.is_empty()).then(|| prompt::user_titles_prompt(input))
    }

    fn regex_fallback(&self, text: &str) -> Vec<Value> {
        fallback::user_titles(text, self.max_user_titles)
    }

    fn construct_record(&self, element: &Value) -> Result<UserTitle, String> {
        let obj = as_object(element)?;
        let name = required_str(obj, "name")?;
        let title = required_str(obj, "title")?;
        let reason = required_str(obj, "reason")?;

        let qq = match obj.get("qq") {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
        .ok_or_else(|| "Missing or invalid 'qq'".to_string())?;

        let mbti = required_str(obj, "mbti")?;
        if mbti.len() != 4 || !mbti.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(format!("Invalid 'mbti': {}", mbti));
        }

        Ok(UserTitle {
            name,
            qq,
            title,
            mbti: mbti.to_ascii_uppercase(),
            reason,
        })
    }
}

/// Memorable lines from the chat
#[derive(Debug, Clone, Copy)]
pub struct GoldenQuoteArtifact {
    /// Most quotes kept
    pub max_golden_quotes: usize,
}

impl Artifact for GoldenQuoteArtifact {
    type Input = [ChatLine];
    type Record = GoldenQuote;

    fn data_type(&self) -> &'static str {
        "golden_quotes"
    }

    fn max_count(&self) -> usize {
        self.max_golden_quotes
    }

    fn max_tokens(&self) -> u32 {
        1_500
    }

    fn temperature(&self) -> f32 {
        0.7
    }

    fn build_prompt(&self, input: &[ChatLine]) -> Option<String> {
        (!input.is_empty()).then(|| prompt::golden_quotes_prompt(input, self.max_golden_quotes))
    }

    fn regex_fallback(&self, text: &str) -> Vec<Value> {
        fallback::golden_quotes(text, self.max_golden_quotes)
    }

    fn construct_record(&self, element: &Value) -> Result<GoldenQuote, String> {
        let obj = as_object(element)?;
        Ok(GoldenQuote {
            content: required_str(obj, "content")?,
            sender: required_str(obj, "sender")?,
            reason: required_str(obj, "reason")?,
        })
    }
}

fn as_object(element: &Value) -> Result<&Map<String, Value>, String> {
    element
        .as_object()
        .ok_or_else(|| "Element is not a JSON object".to_string())
}

/// A trimmed, non-empty string field
fn required_str(obj: &Map<String, Value>, field: &str) -> Result<String, String> {
    obj.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| format!("Missing or invalid '{}'", field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TOPICS: TopicArtifact = TopicArtifact { max_topics: 5 };
    const TITLES: UserTitleArtifact = UserTitleArtifact { max_user_titles: 8 };
    const QUOTES: GoldenQuoteArtifact = GoldenQuoteArtifact { max_golden_quotes: 5 };

    #[test]
    fn test_parameters() {
        assert_eq!((TOPICS.max_tokens(), TOPICS.temperature()), (10_000, 0.6));
        assert_eq!((TITLES.max_tokens(), TITLES.temperature()), (1_500, 0.5));
        assert_eq!((QUOTES.max_tokens(), QUOTES.temperature()), (1_500, 0.7));
    }

    #[test]
    fn test_empty_input_has_no_prompt() {
        assert!(TOPICS.build_prompt(&[]).is_none());
        assert!(TITLES.build_prompt(&[]).is_none());
        assert!(QUOTES.build_prompt(&[]).is_none());
    }

    #[test]
    fn test_topic_missing_contributors_dropped_siblings_kept() {
        let elements = vec![
            json!({"topic": "a", "contributors": ["x"], "detail": "y"}),
            json!({"topic": "b", "detail": "no one"}),
            json!({"topic": "c", "contributors": [], "detail": "z"}),
            json!({"topic": "d", "contributors": ["p", "q"], "detail": ""}),
        ];

        let records = TOPICS.construct_records(&elements);

        let names: Vec<&str> = records.iter().map(|r| r.topic.as_str()).collect();
        assert_eq!(names, vec!["a", "d"]);
    }

    #[test]
    fn test_topic_contributors_capped() {
        let element = json!({
            "topic": "t",
            "contributors": ["a", " ", "b", "c", "d", "e", "f"],
            "detail": "d"
        });
        let record = TOPICS.construct_record(&element).unwrap();
        assert_eq!(record.contributors, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_records_capped_at_max_count() {
        let artifact = TopicArtifact { max_topics: 2 };
        let element = json!({"topic": "t", "contributors": ["a"], "detail": "d"});
        let elements = vec![element.clone(), element.clone(), element];
        assert_eq!(artifact.construct_records(&elements).len(), 2);
    }

    #[test]
    fn test_user_title_validation() {
        let ok = json!({"name": "a", "qq": "123", "title": "t", "mbti": "intj", "reason": "r"});
        let record = TITLES.construct_record(&ok).unwrap();
        assert_eq!(record.qq, 123);
        assert_eq!(record.mbti, "INTJ");

        let bad_qq = json!({"name": "a", "qq": "abc", "title": "t", "mbti": "INTJ", "reason": "r"});
        assert!(TITLES.construct_record(&bad_qq).is_err());

        let bad_mbti = json!({"name": "a", "qq": 1, "title": "t", "mbti": "INTJX", "reason": "r"});
        assert!(TITLES.construct_record(&bad_mbti).is_err());

        let no_reason = json!({"name": "a", "qq": 1, "title": "t", "mbti": "INTJ"});
        assert!(TITLES.construct_record(&no_reason).is_err());
    }

    #[test]
    fn test_golden_quote_validation() {
        let ok = json!({"content": " wow ", "sender": "a", "reason": "r"});
        assert_eq!(QUOTES.construct_record(&ok).unwrap().content, "wow");

        let no_sender = json!({"content": "wow", "sender": "", "reason": "r"});
        assert!(QUOTES.construct_record(&no_sender).is_err());

        assert!(QUOTES.construct_record(&json!("just a string")).is_err());
    }
}
