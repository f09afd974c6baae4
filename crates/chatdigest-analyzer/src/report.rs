//! Report assembly

use chatdigest_domain::{AnalysisResult, GoldenQuote, Statistics, TokenUsage, TopicSummary, UserTitle};
use chatdigest_extractor::ExtractionOutcome;
use tracing::debug;

/// Merge the statistics and the three extraction outcomes into one result
///
/// The quote extraction overwrites `statistics.golden_quotes`, and
/// `statistics.token_usage` becomes its previous value plus the usage of
/// every extraction.
///
/// # Examples
///
/// ```
/// use chatdigest_analyzer::assemble_report;
/// use chatdigest_domain::TokenUsage;
/// use chatdigest_extractor::ExtractionOutcome;
/// use chatdigest_stats::StatsAggregator;
///
/// let statistics = StatsAggregator::default().compute_statistics(&[]);
/// let topics = ExtractionOutcome {
///     usage: TokenUsage::new(10, 5, 15),
///     ..ExtractionOutcome::empty()
/// };
///
/// let report = assemble_report(statistics, topics, ExtractionOutcome::empty(), ExtractionOutcome::empty());
/// assert_eq!(report.statistics.token_usage, TokenUsage::new(10, 5, 15));
/// ```
pub fn assemble_report(
    mut statistics: Statistics,
    topics: ExtractionOutcome<TopicSummary>,
    user_titles: ExtractionOutcome<UserTitle>,
    golden_quotes: ExtractionOutcome<GoldenQuote>,
) -> AnalysisResult {
    statistics.token_usage += [topics.usage, user_titles.usage, golden_quotes.usage]
        .into_iter()
        .sum::<TokenUsage>();
    statistics.golden_quotes = golden_quotes.records;

    debug!(
        "Assembled report: {} topics, {} user titles, {} golden quotes, {} tokens",
        topics.records.len(),
        user_titles.records.len(),
        statistics.golden_quotes.len(),
        statistics.token_usage.total_tokens
    );

    AnalysisResult {
        statistics,
        topics: topics.records,
        user_titles: user_titles.records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatdigest_domain::{EmojiStatistics, HOURS_PER_DAY};

    fn statistics() -> Statistics {
        Statistics {
            message_count: 3,
            total_characters: 30,
            participant_count: 2,
            most_active_period: "09:00-10:00".to_string(),
            hourly_activity: [0; HOURS_PER_DAY],
            emoji_count: 0,
            emoji_statistics: EmojiStatistics::default(),
            golden_quotes: vec![GoldenQuote {
                content: "stale".to_string(),
                sender: "x".to_string(),
                reason: "y".to_string(),
            }],
            token_usage: TokenUsage::zero(),
        }
    }

    fn outcome<R>(records: Vec<R>, usage: TokenUsage) -> ExtractionOutcome<R> {
        ExtractionOutcome {
            records,
            usage,
            strategy: None,
        }
    }

    #[test]
    fn test_usage_summed_with_two_failed_extractions() {
        let report = assemble_report(
            statistics(),
            outcome(Vec::new(), TokenUsage::zero()),
            outcome(Vec::new(), TokenUsage::new(40, 10, 50)),
            outcome(Vec::new(), TokenUsage::zero()),
        );
        assert_eq!(report.statistics.token_usage, TokenUsage::new(40, 10, 50));
    }

    #[test]
    fn test_usage_summed_across_all_extractions() {
        let report = assemble_report(
            statistics(),
            outcome(Vec::new(), TokenUsage::new(1, 2, 3)),
            outcome(Vec::new(), TokenUsage::new(10, 20, 30)),
            outcome(Vec::new(), TokenUsage::new(100, 200, 300)),
        );
        assert_eq!(report.statistics.token_usage, TokenUsage::new(111, 222, 333));
    }

    #[test]
    fn test_records_placed_in_their_sections() {
        let topic = TopicSummary {
            topic: "t".to_string(),
            contributors: vec!["a".to_string()],
            detail: "d".to_string(),
        };
        let title = UserTitle {
            name: "a".to_string(),
            qq: 1,
            title: "Night Owl".to_string(),
            mbti: "INTP".to_string(),
            reason: "r".to_string(),
        };
        let quote = GoldenQuote {
            content: "fresh".to_string(),
            sender: "a".to_string(),
            reason: "r".to_string(),
        };

        let report = assemble_report(
            statistics(),
            outcome(vec![topic.clone()], TokenUsage::zero()),
            outcome(vec![title.clone()], TokenUsage::zero()),
            outcome(vec![quote.clone()], TokenUsage::zero()),
        );

        assert_eq!(report.topics, vec![topic]);
        assert_eq!(report.user_titles, vec![title]);
        assert_eq!(report.statistics.golden_quotes, vec![quote]);
        assert_eq!(report.statistics.message_count, 3);
    }

    #[test]
    fn test_failed_quote_extraction_clears_quotes() {
        let report = assemble_report(
            statistics(),
            ExtractionOutcome::empty(),
            ExtractionOutcome::empty(),
            ExtractionOutcome::empty(),
        );
        assert!(report.statistics.golden_quotes.is_empty());
        assert!(report.statistics.token_usage.is_zero());
    }
}
