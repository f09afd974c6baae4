//! End-to-end analysis of one group

use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::report::assemble_report;
use chatdigest_domain::traits::{LlmProvider, MessageSource};
use chatdigest_domain::AnalysisResult;
use chatdigest_extractor::{ExtractionOutcome, Extractor};
use chatdigest_fetcher::PageFetcher;
use chatdigest_stats::StatsAggregator;
use tracing::{info, warn};

/// Fetches a group's history, computes its statistics and extracts the
/// LLM artifacts, then assembles them into one [`AnalysisResult`]
///
/// # Examples
///
/// ```no_run
/// use chatdigest_analyzer::{AnalyzerConfig, GroupAnalyzer};
/// use chatdigest_fetcher::OneBotSource;
/// use chatdigest_llm::OpenAiProvider;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let source = OneBotSource::new("http://127.0.0.1:3000")?;
/// let llm = OpenAiProvider::new("https://api.openai.com/v1/chat/completions", "gpt-4o-mini")?;
/// let analyzer = GroupAnalyzer::new(source, llm, AnalyzerConfig::default())?;
///
/// let report = analyzer.analyze_group("123456", Some(1)).await?;
/// println!("{} messages", report.statistics.message_count);
/// # Ok(())
/// # }
/// ```
pub struct GroupAnalyzer<S, L> {
    fetcher: PageFetcher<S>,
    extractor: Extractor<L>,
    aggregator: StatsAggregator,
    config: AnalyzerConfig,
}

impl<S, L> GroupAnalyzer<S, L>
where
    S: MessageSource,
    L: LlmProvider,
{
    /// Create an analyzer over a message source and an LLM provider
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Config`] if the configuration is invalid.
    pub fn new(source: S, llm_provider: L, config: AnalyzerConfig) -> Result<Self, AnalyzerError> {
        config.validate().map_err(AnalyzerError::Config)?;

        let fetcher = PageFetcher::new(source, config.fetcher.clone());
        let extractor = Extractor::new(llm_provider, config.extractor.clone())?;
        let aggregator = StatsAggregator::with_offset_minutes(config.extractor.utc_offset_minutes);

        Ok(Self {
            fetcher,
            extractor,
            aggregator,
            config,
        })
    }

    /// The active configuration
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// The underlying fetcher
    pub fn fetcher(&self) -> &PageFetcher<S> {
        &self.fetcher
    }

    /// The underlying extractor
    pub fn extractor(&self) -> &Extractor<L> {
        &self.extractor
    }

    /// Analyse the last `days` days of `group_id`
    ///
    /// `days` outside 1..=7, or `None`, falls back to the configured
    /// `analysis_days`. Fetch and LLM failures do not fail the run; they
    /// leave the affected sections short or empty.
    ///
    /// # Errors
    ///
    /// - [`AnalyzerError::GroupNotEnabled`] if the group is not allowed
    /// - [`AnalyzerError::NoMessages`] if nothing was fetched
    /// - [`AnalyzerError::InsufficientMessages`] below `min_messages_threshold`
    pub async fn analyze_group(&self, group_id: &str, days: Option<u32>) -> Result<AnalysisResult, AnalyzerError> {
        if !self.config.is_group_enabled(group_id) {
            return Err(AnalyzerError::GroupNotEnabled(group_id.to_string()));
        }
        let days = self.config.resolve_days(days);
        info!("Analysing group {} over the last {} day(s)", group_id, days);

        let self_id = self.fetcher.resolve_self_id().await;
        if self_id.is_none() {
            warn!("Could not resolve the bot's own id, its messages will be included");
        }

        let messages = self
            .fetcher
            .fetch_group_messages(group_id, days, self_id.as_deref())
            .await;

        if messages.is_empty() {
            return Err(AnalyzerError::NoMessages(group_id.to_string()));
        }
        if messages.len() < self.config.min_messages_threshold {
            return Err(AnalyzerError::InsufficientMessages {
                count: messages.len(),
                threshold: self.config.min_messages_threshold,
            });
        }
        info!("Group {}: {} messages fetched, analysing", group_id, messages.len());

        let statistics = self.aggregator.compute_statistics(&messages);

        let topics = async {
            if self.config.topic_analysis_enabled {
                self.extractor.extract_topics(&messages).await
            } else {
                ExtractionOutcome::empty()
            }
        };
        let user_titles = async {
            if self.config.user_title_analysis_enabled {
                self.extractor.extract_user_titles(&messages).await
            } else {
                ExtractionOutcome::empty()
            }
        };
        let golden_quotes = self.extractor.extract_golden_quotes(&messages);

        let (topics, user_titles, golden_quotes) = tokio::join!(topics, user_titles, golden_quotes);

        let report = assemble_report(statistics, topics, user_titles, golden_quotes);
        info!(
            "Group {}: report ready with {} topics, {} user titles, {} golden quotes ({} tokens)",
            group_id,
            report.topics.len(),
            report.user_titles.len(),
            report.statistics.golden_quotes.len(),
            report.statistics.token_usage.total_tokens
        );
        Ok(report)
    }
}
