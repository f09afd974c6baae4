//! Core Extractor implementation

use crate::artifact::{Artifact, GoldenQuoteArtifact, TopicArtifact, UserTitleArtifact};
use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::input;
use crate::parser::{preview, run_parse_chain, ParseStrategy};
use chatdigest_domain::traits::{CompletionRequest, CompletionResponse, LlmProvider};
use chatdigest_domain::{GoldenQuote, RawMessage, TokenUsage, TopicSummary, UserTitle};
use chatdigest_stats::{LocalClock, StatsAggregator};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Records of one extraction with the tokens it cost
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionOutcome<R> {
    /// Validated records, at most the artifact's max count
    pub records: Vec<R>,

    /// Usage reported by the provider; zero when no call succeeded
    pub usage: TokenUsage,

    /// Parse strategy that produced the elements, if any did
    pub strategy: Option<ParseStrategy>,
}

impl<R> ExtractionOutcome<R> {
    /// No records, no usage
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            usage: TokenUsage::zero(),
            strategy: None,
        }
    }
}

impl<R> Default for ExtractionOutcome<R> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Turns chat history into topics, user titles and golden quotes via an LLM
///
/// # Examples
///
/// ```
/// use chatdigest_extractor::{Extractor, ExtractorConfig};
/// use chatdigest_llm::MockProvider;
///
/// let extractor = Extractor::new(MockProvider::new("[]"), ExtractorConfig::default()).unwrap();
/// assert_eq!(extractor.config().max_topics, 5);
/// ```
pub struct Extractor<L> {
    llm_provider: Arc<L>,
    config: ExtractorConfig,
    aggregator: StatsAggregator,
}

impl<L> Extractor<L>
where
    L: LlmProvider,
{
    /// Create a new Extractor
    ///
    /// # Errors
    ///
    /// Returns [`ExtractorError::Config`] if the configuration is invalid.
    pub fn new(llm_provider: L, config: ExtractorConfig) -> Result<Self, ExtractorError> {
        Self::with_shared_provider(Arc::new(llm_provider), config)
    }

    /// Create a new Extractor over a provider shared with other components
    pub fn with_shared_provider(llm_provider: Arc<L>, config: ExtractorConfig) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;
        let aggregator = StatsAggregator::with_offset_minutes(config.utc_offset_minutes);
        Ok(Self {
            llm_provider,
            config,
            aggregator,
        })
    }

    /// The active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// The LLM provider
    pub fn provider(&self) -> &L {
        &self.llm_provider
    }

    fn clock(&self) -> LocalClock {
        self.aggregator.clock()
    }

    /// Run the shared extraction flow for one artifact
    ///
    /// Never fails. An empty input returns an empty outcome without calling
    /// the LLM; a failed call returns an empty outcome with zero usage; an
    /// unparseable response returns no records but keeps the usage.
    pub async fn run_extraction<A>(&self, artifact: &A, input: &A::Input) -> ExtractionOutcome<A::Record>
    where
        A: Artifact,
    {
        let data_type = artifact.data_type();

        let Some(prompt) = artifact.build_prompt(input) else {
            info!("No {} input, skipping LLM call", data_type);
            return ExtractionOutcome::empty();
        };
        info!("Starting {} extraction, prompt length {} chars", data_type, prompt.len());

        let mut request = CompletionRequest::new(prompt, artifact.max_tokens(), artifact.temperature());
        request.model = self.config.model.clone();

        let response = match self.call_llm(&request).await {
            Ok(response) => response,
            Err(e) => {
                error!("{} extraction failed: {}", data_type, e);
                return ExtractionOutcome::empty();
            }
        };

        let usage = response.token_usage();
        let text = response.text();
        debug!("{} response preview: {}", data_type, preview(text));

        let parsed = run_parse_chain(text, |raw| artifact.regex_fallback(raw));
        for (strategy, failure) in &parsed.failures {
            debug!("{} {} parse failed: {}", data_type, strategy, failure);
        }

        if parsed.is_empty() {
            warn!("{} response could not be parsed, returning no records", data_type);
            return ExtractionOutcome {
                records: Vec::new(),
                usage,
                strategy: None,
            };
        }

        let records = artifact.construct_records(&parsed.elements);
        info!(
            "{} extraction produced {} records from {} elements ({:?})",
            data_type,
            records.len(),
            parsed.elements.len(),
            parsed.strategy
        );

        ExtractionOutcome {
            records,
            usage,
            strategy: parsed.strategy,
        }
    }

    /// Extract discussion topics
    pub async fn extract_topics(&self, messages: &[RawMessage]) -> ExtractionOutcome<TopicSummary> {
        let lines = input::topic_lines(messages, self.clock());
        let artifact = TopicArtifact {
            max_topics: self.config.max_topics,
        };
        self.run_extraction(&artifact, lines.as_slice()).await
    }

    /// Extract titles for the most active members
    pub async fn extract_user_titles(&self, messages: &[RawMessage]) -> ExtractionOutcome<UserTitle> {
        let activity = self.aggregator.analyze_users(messages);
        let users = input::user_summaries(&activity, self.config.max_user_titles);
        let artifact = UserTitleArtifact {
            max_user_titles: self.config.max_user_titles,
        };
        self.run_extraction(&artifact, users.as_slice()).await
    }

    /// Extract golden quotes
    pub async fn extract_golden_quotes(&self, messages: &[RawMessage]) -> ExtractionOutcome<GoldenQuote> {
        let lines = input::quote_lines(messages, self.clock());
        let artifact = GoldenQuoteArtifact {
            max_golden_quotes: self.config.max_golden_quotes,
        };
        self.run_extraction(&artifact, lines.as_slice()).await
    }

    /// Call the LLM provider
    async fn call_llm(&self, request: &CompletionRequest) -> Result<CompletionResponse, ExtractorError> {
        self.llm_provider
            .complete(request)
            .await
            .map_err(|e| ExtractorError::Llm(e.to_string()))
    }
}
