//! Paginated, failure-tolerant history fetch
//!
//! The message source has no "query by time range" call, so the fetcher
//! walks history backwards page by page from the most recent message and
//! stops once it has crossed the start of the requested window.

use crate::config::FetcherConfig;
use chatdigest_domain::traits::{MessageSource, PageResponse};
use chatdigest_domain::{FetchCursor, FetchWindow, RawMessage};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, error, info, warn};

/// Why a fetch stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Zero days requested, nothing fetched
    EmptyWindow,
    /// `max_messages` collected
    MessageLimit,
    /// `max_query_rounds` requests issued
    RoundLimit,
    /// The source returned an empty page
    Exhausted,
    /// A page reached past the start of the window
    WindowCovered,
    /// A page yielded no message inside the window
    Stalled,
    /// Too many consecutive failed pages
    TooManyFailures,
}

/// Messages collected by one fetch and how the fetch ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Collected messages, newest page first
    pub messages: Vec<RawMessage>,

    /// Page requests issued, failed ones included
    pub rounds: u32,

    /// Why the loop stopped
    pub stop: StopReason,
}

impl FetchOutcome {
    fn empty(stop: StopReason) -> Self {
        Self {
            messages: Vec::new(),
            rounds: 0,
            stop,
        }
    }
}

/// Walks a [`MessageSource`] backwards until a time window is covered
///
/// # Examples
///
/// ```
/// use chatdigest_domain::traits::{MessageSource, PageResponse};
/// use chatdigest_domain::FetchCursor;
/// use chatdigest_fetcher::{FetcherConfig, PageFetcher};
///
/// struct Silent;
///
/// #[async_trait::async_trait]
/// impl MessageSource for Silent {
///     type Error = String;
///
///     async fn get_page(&self, _: &str, _: FetchCursor, _: usize) -> Result<PageResponse, String> {
///         Ok(PageResponse::Messages(Vec::new()))
///     }
///
///     async fn resolve_self_id(&self) -> Option<String> {
///         None
///     }
/// }
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let fetcher = PageFetcher::new(Silent, FetcherConfig::default());
/// assert!(fetcher.fetch_group_messages("123", 1, None).await.is_empty());
/// # });
/// ```
pub struct PageFetcher<S> {
    source: S,
    config: FetcherConfig,
}

impl<S: MessageSource> PageFetcher<S> {
    /// Create a fetcher over `source`
    pub fn new(source: S, config: FetcherConfig) -> Self {
        Self { source, config }
    }

    /// The underlying message source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The active configuration
    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// The bot's own id as reported by the source
    pub async fn resolve_self_id(&self) -> Option<String> {
        self.source.resolve_self_id().await
    }

    /// Fetch the messages of the last `days` days
    ///
    /// Never fails: transport problems end the loop early and whatever was
    /// collected so far is returned. Messages sent by `self_id` are skipped.
    pub async fn fetch_group_messages(
        &self,
        group_id: &str,
        days: u32,
        self_id: Option<&str>,
    ) -> Vec<RawMessage> {
        let Some(window) = FetchWindow::trailing_days(unix_now(), days) else {
            info!("Group {}: zero-day window, nothing to fetch", group_id);
            return Vec::new();
        };
        self.fetch_window(group_id, window, self_id).await.messages
    }

    /// Fetch every message inside `window`, within the configured bounds
    pub async fn fetch_window(
        &self,
        group_id: &str,
        window: FetchWindow,
        self_id: Option<&str>,
    ) -> FetchOutcome {
        let max_messages = self.config.max_messages;
        let max_rounds = self.config.max_query_rounds;

        info!(
            "Group {}: fetching window [{}, {}] (max {} messages, {} rounds)",
            group_id,
            window.start(),
            window.end(),
            max_messages,
            max_rounds
        );

        if max_messages == 0 || max_rounds == 0 {
            return FetchOutcome::empty(StopReason::EmptyWindow);
        }

        let mut collected: Vec<RawMessage> = Vec::new();
        let mut cursor = FetchCursor::LATEST;
        let mut rounds: u32 = 0;
        let mut consecutive_failures: u32 = 0;

        let stop = loop {
            if collected.len() >= max_messages {
                break StopReason::MessageLimit;
            }
            if rounds >= max_rounds {
                break StopReason::RoundLimit;
            }
            rounds += 1;

            let page = match self
                .source
                .get_page(group_id, cursor, self.config.page_size)
                .await
            {
                Ok(PageResponse::Messages(page)) => page,
                Ok(PageResponse::Malformed(reason)) => {
                    warn!("Group {}: malformed page at cursor {}: {}", group_id, cursor, reason);
                    if self.record_failure(&mut consecutive_failures, group_id).await {
                        break StopReason::TooManyFailures;
                    }
                    continue;
                }
                Err(e) => {
                    warn!("Group {}: page request at cursor {} failed: {}", group_id, cursor, e);
                    if self.record_failure(&mut consecutive_failures, group_id).await {
                        break StopReason::TooManyFailures;
                    }
                    continue;
                }
            };
            consecutive_failures = 0;

            let Some(first_id) = page.first().map(|m| m.message_id) else {
                info!("Group {}: no more history after {} rounds", group_id, rounds);
                break StopReason::Exhausted;
            };

            let page_len = page.len();
            let mut oldest = i64::MAX;
            let mut in_window = 0usize;

            for message in page {
                oldest = oldest.min(message.timestamp);

                if self_id.is_some_and(|id| id == message.sender.user_id) {
                    continue;
                }
                if window.contains(message.timestamp) {
                    in_window += 1;
                    collected.push(message);
                    if collected.len() >= max_messages {
                        break;
                    }
                }
            }

            debug!(
                "Group {}: round {} got {} messages, {} in window, {} collected",
                group_id,
                rounds,
                page_len,
                in_window,
                collected.len()
            );

            if collected.len() >= max_messages {
                break StopReason::MessageLimit;
            }
            if window.is_before(oldest) {
                break StopReason::WindowCovered;
            }
            if in_window == 0 {
                warn!("Group {}: page yielded no messages in window, stopping", group_id);
                break StopReason::Stalled;
            }

            cursor = FetchCursor::at(first_id);

            let pause_every = self.config.courtesy_pause_every;
            if pause_every > 0 && rounds % pause_every == 0 {
                tokio::time::sleep(self.config.courtesy_pause()).await;
            }
        };

        info!(
            "Group {}: fetched {} messages in {} rounds ({:?})",
            group_id,
            collected.len(),
            rounds,
            stop
        );

        FetchOutcome {
            messages: collected,
            rounds,
            stop,
        }
    }

    /// Count a failed page; true when the fetch should be abandoned
    async fn record_failure(&self, consecutive_failures: &mut u32, group_id: &str) -> bool {
        *consecutive_failures += 1;
        if *consecutive_failures >= self.config.max_consecutive_failures {
            error!(
                "Group {}: {} consecutive failed pages, giving up",
                group_id, consecutive_failures
            );
            return true;
        }
        tokio::time::sleep(self.config.failure_backoff()).await;
        false
    }
}

/// Current Unix time in seconds
fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
