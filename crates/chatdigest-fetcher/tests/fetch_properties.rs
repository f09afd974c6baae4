//! Property tests for the fetch loop bounds

use async_trait::async_trait;
use chatdigest_domain::traits::{MessageSource, PageResponse};
use chatdigest_domain::{ContentSegment, FetchCursor, FetchWindow, RawMessage, Sender};
use chatdigest_fetcher::{FetcherConfig, PageFetcher};
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Serves a fixed history newest-first, paging by message id
struct HistorySource {
    history: Vec<RawMessage>,
    requests: Arc<AtomicUsize>,
}

#[async_trait]
impl MessageSource for HistorySource {
    type Error = String;

    async fn get_page(
        &self,
        _group_id: &str,
        cursor: FetchCursor,
        count: usize,
    ) -> Result<PageResponse, String> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        // history is sorted by id ascending; a page is the `count` messages
        // strictly older than the cursor, oldest first
        let older: Vec<&RawMessage> = self
            .history
            .iter()
            .filter(|m| cursor.is_latest() || m.message_id < cursor.value())
            .collect();
        let start = older.len().saturating_sub(count);
        Ok(PageResponse::Messages(older[start..].iter().map(|m| (*m).clone()).collect()))
    }

    async fn resolve_self_id(&self) -> Option<String> {
        Some("bot".to_string())
    }
}

fn history(gaps: &[(i64, bool)]) -> Vec<RawMessage> {
    let mut ts = 0;
    gaps.iter()
        .enumerate()
        .map(|(i, (gap, from_bot))| {
            ts += gap;
            let user = if *from_bot { "bot" } else { "member" };
            RawMessage::new(
                i as i64 + 1,
                Sender::new(user, user),
                ts,
                vec![ContentSegment::text("x")],
            )
        })
        .collect()
}

proptest! {
    #[test]
    fn fetch_respects_window_and_bounds(
        gaps in prop::collection::vec((0i64..50, any::<bool>()), 0..300),
        window_start in 0i64..5_000,
        window_len in 1i64..5_000,
        max_messages in 1usize..120,
        max_rounds in 1u32..8,
        page_size in 1usize..40,
    ) {
        let requests = Arc::new(AtomicUsize::new(0));
        let source = HistorySource { history: history(&gaps), requests: requests.clone() };
        let config = FetcherConfig {
            max_query_rounds: max_rounds,
            max_messages,
            page_size,
            ..FetcherConfig::default()
        }
        .without_delays();
        let window = FetchWindow::new(window_start, window_start + window_len).unwrap();
        let fetcher = PageFetcher::new(source, config);

        let runtime = tokio::runtime::Runtime::new().unwrap();
        let outcome = runtime.block_on(fetcher.fetch_window("g", window, Some("bot")));

        prop_assert!(outcome.messages.len() <= max_messages);
        prop_assert!(requests.load(Ordering::SeqCst) <= max_rounds as usize);
        for message in &outcome.messages {
            prop_assert!(window.contains(message.timestamp));
            prop_assert_ne!(message.sender.user_id.as_str(), "bot");
        }
    }
}
