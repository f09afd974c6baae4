//! Window module - the span of history a fetch must cover, and the page cursor

use std::fmt;

/// Seconds in one day
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Time span `[start, end]` in Unix seconds that a fetch must cover
///
/// Invariant: `start < end`. A zero-length window cannot be constructed,
/// which is how "zero days" becomes an empty fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    start: i64,
    end: i64,
}

impl FetchWindow {
    /// Create a window, or `None` if `start >= end`
    pub fn new(start: i64, end: i64) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    /// Window covering the `days` days ending at `now`
    ///
    /// # Examples
    ///
    /// ```
    /// use chatdigest_domain::FetchWindow;
    ///
    /// let window = FetchWindow::trailing_days(1_000_000, 1).unwrap();
    /// assert_eq!(window.start(), 1_000_000 - 86_400);
    /// assert!(FetchWindow::trailing_days(1_000_000, 0).is_none());
    /// ```
    pub fn trailing_days(now: i64, days: u32) -> Option<Self> {
        let span = i64::from(days).saturating_mul(SECONDS_PER_DAY);
        Self::new(now.saturating_sub(span), now)
    }

    /// Oldest instant covered
    pub fn start(&self) -> i64 {
        self.start
    }

    /// Newest instant covered
    pub fn end(&self) -> i64 {
        self.end
    }

    /// Whether `timestamp` lies inside the window (both ends inclusive)
    pub fn contains(&self, timestamp: i64) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }

    /// Whether `timestamp` is strictly older than the window
    pub fn is_before(&self, timestamp: i64) -> bool {
        timestamp < self.start
    }
}

/// Pagination token: the oldest message id of the last page seen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FetchCursor(i64);

impl FetchCursor {
    /// Cursor denoting "start from the most recent message"
    pub const LATEST: FetchCursor = FetchCursor(0);

    /// Cursor positioned at a message id
    pub fn at(message_id: i64) -> Self {
        Self(message_id)
    }

    /// Raw message id carried by the cursor
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Whether this cursor still points at the most recent message
    pub fn is_latest(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for FetchCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
