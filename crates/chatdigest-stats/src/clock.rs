//! Local wall-clock view of Unix timestamps

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Offset, Timelike, Utc};

/// Which local time the hour buckets use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocalClock {
    /// The host's local time zone, DST included
    #[default]
    Host,
    /// A fixed offset from UTC
    Fixed(FixedOffset),
}

impl LocalClock {
    /// Clock for an optional offset in minutes east of UTC
    ///
    /// `None` means host local time. An out-of-range offset falls back to UTC.
    ///
    /// # Examples
    ///
    /// ```
    /// use chatdigest_stats::LocalClock;
    ///
    /// let clock = LocalClock::from_offset_minutes(Some(480));
    /// assert_eq!(clock.hour(0), 8);
    /// assert_eq!(clock.hh_mm(90 * 60), "09:30");
    /// ```
    pub fn from_offset_minutes(minutes: Option<i32>) -> Self {
        match minutes {
            None => LocalClock::Host,
            Some(minutes) => LocalClock::Fixed(
                FixedOffset::east_opt(minutes.saturating_mul(60)).unwrap_or_else(|| Utc.fix()),
            ),
        }
    }

    /// UTC clock
    pub fn utc() -> Self {
        LocalClock::Fixed(Utc.fix())
    }

    /// Local hour of day, 0 to 23
    pub fn hour(&self, timestamp: i64) -> usize {
        self.local(timestamp).map(|dt| dt.hour() as usize).unwrap_or(0)
    }

    /// Local `HH:MM`
    pub fn hh_mm(&self, timestamp: i64) -> String {
        self.local(timestamp)
            .map(|dt| dt.format("%H:%M").to_string())
            .unwrap_or_else(|| "00:00".to_string())
    }

    fn local(&self, timestamp: i64) -> Option<NaiveDateTime> {
        let utc = DateTime::<Utc>::from_timestamp(timestamp, 0)?;
        Some(match self {
            LocalClock::Host => utc.with_timezone(&Local).naive_local(),
            LocalClock::Fixed(offset) => utc.with_timezone(offset).naive_local(),
        })
    }
}
