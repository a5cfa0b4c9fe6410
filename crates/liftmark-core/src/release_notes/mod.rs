//! Release-notes tracking
//!
//! Remembers the last changelog the user has seen so the UI can badge new
//! releases. Writes go through a rate limiter with explicit per-instance
//! state and an injected time source.

use std::sync::Mutex;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::db::KvStore;

/// Storage key for the last-seen changelog timestamp.
pub const LAST_SEEN_STORAGE_KEY: &str = "last_seen_changelog";

const WRITE_RATE_LIMIT_MS: i64 = 1000;

/// Time source; injected so tests control the clock.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// One published release note. Notes are ordered newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseNote {
    pub title: String,
    /// Publication date, RFC 3339 or `YYYY-MM-DD`
    pub date: String,
}

/// Minimum-interval write limiter with explicit state.
pub struct WriteRateLimiter {
    window: Duration,
    last_write: Mutex<Option<DateTime<Utc>>>,
}

impl WriteRateLimiter {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_write: Mutex::new(None),
        }
    }

    /// Whether a write at `now` falls inside the limit window.
    pub fn should_limit(&self, now: DateTime<Utc>) -> bool {
        let Ok(last_write) = self.last_write.lock() else {
            return false;
        };
        last_write.is_some_and(|last| now.signed_duration_since(last) < self.window)
    }

    /// Record a successful write at `now`.
    pub fn mark_write(&self, now: DateTime<Utc>) {
        if let Ok(mut last_write) = self.last_write.lock() {
            *last_write = Some(now);
        }
    }
}

/// Tracks the last-seen changelog timestamp in the key-value store.
pub struct ChangelogTracker<S, C = SystemClock> {
    storage: S,
    clock: C,
    limiter: WriteRateLimiter,
}

impl<S: KvStore> ChangelogTracker<S, SystemClock> {
    pub fn new(storage: S) -> Self {
        Self::with_clock(storage, SystemClock)
    }
}

impl<S: KvStore, C: Clock> ChangelogTracker<S, C> {
    pub fn with_clock(storage: S, clock: C) -> Self {
        Self {
            storage,
            clock,
            limiter: WriteRateLimiter::new(Duration::milliseconds(WRITE_RATE_LIMIT_MS)),
        }
    }

    /// Last-seen timestamp, `None` when absent, invalid, or unreadable.
    pub fn last_seen(&self) -> Option<String> {
        match self.storage.get(LAST_SEEN_STORAGE_KEY) {
            Ok(Some(raw)) => sanitize_timestamp(&raw),
            Ok(None) => None,
            Err(error) => {
                tracing::warn!("Failed to read last-seen changelog timestamp: {error}");
                None
            }
        }
    }

    /// Store a last-seen timestamp; invalid or rate-limited writes are dropped.
    pub fn set_last_seen(&self, timestamp: &str) {
        let now = self.clock.now();
        if self.limiter.should_limit(now) {
            tracing::warn!("Rate limit exceeded for changelog timestamp writes");
            return;
        }

        let Some(sanitized) = sanitize_timestamp(timestamp) else {
            tracing::warn!("Ignoring invalid last-seen timestamp: {timestamp}");
            return;
        };

        match self.storage.set(LAST_SEEN_STORAGE_KEY, &sanitized) {
            Ok(()) => self.limiter.mark_write(now),
            Err(error) => {
                tracing::error!("Failed to save last-seen changelog timestamp: {error}");
            }
        }
    }

    /// Mark the changelog as seen right now.
    pub fn mark_seen(&self) {
        let now = self.clock.now().to_rfc3339();
        self.set_last_seen(&now);
    }

    /// Whether there are release notes newer than the last-seen mark.
    pub fn has_new_release_notes(&self, notes: &[ReleaseNote]) -> bool {
        has_new_release_notes(notes, self.last_seen().as_deref())
    }
}

/// Publication date of the newest note (notes are ordered newest first).
#[must_use]
pub fn latest_release_date(notes: &[ReleaseNote]) -> Option<&str> {
    notes.first().map(|note| note.date.as_str())
}

/// Whether the newest note postdates the last-seen mark.
///
/// No stored mark means the user has never seen the changelog; unparseable
/// dates fail open. Both cases badge rather than hide a release.
#[must_use]
pub fn has_new_release_notes(notes: &[ReleaseNote], last_seen: Option<&str>) -> bool {
    let Some(latest) = latest_release_date(notes) else {
        return false;
    };
    let Some(last_seen) = last_seen else {
        return true;
    };

    match (parse_note_date(latest), parse_note_date(last_seen)) {
        (Some(latest), Some(last_seen)) => latest > last_seen,
        _ => true,
    }
}

/// Validate a timestamp string, stripping any markup first.
///
/// Persisted values may come from shared storage written by other clients;
/// anything that is not a clean RFC 3339 timestamp is rejected.
#[must_use]
pub fn sanitize_timestamp(timestamp: &str) -> Option<String> {
    let markup = Regex::new(r"<[^>]*>").expect("Invalid regex");
    let sanitized = markup.replace_all(timestamp, "").trim().to_string();

    if DateTime::parse_from_rfc3339(&sanitized).is_ok() {
        Some(sanitized)
    } else {
        None
    }
}

fn parse_note_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    Utc.from_local_datetime(&date.and_hms_opt(0, 0, 0)?).single()
}
