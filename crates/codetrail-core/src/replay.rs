//! Deterministic event-log replay.
//!
//! A recorded log replayed with its original timestamps reproduces the
//! interval timeline exactly: before each event is applied, every notifier
//! deadline at or before the event's timestamp fires, so timer-driven
//! closes interleave with direct events the same way on every run.

use chrono::{DateTime, Utc};

use crate::dispatcher::Dispatcher;
use crate::resolver::DocumentResolver;
use crate::types::{EventKind, EventRecord, Interval, TrackerError};

/// Replay a timestamped event sequence through a fresh dispatcher and
/// return the resulting interval timeline. Deadlines that would elapse
/// only after the final event are left pending, mirroring a live session
/// observed up to that instant.
pub fn replay<R: DocumentResolver>(
    records: impl IntoIterator<Item = (DateTime<Utc>, EventKind)>,
    resolver: R,
    timeout_ms: u64,
) -> Result<Vec<Interval>, TrackerError> {
    let mut dispatcher = Dispatcher::new(resolver, timeout_ms);
    for (at, event) in records {
        dispatcher.poll_notifiers(at)?;
        dispatcher.update(event, at)?;
    }
    Ok(dispatcher.into_store().into_intervals())
}

/// Parse an NDJSON event log: one `EventRecord` per line, blank lines
/// skipped.
pub fn parse_event_log(text: &str) -> Result<Vec<EventRecord>, serde_json::Error> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(serde_json::from_str)
        .collect()
}

// ─── Tests ────────────────────────────────────────────────────────
