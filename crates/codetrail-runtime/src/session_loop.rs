//! Serialized session execution context.
//!
//! One task owns the dispatcher. Direct events arrive over an mpsc channel
//! and timer firings happen in the same task: the loop sleeps until the
//! earliest notifier deadline and polls the dispatcher on wake, so nothing
//! ever mutates the store from a timer thread. A timer racing a direct
//! event at worst delivers a stale inactivity signal, which the
//! dispatcher's current-state guards absorb.

use chrono::Utc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;

use codetrail_core::dispatcher::Dispatcher;
use codetrail_core::resolver::DocumentResolver;
use codetrail_core::store::IntervalStore;
use codetrail_core::types::{EventKind, EventRecord, TrackerError};

/// Fallback wake interval while no notifier deadline is armed.
const IDLE_WAKE: Duration = Duration::from_secs(60);

/// Run one tracking session to completion. The session ends on an explicit
/// session-end event, or when the channel closes (the remaining open
/// intervals are closed at that instant).
pub async fn run_session<R: DocumentResolver>(
    mut events: mpsc::Receiver<EventRecord>,
    resolver: R,
    timeout_ms: u64,
) -> Result<IntervalStore, TrackerError> {
    let mut dispatcher = Dispatcher::new(resolver, timeout_ms);

    loop {
        let sleep_for = dispatcher
            .next_deadline()
            .map(|deadline| (deadline - Utc::now()).to_std().unwrap_or(Duration::ZERO))
            .unwrap_or(IDLE_WAKE);

        tokio::select! {
            received = events.recv() => match received {
                Some(record) => {
                    let (at, event) = record.stamped(Utc::now());
                    tracing::debug!("event {event:?} at {at}");
                    let ended = matches!(event, EventKind::SessionEnd);
                    dispatcher.poll_notifiers(at)?;
                    dispatcher.update(event, at)?;
                    if ended {
                        tracing::info!("session ended");
                        break;
                    }
                }
                None => {
                    tracing::info!("event stream closed, ending session");
                    dispatcher.update(EventKind::SessionEnd, Utc::now())?;
                    break;
                }
            },
            _ = sleep(sleep_for) => {
                dispatcher.poll_notifiers(Utc::now())?;
            }
        }
    }

    Ok(dispatcher.into_store())
}

// ─── Tests ────────────────────────────────────────────────────────
