//! Inactivity notifiers.
//!
//! Three independent channels (user, typing, reading) share one timeout.
//! Each notifier is a rearmable single-shot deadline cell: `trigger`
//! replaces any pending deadline, `cancel` clears it without emitting, and
//! an uninterrupted elapse yields exactly one synthetic event. Scheduling
//! is the runtime's concern — the core only models deadlines against
//! caller-supplied clocks, which keeps replay deterministic.

use chrono::{DateTime, TimeDelta, Utc};

use crate::types::EventKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifierChannel {
    User,
    Typing,
    Reading,
}

impl NotifierChannel {
    /// Synthetic event injected into the dispatcher when this channel's
    /// deadline elapses.
    pub fn event(self) -> EventKind {
        match self {
            Self::User => EventKind::UserInactivity,
            Self::Typing => EventKind::TypingInactivity,
            Self::Reading => EventKind::ReadingInactivity,
        }
    }
}

#[derive(Debug)]
pub struct InactivityNotifier {
    channel: NotifierChannel,
    timeout: TimeDelta,
    deadline: Option<DateTime<Utc>>,
}

impl InactivityNotifier {
    pub fn new(channel: NotifierChannel, timeout_ms: u64) -> Self {
        Self {
            channel,
            timeout: TimeDelta::milliseconds(timeout_ms as i64),
            deadline: None,
        }
    }

    pub fn channel(&self) -> NotifierChannel {
        self.channel
    }

    /// (Re-)arm: the deadline becomes `now + timeout`, replacing any prior
    /// deadline.
    pub fn trigger(&mut self, now: DateTime<Utc>) {
        self.deadline = Some(now + self.timeout);
    }

    /// Clear the deadline without emitting.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    /// If the deadline has elapsed, disarm and return the elapsed deadline
    /// together with the synthetic event. The deadline, not `now`, is the
    /// logical timestamp of the emitted event.
    pub fn fire_due(&mut self, now: DateTime<Utc>) -> Option<(DateTime<Utc>, EventKind)> {
        let deadline = self.deadline?;
        if deadline > now {
            return None;
        }
        self.deadline = None;
        Some((deadline, self.channel.event()))
    }
}

// ─── Tests ────────────────────────────────────────────────────────
