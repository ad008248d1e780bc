//! Event dispatcher: the event-to-interval state machine.
//!
//! Single entry point `update(event, at)` consumes the typed event stream
//! and mutates the interval store and the three inactivity notifiers.
//! Every transition preserves track mutual exclusion; every close is
//! guarded by a current-state check so stale timer firings and replayed
//! events degrade to no-ops instead of corrupting the timeline.
//!
//! Precedence rules:
//!
//! - **Debounce**: re-opening the same type on the same source is a store
//!   no-op, never a double-open.
//! - **Re-arm wins ties**: a branch that leaves the store untouched still
//!   re-arms its timers; timers never silently expire inside a no-op.
//! - **Lazy promotion**: a keystroke over a non-typing editor track
//!   re-dispatches as an edit start, promoting reading into typing.
//! - **Fineness order**: notifiers with equal deadlines fire typing,
//!   reading, then user, so editor intervals close under their own type
//!   before user-level inactivity cancels their timers.

use chrono::{DateTime, Utc};

use crate::notifier::{InactivityNotifier, NotifierChannel};
use crate::resolver::DocumentResolver;
use crate::store::IntervalStore;
use crate::types::{EventKind, IntervalType, Track, TrackerError};

/// Explicit session lifecycle. Events other than `SessionStart` are
/// ignored before the session starts and after it ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Pending,
    Running,
    Ended,
}

pub struct Dispatcher<R> {
    store: IntervalStore,
    resolver: R,
    user: InactivityNotifier,
    typing: InactivityNotifier,
    reading: InactivityNotifier,
    phase: SessionPhase,
}

impl<R: DocumentResolver> Dispatcher<R> {
    /// `timeout_ms` is the single inactivity timeout shared by all three
    /// notifier channels.
    pub fn new(resolver: R, timeout_ms: u64) -> Self {
        Self {
            store: IntervalStore::new(),
            resolver,
            user: InactivityNotifier::new(NotifierChannel::User, timeout_ms),
            typing: InactivityNotifier::new(NotifierChannel::Typing, timeout_ms),
            reading: InactivityNotifier::new(NotifierChannel::Reading, timeout_ms),
            phase: SessionPhase::Pending,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn store(&self) -> &IntervalStore {
        &self.store
    }

    pub fn into_store(self) -> IntervalStore {
        self.store
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn resolver_mut(&mut self) -> &mut R {
        &mut self.resolver
    }

    pub fn notifier(&self, channel: NotifierChannel) -> &InactivityNotifier {
        match channel {
            NotifierChannel::User => &self.user,
            NotifierChannel::Typing => &self.typing,
            NotifierChannel::Reading => &self.reading,
        }
    }

    fn notifier_mut(&mut self, channel: NotifierChannel) -> &mut InactivityNotifier {
        match channel {
            NotifierChannel::User => &mut self.user,
            NotifierChannel::Typing => &mut self.typing,
            NotifierChannel::Reading => &mut self.reading,
        }
    }

    /// Earliest armed deadline across all channels, for the runtime's
    /// sleep computation.
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        [&self.user, &self.typing, &self.reading]
            .into_iter()
            .filter_map(InactivityNotifier::deadline)
            .min()
    }

    /// Fire every elapsed notifier, earliest deadline first, re-injecting
    /// each synthetic event with its deadline as the logical timestamp.
    /// Channels are re-examined after every firing so that a firing which
    /// cancels another channel (user-level inactivity) suppresses it.
    pub fn poll_notifiers(&mut self, now: DateTime<Utc>) -> Result<(), TrackerError> {
        while let Some(channel) = self.next_due_channel(now) {
            let Some((deadline, event)) = self.notifier_mut(channel).fire_due(now) else {
                return Ok(());
            };
            self.update(event, deadline)?;
        }
        Ok(())
    }

    fn next_due_channel(&self, now: DateTime<Utc>) -> Option<NotifierChannel> {
        // Listed finest-first: min_by_key keeps the first minimum, so
        // typing and reading win deadline ties against user.
        [
            NotifierChannel::Typing,
            NotifierChannel::Reading,
            NotifierChannel::User,
        ]
        .into_iter()
        .filter_map(|channel| {
            let deadline = self.notifier(channel).deadline()?;
            (deadline <= now).then_some((deadline, channel))
        })
        .min_by_key(|&(deadline, _)| deadline)
        .map(|(_, channel)| channel)
    }

    /// Apply one event at the given logical timestamp.
    pub fn update(&mut self, event: EventKind, at: DateTime<Utc>) -> Result<(), TrackerError> {
        match self.phase {
            SessionPhase::Pending if !matches!(event, EventKind::SessionStart) => return Ok(()),
            SessionPhase::Running if matches!(event, EventKind::SessionStart) => return Ok(()),
            SessionPhase::Ended => return Ok(()),
            _ => {}
        }

        match event {
            EventKind::SessionStart => {
                self.phase = SessionPhase::Running;
                self.store.open(IntervalType::SessionOpen, at)?;
                self.user.trigger(at);
            }

            EventKind::SessionEnd => {
                self.user.cancel();
                self.typing.cancel();
                self.reading.cancel();
                self.store.close_all(at);
                self.phase = SessionPhase::Ended;
            }

            EventKind::WindowActive => {
                if self.store.open_of_type(IntervalType::WindowActive).is_none() {
                    self.store.open(IntervalType::WindowActive, at)?;
                }
                self.user.trigger(at);
            }

            EventKind::WindowInactive => {
                if let Some(id) = self
                    .store
                    .open_of_type(IntervalType::WindowActive)
                    .map(|iv| iv.id)
                {
                    self.store.close(id, at);
                }
            }

            EventKind::PerspectiveStart { kind } => {
                let current = self
                    .store
                    .open_in_track(Track::Perspective)
                    .map(|iv| (iv.id, iv.ty));
                match current {
                    Some((_, IntervalType::Perspective(open))) if open == kind => {}
                    current => {
                        if let Some((id, _)) = current {
                            self.store.close(id, at);
                        }
                        self.store.open(IntervalType::Perspective(kind), at)?;
                    }
                }
                self.user.trigger(at);
            }

            EventKind::TestRun { start, end, record } => {
                self.store.append_test_run(start, end, record);
            }

            EventKind::UserActivity => {
                if self.store.open_of_type(IntervalType::UserActive).is_none() {
                    self.store.open(IntervalType::UserActive, at)?;
                }
                self.user.trigger(at);
            }

            EventKind::EditStart { source } => {
                self.reading.cancel();

                let current = self.store.editor_interval();
                let same_typing = current.is_some_and(|iv| {
                    iv.ty == IntervalType::Typing && iv.source.as_ref() == Some(&source)
                });
                if !same_typing {
                    // Reuse the outgoing interval's document when focus
                    // stays on the same source; resolve otherwise.
                    let (previous, reused) = match current {
                        Some(iv) if iv.source.as_ref() == Some(&source) => {
                            (Some(iv.id), iv.document.clone())
                        }
                        Some(iv) => (Some(iv.id), None),
                        None => (None, None),
                    };
                    let document = reused.or_else(|| self.resolver.resolve(&source));
                    if let Some(id) = previous {
                        self.store.close(id, at);
                    }
                    if let Some(document) = document {
                        self.store
                            .open_editor(IntervalType::Typing, at, source, document)?;
                    }
                }

                self.typing.trigger(at);
                self.user.trigger(at);
            }

            EventKind::Edit { source } => {
                let same_typing = self.store.editor_interval().is_some_and(|iv| {
                    iv.ty == IntervalType::Typing && iv.source.as_ref() == Some(&source)
                });
                if !same_typing {
                    // Lazy promotion: a keystroke anywhere else becomes a
                    // fresh edit start on that source.
                    return self.update(EventKind::EditStart { source }, at);
                }

                self.typing.trigger(at);
                self.user.trigger(at);
            }

            EventKind::EditorPassive { source } => {
                let current = self.store.editor_interval();
                let same_source = current.is_some_and(|iv| iv.source.as_ref() == Some(&source));
                if !same_source {
                    let previous = current.map(|iv| iv.id);
                    let document = self.resolver.resolve(&source);
                    if let Some(id) = previous {
                        self.store.close(id, at);
                    }
                    if let Some(document) = document {
                        self.store
                            .open_editor(IntervalType::Reading, at, source, document)?;
                    }
                }

                self.reading.trigger(at);
                self.user.trigger(at);
            }

            EventKind::FocusLost => {
                if let Some(id) = self.store.editor_interval().map(|iv| iv.id) {
                    self.store.close(id, at);
                }
                self.reading.cancel();
                self.typing.cancel();
            }

            EventKind::UserInactivity => {
                if let Some(id) = self
                    .store
                    .open_of_type(IntervalType::UserActive)
                    .map(|iv| iv.id)
                {
                    self.store.close(id, at);
                }
                // User-level inactivity supersedes the finer channels.
                self.typing.cancel();
                self.reading.cancel();
            }

            EventKind::TypingInactivity => {
                if let Some(id) = self
                    .store
                    .editor_interval()
                    .filter(|iv| iv.ty == IntervalType::Typing)
                    .map(|iv| iv.id)
                {
                    self.store.close(id, at);
                }
            }

            EventKind::ReadingInactivity => {
                if let Some(id) = self
                    .store
                    .editor_interval()
                    .filter(|iv| iv.ty == IntervalType::Reading)
                    .map(|iv| iv.id)
                {
                    self.store.close(id, at);
                }
            }
        }

        Ok(())
    }
}

// ─── Tests ────────────────────────────────────────────────────────
