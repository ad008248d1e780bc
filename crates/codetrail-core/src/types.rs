use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ─── Perspective & Test Runs ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerspectiveKind {
    Java,
    Debug,
    Other,
}

impl PerspectiveKind {
    pub const ALL: [Self; 3] = [Self::Java, Self::Debug, Self::Other];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Java => "java",
            Self::Debug => "debug",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for PerspectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestOutcome {
    Passed,
    Failed,
    Aborted,
}

/// Result of an externally executed test run, delivered as an
/// already-complete interval record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRunRecord {
    pub outcome: TestOutcome,
    pub test_count: u32,
}

// ─── Source & Document ────────────────────────────────────────────

/// Opaque editor/session handle supplied by the host adapter.
/// Equality is identity: two events refer to the same editor iff their
/// handles compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(String);

impl SourceId {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Document metadata attached to editor-scoped intervals, produced by the
/// injected resolver capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub file_name: String,
    pub project: Option<String>,
    pub sloc: Option<u64>,
}

// ─── Interval Types & Tracks ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalType {
    /// The editor session exists (opened, not necessarily focused).
    SessionOpen,
    /// The editor window holds OS focus.
    WindowActive,
    /// The user is actively interacting with the editor.
    UserActive,
    Typing,
    Reading,
    Perspective(PerspectiveKind),
    /// An externally executed test run; always appended pre-closed.
    TestRun,
}

impl IntervalType {
    /// Mutual-exclusion class of this type. Track membership is a pure
    /// function of the type tag.
    pub fn track(self) -> Track {
        match self {
            Self::SessionOpen => Track::Session,
            Self::WindowActive => Track::Window,
            Self::UserActive => Track::User,
            Self::Typing | Self::Reading => Track::Editor,
            Self::Perspective(_) => Track::Perspective,
            Self::TestRun => Track::Run,
        }
    }

    /// Stable label used for summary keys and log output.
    pub fn label(self) -> &'static str {
        match self {
            Self::SessionOpen => "session_open",
            Self::WindowActive => "window_active",
            Self::UserActive => "user_active",
            Self::Typing => "typing",
            Self::Reading => "reading",
            Self::Perspective(PerspectiveKind::Java) => "perspective_java",
            Self::Perspective(PerspectiveKind::Debug) => "perspective_debug",
            Self::Perspective(PerspectiveKind::Other) => "perspective_other",
            Self::TestRun => "test_run",
        }
    }
}

impl fmt::Display for IntervalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Mutual-exclusion classes: at most one open interval per track at any
/// instant. `Run` intervals are appended already closed and never occupy
/// their track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Track {
    Session,
    Window,
    User,
    Editor,
    Perspective,
    Run,
}

// ─── Intervals ────────────────────────────────────────────────────

/// Handle into the interval store, assigned in append order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntervalId(pub u64);

/// One continuous span of a single activity type. Open iff `end` is
/// absent; never mutated again once closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub id: IntervalId,
    #[serde(rename = "type")]
    pub ty: IntervalType,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub source: Option<SourceId>,
    pub document: Option<DocumentRef>,
    pub test_run: Option<TestRunRecord>,
}

impl Interval {
    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    pub fn is_closed(&self) -> bool {
        self.end.is_some()
    }
}

// ─── Events ───────────────────────────────────────────────────────

/// Dispatcher inputs. Direct events come from the host adapter; the three
/// inactivity variants are synthetic, injected by the notifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    SessionStart,
    SessionEnd,
    WindowActive,
    WindowInactive,
    PerspectiveStart {
        kind: PerspectiveKind,
    },
    /// A finished test run, already complete — appended as-is.
    TestRun {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        record: TestRunRecord,
    },
    UserActivity,
    EditStart {
        source: SourceId,
    },
    Edit {
        source: SourceId,
    },
    /// Paint, caret movement, or focus gain without an edit.
    EditorPassive {
        source: SourceId,
    },
    FocusLost,
    UserInactivity,
    TypingInactivity,
    ReadingInactivity,
}

/// One entry of a recorded event log. A missing timestamp means "stamp
/// with now at ingestion time"; recorded logs fed to replay carry explicit
/// timestamps throughout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(default)]
    pub at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub event: EventKind,
}

impl EventRecord {
    pub fn stamped(self, now: DateTime<Utc>) -> (DateTime<Utc>, EventKind) {
        (self.at.unwrap_or(now), self.event)
    }
}

// ─── Error ────────────────────────────────────────────────────────

/// The one fatal condition in the core: the mutual-exclusion invariant was
/// violated upstream. Everything else degrades to a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    #[error("track {track:?} already holds an open {open} interval; cannot open {requested}")]
    TrackOccupied {
        track: Track,
        open: IntervalType,
        requested: IntervalType,
    },
}

// ─── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_membership_is_a_pure_function_of_the_tag() {
        assert_eq!(IntervalType::SessionOpen.track(), Track::Session);
        assert_eq!(IntervalType::WindowActive.track(), Track::Window);
        assert_eq!(IntervalType::UserActive.track(), Track::User);
        assert_eq!(IntervalType::Typing.track(), Track::Editor);
        assert_eq!(IntervalType::Reading.track(), Track::Editor);
        for kind in PerspectiveKind::ALL {
            assert_eq!(IntervalType::Perspective(kind).track(), Track::Perspective);
        }
        assert_eq!(IntervalType::TestRun.track(), Track::Run);
    }

    #[test]
    fn perspective_kinds_share_a_track_but_not_a_type() {
        let java = IntervalType::Perspective(PerspectiveKind::Java);
        let debug = IntervalType::Perspective(PerspectiveKind::Debug);
        assert_ne!(java, debug);
        assert_eq!(java.track(), debug.track());
    }

    #[test]
    fn interval_type_labels_are_distinct() {
        let all = [
            IntervalType::SessionOpen,
            IntervalType::WindowActive,
            IntervalType::UserActive,
            IntervalType::Typing,
            IntervalType::Reading,
            IntervalType::Perspective(PerspectiveKind::Java),
            IntervalType::Perspective(PerspectiveKind::Debug),
            IntervalType::Perspective(PerspectiveKind::Other),
            IntervalType::TestRun,
        ];
        let labels: std::collections::HashSet<_> = all.iter().map(|t| t.label()).collect();
        assert_eq!(labels.len(), all.len());
    }

    #[test]
    fn event_record_serde_roundtrip() {
        let record = EventRecord {
            at: Some("2026-03-01T09:00:00Z".parse().expect("valid RFC3339")),
            event: EventKind::EditStart {
                source: SourceId::new("src/main.rs"),
            },
        };
        let json = serde_json::to_string(&record).expect("serialize");
        let back: EventRecord = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(record, back);
    }

    #[test]
    fn event_record_tagged_representation() {
        let json = r#"{"at":"2026-03-01T09:00:00Z","type":"perspective_start","kind":"debug"}"#;
        let record: EventRecord = serde_json::from_str(json).expect("deserialize");
        assert_eq!(
            record.event,
            EventKind::PerspectiveStart {
                kind: PerspectiveKind::Debug
            }
        );
    }

    #[test]
    fn event_record_without_timestamp_is_stamped() {
        let json = r#"{"type":"user_activity"}"#;
        let record: EventRecord = serde_json::from_str(json).expect("deserialize");
        assert!(record.at.is_none());

        let now = "2026-03-01T09:00:00Z".parse().expect("valid RFC3339");
        let (at, event) = record.stamped(now);
        assert_eq!(at, now);
        assert_eq!(event, EventKind::UserActivity);
    }

    #[test]
    fn test_run_event_roundtrip() {
        let record = EventRecord {
            at: None,
            event: EventKind::TestRun {
                start: "2026-03-01T09:00:00Z".parse().expect("valid RFC3339"),
                end: "2026-03-01T09:00:12Z".parse().expect("valid RFC3339"),
                record: TestRunRecord {
                    outcome: TestOutcome::Failed,
                    test_count: 42,
                },
            },
        };
        let json = serde_json::to_string(&record).expect("serialize");
        let back: EventRecord = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(record, back);
    }

    #[test]
    fn interval_serde_roundtrip() {
        let interval = Interval {
            id: IntervalId(3),
            ty: IntervalType::Typing,
            start: "2026-03-01T09:00:00Z".parse().expect("valid RFC3339"),
            end: Some("2026-03-01T09:01:30Z".parse().expect("valid RFC3339")),
            source: Some(SourceId::new("src/lib.rs")),
            document: Some(DocumentRef {
                file_name: "lib.rs".to_string(),
                project: Some("codetrail".to_string()),
                sloc: Some(120),
            }),
            test_run: None,
        };
        let json = serde_json::to_string(&interval).expect("serialize");
        let back: Interval = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(interval, back);
    }

    #[test]
    fn error_display_names_both_types() {
        let err = TrackerError::TrackOccupied {
            track: Track::Editor,
            open: IntervalType::Reading,
            requested: IntervalType::Typing,
        };
        let msg = err.to_string();
        assert!(msg.contains("reading"));
        assert!(msg.contains("typing"));
    }
}
