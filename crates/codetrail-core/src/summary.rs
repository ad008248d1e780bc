//! Aggregate session report: closed time per interval type.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::Interval;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeTotal {
    pub count: u64,
    pub total_ms: i64,
}

/// Per-type totals over the closed intervals of a session. Open intervals
/// have no duration yet and are only counted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySummary {
    pub totals: BTreeMap<String, TypeTotal>,
    pub open_intervals: u64,
}

pub fn summarize(intervals: &[Interval]) -> ActivitySummary {
    let mut summary = ActivitySummary::default();
    for interval in intervals {
        let Some(end) = interval.end else {
            summary.open_intervals += 1;
            continue;
        };
        let entry = summary
            .totals
            .entry(interval.ty.label().to_string())
            .or_default();
        entry.count += 1;
        entry.total_ms += (end - interval.start).num_milliseconds();
    }
    summary
}

// ─── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{IntervalId, IntervalType, PerspectiveKind};
    use chrono::{DateTime, TimeDelta, Utc};

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().expect("valid RFC3339")
    }

    fn interval(id: u64, ty: IntervalType, start: &str, secs: Option<i64>) -> Interval {
        let start = ts(start);
        Interval {
            id: IntervalId(id),
            ty,
            start,
            end: secs.map(|s| start + TimeDelta::seconds(s)),
            source: None,
            document: None,
            test_run: None,
        }
    }

    #[test]
    fn totals_accumulate_per_type() {
        let intervals = vec![
            interval(0, IntervalType::Typing, "2026-03-01T09:00:00Z", Some(10)),
            interval(1, IntervalType::Typing, "2026-03-01T09:01:00Z", Some(5)),
            interval(2, IntervalType::Reading, "2026-03-01T09:02:00Z", Some(30)),
        ];
        let summary = summarize(&intervals);

        assert_eq!(
            summary.totals.get("typing"),
            Some(&TypeTotal {
                count: 2,
                total_ms: 15_000,
            })
        );
        assert_eq!(
            summary.totals.get("reading"),
            Some(&TypeTotal {
                count: 1,
                total_ms: 30_000,
            })
        );
        assert_eq!(summary.open_intervals, 0);
    }

    #[test]
    fn perspective_kinds_are_summarized_separately() {
        let intervals = vec![
            interval(
                0,
                IntervalType::Perspective(PerspectiveKind::Java),
                "2026-03-01T09:00:00Z",
                Some(60),
            ),
            interval(
                1,
                IntervalType::Perspective(PerspectiveKind::Debug),
                "2026-03-01T09:01:00Z",
                Some(20),
            ),
        ];
        let summary = summarize(&intervals);
        assert!(summary.totals.contains_key("perspective_java"));
        assert!(summary.totals.contains_key("perspective_debug"));
    }

    #[test]
    fn open_intervals_are_counted_not_totalled() {
        let intervals = vec![
            interval(0, IntervalType::SessionOpen, "2026-03-01T09:00:00Z", None),
            interval(1, IntervalType::Typing, "2026-03-01T09:00:00Z", Some(10)),
        ];
        let summary = summarize(&intervals);
        assert_eq!(summary.open_intervals, 1);
        assert!(!summary.totals.contains_key("session_open"));
    }

    #[test]
    fn empty_timeline_yields_empty_summary() {
        let summary = summarize(&[]);
        assert!(summary.totals.is_empty());
        assert_eq!(summary.open_intervals, 0);
    }
}
