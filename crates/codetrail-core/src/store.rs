//! Append-only interval store.
//!
//! Holds every interval of one tracking session in creation order and
//! answers "which interval of this type/track is currently open". The
//! dispatcher is the only writer; mutual exclusion per track is checked
//! here, but deciding *when* to close and reopen is the dispatcher's job.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::types::{
    DocumentRef, Interval, IntervalId, IntervalType, SourceId, TestRunRecord, Track, TrackerError,
};

#[derive(Debug, Default)]
pub struct IntervalStore {
    intervals: Vec<Interval>,
    /// Open interval per track. `Track::Run` never appears here.
    open: HashMap<Track, IntervalId>,
}

impl IntervalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new interval with no editor payload. Rejects if the track is
    /// already occupied — the caller must close first.
    pub fn open(&mut self, ty: IntervalType, start: DateTime<Utc>) -> Result<IntervalId, TrackerError> {
        self.push_open(ty, start, None, None)
    }

    /// Open a typing/reading interval bound to its source and resolved
    /// document.
    pub fn open_editor(
        &mut self,
        ty: IntervalType,
        start: DateTime<Utc>,
        source: SourceId,
        document: DocumentRef,
    ) -> Result<IntervalId, TrackerError> {
        self.push_open(ty, start, Some(source), Some(document))
    }

    /// Append an already-complete test-run record. No open/close semantics
    /// and no track check; the end is clamped to the start.
    pub fn append_test_run(
        &mut self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        record: TestRunRecord,
    ) -> IntervalId {
        let id = IntervalId(self.intervals.len() as u64);
        self.intervals.push(Interval {
            id,
            ty: IntervalType::TestRun,
            start,
            end: Some(end.max(start)),
            source: None,
            document: None,
            test_run: Some(record),
        });
        id
    }

    fn push_open(
        &mut self,
        ty: IntervalType,
        start: DateTime<Utc>,
        source: Option<SourceId>,
        document: Option<DocumentRef>,
    ) -> Result<IntervalId, TrackerError> {
        let track = ty.track();
        if let Some(&open_id) = self.open.get(&track) {
            let open = self.intervals[open_id.0 as usize].ty;
            return Err(TrackerError::TrackOccupied {
                track,
                open,
                requested: ty,
            });
        }
        let id = IntervalId(self.intervals.len() as u64);
        self.intervals.push(Interval {
            id,
            ty,
            start,
            end: None,
            source,
            document,
            test_run: None,
        });
        self.open.insert(track, id);
        Ok(id)
    }

    /// The open interval matching exactly `ty` (perspective kind included),
    /// if any.
    pub fn open_of_type(&self, ty: IntervalType) -> Option<&Interval> {
        self.open_in_track(ty.track()).filter(|iv| iv.ty == ty)
    }

    /// The open interval of the given track, whatever its concrete type.
    pub fn open_in_track(&self, track: Track) -> Option<&Interval> {
        self.open
            .get(&track)
            .map(|id| &self.intervals[id.0 as usize])
    }

    /// The open typing or reading interval, if any.
    pub fn editor_interval(&self) -> Option<&Interval> {
        self.open_in_track(Track::Editor)
    }

    /// Close an interval. Idempotent: unknown ids and already-closed
    /// intervals are no-ops, and a closed end is never altered. The end is
    /// clamped so `end >= start` always holds.
    pub fn close(&mut self, id: IntervalId, at: DateTime<Utc>) {
        let Some(interval) = self.intervals.get_mut(id.0 as usize) else {
            return;
        };
        if interval.is_closed() {
            return;
        }
        interval.end = Some(at.max(interval.start));
        self.open.remove(&interval.ty.track());
    }

    /// Close every open interval across all tracks (session shutdown).
    pub fn close_all(&mut self, at: DateTime<Utc>) {
        for (_, id) in self.open.drain() {
            let interval = &mut self.intervals[id.0 as usize];
            interval.end = Some(at.max(interval.start));
        }
    }

    pub fn get(&self, id: IntervalId) -> Option<&Interval> {
        self.intervals.get(id.0 as usize)
    }

    /// All intervals in append order, open and closed.
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn into_intervals(self) -> Vec<Interval> {
        self.intervals
    }

    pub fn closed(&self) -> impl Iterator<Item = &Interval> {
        self.intervals.iter().filter(|iv| iv.is_closed())
    }

    pub fn open_count(&self) -> usize {
        self.open.len()
    }
}

// ─── Tests ────────────────────────────────────────────────────────
