//! Interval and summary output on stdout.

use codetrail_core::summary::ActivitySummary;
use codetrail_core::types::Interval;

/// NDJSON by default (one interval per line), or a pretty-printed array.
pub fn emit_intervals(intervals: &[Interval], pretty: bool) -> anyhow::Result<()> {
    if pretty {
        println!("{}", serde_json::to_string_pretty(intervals)?);
    } else {
        for interval in intervals {
            println!("{}", serde_json::to_string(interval)?);
        }
    }
    Ok(())
}

pub fn emit_summary(summary: &ActivitySummary) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(summary)?);
    Ok(())
}
