//! Replay a recorded event log with its original timestamps.

use anyhow::{Context, bail};

use codetrail_core::replay::{parse_event_log, replay};
use codetrail_core::resolver::PathResolver;
use codetrail_core::summary::summarize;

use crate::cli::ReplayOpts;
use crate::output;

pub async fn cmd_replay(opts: &ReplayOpts) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&opts.log)
        .with_context(|| format!("read event log {}", opts.log.display()))?;
    let intervals = replay_log(&text, opts.timeout_ms)?;

    output::emit_intervals(&intervals, opts.pretty)?;
    if opts.summary {
        output::emit_summary(&summarize(&intervals))?;
    }

    Ok(())
}

fn replay_log(
    text: &str,
    timeout_ms: u64,
) -> anyhow::Result<Vec<codetrail_core::types::Interval>> {
    let records = parse_event_log(text).context("parse event log")?;

    let mut stamped = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        let Some(at) = record.at else {
            bail!("record {} has no timestamp; replay requires recorded timestamps", index + 1);
        };
        stamped.push((at, record.event));
    }

    tracing::info!("replaying {} events", stamped.len());
    Ok(replay(stamped, PathResolver::new(), timeout_ms)?)
}

// ─── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use codetrail_core::types::IntervalType;

    const LOG: &str = concat!(
        r#"{"at":"2026-03-01T09:00:00Z","type":"session_start"}"#,
        "\n",
        r#"{"at":"2026-03-01T09:00:01Z","type":"edit_start","source":"src/lib.rs"}"#,
        "\n",
        r#"{"at":"2026-03-01T09:00:40Z","type":"session_end"}"#,
        "\n",
    );

    #[test]
    fn replay_log_produces_a_closed_timeline() {
        let intervals = replay_log(LOG, 16_000).expect("replay");
        assert!(intervals.iter().all(|iv| iv.is_closed()));
        let typing = intervals
            .iter()
            .find(|iv| iv.ty == IntervalType::Typing)
            .expect("typing interval");
        // Closed by typing inactivity at +1s+16s, before the session end.
        assert_eq!(
            typing.end,
            Some("2026-03-01T09:00:17Z".parse().expect("valid RFC3339"))
        );
    }

    #[test]
    fn replay_log_is_deterministic() {
        let first = replay_log(LOG, 16_000).expect("replay");
        let second = replay_log(LOG, 16_000).expect("replay");
        assert_eq!(first, second);
    }

    #[test]
    fn replay_log_rejects_missing_timestamps() {
        let log = r#"{"type":"session_start"}"#;
        let err = replay_log(log, 16_000).expect_err("must require timestamps");
        assert!(err.to_string().contains("no timestamp"));
    }

    #[test]
    fn replay_log_rejects_malformed_lines() {
        let log = "{\"type\":\"session_start\",\"at\":\"2026-03-01T09:00:00Z\"}\nnot json\n";
        assert!(replay_log(log, 16_000).is_err());
    }
}
