//! Live tracking session: NDJSON events on stdin, intervals on stdout.

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use codetrail_core::resolver::PathResolver;
use codetrail_core::summary::summarize;
use codetrail_core::types::EventRecord;

use crate::cli::TrackOpts;
use crate::output;
use crate::session_loop;

pub async fn cmd_track(opts: &TrackOpts) -> anyhow::Result<()> {
    let (tx, rx) = mpsc::channel(256);
    let reader = tokio::spawn(read_events(tx));

    let store = session_loop::run_session(rx, PathResolver::new(), opts.timeout_ms)
        .await
        .context("session dispatch failed")?;

    reader.abort();
    let _ = reader.await;

    let intervals = store.into_intervals();
    output::emit_intervals(&intervals, false)?;
    if opts.summary {
        output::emit_summary(&summarize(&intervals))?;
    }

    Ok(())
}

/// Forward stdin lines as events until EOF, interrupt, or session end
/// (receiver dropped). Events missing a timestamp are stamped with now by
/// the session loop.
async fn read_events(tx: mpsc::Sender<EventRecord>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<EventRecord>(line) {
                        Ok(record) => {
                            if tx.send(record).await.is_err() {
                                break;
                            }
                        }
                        // One malformed line must not take the session down.
                        Err(e) => tracing::warn!("skipping malformed event line: {e}"),
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("stdin read failed: {e}");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupt received, ending session");
                break;
            }
        }
    }
}
