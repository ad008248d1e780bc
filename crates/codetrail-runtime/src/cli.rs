//! CLI definition using clap derive.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "codetrail", about = "editor activity interval tracker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a live tracking session over NDJSON events on stdin
    Track(TrackOpts),
    /// Replay a recorded event log with its original timestamps
    Replay(ReplayOpts),
}

#[derive(clap::Args)]
pub struct TrackOpts {
    /// Inactivity timeout in milliseconds, shared by all notifier channels
    #[arg(long, default_value = "16000", env = "CODETRAIL_TIMEOUT_MS")]
    pub timeout_ms: u64,

    /// Append an aggregate per-type summary after the interval stream
    #[arg(long)]
    pub summary: bool,
}

#[derive(clap::Args)]
pub struct ReplayOpts {
    /// Path to the NDJSON event log
    #[arg(long)]
    pub log: PathBuf,

    /// Inactivity timeout in milliseconds, shared by all notifier channels
    #[arg(long, default_value = "16000", env = "CODETRAIL_TIMEOUT_MS")]
    pub timeout_ms: u64,

    /// Append an aggregate per-type summary after the interval stream
    #[arg(long)]
    pub summary: bool,

    /// Pretty-print the interval sequence instead of NDJSON
    #[arg(long)]
    pub pretty: bool,
}
