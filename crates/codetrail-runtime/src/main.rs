//! codetrail: editor activity interval tracker binary.
//! Host adapters feed NDJSON events in; closed interval timelines come out.

use clap::Parser;

mod cli;
mod cmd_replay;
mod cmd_track;
mod output;
mod session_loop;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = std::env::var("CODETRAIL_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    // stdout carries the interval stream; diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Cli::parse();
    match args.command {
        cli::Command::Track(opts) => cmd_track::cmd_track(&opts).await?,
        cli::Command::Replay(opts) => cmd_replay::cmd_replay(&opts).await?,
    }

    Ok(())
}
