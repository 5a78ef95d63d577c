//! `hts-stream`: print HTS hand tracking telemetry as JSON lines.
//!
//! Events go to stdout, one JSON object per line. Diagnostics go to stderr
//! through `tracing`, filtered by `RUST_LOG` (default `info`).
//!
//! ```text
//! hts-stream --mode tcp_server --port 9000 --output both --right-handed
//! ```
//!
//! Ctrl-C closes the receiver and the process exits after printing the
//! final counters.

mod args;
mod output;

use clap::Parser;
use hts_client::Client;
use tracing_subscriber::EnvFilter;

use crate::{args::Args, output::JsonLines};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut client = Client::connect(args.client_config()).await?;

    let close = client.close_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupted, closing receiver");
            close.close();
        }
    });

    let mut out = JsonLines::new(std::io::stdout().lock()).right_handed(args.right_handed);
    let result = client.run(|event| out.write_event(event).map_err(Into::into), args.max_events).await;

    let stats = client.stats();
    tracing::info!(
        lines_received = stats.lines_received,
        parse_errors = stats.parse_errors,
        packets_emitted = stats.packets_emitted,
        frames_emitted = stats.frames_emitted,
        "stream finished"
    );

    let events = result?;
    tracing::debug!(events, "events written");
    Ok(())
}
