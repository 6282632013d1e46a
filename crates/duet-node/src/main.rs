//! Duet node binary.
//!
//! # Usage
//!
//! ```bash
//! # Two terminals on one machine
//! duet-node --preset alice
//! duet-node --preset bob
//!
//! # Custom identity
//! duet-node --name Carol --peer-name Dave --bind 0.0.0.0:6000 \
//!     --peer-url http://localhost:6001 --p 101 --q 103
//! ```

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use duet_core::RetryPolicy;
use duet_node::{Console, Node, NodeConfig, Preset, default_transcript_path};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Duet peer node
#[derive(Parser, Debug)]
#[command(name = "duet-node")]
#[command(about = "Two-party chat over textbook RSA and HTTP")]
#[command(version)]
struct Args {
    /// Built-in identity to start from
    #[arg(long, value_enum, default_value = "alice")]
    preset: Preset,

    /// Our display name
    #[arg(long)]
    name: Option<String>,

    /// Peer's display name
    #[arg(long)]
    peer_name: Option<String>,

    /// Address to listen on
    #[arg(short, long)]
    bind: Option<String>,

    /// Base URL of the peer's listener
    #[arg(long)]
    peer_url: Option<String>,

    /// First prime for key generation
    #[arg(long)]
    p: Option<u64>,

    /// Second prime for key generation
    #[arg(long)]
    q: Option<u64>,

    /// Transcript file (default: <name>_chat.log)
    #[arg(long)]
    transcript: Option<PathBuf>,

    /// Key delivery attempts
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Seconds between key delivery attempts
    #[arg(long)]
    retry_delay_secs: Option<u64>,

    /// Seconds to wait for the peer's key
    #[arg(long)]
    handshake_timeout_secs: Option<u64>,

    /// Per-request HTTP timeout in seconds
    #[arg(long)]
    request_timeout_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Args {
    /// Start from the preset and apply every flag that was given.
    fn into_config(self) -> NodeConfig {
        let mut config = NodeConfig::preset(self.preset);

        if let Some(name) = self.name {
            if self.transcript.is_none() {
                config.transcript_path = default_transcript_path(&name);
            }
            config.name = name;
        }
        if let Some(peer_name) = self.peer_name {
            config.peer_name = peer_name;
        }
        if let Some(bind) = self.bind {
            config.bind_address = bind;
        }
        if let Some(peer_url) = self.peer_url {
            config.peer_url = peer_url;
        }
        if let Some(p) = self.p {
            config.p = p;
        }
        if let Some(q) = self.q {
            config.q = q;
        }
        if let Some(path) = self.transcript {
            config.transcript_path = path;
        }
        config.retry = RetryPolicy::new(
            self.max_attempts.unwrap_or(config.retry.max_attempts),
            self.retry_delay_secs.map_or(config.retry.delay, Duration::from_secs),
        );
        if let Some(secs) = self.handshake_timeout_secs {
            config.handshake_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.request_timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }

        config
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = args.into_config();
    tracing::info!(name = %config.name, peer = %config.peer_name, "Duet node starting");

    let (console, printer) = Console::spawn(tokio::io::stdout());
    let node = Node::bind(config, console.clone()).await?;
    tracing::info!("Listening on {}", node.local_addr());

    let result = node.run().await;

    drop(console);
    if let Err(e) = printer.await {
        tracing::warn!(error = %e, "console writer stopped");
    }

    result?;
    Ok(())
}
