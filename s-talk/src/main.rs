//! Entry point for `s-talk`.
//!
//! Parses CLI arguments, opens the UDP transport and runs one chat session
//! on stdin/stdout.  All chat logic is delegated to library modules;
//! `main.rs` owns only process setup (logging, argument parsing, exit code).

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use s_talk::config::{Config, DEFAULT_POLL_INTERVAL};
use s_talk::terminal::{ChunkedInput, ChunkedOutput};
use s_talk::{Session, UdpTransport};

/// Two-party text chat over UDP. Type `!` on a line of its own to quit.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Local UDP port to listen on.
    local_port: u16,

    /// Host name or address of the peer.
    remote_host: String,

    /// UDP port the peer listens on.
    remote_port: u16,

    /// Node budget shared by the outbound and inbound queues.
    #[arg(long, default_value_t = cursor_list::pool::DEFAULT_NODE_CAPACITY)]
    node_capacity: usize,

    /// Bound each queue to this many pending messages (producers wait).
    #[arg(long)]
    queue_capacity: Option<usize>,

    /// How often, in milliseconds, the receiver checks for shutdown.
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL.as_millis() as u64)]
    poll_ms: u64,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        let mut config = Config::new(cli.local_port, cli.remote_host, cli.remote_port);
        config.node_capacity = cli.node_capacity;
        config.queue_capacity = cli.queue_capacity;
        config.poll_interval = Duration::from_millis(cli.poll_ms);
        config
    }
}

fn main() -> Result<()> {
    // Logs go to stderr; set RUST_LOG to control verbosity.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from(Cli::parse());
    config.validate()?;

    let transport = UdpTransport::open(&config).context("cannot open UDP transport")?;
    log::info!(
        "Listening on {}, talking to {}",
        transport.local_addr,
        transport.remote_addr
    );

    let session = Session::start(
        &config,
        transport,
        ChunkedInput::stdin(),
        ChunkedOutput::stdout(),
    )?;
    let report = session.wait();

    if let Some((role, e)) = report.errors().next() {
        bail!("{role} failed: {e}");
    }
    // Returning ends the process, including a reader still blocked on stdin.
    Ok(())
}
