// ABOUTME: Main entry point for the Mirror-Watch CLI
// Watches the working directory and streams changes to the remote mirror

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use mirror_watch::config::{WatchConfig, DEFAULT_MAX_FILE_SIZE, DEFAULT_PORT};
use mirror_watch::remote::RemoteSession;
use mirror_watch::watcher::{ContentPolicy, IgnoreSet, ProjectWatcher};

/// Streams local project file changes to a remote mirror in near real time.
#[derive(Debug, Parser)]
#[command(name = "mirror-watch", version, about)]
struct Cli {
    /// Project identifier announced on connect
    #[arg(long)]
    name: String,

    /// Full remote address; derived from the local network address when absent
    #[arg(long)]
    domain: Option<String>,

    /// Port used when deriving the default domain
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Byte ceiling for inlining file content into events
    #[arg(long, default_value_t = DEFAULT_MAX_FILE_SIZE)]
    max_file_size: u64,

    /// Glob pattern to ignore; may be repeated
    #[arg(long = "exclude")]
    exclude: Vec<String>,

    /// Print a diagnostic line for each detected change
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.debug);

    let config = WatchConfig::new(
        cli.name,
        cli.domain,
        cli.port,
        cli.max_file_size,
        cli.exclude,
        cli.debug,
    );

    // A malformed pattern is fatal: the ignore predicate cannot be trusted
    let ignore = IgnoreSet::compile(&config.exclude).context("Cannot compile exclusion patterns")?;
    let policy = ContentPolicy::new(config.max_file_size);

    let session = RemoteSession::new(&config);
    session.connect();

    let cwd = std::env::current_dir().context("Cannot resolve working directory")?;
    let watcher = ProjectWatcher::new(cwd, ignore, policy, session);

    tokio::select! {
        result = watcher.run() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down");
            Ok(())
        }
    }
}

fn setup_logging(debug: bool) {
    use tracing_subscriber::prelude::*;

    let default_filter = if debug {
        "mirror_watch=debug"
    } else {
        "mirror_watch=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}
