use anyhow::Context;
use burnout_tracker::cli::{self, Session};
use burnout_tracker::config::ClientConfig;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ClientConfig::from_env();
    config.ensure_dirs()?;

    // Logs go to a daily file so they do not interleave with the REPL.
    let file_appender = tracing_appender::rolling::daily(config.log_dir(), "burnout-tracker.log");
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .init();

    let mut session = Session::open(&config)
        .with_context(|| format!("opening session in {}", config.state_dir.display()))?;

    eprintln!("🔥 Burnout Tracker v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: {}", config.api_url);
    eprintln!("   State: {}", config.state_dir.display());
    eprintln!("   Logs: {}", config.log_dir().display());
    eprintln!("   Type 'help' for commands, 'quit' to exit.\n");

    tracing::info!(api_url = %config.api_url, "Burnout Tracker started");

    cli::run(&mut session, BufReader::new(tokio::io::stdin())).await?;

    tracing::info!("Burnout Tracker stopped");
    Ok(())
}
