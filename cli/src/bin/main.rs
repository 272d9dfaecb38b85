use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use vault_message_cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let opts = Cli::parse();

    let default_level = if opts.verbose { "debug" } else { "warn" };
    // Logs go to stderr so stdout stays machine readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    vault_message_cli::entry(opts, &mut std::io::stdout()).await
}
