use clap::Parser;
use scripts::{cli::Cli, constants::DEFAULT_LOG_FILTER, errors::ScriptError};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ScriptError> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let (config, command) = cli.into_parts();
    command
        .run(&config)
        .await
        .inspect_err(|e| error!("{}", e))
}
