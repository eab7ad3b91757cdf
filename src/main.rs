use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ragents::cli::{self, utils::display_error_with_suggestions, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            display_error_with_suggestions(&e, "ragents failed");
            ExitCode::from(e.exit_code())
        }
    }
}
