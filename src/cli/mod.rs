//! The `ragents` command-line interface.
//!
//! # Commands
//!
//! - `ragents ask <agent> <question...> [--stream] [--extra <text>]`
//! - `ragents agents`
//! - `ragents upload [--root <dir>] [--agent <name> --file <path>]`
//!
//! Global options `--config`, `--env-file` and `--agents-file` apply to
//! every command.

pub mod args;
pub mod commands;
pub mod context;
pub mod error;
pub mod utils;

// Re-exports for convenience
pub use args::{AskArgs, Cli, Command, UploadArgs};
pub use context::CommandContext;
pub use error::{CliError, CliResult};

/// Run the parsed command line.
pub async fn run(cli: Cli) -> CliResult<()> {
    let ctx = CommandContext::from_cli(&cli)?;
    match &cli.command {
        Command::Ask(args) => commands::ask::run(&ctx, args).await,
        Command::Agents => commands::agents::run(&ctx),
        Command::Upload(args) => commands::upload::run(&ctx, args).await,
    }
}
