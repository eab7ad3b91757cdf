//! Command-line arguments.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Ask retrieval-backed assistants and manage their documents.
#[derive(Debug, Parser)]
#[command(name = "ragents", version, about)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// .env file to load before reading the environment
    #[arg(long, global = true, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Agent registry file (overrides the configured one)
    #[arg(long, global = true, value_name = "PATH")]
    pub agents_file: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ask an agent a question
    Ask(AskArgs),
    /// List registered agents
    Agents,
    /// Upload documents into the agents' indexes
    Upload(UploadArgs),
}

/// Arguments of `ragents ask`.
#[derive(Debug, Args)]
pub struct AskArgs {
    /// Agent name (e.g. comercial, soporte, documental)
    pub agent: String,

    /// The question
    #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
    pub question: Vec<String>,

    /// Stream progress while the run executes
    #[arg(long)]
    pub stream: bool,

    /// Extra instructions for this question
    #[arg(long, value_name = "TEXT")]
    pub extra: Option<String>,

    /// Continue an existing conversation
    #[arg(long, value_name = "ID", conflicts_with = "stream")]
    pub thread: Option<String>,

    /// Write a markdown interaction log to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl AskArgs {
    /// Question words joined with spaces.
    pub fn question_text(&self) -> String {
        self.question.join(" ")
    }
}

/// Arguments of `ragents upload`.
#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Directory holding the mapped document folders
    #[arg(long, default_value = ".", value_name = "DIR")]
    pub root: PathBuf,

    /// Upload a single file for this agent instead of walking folders
    #[arg(long, requires = "file", value_name = "NAME")]
    pub agent: Option<String>,

    /// File to upload with --agent
    #[arg(long, requires = "agent", value_name = "PATH")]
    pub file: Option<PathBuf>,
}
