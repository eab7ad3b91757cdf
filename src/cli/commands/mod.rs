//! CLI command implementations
//!
//! One module per subcommand. Each takes the shared [`CommandContext`]
//! and its parsed arguments.
//!
//! [`CommandContext`]: crate::cli::context::CommandContext

pub mod agents;
pub mod ask;
pub mod upload;
