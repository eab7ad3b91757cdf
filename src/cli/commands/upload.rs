//! `ragents upload` - push documents into the agents' indexes.

use colored::*;

use crate::cli::args::UploadArgs;
use crate::cli::context::CommandContext;
use crate::cli::error::CliResult;
use crate::ingest::Ingestor;
use crate::service;

/// Upload one file, or walk the mapped folders under `--root`.
pub async fn run(ctx: &CommandContext, args: &UploadArgs) -> CliResult<()> {
    let indexes = service::load_index_registry(&ctx.loader)?;
    let ingestor = Ingestor::new(ctx.backend()?, indexes, &ctx.loader.config.ingest);

    if let (Some(agent), Some(file)) = (&args.agent, &args.file) {
        let registry = ctx.registry()?;
        let agent = registry.resolve(agent)?;
        let receipt = ingestor.upload_one(&agent.name, file).await?;
        println!(
            "{} {} -> {} ({})",
            "[OK]".green().bold(),
            receipt.filename,
            receipt.index_key,
            receipt.file_id
        );
        return Ok(());
    }

    let summary = ingestor.upload_folders(&args.root).await;
    println!("\n{}", "=== Upload summary ===".bold());
    println!("{}", summary);
    if summary.failed > 0 {
        println!("{}", "Some files failed; see the warnings above.".yellow());
    }
    if let Some(logger) = ctx.logger(None) {
        let level = if summary.failed > 0 { "WARN" } else { "INFO" };
        if let Err(e) = logger.log_custom("Upload summary", &summary.to_string(), Some(level)) {
            tracing::warn!(error = %e, "could not write interaction log");
        }
    }
    Ok(())
}
