//! `ragents agents` - list registered agents.

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};

use crate::cli::context::CommandContext;
use crate::cli::error::CliResult;
use crate::registry::AgentRegistry;

/// Print the agent table.
pub fn run(ctx: &CommandContext) -> CliResult<()> {
    let registry = ctx.registry()?;
    println!("{}", agents_table(&registry));
    println!("Source: {}", registry.source().display());
    Ok(())
}

/// Table of agent names and their remote assistant ids.
pub fn agents_table(registry: &AgentRegistry) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Agent", "Assistant id"]);

    for name in registry.names() {
        if let Ok(handle) = registry.resolve(&name) {
            table.add_row(vec![handle.name.clone(), handle.remote_id.clone()]);
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::AgentHandle;

    #[test]
    fn test_agents_table_lists_every_agent() {
        let registry = AgentRegistry::from_handles([
            AgentHandle {
                name: "soporte".to_string(),
                remote_id: "asst_2".to_string(),
            },
            AgentHandle {
                name: "comercial".to_string(),
                remote_id: "asst_1".to_string(),
            },
        ]);
        let rendered = agents_table(&registry).to_string();
        assert!(rendered.contains("comercial"));
        assert!(rendered.contains("asst_2"));
        assert!(rendered.find("comercial").unwrap() < rendered.find("soporte").unwrap());
    }
}
