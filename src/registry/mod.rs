//! Agent and document-index registries.
//!
//! Both registries are loaded once from flat `KEY=VALUE` files and are
//! read-only afterwards, so a loaded registry can be shared between
//! concurrent `ask` calls without locking.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ragents::registry::{AgentRegistry, RegistryLayout};
//! use std::path::Path;
//!
//! let registry = AgentRegistry::load(Path::new("agent_ids.env"), &RegistryLayout::default())?;
//! let handle = registry.resolve("comercial")?;
//! println!("{} -> {}", handle.name, handle.remote_id);
//! # Ok::<(), ragents::registry::RegistryError>(())
//! ```

mod agents;
mod error;
mod index;
mod store;

pub use agents::{
    AgentHandle, AgentRegistry, RegistryLayout, DEFAULT_AGENT_NAMES, DEFAULT_AGENT_PREFIX,
};
pub use error::{RegistryError, RegistryResult};
pub use index::{IndexRegistry, DEFAULT_INDEX_PREFIX};
pub use store::{parse_key_values, read_key_values};
