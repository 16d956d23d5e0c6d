mod init;
mod outputs;
mod plan;
mod site;
mod synth;

pub use init::cmd_init;
pub use outputs::cmd_outputs;
pub use plan::cmd_plan;
pub use site::{SiteOptions, cmd_site};
pub use synth::cmd_synth;

use std::path::Path;

use anyhow::{Context, Result};

use thumbstack_lib::config::{StackConfig, load_config};
use thumbstack_lib::graph::ResourceGraph;
use thumbstack_lib::stack::StackBuilder;

/// Load the config and assemble its graph.
fn assemble(config: &Path) -> Result<(StackConfig, ResourceGraph)> {
  let stack = load_config(config).with_context(|| format!("Failed to load config: {}", config.display()))?;
  let graph = StackBuilder::new(&stack)
    .build()
    .with_context(|| format!("Failed to assemble stack '{}'", stack.stack.name))?;
  Ok((stack, graph))
}
