use tracing::{debug, info};

use crate::config::StackConfig;
use crate::graph::{GraphBuilder, ProviderBinding, ResourceGraph};

use super::StackError;
use super::bucket::{BucketNaming, assemble_buckets};
use super::failure::assemble_failure_channel;
use super::frontend::assemble_frontend;
use super::gateway::assemble_gateway;
use super::resize::assemble_resize;

/// Assembles the full thumbnail stack from one config.
///
/// The only side effect is reading function source directories to hash
/// them. Any defect aborts the build; no partial graph is returned.
#[derive(Debug)]
pub struct StackBuilder<'a> {
  config: &'a StackConfig,
}

impl<'a> StackBuilder<'a> {
  pub fn new(config: &'a StackConfig) -> Self {
    Self { config }
  }

  pub fn providers(&self) -> Vec<ProviderBinding> {
    let mut aws = ProviderBinding::new("aws");
    if let Some(region) = &self.config.stack.region {
      aws = aws.with("region", region);
    }

    let mut providers = vec![aws];
    if self.config.frontend.is_some() {
      providers.push(ProviderBinding::new("local"));
    }
    providers
  }

  pub fn build(&self) -> Result<ResourceGraph, StackError> {
    let config = self.config;
    config.validate()?;

    info!(stack = %config.stack.name, "assembling stack");
    let mut graph = GraphBuilder::new(&config.stack.name);
    for provider in self.providers() {
      debug!(provider = %provider.name, "registered provider");
      graph.register_provider(provider);
    }

    let naming = BucketNaming {
      bucket_prefix: &config.stack.bucket_prefix,
      app_prefix: &config.stack.app_prefix,
    };

    let failure = assemble_failure_channel(&config.failure);
    let dead_letter = config.resize.dead_letter.then(|| failure.topic.attr("arn"));
    graph.extend(failure.declarations)?;

    graph.extend(assemble_resize(config, dead_letter.as_ref())?)?;
    graph.extend(assemble_buckets(&config.buckets, naming)?)?;
    graph.extend(assemble_gateway(config, &config.gateway.functions)?)?;

    if let Some(frontend) = &config.frontend {
      let env_file = config.resolve_path(&frontend.env_file).display().to_string();
      graph.extend(assemble_frontend(frontend, naming, env_file))?;
    }

    Ok(graph.finalize()?)
  }
}
