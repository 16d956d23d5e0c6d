//! Asset + function pair shared by the resize and gateway assemblers.

use tracing::debug;

use crate::asset::artifact_from_source;
use crate::config::StackConfig;
use crate::reference::Deferred;
use crate::resource::{Declaration, DeployableFunction, LogicalId, Resource};

use super::{StackError, ids};

/// Declare the asset for `name` and the function deploying it.
///
/// The function copies the asset's freshly computed hash, so a source edit
/// always reaches the engine as a changed `source_code_hash`.
pub(super) fn function_group(
  config: &StackConfig,
  name: &str,
  dead_letter: Option<&Deferred>,
) -> Result<(Vec<Declaration>, LogicalId), StackError> {
  let source = config.function_source(name);
  let asset = artifact_from_source(&source).map_err(|source| StackError::Asset {
    function: name.to_string(),
    source,
  })?;
  debug!(function = %name, hash = %asset.hash, "hashed function source");

  let asset_id = ids::asset(name);
  let function_id = ids::function(name);
  let defaults = &config.function;

  let function = DeployableFunction {
    function_name: name.to_string(),
    runtime: defaults.runtime.clone(),
    handler: defaults.handler.clone(),
    role: defaults.role.clone(),
    timeout: defaults.timeout,
    filename: asset_id.attr("path").token(),
    source_code_hash: asset.hash.clone(),
    environment: defaults.environment.clone(),
    dead_letter_target: dead_letter.map(Deferred::token),
  };

  let declarations = vec![
    Declaration::new(asset_id, Resource::ArtifactAsset(asset)),
    Declaration::new(function_id.clone(), Resource::DeployableFunction(function)),
  ];

  Ok((declarations, function_id))
}
