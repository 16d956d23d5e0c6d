//! Function gateway assembly.
//!
//! Each public function gets its asset and function, an unauthenticated
//! endpoint on its latest code, a retry policy scoped to `$LATEST`, and an
//! output `<name>_url` carrying the endpoint URL. The outputs are the
//! stack's API surface.

use tracing::info;

use crate::config::StackConfig;
use crate::consts::LATEST_QUALIFIER;
use crate::resource::{
  Declaration, InvocationRetryPolicy, PublicInvocationEndpoint, PublishedOutput, Resource,
};

use super::function::function_group;
use super::{StackError, ids};

/// Declarations for every name in `names`, in order.
pub fn assemble_gateway(config: &StackConfig, names: &[String]) -> Result<Vec<Declaration>, StackError> {
  let mut declarations = Vec::with_capacity(names.len() * 5);
  for name in names {
    declarations.extend(gateway_group(config, name)?);
  }

  info!(functions = names.len(), "assembled function gateway");
  Ok(declarations)
}

fn gateway_group(config: &StackConfig, name: &str) -> Result<Vec<Declaration>, StackError> {
  let (mut group, function_id) = function_group(config, name, None)?;
  let endpoint_id = ids::endpoint(name);

  group.push(Declaration::new(
    endpoint_id.clone(),
    Resource::PublicInvocationEndpoint(PublicInvocationEndpoint {
      function_name: function_id.attr("function_name").token(),
      authorization_type: "NONE".to_string(),
    }),
  ));

  group.push(Declaration::new(
    ids::retry_policy(name),
    Resource::InvocationRetryPolicy(InvocationRetryPolicy {
      function_name: function_id.attr("function_name").token(),
      maximum_event_age_in_seconds: config.gateway.max_event_age,
      maximum_retry_attempts: config.gateway.max_retry_attempts,
      qualifier: Some(LATEST_QUALIFIER.to_string()),
    }),
  ));

  group.push(Declaration::new(
    ids::url_output(name),
    Resource::PublishedOutput(PublishedOutput {
      value: endpoint_id.attr("function_url").token(),
    }),
  ));

  Ok(group)
}
