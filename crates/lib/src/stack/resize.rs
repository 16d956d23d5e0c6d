//! The notification-triggered resize function.
//!
//! Declared once, outside the per-list loops. Its retry policy always allows
//! zero retries: a failed resize is surfaced once.

use tracing::info;

use crate::config::StackConfig;
use crate::reference::Deferred;
use crate::resource::{Declaration, InvocationRetryPolicy, Resource};

use super::function::function_group;
use super::{StackError, ids};

pub const RESIZE_RETRY_ATTEMPTS: u32 = 0;

/// Asset, function and retry policy for the resize function.
///
/// `dead_letter` wires the function's failure destination when given.
pub fn assemble_resize(config: &StackConfig, dead_letter: Option<&Deferred>) -> Result<Vec<Declaration>, StackError> {
  let name = config.resize.name.as_str();
  let (mut group, function_id) = function_group(config, name, dead_letter)?;

  group.push(Declaration::new(
    ids::retry_policy(name),
    Resource::InvocationRetryPolicy(InvocationRetryPolicy {
      function_name: function_id.attr("function_name").token(),
      maximum_event_age_in_seconds: config.resize.max_event_age,
      maximum_retry_attempts: RESIZE_RETRY_ATTEMPTS,
      qualifier: None,
    }),
  ));

  info!(function = %name, dead_letter = dead_letter.is_some(), "assembled resize pipeline");
  Ok(group)
}
