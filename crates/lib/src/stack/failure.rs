//! Failure notification channel.
//!
//! One topic and exactly one subscription. Nothing here binds the topic to
//! a function's failure path; see `ResizeConfig::dead_letter`.

use tracing::info;

use crate::config::FailureConfig;
use crate::resource::{Declaration, FailureSubscription, FailureTopic, LogicalId, Resource};

use super::ids;

/// The assembled channel and the topic id other groups may reference.
#[derive(Debug, Clone)]
pub struct FailureChannel {
  pub topic: LogicalId,
  pub declarations: Vec<Declaration>,
}

pub fn assemble_failure_channel(config: &FailureConfig) -> FailureChannel {
  let topic = ids::topic(&config.topic);

  let declarations = vec![
    Declaration::new(
      topic.clone(),
      Resource::FailureTopic(FailureTopic {
        name: config.topic.clone(),
      }),
    ),
    Declaration::new(
      ids::subscription(&config.topic),
      Resource::FailureSubscription(FailureSubscription {
        topic_arn: topic.attr("arn").token(),
        endpoint: config.endpoint.clone(),
        protocol: config.protocol.clone(),
      }),
    )
    .depends_on(&topic),
  ];

  info!(topic = %config.topic, protocol = %config.protocol, "assembled failure channel");
  FailureChannel { topic, declarations }
}
