//! Logical id derivation.
//!
//! Ids are derived from the configured names alone, so identical inputs
//! always produce identical ids.

use crate::resource::LogicalId;

pub fn bucket(name: &str) -> LogicalId {
  LogicalId(format!("{name}_bucket"))
}

pub fn discovery(name: &str) -> LogicalId {
  LogicalId(format!("{name}_bucket_ssm"))
}

pub fn notification(name: &str) -> LogicalId {
  LogicalId(format!("{name}_notification"))
}

pub fn public_access(name: &str) -> LogicalId {
  LogicalId(format!("{name}_public_access"))
}

pub fn website(name: &str) -> LogicalId {
  LogicalId(format!("{name}_config"))
}

pub fn asset(function: &str) -> LogicalId {
  LogicalId(format!("{function}_asset"))
}

pub fn function(function: &str) -> LogicalId {
  LogicalId(format!("{function}_lambda"))
}

pub fn endpoint(function: &str) -> LogicalId {
  LogicalId(format!("{function}_latest"))
}

pub fn retry_policy(function: &str) -> LogicalId {
  LogicalId(format!("{function}_invoke"))
}

/// Output key, also the env-file key read by shell tooling.
pub fn url_output(function: &str) -> LogicalId {
  LogicalId(format!("{function}_url"))
}

pub fn topic(name: &str) -> LogicalId {
  LogicalId(name.to_string())
}

pub fn subscription(topic: &str) -> LogicalId {
  LogicalId(format!("{topic}-sub"))
}

pub fn env_file() -> LogicalId {
  LogicalId("env".to_string())
}

pub fn website_url_output() -> LogicalId {
  LogicalId("localstack_url".to_string())
}
