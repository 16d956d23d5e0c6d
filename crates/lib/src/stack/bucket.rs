//! Bucket pipeline assembly.
//!
//! Per bucket spec, in input order: the bucket, a discovery entry publishing
//! its id under `/<app-prefix>/buckets/<name>`, and, when `notify` is set, a
//! binding routing object-created events to the target function.

use tracing::{info, warn};

use crate::config::BucketSpec;
use crate::consts::OBJECT_CREATED_EVENT;
use crate::resource::{Declaration, DiscoveryEntry, NotificationBinding, Resource, StorageBucket};

use super::{StackError, ids};

/// Naming inputs shared by every bucket group.
#[derive(Debug, Clone, Copy)]
pub struct BucketNaming<'a> {
  pub bucket_prefix: &'a str,
  pub app_prefix: &'a str,
}

impl BucketNaming<'_> {
  pub fn physical_name(&self, name: &str) -> String {
    format!("{}-{}", self.bucket_prefix, name)
  }

  pub fn discovery_key(&self, name: &str) -> String {
    format!("/{}/buckets/{}", self.app_prefix, name)
  }
}

/// Declarations for all bucket specs.
///
/// # Errors
///
/// Returns `MissingTarget` for a spec with `notify = true` and no target.
pub fn assemble_buckets(specs: &[BucketSpec], naming: BucketNaming<'_>) -> Result<Vec<Declaration>, StackError> {
  let mut declarations = Vec::with_capacity(specs.len() * 3);
  for spec in specs {
    declarations.extend(bucket_group(spec, naming)?);
  }

  info!(
    buckets = specs.len(),
    notifications = specs.iter().filter(|s| s.notify).count(),
    "assembled bucket pipeline"
  );
  Ok(declarations)
}

fn bucket_group(spec: &BucketSpec, naming: BucketNaming<'_>) -> Result<Vec<Declaration>, StackError> {
  let bucket_id = ids::bucket(&spec.name);

  let mut group = vec![
    Declaration::new(
      bucket_id.clone(),
      Resource::StorageBucket(StorageBucket {
        bucket: naming.physical_name(&spec.name),
      }),
    ),
    Declaration::new(
      ids::discovery(&spec.name),
      Resource::DiscoveryEntry(DiscoveryEntry {
        name: naming.discovery_key(&spec.name),
        value_type: "String".to_string(),
        value: bucket_id.attr("id").token(),
      }),
    ),
  ];

  if spec.notify {
    let target = spec.target.as_deref().ok_or_else(|| StackError::MissingTarget {
      bucket: spec.name.clone(),
    })?;

    group.push(
      Declaration::new(
        ids::notification(&spec.name),
        Resource::NotificationBinding(NotificationBinding {
          bucket: bucket_id.attr("id").token(),
          events: vec![OBJECT_CREATED_EVENT.to_string()],
          target: ids::function(target).attr("arn").token(),
        }),
      )
      .depends_on(&bucket_id),
    );
  } else if let Some(target) = &spec.target {
    warn!(bucket = %spec.name, target = %target, "target ignored because notify is false");
  }

  Ok(group)
}
