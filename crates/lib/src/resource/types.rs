use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::reference::{Deferred, ReferenceError, collect_references, references};
use crate::util::hash::ContentHash;

/// Identifier of a declaration, unique within a graph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogicalId(pub String);

impl LogicalId {
  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// Handle to one of this resource's realized attributes.
  pub fn attr(&self, attribute: &str) -> Deferred {
    Deferred::new(self.clone(), attribute)
  }
}

impl std::fmt::Display for LogicalId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl From<&str> for LogicalId {
  fn from(value: &str) -> Self {
    LogicalId(value.to_string())
  }
}

impl From<String> for LogicalId {
  fn from(value: String) -> Self {
    LogicalId(value)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
  StorageBucket,
  BucketPublicAccess,
  BucketWebsite,
  ArtifactAsset,
  DeployableFunction,
  InvocationRetryPolicy,
  NotificationBinding,
  DiscoveryEntry,
  FailureTopic,
  FailureSubscription,
  PublicInvocationEndpoint,
  PublishedOutput,
  LocalFile,
}

impl ResourceKind {
  pub fn as_str(self) -> &'static str {
    match self {
      ResourceKind::StorageBucket => "storage_bucket",
      ResourceKind::BucketPublicAccess => "bucket_public_access",
      ResourceKind::BucketWebsite => "bucket_website",
      ResourceKind::ArtifactAsset => "artifact_asset",
      ResourceKind::DeployableFunction => "deployable_function",
      ResourceKind::InvocationRetryPolicy => "invocation_retry_policy",
      ResourceKind::NotificationBinding => "notification_binding",
      ResourceKind::DiscoveryEntry => "discovery_entry",
      ResourceKind::FailureTopic => "failure_topic",
      ResourceKind::FailureSubscription => "failure_subscription",
      ResourceKind::PublicInvocationEndpoint => "public_invocation_endpoint",
      ResourceKind::PublishedOutput => "published_output",
      ResourceKind::LocalFile => "local_file",
    }
  }
}

impl std::fmt::Display for ResourceKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// An object storage bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageBucket {
  /// Physical bucket name, `<prefix>-<name>`.
  pub bucket: String,
}

/// Public-access settings for a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketPublicAccess {
  pub bucket: String,
  pub block_public_acls: bool,
  pub block_public_policy: bool,
}

/// Static website hosting for a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketWebsite {
  pub bucket: String,
  pub index_document: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
  /// Directory packaged as a zip archive.
  Archive,
}

/// A function's source directory, packaged at synthesis.
///
/// Exposes the `path` attribute: where the packaged archive lands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactAsset {
  pub source: PathBuf,
  pub kind: AssetKind,
  pub hash: ContentHash,
}

/// A serverless function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployableFunction {
  pub function_name: String,
  pub runtime: String,
  pub handler: String,
  pub role: String,
  pub timeout: u32,
  /// Reference to the owning asset's `path`.
  pub filename: String,
  /// Must equal the owning asset's hash.
  pub source_code_hash: ContentHash,
  pub environment: BTreeMap<String, String>,
  /// Reference to a failure destination, when one is wired.
  pub dead_letter_target: Option<String>,
}

/// Asynchronous invocation policy for a function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationRetryPolicy {
  pub function_name: String,
  pub maximum_event_age_in_seconds: u32,
  pub maximum_retry_attempts: u32,
  pub qualifier: Option<String>,
}

/// Routes bucket events to a function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationBinding {
  pub bucket: String,
  pub events: Vec<String>,
  /// Reference to the target function's `arn`.
  pub target: String,
}

/// A parameter-store entry for runtime discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryEntry {
  pub name: String,
  pub value_type: String,
  pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureTopic {
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureSubscription {
  pub topic_arn: String,
  pub endpoint: String,
  pub protocol: String,
}

/// Unauthenticated HTTP entry point to a function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicInvocationEndpoint {
  pub function_name: String,
  pub authorization_type: String,
}

/// A value exposed outside the graph after realization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedOutput {
  pub value: String,
}

/// A file written on the machine running the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalFile {
  pub filename: String,
  pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resource {
  StorageBucket(StorageBucket),
  BucketPublicAccess(BucketPublicAccess),
  BucketWebsite(BucketWebsite),
  ArtifactAsset(ArtifactAsset),
  DeployableFunction(DeployableFunction),
  InvocationRetryPolicy(InvocationRetryPolicy),
  NotificationBinding(NotificationBinding),
  DiscoveryEntry(DiscoveryEntry),
  FailureTopic(FailureTopic),
  FailureSubscription(FailureSubscription),
  PublicInvocationEndpoint(PublicInvocationEndpoint),
  PublishedOutput(PublishedOutput),
  LocalFile(LocalFile),
}

impl Resource {
  pub fn kind(&self) -> ResourceKind {
    match self {
      Resource::StorageBucket(_) => ResourceKind::StorageBucket,
      Resource::BucketPublicAccess(_) => ResourceKind::BucketPublicAccess,
      Resource::BucketWebsite(_) => ResourceKind::BucketWebsite,
      Resource::ArtifactAsset(_) => ResourceKind::ArtifactAsset,
      Resource::DeployableFunction(_) => ResourceKind::DeployableFunction,
      Resource::InvocationRetryPolicy(_) => ResourceKind::InvocationRetryPolicy,
      Resource::NotificationBinding(_) => ResourceKind::NotificationBinding,
      Resource::DiscoveryEntry(_) => ResourceKind::DiscoveryEntry,
      Resource::FailureTopic(_) => ResourceKind::FailureTopic,
      Resource::FailureSubscription(_) => ResourceKind::FailureSubscription,
      Resource::PublicInvocationEndpoint(_) => ResourceKind::PublicInvocationEndpoint,
      Resource::PublishedOutput(_) => ResourceKind::PublishedOutput,
      Resource::LocalFile(_) => ResourceKind::LocalFile,
    }
  }
}

/// One entry of the resource graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
  pub id: LogicalId,
  pub resource: Resource,
  /// Explicit ordering dependencies beyond the attribute references.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub depends_on: Vec<LogicalId>,
}

impl Declaration {
  pub fn new(id: impl Into<LogicalId>, resource: Resource) -> Self {
    Self {
      id: id.into(),
      resource,
      depends_on: Vec::new(),
    }
  }

  pub fn depends_on(mut self, id: &LogicalId) -> Self {
    self.depends_on.push(id.clone());
    self
  }

  pub fn kind(&self) -> ResourceKind {
    self.resource.kind()
  }

  /// Every deferred reference embedded in this declaration's attributes.
  pub fn references(&self) -> Result<Vec<Deferred>, ReferenceError> {
    let value = serde_json::to_value(&self.resource).map_err(|e| ReferenceError::Malformed(e.to_string()))?;
    let mut refs = Vec::new();
    collect_references(&value, &mut refs)?;
    Ok(refs)
  }

  /// References held by the attribute that names a notification target.
  pub fn target_references(&self) -> Result<Vec<Deferred>, ReferenceError> {
    match &self.resource {
      Resource::NotificationBinding(binding) => references(&binding.target),
      _ => Ok(Vec::new()),
    }
  }
}
