//! Graph assembly and the checks run when a graph is finalized.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, info};

use crate::consts::{LATEST_QUALIFIER, MAX_EVENT_AGE_SECS, MAX_RETRY_ATTEMPTS_LIMIT, MIN_EVENT_AGE_SECS};
use crate::reference::references;
use crate::resource::{Declaration, InvocationRetryPolicy, LogicalId, Resource, ResourceKind};

use super::dag::DependencyDag;
use super::types::{Edge, GraphError, ProviderBinding, ResourceGraph};

/// Accumulates declarations for a single assembly pass.
#[derive(Debug)]
pub struct GraphBuilder {
  stack: String,
  providers: Vec<ProviderBinding>,
  declarations: Vec<Declaration>,
  index: HashMap<LogicalId, usize>,
}

impl GraphBuilder {
  pub fn new(stack: &str) -> Self {
    Self {
      stack: stack.to_string(),
      providers: Vec::new(),
      declarations: Vec::new(),
      index: HashMap::new(),
    }
  }

  /// Bind a provider. Re-registering a name replaces its configuration.
  pub fn register_provider(&mut self, binding: ProviderBinding) {
    match self.providers.iter_mut().find(|p| p.name == binding.name) {
      Some(existing) => *existing = binding,
      None => self.providers.push(binding),
    }
  }

  /// Add a declaration, returning its id.
  ///
  /// # Errors
  ///
  /// Returns `DuplicateId` if the id is already declared.
  pub fn declare(&mut self, declaration: Declaration) -> Result<LogicalId, GraphError> {
    if self.index.contains_key(&declaration.id) {
      return Err(GraphError::DuplicateId(declaration.id));
    }

    debug!(id = %declaration.id, kind = %declaration.kind(), "declared");
    let id = declaration.id.clone();
    self.index.insert(id.clone(), self.declarations.len());
    self.declarations.push(declaration);
    Ok(id)
  }

  pub fn extend(&mut self, declarations: impl IntoIterator<Item = Declaration>) -> Result<(), GraphError> {
    for declaration in declarations {
      self.declare(declaration)?;
    }
    Ok(())
  }

  pub fn contains(&self, id: &LogicalId) -> bool {
    self.index.contains_key(id)
  }

  pub fn kind_of(&self, id: &LogicalId) -> Option<ResourceKind> {
    self.index.get(id).map(|&i| self.declarations[i].kind())
  }

  pub fn len(&self) -> usize {
    self.declarations.len()
  }

  pub fn is_empty(&self) -> bool {
    self.declarations.is_empty()
  }

  /// Validate every declaration and freeze the graph.
  ///
  /// # Errors
  ///
  /// Returns the first defect found, in declaration order. No partial graph
  /// is produced.
  pub fn finalize(self) -> Result<ResourceGraph, GraphError> {
    let mut edges = BTreeSet::new();

    for declaration in &self.declarations {
      let refs = declaration.references().map_err(|source| GraphError::Reference {
        id: declaration.id.clone(),
        source,
      })?;

      for reference in refs {
        let target = self.lookup(&reference.resource).ok_or_else(|| GraphError::UnresolvedReference {
          from: declaration.id.clone(),
          reference: reference.clone(),
        })?;

        if !exported_attributes(target.kind()).contains(&reference.attribute.as_str()) {
          return Err(GraphError::UnknownAttribute {
            from: declaration.id.clone(),
            target: target.id.clone(),
            kind: target.kind(),
            attribute: reference.attribute,
          });
        }

        edges.insert(Edge {
          dependency: target.id.clone(),
          dependent: declaration.id.clone(),
        });
      }

      for dependency in &declaration.depends_on {
        if !self.contains(dependency) {
          return Err(GraphError::UnknownDependency {
            from: declaration.id.clone(),
            to: dependency.clone(),
          });
        }
        edges.insert(Edge {
          dependency: dependency.clone(),
          dependent: declaration.id.clone(),
        });
      }

      self.validate(declaration)?;
    }

    let edges: Vec<Edge> = edges.into_iter().collect();
    let dag = DependencyDag::new(self.declarations.iter().map(|d| &d.id), &edges)?;

    info!(
      stack = %self.stack,
      declarations = self.declarations.len(),
      edges = edges.len(),
      "resource graph finalized"
    );

    Ok(ResourceGraph {
      stack: self.stack,
      providers: self.providers,
      declarations: self.declarations,
      edges,
      dag,
    })
  }

  fn lookup(&self, id: &LogicalId) -> Option<&Declaration> {
    self.index.get(id).map(|&i| &self.declarations[i])
  }

  /// Kind-specific invariants.
  fn validate(&self, declaration: &Declaration) -> Result<(), GraphError> {
    match &declaration.resource {
      Resource::NotificationBinding(_) => {
        let targets = declaration.target_references().map_err(|source| GraphError::Reference {
          id: declaration.id.clone(),
          source,
        })?;
        for target in targets {
          self.expect_kind(&declaration.id, &target.resource, ResourceKind::DeployableFunction)?;
        }
        Ok(())
      }
      Resource::InvocationRetryPolicy(policy) => validate_policy(&declaration.id, policy),
      Resource::DeployableFunction(function) => {
        let assets = references(&function.filename).map_err(|source| GraphError::Reference {
          id: declaration.id.clone(),
          source,
        })?;
        if assets.len() != 1 {
          return Err(GraphError::AssetOwnership {
            function: declaration.id.clone(),
            count: assets.len(),
          });
        }

        let asset_id = &assets[0].resource;
        self.expect_kind(&declaration.id, asset_id, ResourceKind::ArtifactAsset)?;
        if let Some(Declaration {
          resource: Resource::ArtifactAsset(asset),
          ..
        }) = self.lookup(asset_id)
          && asset.hash != function.source_code_hash
        {
          return Err(GraphError::HashDrift {
            function: declaration.id.clone(),
            asset: asset_id.clone(),
            declared: function.source_code_hash.clone(),
            actual: asset.hash.clone(),
          });
        }
        Ok(())
      }
      _ => Ok(()),
    }
  }

  fn expect_kind(&self, from: &LogicalId, target: &LogicalId, expected: ResourceKind) -> Result<(), GraphError> {
    match self.kind_of(target) {
      Some(found) if found == expected => Ok(()),
      Some(found) => Err(GraphError::KindMismatch {
        from: from.clone(),
        target: target.clone(),
        expected,
        found,
      }),
      None => Err(GraphError::UnresolvedReference {
        from: from.clone(),
        reference: target.attr("id"),
      }),
    }
  }
}

fn validate_policy(id: &LogicalId, policy: &InvocationRetryPolicy) -> Result<(), GraphError> {
  let invalid = |message: String| GraphError::InvalidPolicy { id: id.clone(), message };

  if policy.maximum_retry_attempts > MAX_RETRY_ATTEMPTS_LIMIT {
    return Err(invalid(format!(
      "maximum_retry_attempts {} exceeds {}",
      policy.maximum_retry_attempts, MAX_RETRY_ATTEMPTS_LIMIT
    )));
  }

  if !(MIN_EVENT_AGE_SECS..=MAX_EVENT_AGE_SECS).contains(&policy.maximum_event_age_in_seconds) {
    return Err(invalid(format!(
      "maximum_event_age_in_seconds {} outside {}..={}",
      policy.maximum_event_age_in_seconds, MIN_EVENT_AGE_SECS, MAX_EVENT_AGE_SECS
    )));
  }

  if let Some(qualifier) = &policy.qualifier {
    let is_version = !qualifier.is_empty() && qualifier.chars().all(|c| c.is_ascii_digit());
    if qualifier != LATEST_QUALIFIER && !is_version {
      return Err(invalid(format!(
        "qualifier '{qualifier}' must be {LATEST_QUALIFIER} or a published version number, not an alias"
      )));
    }
  }

  Ok(())
}

/// Attributes another declaration may reference, per kind.
fn exported_attributes(kind: ResourceKind) -> &'static [&'static str] {
  match kind {
    ResourceKind::StorageBucket => &["id", "arn", "bucket", "bucket_domain_name"],
    ResourceKind::ArtifactAsset => &["path", "hash"],
    ResourceKind::DeployableFunction => &["arn", "function_name", "invoke_arn", "qualified_arn", "version"],
    ResourceKind::FailureTopic => &["arn", "id", "name"],
    ResourceKind::FailureSubscription => &["arn", "id"],
    ResourceKind::PublicInvocationEndpoint => &["function_url", "url_id"],
    ResourceKind::DiscoveryEntry => &["arn", "name", "version"],
    ResourceKind::LocalFile => &["id", "filename"],
    ResourceKind::BucketPublicAccess
    | ResourceKind::BucketWebsite
    | ResourceKind::InvocationRetryPolicy
    | ResourceKind::NotificationBinding => &["id"],
    ResourceKind::PublishedOutput => &[],
  }
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeMap;
  use std::path::PathBuf;

  use super::*;
  use crate::resource::{
    ArtifactAsset, AssetKind, DeployableFunction, NotificationBinding, PublishedOutput, StorageBucket,
  };
  use crate::util::hash::ContentHash;

  fn bucket(name: &str) -> Declaration {
    Declaration::new(
      format!("{name}_bucket"),
      Resource::StorageBucket(StorageBucket {
        bucket: format!("app-{name}"),
      }),
    )
  }

  fn asset(name: &str, hash: &str) -> Declaration {
    Declaration::new(
      format!("{name}_asset"),
      Resource::ArtifactAsset(ArtifactAsset {
        source: PathBuf::from(format!("lambdas/{name}")),
        kind: AssetKind::Archive,
        hash: ContentHash(hash.to_string()),
      }),
    )
  }

  fn function(name: &str, hash: &str) -> Declaration {
    Declaration::new(
      format!("{name}_lambda"),
      Resource::DeployableFunction(DeployableFunction {
        function_name: name.to_string(),
        runtime: "python3.9".to_string(),
        handler: "handler.handler".to_string(),
        role: "arn:aws:iam::000000000000:role/test".to_string(),
        timeout: 10,
        filename: LogicalId::from(format!("{name}_asset")).attr("path").token(),
        source_code_hash: ContentHash(hash.to_string()),
        environment: BTreeMap::new(),
        dead_letter_target: None,
      }),
    )
  }

  fn binding(bucket: &str, target: &str) -> Declaration {
    Declaration::new(
      format!("{bucket}_notification"),
      Resource::NotificationBinding(NotificationBinding {
        bucket: LogicalId::from(format!("{bucket}_bucket")).attr("id").token(),
        events: vec!["s3:ObjectCreated:*".to_string()],
        target: LogicalId::from(target).attr("arn").token(),
      }),
    )
  }

  fn policy(attempts: u32, age: u32, qualifier: Option<&str>) -> Declaration {
    Declaration::new(
      "resize_invoke",
      Resource::InvocationRetryPolicy(InvocationRetryPolicy {
        function_name: LogicalId::from("resize_lambda").attr("function_name").token(),
        maximum_event_age_in_seconds: age,
        maximum_retry_attempts: attempts,
        qualifier: qualifier.map(str::to_string),
      }),
    )
  }

  fn resize_pipeline() -> GraphBuilder {
    let mut builder = GraphBuilder::new("test");
    builder.declare(asset("resize", "abc")).unwrap();
    builder.declare(function("resize", "abc")).unwrap();
    builder
  }

  #[test]
  fn duplicate_id_is_rejected_on_declare() {
    let mut builder = GraphBuilder::new("test");
    builder.declare(bucket("images")).unwrap();
    let err = builder.declare(bucket("images")).unwrap_err();
    assert!(matches!(err, GraphError::DuplicateId(ref id) if id.as_str() == "images_bucket"));
  }

  #[test]
  fn binding_to_declared_function_finalizes_with_edges() {
    let mut builder = resize_pipeline();
    builder.declare(bucket("images")).unwrap();
    builder.declare(binding("images", "resize_lambda")).unwrap();

    let graph = builder.finalize().unwrap();
    let notification = LogicalId::from("images_notification");

    assert_eq!(
      graph.dependencies(&notification),
      vec![LogicalId::from("images_bucket"), LogicalId::from("resize_lambda")]
    );
    assert_eq!(graph.dependencies(&"resize_lambda".into()), vec![LogicalId::from("resize_asset")]);
  }

  #[test]
  fn binding_to_undeclared_function_fails() {
    let mut builder = GraphBuilder::new("test");
    builder.declare(bucket("images")).unwrap();
    builder.declare(binding("images", "thumbnail_lambda")).unwrap();

    let err = builder.finalize().unwrap_err();
    assert!(
      matches!(err, GraphError::UnresolvedReference { ref from, ref reference }
        if from.as_str() == "images_notification" && reference.resource.as_str() == "thumbnail_lambda")
    );
  }

  #[test]
  fn binding_to_non_function_fails() {
    let mut builder = GraphBuilder::new("test");
    builder.declare(bucket("images")).unwrap();
    builder.declare(bucket("resized")).unwrap();
    let mut decl = binding("images", "resized_bucket");
    if let Resource::NotificationBinding(b) = &mut decl.resource {
      b.target = LogicalId::from("resized_bucket").attr("arn").token();
    }
    builder.declare(decl).unwrap();

    let err = builder.finalize().unwrap_err();
    assert!(matches!(
      err,
      GraphError::KindMismatch {
        expected: ResourceKind::DeployableFunction,
        found: ResourceKind::StorageBucket,
        ..
      }
    ));
  }

  #[test]
  fn unknown_attribute_fails() {
    let mut builder = GraphBuilder::new("test");
    builder.declare(bucket("images")).unwrap();
    builder
      .declare(Declaration::new(
        "images_out",
        Resource::PublishedOutput(PublishedOutput {
          value: LogicalId::from("images_bucket").attr("function_url").token(),
        }),
      ))
      .unwrap();

    assert!(matches!(
      builder.finalize(),
      Err(GraphError::UnknownAttribute { ref attribute, .. }) if attribute == "function_url"
    ));
  }

  #[test]
  fn unknown_explicit_dependency_fails() {
    let mut builder = GraphBuilder::new("test");
    builder
      .declare(bucket("images").depends_on(&LogicalId::from("nothing")))
      .unwrap();
    assert!(matches!(builder.finalize(), Err(GraphError::UnknownDependency { .. })));
  }

  #[test]
  fn hash_drift_fails() {
    let mut builder = GraphBuilder::new("test");
    builder.declare(asset("resize", "new")).unwrap();
    builder.declare(function("resize", "old")).unwrap();

    assert!(matches!(
      builder.finalize(),
      Err(GraphError::HashDrift { ref declared, ref actual, .. }) if declared.0 == "old" && actual.0 == "new"
    ));
  }

  #[test]
  fn retry_policy_limits() {
    for (attempts, age, qualifier, ok) in [
      (0, 3600, None, true),
      (2, 300, Some("$LATEST"), true),
      (1, 60, Some("7"), true),
      (3, 300, None, false),
      (0, 30, None, false),
      (0, 21601, None, false),
      (2, 300, Some("live"), false),
      (2, 300, Some(""), false),
    ] {
      let mut builder = resize_pipeline();
      builder.declare(policy(attempts, age, qualifier)).unwrap();
      let result = builder.finalize();
      assert_eq!(result.is_ok(), ok, "attempts={attempts} age={age} qualifier={qualifier:?}");
      if !ok {
        assert!(matches!(result, Err(GraphError::InvalidPolicy { .. })));
      }
    }
  }

  #[test]
  fn malformed_token_is_reported_with_id() {
    let mut builder = GraphBuilder::new("test");
    builder
      .declare(Declaration::new(
        "broken",
        Resource::PublishedOutput(PublishedOutput {
          value: "$${ref:missing_attribute}".to_string(),
        }),
      ))
      .unwrap();
    assert!(matches!(builder.finalize(), Err(GraphError::Reference { ref id, .. }) if id.as_str() == "broken"));
  }

  #[test]
  fn providers_are_replaced_by_name() {
    let mut builder = GraphBuilder::new("test");
    builder.register_provider(ProviderBinding::new("aws"));
    builder.register_provider(ProviderBinding::new("aws").with("region", "eu-central-1"));
    let graph = builder.finalize().unwrap();

    assert_eq!(graph.providers.len(), 1);
    assert_eq!(graph.providers[0].config["region"], "eu-central-1");
  }
}
