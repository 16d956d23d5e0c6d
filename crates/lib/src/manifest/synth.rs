use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, info};

use crate::asset::{self, AssetError};
use crate::consts::MANIFEST_FILE;
use crate::graph::ResourceGraph;
use crate::reference::{Deferred, ReferenceError, Resolver, Segment, parse};
use crate::resource::{Declaration, LogicalId, Resource, ResourceKind};
use crate::util::hash::{HashError, Hashable};

use super::types::{Manifest, OutputBlock, RequiredProvider, SynthOutput};

#[derive(Debug, Error)]
pub enum SynthError {
  #[error("{id}: {source}")]
  Reference {
    id: LogicalId,
    #[source]
    source: ReferenceError,
  },

  #[error("{from}: cannot depend on {to}, which is not an engine resource")]
  NotAResource { from: LogicalId, to: LogicalId },

  #[error("failed to serialize manifest: {0}")]
  Serialize(#[from] HashError),

  #[error(transparent)]
  Asset(#[from] AssetError),

  #[error("failed to write {}: {source}", path.display())]
  Io { path: PathBuf, source: std::io::Error },
}

/// Engine resource type for a declaration kind.
///
/// Assets and outputs are not engine resources: assets become archive paths
/// and outputs get their own block.
pub fn engine_type(kind: ResourceKind) -> Option<&'static str> {
  match kind {
    ResourceKind::StorageBucket => Some("aws_s3_bucket"),
    ResourceKind::BucketPublicAccess => Some("aws_s3_bucket_public_access_block"),
    ResourceKind::BucketWebsite => Some("aws_s3_bucket_website_configuration"),
    ResourceKind::DeployableFunction => Some("aws_lambda_function"),
    ResourceKind::InvocationRetryPolicy => Some("aws_lambda_function_event_invoke_config"),
    ResourceKind::NotificationBinding => Some("aws_s3_bucket_notification"),
    ResourceKind::DiscoveryEntry => Some("aws_ssm_parameter"),
    ResourceKind::FailureTopic => Some("aws_sns_topic"),
    ResourceKind::FailureSubscription => Some("aws_sns_topic_subscription"),
    ResourceKind::PublicInvocationEndpoint => Some("aws_lambda_function_url"),
    ResourceKind::LocalFile => Some("local_file"),
    ResourceKind::ArtifactAsset | ResourceKind::PublishedOutput => None,
  }
}

fn provider_source(name: &str) -> String {
  format!("hashicorp/{name}")
}

/// Rewrites deferred references into engine interpolations.
struct EngineResolver<'a> {
  graph: &'a ResourceGraph,
}

impl Resolver for EngineResolver<'_> {
  fn resolve(&self, reference: &Deferred) -> Result<String, ReferenceError> {
    let target = self
      .graph
      .get(reference.resource.as_str())
      .ok_or_else(|| ReferenceError::Unresolved(reference.clone()))?;

    match &target.resource {
      Resource::ArtifactAsset(a) => match reference.attribute.as_str() {
        "path" => Ok(
          asset::archive_path(&target.id, a)
            .to_string_lossy()
            .replace('\\', "/"),
        ),
        "hash" => Ok(a.hash.0.clone()),
        _ => Err(ReferenceError::Unresolved(reference.clone())),
      },
      other => {
        let engine_type = engine_type(other.kind()).ok_or_else(|| ReferenceError::Unresolved(reference.clone()))?;
        Ok(format!("${{{}.{}.{}}}", engine_type, target.id, reference.attribute))
      }
    }
  }
}

/// Render a string attribute, escaping literal text the engine would
/// otherwise treat as a template sequence.
fn render(input: &str, resolver: &EngineResolver<'_>) -> Result<String, ReferenceError> {
  let mut out = String::with_capacity(input.len());
  for segment in parse(input)? {
    match segment {
      Segment::Literal(text) => out.push_str(&text.replace("${", "$${").replace("%{", "%%{")),
      Segment::Reference(r) => out.push_str(&resolver.resolve(&r)?),
    }
  }
  Ok(out)
}

fn render_value(value: &mut Value, resolver: &EngineResolver<'_>) -> Result<(), ReferenceError> {
  match value {
    Value::String(s) => *s = render(s, resolver)?,
    Value::Array(items) => {
      for item in items {
        render_value(item, resolver)?;
      }
    }
    Value::Object(map) => {
      for item in map.values_mut() {
        render_value(item, resolver)?;
      }
    }
    Value::Null | Value::Bool(_) | Value::Number(_) => {}
  }
  Ok(())
}

/// Engine-shaped body of a resource, references still as tokens.
fn resource_body(resource: &Resource) -> Value {
  match resource {
    Resource::StorageBucket(b) => json!({ "bucket": b.bucket }),
    Resource::BucketPublicAccess(p) => json!({
      "bucket": p.bucket,
      "block_public_acls": p.block_public_acls,
      "block_public_policy": p.block_public_policy,
    }),
    Resource::BucketWebsite(w) => json!({
      "bucket": w.bucket,
      "index_document": { "suffix": w.index_document },
    }),
    Resource::DeployableFunction(f) => {
      let mut body = json!({
        "function_name": f.function_name,
        "runtime": f.runtime,
        "handler": f.handler,
        "role": f.role,
        "timeout": f.timeout,
        "filename": f.filename,
        "source_code_hash": f.source_code_hash.0,
      });
      if !f.environment.is_empty() {
        body["environment"] = json!({ "variables": f.environment });
      }
      if let Some(target) = &f.dead_letter_target {
        body["dead_letter_config"] = json!({ "target_arn": target });
      }
      body
    }
    Resource::InvocationRetryPolicy(p) => {
      let mut body = json!({
        "function_name": p.function_name,
        "maximum_event_age_in_seconds": p.maximum_event_age_in_seconds,
        "maximum_retry_attempts": p.maximum_retry_attempts,
      });
      if let Some(qualifier) = &p.qualifier {
        body["qualifier"] = json!(qualifier);
      }
      body
    }
    Resource::NotificationBinding(n) => json!({
      "bucket": n.bucket,
      "lambda_function": [{
        "events": n.events,
        "lambda_function_arn": n.target,
      }],
    }),
    Resource::DiscoveryEntry(d) => json!({
      "name": d.name,
      "type": d.value_type,
      "value": d.value,
    }),
    Resource::FailureTopic(t) => json!({ "name": t.name }),
    Resource::FailureSubscription(s) => json!({
      "topic_arn": s.topic_arn,
      "endpoint": s.endpoint,
      "protocol": s.protocol,
    }),
    Resource::PublicInvocationEndpoint(e) => json!({
      "function_name": e.function_name,
      "authorization_type": e.authorization_type,
    }),
    Resource::LocalFile(f) => json!({
      "filename": f.filename,
      "content": f.content,
    }),
    Resource::ArtifactAsset(_) | Resource::PublishedOutput(_) => Value::Null,
  }
}

fn depends_on(graph: &ResourceGraph, declaration: &Declaration) -> Result<Vec<String>, SynthError> {
  declaration
    .depends_on
    .iter()
    .map(|dep| {
      graph
        .get(dep.as_str())
        .and_then(|d| engine_type(d.kind()))
        .map(|t| format!("{t}.{dep}"))
        .ok_or_else(|| SynthError::NotAResource {
          from: declaration.id.clone(),
          to: dep.clone(),
        })
    })
    .collect()
}

/// Render a finalized graph into an engine manifest.
///
/// Pure: assets are referenced by their future archive path but not packaged.
pub fn synthesize(graph: &ResourceGraph) -> Result<Manifest, SynthError> {
  let resolver = EngineResolver { graph };
  let mut manifest = Manifest::default();

  for binding in &graph.providers {
    manifest.terraform.required_providers.insert(
      binding.name.clone(),
      RequiredProvider {
        source: provider_source(&binding.name),
      },
    );
    manifest
      .provider
      .entry(binding.name.clone())
      .or_default()
      .push(binding.config.clone());
  }

  for declaration in &graph.declarations {
    let reference_err = |source| SynthError::Reference {
      id: declaration.id.clone(),
      source,
    };

    if let Resource::PublishedOutput(output) = &declaration.resource {
      let value = render(&output.value, &resolver).map_err(reference_err)?;
      manifest.output.insert(declaration.id.to_string(), OutputBlock { value });
      continue;
    }

    let Some(engine_type) = engine_type(declaration.kind()) else {
      debug!(id = %declaration.id, kind = %declaration.kind(), "not an engine resource");
      continue;
    };

    let mut body = resource_body(&declaration.resource);
    render_value(&mut body, &resolver).map_err(reference_err)?;

    let deps = depends_on(graph, declaration)?;
    if !deps.is_empty() {
      body["depends_on"] = json!(deps);
    }

    manifest
      .resource
      .entry(engine_type.to_string())
      .or_default()
      .insert(declaration.id.to_string(), body);
  }

  info!(
    stack = %graph.stack,
    resources = manifest.resource_count(),
    outputs = manifest.output.len(),
    "synthesized manifest"
  );
  Ok(manifest)
}

/// Directory a stack's manifest and assets are written to.
pub fn stack_dir(out_dir: &Path, stack: &str) -> PathBuf {
  out_dir.join("stacks").join(stack)
}

/// Synthesize, package every asset, and write the manifest.
pub fn write_stack(graph: &ResourceGraph, out_dir: &Path) -> Result<SynthOutput, SynthError> {
  let manifest = synthesize(graph)?;
  let hash = manifest.compute_hash()?;
  let dir = stack_dir(out_dir, &graph.stack);

  fs::create_dir_all(&dir).map_err(|source| SynthError::Io {
    path: dir.clone(),
    source,
  })?;

  let mut archives = Vec::new();
  for declaration in graph.of_kind(ResourceKind::ArtifactAsset) {
    if let Resource::ArtifactAsset(a) = &declaration.resource {
      archives.push(asset::package(&declaration.id, a, &dir)?);
    }
  }

  let manifest_path = dir.join(MANIFEST_FILE);
  let mut content = serde_json::to_string_pretty(&manifest)?;
  content.push('\n');
  fs::write(&manifest_path, content).map_err(|source| SynthError::Io {
    path: manifest_path.clone(),
    source,
  })?;

  info!(path = %manifest_path.display(), hash = %hash, "wrote manifest");
  Ok(SynthOutput {
    stack: graph.stack.clone(),
    manifest_path,
    resources: manifest.resource_count(),
    outputs: manifest.output.keys().cloned().collect(),
    archives,
    hash,
  })
}

/// Resources grouped by engine type, for summaries.
pub fn resource_counts(manifest: &Manifest) -> BTreeMap<&str, usize> {
  manifest
    .resource
    .iter()
    .map(|(engine_type, by_id)| (engine_type.as_str(), by_id.len()))
    .collect()
}
