//! Manifest types.
//!
//! The manifest is the engine's view of a stack: required providers, their
//! configuration, every resource body keyed by engine type and logical id,
//! and the published outputs.
//!
//! # Example
//!
//! ```json
//! {
//!   "terraform": { "required_providers": { "aws": { "source": "hashicorp/aws" } } },
//!   "provider": { "aws": [{}] },
//!   "resource": {
//!     "aws_s3_bucket": { "images_bucket": { "bucket": "localstack-thumbnails-app-images" } }
//!   },
//!   "output": {
//!     "presign_url": { "value": "${aws_lambda_function_url.presign_latest.function_url}" }
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::util::hash::{Hashable, ObjectHash};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredProvider {
  pub source: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerraformBlock {
  pub required_providers: BTreeMap<String, RequiredProvider>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputBlock {
  pub value: String,
}

/// The complete engine configuration for one stack.
///
/// Uses [`BTreeMap`] throughout so serialization order, and therefore the
/// manifest hash, depends only on content.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
  pub terraform: TerraformBlock,
  /// Provider configurations, a list per provider name.
  pub provider: BTreeMap<String, Vec<BTreeMap<String, String>>>,
  /// Resource bodies by engine type, then logical id.
  pub resource: BTreeMap<String, BTreeMap<String, serde_json::Value>>,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub output: BTreeMap<String, OutputBlock>,
}

impl Hashable for Manifest {}

impl Manifest {
  pub fn resource(&self, engine_type: &str, id: &str) -> Option<&serde_json::Value> {
    self.resource.get(engine_type).and_then(|by_id| by_id.get(id))
  }

  pub fn resource_count(&self) -> usize {
    self.resource.values().map(BTreeMap::len).sum()
  }
}

/// What [`write_stack`](super::write_stack) produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SynthOutput {
  pub stack: String,
  pub manifest_path: std::path::PathBuf,
  pub resources: usize,
  pub outputs: Vec<String>,
  pub archives: Vec<std::path::PathBuf>,
  pub hash: ObjectHash,
}
