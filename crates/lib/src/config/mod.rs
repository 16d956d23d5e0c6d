//! Stack configuration.
//!
//! `stack.toml` describes the inputs to one assembly run. Every field has a
//! default, so an empty file yields the reference thumbnail stack: an
//! `images` bucket that notifies the `resize` function, a `resized` bucket,
//! and public `presign` and `list` functions.

mod templates;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::consts::*;

pub use templates::STACK_TOML_TEMPLATE;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config {}: {source}", path.display())]
  Read { path: PathBuf, source: std::io::Error },

  #[error("failed to parse config {}: {source}", path.display())]
  Parse { path: PathBuf, source: toml::de::Error },

  #[error("invalid config: {0}")]
  Invalid(String),

  #[error("file already exists: {}", path.display())]
  PathExists { path: PathBuf },

  #[error("failed to write file {}: {source}", path.display())]
  WriteFile { path: PathBuf, source: std::io::Error },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StackConfig {
  pub stack: StackSection,
  pub function: FunctionDefaults,
  pub resize: ResizeConfig,
  pub buckets: Vec<BucketSpec>,
  pub gateway: GatewayConfig,
  pub failure: FailureConfig,
  pub frontend: Option<FrontendConfig>,
  /// Directory relative paths are resolved against. Set by [`load_config`].
  #[serde(skip)]
  pub base_dir: PathBuf,
}

impl Default for StackConfig {
  fn default() -> Self {
    Self {
      stack: StackSection::default(),
      function: FunctionDefaults::default(),
      resize: ResizeConfig::default(),
      buckets: vec![
        BucketSpec {
          name: "images".to_string(),
          notify: true,
          target: Some(RESIZE_FUNCTION.to_string()),
        },
        BucketSpec {
          name: "resized".to_string(),
          notify: false,
          target: None,
        },
      ],
      gateway: GatewayConfig::default(),
      failure: FailureConfig::default(),
      frontend: None,
      base_dir: PathBuf::from("."),
    }
  }
}

/// Target environment and naming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StackSection {
  pub name: String,
  /// Physical bucket names are `<bucket_prefix>-<name>`.
  pub bucket_prefix: String,
  /// Discovery keys are `/<app_prefix>/buckets/<name>`.
  pub app_prefix: String,
  /// Function sources live at `<functions_root>/<name>`.
  pub functions_root: PathBuf,
  pub region: Option<String>,
}

impl Default for StackSection {
  fn default() -> Self {
    Self {
      name: DEFAULT_STACK_NAME.to_string(),
      bucket_prefix: DEFAULT_BUCKET_PREFIX.to_string(),
      app_prefix: DEFAULT_APP_PREFIX.to_string(),
      functions_root: PathBuf::from(DEFAULT_FUNCTIONS_ROOT),
      region: None,
    }
  }
}

/// Settings shared by every deployable function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FunctionDefaults {
  pub role: String,
  pub runtime: String,
  pub handler: String,
  pub timeout: u32,
  pub environment: BTreeMap<String, String>,
}

impl Default for FunctionDefaults {
  fn default() -> Self {
    Self {
      role: DEFAULT_ROLE.to_string(),
      runtime: DEFAULT_RUNTIME.to_string(),
      handler: DEFAULT_HANDLER.to_string(),
      timeout: DEFAULT_TIMEOUT_SECS,
      environment: BTreeMap::from([("STAGE".to_string(), "local".to_string())]),
    }
  }
}

/// The notification-triggered function. Its retries are always zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
  pub name: String,
  pub max_event_age: u32,
  /// Route failed invocations to the failure topic.
  pub dead_letter: bool,
}

impl Default for ResizeConfig {
  fn default() -> Self {
    Self {
      name: RESIZE_FUNCTION.to_string(),
      max_event_age: RESIZE_MAX_EVENT_AGE_SECS,
      dead_letter: false,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BucketSpec {
  pub name: String,
  #[serde(default)]
  pub notify: bool,
  /// Function name receiving object-created events when `notify` is set.
  #[serde(default)]
  pub target: Option<String>,
}

/// Publicly invocable functions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewayConfig {
  pub functions: Vec<String>,
  pub max_event_age: u32,
  pub max_retry_attempts: u32,
}

impl Default for GatewayConfig {
  fn default() -> Self {
    Self {
      functions: vec!["presign".to_string(), "list".to_string()],
      max_event_age: GATEWAY_MAX_EVENT_AGE_SECS,
      max_retry_attempts: GATEWAY_MAX_RETRY_ATTEMPTS,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FailureConfig {
  pub topic: String,
  pub endpoint: String,
  pub protocol: String,
}

impl Default for FailureConfig {
  fn default() -> Self {
    Self {
      topic: DEFAULT_FAILURE_TOPIC.to_string(),
      endpoint: DEFAULT_FAILURE_ENDPOINT.to_string(),
      protocol: DEFAULT_FAILURE_PROTOCOL.to_string(),
    }
  }
}

/// Static website bucket and the env file the deploy scripts read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrontendConfig {
  pub bucket: String,
  pub index_document: String,
  pub env_file: PathBuf,
  pub block_public_access: bool,
}

impl Default for FrontendConfig {
  fn default() -> Self {
    Self {
      bucket: "webapp".to_string(),
      index_document: DEFAULT_INDEX_DOCUMENT.to_string(),
      env_file: PathBuf::from(DEFAULT_FRONTEND_ENV_FILE),
      block_public_access: false,
    }
  }
}

impl StackConfig {
  /// Parse a config from TOML text without touching the filesystem.
  pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self, ConfigError> {
    let mut config: StackConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
      path: origin.to_path_buf(),
      source,
    })?;
    config.base_dir = origin
      .parent()
      .filter(|p| !p.as_os_str().is_empty())
      .map(Path::to_path_buf)
      .unwrap_or_else(|| PathBuf::from("."));
    config.validate()?;
    Ok(config)
  }

  /// Directory holding the source of function `name`.
  pub fn function_source(&self, name: &str) -> PathBuf {
    self.base_dir.join(&self.stack.functions_root).join(name)
  }

  /// Resolve a configured path against the config directory.
  pub fn resolve_path(&self, path: &Path) -> PathBuf {
    if path.is_absolute() {
      path.to_path_buf()
    } else {
      self.base_dir.join(path)
    }
  }

  /// Structural checks that do not need the graph.
  pub fn validate(&self) -> Result<(), ConfigError> {
    check_name("stack.name", &self.stack.name)?;
    check_name("stack.bucket_prefix", &self.stack.bucket_prefix)?;
    check_name("stack.app_prefix", &self.stack.app_prefix)?;
    check_id_name("resize.name", &self.resize.name)?;
    check_id_name("failure.topic", &self.failure.topic)?;

    for spec in &self.buckets {
      check_id_name("buckets.name", &spec.name)?;
      if let Some(target) = &spec.target {
        check_id_name("buckets.target", target)?;
      }
    }
    for name in &self.gateway.functions {
      check_id_name("gateway.functions", name)?;
    }
    if self.gateway.max_retry_attempts == 0 {
      return Err(ConfigError::Invalid(
        "gateway.max_retry_attempts must be at least 1; only the resize function runs without retries".to_string(),
      ));
    }
    if let Some(frontend) = &self.frontend {
      check_id_name("frontend.bucket", &frontend.bucket)?;
    }
    if self.function.role.trim().is_empty() {
      return Err(ConfigError::Invalid("function.role must not be empty".to_string()));
    }
    Ok(())
  }

  pub fn trace_loaded(&self) {
    info!(
      stack = %self.stack.name,
      buckets = self.buckets.len(),
      gateway_functions = self.gateway.functions.len(),
      frontend = self.frontend.is_some(),
      "loaded stack config"
    );
    debug!(?self, "stack config (full)");
  }
}

fn check_name(field: &str, value: &str) -> Result<(), ConfigError> {
  let valid = !value.is_empty()
    && value
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.');
  if valid {
    Ok(())
  } else {
    Err(ConfigError::Invalid(format!(
      "{field} '{value}' must be non-empty and use only letters, digits, '-', '_' or '.'"
    )))
  }
}

/// Names that end up inside logical ids, and so inside engine resource
/// addresses: `[A-Za-z_][A-Za-z0-9_-]*`.
fn check_id_name(field: &str, value: &str) -> Result<(), ConfigError> {
  let mut chars = value.chars();
  let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
    && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
  if valid {
    Ok(())
  } else {
    Err(ConfigError::Invalid(format!(
      "{field} '{value}' must start with a letter or '_' and use only letters, digits, '-' or '_'"
    )))
  }
}

/// Config file to use: `explicit`, else `$THUMBSTACK_CONFIG`, else
/// `stack.toml` in the working directory.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
  if let Some(path) = explicit {
    return path.to_path_buf();
  }
  match std::env::var_os(CONFIG_ENV_VAR) {
    Some(value) if !value.is_empty() => PathBuf::from(value),
    _ => PathBuf::from(DEFAULT_CONFIG_FILE),
  }
}

/// Load and validate a config file.
pub fn load_config(path: &Path) -> Result<StackConfig, ConfigError> {
  let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  let config = StackConfig::from_toml_str(&content, path)?;
  config.trace_loaded();
  Ok(config)
}

/// Write the commented default config to `path`.
///
/// # Errors
///
/// Returns `PathExists` rather than overwriting an existing file.
pub fn init_config(path: &Path) -> Result<PathBuf, ConfigError> {
  if path.exists() {
    return Err(ConfigError::PathExists {
      path: path.to_path_buf(),
    });
  }
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    fs::create_dir_all(parent).map_err(|source| ConfigError::WriteFile {
      path: parent.to_path_buf(),
      source,
    })?;
  }
  fs::write(path, STACK_TOML_TEMPLATE).map_err(|source| ConfigError::WriteFile {
    path: path.to_path_buf(),
    source,
  })?;
  info!(path = %path.display(), "wrote config template");
  Ok(path.to_path_buf())
}
