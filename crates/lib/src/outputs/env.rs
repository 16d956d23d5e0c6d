use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum EnvFileError {
  #[error("env file not found: {}", path.display())]
  Missing { path: PathBuf },

  #[error("failed to read {}: {source}", path.display())]
  Read { path: PathBuf, source: std::io::Error },

  #[error("{}:{line}: {message}", path.display())]
  Malformed {
    path: PathBuf,
    line: usize,
    message: String,
  },

  #[error("{} does not define {key}", path.display())]
  MissingKey { path: PathBuf, key: String },

  #[error("invalid engine output document: {0}")]
  EngineOutput(#[from] serde_json::Error),

  #[error("failed to write {}: {source}", path.display())]
  Write { path: PathBuf, source: std::io::Error },
}

/// One entry of the engine's `output -json` document.
#[derive(Debug, Deserialize)]
struct EngineOutput {
  value: serde_json::Value,
  #[serde(default)]
  sensitive: bool,
}

/// Output values from the engine's `output -json` document.
///
/// String values are taken verbatim; anything else is kept as compact JSON.
pub fn parse_engine_outputs(json: &str) -> Result<BTreeMap<String, String>, EnvFileError> {
  let raw: BTreeMap<String, EngineOutput> = serde_json::from_str(json)?;

  Ok(
    raw
      .into_iter()
      .map(|(name, output)| {
        if output.sensitive {
          debug!(output = %name, "including sensitive output");
        }
        let value = match output.value {
          serde_json::Value::String(s) => s,
          other => other.to_string(),
        };
        (name, value)
      })
      .collect(),
  )
}

fn is_valid_key(key: &str) -> bool {
  !key.is_empty()
    && !key.starts_with(|c: char| c.is_ascii_digit())
    && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Render values as `KEY=value` lines, sorted by key.
pub fn render_env(values: &BTreeMap<String, String>) -> String {
  values.iter().map(|(k, v)| format!("{k}={v}\n")).collect()
}

/// Parse env file content.
///
/// Blank lines and `#` comments are skipped. Values may be wrapped in
/// matching single or double quotes. `origin` is only used in errors.
pub fn parse_env(content: &str, origin: &Path) -> Result<BTreeMap<String, String>, EnvFileError> {
  let mut values = BTreeMap::new();

  for (index, raw) in content.lines().enumerate() {
    let line = raw.trim();
    if line.is_empty() || line.starts_with('#') {
      continue;
    }

    let malformed = |message: String| EnvFileError::Malformed {
      path: origin.to_path_buf(),
      line: index + 1,
      message,
    };

    let line = line.strip_prefix("export ").unwrap_or(line);
    let (key, value) = line
      .split_once('=')
      .ok_or_else(|| malformed(format!("expected KEY=value, found '{line}'")))?;

    let key = key.trim();
    if !is_valid_key(key) {
      return Err(malformed(format!("invalid key '{key}'")));
    }

    let value = value.trim();
    let value = ['"', '\'']
      .iter()
      .find_map(|q| value.strip_prefix(*q).and_then(|v| v.strip_suffix(*q)))
      .unwrap_or(value);

    values.insert(key.to_string(), value.to_string());
  }

  Ok(values)
}

/// Read and parse an env file.
pub fn load_env_file(path: &Path) -> Result<BTreeMap<String, String>, EnvFileError> {
  let content = fs::read_to_string(path).map_err(|source| match source.kind() {
    ErrorKind::NotFound => EnvFileError::Missing {
      path: path.to_path_buf(),
    },
    _ => EnvFileError::Read {
      path: path.to_path_buf(),
      source,
    },
  })?;

  let values = parse_env(&content, path)?;
  debug!(path = %path.display(), keys = values.len(), "loaded env file");
  Ok(values)
}

/// Load an env file and return the non-empty value of `key`.
pub fn require_env_value(path: &Path, key: &str) -> Result<String, EnvFileError> {
  load_env_file(path)?
    .remove(key)
    .filter(|v| !v.is_empty())
    .ok_or_else(|| EnvFileError::MissingKey {
      path: path.to_path_buf(),
      key: key.to_string(),
    })
}

pub fn write_env_file(path: &Path, values: &BTreeMap<String, String>) -> Result<(), EnvFileError> {
  let write_err = |source| EnvFileError::Write {
    path: path.to_path_buf(),
    source,
  };

  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    fs::create_dir_all(parent).map_err(write_err)?;
  }
  fs::write(path, render_env(values)).map_err(write_err)?;

  info!(path = %path.display(), keys = values.len(), "wrote env file");
  Ok(())
}
