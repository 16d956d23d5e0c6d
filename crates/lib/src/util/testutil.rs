//! Test fixtures for thumbstack-lib.
//!
//! Builds a throwaway project directory with function sources laid out the
//! way the default config expects them.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use crate::config::StackConfig;

/// Function directories created by [`fixture_config`].
pub const FIXTURE_FUNCTIONS: &[&str] = &["resize", "presign", "list"];

/// Write a minimal handler for `name` under `root/lambdas/<name>`.
pub fn write_function(root: &Path, name: &str) {
  let dir = root.join("lambdas").join(name);
  fs::create_dir_all(&dir).unwrap();
  fs::write(
    dir.join("handler.py"),
    format!("def handler(event, context):\n    return {{\"function\": \"{name}\"}}\n"),
  )
  .unwrap();
}

/// A temp project with the default functions and a config rooted in it.
///
/// Keep the returned `TempDir` alive for as long as the config is used.
pub fn fixture_config() -> (TempDir, StackConfig) {
  let temp = TempDir::new().unwrap();
  for name in FIXTURE_FUNCTIONS {
    write_function(temp.path(), name);
  }

  let config = StackConfig {
    base_dir: temp.path().to_path_buf(),
    ..StackConfig::default()
  };
  (temp, config)
}
