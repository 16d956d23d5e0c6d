//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Functions the default config expects under `lambdas/`.
pub const DEFAULT_FUNCTIONS: &[&str] = &["resize", "presign", "list"];

/// Get path to a fixture file.
pub fn fixture_path(name: &str) -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}

/// Read fixture content.
pub fn fixture_content(name: &str) -> String {
  std::fs::read_to_string(fixture_path(name)).unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

/// Isolated project directory.
///
/// Each test gets its own temporary directory holding `stack.toml` and the
/// function sources it refers to.
pub struct TestEnv {
  pub temp: TempDir,
  pub config_path: PathBuf,
}

impl TestEnv {
  /// Create from a fixture config, with the default function sources.
  pub fn from_fixture(name: &str) -> Self {
    let env = Self::empty();
    std::fs::write(&env.config_path, fixture_content(name)).unwrap();
    for function in DEFAULT_FUNCTIONS {
      env.write_function(function);
    }
    env
  }

  /// Create an empty project with no config.
  pub fn empty() -> Self {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("stack.toml");
    Self { temp, config_path }
  }

  /// Write a file relative to the project directory.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  pub fn write_function(&self, name: &str) {
    self.write_file(
      &format!("lambdas/{name}/handler.py"),
      &format!("def handler(event, context):\n    return {{\"function\": \"{name}\"}}\n"),
    );
  }

  pub fn path(&self, relative_path: &str) -> PathBuf {
    self.temp.path().join(relative_path)
  }

  /// Get a pre-configured Command for the thumbstack binary.
  ///
  /// Runs in the project directory with `THUMBSTACK_CONFIG` pointing at its
  /// config and `RUST_LOG` cleared.
  pub fn thumbstack_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("thumbstack");
    cmd.current_dir(self.temp.path());
    cmd.env("THUMBSTACK_CONFIG", &self.config_path);
    cmd.env_remove("RUST_LOG");
    cmd
  }
}
