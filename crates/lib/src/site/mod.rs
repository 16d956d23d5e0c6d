//! Static site sync.
//!
//! Pushes the built web client to the website bucket, or empties it before
//! teardown. The bucket name comes from the env file the engine writes; the
//! sync itself is a single invocation of an S3-compatible CLI.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

use crate::consts::FRONTEND_ENV_KEY;
use crate::outputs::{EnvFileError, require_env_value};

#[derive(Debug, Error)]
pub enum SiteError {
  #[error(transparent)]
  Env(#[from] EnvFileError),

  #[error("site directory not found: {}", path.display())]
  SiteDirMissing { path: PathBuf },

  #[error("failed to run {tool}: {source}")]
  Spawn { tool: String, source: std::io::Error },

  #[error("{tool} exited with {}", code.map_or_else(|| "a signal".to_string(), |c| format!("status {c}")))]
  Failed { tool: String, code: Option<i32> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteAction {
  /// Upload the site, deleting remote files that no longer exist locally.
  Deploy,
  /// Remove every object from the bucket.
  Destroy,
}

impl std::fmt::Display for SiteAction {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      SiteAction::Deploy => f.write_str("deploy"),
      SiteAction::Destroy => f.write_str("destroy"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSync {
  pub tool: String,
  pub site_dir: PathBuf,
  pub bucket: String,
}

impl SiteSync {
  /// Resolve the bucket from `env_file`.
  ///
  /// # Errors
  ///
  /// Fails if the env file is missing, malformed, or lacks the bucket key.
  pub fn from_env_file(tool: &str, site_dir: &Path, env_file: &Path) -> Result<Self, SiteError> {
    let bucket = require_env_value(env_file, FRONTEND_ENV_KEY)?;
    debug!(bucket = %bucket, env_file = %env_file.display(), "resolved website bucket");

    Ok(Self {
      tool: tool.to_string(),
      site_dir: site_dir.to_path_buf(),
      bucket,
    })
  }

  pub fn bucket_uri(&self) -> String {
    format!("s3://{}", self.bucket)
  }

  /// Arguments passed to the sync tool.
  pub fn args(&self, action: SiteAction) -> Vec<String> {
    match action {
      SiteAction::Deploy => vec![
        "s3".to_string(),
        "sync".to_string(),
        self.site_dir.display().to_string(),
        self.bucket_uri(),
        "--delete".to_string(),
        "--acl".to_string(),
        "public-read".to_string(),
      ],
      SiteAction::Destroy => vec![
        "s3".to_string(),
        "rm".to_string(),
        self.bucket_uri(),
        "--recursive".to_string(),
      ],
    }
  }

  /// Run the sync tool once, inheriting stdio.
  pub async fn run(&self, action: SiteAction) -> Result<(), SiteError> {
    if action == SiteAction::Deploy && !self.site_dir.is_dir() {
      return Err(SiteError::SiteDirMissing {
        path: self.site_dir.clone(),
      });
    }

    let args = self.args(action);
    info!(%action, tool = %self.tool, bucket = %self.bucket, "syncing site");
    debug!(?args, "spawning sync tool");

    let status = Command::new(&self.tool)
      .args(&args)
      .status()
      .await
      .map_err(|source| SiteError::Spawn {
        tool: self.tool.clone(),
        source,
      })?;

    if !status.success() {
      return Err(SiteError::Failed {
        tool: self.tool.clone(),
        code: status.code(),
      });
    }

    info!(%action, bucket = %self.bucket, "site sync complete");
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;
  use std::fs;
  use tempfile::TempDir;

  fn project() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("website/site")).unwrap();
    fs::write(temp.path().join("website/site/index.html"), "<html></html>").unwrap();
    fs::write(
      temp.path().join("website/.env.local"),
      "S3_BUCKET_FRONTEND=localstack-thumbnails-app-webapp\n",
    )
    .unwrap();
    temp
  }

  fn sync(temp: &TempDir, tool: &str) -> SiteSync {
    SiteSync::from_env_file(
      tool,
      &temp.path().join("website/site"),
      &temp.path().join("website/.env.local"),
    )
    .unwrap()
  }

  #[test]
  fn deploy_args_mirror_sync_with_delete() {
    let temp = project();
    let sync = sync(&temp, "awslocal");
    let site = temp.path().join("website/site").display().to_string();

    assert_eq!(
      sync.args(SiteAction::Deploy),
      vec![
        "s3",
        "sync",
        site.as_str(),
        "s3://localstack-thumbnails-app-webapp",
        "--delete",
        "--acl",
        "public-read"
      ]
    );
  }

  #[test]
  fn destroy_args_remove_recursively() {
    let temp = project();
    assert_eq!(
      sync(&temp, "awslocal").args(SiteAction::Destroy),
      vec!["s3", "rm", "s3://localstack-thumbnails-app-webapp", "--recursive"]
    );
  }

  #[test]
  fn missing_env_file_fails_before_spawning() {
    let temp = TempDir::new().unwrap();
    let err = SiteSync::from_env_file("awslocal", temp.path(), &temp.path().join(".env.local")).unwrap_err();
    assert!(matches!(err, SiteError::Env(EnvFileError::Missing { .. })));
  }

  #[test]
  fn env_file_without_bucket_fails() {
    let temp = TempDir::new().unwrap();
    let env = temp.path().join(".env.local");
    fs::write(&env, "presign_url=http://x\n").unwrap();

    let err = SiteSync::from_env_file("awslocal", temp.path(), &env).unwrap_err();
    assert!(matches!(err, SiteError::Env(EnvFileError::MissingKey { .. })));
  }

  #[tokio::test]
  async fn deploy_requires_site_dir() {
    let temp = project();
    let mut sync = sync(&temp, "true");
    sync.site_dir = temp.path().join("website/missing");

    let err = sync.run(SiteAction::Deploy).await.unwrap_err();
    assert!(matches!(err, SiteError::SiteDirMissing { .. }));
  }

  #[tokio::test]
  #[serial]
  async fn unknown_tool_is_a_spawn_error() {
    let temp = project();
    let err = sync(&temp, "thumbstack-no-such-sync-tool")
      .run(SiteAction::Destroy)
      .await
      .unwrap_err();
    assert!(matches!(err, SiteError::Spawn { .. }));
  }

  #[cfg(unix)]
  #[tokio::test]
  #[serial]
  async fn tool_receives_args_and_nonzero_exit_fails() {
    use std::os::unix::fs::PermissionsExt;

    let temp = project();
    let log = temp.path().join("args.log");
    let script = temp.path().join("fake-sync");
    fs::write(
      &script,
      format!("#!/bin/sh\necho \"$@\" > '{}'\nexit ${{FAKE_SYNC_EXIT:-0}}\n", log.display()),
    )
    .unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    let sync = sync(&temp, &script.display().to_string());
    sync.run(SiteAction::Destroy).await.unwrap();
    assert_eq!(
      fs::read_to_string(&log).unwrap().trim(),
      "s3 rm s3://localstack-thumbnails-app-webapp --recursive"
    );

    let failing = temp.path().join("failing-sync");
    fs::write(&failing, "#!/bin/sh\nexit 3\n").unwrap();
    fs::set_permissions(&failing, fs::Permissions::from_mode(0o755)).unwrap();

    let err = SiteSync { tool: failing.display().to_string(), ..sync }
      .run(SiteAction::Deploy)
      .await
      .unwrap_err();
    assert!(matches!(err, SiteError::Failed { code: Some(3), .. }));
  }
}
