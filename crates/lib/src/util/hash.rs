//! Hashing for change detection.
//!
//! - `ObjectHash`: truncated hash of a serialized value (manifest identity)
//! - `ContentHash`: full SHA-256 of on-disk content (function sources)
//! - `hash_directory()`: deterministic hash of a source tree
//! - `hash_file()` / `hash_bytes()`: leaf helpers

use std::fs;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::consts::OBJ_HASH_PREFIX_LEN;

pub type HashError = serde_json::Error;

/// A truncated SHA-256 identifying a serialized value.
///
/// Lowercase hex, `OBJ_HASH_PREFIX_LEN` characters long.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectHash(pub String);

impl std::fmt::Display for ObjectHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

pub trait Hashable: Serialize {
  fn compute_hash(&self) -> Result<ObjectHash, HashError> {
    let serialized = serde_json::to_string(self)?;
    let mut hasher = Sha256::new();
    hasher.update(serialized.as_bytes());
    let full = format!("{:x}", hasher.finalize());
    Ok(ObjectHash(full[..OBJ_HASH_PREFIX_LEN].to_string()))
  }
}

/// A full 64-character SHA-256 over file content.
///
/// Declared on every function so the engine redeploys when the source changes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl std::fmt::Display for ContentHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

#[derive(Debug, thiserror::Error)]
pub enum DirHashError {
  #[error("source directory not found: {path}")]
  NotFound { path: String },

  #[error("failed to walk directory: {message}")]
  WalkDir { message: String },

  #[error("failed to read file {path}: {message}")]
  ReadFile { path: String, message: String },

  #[error("failed to read symlink {path}: {message}")]
  ReadSymlink { path: String, message: String },
}

/// Compute a deterministic hash of a directory tree.
///
/// Covers file contents, directory structure and symlink targets, but not
/// timestamps or permissions, so a fresh checkout hashes the same as the
/// working copy. Entries whose file name is in `exclude` are skipped along
/// with everything beneath them.
pub fn hash_directory(path: &Path, exclude: &[&str]) -> Result<ContentHash, DirHashError> {
  if !path.is_dir() {
    return Err(DirHashError::NotFound {
      path: path.display().to_string(),
    });
  }

  let mut entries: Vec<(String, String)> = Vec::new();

  let walker = WalkDir::new(path).sort_by_file_name().into_iter().filter_entry(|e| {
    e.file_name()
      .to_str()
      .map(|name| !exclude.contains(&name))
      .unwrap_or(true)
  });

  for entry in walker {
    let entry = entry.map_err(|e| DirHashError::WalkDir { message: e.to_string() })?;
    let entry_path = entry.path();

    // Forward slashes keep hashes stable across platforms
    let rel_path = entry_path
      .strip_prefix(path)
      .unwrap_or(entry_path)
      .to_string_lossy()
      .replace('\\', "/");

    if rel_path.is_empty() {
      continue;
    }

    let file_type = entry.file_type();
    let line = if file_type.is_file() {
      format!("F:{}:{}", rel_path, hash_file(entry_path)?.0)
    } else if file_type.is_dir() {
      format!("D:{}", rel_path)
    } else if file_type.is_symlink() {
      let target = fs::read_link(entry_path).map_err(|e| DirHashError::ReadSymlink {
        path: entry_path.display().to_string(),
        message: e.to_string(),
      })?;
      format!("L:{}:{}", rel_path, hash_bytes(target.to_string_lossy().as_bytes()).0)
    } else {
      continue;
    };

    entries.push((rel_path, line));
  }

  entries.sort_by(|a, b| a.0.cmp(&b.0));

  let mut hasher = Sha256::new();
  for (_, line) in entries {
    hasher.update(line.as_bytes());
    hasher.update(b"\n");
  }

  Ok(ContentHash(format!("{:x}", hasher.finalize())))
}

/// Hash a single file's contents.
pub fn hash_file(path: &Path) -> Result<ContentHash, DirHashError> {
  let mut file = fs::File::open(path).map_err(|e| DirHashError::ReadFile {
    path: path.display().to_string(),
    message: e.to_string(),
  })?;

  let mut hasher = Sha256::new();
  let mut buffer = [0u8; 8192];

  loop {
    let bytes_read = file.read(&mut buffer).map_err(|e| DirHashError::ReadFile {
      path: path.display().to_string(),
      message: e.to_string(),
    })?;
    if bytes_read == 0 {
      break;
    }
    hasher.update(&buffer[..bytes_read]);
  }

  Ok(ContentHash(format!("{:x}", hasher.finalize())))
}

pub fn hash_bytes(data: &[u8]) -> ContentHash {
  let mut hasher = Sha256::new();
  hasher.update(data);
  ContentHash(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;
  use tempfile::tempdir;

  fn function_source(handler: &str) -> tempfile::TempDir {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("handler.py"), handler).unwrap();
    fs::write(temp.path().join("requirements.txt"), "boto3\n").unwrap();
    temp
  }

  #[test]
  fn hash_is_deterministic() {
    let src = function_source("def handler(event, context): pass\n");

    let first = hash_directory(src.path(), &[]).unwrap();
    let second = hash_directory(src.path(), &[]).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.0.len(), 64);
  }

  #[test]
  fn handler_edit_changes_hash() {
    let src = function_source("def handler(event, context): pass\n");
    let before = hash_directory(src.path(), &[]).unwrap();

    fs::write(src.path().join("handler.py"), "def handler(event, context): return 1\n").unwrap();
    let after = hash_directory(src.path(), &[]).unwrap();

    assert_ne!(before, after);
  }

  #[test]
  fn new_vendored_library_changes_hash() {
    let src = function_source("pass\n");
    let before = hash_directory(src.path(), &[]).unwrap();

    fs::create_dir(src.path().join("libs")).unwrap();
    fs::write(src.path().join("libs/PIL.py"), "# vendored").unwrap();
    let after = hash_directory(src.path(), &[]).unwrap();

    assert_ne!(before, after);
  }

  #[test]
  fn excluded_caches_do_not_affect_hash() {
    let src = function_source("pass\n");
    let before = hash_directory(src.path(), &["__pycache__"]).unwrap();

    fs::create_dir(src.path().join("__pycache__")).unwrap();
    fs::write(src.path().join("__pycache__/handler.cpython-39.pyc"), [0u8, 1, 2]).unwrap();
    let after = hash_directory(src.path(), &["__pycache__"]).unwrap();

    assert_eq!(before, after);
  }

  #[test]
  fn moving_a_file_changes_hash() {
    let flat = tempdir().unwrap();
    fs::write(flat.path().join("handler.py"), "pass").unwrap();

    let nested = tempdir().unwrap();
    fs::create_dir(nested.path().join("src")).unwrap();
    fs::write(nested.path().join("src/handler.py"), "pass").unwrap();

    assert_ne!(
      hash_directory(flat.path(), &[]).unwrap(),
      hash_directory(nested.path(), &[]).unwrap()
    );
  }

  #[test]
  fn missing_directory_is_an_error() {
    let temp = tempdir().unwrap();
    let result = hash_directory(&temp.path().join("lambdas/absent"), &[]);
    assert!(matches!(result, Err(DirHashError::NotFound { .. })));
  }

  #[test]
  fn hash_file_matches_hash_bytes() {
    let temp = tempdir().unwrap();
    let file = temp.path().join("handler.py");
    fs::write(&file, "hello world").unwrap();

    assert_eq!(hash_file(&file).unwrap(), hash_bytes(b"hello world"));
  }
}
