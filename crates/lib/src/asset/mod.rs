//! Function source assets.
//!
//! Assembly only hashes a function's source directory; synthesis packages it
//! into a zip archive next to the manifest. Archives are reproducible: entries
//! are sorted and carry a fixed timestamp, so the same source always yields
//! byte-identical archives.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::consts::{ASSET_ARCHIVE_FILE, ASSET_EXCLUDES};
use crate::resource::{ArtifactAsset, AssetKind, LogicalId};
use crate::util::hash::{DirHashError, hash_directory};

#[derive(Debug, Error)]
pub enum AssetError {
  #[error(transparent)]
  Hash(#[from] DirHashError),

  #[error("io error at {}: {source}", path.display())]
  Io { path: PathBuf, source: std::io::Error },

  #[error("failed to write archive {}: {source}", path.display())]
  Zip {
    path: PathBuf,
    source: zip::result::ZipError,
  },
}

/// Describe the asset for a source directory, hashing its current content.
pub fn artifact_from_source(source: &Path) -> Result<ArtifactAsset, AssetError> {
  let hash = hash_directory(source, ASSET_EXCLUDES)?;
  let source = dunce::canonicalize(source).map_err(|e| AssetError::Io {
    path: source.to_path_buf(),
    source: e,
  })?;

  Ok(ArtifactAsset {
    source,
    kind: AssetKind::Archive,
    hash,
  })
}

/// Location of a packaged asset, relative to the stack's output directory.
pub fn archive_path(id: &LogicalId, asset: &ArtifactAsset) -> PathBuf {
  PathBuf::from("assets")
    .join(id.as_str())
    .join(&asset.hash.0)
    .join(ASSET_ARCHIVE_FILE)
}

/// Package an asset under `stack_dir`, returning the archive path.
///
/// Existing archives are kept: the path embeds the content hash, so an
/// archive that exists is already current.
pub fn package(id: &LogicalId, asset: &ArtifactAsset, stack_dir: &Path) -> Result<PathBuf, AssetError> {
  let dest = stack_dir.join(archive_path(id, asset));
  if dest.exists() {
    debug!(asset = %id, path = %dest.display(), "archive up to date");
    return Ok(dest);
  }

  if let Some(parent) = dest.parent() {
    fs::create_dir_all(parent).map_err(|source| AssetError::Io {
      path: parent.to_path_buf(),
      source,
    })?;
  }

  match asset.kind {
    AssetKind::Archive => write_archive(&asset.source, &dest)?,
  }

  info!(asset = %id, path = %dest.display(), "packaged asset");
  Ok(dest)
}

fn write_archive(source: &Path, dest: &Path) -> Result<(), AssetError> {
  let zip_err = |source| AssetError::Zip {
    path: dest.to_path_buf(),
    source,
  };
  let io_err = |path: &Path, source| AssetError::Io {
    path: path.to_path_buf(),
    source,
  };

  let file = fs::File::create(dest).map_err(|e| io_err(dest, e))?;
  let mut zip = ZipWriter::new(file);
  let options = SimpleFileOptions::default()
    .compression_method(CompressionMethod::Deflated)
    .last_modified_time(DateTime::default())
    .unix_permissions(0o644);

  let walker = WalkDir::new(source).sort_by_file_name().into_iter().filter_entry(|e| {
    e.file_name()
      .to_str()
      .map(|name| !ASSET_EXCLUDES.contains(&name))
      .unwrap_or(true)
  });

  for entry in walker {
    let entry = entry.map_err(|e| DirHashError::WalkDir { message: e.to_string() })?;
    let path = entry.path();
    let name = path
      .strip_prefix(source)
      .unwrap_or(path)
      .to_string_lossy()
      .replace('\\', "/");

    if name.is_empty() {
      continue;
    }

    let file_type = entry.file_type();
    if file_type.is_dir() {
      zip.add_directory(name, options).map_err(zip_err)?;
    } else if file_type.is_file() {
      zip.start_file(name, options).map_err(zip_err)?;
      let content = fs::read(path).map_err(|e| io_err(path, e))?;
      zip.write_all(&content).map_err(|e| io_err(dest, e))?;
    } else {
      warn!(path = %path.display(), "skipping non-regular file in asset");
    }
  }

  zip.finish().map_err(zip_err)?;
  Ok(())
}
