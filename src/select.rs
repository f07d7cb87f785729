//! Checks a picked path before any extraction happens.
//!
//! Whatever lets a person (or an upload handler) choose a path should run it
//! through [`validate`] first. Directories are always fine. Single files need
//! an extension from [`Config::allowed_extensions`].

use camino::{Utf8Path, Utf8PathBuf};

use crate::{config::Config, error::SelectionError};

/// A path that passed [`validate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    /// Info about this one file.
    File(Utf8PathBuf),
    /// Info about every file under this directory.
    Directory(Utf8PathBuf),
}

impl Selection {
    /// The path to hand to the extractor.
    pub fn root(&self) -> &Utf8Path {
        match self {
            Selection::File(p) | Selection::Directory(p) => p,
        }
    }

    /// The directory the selection lives in (or is).
    pub fn directory(&self) -> Option<&Utf8Path> {
        match self {
            Selection::File(p) => p.parent(),
            Selection::Directory(p) => Some(p),
        }
    }
}

/// Accepts or rejects `path` against `config`.
#[tracing::instrument(skip(config))]
pub async fn validate(path: &Utf8Path, config: &Config) -> Result<Selection, SelectionError> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|err| SelectionError::Inaccessible {
            path: path.to_string(),
            err,
        })?;

    if metadata.is_dir() {
        return Ok(Selection::Directory(path.to_path_buf()));
    }

    if !metadata.is_file() {
        return Err(SelectionError::NotFileOrDirectory {
            path: path.to_string(),
        });
    }

    check_extension(path, config)?;
    Ok(Selection::File(path.to_path_buf()))
}

/// The extension half of [`validate`], without touching the filesystem.
pub fn check_extension(path: &Utf8Path, config: &Config) -> Result<(), SelectionError> {
    let extension = path.extension().ok_or_else(|| SelectionError::NoExtension {
        path: path.to_string(),
    })?;

    if !config.allows_extension(extension) {
        tracing::debug!("rejected selection with extension `{extension}`");
        return Err(SelectionError::ExtensionNotAllowed {
            path: path.to_string(),
            extension: extension.to_string(),
        });
    }

    Ok(())
}
