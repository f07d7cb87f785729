//! Walks a root path and collects one record per decodable file.
//!
//! A file that can't be read or decoded is skipped, and so is a directory
//! entry the walk itself stumbles on. Neither stops the rest of the walk.
//! Only a bad root path fails the whole call.

use std::path::PathBuf;

use async_walkdir::WalkDir;
use camino::{Utf8Path, Utf8PathBuf};
use futures::stream::StreamExt as _;

use crate::{
    config::{Config, ResultOrder},
    error::PathError,
    models::{
        decode,
        record::{Extraction, ImageRecord, Outcome, ResultSet, SkipReason, Skipped},
    },
};

/// Runs the extraction pipeline with a given [`Config`].
#[derive(Clone, Debug, Default)]
pub struct Extractor {
    config: Config,
}

impl Extractor {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Collects the records for everything under `root`.
    ///
    /// Skipped files are dropped; use [`Extractor::extract`] to see them.
    pub async fn extract_metadata(
        &self,
        root: impl AsRef<Utf8Path>,
    ) -> Result<ResultSet, PathError> {
        let extraction = self.extract(root).await?;
        for skipped in extraction.skipped() {
            tracing::debug!(
                "left out of the result set: `{}` ({})",
                skipped.path.as_deref().unwrap_or("<unknown>"),
                skipped.reason
            );
        }

        let mut set = extraction.into_result_set();
        if self.config.order == ResultOrder::Path {
            set.sort_by_identity();
        }

        Ok(set)
    }

    /// Walks `root` and decides an [`Outcome`] for every file found.
    ///
    /// `root` may be a single file, in which case only that file is looked
    /// at. Outcomes come back in walk order, even though up to
    /// [`Config::concurrency`] files are decoded at once.
    #[tracing::instrument(skip_all)]
    pub async fn extract(&self, root: impl AsRef<Utf8Path>) -> Result<Extraction, PathError> {
        let root = root.as_ref();
        let root_str = root.to_string();
        tracing::debug!("extracting metadata from `{root_str}`...");

        let metadata = tokio::fs::metadata(root)
            .await
            .inspect_err(|e| tracing::error!("Failed to look at the root path. err: {e}"))
            .map_err(|err| match err.kind() {
                std::io::ErrorKind::NotFound => PathError::RootDoesntExist {
                    path: root_str.clone(),
                },
                _ => PathError::RootUnreadable {
                    path: root_str.clone(),
                    err,
                },
            })?;

        // a file as the root is just a walk with one entry
        if !metadata.is_dir() {
            tracing::debug!("root is a single file.");
            let outcome = visit_file(root.to_path_buf()).await;
            return Ok(Extraction::new(vec![outcome]));
        }

        // make sure we can actually list it before we start
        tokio::fs::read_dir(root)
            .await
            .inspect_err(|e| tracing::error!("Root directory isn't readable. err: {e}"))
            .map_err(|err| PathError::RootUnreadable {
                path: root_str.clone(),
                err,
            })?;

        tracing::debug!("walking directory...");
        let outcomes: Vec<Outcome> = WalkDir::new(root.as_std_path())
            .map(|entry| async move {
                match entry {
                    Ok(entry) => visit_entry(entry.path()).await,
                    Err(e) => {
                        tracing::warn!("Walk failed on an entry. Skipping it. err: {e}");
                        Some(Outcome::Skipped(Skipped {
                            path: None,
                            reason: SkipReason::Walk(e.to_string()),
                        }))
                    }
                }
            })
            .buffered(self.config.concurrency())
            .filter_map(|outcome| async move { outcome })
            .collect()
            .await;

        tracing::debug!("walk complete! saw {} files.", outcomes.len());
        Ok(Extraction::new(outcomes))
    }
}

/// Runs the pipeline over `root` with the default [`Config`].
pub async fn extract_metadata(root: impl AsRef<Utf8Path>) -> Result<ResultSet, PathError> {
    Extractor::default().extract_metadata(root).await
}

/// Decides what to do with one walked entry. Directories give `None`, since
/// the walk goes into them on its own.
///
/// Symlinks are followed here, so a link to a file is decoded. A link to a
/// directory also gives `None`, and the walk doesn't go into it either:
/// its contents are left out.
async fn visit_entry(path: PathBuf) -> Option<Outcome> {
    let path_str = path.to_string_lossy().to_string();

    // follows symlinks, so a link to a file counts as a file
    let metadata = match tokio::fs::metadata(&path).await {
        Ok(m) => m,
        Err(e) => {
            tracing::warn!("Failed to look at `{path_str}`. Skipping it. err: {e}");
            return Some(Outcome::Skipped(Skipped {
                path: Some(path_str),
                reason: SkipReason::Walk(e.to_string()),
            }));
        }
    };

    if metadata.is_dir() {
        return None;
    }

    if !metadata.is_file() {
        tracing::debug!("`{path_str}` isn't a regular file. ignoring it.");
        return None;
    }

    // give up if we don't have a utf-8 path
    let Ok(utf8_path) = Utf8PathBuf::from_path_buf(path) else {
        tracing::warn!("Failed to process file, as its path wasn't UTF-8. path: `{path_str}`");
        return Some(Outcome::Skipped(Skipped {
            path: Some(path_str),
            reason: SkipReason::NonUtf8Path,
        }));
    };

    Some(visit_file(utf8_path).await)
}

/// Decodes one file into an [`Outcome`]. Errors stay here.
async fn visit_file(path: Utf8PathBuf) -> Outcome {
    match decode::decode(&path).await {
        Ok(properties) => Outcome::Extracted(ImageRecord::new(path, properties)),
        Err(e) => {
            tracing::warn!("Failed to decode `{path}`. Skipping it. err: {e}");
            Outcome::Skipped(Skipped {
                path: Some(path.to_string()),
                reason: SkipReason::Decode(e),
            })
        }
    }
}
