//! # Decoders
//!
//! Turns one file into a [`Properties`] map, whatever its format.
//!
//! There are two kinds of decoder behind one contract:
//!
//! - [`kamadak`] walks a named-field (EXIF/TIFF) metadata block and keeps
//!   every field it can display.
//! - [`image_crate`] reads the fixed header of formats that don't have such a
//!   block, and synthesizes `resolution x`/`resolution y` from the pixel grid.
//!
//! Picking one is the job of [`Format`], based on the file extension.

pub mod image_crate;
pub mod kamadak;

use camino::Utf8Path;

use crate::{
    error::DecodeError,
    models::{
        format::Format,
        record::{keys, Properties},
    },
};

/// Decodes the file at `path` into normalized properties.
///
/// This only ever reads the file. If it fails, nothing is left behind, and
/// it's up to the caller to decide whether to keep going.
#[tracing::instrument]
pub async fn decode(path: &Utf8Path) -> Result<Properties, DecodeError> {
    let format = Format::from_path(path);
    tracing::debug!("decoding file as `{format}`...");

    let mut properties = format.decode(path).await?;

    if let Some(name) = path.file_name() {
        properties.insert(keys::FILE_NAME, name);
    }

    tracing::debug!("decoded {} properties!", properties.len());
    Ok(properties)
}

impl Format {
    /// Runs this format's decoder on `path`.
    pub async fn decode(self, path: &Utf8Path) -> Result<Properties, DecodeError> {
        match self {
            Format::Exif => kamadak::decode(path).await,
            Format::Bitmap | Format::Gif => image_crate::decode(path, self).await,
        }
    }
}
