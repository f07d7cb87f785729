use camino::Utf8Path;

/// The closed set of formats the dispatcher knows how to handle.
///
/// New formats get a new variant here (and a decoder arm), not another
/// `if` somewhere else.
#[derive(
    Clone, Copy, Debug, PartialEq, PartialOrd, Eq, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum Format {
    /// Anything with an embedded TIFF-style tag block: JPEG, TIFF, HEIF, PNG,
    /// WebP... It's also the fallback for extensions we don't recognize.
    Exif,

    /// Windows bitmaps. There's no tag block, only a fixed header.
    Bitmap,

    /// GIF. Same story as bitmaps: just a fixed header.
    Gif,
}

/// How a [`Format`] gets its metadata out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DecoderKind {
    /// Walks named metadata fields.
    TagBased,
    /// Reads fixed offsets in the file header.
    HeaderBased,
}

impl Format {
    /// Picks a format from a (case-insensitive) extension, without the dot.
    pub fn from_extension(extension: &str) -> Self {
        match extension.to_ascii_lowercase().as_str() {
            "bmp" | "dib" => Format::Bitmap,
            "gif" => Format::Gif,
            "jpg" | "jpeg" | "jpe" | "tif" | "tiff" | "png" | "webp" | "heic" | "heif"
            | "avif" => Format::Exif,
            other => {
                tracing::trace!("unknown extension `{other}`. using the tag-based fallback.");
                Format::Exif
            }
        }
    }

    /// Picks a format for the file at `path`. Files without an extension get
    /// the fallback.
    pub fn from_path(path: &Utf8Path) -> Self {
        path.extension()
            .map(Self::from_extension)
            .unwrap_or(Format::Exif)
    }

    pub fn decoder_kind(&self) -> DecoderKind {
        match self {
            Format::Exif => DecoderKind::TagBased,
            Format::Bitmap | Format::Gif => DecoderKind::HeaderBased,
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Format::Exif => write!(f, "Exif"),
            Format::Bitmap => write!(f, "Bitmap"),
            Format::Gif => write!(f, "Gif"),
        }
    }
}
