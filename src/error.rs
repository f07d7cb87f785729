use core::error::Error;
use pisserror::Error;

/// The root path handed to the pipeline was unusable.
///
/// This is the only error that fails a whole extraction. Everything else is
/// contained at the file or field level.
#[derive(Debug, Error)]
pub enum PathError {
    #[error("The root path at `{path}` was expected to exist, but didn't.")]
    RootDoesntExist { path: String },

    #[error("The root path at `{path}` exists, but couldn't be read. Err: `{err}`.")]
    RootUnreadable { path: String, err: std::io::Error },
}

/// A single file couldn't be decoded. The file is skipped.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Failed to open or read the file at `{path}`. Err: `{err}`.")]
    FileReadFailure { path: String, err: std::io::Error },

    #[error("(KAMADAK) An error occured when parsing metadata for file at `{_0}`. See: `{_1}`.")]
    KamadakExifError(String, kamadak_exif::Error),

    #[error("An error occured when reading the image header at `{_0}`. See: `{_1}`.")]
    ImageError(String, image::ImageError),

    #[error("The header of the file at `{path}` was truncated. Needed {needed} bytes, got {got}.")]
    TruncatedHeader {
        path: String,
        needed: usize,
        got: usize,
    },

    #[error("The file at `{path}` doesn't start with a `{expected}` signature.")]
    BadSignature { path: String, expected: String },

    #[error("A blocking decode task unexpectedly panicked. See: `{_0}`")]
    TokioJoinError(#[from] tokio::task::JoinError),
}

/// One metadata field couldn't be turned into a display value. Only that
/// field is dropped.
#[derive(Debug, Error)]
pub enum FieldError {
    #[error("The field `{tag}` didn't contain any values.")]
    EmptyValue { tag: String },

    #[error("The text field `{tag}` wasn't valid UTF-8.")]
    NotText { tag: String },

    #[error("The field `{tag}` has an unknown TIFF type ({type_id}).")]
    UnknownType { tag: String, type_id: u16 },
}

/// The selection surface picked something the pipeline won't accept.
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("`{path}` is not valid: it has no file extension.")]
    NoExtension { path: String },

    #[error("`{path}` is not valid: `.{extension}` files aren't accepted.")]
    ExtensionNotAllowed { path: String, extension: String },

    #[error("`{path}` is not valid: it's neither a file nor a directory.")]
    NotFileOrDirectory { path: String },

    #[error("Couldn't look at the selected path `{path}`. Err: `{err}`.")]
    Inaccessible { path: String, err: std::io::Error },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    /// during fs read from disk
    #[error("Failed to read config file. See: `{_0}`")]
    ReadFailed(#[from] std::io::Error),

    /// parsing
    #[error("Failed to parse config file. See: `{_0}`")]
    ParseFailed(#[from] toml::de::Error),
}
