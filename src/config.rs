use camino::Utf8Path;

use crate::error::ConfigError;

/// How many files are decoded at once when nothing else is configured.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Settings for one [`Extractor`](crate::extract::Extractor).
///
/// There's no global copy of this. Whoever runs the pipeline owns it.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    /// Extensions (without the dot) the selection surface will accept for
    /// single files. Compared case-insensitively.
    pub allowed_extensions: Vec<String>,

    /// The number of files being decoded at the same time.
    ///
    /// Anything below one is treated as one.
    pub concurrency: usize,

    /// The order of records in the final result set.
    pub order: ResultOrder,
}

impl Config {
    pub fn new(allowed_extensions: Vec<String>, concurrency: usize, order: ResultOrder) -> Self {
        Self {
            allowed_extensions,
            concurrency,
            order,
        }
    }

    /// Attempts to read a `Config` from a TOML file on disk.
    ///
    /// Missing keys take their default values.
    #[tracing::instrument]
    pub async fn from_disk(path: &Utf8Path) -> Result<Self, ConfigError> {
        let s = tokio::fs::read_to_string(path)
            .await
            .inspect_err(|e| tracing::warn!("Failed to read config file. err: {e}"))
            .map_err(ConfigError::ReadFailed)?;

        Self::from_toml(&s)
    }

    /// Parses a `Config` from a TOML string.
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::ParseFailed)
    }

    /// The effective concurrency, never zero.
    pub fn concurrency(&self) -> usize {
        self.concurrency.max(1)
    }

    /// Checks whether `extension` is in the allow-list.
    pub fn allows_extension(&self, extension: &str) -> bool {
        let extension = extension.trim_start_matches('.');
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(extension))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            allowed_extensions: ["png", "jpg", "gif", "tif", "bmp", "pcx"]
                .into_iter()
                .map(String::from)
                .collect(),
            concurrency: DEFAULT_CONCURRENCY,
            order: ResultOrder::default(),
        }
    }
}

/// The order that records come back in.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ResultOrder {
    /// The order the directory walk found the files in.
    #[default]
    Discovery,

    /// Sorted by file path.
    Path,
}
