//! Per-file records and the ordered set they're collected into.

use std::collections::HashMap;

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::DecodeError;

/// Well-known property names. Not every record has every one of these.
pub mod keys {
    pub const FILE_NAME: &str = "FileName";
    pub const IMAGE_SIZE: &str = "ImageSize";
    pub const X_RESOLUTION: &str = "XResolution";
    pub const Y_RESOLUTION: &str = "YResolution";
    pub const RESOLUTION_UNIT: &str = "ResolutionUnit";
    pub const BIT_DEPTH: &str = "BitDepth";
    pub const COMPRESSION: &str = "Compression";

    /// Pixel width, for formats that only have a fixed header.
    pub const HEADER_WIDTH: &str = "resolution x";
    /// Pixel height, for formats that only have a fixed header.
    pub const HEADER_HEIGHT: &str = "resolution y";
}

/// A file's normalized metadata: property name to display value.
///
/// A missing key means "unknown", never zero.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Properties(pub HashMap<String, String>);

impl Properties {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One successfully decoded file.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ImageRecord {
    /// The file's path. Unique within one result set.
    pub identity: Utf8PathBuf,

    /// Everything we could read out of it.
    pub properties: Properties,
}

impl ImageRecord {
    pub fn new(identity: Utf8PathBuf, properties: Properties) -> Self {
        Self {
            identity,
            properties,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key)
    }

    /// A flattened view for table columns.
    ///
    /// Tag-based and header-based records name their dimensions differently,
    /// so this picks whichever one is there.
    pub fn summary(&self) -> SummaryRow {
        let name = self
            .get(keys::FILE_NAME)
            .map(String::from)
            .or_else(|| self.identity.file_name().map(String::from));

        let size = self.get(keys::IMAGE_SIZE).map(String::from).or_else(|| {
            let w = self.get(keys::HEADER_WIDTH)?;
            let h = self.get(keys::HEADER_HEIGHT)?;
            Some(format!("{w}x{h}"))
        });

        let dpi = match (self.get(keys::X_RESOLUTION), self.get(keys::Y_RESOLUTION)) {
            (Some(x), Some(y)) => Some(format!("{x}x{y}")),
            _ => None,
        };

        SummaryRow {
            name,
            size,
            dpi,
            depth: self.get(keys::BIT_DEPTH).map(String::from),
            compression: self.get(keys::COMPRESSION).map(String::from),
        }
    }
}

/// The columns a results table shows for each file. `None` is "unknown".
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SummaryRow {
    pub name: Option<String>,
    pub size: Option<String>,
    pub dpi: Option<String>,
    pub depth: Option<String>,
    pub compression: Option<String>,
}

/// The ordered records from one extraction run.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ResultSet {
    records: Vec<ImageRecord>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, record: ImageRecord) {
        self.records.push(record);
    }

    pub(crate) fn sort_by_identity(&mut self) {
        self.records.sort_by(|a, b| a.identity.cmp(&b.identity));
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ImageRecord> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[ImageRecord] {
        &self.records
    }

    /// Finds the record for `path`, if it made it in.
    pub fn get(&self, path: impl AsRef<Utf8Path>) -> Option<&ImageRecord> {
        let path = path.as_ref();
        self.records.iter().find(|r| r.identity.as_path() == path)
    }

    /// One [`SummaryRow`] per record, in order.
    pub fn summary_rows(&self) -> Vec<SummaryRow> {
        self.records.iter().map(ImageRecord::summary).collect()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a ImageRecord;
    type IntoIter = std::slice::Iter<'a, ImageRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl IntoIterator for ResultSet {
    type Item = ImageRecord;
    type IntoIter = std::vec::IntoIter<ImageRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

/// What happened to one entry found during a walk.
#[derive(Debug)]
pub enum Outcome {
    Extracted(ImageRecord),
    Skipped(Skipped),
}

/// An entry that didn't make it into the result set, and why.
#[derive(Debug)]
pub struct Skipped {
    /// Where it was, if the walk could tell us.
    pub path: Option<String>,
    pub reason: SkipReason,
}

#[derive(Debug)]
pub enum SkipReason {
    /// The filesystem walk itself failed here (permissions, vanished path...).
    Walk(String),

    /// The path isn't UTF-8, so it can't be a record identity.
    NonUtf8Path,

    /// The file was there, but its format-specific decode failed.
    Decode(DecodeError),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Walk(msg) => write!(f, "walk error: {msg}"),
            SkipReason::NonUtf8Path => write!(f, "path isn't UTF-8"),
            SkipReason::Decode(e) => write!(f, "decode error: {e}"),
        }
    }
}

/// Every outcome from one run, in the order they were decided.
#[derive(Debug, Default)]
pub struct Extraction {
    outcomes: Vec<Outcome>,
}

impl Extraction {
    pub(crate) fn new(outcomes: Vec<Outcome>) -> Self {
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    /// Entries that were left out.
    pub fn skipped(&self) -> impl Iterator<Item = &Skipped> {
        self.outcomes.iter().filter_map(|o| match o {
            Outcome::Skipped(s) => Some(s),
            Outcome::Extracted(_) => None,
        })
    }

    /// Drops the skip reasons and keeps the records, in order.
    pub fn into_result_set(self) -> ResultSet {
        let mut set = ResultSet::new();
        for outcome in self.outcomes {
            if let Outcome::Extracted(record) = outcome {
                set.push(record);
            }
        }
        set
    }
}
