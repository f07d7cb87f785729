/*! # `metascan`

Pulls structural metadata (dimensions, resolution, bit depth, compression)
out of image files and hands it back as one table-shaped result.

## Purpose

Image formats don't agree on how they store this stuff. Some carry a
TIFF-style block of named tags (JPEG, TIFF, HEIF, PNG with `eXIf`...). Others
only have a fixed binary header (BMP, GIF). `metascan` reads both, normalizes
every value into a string, and collects one [`ImageRecord`] per file.

A file that can't be read or decoded is left out of the results instead of
stopping the batch. Only a root path that doesn't exist (or can't be read)
is an error.

## Usage

```no_run
# async fn run() -> Result<(), metascan::error::PathError> {
let results = metascan::extract_metadata("photos/").await?;

for row in results.summary_rows() {
    println!("{:?} {:?}", row.name, row.size);
}
# Ok(())
# }
```

## Status

- [x] Tag-based formats (through `kamadak-exif`)
- [x] Header-based formats: BMP, GIF (through `image`)
- [ ] PCX. It's accepted by the default selection filter, but nothing reads
      it yet, so those files get skipped.
*/

pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod select;

pub use config::{Config, ResultOrder};
pub use extract::{extract_metadata, Extractor};
pub use models::record::{ImageRecord, Properties, ResultSet, SummaryRow};
