//! The parent of the other tests.
//!
//! Setup, plus tiny image files written byte by byte so the tests don't need
//! checked-in assets.

use std::str::FromStr as _;

use camino::{Utf8Path, Utf8PathBuf};
use temp_dir::TempDir;
use tracing_subscriber::{filter, layer::SubscriberExt as _, util::SubscriberInitExt as _, Layer};

/// call this at the top of any new test func! :)
#[allow(dead_code, reason = "it's used in the other tests")]
pub fn setup() {
    // every test in a binary calls this, so only the first one wins
    _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_test_writer()
                .with_filter(filter::EnvFilter::from_str("DEBUG").unwrap()),
        )
        .try_init();
}

/// A fresh directory that's deleted on drop, plus its UTF-8 path.
#[allow(dead_code, reason = "it's used in the other tests")]
pub fn scratch() -> (TempDir, Utf8PathBuf) {
    let dir = TempDir::new().expect("create temp dir");
    let path = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("temp dir is utf-8");
    (dir, path)
}

/// Writes `bytes` to `dir/name`, making parent folders as needed.
#[allow(dead_code, reason = "it's used in the other tests")]
pub fn write(dir: &Utf8Path, name: &str, bytes: &[u8]) -> Utf8PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create fixture folders");
    }
    std::fs::write(&path, bytes).expect("write fixture");
    path
}

/// Counts regular files under `dir` without going through the crate.
#[allow(dead_code, reason = "it's used in the other tests")]
pub fn count_files(dir: &Utf8Path) -> usize {
    let mut count = 0;
    for entry in std::fs::read_dir(dir).expect("read fixture dir") {
        let entry = entry.expect("fixture entry");
        let path = Utf8PathBuf::try_from(entry.path()).expect("utf-8 fixture path");
        let file_type = entry.file_type().expect("fixture file type");

        if file_type.is_dir() {
            count += count_files(&path);
        } else if file_type.is_file() {
            count += 1;
        }
    }
    count
}

/// An uncompressed 24-bit `BITMAPINFOHEADER` bitmap, pixels and all.
#[allow(dead_code, reason = "it's used in the other tests")]
pub fn bmp(width: u32, height: u32) -> Vec<u8> {
    let row = (width * 3).div_ceil(4) * 4;
    let pixels = row * height;

    let mut b = Vec::with_capacity(54 + pixels as usize);
    b.extend_from_slice(b"BM");
    b.extend_from_slice(&(54 + pixels).to_le_bytes()); // file size
    b.extend_from_slice(&[0; 4]); // reserved
    b.extend_from_slice(&54_u32.to_le_bytes()); // pixel data offset

    b.extend_from_slice(&40_u32.to_le_bytes()); // dib header size
    b.extend_from_slice(&(width as i32).to_le_bytes());
    b.extend_from_slice(&(height as i32).to_le_bytes());
    b.extend_from_slice(&1_u16.to_le_bytes()); // planes
    b.extend_from_slice(&24_u16.to_le_bytes()); // bits per pixel
    b.extend_from_slice(&0_u32.to_le_bytes()); // compression: none
    b.extend_from_slice(&pixels.to_le_bytes());
    b.extend_from_slice(&2835_u32.to_le_bytes()); // ~72 dpi
    b.extend_from_slice(&2835_u32.to_le_bytes());
    b.extend_from_slice(&0_u32.to_le_bytes()); // colors used
    b.extend_from_slice(&0_u32.to_le_bytes()); // colors important

    b.resize(54 + pixels as usize, 0);
    b
}

/// A GIF89a with a `width`x`height` screen and one 1x1 frame.
#[allow(dead_code, reason = "it's used in the other tests")]
pub fn gif(width: u16, height: u16) -> Vec<u8> {
    let mut g = b"GIF89a".to_vec();
    g.extend_from_slice(&width.to_le_bytes());
    g.extend_from_slice(&height.to_le_bytes());
    g.extend_from_slice(&[0x80, 0x00, 0x00]); // 2-color global table
    g.extend_from_slice(&[0x00, 0x00, 0x00, 0xff, 0xff, 0xff]);

    // image descriptor at (0, 0), 1x1, no local table
    g.push(0x2c);
    g.extend_from_slice(&[0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00]);
    g.extend_from_slice(&[0x02, 0x02, 0x44, 0x01, 0x00]); // lzw data
    g.push(0x3b);
    g
}

/// One IFD0 entry for [`tiff_with`]: tag, TIFF type, value count, and the
/// raw little-endian value bytes.
#[allow(dead_code, reason = "it's used in the other tests")]
pub struct TiffField {
    pub tag: u16,
    pub kind: u16,
    pub count: u32,
    pub bytes: Vec<u8>,
}

#[allow(dead_code, reason = "it's used in the other tests")]
pub const ASCII: u16 = 2;
#[allow(dead_code, reason = "it's used in the other tests")]
pub const SHORT: u16 = 3;
#[allow(dead_code, reason = "it's used in the other tests")]
pub const RATIONAL: u16 = 5;

#[allow(dead_code, reason = "it's used in the other tests")]
pub fn short_field(tag: u16, values: &[u16]) -> TiffField {
    TiffField {
        tag,
        kind: SHORT,
        count: values.len() as u32,
        bytes: values.iter().flat_map(|v| v.to_le_bytes()).collect(),
    }
}

/// A little-endian TIFF with only an IFD0: RGB, 8 bits per sample,
/// uncompressed, `dpi` pixels per inch. There's no pixel data; nothing here
/// reads it.
#[allow(dead_code, reason = "it's used in the other tests")]
pub fn tiff(width: u16, height: u16, dpi: u32) -> Vec<u8> {
    let rational = |tag| TiffField {
        tag,
        kind: RATIONAL,
        count: 1,
        bytes: [dpi.to_le_bytes(), 1_u32.to_le_bytes()].concat(),
    };

    tiff_with(vec![
        short_field(256, &[width]),  // ImageWidth
        short_field(257, &[height]), // ImageLength
        short_field(258, &[8, 8, 8]), // BitsPerSample
        short_field(259, &[1]),      // Compression
        rational(282),               // XResolution
        rational(283),               // YResolution
        short_field(296, &[2]),      // ResolutionUnit: inches
    ])
}

/// A little-endian TIFF with exactly these IFD0 `fields`, sorted by tag.
/// Values over four bytes are placed after the IFD.
#[allow(dead_code, reason = "it's used in the other tests")]
pub fn tiff_with(mut fields: Vec<TiffField>) -> Vec<u8> {
    fields.sort_by_key(|f| f.tag);

    let entries = u16::try_from(fields.len()).expect("fits in one ifd");
    let mut extra_at = 8 + 2 + 12 * u32::from(entries) + 4;
    let mut extra = Vec::new();

    let mut t = b"II*\0".to_vec();
    t.extend_from_slice(&8_u32.to_le_bytes());
    t.extend_from_slice(&entries.to_le_bytes());

    for field in &fields {
        t.extend_from_slice(&field.tag.to_le_bytes());
        t.extend_from_slice(&field.kind.to_le_bytes());
        t.extend_from_slice(&field.count.to_le_bytes());

        if field.bytes.len() <= 4 {
            let mut inline = field.bytes.clone();
            inline.resize(4, 0);
            t.extend_from_slice(&inline);
        } else {
            t.extend_from_slice(&extra_at.to_le_bytes());
            extra.extend_from_slice(&field.bytes);
            // offsets are word-aligned
            if field.bytes.len() % 2 == 1 {
                extra.push(0);
            }
            extra_at = 8 + 2 + 12 * u32::from(entries) + 4 + extra.len() as u32;
        }
    }
    t.extend_from_slice(&0_u32.to_le_bytes()); // no next ifd
    t.extend_from_slice(&extra);

    t
}

/// A JPEG that's nothing but an APP1 Exif segment around `tiff`.
#[allow(dead_code, reason = "it's used in the other tests")]
pub fn jpeg_with_exif(tiff: &[u8]) -> Vec<u8> {
    let mut j = vec![0xff, 0xd8, 0xff, 0xe1];
    let len = u16::try_from(2 + 6 + tiff.len()).expect("exif segment fits");
    j.extend_from_slice(&len.to_be_bytes());
    j.extend_from_slice(b"Exif\0\0");
    j.extend_from_slice(tiff);
    j.extend_from_slice(&[0xff, 0xd9]);
    j
}
