//! The header-based decoder, for formats without a tag block.
//!
//! Pixel dimensions come from the `image` crate, which only reads the header
//! for this. The few other fields these formats keep at fixed offsets (bit
//! depth, compression) are read straight from the header bytes.

use std::io::{BufReader, Read as _, Seek as _};

use camino::Utf8Path;
use image::{ImageFormat, ImageReader};

use crate::{
    error::DecodeError,
    models::{
        format::Format,
        record::{keys, Properties},
    },
};

/// Enough bytes for every fixed field we look at.
const HEADER_LEN: u64 = 64;

/// Reads the header of the file at `path` and synthesizes its properties.
#[tracing::instrument]
pub async fn decode(path: &Utf8Path, format: Format) -> Result<Properties, DecodeError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || read_header(&path, format)).await?
}

fn read_header(path: &Utf8Path, format: Format) -> Result<Properties, DecodeError> {
    let read_err = |err| DecodeError::FileReadFailure {
        path: path.to_string(),
        err,
    };

    let file = std::fs::File::open(path)
        .inspect_err(|e| tracing::warn!("Failed to open file for header decoding! err: {e}"))
        .map_err(read_err)?;
    let mut reader = BufReader::new(file);

    // grab the fixed header first, then hand the same reader to `image`
    let mut header = Vec::with_capacity(HEADER_LEN as usize);
    (&mut reader)
        .take(HEADER_LEN)
        .read_to_end(&mut header)
        .map_err(read_err)?;
    reader.rewind().map_err(read_err)?;

    let mut properties = match format {
        Format::Bitmap => bitmap_fields(path, &header)?,
        Format::Gif => gif_fields(path, &header)?,
        Format::Exif => Properties::new(),
    };

    let mut image_reader = ImageReader::new(reader);
    if let Some(image_format) = image_format(format) {
        image_reader.set_format(image_format);
    }

    let (width, height) = image_reader
        .into_dimensions()
        .inspect_err(|e| tracing::warn!("`image` failed to read the header. err: {e}"))
        .map_err(|e| DecodeError::ImageError(path.to_string(), e))?;
    tracing::debug!("got image dimensions from image crate: {width}x{height}");

    properties.insert(keys::HEADER_WIDTH, width.to_string());
    properties.insert(keys::HEADER_HEIGHT, height.to_string());

    Ok(properties)
}

fn image_format(format: Format) -> Option<ImageFormat> {
    match format {
        Format::Bitmap => Some(ImageFormat::Bmp),
        Format::Gif => Some(ImageFormat::Gif),
        Format::Exif => None,
    }
}

/// Bit depth and compression from a `BITMAPCOREHEADER` or any of the
/// `BITMAPINFOHEADER` family.
fn bitmap_fields(path: &Utf8Path, header: &[u8]) -> Result<Properties, DecodeError> {
    require(path, header, 18)?;
    if &header[0..2] != b"BM" {
        return Err(DecodeError::BadSignature {
            path: path.to_string(),
            expected: "BM".into(),
        });
    }

    let mut properties = Properties::new();
    let dib_size = u32::from_le_bytes([header[14], header[15], header[16], header[17]]);

    if dib_size == 12 {
        // os/2 style: 16-bit dimensions, and no compression field at all
        require(path, header, 26)?;
        let bit_count = u16::from_le_bytes([header[24], header[25]]);
        properties.insert(keys::BIT_DEPTH, bit_count.to_string());
    } else {
        require(path, header, 34)?;
        let bit_count = u16::from_le_bytes([header[28], header[29]]);
        let compression = u32::from_le_bytes([header[30], header[31], header[32], header[33]]);
        properties.insert(keys::BIT_DEPTH, bit_count.to_string());
        properties.insert(keys::COMPRESSION, bitmap_compression_name(compression));
    }

    Ok(properties)
}

/// Bit depth is the logical screen descriptor's color resolution (bits per
/// primary color), not the global color table's size. GIF image data is
/// always LZW.
fn gif_fields(path: &Utf8Path, header: &[u8]) -> Result<Properties, DecodeError> {
    require(path, header, 13)?;
    if &header[0..6] != b"GIF87a" && &header[0..6] != b"GIF89a" {
        return Err(DecodeError::BadSignature {
            path: path.to_string(),
            expected: "GIF87a/GIF89a".into(),
        });
    }

    let packed = header[10];
    let color_resolution = ((packed >> 4) & 0x07) + 1;

    let mut properties = Properties::new();
    properties.insert(keys::BIT_DEPTH, color_resolution.to_string());
    properties.insert(keys::COMPRESSION, "LZW");
    Ok(properties)
}

fn require(path: &Utf8Path, header: &[u8], needed: usize) -> Result<(), DecodeError> {
    if header.len() < needed {
        tracing::warn!("header is too short. wanted {needed} bytes, got {}", header.len());
        return Err(DecodeError::TruncatedHeader {
            path: path.to_string(),
            needed,
            got: header.len(),
        });
    }

    Ok(())
}

fn bitmap_compression_name(code: u32) -> String {
    match code {
        0 => "uncompressed",
        1 => "RLE8",
        2 => "RLE4",
        3 => "bitfields",
        4 => "JPEG",
        5 => "PNG",
        6 => "alpha bitfields",
        11 => "CMYK",
        12 => "CMYK RLE8",
        13 => "CMYK RLE4",
        other => return other.to_string(),
    }
    .to_string()
}
