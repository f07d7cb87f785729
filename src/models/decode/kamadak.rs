//! The tag-based decoder, using `kamadak_exif`.

use std::io::BufReader;

use camino::Utf8Path;
use kamadak_exif::{Exif, In, Tag, Value};

use crate::{
    error::{DecodeError, FieldError},
    models::{
        record::{keys, Properties},
        value::{normalize, FieldValue, OtherValue, Rational},
    },
};

/// Reads the metadata block of the file at `path` and maps every displayable
/// primary-image field to its normalized value.
#[tracing::instrument]
pub async fn decode(path: &Utf8Path) -> Result<Properties, DecodeError> {
    look(path).await
}

/// We use this function to 'look' at the metadata of the file.
///
/// `kamadak_exif` is synchronous, so the read and the walk both happen on
/// tokio's blocking pool. A panic in there only costs us this one file.
async fn look(path: &Utf8Path) -> Result<Properties, DecodeError> {
    let path = path.to_path_buf(); // extends lifetime by copying data
    tokio::task::spawn_blocking(move || -> Result<Properties, DecodeError> {
        let exif = read_exif(&path)?;
        tracing::debug!("got exif data from kamadak-exif!");

        let mut properties = walk(&exif);
        canonicalize(&exif, &mut properties);
        Ok(properties)
    })
    .await?
}

fn read_exif(path: &Utf8Path) -> Result<Exif, DecodeError> {
    let file = std::fs::File::open(path)
        .inspect_err(|e| tracing::warn!("Failed to open file for `kamadak_exif`! err: {e}"))
        .map_err(|err| DecodeError::FileReadFailure {
            path: path.to_string(),
            err,
        })?;

    // broken fields shouldn't sink the whole file, so ask for whatever parsed
    kamadak_exif::Reader::new()
        .continue_on_error(true)
        .read_from_container(&mut BufReader::new(file))
        .or_else(|e| {
            e.distill_partial_result(|errors| {
                for e in errors {
                    tracing::debug!("`kamadak-exif` dropped a broken field. err: {e}");
                }
            })
        })
        .inspect_err(|e| tracing::warn!("`kamadak-exif` failed to get metadata. err: {e}"))
        .map_err(|e| DecodeError::KamadakExifError(path.to_string(), e))
}

/// Visits every primary-image field and keeps the ones we can display.
fn walk(exif: &Exif) -> Properties {
    let mut properties = Properties::new();

    for field in exif.fields().filter(|f| f.ifd_num == In::PRIMARY) {
        let tag = field.tag.to_string();

        match field_value(&tag, &field.value) {
            Ok(value) => properties.insert(tag, normalize(&value)),
            Err(e) => tracing::debug!("Skipping field that can't be displayed. err: {e}"),
        }
    }

    properties
}

/// Converts one raw tag value into a [`FieldValue`].
///
/// Single values come out as scalars; anything with more than one value
/// becomes a list.
pub(crate) fn field_value(tag: &str, value: &Value) -> Result<FieldValue, FieldError> {
    let mut items: Vec<FieldValue> = match value {
        Value::Ascii(lines) => lines
            .iter()
            .map(|line| {
                std::str::from_utf8(line)
                    .map(|s| FieldValue::Text(s.trim_end_matches('\0').to_string()))
                    .map_err(|_| FieldError::NotText { tag: tag.into() })
            })
            .collect::<Result<_, _>>()?,

        Value::Byte(v) => integers(v.iter().copied()),
        Value::Short(v) => integers(v.iter().copied()),
        Value::Long(v) => integers(v.iter().copied()),
        Value::SByte(v) => integers(v.iter().copied()),
        Value::SShort(v) => integers(v.iter().copied()),
        Value::SLong(v) => integers(v.iter().copied()),

        Value::Rational(v) => v
            .iter()
            .map(|r| Rational::new(r.num.into(), r.denom.into()).into())
            .collect(),
        Value::SRational(v) => v
            .iter()
            .map(|r| Rational::new(r.num.into(), r.denom.into()).into())
            .collect(),

        // widening an f32 adds digits it never had, so go through its own text
        Value::Float(v) => v
            .iter()
            .map(|f| FieldValue::Float(f.to_string().parse().unwrap_or(f64::from(*f))))
            .collect(),
        Value::Double(v) => v.iter().copied().map(FieldValue::Float).collect(),

        // opaque blobs stay in one piece
        Value::Undefined(bytes, _) => {
            if bytes.is_empty() {
                return Err(FieldError::EmptyValue { tag: tag.into() });
            }
            return Ok(FieldValue::Other(OtherValue::Bytes(bytes.clone())));
        }

        Value::Unknown(type_id, _, _) => {
            return Err(FieldError::UnknownType {
                tag: tag.into(),
                type_id: *type_id,
            })
        }
    };

    match items.len() {
        0 => Err(FieldError::EmptyValue { tag: tag.into() }),
        1 => Ok(items.remove(0)),
        _ => Ok(FieldValue::Other(OtherValue::List(items))),
    }
}

fn integers<T: Into<i64>>(values: impl Iterator<Item = T>) -> Vec<FieldValue> {
    values.map(|v| FieldValue::Integer(v.into())).collect()
}

/// Adds the canonical keys that aren't plain tag names.
///
/// `XResolution`/`YResolution` already come straight from the walk.
fn canonicalize(exif: &Exif, properties: &mut Properties) {
    let uint = |tag: Tag| {
        exif.get_field(tag, In::PRIMARY)
            .and_then(|f| f.value.get_uint(0))
    };

    // dimensions: the tiff tags win, the exif ones are the backup
    let width = uint(Tag::ImageWidth).or_else(|| uint(Tag::PixelXDimension));
    let height = uint(Tag::ImageLength).or_else(|| uint(Tag::PixelYDimension));
    if let (Some(w), Some(h)) = (width, height) {
        properties.insert(keys::IMAGE_SIZE, format!("{w}x{h}"));
    }

    // bit depth is bits per pixel, so add up every sample
    if let Some(field) = exif.get_field(Tag::BitsPerSample, In::PRIMARY) {
        match bit_depth((0..).map_while(|i| field.value.get_uint(i))) {
            Some(bits) => properties.insert(keys::BIT_DEPTH, bits.to_string()),
            None => tracing::debug!("`BitsPerSample` didn't add up to a bit depth. leaving it out."),
        }
    }

    if let Some(code) = uint(Tag::Compression) {
        properties.insert(keys::COMPRESSION, compression_name(code));
    }

    if let Some(unit) = uint(Tag::ResolutionUnit) {
        properties.insert(keys::RESOLUTION_UNIT, resolution_unit_name(unit));
    }
}

/// Sums per-sample bit counts. `None` when there's nothing to add up, or
/// when the total doesn't fit.
pub(crate) fn bit_depth(mut samples: impl Iterator<Item = u32>) -> Option<u64> {
    let bits = samples.try_fold(0_u64, |acc, bits| acc.checked_add(u64::from(bits)))?;
    (bits > 0).then_some(bits)
}

/// Names a TIFF compression code. Unknown codes keep their number.
pub(crate) fn compression_name(code: u32) -> String {
    match code {
        1 => "uncompressed",
        2 => "CCITT RLE",
        3 => "CCITT T.4",
        4 => "CCITT T.6",
        5 => "LZW",
        6 => "JPEG (old-style)",
        7 => "JPEG",
        8 | 32946 => "Deflate",
        32773 => "PackBits",
        34712 => "JPEG 2000",
        50001 => "WebP",
        other => return other.to_string(),
    }
    .to_string()
}

fn resolution_unit_name(unit: u32) -> String {
    match unit {
        1 => "none",
        2 => "inches",
        3 => "centimeters",
        other => return other.to_string(),
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use kamadak_exif::{Rational as ExifRational, Value};

    use crate::{
        error::FieldError,
        models::value::{normalize, FieldValue},
    };

    use super::{bit_depth, compression_name, field_value};

    #[test]
    fn resolution_rationals_become_numbers() {
        let v = Value::Rational(vec![ExifRational { num: 72, denom: 1 }]);
        let value = field_value("XResolution", &v).unwrap();
        assert_eq!(normalize(&value), "72");
    }

    #[test]
    fn multiple_values_become_a_list() {
        let v = Value::Short(vec![8, 8, 8]);
        assert_eq!(normalize(&field_value("BitsPerSample", &v).unwrap()), "8, 8, 8");
    }

    #[test]
    fn single_values_stay_scalar() {
        let v = Value::Long(vec![4032]);
        assert_eq!(
            field_value("PixelXDimension", &v).unwrap(),
            FieldValue::Integer(4032)
        );
    }

    #[test]
    fn ascii_is_text_without_the_terminator() {
        let v = Value::Ascii(vec![b"Canon\0".to_vec()]);
        assert_eq!(
            field_value("Make", &v).unwrap(),
            FieldValue::Text("Canon".into())
        );
    }

    #[test]
    fn broken_fields_are_field_errors() {
        let not_utf8 = Value::Ascii(vec![vec![0xff, 0xfe]]);
        assert!(matches!(
            field_value("Make", &not_utf8),
            Err(FieldError::NotText { .. })
        ));

        let empty = Value::Short(vec![]);
        assert!(matches!(
            field_value("Orientation", &empty),
            Err(FieldError::EmptyValue { .. })
        ));

        let unknown = Value::Unknown(42, 1, 0);
        assert!(matches!(
            field_value("Tag(Tiff, 60000)", &unknown),
            Err(FieldError::UnknownType { type_id: 42, .. })
        ));
    }

    #[test]
    fn compression_codes_have_names() {
        assert_eq!(compression_name(1), "uncompressed");
        assert_eq!(compression_name(5), "LZW");
        assert_eq!(compression_name(9999), "9999");
    }

    #[test]
    fn f32_floats_keep_their_short_form() {
        let v = Value::Float(vec![0.1, 2.5]);
        assert_eq!(normalize(&field_value("Gamma", &v).unwrap()), "0.1, 2.5");
    }

    #[test]
    fn bit_depth_sums_samples() {
        assert_eq!(bit_depth([8, 8, 8].into_iter()), Some(24));
        assert_eq!(bit_depth(std::iter::empty()), None);
        assert_eq!(bit_depth([0].into_iter()), None);

        // more than a u32 can hold is still fine
        let huge = std::iter::repeat(u32::MAX).take(4);
        assert_eq!(bit_depth(huge), Some(4 * u64::from(u32::MAX)));
    }
}
