//! Loosely-typed metadata values and their one canonical display form.
//!
//! Decoders hand over whatever the underlying format stored. Everything
//! downstream only ever sees the string made by [`normalize`].

use std::fmt::{self, Write as _};

/// A metadata value as it came out of a decoder.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),

    /// Anything that isn't a plain scalar.
    Other(OtherValue),
}

/// The composite shapes a [`FieldValue`] can take.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum OtherValue {
    Rational(Rational),

    /// Several values stored under one field (e.g. `BitsPerSample = 8, 8, 8`).
    List(Vec<FieldValue>),

    /// Opaque bytes.
    Bytes(Vec<u8>),
}

/// A fraction, as stored by TIFF-style metadata.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rational {
    pub numerator: i64,
    pub denominator: i64,
}

impl Rational {
    pub const fn new(numerator: i64, denominator: i64) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// The value as a float, if the denominator isn't zero.
    pub fn to_f64(self) -> Option<f64> {
        (self.denominator != 0).then(|| self.numerator as f64 / self.denominator as f64)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Rational> for FieldValue {
    fn from(value: Rational) -> Self {
        Self::Other(OtherValue::Rational(value))
    }
}

/// Turns any [`FieldValue`] into its display string. This never fails.
///
/// - text passes through untouched
/// - integers are plain base-10, no grouping
/// - floats use the shortest form that parses back to the same value
/// - booleans are `true` or `false`
/// - rationals are integers when they divide evenly, otherwise floats
/// - lists are joined with `", "`, bytes are lowercase hex
pub fn normalize(value: &FieldValue) -> String {
    match value {
        FieldValue::Text(s) => s.clone(),
        FieldValue::Integer(i) => i.to_string(),
        FieldValue::Float(f) => f.to_string(),
        FieldValue::Boolean(b) => b.to_string(),
        FieldValue::Other(other) => normalize_other(other),
    }
}

fn normalize_other(other: &OtherValue) -> String {
    match other {
        OtherValue::Rational(r) => {
            if r.denominator == 0 {
                format!("{}/0", r.numerator)
            } else if let Some(0) = r.numerator.checked_rem(r.denominator) {
                (r.numerator / r.denominator).to_string()
            } else {
                (r.numerator as f64 / r.denominator as f64).to_string()
            }
        }
        OtherValue::List(items) => items.iter().map(normalize).collect::<Vec<_>>().join(", "),
        OtherValue::Bytes(bytes) => bytes.iter().fold(String::new(), |mut s, b| {
            _ = write!(s, "{b:02x}");
            s
        }),
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&normalize(self))
    }
}
