// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Scalar payloads and their `(type, value)` string encoding.
//!
//! Every leaf of a flattened array is stored as a [`DataInfo`]: a type tag
//! plus the value's text form. Round-tripping depends entirely on the tag, so
//! the text forms are locale-free and exact (`f64` uses Rust's shortest
//! round-trip `Display`).

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Type tag for 64-bit floating-point numbers.
pub const TAG_FLOAT64: &str = "float64";
/// Type tag for booleans.
pub const TAG_BOOL: &str = "bool";
/// Type tag for strings.
pub const TAG_STRING: &str = "string";
/// Empty tag: the vertex carries no value (root or container).
pub const TAG_NONE: &str = "";

/// 2^63: integral `f64`s below this magnitude convert to `i64` exactly.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Leaf value of a nested array.
///
/// Absence (`Option::None` at the use site) is not a scalar; it marks
/// structural vertices.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// JSON number, always widened to `f64`.
    Float(f64),
    /// JSON boolean.
    Bool(bool),
    /// JSON string.
    Str(String),
}

impl Scalar {
    /// Converts a JSON value into a scalar.
    ///
    /// Returns `None` for arrays, objects and `null`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64().map(Self::Float),
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::String(s) => Some(Self::Str(s.clone())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Converts the scalar back into JSON.
    ///
    /// Integral floats with magnitude below 2^63 come out as JSON integers,
    /// so `[1, 2]` reads back as `[1, 2]` rather than `[1.0, 2.0]`. Larger
    /// magnitudes and `-0.0` keep the float form; non-finite values become
    /// `null`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Float(f)
                if f.fract() == 0.0 && f.abs() < I64_BOUND && !is_negative_zero(*f) =>
            {
                Value::from(*f as i64)
            }
            Self::Float(f) => serde_json::Number::from_f64(*f).map_or(Value::Null, Value::Number),
            Self::Bool(b) => Value::Bool(*b),
            Self::Str(s) => Value::String(s.clone()),
        }
    }

    /// The [`DataInfo`] type tag for this scalar.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::Float(_) => TAG_FLOAT64,
            Self::Bool(_) => TAG_BOOL,
            Self::Str(_) => TAG_STRING,
        }
    }

    /// Infallible form of [`encode`] for a present value.
    pub fn to_data_info(&self) -> DataInfo {
        DataInfo::new(self.type_tag(), self.to_string())
    }
}

fn is_negative_zero(f: f64) -> bool {
    f == 0.0 && f.is_sign_negative()
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// Serialized form of a vertex payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DataInfo {
    /// One of [`TAG_FLOAT64`], [`TAG_BOOL`], [`TAG_STRING`] or [`TAG_NONE`].
    #[serde(rename = "type")]
    pub data_type: String,
    /// Text form of the value; empty for structural vertices.
    pub value: String,
}

impl DataInfo {
    /// Builds a `DataInfo` from a tag and a text value.
    pub fn new(data_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            data_type: data_type.into(),
            value: value.into(),
        }
    }

    /// Payload of a valueless (root or container) vertex.
    pub fn structural() -> Self {
        Self::default()
    }

    /// Returns `true` when the tag marks a valueless vertex.
    pub fn is_structural(&self) -> bool {
        self.data_type.is_empty()
    }
}

/// Errors raised by [`encode`] and [`decode`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Absent values are never encoded individually.
    #[error("cannot get type and value from an absent value")]
    Encoding,
    /// The text does not parse as the declared type.
    #[error("error parsing data_info: {value:?} is not a valid {tag}")]
    Decoding {
        /// Declared type tag.
        tag: String,
        /// Offending text.
        value: String,
    },
}

/// Encodes a scalar as a `(type, value)` pair.
///
/// # Errors
///
/// Returns [`CodecError::Encoding`] when `value` is `None`.
pub fn encode(value: Option<&Scalar>) -> Result<DataInfo, CodecError> {
    value.map(Scalar::to_data_info).ok_or(CodecError::Encoding)
}

/// Decodes a `(type, value)` pair.
///
/// The empty tag yields `None`. Unknown tags fall back to the raw string so
/// that legacy records never break reconstruction.
///
/// # Errors
///
/// Returns [`CodecError::Decoding`] when a `float64` or `bool` payload does
/// not parse.
pub fn decode(info: &DataInfo) -> Result<Option<Scalar>, CodecError> {
    let invalid = || CodecError::Decoding {
        tag: info.data_type.clone(),
        value: info.value.clone(),
    };
    match info.data_type.as_str() {
        TAG_NONE => Ok(None),
        TAG_FLOAT64 => info
            .value
            .parse::<f64>()
            .map(|v| Some(Scalar::Float(v)))
            .map_err(|_| invalid()),
        TAG_BOOL => match info.value.as_str() {
            "true" => Ok(Some(Scalar::Bool(true))),
            "false" => Ok(Some(Scalar::Bool(false))),
            _ => Err(invalid()),
        },
        _ => Ok(Some(Scalar::Str(info.value.clone()))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn encode_absent_fails() {
        assert_eq!(encode(None), Err(CodecError::Encoding));
    }

    #[test]
    fn encode_uses_type_tags() {
        let cases = [
            (Scalar::from("test"), "string", "test"),
            (Scalar::from(25.0), "float64", "25"),
            (Scalar::from(1.99), "float64", "1.99"),
            (Scalar::from(false), "bool", "false"),
        ];
        for (scalar, tag, text) in cases {
            let info = encode(Some(&scalar)).unwrap();
            assert_eq!(info, DataInfo::new(tag, text), "{scalar:?}");
        }
    }

    #[test]
    fn decode_table() {
        assert_eq!(
            decode(&DataInfo::new("bool", "false")).unwrap(),
            Some(Scalar::Bool(false))
        );
        assert_eq!(
            decode(&DataInfo::new("float64", "22")).unwrap(),
            Some(Scalar::Float(22.0))
        );
        assert_eq!(
            decode(&DataInfo::new("float64", "1.99")).unwrap(),
            Some(Scalar::Float(1.99))
        );
        assert_eq!(decode(&DataInfo::structural()).unwrap(), None);
    }

    #[test]
    fn decode_rejects_mistyped_payloads() {
        let err = decode(&DataInfo::new("float64", "false")).unwrap_err();
        assert!(err.to_string().contains("error parsing data_info"));
        assert!(decode(&DataInfo::new("bool", "yes")).is_err());
        assert!(decode(&DataInfo::new("bool", "TRUE")).is_err());
    }

    #[test]
    fn unknown_tags_fall_back_to_strings() {
        assert_eq!(
            decode(&DataInfo::new("int", "7")).unwrap(),
            Some(Scalar::Str("7".into()))
        );
    }

    #[test]
    fn json_bridge_keeps_integers_integral() {
        assert_eq!(Scalar::Float(3.0).to_json(), json!(3));
        assert_eq!(Scalar::Float(-0.5).to_json(), json!(-0.5));
        assert_eq!(Scalar::Float(1e300).to_json(), json!(1e300));
        assert_eq!(Scalar::from_json(&json!(null)), None);
        assert_eq!(Scalar::from_json(&json!([1])), None);
        assert_eq!(Scalar::from_json(&json!(7)), Some(Scalar::Float(7.0)));
    }

    #[test]
    fn json_bridge_keeps_negative_zero_signed() {
        let value = Scalar::Float(-0.0).to_json();
        assert!(value.is_f64(), "{value}");
        assert!(value.as_f64().unwrap().is_sign_negative());
        assert_eq!(Scalar::Float(0.0).to_json(), json!(0));
        assert_eq!(serde_json::to_string(&value).unwrap(), "-0.0");
    }

    #[test]
    fn json_bridge_prints_large_integers_as_digits() {
        assert_eq!(
            Scalar::Float(1e16).to_json(),
            json!(10_000_000_000_000_000_i64)
        );
        assert_eq!(
            Scalar::Float(9_007_199_254_740_992.0).to_json(),
            json!(9_007_199_254_740_992_i64)
        );
        assert_eq!(
            Scalar::Float(-9.0e18).to_json(),
            json!(-9_000_000_000_000_000_000_i64)
        );
        // Past the i64 range the float form is kept.
        assert!(Scalar::Float(1e19).to_json().is_f64());
    }
}
