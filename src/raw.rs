//! Conversion of decoded MySQL values into Rust types.
//!
//! [`RawField`] is the capability a backend implements for one column of one row:
//! it exposes the decoded [`Value`] and derives every typed conversion from it.
//! [`FromRawValue`] holds the per-type policy:
//!
//! - NULL converts to the type's zero value.
//! - A present value that is not a number (or not the requested kind of number)
//!   fails with [`ConversionError::InvalidFormat`].
//! - A number that does not fit the requested width or signedness fails with
//!   [`ConversionError::OutOfRange`].
//!
//! Text and timestamp conversions are total and live outside the trait.

use std::fmt::Debug;

use crate::error::{ConversionError, ConversionResult};
use crate::value::{DateTime, Time, Value};
use simdutf8::basic::from_utf8;

/// Trait for types that can be decoded from a [`Value`].
///
/// Each method corresponds to one value shape. The defaults reject the shape with
/// `InvalidFormat`, so implementations only override what they accept.
pub trait FromRawValue: Sized {
    fn from_null() -> ConversionResult<Self>;

    fn from_signed(v: i64) -> ConversionResult<Self> {
        Err(ConversionError::invalid_format::<Self>(format!(
            "signed integer {}",
            v
        )))
    }

    fn from_unsigned(v: u64) -> ConversionResult<Self> {
        Err(ConversionError::invalid_format::<Self>(format!(
            "unsigned integer {}",
            v
        )))
    }

    fn from_float(v: f32) -> ConversionResult<Self> {
        Err(ConversionError::invalid_format::<Self>(format!("FLOAT {}", v)))
    }

    fn from_double(v: f64) -> ConversionResult<Self> {
        Err(ConversionError::invalid_format::<Self>(format!("DOUBLE {}", v)))
    }

    fn from_text(v: &[u8]) -> ConversionResult<Self>;

    fn from_bytes(v: &[u8]) -> ConversionResult<Self> {
        Self::from_text(v)
    }

    fn from_decimal(v: &[u8]) -> ConversionResult<Self> {
        Self::from_text(v)
    }

    fn from_datetime(v: DateTime) -> ConversionResult<Self> {
        Err(ConversionError::invalid_format::<Self>(format!(
            "DATETIME {}",
            v
        )))
    }

    fn from_time(v: Time) -> ConversionResult<Self> {
        Err(ConversionError::invalid_format::<Self>(format!("TIME {}", v)))
    }
}

/// Decode `value` into `T`
pub fn decode<T: FromRawValue>(value: Value<'_>) -> ConversionResult<T> {
    match value {
        Value::Null => T::from_null(),
        Value::SignedInt(v) => T::from_signed(v),
        Value::UnsignedInt(v) => T::from_unsigned(v),
        Value::Float(v) => T::from_float(v),
        Value::Double(v) => T::from_double(v),
        Value::Decimal(v) => T::from_decimal(v),
        Value::Text(v) => T::from_text(v),
        Value::Bytes(v) => T::from_bytes(v),
        Value::Date(v) | Value::Timestamp(v) => T::from_datetime(v),
        Value::Time(v) => T::from_time(v),
    }
}

/// Render `value` the way the text protocol would. Never fails.
///
/// NULL renders as the empty string and invalid UTF-8 is replaced lossily.
pub fn text_from_value(value: Value<'_>) -> String {
    match value {
        Value::Null => String::new(),
        Value::SignedInt(v) => v.to_string(),
        Value::UnsignedInt(v) => v.to_string(),
        Value::Float(v) => v.to_string(),
        Value::Double(v) => v.to_string(),
        Value::Decimal(v) | Value::Text(v) | Value::Bytes(v) => match from_utf8(v) {
            Ok(s) => s.to_owned(),
            Err(_) => String::from_utf8_lossy(v).into_owned(),
        },
        Value::Date(v) => v.date_string(),
        Value::Timestamp(v) => v.to_string(),
        Value::Time(v) => v.to_string(),
    }
}

/// Interpret `value` as a calendar timestamp. Never fails.
///
/// Anything that is not a valid date or datetime yields [`DateTime::EPOCH`].
/// A TIME within a single day is placed on the epoch date.
pub fn timestamp_from_value(value: Value<'_>) -> DateTime {
    match value {
        Value::Date(v) | Value::Timestamp(v) if v.is_valid() => v,
        Value::Time(v) if !v.negative && v.days == 0 => DateTime {
            hour: v.hour,
            minute: v.minute,
            second: v.second,
            microsecond: v.microsecond,
            ..DateTime::EPOCH
        },
        _ => DateTime::EPOCH,
    }
}

// ============================================================================
// Integers
// ============================================================================

fn text_str<T>(v: &[u8]) -> ConversionResult<&str> {
    from_utf8(v).map_err(|_e| ConversionError::invalid_format::<T>("non-UTF-8 text"))
}

/// Parse decimal integer text, distinguishing malformed text from overflow
fn parse_integer<T: TryFrom<i128>>(v: &[u8]) -> ConversionResult<T> {
    use std::num::IntErrorKind;

    let text = text_str::<T>(v)?.trim();
    let wide = text.parse::<i128>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            ConversionError::out_of_range::<T>(format!("'{}'", text))
        }
        _ => ConversionError::invalid_format::<T>(format!("'{}'", text)),
    })?;
    T::try_from(wide).map_err(|_e| ConversionError::out_of_range::<T>(format!("'{}'", text)))
}

macro_rules! impl_from_raw_value_integer {
    ($($t:ty),+ $(,)?) => {
        $(
            impl FromRawValue for $t {
                fn from_null() -> ConversionResult<Self> {
                    Ok(0)
                }

                fn from_signed(v: i64) -> ConversionResult<Self> {
                    <$t>::try_from(v).map_err(|_e| ConversionError::out_of_range::<Self>(v.to_string()))
                }

                fn from_unsigned(v: u64) -> ConversionResult<Self> {
                    <$t>::try_from(v).map_err(|_e| ConversionError::out_of_range::<Self>(v.to_string()))
                }

                fn from_text(v: &[u8]) -> ConversionResult<Self> {
                    parse_integer(v)
                }
            }
        )+
    };
}

impl_from_raw_value_integer!(i8, i16, i32, i64, u8, u16, u32, u64);

// ============================================================================
// Floating Point
// ============================================================================

fn parse_float<T>(v: &[u8]) -> ConversionResult<f64> {
    let text = text_str::<T>(v)?.trim();
    // only decimal literals; `f64::from_str` also takes nan and inf
    let is_literal = text
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !is_literal {
        return Err(ConversionError::invalid_format::<T>(format!("'{}'", text)));
    }
    let value = text
        .parse::<f64>()
        .map_err(|_e| ConversionError::invalid_format::<T>(format!("'{}'", text)))?;
    // overflowing literals parse to infinity
    if value.is_infinite() {
        return Err(ConversionError::out_of_range::<T>(format!("'{}'", text)));
    }
    Ok(value)
}

impl FromRawValue for f64 {
    fn from_null() -> ConversionResult<Self> {
        Ok(0.0)
    }

    fn from_signed(v: i64) -> ConversionResult<Self> {
        Ok(v as f64)
    }

    fn from_unsigned(v: u64) -> ConversionResult<Self> {
        Ok(v as f64)
    }

    fn from_float(v: f32) -> ConversionResult<Self> {
        Ok(f64::from(v))
    }

    fn from_double(v: f64) -> ConversionResult<Self> {
        Ok(v)
    }

    fn from_text(v: &[u8]) -> ConversionResult<Self> {
        parse_float::<Self>(v)
    }
}

impl FromRawValue for f32 {
    fn from_null() -> ConversionResult<Self> {
        Ok(0.0)
    }

    fn from_signed(v: i64) -> ConversionResult<Self> {
        Ok(v as f32)
    }

    fn from_unsigned(v: u64) -> ConversionResult<Self> {
        Ok(v as f32)
    }

    fn from_float(v: f32) -> ConversionResult<Self> {
        Ok(v)
    }

    fn from_double(v: f64) -> ConversionResult<Self> {
        if v.is_finite() && v.abs() > f64::from(f32::MAX) {
            return Err(ConversionError::out_of_range::<Self>(v.to_string()));
        }
        Ok(v as f32)
    }

    fn from_text(v: &[u8]) -> ConversionResult<Self> {
        Self::from_double(parse_float::<Self>(v)?)
    }
}

// ============================================================================
// 128-bit Identifiers
// ============================================================================

/// A BINARY(16) column in network byte order. Any other size is out of range.
impl FromRawValue for u128 {
    fn from_null() -> ConversionResult<Self> {
        Ok(0)
    }

    fn from_signed(_v: i64) -> ConversionResult<Self> {
        Err(ConversionError::out_of_range::<Self>("8-byte integer"))
    }

    fn from_unsigned(_v: u64) -> ConversionResult<Self> {
        Err(ConversionError::out_of_range::<Self>("8-byte integer"))
    }

    fn from_float(_v: f32) -> ConversionResult<Self> {
        Err(ConversionError::out_of_range::<Self>("4-byte FLOAT"))
    }

    fn from_double(_v: f64) -> ConversionResult<Self> {
        Err(ConversionError::out_of_range::<Self>("8-byte DOUBLE"))
    }

    fn from_text(v: &[u8]) -> ConversionResult<Self> {
        let bytes = <[u8; 16]>::try_from(v)
            .map_err(|_e| ConversionError::out_of_range::<Self>(format!("{} bytes", v.len())))?;
        Ok(u128::from_be_bytes(bytes))
    }
}

// ============================================================================
// Raw Field
// ============================================================================

/// One column of one row, as stored by a result set backend.
///
/// Implementations provide [`RawField::value`]; every conversion is derived from it
/// and may be overridden by backends with a cheaper path.
pub trait RawField: Debug + Send + Sync {
    /// The decoded value of this field
    fn value(&self) -> Value<'_>;

    fn is_null(&self) -> bool {
        matches!(self.value(), Value::Null)
    }

    fn to_i8(&self) -> ConversionResult<i8> {
        decode(self.value())
    }

    fn to_i16(&self) -> ConversionResult<i16> {
        decode(self.value())
    }

    fn to_i32(&self) -> ConversionResult<i32> {
        decode(self.value())
    }

    fn to_i64(&self) -> ConversionResult<i64> {
        decode(self.value())
    }

    fn to_u8(&self) -> ConversionResult<u8> {
        decode(self.value())
    }

    fn to_u16(&self) -> ConversionResult<u16> {
        decode(self.value())
    }

    fn to_u32(&self) -> ConversionResult<u32> {
        decode(self.value())
    }

    fn to_u64(&self) -> ConversionResult<u64> {
        decode(self.value())
    }

    fn to_f32(&self) -> ConversionResult<f32> {
        decode(self.value())
    }

    fn to_f64(&self) -> ConversionResult<f64> {
        decode(self.value())
    }

    /// 16 bytes in network byte order
    fn to_u128(&self) -> ConversionResult<u128> {
        decode(self.value())
    }

    fn to_text(&self) -> String {
        text_from_value(self.value())
    }

    fn to_timestamp(&self) -> DateTime {
        timestamp_from_value(self.value())
    }
}
