//! Typed access to one cell of a query result.

use std::fmt;
use std::sync::Arc;

use crate::error::{ConversionError, ConversionResult};
use crate::raw::RawField;
use crate::resultset::{FieldHandle, ResultSet};
use crate::value::{DateTime, Value};

/// Rendering of a NULL field
pub const NULL_MARKER: &str = "(NULL)";

/// A view of one field that keeps its result set alive
///
/// An absent raw field is SQL NULL. NULL never fails to convert: numbers become zero,
/// text becomes empty and timestamps become [`DateTime::EPOCH`].
#[derive(Clone)]
pub struct ResultField {
    result: Arc<dyn ResultSet>,
    field: Option<FieldHandle>,
}

macro_rules! numeric_conversions {
    ($($(#[$meta:meta])* $name:ident -> $t:ty;)+) => {
        $(
            $(#[$meta])*
            pub fn $name(&self) -> ConversionResult<$t> {
                match self.present() {
                    Some(field) => field.$name(),
                    None => Ok(0 as $t),
                }
            }
        )+
    };
}

impl ResultField {
    pub fn new(result: Arc<dyn ResultSet>, field: Option<FieldHandle>) -> Self {
        Self { result, field }
    }

    /// The raw field, unless the value is NULL
    fn present(&self) -> Option<&dyn RawField> {
        self.field.as_deref().filter(|field| !field.is_null())
    }

    pub fn is_null(&self) -> bool {
        self.present().is_none()
    }

    numeric_conversions! {
        to_i8 -> i8;
        to_i16 -> i16;
        to_i32 -> i32;
        to_i64 -> i64;
        to_u8 -> u8;
        to_u16 -> u16;
        to_u32 -> u32;
        to_u64 -> u64;
        to_f32 -> f32;
        to_f64 -> f64;
        /// A 16-byte binary identifier in network byte order
        ///
        /// Any other length fails with [`ConversionError::OutOfRange`].
        to_u128 -> u128;
    }

    /// The field as text, empty for NULL
    pub fn to_text(&self) -> String {
        self.present().map(|field| field.to_text()).unwrap_or_default()
    }

    /// The field as a calendar timestamp
    ///
    /// NULL and non-temporal values yield [`DateTime::EPOCH`].
    pub fn to_timestamp(&self) -> DateTime {
        self.present()
            .map_or(DateTime::EPOCH, |field| field.to_timestamp())
    }

    #[cfg(feature = "with-uuid")]
    pub fn to_uuid(&self) -> ConversionResult<uuid::Uuid> {
        self.to_u128().map(uuid::Uuid::from_u128)
    }

    /// The result set this field belongs to
    pub fn result(&self) -> &Arc<dyn ResultSet> {
        &self.result
    }

    fn value(&self) -> Value<'_> {
        self.present().map_or(Value::Null, |field| field.value())
    }
}

macro_rules! impl_try_from_field {
    ($($t:ty => $name:ident),+ $(,)?) => {
        $(
            impl TryFrom<&ResultField> for $t {
                type Error = ConversionError;

                fn try_from(field: &ResultField) -> Result<Self, Self::Error> {
                    field.$name()
                }
            }
        )+
    };
}

impl_try_from_field!(
    i8 => to_i8,
    i16 => to_i16,
    i32 => to_i32,
    i64 => to_i64,
    u8 => to_u8,
    u16 => to_u16,
    u32 => to_u32,
    u64 => to_u64,
    f32 => to_f32,
    f64 => to_f64,
    u128 => to_u128,
);

#[cfg(feature = "with-uuid")]
impl_try_from_field!(uuid::Uuid => to_uuid);

impl From<&ResultField> for String {
    fn from(field: &ResultField) -> Self {
        field.to_text()
    }
}

impl From<&ResultField> for DateTime {
    fn from(field: &ResultField) -> Self {
        field.to_timestamp()
    }
}

/// Fields are equal when their decoded values are
impl PartialEq for ResultField {
    fn eq(&self, other: &Self) -> bool {
        self.value() == other.value()
    }
}

impl fmt::Display for ResultField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.present() {
            Some(field) => f.write_str(&field.to_text()),
            None => f.write_str(NULL_MARKER),
        }
    }
}

impl fmt::Debug for ResultField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ResultField").field(&self.value()).finish()
    }
}
