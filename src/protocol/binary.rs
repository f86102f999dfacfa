use std::sync::Arc;

use crate::col::ColumnDefinition;
use crate::error::Result;
use crate::raw::RawField;
use crate::value::{DateTime, Time, Value};

/// A field of a binary protocol row, decoded once when the row is materialized
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryField {
    column: Arc<ColumnDefinition>,
    slot: Slot,
    /// Payload of `Decimal`, `Text` and `Bytes` slots
    bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Slot {
    Null,
    SignedInt(i64),
    UnsignedInt(u64),
    Float(f32),
    Double(f64),
    Decimal,
    Text,
    Bytes,
    Date(DateTime),
    Timestamp(DateTime),
    Time(Time),
}

impl BinaryField {
    /// Parse one value of `column` from the front of `data`
    ///
    /// Returns the field and the remaining bytes
    pub fn parse(column: Arc<ColumnDefinition>, data: &[u8]) -> Result<(Self, &[u8])> {
        let (value, rest) = Value::parse_binary(&column, data)?;
        let (slot, bytes) = match value {
            Value::Null => (Slot::Null, Vec::new()),
            Value::SignedInt(v) => (Slot::SignedInt(v), Vec::new()),
            Value::UnsignedInt(v) => (Slot::UnsignedInt(v), Vec::new()),
            Value::Float(v) => (Slot::Float(v), Vec::new()),
            Value::Double(v) => (Slot::Double(v), Vec::new()),
            Value::Decimal(v) => (Slot::Decimal, v.to_vec()),
            Value::Text(v) => (Slot::Text, v.to_vec()),
            Value::Bytes(v) => (Slot::Bytes, v.to_vec()),
            Value::Date(v) => (Slot::Date(v), Vec::new()),
            Value::Timestamp(v) => (Slot::Timestamp(v), Vec::new()),
            Value::Time(v) => (Slot::Time(v), Vec::new()),
        };
        let field = Self {
            column,
            slot,
            bytes,
        };
        Ok((field, rest))
    }

    pub fn column(&self) -> &ColumnDefinition {
        &self.column
    }
}

impl RawField for BinaryField {
    fn value(&self) -> Value<'_> {
        match self.slot {
            Slot::Null => Value::Null,
            Slot::SignedInt(v) => Value::SignedInt(v),
            Slot::UnsignedInt(v) => Value::UnsignedInt(v),
            Slot::Float(v) => Value::Float(v),
            Slot::Double(v) => Value::Double(v),
            Slot::Decimal => Value::Decimal(&self.bytes),
            Slot::Text => Value::Text(&self.bytes),
            Slot::Bytes => Value::Bytes(&self.bytes),
            Slot::Date(v) => Value::Date(v),
            Slot::Timestamp(v) => Value::Timestamp(v),
            Slot::Time(v) => Value::Time(v),
        }
    }
}
