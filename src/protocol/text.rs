use std::sync::Arc;

use crate::col::ColumnDefinition;
use crate::constant::ColumnType;
use crate::raw::{RawField, text_from_value};
use crate::value::{DateTime, Time, Value};

/// A field of a text protocol row
///
/// The server sends every value as a string. Numbers are parsed when a numeric
/// conversion is requested; temporal columns are parsed into [`DateTime`] or [`Time`]
/// and fall back to plain text when the string is not a recognizable date or time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextField {
    column: Arc<ColumnDefinition>,
    data: Vec<u8>,
}

impl TextField {
    pub fn new(column: Arc<ColumnDefinition>, data: Vec<u8>) -> Self {
        Self { column, data }
    }

    pub fn column(&self) -> &ColumnDefinition {
        &self.column
    }

    /// The bytes exactly as sent by the server
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl RawField for TextField {
    fn value(&self) -> Value<'_> {
        let data = self.data.as_slice();
        match self.column.column_type {
            ColumnType::MYSQL_TYPE_NULL => Value::Null,
            ColumnType::MYSQL_TYPE_DATE | ColumnType::MYSQL_TYPE_NEWDATE => {
                DateTime::parse(data).map_or(Value::Text(data), Value::Date)
            }
            column_type if column_type.is_time() => {
                Time::parse(data).map_or(Value::Text(data), Value::Time)
            }
            column_type if column_type.is_temporal() => {
                DateTime::parse(data).map_or(Value::Text(data), Value::Timestamp)
            }
            ColumnType::MYSQL_TYPE_BIT => Value::from_bit(data),
            column_type if column_type.is_decimal() => Value::Decimal(data),
            column_type if column_type.is_integer() || column_type.is_float() => {
                Value::Text(data)
            }
            _ if self.column.is_binary() => Value::Bytes(data),
            _ => Value::Text(data),
        }
    }

    fn is_null(&self) -> bool {
        self.column.column_type == ColumnType::MYSQL_TYPE_NULL
    }

    fn to_text(&self) -> String {
        match self.column.column_type {
            ColumnType::MYSQL_TYPE_BIT => text_from_value(self.value()),
            _ => text_from_value(Value::Text(&self.data)),
        }
    }
}
