use std::sync::Arc;

use tracing::instrument;

use crate::col::ColumnDefinition;
use crate::error::{Error, Result};
use crate::protocol::primitive::*;
use crate::protocol::{BinaryField, TextField};
use crate::resultset::{FieldHandle, RawRow};
use crate::value::NullBitmap;

/// The payload part of a text protocol row packet
#[derive(Debug, Clone, Copy)]
pub struct TextRowPayload<'a>(pub &'a [u8]);

/// The payload part of a binary protocol row packet
#[derive(Debug, Clone, Copy)]
pub struct BinaryRowPayload<'a> {
    null_bitmap: NullBitmap<'a>,
    values: &'a [u8],
    num_columns: usize,
}

impl<'a> BinaryRowPayload<'a> {
    /// Split a binary row packet into its NULL bitmap and value bytes
    ///
    /// Layout: `0x00` header, NULL bitmap, values
    pub fn parse(payload: &'a [u8], num_columns: usize) -> Result<Self> {
        let (header, rest) = read_int_1(payload)?;
        if header != 0x00 {
            return Err(Error::InvalidPacket);
        }
        let (bitmap, values) = read_string_fix(rest, NullBitmap::len_for_result_set(num_columns))?;
        Ok(Self {
            null_bitmap: NullBitmap::for_result_set(bitmap),
            values,
            num_columns,
        })
    }

    pub fn null_bitmap(&self) -> NullBitmap<'a> {
        self.null_bitmap
    }

    pub fn values(&self) -> &'a [u8] {
        self.values
    }

    pub fn num_columns(&self) -> usize {
        self.num_columns
    }
}

/// Wire format of the row packets a result set is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// COM_QUERY: every value is a length-encoded string
    Text,
    /// COM_STMT_EXECUTE: NULL bitmap followed by typed values
    Binary,
}

impl Protocol {
    pub fn decode_row(self, columns: &[Arc<ColumnDefinition>], payload: &[u8]) -> Result<RawRow> {
        match self {
            Self::Text => decode_text_row(columns, TextRowPayload(payload)),
            Self::Binary => {
                decode_binary_row(columns, BinaryRowPayload::parse(payload, columns.len())?)
            }
        }
    }
}

/// Decode a text protocol row into one raw field per column
///
/// NULL columns (`0xFB`) have no raw field.
#[instrument(skip_all)]
pub fn decode_text_row(
    columns: &[Arc<ColumnDefinition>],
    payload: TextRowPayload<'_>,
) -> Result<RawRow> {
    let mut data = payload.0;
    let mut fields: Vec<Option<FieldHandle>> = Vec::with_capacity(columns.len());
    for column in columns {
        if let Some((&TEXT_NULL, rest)) = data.split_first() {
            fields.push(None);
            data = rest;
            continue;
        }
        let (bytes, rest) = read_string_lenenc(data)?;
        let field: FieldHandle = Arc::new(TextField::new(Arc::clone(column), bytes.to_vec()));
        fields.push(Some(field));
        data = rest;
    }
    if !data.is_empty() {
        return Err(Error::InvalidPacket);
    }
    Ok(fields.into())
}

/// Decode a binary protocol row into one raw field per column
///
/// Columns flagged in the NULL bitmap have no raw field.
#[instrument(skip_all)]
pub fn decode_binary_row(
    columns: &[Arc<ColumnDefinition>],
    payload: BinaryRowPayload<'_>,
) -> Result<RawRow> {
    if payload.num_columns() != columns.len() {
        return Err(Error::ColumnCountMismatch {
            expected: columns.len(),
            found: payload.num_columns(),
        });
    }
    let null_bitmap = payload.null_bitmap();
    let mut data = payload.values();
    let mut fields: Vec<Option<FieldHandle>> = Vec::with_capacity(columns.len());
    for (idx, column) in columns.iter().enumerate() {
        if null_bitmap.is_null(idx) {
            fields.push(None);
            continue;
        }
        let (field, rest) = BinaryField::parse(Arc::clone(column), data)?;
        let field: FieldHandle = Arc::new(field);
        fields.push(Some(field));
        data = rest;
    }
    if !data.is_empty() {
        return Err(Error::InvalidPacket);
    }
    Ok(fields.into())
}
