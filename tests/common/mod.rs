//! Row payload builders shared by the integration tests

#![allow(dead_code)]

use std::sync::Once;

use zero_mysql_result::col::ColumnDefinition;
use zero_mysql_result::constant::{BINARY_CHARSET, ColumnFlags, ColumnType};
use zero_mysql_result::protocol::primitive::*;
use zero_mysql_result::value::NullBitmap;

pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .init();
    });
}

/// One cell of a test row
#[derive(Debug, Clone)]
pub enum Cell {
    Null,
    Int(i32),
    BigUnsigned(u64),
    Double(f64),
    Text(&'static str),
    Bytes(Vec<u8>),
    /// year, month, day, hour, minute, second
    DateTime(u16, u8, u8, u8, u8, u8),
}

/// Columns matching [`sample_row`]
pub fn columns() -> Vec<ColumnDefinition> {
    vec![
        ColumnDefinition::new("id", ColumnType::MYSQL_TYPE_LONG),
        ColumnDefinition::new("name", ColumnType::MYSQL_TYPE_VAR_STRING).with_table("users"),
        ColumnDefinition::new("uuid", ColumnType::MYSQL_TYPE_STRING)
            .with_charset(BINARY_CHARSET)
            .with_flags(ColumnFlags::BINARY_FLAG),
        ColumnDefinition::new("score", ColumnType::MYSQL_TYPE_DOUBLE),
        ColumnDefinition::new("created_at", ColumnType::MYSQL_TYPE_DATETIME),
        ColumnDefinition::new("counter", ColumnType::MYSQL_TYPE_LONGLONG)
            .with_flags(ColumnFlags::UNSIGNED_FLAG),
    ]
}

pub fn uuid_bytes(seed: u8) -> Vec<u8> {
    (0..16).map(|i| seed.wrapping_add(i)).collect()
}

/// Row `i` of the test data. Odd rows have a NULL name.
pub fn sample_row(i: u32) -> Vec<Cell> {
    let seed = u8::try_from(i % 200).unwrap_or(0);
    vec![
        Cell::Int(i32::try_from(i).unwrap_or(i32::MAX)),
        if i % 2 == 0 {
            Cell::Text("hello")
        } else {
            Cell::Null
        },
        Cell::Bytes(uuid_bytes(seed)),
        Cell::Double(f64::from(i) + 0.5),
        Cell::DateTime(2024, 12, 25, 15, 30, u8::try_from(i % 60).unwrap_or(0)),
        Cell::BigUnsigned(u64::MAX - u64::from(i)),
    ]
}

pub fn text_payload(cells: &[Cell]) -> Vec<u8> {
    let mut out = Vec::new();
    for cell in cells {
        match cell {
            Cell::Null => write_int_1(&mut out, TEXT_NULL),
            Cell::Int(v) => write_string_lenenc(&mut out, &v.to_string()),
            Cell::BigUnsigned(v) => write_string_lenenc(&mut out, &v.to_string()),
            Cell::Double(v) => write_string_lenenc(&mut out, &v.to_string()),
            Cell::Text(v) => write_string_lenenc(&mut out, v),
            Cell::Bytes(v) => write_bytes_lenenc(&mut out, v),
            Cell::DateTime(y, mo, d, h, mi, s) => write_string_lenenc(
                &mut out,
                &format!("{:04}-{:02}-{:02} {:02}:{:02}:{:02}", y, mo, d, h, mi, s),
            ),
        }
    }
    out
}

pub fn binary_payload(cells: &[Cell]) -> Vec<u8> {
    let mut bitmap = vec![0u8; NullBitmap::len_for_result_set(cells.len())];
    let mut values = Vec::new();
    for (idx, cell) in cells.iter().enumerate() {
        match cell {
            Cell::Null => {
                let bit = idx + 2;
                bitmap[bit / 8] |= 1 << (bit % 8);
            }
            Cell::Int(v) => write_int_4(&mut values, *v as u32),
            Cell::BigUnsigned(v) => write_int_8(&mut values, *v),
            Cell::Double(v) => write_int_8(&mut values, v.to_bits()),
            Cell::Text(v) => write_string_lenenc(&mut values, v),
            Cell::Bytes(v) => write_bytes_lenenc(&mut values, v),
            Cell::DateTime(y, mo, d, h, mi, s) => {
                write_int_1(&mut values, 7);
                write_int_2(&mut values, *y);
                for b in [*mo, *d, *h, *mi, *s] {
                    write_int_1(&mut values, b);
                }
            }
        }
    }
    let mut out = vec![0x00];
    out.extend_from_slice(&bitmap);
    out.extend_from_slice(&values);
    out
}
