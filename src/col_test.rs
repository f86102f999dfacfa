use crate::col::ColumnDefinition;
use crate::constant::{BINARY_CHARSET, ColumnFlags, ColumnType};
use crate::error::Error;
use crate::protocol::primitive::*;

/// Build a Protocol::ColumnDefinition41 payload
fn column_packet(
    table: &str,
    name: &str,
    charset: u16,
    column_type: ColumnType,
    flags: ColumnFlags,
) -> Vec<u8> {
    let mut out = Vec::new();
    write_string_lenenc(&mut out, "def");
    write_string_lenenc(&mut out, "test");
    write_string_lenenc(&mut out, table);
    write_string_lenenc(&mut out, table);
    write_string_lenenc(&mut out, name);
    write_string_lenenc(&mut out, name);
    write_int_lenenc(&mut out, 0x0c);
    write_int_2(&mut out, charset);
    write_int_4(&mut out, 255);
    write_int_1(&mut out, column_type as u8);
    write_int_2(&mut out, flags.bits());
    write_int_1(&mut out, 0);
    write_int_2(&mut out, 0);
    out
}

#[test]
fn test_parse_column_definition() {
    let packet = column_packet(
        "users",
        "id",
        45,
        ColumnType::MYSQL_TYPE_LONGLONG,
        ColumnFlags::UNSIGNED_FLAG | ColumnFlags::PRI_KEY_FLAG,
    );
    let col = ColumnDefinition::parse(&packet).unwrap();
    assert_eq!(col.schema, "test");
    assert_eq!(col.table, "users");
    assert_eq!(col.name, "id");
    assert_eq!(col.org_name, "id");
    assert_eq!(col.charset, 45);
    assert_eq!(col.column_length, 255);
    assert_eq!(col.column_type, ColumnType::MYSQL_TYPE_LONGLONG);
    assert!(col.is_unsigned());
    assert!(!col.is_binary());
    assert!(!col.is_temporal());
}

#[test]
fn test_parse_binary_column() {
    let packet = column_packet(
        "t",
        "uuid",
        BINARY_CHARSET,
        ColumnType::MYSQL_TYPE_STRING,
        ColumnFlags::BINARY_FLAG,
    );
    let col = ColumnDefinition::parse(&packet).unwrap();
    assert!(col.is_binary());
    assert!(!col.is_unsigned());
}

#[test]
fn test_parse_truncated_column_definition() {
    let packet = column_packet(
        "t",
        "c",
        45,
        ColumnType::MYSQL_TYPE_LONG,
        ColumnFlags::empty(),
    );
    let result = ColumnDefinition::parse(&packet[..packet.len() - 3]);
    assert!(matches!(result, Err(Error::UnexpectedEof)));
}

#[test]
fn test_parse_unknown_column_type() {
    let mut packet = column_packet(
        "t",
        "c",
        45,
        ColumnType::MYSQL_TYPE_LONG,
        ColumnFlags::empty(),
    );
    // column_type sits 6 bytes before the end: flags(2) decimals(1) reserved(2) follow it
    let idx = packet.len() - 6;
    packet[idx] = 0x20;
    assert!(matches!(
        ColumnDefinition::parse(&packet),
        Err(Error::LibraryBug(_))
    ));
}

#[test]
fn test_new_column_defaults() {
    let col = ColumnDefinition::new("n", ColumnType::MYSQL_TYPE_LONG).with_table("t");
    assert_eq!(col.table, "t");
    assert_eq!(col.org_table, "t");
    assert_eq!(col.flags, ColumnFlags::empty());
    assert!(!col.is_binary());
}
