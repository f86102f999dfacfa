use crate::constant::{ColumnFlags, ColumnType};

#[test]
fn test_column_type_from_u8() {
    for byte in 0u8..=255 {
        if let Some(column_type) = ColumnType::from_u8(byte) {
            assert_eq!(column_type as u8, byte, "round trip of 0x{:02X}", byte);
        }
    }
    assert_eq!(ColumnType::from_u8(0x03), Some(ColumnType::MYSQL_TYPE_LONG));
    assert_eq!(ColumnType::from_u8(0xfe), Some(ColumnType::MYSQL_TYPE_STRING));
    assert_eq!(ColumnType::from_u8(0x20), None);
}

#[test]
fn test_column_type_classification() {
    // Each column type is in at most one numeric class
    for byte in 0u8..=255 {
        let Some(t) = ColumnType::from_u8(byte) else {
            continue;
        };
        let classes = [t.is_integer(), t.is_float(), t.is_decimal(), t.is_temporal()];
        assert!(
            classes.iter().filter(|c| **c).count() <= 1,
            "{:?} belongs to more than one class",
            t
        );
    }

    assert!(ColumnType::MYSQL_TYPE_YEAR.is_integer());
    assert!(ColumnType::MYSQL_TYPE_TIME.is_temporal());
    assert!(ColumnType::MYSQL_TYPE_TIME.is_time());
    assert!(!ColumnType::MYSQL_TYPE_DATETIME.is_time());
    assert!(ColumnType::MYSQL_TYPE_NEWDECIMAL.is_decimal());
    assert!(!ColumnType::MYSQL_TYPE_VAR_STRING.is_temporal());
}

#[test]
fn test_column_flags_retain_unknown_bits() {
    let flags = ColumnFlags::from_bits_retain(0x4021);
    assert!(flags.contains(ColumnFlags::UNSIGNED_FLAG | ColumnFlags::NOT_NULL_FLAG));
    assert_eq!(flags.bits(), 0x4021);
    assert_eq!(ColumnFlags::default(), ColumnFlags::empty());
}
