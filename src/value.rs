//! Decoded field values and the calendar types they carry

use std::fmt;

use crate::col::ColumnDefinition;
use crate::constant::ColumnType;
use crate::error::{Error, Result, eyre};
use crate::protocol::primitive::*;
use simdutf8::basic::from_utf8;
use zerocopy::byteorder::little_endian::{U16 as U16LE, U32 as U32LE};
use zerocopy::{FromBytes, Immutable, KnownLayout};

/// A borrowed view of one decoded field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    /// NULL value
    Null,
    /// Signed integer (TINYINT, SMALLINT, INT, BIGINT, YEAR)
    SignedInt(i64),
    /// Unsigned integer (TINYINT UNSIGNED, SMALLINT UNSIGNED, INT UNSIGNED, BIGINT UNSIGNED)
    UnsignedInt(u64),
    /// FLOAT - 4-byte floating point
    Float(f32),
    /// DOUBLE - 8-byte floating point
    Double(f64),
    /// DECIMAL, NEWDECIMAL - ASCII digits
    Decimal(&'a [u8]),
    /// Character data, and every non-temporal value of the text protocol
    Text(&'a [u8]),
    /// Binary charset data (BINARY, VARBINARY, BLOB)
    Bytes(&'a [u8]),
    /// DATE, NEWDATE
    Date(DateTime),
    /// DATETIME, TIMESTAMP
    Timestamp(DateTime),
    /// TIME
    Time(Time),
}

impl<'a> Value<'a> {
    /// A BIT(n) column: up to 8 big-endian bytes as an unsigned integer
    pub fn from_bit(bytes: &'a [u8]) -> Self {
        if bytes.len() > 8 {
            return Value::Bytes(bytes);
        }
        Value::UnsignedInt(bytes.iter().fold(0, |acc, &b| (acc << 8) | u64::from(b)))
    }

    /// Parse a single binary protocol value of `column`
    ///
    /// Returns the parsed value and the remaining bytes
    pub fn parse_binary(column: &ColumnDefinition, data: &'a [u8]) -> Result<(Self, &'a [u8])> {
        let is_unsigned = column.is_unsigned();

        match column.column_type {
            ColumnType::MYSQL_TYPE_NULL => Ok((Value::Null, data)),

            // Integer types
            ColumnType::MYSQL_TYPE_TINY => {
                let (val, rest) = read_int_1(data)?;
                let value = if is_unsigned {
                    Value::UnsignedInt(u64::from(val))
                } else {
                    Value::SignedInt(i64::from(val as i8))
                };
                Ok((value, rest))
            }

            ColumnType::MYSQL_TYPE_SHORT | ColumnType::MYSQL_TYPE_YEAR => {
                let (val, rest) = read_int_2(data)?;
                let value = if is_unsigned {
                    Value::UnsignedInt(u64::from(val))
                } else {
                    Value::SignedInt(i64::from(val as i16))
                };
                Ok((value, rest))
            }

            ColumnType::MYSQL_TYPE_INT24 | ColumnType::MYSQL_TYPE_LONG => {
                let (val, rest) = read_int_4(data)?;
                let value = if is_unsigned {
                    Value::UnsignedInt(u64::from(val))
                } else {
                    Value::SignedInt(i64::from(val as i32))
                };
                Ok((value, rest))
            }

            ColumnType::MYSQL_TYPE_LONGLONG => {
                let (val, rest) = read_int_8(data)?;
                let value = if is_unsigned {
                    Value::UnsignedInt(val)
                } else {
                    Value::SignedInt(val as i64)
                };
                Ok((value, rest))
            }

            // Floating point types
            ColumnType::MYSQL_TYPE_FLOAT => {
                let (val, rest) = read_int_4(data)?;
                Ok((Value::Float(f32::from_bits(val)), rest))
            }

            ColumnType::MYSQL_TYPE_DOUBLE => {
                let (val, rest) = read_int_8(data)?;
                Ok((Value::Double(f64::from_bits(val)), rest))
            }

            ColumnType::MYSQL_TYPE_DATE | ColumnType::MYSQL_TYPE_NEWDATE => {
                let (datetime, rest) = parse_binary_datetime(data)?;
                Ok((Value::Date(datetime), rest))
            }

            ColumnType::MYSQL_TYPE_DATETIME
            | ColumnType::MYSQL_TYPE_TIMESTAMP
            | ColumnType::MYSQL_TYPE_TIMESTAMP2
            | ColumnType::MYSQL_TYPE_DATETIME2 => {
                let (datetime, rest) = parse_binary_datetime(data)?;
                Ok((Value::Timestamp(datetime), rest))
            }

            ColumnType::MYSQL_TYPE_TIME | ColumnType::MYSQL_TYPE_TIME2 => {
                let (len, rest) = read_int_1(data)?;
                match len {
                    0 => Ok((Value::Time(Time::default()), rest)),
                    8 => {
                        let (bytes, rest) = read_string_fix(rest, 8)?;
                        let time = Time8::ref_from_bytes(bytes).map_err(Error::from_debug)?;
                        Ok((Value::Time(Time::from(time)), rest))
                    }
                    12 => {
                        let (bytes, rest) = read_string_fix(rest, 12)?;
                        let time = Time12::ref_from_bytes(bytes).map_err(Error::from_debug)?;
                        Ok((Value::Time(Time::from(time)), rest))
                    }
                    _ => Err(Error::LibraryBug(eyre!("invalid time length: {}", len))),
                }
            }

            ColumnType::MYSQL_TYPE_BIT => {
                let (bytes, rest) = read_string_lenenc(data)?;
                Ok((Value::from_bit(bytes), rest))
            }

            ColumnType::MYSQL_TYPE_DECIMAL | ColumnType::MYSQL_TYPE_NEWDECIMAL => {
                let (bytes, rest) = read_string_lenenc(data)?;
                Ok((Value::Decimal(bytes), rest))
            }

            // String and BLOB types
            ColumnType::MYSQL_TYPE_VARCHAR
            | ColumnType::MYSQL_TYPE_VAR_STRING
            | ColumnType::MYSQL_TYPE_STRING
            | ColumnType::MYSQL_TYPE_BLOB
            | ColumnType::MYSQL_TYPE_TINY_BLOB
            | ColumnType::MYSQL_TYPE_MEDIUM_BLOB
            | ColumnType::MYSQL_TYPE_LONG_BLOB
            | ColumnType::MYSQL_TYPE_GEOMETRY
            | ColumnType::MYSQL_TYPE_JSON
            | ColumnType::MYSQL_TYPE_ENUM
            | ColumnType::MYSQL_TYPE_SET
            | ColumnType::MYSQL_TYPE_TYPED_ARRAY => {
                let (bytes, rest) = read_string_lenenc(data)?;
                let value = if column.is_binary() {
                    Value::Bytes(bytes)
                } else {
                    Value::Text(bytes)
                };
                Ok((value, rest))
            }
        }
    }
}

fn parse_binary_datetime(data: &[u8]) -> Result<(DateTime, &[u8])> {
    let (len, rest) = read_int_1(data)?;
    match len {
        0 => Ok((DateTime::ZERO, rest)),
        4 => {
            let (bytes, rest) = read_string_fix(rest, 4)?;
            let ts = Timestamp4::ref_from_bytes(bytes).map_err(Error::from_debug)?;
            Ok((DateTime::from(ts), rest))
        }
        7 => {
            let (bytes, rest) = read_string_fix(rest, 7)?;
            let ts = Timestamp7::ref_from_bytes(bytes).map_err(Error::from_debug)?;
            Ok((DateTime::from(ts), rest))
        }
        11 => {
            let (bytes, rest) = read_string_fix(rest, 11)?;
            let ts = Timestamp11::ref_from_bytes(bytes).map_err(Error::from_debug)?;
            Ok((DateTime::from(ts), rest))
        }
        _ => Err(Error::LibraryBug(eyre!("invalid datetime length: {}", len))),
    }
}

// ============================================================================
// Calendar Types
// ============================================================================

/// A calendar timestamp with microsecond precision
///
/// MySQL allows the zero date `0000-00-00 00:00:00`, so the fields are not
/// guaranteed to form a valid calendar date. Use [`DateTime::is_valid`] to check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub microsecond: u32,
}

impl DateTime {
    /// 1900-01-01 00:00:00, returned for NULL and non-temporal fields
    pub const EPOCH: Self = Self::new(1900, 1, 1, 0, 0, 0);

    /// 0000-00-00 00:00:00
    pub const ZERO: Self = Self::new(0, 0, 0, 0, 0, 0);

    pub const fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            microsecond: 0,
        }
    }

    pub const fn with_microsecond(mut self, microsecond: u32) -> Self {
        self.microsecond = microsecond;
        self
    }

    pub fn is_zero_date(&self) -> bool {
        self.year == 0 && self.month == 0 && self.day == 0
    }

    /// Whether the fields form a real calendar date and time of day
    pub fn is_valid(&self) -> bool {
        (1..=12).contains(&self.month)
            && self.day >= 1
            && self.day <= days_in_month(self.year, self.month)
            && self.hour < 24
            && self.minute < 60
            && self.second < 60
            && self.microsecond < 1_000_000
    }

    /// Parse `YYYY-MM-DD[ hh:mm:ss[.ffffff]]` as sent by the text protocol
    ///
    /// The zero date is accepted; any other out-of-range component is rejected.
    pub fn parse(text: &[u8]) -> Option<Self> {
        let text = from_utf8(text).ok()?;
        let (date, clock) = match text.split_once(|c: char| c == ' ' || c == 'T') {
            Some((date, clock)) => (date, Some(clock)),
            None => (text, None),
        };

        let mut parts = date.split('-');
        let year = u16::try_from(number(parts.next()?)?).ok()?;
        let month = u8::try_from(number(parts.next()?)?).ok()?;
        let day = u8::try_from(number(parts.next()?)?).ok()?;
        if parts.next().is_some() {
            return None;
        }

        let mut datetime = Self::new(year, month, day, 0, 0, 0);
        if let Some(clock) = clock {
            let (hour, minute, second, microsecond) = parse_clock(clock)?;
            datetime.hour = u8::try_from(hour).ok()?;
            datetime.minute = minute;
            datetime.second = second;
            datetime.microsecond = microsecond;
        }

        let zero_clock = datetime.hour == 0 && datetime.minute == 0 && datetime.second == 0;
        if (datetime.is_zero_date() && zero_clock) || datetime.is_valid() {
            Some(datetime)
        } else {
            None
        }
    }

    /// `YYYY-MM-DD`
    pub fn date_string(&self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl Default for DateTime {
    fn default() -> Self {
        Self::EPOCH
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:02}:{:02}:{:02}",
            self.date_string(),
            self.hour,
            self.minute,
            self.second
        )?;
        if self.microsecond != 0 {
            write!(f, ".{:06}", self.microsecond)?;
        }
        Ok(())
    }
}

fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// A signed MySQL TIME value (`-838:59:59` to `838:59:59`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Time {
    pub negative: bool,
    pub days: u32,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub microsecond: u32,
}

impl Time {
    pub fn total_hours(&self) -> u64 {
        u64::from(self.days) * 24 + u64::from(self.hour)
    }

    /// Parse `[-]h:mm:ss[.ffffff]` as sent by the text protocol
    pub fn parse(text: &[u8]) -> Option<Self> {
        let text = from_utf8(text).ok()?;
        let (negative, clock) = match text.strip_prefix('-') {
            Some(clock) => (true, clock),
            None => (false, text),
        };
        let (hours, minute, second, microsecond) = parse_clock(clock)?;
        Some(Self {
            negative,
            days: hours / 24,
            hour: u8::try_from(hours % 24).ok()?,
            minute,
            second,
            microsecond,
        })
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            f.write_str("-")?;
        }
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.total_hours(),
            self.minute,
            self.second
        )?;
        if self.microsecond != 0 {
            write!(f, ".{:06}", self.microsecond)?;
        }
        Ok(())
    }
}

/// Parse `h:mm:ss[.ffffff]` into (hours, minute, second, microsecond)
fn parse_clock(clock: &str) -> Option<(u32, u8, u8, u32)> {
    let (hms, fraction) = match clock.split_once('.') {
        Some((hms, fraction)) => (hms, Some(fraction)),
        None => (clock, None),
    };
    let mut parts = hms.split(':');
    let hours = number(parts.next()?)?;
    let minute = u8::try_from(number(parts.next()?)?).ok()?;
    let second = u8::try_from(number(parts.next()?)?).ok()?;
    if parts.next().is_some() || minute >= 60 || second >= 60 {
        return None;
    }
    let microsecond = match fraction {
        Some(fraction) => microseconds(fraction)?,
        None => 0,
    };
    Some((hours, minute, second, microsecond))
}

fn number(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn microseconds(fraction: &str) -> Option<u32> {
    if fraction.len() > 6 {
        return None;
    }
    let value = number(fraction)?;
    let scale = 6 - fraction.len() as u32;
    Some(value * 10_u32.pow(scale))
}

#[cfg(feature = "with-chrono")]
impl TryFrom<DateTime> for chrono::NaiveDateTime {
    type Error = crate::error::ConversionError;

    fn try_from(datetime: DateTime) -> crate::error::ConversionResult<Self> {
        chrono::NaiveDate::from_ymd_opt(
            i32::from(datetime.year),
            u32::from(datetime.month),
            u32::from(datetime.day),
        )
        .and_then(|date| {
            date.and_hms_micro_opt(
                u32::from(datetime.hour),
                u32::from(datetime.minute),
                u32::from(datetime.second),
                datetime.microsecond,
            )
        })
        .ok_or_else(|| crate::error::ConversionError::out_of_range::<Self>(datetime.to_string()))
    }
}

#[cfg(feature = "with-time")]
impl TryFrom<DateTime> for time::PrimitiveDateTime {
    type Error = crate::error::ConversionError;

    fn try_from(datetime: DateTime) -> crate::error::ConversionResult<Self> {
        let out_of_range = |_e: time::error::ComponentRange| {
            crate::error::ConversionError::out_of_range::<Self>(datetime.to_string())
        };
        let month = time::Month::try_from(datetime.month).map_err(out_of_range)?;
        let date = time::Date::from_calendar_date(i32::from(datetime.year), month, datetime.day)
            .map_err(out_of_range)?;
        let clock = time::Time::from_hms_micro(
            datetime.hour,
            datetime.minute,
            datetime.second,
            datetime.microsecond,
        )
        .map_err(out_of_range)?;
        Ok(time::PrimitiveDateTime::new(date, clock))
    }
}

// ============================================================================
// Binary Protocol Temporal Layouts
// ============================================================================

/// DATE/DATETIME/TIMESTAMP - 4 bytes (ymd)
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable)]
pub struct Timestamp4 {
    pub year: U16LE,
    pub month: u8,
    pub day: u8,
}

impl From<&Timestamp4> for DateTime {
    fn from(ts: &Timestamp4) -> Self {
        Self::new(ts.year.get(), ts.month, ts.day, 0, 0, 0)
    }
}

/// DATE/DATETIME/TIMESTAMP - 7 bytes (ymd + hms)
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable)]
pub struct Timestamp7 {
    pub year: U16LE,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl From<&Timestamp7> for DateTime {
    fn from(ts: &Timestamp7) -> Self {
        Self::new(
            ts.year.get(),
            ts.month,
            ts.day,
            ts.hour,
            ts.minute,
            ts.second,
        )
    }
}

/// DATE/DATETIME/TIMESTAMP - 11 bytes (ymd + hms + microseconds)
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable)]
pub struct Timestamp11 {
    pub year: U16LE,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub microsecond: U32LE,
}

impl From<&Timestamp11> for DateTime {
    fn from(ts: &Timestamp11) -> Self {
        Self::new(
            ts.year.get(),
            ts.month,
            ts.day,
            ts.hour,
            ts.minute,
            ts.second,
        )
        .with_microsecond(ts.microsecond.get())
    }
}

/// TIME - 8 bytes: is_negative (1), days (4 LE), hour (1), minute (1), second (1)
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable)]
pub struct Time8 {
    pub is_negative: u8,
    pub days: U32LE,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl From<&Time8> for Time {
    fn from(time: &Time8) -> Self {
        Self {
            negative: time.is_negative != 0,
            days: time.days.get(),
            hour: time.hour,
            minute: time.minute,
            second: time.second,
            microsecond: 0,
        }
    }
}

/// TIME - 12 bytes: Time8 followed by microsecond (4 LE)
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable)]
pub struct Time12 {
    pub is_negative: u8,
    pub days: U32LE,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub microsecond: U32LE,
}

impl From<&Time12> for Time {
    fn from(time: &Time12) -> Self {
        Self {
            negative: time.is_negative != 0,
            days: time.days.get(),
            hour: time.hour,
            minute: time.minute,
            second: time.second,
            microsecond: time.microsecond.get(),
        }
    }
}

// ============================================================================
// NULL Bitmap
// ============================================================================

/// NULL bitmap of a binary protocol row
///
/// Each bit represents whether a column is NULL (1 = NULL, 0 = not NULL).
/// Result set rows start at bit 2.
#[derive(Debug, Clone, Copy)]
pub struct NullBitmap<'a> {
    bitmap: &'a [u8],
    offset: usize,
}

impl<'a> NullBitmap<'a> {
    /// Create a NULL bitmap for result sets (offset = 2)
    pub fn for_result_set(bitmap: &'a [u8]) -> Self {
        Self { bitmap, offset: 2 }
    }

    /// Number of bitmap bytes a result set row with `num_columns` columns carries
    pub fn len_for_result_set(num_columns: usize) -> usize {
        (num_columns + 7 + 2) >> 3
    }

    /// Check if the column at the given index is NULL
    pub fn is_null(&self, idx: usize) -> bool {
        let bit_pos = idx + self.offset;
        let byte_pos = bit_pos >> 3;
        let bit_offset = bit_pos & 7;

        match self.bitmap.get(byte_pos) {
            Some(byte) => (byte & (1 << bit_offset)) != 0,
            None => false,
        }
    }
}
