use crate::constant::{BINARY_CHARSET, ColumnFlags, ColumnType};
use crate::error::{Error, Result, eyre};
use crate::protocol::primitive::*;
use zerocopy::byteorder::little_endian::{U16 as U16LE, U32 as U32LE};
use zerocopy::{FromBytes, Immutable, KnownLayout};

/// utf8mb4_general_ci
const DEFAULT_CHARSET: u16 = 45;

/// Column definition of a result set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDefinition {
    pub schema: String,
    pub table: String,
    pub org_table: String,
    pub name: String,
    pub org_name: String,
    pub charset: u16,
    pub column_length: u32,
    pub column_type: ColumnType,
    pub flags: ColumnFlags,
    pub decimals: u8,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        let name = name.into();
        Self {
            schema: String::new(),
            table: String::new(),
            org_table: String::new(),
            org_name: name.clone(),
            name,
            charset: DEFAULT_CHARSET,
            column_length: 0,
            column_type,
            flags: ColumnFlags::empty(),
            decimals: 0,
        }
    }

    pub fn with_flags(mut self, flags: ColumnFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_charset(mut self, charset: u16) -> Self {
        self.charset = charset;
        self
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self.org_table = self.table.clone();
        self
    }

    /// Parse the payload of a Protocol::ColumnDefinition41 packet
    pub fn parse(packet: &[u8]) -> Result<Self> {
        // ─── Variable Length String Fields ───────────────────────────
        let (_catalog, data) = read_string_lenenc(packet)?;
        let (schema, data) = read_string_lenenc(data)?;
        let (table, data) = read_string_lenenc(data)?;
        let (org_table, data) = read_string_lenenc(data)?;
        let (name, data) = read_string_lenenc(data)?;
        let (org_name, data) = read_string_lenenc(data)?;

        // ─── Column Definition Tail ──────────────────────────────────
        // length is always 0x0c
        let (length, data) = read_int_lenenc(data)?;
        if length != 0x0c {
            return Err(Error::LibraryBug(eyre!(
                "unexpected column definition tail length: {}",
                length
            )));
        }
        let (tail, _) = read_string_fix(data, 12)?;
        let tail = ColumnDefinitionTail::ref_from_bytes(tail).map_err(Error::from_debug)?;

        Ok(Self {
            schema: lossy(schema),
            table: lossy(table),
            org_table: lossy(org_table),
            name: lossy(name),
            org_name: lossy(org_name),
            charset: tail.charset.get(),
            column_length: tail.column_length.get(),
            column_type: tail.column_type()?,
            flags: ColumnFlags::from_bits_retain(tail.flags.get()),
            decimals: tail.decimals,
        })
    }

    pub fn is_unsigned(&self) -> bool {
        self.flags.contains(ColumnFlags::UNSIGNED_FLAG)
    }

    /// Whether the column carries binary (non-text) data
    pub fn is_binary(&self) -> bool {
        self.charset == BINARY_CHARSET
    }

    pub fn is_temporal(&self) -> bool {
        self.column_type.is_temporal()
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Fixed-size tail of Column Definition packet (12 bytes)
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable)]
struct ColumnDefinitionTail {
    charset: U16LE,
    column_length: U32LE,
    column_type: u8,
    flags: U16LE,
    decimals: u8,
    _reserved: U16LE,
}

impl ColumnDefinitionTail {
    fn column_type(&self) -> Result<ColumnType> {
        ColumnType::from_u8(self.column_type).ok_or_else(|| {
            Error::LibraryBug(eyre!("unknown column type: 0x{:02X}", self.column_type))
        })
    }
}
