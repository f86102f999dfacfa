use thiserror::Error;

pub use color_eyre::eyre::eyre;

/// Failure to convert a present field value into the requested type.
///
/// NULL never produces a `ConversionError`; it converts to the target's zero value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The value is present but cannot be parsed as the requested type
    #[error("Invalid format: cannot decode {detail} as {target}")]
    InvalidFormat { target: &'static str, detail: String },

    /// The value parses but does not fit the requested width, signedness or size
    #[error("Out of range: {detail} does not fit in {target}")]
    OutOfRange { target: &'static str, detail: String },
}

impl ConversionError {
    pub(crate) fn invalid_format<T>(detail: impl Into<String>) -> Self {
        Self::InvalidFormat {
            target: std::any::type_name::<T>(),
            detail: detail.into(),
        }
    }

    pub(crate) fn out_of_range<T>(detail: impl Into<String>) -> Self {
        Self::OutOfRange {
            target: std::any::type_name::<T>(),
            detail: detail.into(),
        }
    }
}

pub type ConversionResult<T> = std::result::Result<T, ConversionError>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    #[error("Unexpected end of packet")]
    UnexpectedEof,

    #[error("Invalid packet")]
    InvalidPacket,

    #[error("Invalid result object")]
    InvalidResult,

    #[error("Row index {index} is out of bounds (rows: {size})")]
    RowOutOfBounds { index: usize, size: usize },

    #[error("Column index {index} is out of bounds (columns: {count})")]
    ColumnOutOfBounds { index: usize, count: usize },

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Row has {found} fields but the result set has {expected} columns")]
    ColumnCountMismatch { expected: usize, found: usize },

    #[error("Row source failed before row {index}: {reason}")]
    SourceFailed { index: usize, reason: String },

    #[error("Library bug: {0}")]
    LibraryBug(color_eyre::Report),
}

impl Error {
    /// Wrap an error that only implements `Debug` (e.g. zerocopy cast errors)
    pub fn from_debug(err: impl std::fmt::Debug) -> Self {
        Self::LibraryBug(eyre!("{:?}", err))
    }
}

impl From<std::convert::Infallible> for Error {
    fn from(err: std::convert::Infallible) -> Self {
        match err {}
    }
}

pub type Result<T> = std::result::Result<T, Error>;
