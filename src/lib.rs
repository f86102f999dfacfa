pub mod col;
pub mod constant;
pub mod error;
pub mod field;
mod opts;
pub mod protocol;
pub mod raw;
pub mod result;
pub mod resultset;
pub mod row;
pub mod value;

pub use field::ResultField;
pub use opts::Opts;
pub use result::QueryResult;
pub use resultset::{BufferedResult, RawRow, ResultSet, StreamingResult};
pub use row::ResultRow;
pub use value::DateTime;

#[cfg(test)]
mod col_test;
#[cfg(test)]
mod constant_test;
#[cfg(test)]
mod opts_test;
