//! The contract every result set backend implements.
//!
//! A backend owns the row storage of one query result and hands out rows as
//! shared slices of raw fields. Two backends are provided:
//!
//! - [`BufferedResult`] keeps every row resident.
//! - [`StreamingResult`] pulls rows from a [`RowSource`] as they are requested.

mod buffered;
mod streaming;

use std::collections::BTreeMap;
use std::sync::Arc;

use auto_impl::auto_impl;

use crate::col::ColumnDefinition;
use crate::error::Result;
use crate::raw::RawField;

pub use buffered::BufferedResult;
pub use streaming::{PayloadSource, RowSource, StreamingResult};

/// Shared handle to one raw field
pub type FieldHandle = Arc<dyn RawField>;

/// One row: a raw field per column, in column order. `None` is an absent (NULL) field.
pub type RawRow = Arc<[Option<FieldHandle>]>;

/// The outcome of one query
///
/// Implementations that materialize rows lazily must synchronize `fetch` themselves.
#[auto_impl(&, Box, Arc)]
pub trait ResultSet: Send + Sync {
    /// Column name to column index. Stable for the lifetime of the result set.
    fn fields(&self) -> &BTreeMap<String, usize>;

    /// Number of rows known to this result set
    fn size(&self) -> usize;

    /// The row at `index`, with exactly `fields().len()` entries
    ///
    /// Fails with [`Error::RowOutOfBounds`](crate::error::Error::RowOutOfBounds)
    /// when no such row exists.
    fn fetch(&self, index: usize) -> Result<RawRow>;
}

/// Map column names to indices
///
/// Keys must be unique and every column needs one, so a repeated name keeps its bare
/// form for the first column only. Later columns with that name are keyed
/// `table.name`, or `name#index` when the qualified form is taken as well.
fn column_map(columns: &[Arc<ColumnDefinition>]) -> BTreeMap<String, usize> {
    let mut fields = BTreeMap::new();
    for (index, column) in columns.iter().enumerate() {
        let mut key = column.name.clone();
        if fields.contains_key(&key) && !column.table.is_empty() {
            key = format!("{}.{}", column.table, column.name);
        }
        while fields.contains_key(&key) {
            key = format!("{}#{}", key, index);
        }
        if key != column.name {
            tracing::warn!(name = %column.name, key = %key, index, "duplicate column name");
        }
        fields.insert(key, index);
    }
    fields
}

fn check_row_len(row: &RawRow, expected: usize) -> Result<()> {
    if row.len() != expected {
        return Err(crate::error::Error::ColumnCountMismatch {
            expected,
            found: row.len(),
        });
    }
    Ok(())
}
