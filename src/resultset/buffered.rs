use std::collections::BTreeMap;
use std::sync::Arc;

use crate::Opts;
use crate::col::ColumnDefinition;
use crate::error::{Error, Result};
use crate::protocol::Protocol;
use crate::resultset::{RawRow, ResultSet, check_row_len, column_map};

/// A result set with every row resident in memory
#[derive(Debug)]
pub struct BufferedResult {
    columns: Vec<Arc<ColumnDefinition>>,
    fields: BTreeMap<String, usize>,
    rows: Vec<RawRow>,
}

impl BufferedResult {
    /// An empty result set with the given columns
    pub fn new(columns: Vec<ColumnDefinition>) -> Self {
        Self::with_opts(columns, &Opts::default())
    }

    pub fn with_opts(columns: Vec<ColumnDefinition>, opts: &Opts) -> Self {
        let columns: Vec<_> = columns.into_iter().map(Arc::new).collect();
        Self {
            fields: column_map(&columns),
            columns,
            rows: Vec::with_capacity(opts.row_capacity),
        }
    }

    /// Decode every payload with `protocol` and keep the rows
    pub fn from_payloads<I>(columns: Vec<ColumnDefinition>, protocol: Protocol, payloads: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        let mut result = Self::new(columns);
        for payload in payloads {
            result.push_payload(protocol, payload.as_ref())?;
        }
        tracing::debug!(
            rows = result.rows.len(),
            columns = result.columns.len(),
            ?protocol,
            "buffered result materialized"
        );
        Ok(result)
    }

    /// Append an already decoded row
    pub fn push_row(&mut self, row: RawRow) -> Result<()> {
        check_row_len(&row, self.columns.len())?;
        self.rows.push(row);
        Ok(())
    }

    /// Decode a row packet payload and append it
    pub fn push_payload(&mut self, protocol: Protocol, payload: &[u8]) -> Result<()> {
        let row = protocol.decode_row(&self.columns, payload)?;
        self.push_row(row)
    }

    pub fn columns(&self) -> &[Arc<ColumnDefinition>] {
        &self.columns
    }
}

impl ResultSet for BufferedResult {
    fn fields(&self) -> &BTreeMap<String, usize> {
        &self.fields
    }

    fn size(&self) -> usize {
        self.rows.len()
    }

    fn fetch(&self, index: usize) -> Result<RawRow> {
        self.rows
            .get(index)
            .map(Arc::clone)
            .ok_or(Error::RowOutOfBounds {
                index,
                size: self.rows.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant::ColumnType;
    use crate::protocol::primitive::{write_int_1, write_string_lenenc};
    use crate::protocol::TextField;
    use crate::resultset::FieldHandle;

    fn columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("id", ColumnType::MYSQL_TYPE_LONG),
            ColumnDefinition::new("name", ColumnType::MYSQL_TYPE_VAR_STRING),
        ]
    }

    #[test]
    fn rows_have_one_entry_per_column() {
        let mut payload = Vec::new();
        write_string_lenenc(&mut payload, "1");
        write_int_1(&mut payload, 0xFB);

        let result = BufferedResult::from_payloads(columns(), Protocol::Text, [payload]).unwrap();
        assert_eq!(result.size(), 1);
        let row = result.fetch(0).unwrap();
        assert_eq!(row.len(), result.fields().len());
        assert!(row[0].is_some());
        assert!(row[1].is_none());
    }

    #[test]
    fn out_of_bounds_fetch_fails() {
        let result = BufferedResult::new(columns());
        assert!(matches!(
            result.fetch(0),
            Err(Error::RowOutOfBounds { index: 0, size: 0 })
        ));
    }

    #[test]
    fn short_row_is_rejected() {
        let mut result = BufferedResult::new(columns());
        let column = Arc::clone(&result.columns()[0]);
        let field: FieldHandle = Arc::new(TextField::new(column, b"1".to_vec()));
        let row: RawRow = vec![Some(field)].into();
        assert!(matches!(
            result.push_row(row),
            Err(Error::ColumnCountMismatch {
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn duplicate_names_get_distinct_keys() {
        let result = BufferedResult::new(vec![
            ColumnDefinition::new("a", ColumnType::MYSQL_TYPE_LONG).with_table("t"),
            ColumnDefinition::new("a", ColumnType::MYSQL_TYPE_LONG).with_table("u"),
            ColumnDefinition::new("a", ColumnType::MYSQL_TYPE_LONG),
        ]);
        let fields = result.fields();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields.get("a"), Some(&0));
        assert_eq!(fields.get("u.a"), Some(&1));
        assert_eq!(fields.get("a#2"), Some(&2));
    }
}
