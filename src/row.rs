use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::field::ResultField;
use crate::resultset::{RawRow, ResultSet};

/// One fetched row of a result set
#[derive(Clone)]
pub struct ResultRow {
    result: Arc<dyn ResultSet>,
    raw: RawRow,
}

impl ResultRow {
    pub fn new(result: Arc<dyn ResultSet>, raw: RawRow) -> Self {
        Self { result, raw }
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// The field at column `index`
    pub fn get(&self, index: usize) -> Result<ResultField> {
        let field = self.raw.get(index).ok_or(Error::ColumnOutOfBounds {
            index,
            count: self.raw.len(),
        })?;
        Ok(ResultField::new(Arc::clone(&self.result), field.clone()))
    }

    /// The field of the column called `name`
    ///
    /// An exact match wins over an ASCII case-insensitive one.
    pub fn by_name(&self, name: &str) -> Result<ResultField> {
        let fields = self.result.fields();
        let index = fields
            .get(name)
            .or_else(|| {
                fields
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, index)| index)
            })
            .ok_or_else(|| Error::UnknownColumn(name.to_owned()))?;
        self.get(*index)
    }

    pub fn iter(&self) -> impl Iterator<Item = ResultField> + '_ {
        self.raw
            .iter()
            .map(|field| ResultField::new(Arc::clone(&self.result), field.clone()))
    }

    /// Column name to column index
    pub fn columns(&self) -> &BTreeMap<String, usize> {
        self.result.fields()
    }
}

impl std::fmt::Debug for ResultRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
