use std::sync::Arc;

use crate::error::{Error, Result};
use crate::resultset::ResultSet;
use crate::row::ResultRow;

/// Handle to the outcome of one query
///
/// A query that produced no result set (or failed) is represented by an invalid
/// `QueryResult`, which reports zero rows and refuses row access.
#[derive(Clone, Default)]
pub struct QueryResult {
    inner: Option<Arc<dyn ResultSet>>,
}

impl QueryResult {
    pub fn new(result: Arc<dyn ResultSet>) -> Self {
        Self {
            inner: Some(result),
        }
    }

    pub fn invalid() -> Self {
        Self { inner: None }
    }

    pub fn is_valid(&self) -> bool {
        self.inner.is_some()
    }

    /// Rows known to the result set, 0 when invalid
    pub fn len(&self) -> usize {
        self.inner.as_ref().map_or(0, |result| result.size())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn row(&self, index: usize) -> Result<ResultRow> {
        let result = self.inner.as_ref().ok_or(Error::InvalidResult)?;
        let raw = result.fetch(index)?;
        Ok(ResultRow::new(Arc::clone(result), raw))
    }

    /// Iterate rows in order
    ///
    /// Streaming results are drained: iteration continues until the result set reports
    /// that no row exists at the next index.
    pub fn iter(&self) -> Rows<'_> {
        Rows {
            result: self,
            next: 0,
            done: !self.is_valid(),
        }
    }
}

impl std::fmt::Debug for QueryResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryResult")
            .field("valid", &self.is_valid())
            .field("rows", &self.len())
            .finish()
    }
}

/// Iterator over the rows of a [`QueryResult`]
pub struct Rows<'a> {
    result: &'a QueryResult,
    next: usize,
    done: bool,
}

impl Iterator for Rows<'_> {
    type Item = Result<ResultRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.result.row(self.next) {
            Ok(row) => {
                self.next += 1;
                Some(Ok(row))
            }
            Err(Error::RowOutOfBounds { .. }) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl<'a> IntoIterator for &'a QueryResult {
    type Item = Result<ResultRow>;
    type IntoIter = Rows<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
