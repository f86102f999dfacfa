use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use auto_impl::auto_impl;

use crate::Opts;
use crate::col::ColumnDefinition;
use crate::error::{Error, Result};
use crate::protocol::Protocol;
use crate::resultset::{RawRow, ResultSet, check_row_len, column_map};

/// Producer of rows for a [`StreamingResult`]
#[auto_impl(&mut, Box)]
pub trait RowSource: Send {
    /// The next row, or `None` once the source is drained
    fn next_row(&mut self) -> Result<Option<RawRow>>;
}

/// Decodes row packet payloads lazily, one per [`RowSource::next_row`] call
pub struct PayloadSource<I> {
    columns: Vec<Arc<ColumnDefinition>>,
    protocol: Protocol,
    payloads: I,
}

impl<I> PayloadSource<I> {
    pub fn new(columns: Vec<Arc<ColumnDefinition>>, protocol: Protocol, payloads: I) -> Self {
        Self {
            columns,
            protocol,
            payloads,
        }
    }
}

impl<I> RowSource for PayloadSource<I>
where
    I: Iterator + Send,
    I::Item: AsRef<[u8]>,
{
    fn next_row(&mut self) -> Result<Option<RawRow>> {
        match self.payloads.next() {
            Some(payload) => self
                .protocol
                .decode_row(&self.columns, payload.as_ref())
                .map(Some),
            None => Ok(None),
        }
    }
}

struct State<S> {
    rows: Vec<RawRow>,
    source: S,
    exhausted: bool,
    /// Set once the source fails; no row past `rows` is pulled after that
    failed: Option<String>,
}

impl<S> State<S> {
    fn check_failed(&self) -> Result<()> {
        match &self.failed {
            Some(reason) => Err(Error::SourceFailed {
                index: self.rows.len(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// A result set that materializes rows on demand
///
/// `fetch` pulls rows from the source in batches of [`Opts::prefetch_rows`] until the
/// requested index is available. Rows already pulled stay resident, so earlier indices
/// can be fetched again. [`ResultSet::size`] reports the rows materialized so far.
pub struct StreamingResult<S> {
    columns: Vec<Arc<ColumnDefinition>>,
    fields: BTreeMap<String, usize>,
    batch_size: usize,
    state: Mutex<State<S>>,
}

impl<J> StreamingResult<PayloadSource<J>>
where
    J: Iterator + Send,
    J::Item: AsRef<[u8]>,
{
    /// Stream rows decoded from `payloads` with `protocol`
    pub fn from_payloads<I>(columns: Vec<ColumnDefinition>, protocol: Protocol, payloads: I) -> Self
    where
        I: IntoIterator<IntoIter = J>,
    {
        let columns: Vec<_> = columns.into_iter().map(Arc::new).collect();
        let source = PayloadSource::new(columns.clone(), protocol, payloads.into_iter());
        Self::build(columns, source, &Opts::default())
    }
}

impl<S: RowSource> StreamingResult<S> {
    pub fn new(columns: Vec<ColumnDefinition>, source: S) -> Self {
        Self::with_opts(columns, source, &Opts::default())
    }

    pub fn with_opts(columns: Vec<ColumnDefinition>, source: S, opts: &Opts) -> Self {
        Self::build(columns.into_iter().map(Arc::new).collect(), source, opts)
    }

    fn build(columns: Vec<Arc<ColumnDefinition>>, source: S, opts: &Opts) -> Self {
        Self {
            fields: column_map(&columns),
            columns,
            batch_size: opts.batch_size(),
            state: Mutex::new(State {
                rows: Vec::with_capacity(opts.row_capacity),
                source,
                exhausted: false,
                failed: None,
            }),
        }
    }

    pub fn columns(&self) -> &[Arc<ColumnDefinition>] {
        &self.columns
    }

    /// Whether the source has been drained
    pub fn is_exhausted(&self) -> bool {
        self.lock().exhausted
    }

    /// Drain the source and return the total row count
    pub fn fetch_all(&self) -> Result<usize> {
        let mut state = self.lock();
        while !state.exhausted {
            self.pull(&mut state)?;
        }
        Ok(state.rows.len())
    }

    fn lock(&self) -> MutexGuard<'_, State<S>> {
        // rows are appended only after validation
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pull up to one batch of rows from the source
    ///
    /// A failed row has already been consumed from the source, so the failure is recorded
    /// and every later pull reports it instead of shifting the following rows down.
    fn pull(&self, state: &mut State<S>) -> Result<()> {
        state.check_failed()?;
        let before = state.rows.len();
        for _ in 0..self.batch_size {
            let next = state
                .source
                .next_row()
                .and_then(|row| match row {
                    Some(row) => check_row_len(&row, self.columns.len()).map(|()| Some(row)),
                    None => Ok(None),
                });
            match next {
                Ok(Some(row)) => state.rows.push(row),
                Ok(None) => {
                    state.exhausted = true;
                    break;
                }
                Err(err) => {
                    tracing::warn!(index = state.rows.len(), error = %err, "row source failed");
                    state.failed = Some(err.to_string());
                    return Err(err);
                }
            }
        }
        tracing::trace!(
            pulled = state.rows.len() - before,
            total = state.rows.len(),
            exhausted = state.exhausted,
            "streaming result batch"
        );
        Ok(())
    }
}

impl<S: RowSource> ResultSet for StreamingResult<S> {
    fn fields(&self) -> &BTreeMap<String, usize> {
        &self.fields
    }

    fn size(&self) -> usize {
        self.lock().rows.len()
    }

    fn fetch(&self, index: usize) -> Result<RawRow> {
        let mut state = self.lock();
        while state.rows.len() <= index && !state.exhausted {
            self.pull(&mut state)?;
        }
        state
            .rows
            .get(index)
            .map(Arc::clone)
            .ok_or(Error::RowOutOfBounds {
                index,
                size: state.rows.len(),
            })
    }
}

impl<S> std::fmt::Debug for StreamingResult<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingResult")
            .field("columns", &self.columns.len())
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant::ColumnType;
    use crate::protocol::primitive::write_string_lenenc;

    fn columns() -> Vec<ColumnDefinition> {
        vec![ColumnDefinition::new("n", ColumnType::MYSQL_TYPE_LONG)]
    }

    fn payloads(count: usize) -> Vec<Vec<u8>> {
        (0..count)
            .map(|i| {
                let mut payload = Vec::new();
                write_string_lenenc(&mut payload, &i.to_string());
                payload
            })
            .collect()
    }

    /// Counts how many rows were pulled from the inner source
    struct Counting<S> {
        inner: S,
        pulled: Arc<std::sync::atomic::AtomicUsize>,
    }

    impl<S: RowSource> RowSource for Counting<S> {
        fn next_row(&mut self) -> Result<Option<RawRow>> {
            let row = self.inner.next_row()?;
            if row.is_some() {
                self.pulled
                    .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            }
            Ok(row)
        }
    }

    #[test]
    fn fetch_materializes_in_batches() {
        let pulled = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let cols: Vec<_> = columns().into_iter().map(Arc::new).collect();
        let source = Counting {
            inner: PayloadSource::new(cols, Protocol::Text, payloads(10).into_iter()),
            pulled: Arc::clone(&pulled),
        };
        let opts = Opts {
            prefetch_rows: 4,
            ..Opts::default()
        };
        let result = StreamingResult::with_opts(columns(), source, &opts);
        assert_eq!(result.size(), 0);

        let row = result.fetch(1).unwrap();
        assert_eq!(row[0].as_ref().unwrap().to_i32(), Ok(1));
        assert_eq!(result.size(), 4);
        assert_eq!(pulled.load(std::sync::atomic::Ordering::Relaxed), 4);

        result.fetch(5).unwrap();
        assert_eq!(result.size(), 8);
        assert!(!result.is_exhausted());

        assert_eq!(result.fetch_all().unwrap(), 10);
        assert!(result.is_exhausted());
    }

    #[test]
    fn fetch_past_end_fails() {
        let result = StreamingResult::from_payloads(columns(), Protocol::Text, payloads(3));
        assert!(matches!(
            result.fetch(3),
            Err(Error::RowOutOfBounds { index: 3, size: 3 })
        ));
        assert_eq!(result.fetch(0).unwrap()[0].as_ref().unwrap().to_text(), "0");
    }

    #[test]
    fn decode_errors_surface_from_fetch() {
        let result = StreamingResult::from_payloads(columns(), Protocol::Text, [vec![0x05, b'1']]);
        assert!(matches!(result.fetch(0), Err(Error::UnexpectedEof)));
    }

    #[test]
    fn source_failure_is_sticky() {
        let mut rows = payloads(3);
        rows[1] = vec![0x05, b'1'];
        let opts = Opts {
            prefetch_rows: 1,
            ..Opts::default()
        };
        let cols: Vec<_> = columns().into_iter().map(Arc::new).collect();
        let source = PayloadSource::new(cols, Protocol::Text, rows.into_iter());
        let result = StreamingResult::with_opts(columns(), source, &opts);

        assert!(matches!(result.fetch(1), Err(Error::UnexpectedEof)));
        // the row after the broken one must not take its place
        assert!(matches!(
            result.fetch(1),
            Err(Error::SourceFailed { index: 1, .. })
        ));
        assert!(matches!(
            result.fetch(2),
            Err(Error::SourceFailed { index: 1, .. })
        ));
        assert!(matches!(result.fetch_all(), Err(Error::SourceFailed { .. })));
        assert!(!result.is_exhausted());
        assert_eq!(result.size(), 1);
        assert_eq!(result.fetch(0).unwrap()[0].as_ref().unwrap().to_i32(), Ok(0));
    }
}
