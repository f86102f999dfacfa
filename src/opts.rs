use smart_default::SmartDefault;

/// Options for result set backends
///
/// ```rs
/// let mut opts = Opts::default();
/// opts.prefetch_rows = 256;
/// let result = StreamingResult::with_opts(columns, source, &opts);
/// ```
#[derive(Debug, Clone, SmartDefault)]
pub struct Opts {
    /// Rows a streaming result pulls from its source each time it runs out.
    /// Values below 1 are treated as 1.
    #[default(64)]
    pub prefetch_rows: usize,

    /// Rows reserved up front by a buffered result
    pub row_capacity: usize,
}

impl Opts {
    pub(crate) fn batch_size(&self) -> usize {
        self.prefetch_rows.max(1)
    }
}
