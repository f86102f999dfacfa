use crate::Opts;

#[test]
fn default_opts() {
    let opts = Opts::default();
    assert_eq!(opts.prefetch_rows, 64);
    assert_eq!(opts.row_capacity, 0);
}

#[test]
fn zero_prefetch_still_makes_progress() {
    let opts = Opts {
        prefetch_rows: 0,
        ..Opts::default()
    };
    assert_eq!(opts.batch_size(), 1);
}
