//! Strategies for partitioning a sequence table into bins.
//!
//! Both strategies only consider records with a day offset, and rely on the table being sorted by
//! day offset, such that every bin is a contiguous slice of the table.

use std::{fmt, num::NonZeroUsize};

use crate::{bin::Bin, sequence::SequenceRecord, SequenceTable};

/// A binning strategy.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Binning {
    /// Consecutive windows spanning a fixed number of days.
    FixedWidth(NonZeroUsize),
    /// Consecutive windows containing a fixed number of sequences, snapped to days.
    FixedSize(NonZeroUsize),
}

impl Binning {
    /// Partitions the table into bins.
    pub fn bins<'a>(&self, table: &'a SequenceTable) -> Vec<Bin<'a>> {
        match *self {
            Binning::FixedWidth(width) => fixed_width(table, width),
            Binning::FixedSize(size) => fixed_size(table, size),
        }
    }
}

impl fmt::Display for Binning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binning::FixedWidth(width) => write!(f, "fixed-width-{width}"),
            Binning::FixedSize(size) => write!(f, "fixed-size-{size}"),
        }
    }
}

/// Returns the range of positions in `records` with day offsets in `from_t..=to_t`.
fn day_range(records: &[SequenceRecord], from_t: i64, to_t: i64) -> std::ops::Range<usize> {
    let start = records.partition_point(|record| record.t < Some(from_t));
    let end = records.partition_point(|record| record.t <= Some(to_t));
    start..end.max(start)
}

/// Partitions the table into consecutive windows of `width` days.
///
/// The first window starts at the smallest day offset, and windows are created until one reaches
/// the largest day offset. Windows without any sequences are skipped.
pub fn fixed_width(table: &SequenceTable, width: NonZeroUsize) -> Vec<Bin<'_>> {
    let binning = Binning::FixedWidth(width);
    let records = table.timed();

    let (Some(min_t), Some(max_t)) = (table.min_t(), table.max_t()) else {
        return Vec::new();
    };
    // Windows are clamped to the largest day offset, so overly wide windows take everything
    let width = i64::try_from(width.get()).unwrap_or(i64::MAX);

    let mut bins = Vec::new();
    let mut from_t = min_t;
    loop {
        let to_t = from_t.saturating_add(width - 1);

        let range = day_range(records, from_t, to_t);
        if !range.is_empty() {
            bins.push(Bin::new(binning, &records[range]));
        }

        if to_t >= max_t {
            break;
        }
        from_t = to_t + 1;
    }

    bins
}

/// Partitions the table into consecutive windows of `size` sequences.
///
/// Each window starts at the first sequence on or after the day following the previous window,
/// beginning from day zero, and takes the next `size` sequences. If these all fall on a single
/// day, the window instead takes every sequence from that day. Otherwise, when the window ends
/// partway through a day, the remaining sequences from that day are not binned.
///
/// Binning stops once a window reaches the largest day offset, or when fewer than `size`
/// sequences remain for the next window. In the latter case, the remaining sequences are not
/// binned, so every bin has at least `size` sequences.
pub fn fixed_size(table: &SequenceTable, size: NonZeroUsize) -> Vec<Bin<'_>> {
    let binning = Binning::FixedSize(size);
    let records = table.timed();

    let Some(max_t) = table.max_t() else {
        return Vec::new();
    };
    let size = size.get();

    let mut bins = Vec::new();
    let mut from_t = 0;
    let mut to_t = 0;
    while to_t < max_t {
        let cursor = records.partition_point(|record| record.t < Some(from_t));
        if records.len() - cursor < size {
            log::debug!(
                "Leaving {} trailing sequences unbinned for {binning}.",
                records.len() - cursor
            );
            break;
        }

        let mut window = &records[cursor..cursor + size];
        // Sorted and timed, so the last record has the largest day offset
        let Some(window_max_t) = window.last().and_then(|record| record.t) else {
            break;
        };
        to_t = window_max_t;

        if from_t == to_t {
            window = &records[day_range(records, to_t, to_t)];
        }

        bins.push(Bin::new(binning, window));
        from_t = to_t.saturating_add(1);
    }

    bins
}
