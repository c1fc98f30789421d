//! Aggregation of φ estimates across binnings.

use std::{fmt, num::NonZeroUsize};

use chrono::{NaiveDate, TimeDelta};

use crate::{
    bin::BinAttributes,
    binning::Binning,
    estimate::{Method, PhiEstimator},
    SequenceTable,
};

pub mod write;

/// A builder to aggregate φ estimates over several binnings of a sequence table.
#[derive(Clone, Debug, Default)]
pub struct Aggregator {
    widths: Vec<NonZeroUsize>,
    sizes: Vec<NonZeroUsize>,
    estimator: PhiEstimator,
    keep_unsolvable: bool,
}

impl Aggregator {
    /// Returns the binnings in the order they are run.
    ///
    /// Fixed-width binnings come first, followed by fixed-size binnings, each in the order given.
    pub fn binnings(&self) -> impl Iterator<Item = Binning> + '_ {
        self.widths
            .iter()
            .map(|&width| Binning::FixedWidth(width))
            .chain(self.sizes.iter().map(|&size| Binning::FixedSize(size)))
    }

    /// Bins the table with every binning and estimates φ for each bin.
    ///
    /// The result is sorted by date, where ties keep the order of the binnings.
    pub fn run(&self, table: &SequenceTable) -> Result<ResultTable, AggregateError> {
        if table.timed().is_empty() {
            return Err(AggregateError::NoDayOffsets);
        }
        let min_date = table.min_date().ok_or(AggregateError::NoDates)?;

        let untimed = table.untimed();
        if untimed > 0 {
            log::warn!("Ignoring {untimed} sequences without a day offset.");
        }

        let mut rows = Vec::new();
        let mut unsolvable = 0;
        for binning in self.binnings() {
            log::info!("Binning sequences by {binning}.");

            for bin in binning.bins(table) {
                let attributes = bin.extract(&self.estimator);
                log::debug!(
                    "Bin at t={} with {} sequences over {} days has phi {}.",
                    attributes.t,
                    attributes.sample_size,
                    attributes.days_per_bin,
                    attributes.phi,
                );

                if !attributes.phi.is_solvable() && !self.keep_unsolvable {
                    unsolvable += 1;
                    continue;
                }

                rows.push(Row::new(attributes, min_date)?);
            }
        }

        if unsolvable > 0 {
            log::info!("Dropped {unsolvable} bins with unsolvable phi.");
        }

        rows.sort_by_key(|row| row.date);

        Ok(ResultTable { rows })
    }

    /// Set the estimator used for each bin.
    ///
    /// If unset, the default estimator is used.
    pub fn set_estimator(mut self, estimator: PhiEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    /// Set whether to keep bins where φ could not be estimated.
    ///
    /// By default, such bins are dropped.
    pub fn set_keep_unsolvable(mut self, keep_unsolvable: bool) -> Self {
        self.keep_unsolvable = keep_unsolvable;
        self
    }

    /// Set the estimation method.
    pub fn set_method(mut self, method: Method) -> Self {
        self.estimator = self.estimator.set_method(method);
        self
    }

    /// Set sizes for fixed-size binnings.
    pub fn set_sizes(mut self, sizes: Vec<NonZeroUsize>) -> Self {
        self.sizes = sizes;
        self
    }

    /// Set widths in days for fixed-width binnings.
    pub fn set_widths(mut self, widths: Vec<NonZeroUsize>) -> Self {
        self.widths = widths;
        self
    }
}

/// Aggregates φ estimates over fixed-size binnings of `sizes` and fixed-width binnings of
/// `widths`, dropping bins where φ could not be estimated.
///
/// See [`Aggregator`] for further options.
pub fn aggregate(
    table: &SequenceTable,
    sizes: &[NonZeroUsize],
    widths: &[NonZeroUsize],
) -> Result<ResultTable, AggregateError> {
    Aggregator::default()
        .set_sizes(sizes.to_vec())
        .set_widths(widths.to_vec())
        .run(table)
}

/// The attributes of a bin along with its date.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Row {
    /// The attributes of the bin.
    pub attributes: BinAttributes,
    /// The date of the bin, counting the bin day offset from the earliest date in the table.
    pub date: NaiveDate,
}

impl Row {
    fn new(attributes: BinAttributes, min_date: NaiveDate) -> Result<Self, AggregateError> {
        let t = attributes.t;
        let date = TimeDelta::try_days(t)
            .and_then(|days| min_date.checked_add_signed(days))
            .ok_or(AggregateError::DateOutOfRange { t })?;

        Ok(Self { attributes, date })
    }
}

/// Aggregated φ estimates sorted by date.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultTable {
    rows: Vec<Row>,
}

impl ResultTable {
    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns the rows.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }
}

impl IntoIterator for ResultTable {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

/// An error associated with aggregation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AggregateError {
    /// No sequence has a day offset.
    NoDayOffsets,
    /// No sequence has a date.
    NoDates,
    /// A bin day offset cannot be represented as a date.
    DateOutOfRange {
        /// The day offset.
        t: i64,
    },
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateError::NoDayOffsets => {
                f.write_str("no sequences with a day offset ('t') in input")
            }
            AggregateError::NoDates => f.write_str("no sequences with a date in input"),
            AggregateError::DateOutOfRange { t } => {
                write!(f, "day offset {t} is out of range for dates")
            }
        }
    }
}

impl std::error::Error for AggregateError {}
