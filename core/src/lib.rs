#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Estimation of the dispersion parameter φ over binned, time-stamped sequence data.
//!
//! This serves as the core library implementation for the `phi` CLI, but can also be used as a
//! free-standing library.
//!
//! # Overview
//!
//! A [`SequenceTable`] holds sequences with a day offset, a date, and a set of mutations. The
//! table is partitioned into bins by a [`Binning`], either in windows of a fixed number of days or
//! of a fixed number of sequences. For each bin, the number of distinct haplotypes and the number
//! of mutated sequences per day give an estimate of φ, see [`estimate`](mod@estimate). Finally,
//! the [`Aggregator`] runs several binnings and collects the estimates in a [`ResultTable`]
//! sorted by date.
//!
//! # Example
//!
//! ```
//! use std::num::NonZeroUsize;
//!
//! use chrono::NaiveDate;
//! use phi_core::{aggregate, SequenceRecord, SequenceTable};
//!
//! let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
//! let table = (0..10)
//!     .map(|t| {
//!         let date = start + chrono::Duration::days(t);
//!         let snvs = if t < 5 { "C241T" } else { "" };
//!         SequenceRecord::new(Some(t), Some(date), snvs)
//!     })
//!     .collect::<SequenceTable>();
//!
//! let widths = [NonZeroUsize::new(10).unwrap()];
//! let result = aggregate(&table, &[], &widths).unwrap();
//!
//! assert_eq!(result.len(), 1);
//! assert_eq!(result.rows()[0].attributes.haplotypes, 2);
//! ```

#[cfg(test)]
#[macro_use]
pub(crate) mod approx;

pub mod aggregate;
pub use aggregate::{aggregate, AggregateError, Aggregator, ResultTable};

pub mod bin;
pub use bin::{Bin, BinAttributes};

pub mod binning;
pub use binning::Binning;

pub mod estimate;
pub use estimate::{PhiEstimate, PhiEstimator};

pub mod input;
pub use input::Input;

pub mod sequence;
pub use sequence::{SequenceRecord, SequenceTable};
