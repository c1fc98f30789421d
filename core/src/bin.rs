//! Bins of sequences and their attributes.

use indexmap::IndexSet;

use crate::{
    binning::Binning,
    estimate::{PhiEstimate, PhiEstimator},
    sequence::SequenceRecord,
};

/// A contiguous run of sequences from a [`SequenceTable`](crate::SequenceTable).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bin<'a> {
    binning: Binning,
    records: &'a [SequenceRecord],
}

impl<'a> Bin<'a> {
    pub(crate) fn new(binning: Binning, records: &'a [SequenceRecord]) -> Self {
        Self { binning, records }
    }

    /// Returns the binning that produced the bin.
    pub fn binning(&self) -> Binning {
        self.binning
    }

    /// Calculates the attributes of the bin, estimating φ with the provided estimator.
    pub fn extract(&self, estimator: &PhiEstimator) -> BinAttributes {
        let records = self.records;

        let mut times = records.iter().filter_map(|record| record.t);
        let (from_t, to_t) = times
            .next()
            .map(|first| times.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t))))
            .unwrap_or_default();
        let days_per_bin = (to_t - from_t + 1) as usize;

        let sample_size = records.len();
        let num_mut = records.iter().filter(|record| record.is_mutated()).count();

        let haplotypes = records
            .iter()
            .map(|record| record.snvs.as_str())
            .collect::<IndexSet<_>>()
            .len();
        let n_mut_types = records
            .iter()
            .flat_map(SequenceRecord::mutations)
            .collect::<IndexSet<_>>()
            .len();

        let (mean, sd) = mean_and_sd(records.iter().filter_map(|record| record.t));

        let days = days_per_bin as f64;
        let phi = estimator.estimate(haplotypes as f64 / days, num_mut as f64 / days);

        BinAttributes {
            t: mean.round_ties_even() as i64,
            t_sd: sd,
            phi,
            sample_size,
            num_mut,
            days_per_bin,
            haplotypes,
            n_mut_types,
            binning: self.binning,
        }
    }

    /// Returns true if the bin has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the number of records in the bin.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns the records in the bin.
    pub fn records(&self) -> &'a [SequenceRecord] {
        self.records
    }
}

/// Returns the mean and sample standard deviation.
///
/// The standard deviation is `None` for fewer than two values.
fn mean_and_sd<I>(values: I) -> (f64, Option<f64>)
where
    I: Iterator<Item = i64> + Clone,
{
    let (n, sum) = values
        .clone()
        .fold((0usize, 0.0), |(n, sum), v| (n + 1, sum + v as f64));
    let mean = sum / n as f64;

    let sd = (n > 1).then(|| {
        let squares = values.map(|v| (v as f64 - mean).powi(2)).sum::<f64>();
        (squares / (n - 1) as f64).sqrt()
    });

    (mean, sd)
}

/// The attributes of a single bin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BinAttributes {
    /// Mean day offset, rounded to the nearest integer with ties to even.
    pub t: i64,
    /// Sample standard deviation of day offsets, `None` if the bin has a single sequence.
    pub t_sd: Option<f64>,
    /// The φ estimate.
    pub phi: PhiEstimate,
    /// Number of sequences.
    pub sample_size: usize,
    /// Number of sequences with at least one mutation.
    pub num_mut: usize,
    /// Number of days spanned, counting both ends.
    pub days_per_bin: usize,
    /// Number of distinct haplotypes, including the reference.
    pub haplotypes: usize,
    /// Number of distinct mutations.
    pub n_mut_types: usize,
    /// The binning that produced the bin.
    pub binning: Binning,
}

impl BinAttributes {
    /// Returns a weight for the bin that decreases with the number of days spanned.
    pub fn weight(&self) -> f64 {
        1.0 / ((self.days_per_bin as f64).sqrt().ln() + 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::num::NonZeroUsize;

    use crate::{estimate::Unsolvable, sequence::tests::table_from_days};

    fn binning() -> Binning {
        Binning::FixedWidth(NonZeroUsize::new(7).unwrap())
    }

    fn extract(days: &[(i64, &str)]) -> BinAttributes {
        let table = table_from_days(days);
        Bin::new(binning(), table.records()).extract(&PhiEstimator::default())
    }

    #[test]
    fn test_extract_ten_days() {
        let days = (0..10)
            .map(|t| (t, if t % 2 == 0 { "" } else { "m1" }))
            .collect::<Vec<_>>();
        let attributes = extract(&days);

        assert_eq!(attributes.sample_size, 10);
        assert_eq!(attributes.num_mut, 5);
        assert_eq!(attributes.haplotypes, 2);
        assert_eq!(attributes.n_mut_types, 1);
        assert_eq!(attributes.days_per_bin, 10);
        // Mean 4.5 rounds to even
        assert_eq!(attributes.t, 4);
        assert_approx_eq!(attributes.t_sd, Some(3.0276503540974917), epsilon = 1e-12);
        assert_eq!(attributes.phi, crate::estimate::estimate(0.2, 0.5));
        assert!(matches!(attributes.phi, PhiEstimate::Value(x) if x > 0.0));
        assert_eq!(attributes.binning, binning());
    }

    #[test]
    fn test_extract_counts_distinct_mutations() {
        let attributes = extract(&[
            (0, "A1G C2T"),
            (0, "C2T A1G"),
            (1, "A1G"),
            (1, ""),
            (2, "G3A"),
        ]);

        assert_eq!(attributes.sample_size, 5);
        assert_eq!(attributes.num_mut, 4);
        // Haplotypes are distinct strings, so the two orderings are separate
        assert_eq!(attributes.haplotypes, 5);
        assert_eq!(attributes.n_mut_types, 3);
        assert_eq!(attributes.days_per_bin, 3);
    }

    #[test]
    fn test_extract_degenerate() {
        let attributes = extract(&[(0, ""), (1, ""), (3, "")]);

        assert_eq!(attributes.num_mut, 0);
        assert_eq!(attributes.haplotypes, 1);
        assert_eq!(attributes.phi, PhiEstimate::Degenerate);
    }

    #[test]
    fn test_extract_unsolvable() {
        let attributes = extract(&[
            (5, "a"),
            (5, "b"),
            (5, "c"),
            (5, ""),
            (5, ""),
            (5, ""),
            (5, ""),
            (5, ""),
        ]);

        assert_eq!(attributes.days_per_bin, 1);
        assert_eq!(attributes.haplotypes, 4);
        assert_eq!(attributes.num_mut, 3);
        assert_eq!(
            attributes.phi,
            PhiEstimate::Unsolvable(Unsolvable::NotEvaluable)
        );
        assert_eq!(attributes.t, 5);
        assert_approx_eq!(attributes.t_sd, Some(0.0));
    }

    #[test]
    fn test_extract_single_sequence() {
        let attributes = extract(&[(3, "")]);

        assert_eq!(attributes.t, 3);
        assert_eq!(attributes.t_sd, None);
        assert_eq!(attributes.days_per_bin, 1);
    }

    #[test]
    fn test_weight() {
        let mut attributes = extract(&[(0, "")]);
        assert_approx_eq!(attributes.weight(), 1.0);

        attributes.days_per_bin = 100;
        assert_approx_eq!(attributes.weight(), 1.0 / (10f64.ln() + 1.0), epsilon = 1e-12);
    }
}
