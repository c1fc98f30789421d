//! Time-stamped sequence records.

use chrono::NaiveDate;

pub mod read;

/// A single observed sequence.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SequenceRecord {
    /// Day offset from some reference date.
    pub t: Option<i64>,
    /// Calendar date of the sequence.
    pub date: Option<NaiveDate>,
    /// Whitespace-separated mutation site identifiers.
    ///
    /// The empty string denotes the reference haplotype.
    pub snvs: String,
}

impl SequenceRecord {
    /// Creates a new record.
    pub fn new<S>(t: Option<i64>, date: Option<NaiveDate>, snvs: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            t,
            date,
            snvs: snvs.into(),
        }
    }

    /// Returns true if the sequence carries any mutations.
    pub fn is_mutated(&self) -> bool {
        !self.snvs.is_empty()
    }

    /// Returns an iterator over the individual mutation site identifiers.
    pub fn mutations(&self) -> std::str::SplitWhitespace<'_> {
        self.snvs.split_whitespace()
    }
}

/// A table of sequences, ordered by day offset.
///
/// Records without a day offset are kept after all records with one.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SequenceTable {
    records: Vec<SequenceRecord>,
    timed: usize,
}

impl SequenceTable {
    /// Creates a new table from records in any order.
    ///
    /// Records are stably sorted by day offset.
    pub fn new(mut records: Vec<SequenceRecord>) -> Self {
        records.sort_by_key(|record| (record.t.is_none(), record.t));
        let timed = records.partition_point(|record| record.t.is_some());

        Self { records, timed }
    }

    /// Returns true if the table has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the number of records in the table.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns the largest day offset, or `None` if no record has one.
    pub fn max_t(&self) -> Option<i64> {
        self.timed().last().and_then(|record| record.t)
    }

    /// Returns the earliest date, or `None` if no record has one.
    pub fn min_date(&self) -> Option<NaiveDate> {
        self.records.iter().filter_map(|record| record.date).min()
    }

    /// Returns the smallest day offset, or `None` if no record has one.
    pub fn min_t(&self) -> Option<i64> {
        self.timed().first().and_then(|record| record.t)
    }

    /// Returns all records.
    pub fn records(&self) -> &[SequenceRecord] {
        &self.records
    }

    /// Returns the records with a day offset, in order.
    pub fn timed(&self) -> &[SequenceRecord] {
        &self.records[..self.timed]
    }

    /// Returns the number of records without a day offset.
    pub fn untimed(&self) -> usize {
        self.records.len() - self.timed
    }
}

impl From<Vec<SequenceRecord>> for SequenceTable {
    fn from(records: Vec<SequenceRecord>) -> Self {
        Self::new(records)
    }
}

impl FromIterator<SequenceRecord> for SequenceTable {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = SequenceRecord>,
    {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Creates a table from day offsets and snvs, with dates counting from 2021-01-01.
    pub fn table_from_days(days: &[(i64, &str)]) -> SequenceTable {
        let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();

        days.iter()
            .map(|&(t, snvs)| {
                let date = start + chrono::Duration::days(t);
                SequenceRecord::new(Some(t), Some(date), snvs)
            })
            .collect()
    }

    #[test]
    fn test_new_sorts_stably_with_untimed_last() {
        let table = SequenceTable::new(vec![
            SequenceRecord::new(Some(3), None, "a"),
            SequenceRecord::new(None, None, "b"),
            SequenceRecord::new(Some(1), None, "c"),
            SequenceRecord::new(Some(3), None, "d"),
            SequenceRecord::new(Some(1), None, "e"),
        ]);

        let snvs = table
            .records()
            .iter()
            .map(|record| record.snvs.as_str())
            .collect::<Vec<_>>();
        assert_eq!(snvs, ["c", "e", "a", "d", "b"]);

        assert_eq!(table.timed().len(), 4);
        assert_eq!(table.untimed(), 1);
        assert_eq!(table.min_t(), Some(1));
        assert_eq!(table.max_t(), Some(3));
    }

    #[test]
    fn test_min_date_ignores_missing() {
        let mut table = table_from_days(&[(5, ""), (2, "")]).records().to_vec();
        table.push(SequenceRecord::new(Some(0), None, ""));
        let table = SequenceTable::new(table);

        assert_eq!(table.min_date(), NaiveDate::from_ymd_opt(2021, 1, 3));
    }

    #[test]
    fn test_empty_table() {
        let table = SequenceTable::default();

        assert!(table.is_empty());
        assert_eq!(table.max_t(), None);
        assert_eq!(table.min_date(), None);
    }

    #[test]
    fn test_mutations() {
        let record = SequenceRecord::new(Some(0), None, "C241T  A23403G\tG28881A");

        assert!(record.is_mutated());
        assert_eq!(
            record.mutations().collect::<Vec<_>>(),
            ["C241T", "A23403G", "G28881A"]
        );
        assert!(!SequenceRecord::default().is_mutated());
    }
}
