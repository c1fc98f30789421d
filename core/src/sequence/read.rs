//! Reading sequence tables from delimited text.
//!
//! The table must have a header row. Columns are located by name: `t` and `snvs` are required,
//! `date` is optional, and any other columns are ignored. Missing values may be given as empty
//! fields, `NA`, `NaN` or `nan`.

use std::{fmt, io, path::Path};

use chrono::NaiveDate;

use crate::{input, Input};

use super::{SequenceRecord, SequenceTable};

const T: &str = "t";
const DATE: &str = "date";
const SNVS: &str = "snvs";

const MISSING: [&str; 4] = ["", "NA", "NaN", "nan"];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A builder to read a sequence table.
#[derive(Debug)]
pub struct Builder {
    delimiter: u8,
}

impl Builder {
    /// Read sequence table from reader.
    ///
    /// Gzip-compressed input is not detected here, see [`Builder::read_from_input`].
    pub fn read<R>(self, reader: R) -> io::Result<SequenceTable>
    where
        R: io::Read,
    {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .from_reader(reader);

        let columns = Columns::from_header(reader.headers()?)?;

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();

            let record = columns
                .parse(&record)
                .map_err(|kind| ParseRecordError { line, kind })
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            records.push(record);
        }

        log::debug!("Read {} sequence records.", records.len());

        Ok(SequenceTable::new(records))
    }

    /// Read sequence table from input.
    pub fn read_from_input(self, input: &Input) -> io::Result<SequenceTable> {
        self.read(input.open()?)
    }

    /// Read sequence table from path.
    pub fn read_from_path<P>(self, path: P) -> io::Result<SequenceTable>
    where
        P: AsRef<Path>,
    {
        let reader = std::fs::File::open(path).map(io::BufReader::new)?;
        self.read(input::decompress(reader)?)
    }

    /// Set delimiter between fields.
    ///
    /// If unset, tab will be used.
    pub fn set_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self { delimiter: b'\t' }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Columns {
    t: usize,
    date: Option<usize>,
    snvs: usize,
}

impl Columns {
    fn from_header(header: &csv::StringRecord) -> io::Result<Self> {
        let find = |name: &str| header.iter().position(|column| column.trim() == name);
        let require = |name: &'static str| {
            find(name).ok_or_else(|| {
                let e = ParseRecordError {
                    line: 1,
                    kind: ParseRecordErrorKind::MissingColumn(name),
                };
                io::Error::new(io::ErrorKind::InvalidData, e)
            })
        };

        Ok(Self {
            t: require(T)?,
            date: find(DATE),
            snvs: require(SNVS)?,
        })
    }

    fn parse(&self, record: &csv::StringRecord) -> Result<SequenceRecord, ParseRecordErrorKind> {
        let field = |i: usize| record.get(i).map(str::trim).unwrap_or_default();

        let t = parse_t(field(self.t))?;
        let date = match self.date {
            Some(i) => parse_date(field(i))?,
            None => None,
        };
        let snvs = field(self.snvs);

        Ok(SequenceRecord::new(t, date, snvs))
    }
}

fn is_missing(s: &str) -> bool {
    MISSING.contains(&s)
}

fn parse_t(s: &str) -> Result<Option<i64>, ParseRecordErrorKind> {
    if is_missing(s) {
        return Ok(None);
    }

    // Day offsets written from float columns look like "12.0"
    s.parse::<i64>()
        .ok()
        .or_else(|| {
            s.parse::<f64>()
                .ok()
                .filter(|x| x.is_finite() && x.fract() == 0.0)
                .map(|x| x as i64)
        })
        .map(Some)
        .ok_or_else(|| ParseRecordErrorKind::InvalidT(s.to_string()))
}

fn parse_date(s: &str) -> Result<Option<NaiveDate>, ParseRecordErrorKind> {
    if is_missing(s) {
        return Ok(None);
    }

    let day = s.split([' ', 'T']).next().unwrap_or(s);
    NaiveDate::parse_from_str(day, DATE_FORMAT)
        .map(Some)
        .map_err(|_| ParseRecordErrorKind::InvalidDate(s.to_string()))
}

/// An error associated with parsing a sequence table.
#[derive(Debug)]
pub struct ParseRecordError {
    line: u64,
    kind: ParseRecordErrorKind,
}

impl ParseRecordError {
    /// Returns the line of the input on which the error occurred.
    pub fn line(&self) -> u64 {
        self.line
    }
}

impl fmt::Display for ParseRecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = self.line;

        match &self.kind {
            ParseRecordErrorKind::MissingColumn(name) => {
                write!(f, "missing required column '{name}' in header")
            }
            ParseRecordErrorKind::InvalidT(s) => {
                write!(f, "invalid day offset '{s}' on line {line}")
            }
            ParseRecordErrorKind::InvalidDate(s) => {
                write!(
                    f,
                    "invalid date '{s}' on line {line}, expected format YYYY-MM-DD"
                )
            }
        }
    }
}

impl std::error::Error for ParseRecordError {}

#[derive(Debug, Eq, PartialEq)]
enum ParseRecordErrorKind {
    MissingColumn(&'static str),
    InvalidT(String),
    InvalidDate(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(s: &str) -> io::Result<SequenceTable> {
        Builder::default().read(s.as_bytes())
    }

    #[test]
    fn test_read() {
        let table = read(
            "strain\tt\tdate\tsnvs\n\
            b\t2\t2021-01-03\tC241T A23403G\n\
            a\t0\t2021-01-01\t\n\
            c\tNA\tNA\tC241T\n",
        )
        .unwrap();

        assert_eq!(
            table.records(),
            [
                SequenceRecord::new(Some(0), NaiveDate::from_ymd_opt(2021, 1, 1), ""),
                SequenceRecord::new(
                    Some(2),
                    NaiveDate::from_ymd_opt(2021, 1, 3),
                    "C241T A23403G"
                ),
                SequenceRecord::new(None, None, "C241T"),
            ]
        );
    }

    #[test]
    fn test_read_csv_with_float_offsets_and_timestamps() {
        let table = Builder::default()
            .set_delimiter(b',')
            .read("snvs,t,date\nA1G,3.0,2021-02-01 00:00:00\n".as_bytes())
            .unwrap();

        assert_eq!(
            table.records(),
            [SequenceRecord::new(
                Some(3),
                NaiveDate::from_ymd_opt(2021, 2, 1),
                "A1G"
            )]
        );
    }

    #[test]
    fn test_read_without_date_column() {
        let table = read("t\tsnvs\n1\tA1G\n").unwrap();

        assert_eq!(table.min_date(), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_missing_t_column() {
        let e = read("date\tsnvs\n2021-01-01\t\n").unwrap_err();

        assert_eq!(e.kind(), io::ErrorKind::InvalidData);
        assert_eq!(e.to_string(), "missing required column 't' in header");
    }

    #[test]
    fn test_invalid_t() {
        let e = read("t\tsnvs\n0\t\n1.5\t\n").unwrap_err();

        assert_eq!(e.kind(), io::ErrorKind::InvalidData);
        assert_eq!(e.to_string(), "invalid day offset '1.5' on line 3");

        let source = e
            .get_ref()
            .and_then(|inner| inner.downcast_ref::<ParseRecordError>())
            .unwrap();
        assert_eq!(source.line(), 3);
    }

    #[test]
    fn test_invalid_date() {
        let result = read("t\tdate\tsnvs\n0\t01/02/2021\t\n");

        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_parse_t() {
        assert_eq!(parse_t("12"), Ok(Some(12)));
        assert_eq!(parse_t("-4"), Ok(Some(-4)));
        assert_eq!(parse_t("12.0"), Ok(Some(12)));
        assert_eq!(parse_t("nan"), Ok(None));
        assert_eq!(parse_t(""), Ok(None));
        assert!(parse_t("inf").is_err());
    }
}
