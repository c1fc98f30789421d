//! Writing aggregated results as delimited text.

use std::{fs, io, path::Path};

use super::ResultTable;

/// Column names, in order.
pub const HEADER: [&str; 10] = [
    "t",
    "t_sd",
    "phi",
    "sampleSize",
    "num_mut",
    "daysPerBin",
    "haplotypes",
    "n_mut_types",
    "binning",
    "date",
];

/// A builder to write a result table.
#[derive(Debug)]
pub struct Builder {
    delimiter: u8,
    precision: usize,
}

impl Builder {
    /// Set delimiter between fields.
    ///
    /// If unset, tab will be used.
    pub fn set_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set precision of floating point fields.
    ///
    /// If unset, a precision of six digits will be used.
    pub fn set_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Write result table to writer.
    ///
    /// Missing standard deviations and unsolvable estimates are written as `NaN`.
    pub fn write<W>(self, writer: W, table: &ResultTable) -> io::Result<()>
    where
        W: io::Write,
    {
        let precision = self.precision;
        let float = |x: f64| format!("{x:.precision$}");

        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(writer);

        writer.write_record(HEADER)?;

        for row in table.rows() {
            let attributes = &row.attributes;

            writer.write_record([
                attributes.t.to_string(),
                float(attributes.t_sd.unwrap_or(f64::NAN)),
                float(attributes.phi.to_f64()),
                attributes.sample_size.to_string(),
                attributes.num_mut.to_string(),
                attributes.days_per_bin.to_string(),
                attributes.haplotypes.to_string(),
                attributes.n_mut_types.to_string(),
                attributes.binning.to_string(),
                row.date.to_string(),
            ])?;
        }

        writer.flush()
    }

    /// Write result table to stdout.
    pub fn write_to_stdout(self, table: &ResultTable) -> io::Result<()> {
        self.write(io::stdout().lock(), table)
    }

    /// Write result table to path.
    ///
    /// If path already exists, it will be overwritten.
    pub fn write_to_path<P>(self, path: P, table: &ResultTable) -> io::Result<()>
    where
        P: AsRef<Path>,
    {
        self.write(io::BufWriter::new(fs::File::create(path)?), table)
    }

    /// Write result table to path or stdout.
    ///
    /// If the provided path is `None`, write to stdout.
    /// If path already exists, it will be overwritten.
    pub fn write_to_path_or_stdout<P>(self, path: Option<P>, table: &ResultTable) -> io::Result<()>
    where
        P: AsRef<Path>,
    {
        match path {
            Some(path) => self.write_to_path(path, table),
            None => self.write_to_stdout(table),
        }
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            delimiter: b'\t',
            precision: 6,
        }
    }
}
