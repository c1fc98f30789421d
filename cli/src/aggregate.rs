use std::{num::NonZeroUsize, path::PathBuf};

use anyhow::{Context, Error};

use clap::{CommandFactory, Parser};
use phi_core::{aggregate::write, sequence::read, Aggregator, Input};

use crate::Method;

/// Estimate φ over binnings of a sequence table.
#[derive(Debug, Parser)]
pub struct Aggregate {
    /// Input sequence table.
    ///
    /// The table can be provided here or read from stdin, optionally gzip-compressed. It must have
    /// a header with columns 't' (day offset), 'date' (YYYY-MM-DD) and 'snvs' (space-separated
    /// mutations, empty for the reference). Other columns are ignored.
    #[arg(value_name = "PATH")]
    input: Option<PathBuf>,

    /// Widths in days of fixed-width binnings.
    ///
    /// Each width gives a binning of consecutive windows spanning that many days.
    /// Use comma to separate widths.
    #[arg(
        short = 'w',
        long,
        use_value_delimiter = true,
        value_delimiter = ',',
        required_unless_present = "sizes",
        value_name = "INT,..."
    )]
    widths: Vec<NonZeroUsize>,

    /// Sizes of fixed-size binnings.
    ///
    /// Each size gives a binning of consecutive windows containing that many sequences, grown to
    /// a whole day when all sequences fall on one day. Use comma to separate sizes.
    #[arg(
        short = 's',
        long,
        use_value_delimiter = true,
        value_delimiter = ',',
        required_unless_present = "widths",
        value_name = "INT,..."
    )]
    sizes: Vec<NonZeroUsize>,

    /// Delimiter between fields in the input table.
    #[arg(short = 'd', long, default_value = "\t", value_name = "CHAR")]
    delimiter: char,

    /// Delimiter between fields in the output table.
    #[arg(short = 'D', long, default_value = "\t", value_name = "CHAR")]
    output_delimiter: char,

    /// Precision to use when printing floating point fields.
    #[arg(short = 'p', long, default_value_t = 6, value_name = "INT")]
    precision: usize,

    /// Output path.
    ///
    /// If no path is given, the result will be output to stdout.
    #[arg(short = 'o', long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Minimisation method used to estimate φ.
    #[arg(short = 'm', long, value_enum, default_value = "nelder-mead")]
    method: Method,

    /// Keep bins where φ could not be estimated.
    ///
    /// By default, such bins are dropped from the output. If kept, φ is written as NaN.
    #[arg(long)]
    keep_unsolvable: bool,
}

fn delimiter_byte(delimiter: char) -> Result<u8, clap::Error> {
    u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| {
            Aggregate::command().error(
                clap::error::ErrorKind::ValueValidation,
                format!("delimiter must be a single ASCII character (found '{delimiter}')"),
            )
        })
}

impl Aggregate {
    pub fn run(self) -> Result<(), Error> {
        let delimiter = delimiter_byte(self.delimiter)?;
        let output_delimiter = delimiter_byte(self.output_delimiter)?;

        let input = Input::new(self.input)?;
        let table = read::Builder::default()
            .set_delimiter(delimiter)
            .read_from_input(&input)
            .with_context(|| match input.as_path() {
                Some(path) => format!(
                    "Failed to read sequence table from provided path '{}'",
                    path.display()
                ),
                None => String::from("Failed to read sequence table from stdin"),
            })?;
        log::info!("Read {} sequences.", table.len());

        let result = Aggregator::default()
            .set_widths(self.widths)
            .set_sizes(self.sizes)
            .set_method(self.method.into())
            .set_keep_unsolvable(self.keep_unsolvable)
            .run(&table)?;
        log::info!("Estimated phi for {} bins.", result.len());

        write::Builder::default()
            .set_delimiter(output_delimiter)
            .set_precision(self.precision)
            .write_to_path_or_stdout(self.output, &result)?;

        Ok(())
    }
}
