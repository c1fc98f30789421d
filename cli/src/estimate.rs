use anyhow::Error;

use clap::{CommandFactory, Parser};
use phi_core::PhiEstimator;

use crate::Method;

/// Estimate φ from haplotype and mutation rates.
///
/// Prints 0 when either rate is zero, and NaN when no estimate exists.
#[derive(Debug, Parser)]
pub struct Estimate {
    /// Number of distinct haplotypes per day.
    #[arg(value_name = "HAPLOTYPE_RATE")]
    haplotype_rate: f64,

    /// Number of mutated sequences per day.
    #[arg(value_name = "MUTATION_RATE")]
    mutation_rate: f64,

    /// Precision to use when printing φ.
    #[arg(short = 'p', long, default_value_t = 6, value_name = "INT")]
    precision: usize,

    /// Minimisation method used to estimate φ.
    #[arg(short = 'm', long, value_enum, default_value = "nelder-mead")]
    method: Method,
}

impl Estimate {
    pub fn run(self) -> Result<(), Error> {
        for (name, rate) in [
            ("haplotype", self.haplotype_rate),
            ("mutation", self.mutation_rate),
        ] {
            if !(rate.is_finite() && rate >= 0.0) {
                return Err(Estimate::command()
                    .error(
                        clap::error::ErrorKind::ValueValidation,
                        format!("{name} rate must be finite and non-negative (found {rate})"),
                    )
                    .into());
            }
        }

        let estimate = PhiEstimator::default()
            .set_method(self.method.into())
            .estimate(self.haplotype_rate, self.mutation_rate);
        log::info!("Estimate: {estimate}.");

        println!(
            "{phi:.precision$}",
            phi = estimate.to_f64(),
            precision = self.precision
        );

        Ok(())
    }
}
