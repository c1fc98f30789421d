//! Estimation of the dispersion parameter φ.
//!
//! For a bin with `h` distinct haplotypes and `m` mutated sequences per day, φ is the solution
//! `x > 0` of
//!
//! ```text
//! h = x · ln(1 + m / x)
//! ```
//!
//! which is found by minimising the squared residual from `x = 1`. The right hand side increases
//! monotonically from zero towards `m` as `x` grows, so a solution exists exactly when `h < m`.
//!
//! # Example
//!
//! ```
//! use phi_core::estimate::{estimate, PhiEstimate};
//!
//! assert_eq!(estimate(3.0, 0.0), PhiEstimate::Degenerate);
//! assert!(!estimate(8.0, 3.0).is_solvable());
//!
//! let phi = estimate(0.2, 0.5).value().expect("solvable");
//! assert!((0.2 - phi * (1.0 + 0.5 / phi).ln()).abs() < 1e-6);
//! ```

use std::fmt;

pub mod simplex;
pub use simplex::Options;

/// Starting point of the minimisation.
const X0: f64 = 1.0;

/// The outcome of estimating φ for a single bin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PhiEstimate {
    /// No haplotypes or no mutations, which we take to mean no dispersion.
    Degenerate,
    /// No estimate could be found.
    Unsolvable(Unsolvable),
    /// A solution.
    Value(f64),
}

impl PhiEstimate {
    /// Returns true if the estimate is not [`PhiEstimate::Unsolvable`].
    pub fn is_solvable(&self) -> bool {
        !matches!(self, PhiEstimate::Unsolvable(_))
    }

    /// Collapses the estimate to a float.
    ///
    /// Degenerate estimates become zero, unsolvable estimates become nan.
    pub fn to_f64(self) -> f64 {
        match self {
            PhiEstimate::Degenerate => 0.0,
            PhiEstimate::Unsolvable(_) => f64::NAN,
            PhiEstimate::Value(x) => x,
        }
    }

    /// Returns the estimate if solvable, collapsing degenerate estimates to zero.
    pub fn value(&self) -> Option<f64> {
        self.is_solvable().then(|| self.to_f64())
    }
}

impl fmt::Display for PhiEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhiEstimate::Degenerate => f.write_str("degenerate"),
            PhiEstimate::Unsolvable(reason) => write!(f, "unsolvable ({reason})"),
            PhiEstimate::Value(x) => write!(f, "{x}"),
        }
    }
}

/// The reason an estimate could not be found.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Unsolvable {
    /// The haplotype rate is not below the mutation rate, so no solution exists.
    NotEvaluable,
    /// The minimiser did not find a feasible minimum.
    NoConvergence,
}

impl fmt::Display for Unsolvable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unsolvable::NotEvaluable => f.write_str("haplotype rate not below mutation rate"),
            Unsolvable::NoConvergence => f.write_str("minimisation did not converge"),
        }
    }
}

/// A minimisation method.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Method {
    /// Downhill simplex directly on φ.
    #[default]
    NelderMead,
    /// Downhill simplex on ln φ, such that every evaluation satisfies φ > 0.
    Constrained,
}

/// An estimator of φ.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PhiEstimator {
    method: Method,
    options: Options,
}

impl PhiEstimator {
    /// Creates a new estimator.
    pub fn new(method: Method, options: Options) -> Self {
        Self { method, options }
    }

    /// Returns the method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// Estimates φ from haplotype and mutation rates, both normalised per day.
    pub fn estimate(&self, haplotype_rate: f64, mutation_rate: f64) -> PhiEstimate {
        if haplotype_rate == 0.0 || mutation_rate == 0.0 {
            PhiEstimate::Degenerate
        } else if haplotype_rate >= mutation_rate {
            PhiEstimate::Unsolvable(Unsolvable::NotEvaluable)
        } else {
            self.minimize(haplotype_rate, mutation_rate)
        }
    }

    fn minimize(&self, haplotype_rate: f64, mutation_rate: f64) -> PhiEstimate {
        let f = |x| objective(x, haplotype_rate, mutation_rate);

        let (x, minimum) = match self.method {
            Method::NelderMead => {
                let minimum = simplex::minimize(f, X0, &self.options);
                (minimum.x, minimum)
            }
            Method::Constrained => {
                let minimum = simplex::minimize(|u: f64| f(u.exp()), X0.ln(), &self.options);
                (minimum.x.exp(), minimum)
            }
        };

        if minimum.converged && minimum.value.is_finite() && x.is_finite() && x > 0.0 {
            PhiEstimate::Value(x)
        } else {
            log::debug!(
                "Minimisation failed for haplotype rate {haplotype_rate} and mutation rate \
                {mutation_rate} after {} iterations.",
                minimum.iterations
            );
            PhiEstimate::Unsolvable(Unsolvable::NoConvergence)
        }
    }

    /// Sets the method.
    pub fn set_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the minimiser options.
    pub fn set_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }
}

/// Estimates φ using the default estimator.
///
/// See [`PhiEstimator::estimate`].
pub fn estimate(haplotype_rate: f64, mutation_rate: f64) -> PhiEstimate {
    PhiEstimator::default().estimate(haplotype_rate, mutation_rate)
}

/// The squared residual minimised to find φ.
pub fn objective(x: f64, haplotype_rate: f64, mutation_rate: f64) -> f64 {
    (haplotype_rate - x * (mutation_rate / x).ln_1p()).powi(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn residual(x: f64, haplotype_rate: f64, mutation_rate: f64) -> f64 {
        objective(x, haplotype_rate, mutation_rate).sqrt()
    }

    fn assert_solves(estimator: PhiEstimator, haplotype_rate: f64, mutation_rate: f64) {
        match estimator.estimate(haplotype_rate, mutation_rate) {
            PhiEstimate::Value(x) => {
                assert!(x > 0.0);
                assert_approx_eq!(residual(x, haplotype_rate, mutation_rate), 0.0, epsilon = 1e-6);
            }
            estimate => panic!("expected solution, found {estimate}"),
        }
    }

    #[test]
    fn test_zero_rates_are_degenerate() {
        assert_eq!(estimate(0.0, 0.5), PhiEstimate::Degenerate);
        assert_eq!(estimate(3.0, 0.0), PhiEstimate::Degenerate);
        assert_eq!(estimate(0.0, 0.0), PhiEstimate::Degenerate);
        assert_eq!(estimate(3.0, 0.0).to_f64(), 0.0);
    }

    #[test]
    fn test_haplotype_rate_not_below_mutation_rate_is_unsolvable() {
        for (h, m) in [(8.0, 3.0), (1.0, 1.0), (0.5, 0.49), (100.0, 1e-3)] {
            let estimate = estimate(h, m);
            assert_eq!(estimate, PhiEstimate::Unsolvable(Unsolvable::NotEvaluable));
            assert!(estimate.to_f64().is_nan());
            assert_eq!(estimate.value(), None);
        }
    }

    #[test]
    fn test_nelder_mead_solves() {
        let estimator = PhiEstimator::default();

        for (h, m) in [(0.2, 0.5), (1.0, 10.0), (0.01, 5.0), (0.9, 1.0), (3.0, 3.5)] {
            assert_solves(estimator, h, m);
        }
    }

    #[test]
    fn test_constrained_solves() {
        let estimator = PhiEstimator::default().set_method(Method::Constrained);

        for (h, m) in [(0.2, 0.5), (1.0, 10.0), (0.01, 5.0), (0.9, 1.0), (3.0, 3.5)] {
            assert_solves(estimator, h, m);
        }
    }

    #[test]
    fn test_methods_agree() {
        let nelder_mead = estimate(0.2, 0.5).to_f64();
        let constrained = PhiEstimator::default()
            .set_method(Method::Constrained)
            .estimate(0.2, 0.5)
            .to_f64();

        assert_approx_eq!(nelder_mead, constrained, epsilon = 1e-6);
        assert_approx_eq!(nelder_mead, 0.1236, epsilon = 1e-3);
    }

    #[test]
    fn test_iteration_limit_is_unsolvable() {
        let options = Options {
            max_iterations: 2,
            ..Options::default()
        };
        let estimator = PhiEstimator::default().set_options(options);

        assert_eq!(
            estimator.estimate(0.2, 0.5),
            PhiEstimate::Unsolvable(Unsolvable::NoConvergence)
        );
    }

    #[test]
    fn test_value_collapses_degenerate_to_zero() {
        assert_eq!(PhiEstimate::Degenerate.value(), Some(0.0));
        assert_eq!(PhiEstimate::Value(1.5).value(), Some(1.5));
    }
}
