//! One-dimensional downhill simplex minimisation.
//!
//! In one dimension the simplex is a pair of vertices, and the centroid of all vertices but the
//! worst is simply the best vertex. The coefficients are the usual Nelder-Mead ones.

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Relative size of the initial simplex step.
const STEP: f64 = 0.05;
/// Initial simplex step when starting from zero.
const ZERO_STEP: f64 = 0.00025;

/// Stopping criteria for the simplex.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Options {
    /// Tolerance on the distance between vertices, scaled by `1 + |x|` of the best vertex.
    pub x_tolerance: f64,
    /// Tolerance on the difference between objective values at the vertices.
    pub f_tolerance: f64,
    /// Maximum number of simplex iterations.
    pub max_iterations: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            x_tolerance: 1e-10,
            f_tolerance: 1e-14,
            max_iterations: 1000,
        }
    }
}

/// The outcome of a minimisation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Minimum {
    /// Location of the best vertex.
    pub x: f64,
    /// Objective value at the best vertex.
    ///
    /// Non-finite if the objective was never finite at any visited point.
    pub value: f64,
    /// Number of iterations used.
    pub iterations: usize,
    /// Whether the stopping criteria were met before the iteration limit.
    pub converged: bool,
}

#[derive(Clone, Copy, Debug)]
struct Vertex {
    x: f64,
    value: f64,
}

impl Vertex {
    fn new<F>(x: f64, f: &F) -> Self
    where
        F: Fn(f64) -> f64,
    {
        // Outside the domain of the objective we get nan, which should simply lose every comparison
        let value = match f(x) {
            v if v.is_nan() => f64::INFINITY,
            v => v,
        };

        Self { x, value }
    }
}

#[derive(Clone, Copy, Debug)]
struct Simplex {
    best: Vertex,
    worst: Vertex,
}

impl Simplex {
    fn new(a: Vertex, b: Vertex) -> Self {
        let mut simplex = Self { best: a, worst: b };
        simplex.order();
        simplex
    }

    fn has_converged(&self, options: &Options) -> bool {
        let Self { best, worst } = self;

        (worst.x - best.x).abs() <= options.x_tolerance * (1.0 + best.x.abs())
            && (worst.value - best.value).abs() <= options.f_tolerance
    }

    fn into_minimum(self, iterations: usize, converged: bool) -> Minimum {
        Minimum {
            x: self.best.x,
            value: self.best.value,
            iterations,
            converged,
        }
    }

    fn order(&mut self) {
        if self.worst.value < self.best.value {
            std::mem::swap(&mut self.best, &mut self.worst);
        }
    }

    fn point<F>(&self, coefficient: f64, f: &F) -> Vertex
    where
        F: Fn(f64) -> f64,
    {
        let centroid = self.best.x;
        Vertex::new(centroid + coefficient * (centroid - self.worst.x), f)
    }

    fn shrink<F>(&mut self, f: &F)
    where
        F: Fn(f64) -> f64,
    {
        let x = self.best.x + SHRINK * (self.worst.x - self.best.x);
        self.worst = Vertex::new(x, f);
    }

    fn step<F>(&mut self, f: &F)
    where
        F: Fn(f64) -> f64,
    {
        let reflected = self.point(REFLECTION, f);

        if reflected.value < self.best.value {
            let expanded = self.point(REFLECTION * EXPANSION, f);
            self.worst = if expanded.value < reflected.value {
                expanded
            } else {
                reflected
            };
        } else if reflected.value < self.worst.value {
            let contracted = self.point(REFLECTION * CONTRACTION, f);
            if contracted.value <= reflected.value {
                self.worst = contracted;
            } else {
                self.shrink(f);
            }
        } else {
            let contracted = self.point(-CONTRACTION, f);
            if contracted.value < self.worst.value {
                self.worst = contracted;
            } else {
                self.shrink(f);
            }
        }

        self.order();
    }
}

/// Minimises `f` starting from `x0`.
pub fn minimize<F>(f: F, x0: f64, options: &Options) -> Minimum
where
    F: Fn(f64) -> f64,
{
    let step = if x0 != 0.0 { STEP * x0 } else { ZERO_STEP };
    let mut simplex = Simplex::new(Vertex::new(x0, &f), Vertex::new(x0 + step, &f));

    let mut iterations = 0;
    while iterations < options.max_iterations {
        if simplex.has_converged(options) {
            return simplex.into_minimum(iterations, true);
        }

        simplex.step(&f);
        iterations += 1;
    }

    let converged = simplex.has_converged(options);
    simplex.into_minimum(iterations, converged)
}
