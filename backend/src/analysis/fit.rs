//! Curve fitting and scalar minimization
//!
//! The analysis layer never commits to one optimizer: fitting goes
//! through the [`CurveFitter`] and [`Minimizer`] traits so callers can
//! substitute their own. The defaults here are Gauss–Newton least
//! squares with a forward-difference Jacobian, and golden-section search
//! over an expanded bracket.
//!
//! # Example
//!
//! ```
//! use traffic_simulator_core_rs::analysis::fit::{
//!     CurveFitter, LeastSquaresFitter, Polynomial,
//! };
//!
//! let x = [0.0, 1.0, 2.0, 3.0];
//! let y = [1.0, 3.0, 5.0, 7.0]; // y = 1 + 2x
//! let params = LeastSquaresFitter::default()
//!     .fit(&Polynomial::new(1), &x, &y)
//!     .unwrap();
//! assert!((params[0] - 1.0).abs() < 1e-8);
//! assert!((params[1] - 2.0).abs() < 1e-8);
//! ```

use thiserror::Error;

/// Errors from fitting or minimization
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FitError {
    /// Fewer points than model parameters
    #[error("{points} data points cannot determine {parameters} parameters")]
    InsufficientData { points: usize, parameters: usize },

    /// x and y series differ in length
    #[error("x has {x_len} values but y has {y_len}")]
    MismatchedSeries { x_len: usize, y_len: usize },

    /// Normal equations were singular at some iterate
    #[error("normal equations are singular; the model is degenerate on this data")]
    SingularSystem,

    /// Iteration budget exhausted before the step tolerance was met
    #[error("no convergence after {iterations} iterations")]
    NoConvergence { iterations: usize },

    /// The objective showed no enclosed minimum near the initial guess
    #[error("failed to bracket a minimum around the initial guess")]
    NoBracket,
}

// ============================================================================
// Traits
// ============================================================================

/// A parametric scalar model `y = f(x; params)`
pub trait CurveModel {
    /// Number of parameters the model takes
    fn parameter_count(&self) -> usize;

    /// Evaluate the model at `x`; `params` has `parameter_count()` entries
    fn eval(&self, x: f64, params: &[f64]) -> f64;
}

/// Least-squares fitting of a [`CurveModel`] to a data series
pub trait CurveFitter {
    /// Fit `model` to `(x, y)` and return the parameter vector
    fn fit(&self, model: &dyn CurveModel, x: &[f64], y: &[f64]) -> Result<Vec<f64>, FitError>;
}

/// Scalar minimization from an initial guess
///
/// Maximization is the caller negating the objective.
pub trait Minimizer {
    /// Return the argument minimizing `objective` near `initial_guess`
    fn minimize(&self, objective: &dyn Fn(f64) -> f64, initial_guess: f64)
        -> Result<f64, FitError>;
}

// ============================================================================
// Models
// ============================================================================

/// Polynomial of fixed degree with coefficients in ascending order
///
/// `params[j]` multiplies `x^j`; a degree of 1 is an affine line whose
/// slope is `params[1]`.
///
/// # Example
/// ```
/// use traffic_simulator_core_rs::analysis::fit::{CurveModel, Polynomial};
///
/// let line = Polynomial::new(1);
/// assert_eq!(line.parameter_count(), 2);
/// assert_eq!(line.eval(3.0, &[1.0, 2.0]), 7.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Polynomial {
    degree: usize,
}

impl Polynomial {
    /// Polynomial of the given degree (`degree + 1` coefficients)
    pub fn new(degree: usize) -> Self {
        Self { degree }
    }
}

impl CurveModel for Polynomial {
    fn parameter_count(&self) -> usize {
        self.degree + 1
    }

    fn eval(&self, x: f64, params: &[f64]) -> f64 {
        // Horner evaluation, highest coefficient first
        params.iter().rev().fold(0.0, |acc, &c| acc * x + c)
    }
}

// ============================================================================
// Default fitter
// ============================================================================

/// Gauss–Newton least squares with a forward-difference Jacobian
///
/// Models that are linear in their parameters (polynomials included)
/// land on the solution in the first step; the iteration budget only
/// matters for genuinely nonlinear models.
///
/// High-degree polynomials over wide x ranges make the normal equations
/// badly conditioned; rescale x toward `[0, 1]` before fitting those.
#[derive(Debug, Clone, Copy)]
pub struct LeastSquaresFitter {
    /// Iteration budget for nonlinear models
    max_iterations: usize,
    /// Relative step-norm threshold that counts as converged
    tolerance: f64,
}

impl Default for LeastSquaresFitter {
    fn default() -> Self {
        Self {
            max_iterations: 40,
            tolerance: 1e-10,
        }
    }
}

impl LeastSquaresFitter {
    /// Create a fitter with an explicit iteration budget and tolerance
    pub fn new(max_iterations: usize, tolerance: f64) -> Self {
        assert!(max_iterations > 0, "iteration budget must be positive");
        assert!(tolerance > 0.0, "tolerance must be positive");
        Self {
            max_iterations,
            tolerance,
        }
    }
}

impl CurveFitter for LeastSquaresFitter {
    fn fit(&self, model: &dyn CurveModel, x: &[f64], y: &[f64]) -> Result<Vec<f64>, FitError> {
        if x.len() != y.len() {
            return Err(FitError::MismatchedSeries {
                x_len: x.len(),
                y_len: y.len(),
            });
        }
        let parameters = model.parameter_count();
        if x.len() < parameters {
            return Err(FitError::InsufficientData {
                points: x.len(),
                parameters,
            });
        }

        let mut params = vec![0.0; parameters];
        for _ in 0..self.max_iterations {
            let step = gauss_newton_step(model, x, y, &params)?;
            let step_norm = norm(&step);
            for (p, s) in params.iter_mut().zip(&step) {
                *p += s;
            }
            if step_norm <= self.tolerance * (1.0 + norm(&params)) {
                return Ok(params);
            }
        }
        Err(FitError::NoConvergence {
            iterations: self.max_iterations,
        })
    }
}

fn norm(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum::<f64>().sqrt()
}

/// One Gauss–Newton step: solve `(J^T J) d = J^T r` for the update `d`
fn gauss_newton_step(
    model: &dyn CurveModel,
    x: &[f64],
    y: &[f64],
    params: &[f64],
) -> Result<Vec<f64>, FitError> {
    let n = params.len();
    let mut jtj = vec![0.0; n * n];
    let mut jtr = vec![0.0; n];
    let mut gradient = vec![0.0; n];
    let mut perturbed = params.to_vec();

    for (&xi, &yi) in x.iter().zip(y) {
        let fi = model.eval(xi, params);
        let residual = yi - fi;

        for j in 0..n {
            let h = 1e-8 * params[j].abs().max(1.0);
            perturbed[j] = params[j] + h;
            gradient[j] = (model.eval(xi, &perturbed) - fi) / h;
            perturbed[j] = params[j];
        }

        for j in 0..n {
            jtr[j] += gradient[j] * residual;
            for l in 0..n {
                jtj[j * n + l] += gradient[j] * gradient[l];
            }
        }
    }

    solve_linear(jtj, jtr)
}

/// Solve `a x = b` by Gaussian elimination with partial pivoting
///
/// `a` is row-major `n x n`; both buffers are consumed.
fn solve_linear(mut a: Vec<f64>, mut b: Vec<f64>) -> Result<Vec<f64>, FitError> {
    let n = b.len();
    let scale = a.iter().fold(0.0_f64, |acc, &v| acc.max(v.abs()));
    if scale == 0.0 {
        return Err(FitError::SingularSystem);
    }
    let threshold = scale * 1e-14;

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&r, &s| a[r * n + col].abs().total_cmp(&a[s * n + col].abs()))
            .unwrap_or(col);
        if a[pivot * n + col].abs() <= threshold {
            return Err(FitError::SingularSystem);
        }
        if pivot != col {
            for j in 0..n {
                a.swap(col * n + j, pivot * n + j);
            }
            b.swap(col, pivot);
        }

        for row in (col + 1)..n {
            let factor = a[row * n + col] / a[col * n + col];
            if factor == 0.0 {
                continue;
            }
            for j in col..n {
                a[row * n + j] -= factor * a[col * n + j];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut solution = vec![0.0; n];
    for row in (0..n).rev() {
        let mut acc = b[row];
        for j in (row + 1)..n {
            acc -= a[row * n + j] * solution[j];
        }
        solution[row] = acc / a[row * n + row];
    }
    Ok(solution)
}

// ============================================================================
// Default minimizer
// ============================================================================

/// Golden-section search over a bracketed minimum
///
/// The bracket comes from downhill expansion around the initial guess;
/// the section search then contracts it below the tolerance.
///
/// # Example
/// ```
/// use traffic_simulator_core_rs::analysis::fit::{GoldenSectionMinimizer, Minimizer};
///
/// let argmin = GoldenSectionMinimizer::default()
///     .minimize(&|x| (x - 3.0) * (x - 3.0), 0.0)
///     .unwrap();
/// assert!((argmin - 3.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct GoldenSectionMinimizer {
    /// Relative bracket width that counts as converged
    tolerance: f64,
    /// Expansion budget while hunting for the bracket
    max_expansions: usize,
}

impl Default for GoldenSectionMinimizer {
    fn default() -> Self {
        Self {
            tolerance: 1e-8,
            max_expansions: 60,
        }
    }
}

impl GoldenSectionMinimizer {
    /// Create a minimizer with an explicit tolerance and expansion budget
    pub fn new(tolerance: f64, max_expansions: usize) -> Self {
        assert!(tolerance > 0.0, "tolerance must be positive");
        assert!(max_expansions > 0, "expansion budget must be positive");
        Self {
            tolerance,
            max_expansions,
        }
    }

    /// Expand downhill from the guess until a minimum is enclosed
    fn bracket(
        &self,
        objective: &dyn Fn(f64) -> f64,
        guess: f64,
    ) -> Result<(f64, f64), FitError> {
        let mut step = 1.0_f64.max(guess.abs() * 0.1);
        let mut a = guess;
        let mut fa = objective(a);
        let mut b = guess + step;
        let mut fb = objective(b);

        // Orient the walk downhill
        if fb > fa {
            std::mem::swap(&mut a, &mut b);
            std::mem::swap(&mut fa, &mut fb);
            step = -step;
        }

        for _ in 0..self.max_expansions {
            step *= 2.0;
            let c = b + step;
            let fc = objective(c);
            if fc >= fb {
                return Ok((a.min(c), a.max(c)));
            }
            a = b;
            b = c;
            fb = fc;
        }
        Err(FitError::NoBracket)
    }
}

impl Minimizer for GoldenSectionMinimizer {
    fn minimize(
        &self,
        objective: &dyn Fn(f64) -> f64,
        initial_guess: f64,
    ) -> Result<f64, FitError> {
        let (mut low, mut high) = self.bracket(objective, initial_guess)?;

        // (sqrt(5) - 1) / 2
        const INV_PHI: f64 = 0.618_033_988_749_894_8;

        let mut mid_low = high - INV_PHI * (high - low);
        let mut mid_high = low + INV_PHI * (high - low);
        let mut f_mid_low = objective(mid_low);
        let mut f_mid_high = objective(mid_high);

        while high - low > self.tolerance * (1.0 + low.abs() + high.abs()) {
            if f_mid_low <= f_mid_high {
                high = mid_high;
                mid_high = mid_low;
                f_mid_high = f_mid_low;
                mid_low = high - INV_PHI * (high - low);
                f_mid_low = objective(mid_low);
            } else {
                low = mid_low;
                mid_low = mid_high;
                f_mid_low = f_mid_high;
                mid_high = low + INV_PHI * (high - low);
                f_mid_high = objective(mid_high);
            }
        }
        Ok(0.5 * (low + high))
    }
}
