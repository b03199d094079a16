//! Spatial discretization operators.
//!
//! [`TripleBandOp`] is the unit of discretization along one axis;
//! [`derivative`] builds first/second finite-difference operators from
//! mesher spacings; [`nine_point`] covers cross-derivative terms; the
//! [`PdeOperator`] trait is the seam between a concrete equation and the
//! time-stepping schemes, which are written once against it.

pub mod black_scholes;
pub mod derivative;
pub mod nine_point;
pub mod triple_band;

pub use black_scholes::{BlackScholesOp, Volatility};
pub use nine_point::{mixed_derivative, NinePointOp};
pub use triple_band::TripleBandOp;

use crate::core::FdmError;

/// Composite spatial operator for one pricing equation.
///
/// `set_time` re-evaluates coefficients for the sub-interval `[t1, t2]`;
/// everything else is the minimal surface a time-stepping scheme needs:
/// full and per-axis application, the mixed-derivative remainder, a
/// direction-restricted banded solve of `(s·L_axis + I) x = r`, and a
/// preconditioner for the Krylov-backed implicit steps.
pub trait PdeOperator {
    /// Spatial dimensionality of the equation.
    fn size(&self) -> usize;

    /// Recomputes coefficients for the time sub-interval `[t1, t2]`.
    fn set_time(&mut self, t1: f64, t2: f64) -> Result<(), FdmError>;

    /// Applies the full operator.
    fn apply(&self, r: &[f64]) -> Vec<f64>;

    /// Applies only the terms belonging to `direction`.
    fn apply_direction(&self, direction: usize, r: &[f64]) -> Vec<f64>;

    /// Applies only the mixed-derivative terms.
    fn apply_mixed(&self, r: &[f64]) -> Vec<f64>;

    /// Solves `(s·L_direction + I) x = r` along one axis.
    fn solve_splitting(&self, direction: usize, r: &[f64], s: f64)
        -> Result<Vec<f64>, FdmError>;

    /// Approximate inverse of `(s·L + I)` used by the Krylov solvers.
    fn preconditioner(&self, r: &[f64], s: f64) -> Result<Vec<f64>, FdmError>;
}
