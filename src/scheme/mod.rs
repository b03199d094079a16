//! Time-stepping schemes.
//!
//! Every scheme implements [`Evolver`]: it is handed a step size once and
//! then advances a value array backwards one step at a time. The operator
//! is shared behind `Rc<RefCell<..>>` because schemes rebuild its
//! coefficients per step, while boundary conditions are shared immutably
//! and patched in at the value level.
//!
//! The splitting family (Douglas, Craig-Sneyd, modified Craig-Sneyd,
//! Hundsdorfer) follows in 't Hout and Welfert (2007); TR-BDF2 and the
//! method of lines round out the stiff and adaptive ends.

pub mod craig_sneyd;
pub mod crank_nicolson;
pub mod douglas;
pub mod explicit_euler;
pub mod hundsdorfer;
pub mod implicit_euler;
pub mod method_of_lines;
pub mod trbdf2;

pub use craig_sneyd::{CraigSneydScheme, ModifiedCraigSneydScheme};
pub use crank_nicolson::CrankNicolsonScheme;
pub use douglas::DouglasScheme;
pub use explicit_euler::ExplicitEulerScheme;
pub use hundsdorfer::HundsdorferScheme;
pub use implicit_euler::ImplicitEulerScheme;
pub use method_of_lines::MethodOfLinesScheme;
pub use trbdf2::TrBdf2Scheme;

use std::cell::RefCell;
use std::rc::Rc;

use crate::boundary::BoundaryConditionSet;
use crate::core::FdmError;
use crate::operator::PdeOperator;

/// Shared handle to the spatial operator.
pub type OperatorRef = Rc<RefCell<dyn PdeOperator>>;

/// Shared handle to the boundary conditions.
pub type BoundarySetRef = Rc<BoundaryConditionSet>;

/// Backward time stepper over a value array.
pub trait Evolver {
    /// Fixes the step size used by subsequent [`step`](Evolver::step)
    /// calls.
    fn set_step(&mut self, dt: f64);

    /// Advances `a` from time `t` to `t - dt`.
    fn step(&mut self, a: &mut Vec<f64>, t: f64) -> Result<(), FdmError>;
}

impl Evolver for Box<dyn Evolver> {
    fn set_step(&mut self, dt: f64) {
        self.as_mut().set_step(dt);
    }

    fn step(&mut self, a: &mut Vec<f64>, t: f64) -> Result<(), FdmError> {
        self.as_mut().step(a, t)
    }
}

/// Scheme family selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SchemeKind {
    /// Forward Euler; conditionally stable.
    ExplicitEuler,
    /// Backward Euler; direct tridiagonal solve in one dimension, Krylov
    /// iteration otherwise.
    ImplicitEuler,
    /// Theta blend of the explicit and implicit Euler sub-steps.
    CrankNicolson,
    /// First-order ADI splitting.
    Douglas,
    /// ADI with an explicit mixed-derivative corrector stage.
    CraigSneyd,
    /// Craig-Sneyd with the full-operator correction term.
    ModifiedCraigSneyd,
    /// ADI with a full second corrector pass.
    Hundsdorfer,
    /// Adaptive Runge-Kutta on the semi-discretized system.
    MethodOfLines,
    /// Trapezoidal step followed by a BDF2 step, L-stable.
    TrBdf2,
}

/// Krylov solver used by the multi-dimensional implicit stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KrylovKind {
    /// Stabilized bi-conjugate gradients.
    BiCgStab,
    /// Restarted GMRES.
    Gmres,
}

/// Scheme family plus its tuning parameters.
///
/// For the splitting family `theta` weighs the implicit legs and `mu`
/// the corrector stage; for the method of lines the two slots carry the
/// local error tolerance and the relative initial step instead.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemeDesc {
    /// Scheme family.
    pub kind: SchemeKind,
    /// Implicitness weight (or ODE error tolerance).
    pub theta: f64,
    /// Corrector weight (or ODE relative initial step).
    pub mu: f64,
    /// Krylov solver for multi-dimensional implicit stages.
    pub krylov: KrylovKind,
}

impl SchemeDesc {
    fn plain(kind: SchemeKind, theta: f64, mu: f64) -> Self {
        Self {
            kind,
            theta,
            mu,
            krylov: KrylovKind::BiCgStab,
        }
    }

    /// Forward Euler.
    pub fn explicit_euler() -> Self {
        Self::plain(SchemeKind::ExplicitEuler, 0.0, 0.0)
    }

    /// Backward Euler.
    pub fn implicit_euler() -> Self {
        Self::plain(SchemeKind::ImplicitEuler, 0.0, 0.0)
    }

    /// Crank-Nicolson with equal explicit/implicit weights.
    pub fn crank_nicolson() -> Self {
        Self::plain(SchemeKind::CrankNicolson, 0.5, 0.0)
    }

    /// Douglas splitting, `theta = 1/2`.
    pub fn douglas() -> Self {
        Self::plain(SchemeKind::Douglas, 0.5, 0.0)
    }

    /// Craig-Sneyd, `theta = 1/2`, `mu = 1/2`.
    pub fn craig_sneyd() -> Self {
        Self::plain(SchemeKind::CraigSneyd, 0.5, 0.5)
    }

    /// Modified Craig-Sneyd, `theta = mu = 1/3`.
    pub fn modified_craig_sneyd() -> Self {
        Self::plain(SchemeKind::ModifiedCraigSneyd, 1.0 / 3.0, 1.0 / 3.0)
    }

    /// Hundsdorfer-Verwer, `theta = 1/2 + sqrt(3)/6`.
    pub fn hundsdorfer() -> Self {
        Self::plain(SchemeKind::Hundsdorfer, 0.5 + 3.0_f64.sqrt() / 6.0, 0.5)
    }

    /// Hundsdorfer-Verwer variant with `theta = 1 - sqrt(2)/2`.
    pub fn modified_hundsdorfer() -> Self {
        Self::plain(SchemeKind::Hundsdorfer, 1.0 - 0.5 * 2.0_f64.sqrt(), 0.5)
    }

    /// Method of lines with default tolerance `0.001` and relative
    /// initial step `0.01`.
    pub fn method_of_lines() -> Self {
        Self::plain(SchemeKind::MethodOfLines, 0.001, 0.01)
    }

    /// TR-BDF2.
    pub fn trbdf2() -> Self {
        Self::plain(SchemeKind::TrBdf2, 0.0, 0.0)
    }

    /// Switches the Krylov stages to restarted GMRES.
    pub fn with_gmres(mut self) -> Self {
        self.krylov = KrylovKind::Gmres;
        self
    }
}

/// Steps must not cross below t = 0 by more than rounding noise.
pub(crate) fn check_step(t: f64, dt: f64) -> Result<(), FdmError> {
    if t - dt < -1.0e-8 {
        return Err(FdmError::InvalidInput(format!(
            "step from t={t} by dt={dt} crosses below time zero"
        )));
    }
    Ok(())
}
