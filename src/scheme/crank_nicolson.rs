//! Crank-Nicolson as a theta blend of the Euler legs.

use crate::core::FdmError;
use crate::scheme::{
    BoundarySetRef, Evolver, ExplicitEulerScheme, ImplicitEulerScheme, KrylovKind, OperatorRef,
};

/// Takes an explicit leg of weight `1 - theta` followed by an implicit leg
/// of weight `theta` over the same interval; `theta = 1/2` is the classic
/// second-order scheme, `theta = 1` collapses to backward Euler.
pub struct CrankNicolsonScheme {
    theta: f64,
    explicit: ExplicitEulerScheme,
    implicit: ImplicitEulerScheme,
}

impl CrankNicolsonScheme {
    /// Blended scheme with implicit weight `theta` in `[0, 1]`.
    pub fn new(theta: f64, map: OperatorRef, bc: BoundarySetRef) -> Result<Self, FdmError> {
        if !(0.0..=1.0).contains(&theta) {
            return Err(FdmError::InvalidInput(format!(
                "crank-nicolson theta {theta} outside [0, 1]"
            )));
        }
        Ok(Self {
            theta,
            explicit: ExplicitEulerScheme::new(map.clone(), bc.clone()),
            implicit: ImplicitEulerScheme::new(map, bc),
        })
    }

    /// Selects the Krylov solver for the implicit leg.
    pub fn with_solver(mut self, krylov: KrylovKind) -> Self {
        self.implicit = self.implicit.with_solver(krylov);
        self
    }

    /// Krylov iterations accumulated by the implicit leg.
    pub fn iterations(&self) -> usize {
        self.implicit.iterations()
    }
}

impl Evolver for CrankNicolsonScheme {
    fn set_step(&mut self, dt: f64) {
        self.explicit.set_step(dt);
        self.implicit.set_step(dt);
    }

    fn step(&mut self, a: &mut Vec<f64>, t: f64) -> Result<(), FdmError> {
        if self.theta != 1.0 {
            self.explicit.step_weighted(a, t, 1.0 - self.theta)?;
        }
        if self.theta != 0.0 {
            self.implicit.step_weighted(a, t, self.theta)?;
        }
        Ok(())
    }
}
