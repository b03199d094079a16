//! Forward Euler scheme.

use crate::core::FdmError;
use crate::scheme::{check_step, BoundarySetRef, Evolver, OperatorRef};

/// Fully explicit step `a <- a + dt L a`; only stable for small steps but
/// useful as the explicit leg of blended schemes and as a damping-free
/// reference.
pub struct ExplicitEulerScheme {
    dt: f64,
    map: OperatorRef,
    bc: BoundarySetRef,
}

impl ExplicitEulerScheme {
    /// Scheme over a shared operator and boundary-condition set.
    pub fn new(map: OperatorRef, bc: BoundarySetRef) -> Self {
        Self { dt: 0.0, map, bc }
    }

    /// One step scaled by `theta`, so blended schemes can take a partial
    /// explicit leg over the same time interval.
    pub(crate) fn step_weighted(
        &mut self,
        a: &mut Vec<f64>,
        t: f64,
        theta: f64,
    ) -> Result<(), FdmError> {
        check_step(t, self.dt)?;
        let t1 = (t - self.dt).max(0.0);
        self.map.borrow_mut().set_time(t1, t)?;
        self.bc.set_time(t1);
        let la = self.map.borrow().apply(a);
        for (ai, li) in a.iter_mut().zip(&la) {
            *ai += theta * self.dt * li;
        }
        self.bc.apply_after_applying(a);
        Ok(())
    }
}

impl Evolver for ExplicitEulerScheme {
    fn set_step(&mut self, dt: f64) {
        self.dt = dt;
    }

    fn step(&mut self, a: &mut Vec<f64>, t: f64) -> Result<(), FdmError> {
        self.step_weighted(a, t, 1.0)
    }
}
