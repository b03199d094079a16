//! Method-of-lines scheme over an adaptive Runge-Kutta integrator.

use std::cell::RefCell;

use crate::core::FdmError;
use crate::math::ode::AdaptiveRungeKutta;
use crate::scheme::{check_step, BoundarySetRef, Evolver, OperatorRef};

// keeps the operator's time interval well-formed when sampling the
// semi-discrete right-hand side at a single instant
const TIME_NUDGE: f64 = 1.0e-4;

/// Treats the spatial discretization as a stiff ODE system and rolls it
/// back with the adaptive Cash-Karp integrator, re-sampling operator
/// coefficients at every intermediate stage time.
pub struct MethodOfLinesScheme {
    eps: f64,
    rel_init_step: f64,
    dt: f64,
    map: OperatorRef,
    bc: BoundarySetRef,
}

impl MethodOfLinesScheme {
    /// Scheme with local error tolerance `eps` and first trial step
    /// `rel_init_step * dt`.
    pub fn new(
        eps: f64,
        rel_init_step: f64,
        map: OperatorRef,
        bc: BoundarySetRef,
    ) -> Result<Self, FdmError> {
        if !(eps > 0.0) || !(rel_init_step > 0.0) {
            return Err(FdmError::InvalidInput(
                "method of lines needs eps > 0 and rel_init_step > 0".to_string(),
            ));
        }
        Ok(Self {
            eps,
            rel_init_step,
            dt: 0.0,
            map,
            bc,
        })
    }
}

impl Evolver for MethodOfLinesScheme {
    fn set_step(&mut self, dt: f64) {
        self.dt = dt;
    }

    fn step(&mut self, a: &mut Vec<f64>, t: f64) -> Result<(), FdmError> {
        check_step(t, self.dt)?;
        let t1 = (t - self.dt).max(0.0);

        let failure: RefCell<Option<FdmError>> = RefCell::new(None);
        let rhs = |u: f64, y: &[f64]| -> Vec<f64> {
            if let Err(e) = self.map.borrow_mut().set_time(u, u + TIME_NUDGE) {
                failure.borrow_mut().get_or_insert(e);
                return vec![0.0; y.len()];
            }
            self.bc.set_time(u);
            let mut dy = self.map.borrow().apply(y);
            self.bc.apply_after_applying(&mut dy);
            // calendar time runs down while the rollback accumulates L
            for d in dy.iter_mut() {
                *d = -*d;
            }
            dy
        };

        let integrator = AdaptiveRungeKutta::new(self.eps, self.rel_init_step * self.dt)?;
        let mut y = integrator.integrate(&rhs, a, t, t1)?;
        if let Some(e) = failure.borrow_mut().take() {
            return Err(e);
        }
        self.bc.apply_after_solving(&mut y);
        *a = y;
        Ok(())
    }
}
