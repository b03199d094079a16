//! Backward Euler scheme.

use std::cell::RefCell;

use crate::core::FdmError;
use crate::math::bicgstab::BiCgStab;
use crate::math::gmres::Gmres;
use crate::scheme::{check_step, BoundarySetRef, Evolver, KrylovKind, OperatorRef};

const REL_TOL: f64 = 1.0e-8;

/// Fully implicit step solving `(I - dt L) a' = a`.
///
/// A one-dimensional operator is solved directly through its banded
/// factorization; multi-dimensional operators go through a matrix-free
/// Krylov solve preconditioned by the operator's splitting solve.
pub struct ImplicitEulerScheme {
    dt: f64,
    map: OperatorRef,
    bc: BoundarySetRef,
    krylov: KrylovKind,
    iterations: usize,
}

impl ImplicitEulerScheme {
    /// Scheme defaulting to BiCGStab for multi-dimensional solves.
    pub fn new(map: OperatorRef, bc: BoundarySetRef) -> Self {
        Self {
            dt: 0.0,
            map,
            bc,
            krylov: KrylovKind::BiCgStab,
            iterations: 0,
        }
    }

    /// Selects the Krylov solver used when the operator couples several
    /// axes.
    pub fn with_solver(mut self, krylov: KrylovKind) -> Self {
        self.krylov = krylov;
        self
    }

    /// Krylov iterations accumulated over all steps so far.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// One step with the implicit weight `theta`, so blended schemes can
    /// take a partial implicit leg over the same time interval.
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

        let s = -theta * self.dt;
        let theta_dt = theta * self.dt;
        let map = self.map.borrow();
        if map.size() == 1 {
            *a = map.solve_splitting(0, a, s)?;
        } else {
            let failure: RefCell<Option<FdmError>> = RefCell::new(None);
            let apply_f = |r: &[f64]| -> Vec<f64> {
                let lr = map.apply(r);
                r.iter()
                    .zip(&lr)
                    .map(|(&ri, &li)| ri - theta_dt * li)
                    .collect()
            };
            let precond = |r: &[f64]| -> Vec<f64> {
                match map.preconditioner(r, s) {
                    Ok(v) => v,
                    Err(e) => {
                        failure.borrow_mut().get_or_insert(e);
                        r.to_vec()
                    }
                }
            };
            let n = a.len();
            let result = match self.krylov {
                KrylovKind::BiCgStab => {
                    BiCgStab::new(&apply_f, n.max(10), REL_TOL, Some(&precond)).solve(a, a)?
                }
                KrylovKind::Gmres => {
                    Gmres::new(&apply_f, (n / 10).max(10), REL_TOL, Some(&precond)).solve(a, a)?
                }
            };
            if let Some(e) = failure.borrow_mut().take() {
                return Err(e);
            }
            self.iterations += result.iterations;
            *a = result.x;
        }
        drop(map);
        self.bc.apply_after_solving(a);
        Ok(())
    }
}

impl Evolver for ImplicitEulerScheme {
    fn set_step(&mut self, dt: f64) {
        self.dt = dt;
    }

    fn step(&mut self, a: &mut Vec<f64>, t: f64) -> Result<(), FdmError> {
        self.step_weighted(a, t, 1.0)
    }
}
