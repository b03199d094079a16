//! TR-BDF2 composite scheme.

use std::cell::RefCell;

use crate::core::FdmError;
use crate::math::bicgstab::BiCgStab;
use crate::math::gmres::Gmres;
use crate::scheme::{
    check_step, BoundarySetRef, CraigSneydScheme, Evolver, KrylovKind, OperatorRef,
};

const REL_TOL: f64 = 1.0e-8;

/// One trapezoidal stage to the intermediate time `t - alpha dt` followed
/// by a BDF2 stage to `t - dt`, with `alpha = 2 - sqrt(2)`. L-stable, so
/// it damps the high-frequency payoff modes a plain trapezoidal scheme
/// lets ring.
pub struct TrBdf2Scheme {
    alpha: f64,
    beta: f64,
    dt: f64,
    map: OperatorRef,
    bc: BoundarySetRef,
    trapezoidal: CraigSneydScheme,
    krylov: KrylovKind,
    iterations: usize,
}

impl TrBdf2Scheme {
    /// TR-BDF2 using a Craig-Sneyd trapezoidal stage.
    pub fn new(map: OperatorRef, bc: BoundarySetRef) -> Self {
        let alpha = 2.0 - 2.0_f64.sqrt();
        Self {
            alpha,
            beta: 0.0,
            dt: 0.0,
            trapezoidal: CraigSneydScheme::new(0.5, 0.5, map.clone(), bc.clone()),
            map,
            bc,
            krylov: KrylovKind::BiCgStab,
            iterations: 0,
        }
    }

    /// Selects the Krylov solver for multi-dimensional BDF2 solves.
    pub fn with_solver(mut self, krylov: KrylovKind) -> Self {
        self.krylov = krylov;
        self
    }

    /// Krylov iterations accumulated over all steps so far.
    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

impl Evolver for TrBdf2Scheme {
    fn set_step(&mut self, dt: f64) {
        self.dt = dt;
        self.beta = (1.0 - self.alpha) / (2.0 - self.alpha) * dt;
        self.trapezoidal.set_step(self.alpha * dt);
    }

    fn step(&mut self, a: &mut Vec<f64>, t: f64) -> Result<(), FdmError> {
        check_step(t, self.dt)?;
        let f_n = a.clone();
        let mut f_star = a.clone();
        self.trapezoidal.step(&mut f_star, t)?;

        let t1 = (t - self.dt).max(0.0);
        self.map
            .borrow_mut()
            .set_time(t1, t - self.alpha * self.dt)?;
        self.bc.set_time(t1);

        let alpha = self.alpha;
        let beta = self.beta;
        let f: Vec<f64> = f_star
            .iter()
            .zip(&f_n)
            .map(|(&fs, &fi)| (fs / alpha - (1.0 - alpha) * (1.0 - alpha) / alpha * fi)
                / (2.0 - alpha))
            .collect();

        let map = self.map.borrow();
        if map.size() == 1 {
            *a = map.solve_splitting(0, &f, -beta)?;
        } else {
            let failure: RefCell<Option<FdmError>> = RefCell::new(None);
            let apply_f = |r: &[f64]| -> Vec<f64> {
                let lr = map.apply(r);
                r.iter().zip(&lr).map(|(&ri, &li)| ri - beta * li).collect()
            };
            let precond = |r: &[f64]| -> Vec<f64> {
                match map.preconditioner(r, -beta) {
                    Ok(v) => v,
                    Err(e) => {
                        failure.borrow_mut().get_or_insert(e);
                        r.to_vec()
                    }
                }
            };
            let n = f.len();
            let result = match self.krylov {
                KrylovKind::BiCgStab => {
                    BiCgStab::new(&apply_f, n.max(10), REL_TOL, Some(&precond))
                        .solve(&f, &f_star)?
                }
                KrylovKind::Gmres => Gmres::new(&apply_f, (n / 10).max(10), REL_TOL, Some(&precond))
                    .solve(&f, &f_star)?,
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::BoundaryConditionSet;
    use crate::core::FlatRate;
    use crate::mesher::{GridMesher, Mesh1d};
    use crate::operator::black_scholes::{BlackScholesOp, Volatility};
    use std::rc::Rc;

    #[test]
    fn second_order_on_pure_discounting() {
        let mesher = GridMesher::from_axes(vec![Mesh1d::uniform(
            (50.0_f64).ln(),
            (200.0_f64).ln(),
            25,
        )
        .unwrap()])
        .unwrap();
        let op = BlackScholesOp::new(
            &mesher,
            Rc::new(FlatRate(0.05)),
            Rc::new(FlatRate(0.0)),
            Volatility::Flat(0.2),
            0,
        )
        .unwrap();
        let mut scheme = TrBdf2Scheme::new(
            Rc::new(RefCell::new(op)),
            Rc::new(BoundaryConditionSet::new()),
        );
        let steps = 50;
        let dt = 1.0 / steps as f64;
        scheme.set_step(dt);
        let mut a = vec![1.0; 25];
        let mut t = 1.0;
        for _ in 0..steps {
            scheme.step(&mut a, t).unwrap();
            t -= dt;
        }
        assert!((a[12] - (-0.05_f64).exp()).abs() < 1.0e-4);
        assert_eq!(scheme.iterations(), 0);
    }
}
