//! Hundsdorfer-Verwer ADI scheme.

use crate::core::FdmError;
use crate::scheme::{check_step, BoundarySetRef, Evolver, OperatorRef};

/// Douglas predictor followed by a full-operator correction stage whose
/// implicit sweep linearizes around the first-stage result instead of the
/// previous step.
pub struct HundsdorferScheme {
    theta: f64,
    mu: f64,
    dt: f64,
    map: OperatorRef,
    bc: BoundarySetRef,
}

impl HundsdorferScheme {
    /// Hundsdorfer-Verwer scheme with weights `theta` and `mu`.
    pub fn new(theta: f64, mu: f64, map: OperatorRef, bc: BoundarySetRef) -> Self {
        Self {
            theta,
            mu,
            dt: 0.0,
            map,
            bc,
        }
    }
}

impl Evolver for HundsdorferScheme {
    fn set_step(&mut self, dt: f64) {
        self.dt = dt;
    }

    fn step(&mut self, a: &mut Vec<f64>, t: f64) -> Result<(), FdmError> {
        check_step(t, self.dt)?;
        let t1 = (t - self.dt).max(0.0);
        self.map.borrow_mut().set_time(t1, t)?;
        self.bc.set_time(t1);

        let (dt, theta, mu) = (self.dt, self.theta, self.mu);
        let map = self.map.borrow();

        let la = map.apply(a);
        let mut y: Vec<f64> = a.iter().zip(&la).map(|(&ai, &li)| ai + dt * li).collect();
        self.bc.apply_after_applying(&mut y);
        let y0 = y.clone();

        for d in 0..map.size() {
            let ld_a = map.apply_direction(d, a);
            let rhs: Vec<f64> = y
                .iter()
                .zip(&ld_a)
                .map(|(&yi, &li)| yi - theta * dt * li)
                .collect();
            y = map.solve_splitting(d, &rhs, -theta * dt)?;
        }

        let diff: Vec<f64> = y.iter().zip(a.iter()).map(|(&yi, &ai)| yi - ai).collect();
        let l_diff = map.apply(&diff);
        let mut yt: Vec<f64> = y0
            .iter()
            .zip(&l_diff)
            .map(|(&y0i, &li)| y0i + mu * dt * li)
            .collect();
        self.bc.apply_after_applying(&mut yt);

        // second sweep linearized around y
        for d in 0..map.size() {
            let ld_y = map.apply_direction(d, &y);
            let rhs: Vec<f64> = yt
                .iter()
                .zip(&ld_y)
                .map(|(&yi, &li)| yi - theta * dt * li)
                .collect();
            yt = map.solve_splitting(d, &rhs, -theta * dt)?;
        }
        drop(map);
        self.bc.apply_after_solving(&mut yt);
        *a = yt;
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
    use std::cell::RefCell;
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
        let mut scheme = HundsdorferScheme::new(
            0.5 + 3.0_f64.sqrt() / 6.0,
            0.5,
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
    }
}
