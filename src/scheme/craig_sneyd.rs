//! Craig-Sneyd ADI schemes, plain and modified.

use crate::core::FdmError;
use crate::operator::PdeOperator;
use crate::scheme::{check_step, BoundarySetRef, Evolver, OperatorRef};

fn implicit_sweep(
    map: &dyn PdeOperator,
    a: &[f64],
    mut y: Vec<f64>,
    theta_dt: f64,
) -> Result<Vec<f64>, FdmError> {
    for d in 0..map.size() {
        let ld_a = map.apply_direction(d, a);
        let rhs: Vec<f64> = y
            .iter()
            .zip(&ld_a)
            .map(|(&yi, &li)| yi - theta_dt * li)
            .collect();
        y = map.solve_splitting(d, &rhs, -theta_dt)?;
    }
    Ok(y)
}

/// Douglas predictor-corrector with an explicit mixed-derivative
/// correction stage followed by a second implicit sweep.
pub struct CraigSneydScheme {
    theta: f64,
    mu: f64,
    dt: f64,
    map: OperatorRef,
    bc: BoundarySetRef,
}

impl CraigSneydScheme {
    /// Craig-Sneyd scheme with implicit weight `theta` and corrector
    /// weight `mu`.
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

impl Evolver for CraigSneydScheme {
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

        y = implicit_sweep(&*map, a, y, theta * dt)?;

        // explicit correction of the mixed-derivative part only
        let diff: Vec<f64> = y.iter().zip(a.iter()).map(|(&yi, &ai)| yi - ai).collect();
        let mixed = map.apply_mixed(&diff);
        let mut yt: Vec<f64> = y0
            .iter()
            .zip(&mixed)
            .map(|(&y0i, &mi)| y0i + mu * dt * mi)
            .collect();
        self.bc.apply_after_applying(&mut yt);

        yt = implicit_sweep(&*map, a, yt, theta * dt)?;
        drop(map);
        self.bc.apply_after_solving(&mut yt);
        *a = yt;
        Ok(())
    }
}

/// Craig-Sneyd variant correcting with the full operator, not just its
/// mixed part, which restores second order for any `mu`.
pub struct ModifiedCraigSneydScheme {
    theta: f64,
    mu: f64,
    dt: f64,
    map: OperatorRef,
    bc: BoundarySetRef,
}

impl ModifiedCraigSneydScheme {
    /// Modified Craig-Sneyd scheme with weights `theta` and `mu`.
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

impl Evolver for ModifiedCraigSneydScheme {
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

        y = implicit_sweep(&*map, a, y, theta * dt)?;

        let diff: Vec<f64> = y.iter().zip(a.iter()).map(|(&yi, &ai)| yi - ai).collect();
        let mixed = map.apply_mixed(&diff);
        let full = map.apply(&diff);
        let mut yt: Vec<f64> = y0
            .iter()
            .zip(mixed.iter().zip(&full))
            .map(|(&y0i, (&mi, &fi))| y0i + mu * dt * mi + (0.5 - mu) * dt * fi)
            .collect();
        self.bc.apply_after_applying(&mut yt);

        yt = implicit_sweep(&*map, a, yt, theta * dt)?;
        drop(map);
        self.bc.apply_after_solving(&mut yt);
        *a = yt;
        Ok(())
    }
}
