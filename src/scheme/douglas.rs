//! Douglas ADI splitting.

use crate::core::FdmError;
use crate::scheme::{check_step, BoundarySetRef, Evolver, OperatorRef};

/// Predictor `y = a + dt L a` followed by one implicit correction per
/// axis, each solving `(I - theta dt L_d) y' = y - theta dt L_d a`. In
/// one dimension this is the plain theta scheme.
pub struct DouglasScheme {
    theta: f64,
    dt: f64,
    map: OperatorRef,
    bc: BoundarySetRef,
}

impl DouglasScheme {
    /// Douglas scheme with implicit weight `theta`.
    pub fn new(theta: f64, map: OperatorRef, bc: BoundarySetRef) -> Self {
        Self {
            theta,
            dt: 0.0,
            map,
            bc,
        }
    }
}

impl Evolver for DouglasScheme {
    fn set_step(&mut self, dt: f64) {
        self.dt = dt;
    }

    fn step(&mut self, a: &mut Vec<f64>, t: f64) -> Result<(), FdmError> {
        check_step(t, self.dt)?;
        let t1 = (t - self.dt).max(0.0);
        self.map.borrow_mut().set_time(t1, t)?;
        self.bc.set_time(t1);

        let dt = self.dt;
        let theta = self.theta;
        let map = self.map.borrow();

        let la = map.apply(a);
        let mut y: Vec<f64> = a.iter().zip(&la).map(|(&ai, &li)| ai + dt * li).collect();
        self.bc.apply_after_applying(&mut y);

        for d in 0..map.size() {
            let ld_a = map.apply_direction(d, a);
            let rhs: Vec<f64> = y
                .iter()
                .zip(&ld_a)
                .map(|(&yi, &li)| yi - theta * dt * li)
                .collect();
            y = map.solve_splitting(d, &rhs, -theta * dt)?;
        }
        drop(map);
        self.bc.apply_after_solving(&mut y);
        *a = y;
        Ok(())
    }
}
