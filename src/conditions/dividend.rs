//! Discrete cash dividends on an equity axis.

use std::rc::Rc;

use crate::conditions::{StepCondition, TIME_TOLERANCE};
use crate::math::interpolation::linear_interpolate;
use crate::mesher::GridMesher;

/// Shifts values along the equity axis at each ex-dividend time:
/// `V(s) <- V(s - D)`, interpolated linearly on the spot levels with flat
/// extrapolation below the grid.
pub struct DividendCondition {
    mesher: Rc<GridMesher>,
    direction: usize,
    times: Vec<f64>,
    amounts: Vec<f64>,
    // spot level per axis node, exp of the log-coordinate
    levels: Vec<f64>,
}

impl DividendCondition {
    /// Dividend schedule on the log-spot axis `direction`; `times` and
    /// `amounts` pair up elementwise.
    pub fn new(
        mesher: Rc<GridMesher>,
        direction: usize,
        times: Vec<f64>,
        amounts: Vec<f64>,
    ) -> Self {
        debug_assert_eq!(times.len(), amounts.len());
        let levels = mesher
            .axis(direction)
            .locations()
            .iter()
            .map(|&x| x.exp())
            .collect();
        Self {
            mesher,
            direction,
            times,
            amounts,
            levels,
        }
    }

    /// Ex-dividend times, for stopping-time registration.
    pub fn times(&self) -> &[f64] {
        &self.times
    }
}

impl StepCondition for DividendCondition {
    fn apply_to(&self, values: &mut [f64], t: f64) {
        let Some(k) = self
            .times
            .iter()
            .position(|&ti| (ti - t).abs() < TIME_TOLERANCE)
        else {
            return;
        };
        let dividend = self.amounts[k];
        let layout = self.mesher.layout().clone();
        let stride = layout.strides()[self.direction];
        let m = layout.dims()[self.direction];
        let mut line = vec![0.0; m];
        for anchor in layout.cells().filter(|c| c.coords[self.direction] == 0) {
            for (j, slot) in line.iter_mut().enumerate() {
                *slot = values[anchor.index + j * stride];
            }
            for (j, &level) in self.levels.iter().enumerate() {
                values[anchor.index + j * stride] =
                    linear_interpolate(&self.levels, &line, level - dividend);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesher::Mesh1d;

    fn mesher_1d() -> Rc<GridMesher> {
        Rc::new(
            GridMesher::from_axes(vec![Mesh1d::uniform(
                (50.0_f64).ln(),
                (200.0_f64).ln(),
                41,
            )
            .unwrap()])
            .unwrap(),
        )
    }

    #[test]
    fn shifts_a_linear_profile_by_the_dividend() {
        let mesher = mesher_1d();
        let cond = DividendCondition::new(mesher.clone(), 0, vec![0.5], vec![5.0]);
        let levels: Vec<f64> = mesher
            .axis(0)
            .locations()
            .iter()
            .map(|&x| x.exp())
            .collect();
        // V(s) = s is linear, so the interpolated shift is exact inside
        let mut values = levels.clone();
        cond.apply_to(&mut values, 0.5);
        for (j, &s) in levels.iter().enumerate() {
            if s - 5.0 >= levels[0] {
                assert!((values[j] - (s - 5.0)).abs() < 1.0e-9, "level {s}");
            } else {
                // flat extrapolation below the grid
                assert_eq!(values[j], levels[0]);
            }
        }
    }

    #[test]
    fn ignores_unmatched_times() {
        let mesher = mesher_1d();
        let cond = DividendCondition::new(mesher.clone(), 0, vec![0.5], vec![5.0]);
        let mut values = vec![1.0; mesher.layout().size()];
        cond.apply_to(&mut values, 0.25);
        assert!(values.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn shifts_each_line_of_a_two_dimensional_grid() {
        let mesher = Rc::new(
            GridMesher::from_axes(vec![
                Mesh1d::uniform((50.0_f64).ln(), (200.0_f64).ln(), 21).unwrap(),
                Mesh1d::uniform(0.0, 1.0, 3).unwrap(),
            ])
            .unwrap(),
        );
        let cond = DividendCondition::new(mesher.clone(), 0, vec![1.0], vec![2.0]);
        let layout = mesher.layout().clone();
        // V = spot + 10 * second-axis index
        let mut values: Vec<f64> = layout
            .cells()
            .map(|c| mesher.location(&c.coords, 0).exp() + 10.0 * c.coords[1] as f64)
            .collect();
        cond.apply_to(&mut values, 1.0);
        for cell in layout.cells() {
            let s = mesher.location(&cell.coords, 0).exp();
            if s - 2.0 >= mesher.axis(0).locations()[0].exp() {
                let expect = (s - 2.0) + 10.0 * cell.coords[1] as f64;
                assert!((values[cell.index] - expect).abs() < 1.0e-9);
            }
        }
    }
}
