//! Early exercise restricted to a date schedule.

use std::rc::Rc;

use crate::conditions::{StepCondition, TIME_TOLERANCE};
use crate::mesher::GridMesher;
use crate::solver::inner_value::InnerValueCalculator;

/// Applies the exercise floor only at the listed times; all of them must
/// also be registered as stopping times so the rollback lands on them.
pub struct BermudanCondition {
    exercise_times: Vec<f64>,
    mesher: Rc<GridMesher>,
    calculator: Rc<dyn InnerValueCalculator>,
}

impl BermudanCondition {
    /// Floor at each time in `exercise_times`.
    pub fn new(
        exercise_times: Vec<f64>,
        mesher: Rc<GridMesher>,
        calculator: Rc<dyn InnerValueCalculator>,
    ) -> Self {
        Self {
            exercise_times,
            mesher,
            calculator,
        }
    }

    /// Times the condition fires at, for stopping-time registration.
    pub fn exercise_times(&self) -> &[f64] {
        &self.exercise_times
    }
}

impl StepCondition for BermudanCondition {
    fn apply_to(&self, values: &mut [f64], t: f64) {
        if !self
            .exercise_times
            .iter()
            .any(|&ti| (ti - t).abs() < TIME_TOLERANCE)
        {
            return;
        }
        for cell in self.mesher.layout().clone().cells() {
            let intrinsic = self.calculator.inner_value(&cell.coords, t);
            if intrinsic > values[cell.index] {
                values[cell.index] = intrinsic;
            }
        }
    }
}
