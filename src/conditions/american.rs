//! Continuous early-exercise floor.

use std::rc::Rc;

use crate::conditions::StepCondition;
use crate::mesher::GridMesher;
use crate::solver::inner_value::InnerValueCalculator;

/// Applies `v = max(v, intrinsic)` at every discrete step, the American
/// exercise right.
pub struct AmericanCondition {
    mesher: Rc<GridMesher>,
    calculator: Rc<dyn InnerValueCalculator>,
}

impl AmericanCondition {
    /// Floor using `calculator`'s point intrinsic values.
    pub fn new(mesher: Rc<GridMesher>, calculator: Rc<dyn InnerValueCalculator>) -> Self {
        Self { mesher, calculator }
    }
}

impl StepCondition for AmericanCondition {
    fn apply_to(&self, values: &mut [f64], t: f64) {
        for cell in self.mesher.layout().clone().cells() {
            let intrinsic = self.calculator.inner_value(&cell.coords, t);
            if intrinsic > values[cell.index] {
                values[cell.index] = intrinsic;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{OptionType, Payoff, PlainVanillaPayoff};
    use crate::mesher::Mesh1d;
    use crate::solver::inner_value::PayoffInnerValue;

    #[test]
    fn floors_continuation_values_at_intrinsic() {
        let mesher = Rc::new(
            GridMesher::from_axes(vec![Mesh1d::uniform(
                (50.0_f64).ln(),
                (200.0_f64).ln(),
                21,
            )
            .unwrap()])
            .unwrap(),
        );
        let payoff = Rc::new(PlainVanillaPayoff::new(OptionType::Put, 100.0).unwrap());
        let calc = Rc::new(PayoffInnerValue::new(payoff.clone(), mesher.clone(), 0));
        let cond = AmericanCondition::new(mesher.clone(), calc);

        let mut values = vec![0.0; mesher.layout().size()];
        cond.apply_to(&mut values, 0.5);
        for cell in mesher.layout().clone().cells() {
            let s = mesher.location(&cell.coords, 0).exp();
            assert!((values[cell.index] - payoff.value(s)).abs() < 1.0e-12);
        }

        // values already above intrinsic stay untouched
        let mut rich = vec![1.0e6; mesher.layout().size()];
        cond.apply_to(&mut rich, 0.5);
        assert!(rich.iter().all(|&v| v == 1.0e6));
    }
}
