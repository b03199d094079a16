//! One-dimensional pricing facade.

use std::cell::RefCell;
use std::rc::Rc;

use crate::boundary::BoundaryConditionSet;
use crate::conditions::{SnapshotCondition, StepConditionSet};
use crate::core::FdmError;
use crate::math::interpolation::CubicSpline;
use crate::mesher::GridMesher;
use crate::operator::PdeOperator;
use crate::scheme::SchemeDesc;
use crate::solver::backward::BackwardSolver;
use crate::solver::inner_value::InnerValueCalculator;

/// Everything a backward solve needs besides the operator: grid, boundary
/// and step conditions, terminal-value source, and the time discretization.
pub struct SolverDesc {
    /// Spatial grid.
    pub mesher: Rc<GridMesher>,
    /// Boundary conditions.
    pub bc: Rc<BoundaryConditionSet>,
    /// Step conditions with their stopping times.
    pub condition: Rc<StepConditionSet>,
    /// Terminal and intrinsic values.
    pub calculator: Rc<dyn InnerValueCalculator>,
    /// Maturity in year fractions.
    pub maturity: f64,
    /// Macro time steps of the main scheme.
    pub time_steps: usize,
    /// Implicit-Euler damping steps prefixed to the roll.
    pub damping_steps: usize,
}

struct Computation {
    spline: CubicSpline,
    snapshot_spline: CubicSpline,
    snapshot_time: f64,
}

/// Rolls a one-dimensional problem back once, on demand, and answers
/// value and sensitivity queries from a natural cubic spline over the
/// result; an internal snapshot shortly after valuation time feeds the
/// calendar-time theta.
pub struct Solver1d {
    desc: SolverDesc,
    map: Rc<RefCell<dyn PdeOperator>>,
    scheme: SchemeDesc,
    cache: RefCell<Option<Rc<Computation>>>,
}

impl Solver1d {
    /// Facade over a one-dimensional operator and its solve description.
    pub fn new(
        desc: SolverDesc,
        map: Rc<RefCell<dyn PdeOperator>>,
        scheme: SchemeDesc,
    ) -> Result<Self, FdmError> {
        if desc.mesher.dimensions() != 1 {
            return Err(FdmError::InvalidInput(
                "one-dimensional solver needs a one-dimensional mesher".to_string(),
            ));
        }
        if !(desc.maturity > 0.0) || desc.time_steps == 0 {
            return Err(FdmError::InvalidInput(
                "solver needs maturity > 0 and time_steps >= 1".to_string(),
            ));
        }
        Ok(Self {
            desc,
            map,
            scheme,
            cache: RefCell::new(None),
        })
    }

    fn perform(&self) -> Result<Rc<Computation>, FdmError> {
        if let Some(c) = self.cache.borrow().as_ref() {
            return Ok(c.clone());
        }
        let layout = self.desc.mesher.layout().clone();
        let mut values: Vec<f64> = layout
            .cells()
            .map(|c| {
                self.desc
                    .calculator
                    .avg_inner_value(&c.coords, self.desc.maturity)
            })
            .collect();

        // snapshot just after valuation time, for theta
        let snapshot_time =
            0.99 * (1.0 / 365.0_f64).min(self.desc.maturity / self.desc.time_steps as f64);
        let snapshot = Rc::new(SnapshotCondition::new(snapshot_time));
        let mut conditions = (*self.desc.condition).clone();
        conditions.add(&[snapshot_time], snapshot.clone());

        let solver = BackwardSolver::new(
            self.map.clone(),
            self.desc.bc.clone(),
            Rc::new(conditions),
            self.scheme,
        );
        solver.rollback(
            &mut values,
            self.desc.maturity,
            0.0,
            self.desc.time_steps,
            self.desc.damping_steps,
        )?;

        let x = self.desc.mesher.axis(0).locations().to_vec();
        let spline = CubicSpline::new(x.clone(), values)?;
        let snapshot_values = snapshot.values().clone();
        let snapshot_spline = CubicSpline::new(x, snapshot_values)?;
        let computation = Rc::new(Computation {
            spline,
            snapshot_spline,
            snapshot_time,
        });
        *self.cache.borrow_mut() = Some(computation.clone());
        Ok(computation)
    }

    /// Present value at the grid coordinate `x`.
    pub fn interpolate_at(&self, x: f64) -> Result<f64, FdmError> {
        Ok(self.perform()?.spline.value(x))
    }

    /// First spatial derivative at `x`.
    pub fn derivative_x(&self, x: f64) -> Result<f64, FdmError> {
        Ok(self.perform()?.spline.derivative(x))
    }

    /// Second spatial derivative at `x`.
    pub fn second_derivative_x(&self, x: f64) -> Result<f64, FdmError> {
        Ok(self.perform()?.spline.second_derivative(x))
    }

    /// Calendar-time derivative at `x`, estimated from the internal
    /// snapshot.
    pub fn theta_at(&self, x: f64) -> Result<f64, FdmError> {
        let c = self.perform()?;
        if c.snapshot_spline.value(x).is_nan() {
            return Err(FdmError::NumericalError(
                "snapshot interpolation failed".to_string(),
            ));
        }
        Ok((c.snapshot_spline.value(x) - c.spline.value(x)) / c.snapshot_time)
    }
}
