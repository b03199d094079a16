//! Scheme selection and damping for the backward roll.

use std::rc::Rc;

use crate::conditions::StepConditionSet;
use crate::core::FdmError;
use crate::scheme::{
    BoundarySetRef, CraigSneydScheme, CrankNicolsonScheme, DouglasScheme, Evolver,
    ExplicitEulerScheme, HundsdorferScheme, ImplicitEulerScheme, MethodOfLinesScheme,
    ModifiedCraigSneydScheme, OperatorRef, SchemeDesc, SchemeKind, TrBdf2Scheme,
};
use crate::solver::model::FiniteDifferenceModel;

/// Builds the requested scheme and drives the rollback, optionally
/// prefixed by implicit-Euler damping steps that kill the oscillations a
/// non-smooth terminal profile excites in trapezoidal-type schemes.
pub struct BackwardSolver {
    map: OperatorRef,
    bc: BoundarySetRef,
    condition: Rc<StepConditionSet>,
    scheme: SchemeDesc,
}

impl BackwardSolver {
    /// Solver over a shared operator, boundary set, and condition set.
    pub fn new(
        map: OperatorRef,
        bc: BoundarySetRef,
        condition: Rc<StepConditionSet>,
        scheme: SchemeDesc,
    ) -> Self {
        Self {
            map,
            bc,
            condition,
            scheme,
        }
    }

    fn build_evolver(&self) -> Result<Box<dyn Evolver>, FdmError> {
        let (map, bc) = (self.map.clone(), self.bc.clone());
        let d = self.scheme;
        Ok(match d.kind {
            SchemeKind::ExplicitEuler => Box::new(ExplicitEulerScheme::new(map, bc)),
            SchemeKind::ImplicitEuler => {
                Box::new(ImplicitEulerScheme::new(map, bc).with_solver(d.krylov))
            }
            SchemeKind::CrankNicolson => {
                Box::new(CrankNicolsonScheme::new(d.theta, map, bc)?.with_solver(d.krylov))
            }
            SchemeKind::Douglas => Box::new(DouglasScheme::new(d.theta, map, bc)),
            SchemeKind::CraigSneyd => Box::new(CraigSneydScheme::new(d.theta, d.mu, map, bc)),
            SchemeKind::ModifiedCraigSneyd => {
                Box::new(ModifiedCraigSneydScheme::new(d.theta, d.mu, map, bc))
            }
            SchemeKind::Hundsdorfer => Box::new(HundsdorferScheme::new(d.theta, d.mu, map, bc)),
            SchemeKind::MethodOfLines => {
                Box::new(MethodOfLinesScheme::new(d.theta, d.mu, map, bc)?)
            }
            SchemeKind::TrBdf2 => Box::new(TrBdf2Scheme::new(map, bc).with_solver(d.krylov)),
        })
    }

    /// Rolls `rhs` back from `from` to `to`; `damping_steps` extra
    /// implicit-Euler steps are squeezed in at the start of the interval.
    pub fn rollback(
        &self,
        rhs: &mut Vec<f64>,
        from: f64,
        to: f64,
        steps: usize,
        damping_steps: usize,
    ) -> Result<(), FdmError> {
        if from < to {
            return Err(FdmError::InvalidInput(format!(
                "rollback runs backwards, got from={from} < to={to}"
            )));
        }
        let delta = from - to;
        let all_steps = steps + damping_steps;
        let mut damping_to = from;
        if damping_steps > 0 && self.scheme.kind != SchemeKind::ImplicitEuler {
            damping_to = from - delta * damping_steps as f64 / all_steps as f64;
            let damper = ImplicitEulerScheme::new(self.map.clone(), self.bc.clone())
                .with_solver(self.scheme.krylov);
            let mut model = FiniteDifferenceModel::new(damper, self.condition.stopping_times());
            model.rollback(rhs, from, damping_to, damping_steps, &self.condition)?;
        }
        let evolver = self.build_evolver()?;
        let mut model = FiniteDifferenceModel::new(evolver, self.condition.stopping_times());
        model.rollback(rhs, damping_to, to, steps, &self.condition)
    }
}
