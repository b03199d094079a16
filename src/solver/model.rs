//! Rollback driver over a time-stepping scheme.

use crate::conditions::{StepConditionSet, TIME_TOLERANCE};
use crate::core::FdmError;
use crate::scheme::Evolver;

/// Walks a value array backwards through uniform macro steps, splitting
/// any step that straddles a registered stopping time so the scheme lands
/// on the event exactly before the condition fires.
pub struct FiniteDifferenceModel<E: Evolver> {
    evolver: E,
    stopping_times: Vec<f64>,
}

impl<E: Evolver> FiniteDifferenceModel<E> {
    /// Model over `evolver`; `stopping_times` are sorted and deduplicated
    /// on entry.
    pub fn new(evolver: E, stopping_times: &[f64]) -> Self {
        let mut times = stopping_times.to_vec();
        times.sort_by(|a, b| a.total_cmp(b));
        times.dedup_by(|next, kept| (*next - *kept).abs() < TIME_TOLERANCE);
        Self {
            evolver,
            stopping_times: times,
        }
    }

    /// The wrapped scheme, for post-rollback diagnostics.
    pub fn evolver(&self) -> &E {
        &self.evolver
    }

    /// Rolls `a` back from `from` to `to` in `steps` uniform macro steps,
    /// applying `condition` at every discrete landing.
    pub fn rollback(
        &mut self,
        a: &mut Vec<f64>,
        from: f64,
        to: f64,
        steps: usize,
        condition: &StepConditionSet,
    ) -> Result<(), FdmError> {
        if from < to {
            return Err(FdmError::InvalidInput(format!(
                "rollback runs backwards, got from={from} < to={to}"
            )));
        }
        if steps == 0 {
            return Err(FdmError::InvalidInput(
                "rollback needs at least one step".to_string(),
            ));
        }
        let dt = (from - to) / steps as f64;
        self.evolver.set_step(dt);

        if self
            .stopping_times
            .last()
            .is_some_and(|&last| (last - from).abs() < TIME_TOLERANCE)
        {
            condition.apply_to(a, from);
        }

        let mut t = from;
        for _ in 0..steps {
            let mut now = t;
            let mut next = t - dt;
            if (to - next).abs() < f64::EPSILON.sqrt() {
                next = to;
            }
            let mut hit = false;
            for &st in self.stopping_times.iter().rev() {
                // events within tolerance of a step boundary are covered
                // by the boundary application itself
                if next + TIME_TOLERANCE <= st && st < now - TIME_TOLERANCE {
                    // land exactly on the event before applying it
                    hit = true;
                    self.evolver.set_step(now - st);
                    self.evolver.step(a, now)?;
                    condition.apply_to(a, st);
                    now = st;
                }
            }
            if hit {
                if now > next {
                    self.evolver.set_step(now - next);
                    self.evolver.step(a, now)?;
                    condition.apply_to(a, next);
                }
                self.evolver.set_step(dt);
            } else {
                self.evolver.step(a, now)?;
                condition.apply_to(a, next);
            }
            t -= dt;
        }
        Ok(())
    }
}
