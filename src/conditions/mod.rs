//! Discrete event handling during a rollback.
//!
//! A [`StepCondition`] mutates the value array at matching times; the
//! [`StepConditionSet`] merges and deduplicates every registered event
//! time and dispatches the conditions after each discrete step. Each
//! condition self-selects by time, so dispatching is a plain ordered
//! sweep.

pub mod american;
pub mod bermudan;
pub mod dividend;
pub mod snapshot;

pub use american::AmericanCondition;
pub use bermudan::BermudanCondition;
pub use dividend::DividendCondition;
pub use snapshot::SnapshotCondition;

use std::rc::Rc;

/// Absolute tolerance under which two event times are the same time.
pub const TIME_TOLERANCE: f64 = 1.0e-10;

/// Per-time mutation of the value array.
pub trait StepCondition {
    /// Applies the condition at time `t`; implementations ignore times
    /// they are not registered for.
    fn apply_to(&self, values: &mut [f64], t: f64);
}

/// Ordered conditions plus their merged, deduplicated stopping times.
#[derive(Default, Clone)]
pub struct StepConditionSet {
    stopping_times: Vec<f64>,
    conditions: Vec<Rc<dyn StepCondition>>,
}

impl StepConditionSet {
    /// Empty composite.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a condition together with the times it fires at; an
    /// empty list means the condition runs after every discrete step.
    pub fn add(&mut self, times: &[f64], condition: Rc<dyn StepCondition>) {
        self.conditions.push(condition);
        self.stopping_times.extend_from_slice(times);
        self.stopping_times.sort_by(|a, b| a.total_cmp(b));
        self.stopping_times.dedup_by(|next, kept| {
            (*next - *kept).abs() < TIME_TOLERANCE
        });
    }

    /// Merged ascending event times with no two entries closer than the
    /// dedup tolerance.
    pub fn stopping_times(&self) -> &[f64] {
        &self.stopping_times
    }

    /// Dispatches every condition at time `t`, in registration order.
    pub fn apply_to(&self, values: &mut [f64], t: f64) {
        for c in &self.conditions {
            c.apply_to(values, t);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder;
    impl StepCondition for Recorder {
        fn apply_to(&self, values: &mut [f64], _t: f64) {
            for v in values.iter_mut() {
                *v += 1.0;
            }
        }
    }

    #[test]
    fn merged_times_are_strictly_increasing_and_deduplicated() {
        let mut set = StepConditionSet::new();
        set.add(&[0.5, 0.25, 1.0], Rc::new(Recorder));
        set.add(&[0.25 + 1.0e-12, 0.75, 1.0], Rc::new(Recorder));
        let times = set.stopping_times();
        assert_eq!(times.len(), 4);
        for w in times.windows(2) {
            assert!(w[1] - w[0] >= TIME_TOLERANCE);
        }
    }

    #[test]
    fn dispatch_runs_conditions_in_order() {
        let mut set = StepConditionSet::new();
        set.add(&[], Rc::new(Recorder));
        set.add(&[], Rc::new(Recorder));
        let mut values = vec![0.0; 3];
        set.apply_to(&mut values, 0.1);
        assert_eq!(values, vec![2.0, 2.0, 2.0]);
    }
}
