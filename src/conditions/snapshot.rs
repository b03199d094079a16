//! Value-array capture at a fixed time.

use std::cell::{Ref, RefCell};

use crate::conditions::{StepCondition, TIME_TOLERANCE};

/// Stores a deep copy of the value array the first time the rollback
/// lands on the registered time; the solver uses it for calendar-time
/// sensitivities.
pub struct SnapshotCondition {
    time: f64,
    values: RefCell<Vec<f64>>,
}

impl SnapshotCondition {
    /// Snapshot at `time`, which must also be a registered stopping time.
    pub fn new(time: f64) -> Self {
        Self {
            time,
            values: RefCell::new(Vec::new()),
        }
    }

    /// The capture time.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Captured values; empty until the rollback has crossed the capture
    /// time.
    pub fn values(&self) -> Ref<'_, Vec<f64>> {
        self.values.borrow()
    }
}

impl StepCondition for SnapshotCondition {
    fn apply_to(&self, values: &mut [f64], t: f64) {
        if (t - self.time).abs() < TIME_TOLERANCE {
            let mut stored = self.values.borrow_mut();
            stored.clear();
            stored.extend_from_slice(values);
        }
    }
}
