//! Equally spaced axis mesh.

use crate::core::FdmError;
use crate::mesher::Mesh1d;

impl Mesh1d {
    /// Uniform mesh of `size` nodes on `[start, end]` with spacing
    /// `(end - start) / (size - 1)`.
    pub fn uniform(start: f64, end: f64, size: usize) -> Result<Self, FdmError> {
        if size < 2 {
            return Err(FdmError::InvalidInput(
                "a uniform mesh needs at least two nodes".to_string(),
            ));
        }
        if !start.is_finite() || !end.is_finite() || end <= start {
            return Err(FdmError::InvalidInput(
                "uniform mesh requires finite start < end".to_string(),
            ));
        }
        let dx = (end - start) / (size - 1) as f64;
        let mut locations: Vec<f64> = (0..size).map(|i| start + i as f64 * dx).collect();
        // pin the endpoint against accumulated rounding
        locations[size - 1] = end;
        Mesh1d::from_locations(locations)
    }
}
