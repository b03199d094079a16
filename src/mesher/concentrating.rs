//! Axis mesh concentrating nodes around one or more points.
//!
//! A single concentration point uses the closed-form inverse hyperbolic
//! sine transform; several points are handled by integrating an ODE whose
//! node density follows a sum of Cauchy-like kernels, with the overall
//! scale pinned by a Brent root solve so the transform lands exactly on
//! the right endpoint.

use crate::core::FdmError;
use crate::math::{bracket_root, brent, AdaptiveRungeKutta};
use crate::mesher::Mesh1d;

/// One concentration target: nodes cluster around `point` with a width
/// controlled by `density` (smaller is tighter).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConcentrationPoint {
    /// Location to concentrate around.
    pub point: f64,
    /// Relative cluster width; must be positive.
    pub density: f64,
    /// Relative weight against other concentration points.
    pub weight: f64,
}

impl ConcentrationPoint {
    /// Concentration point with unit weight.
    pub fn new(point: f64, density: f64) -> Self {
        Self {
            point,
            density,
            weight: 1.0,
        }
    }

    /// Overrides the relative weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

impl Mesh1d {
    /// Mesh of `size` nodes on `[start, end]` clustered around the given
    /// concentration points.
    pub fn concentrating(
        start: f64,
        end: f64,
        size: usize,
        points: &[ConcentrationPoint],
    ) -> Result<Self, FdmError> {
        if size < 2 {
            return Err(FdmError::InvalidInput(
                "a concentrating mesh needs at least two nodes".to_string(),
            ));
        }
        if !start.is_finite() || !end.is_finite() || end <= start {
            return Err(FdmError::InvalidInput(
                "concentrating mesh requires finite start < end".to_string(),
            ));
        }
        if points.is_empty() {
            return Err(FdmError::InvalidInput(
                "concentrating mesh needs at least one concentration point".to_string(),
            ));
        }
        for p in points {
            if !(start..=end).contains(&p.point) {
                return Err(FdmError::InvalidInput(
                    "concentration point outside the mesh interval".to_string(),
                ));
            }
            if !p.density.is_finite() || p.density <= 0.0 || p.weight <= 0.0 {
                return Err(FdmError::InvalidInput(
                    "concentration density and weight must be positive".to_string(),
                ));
            }
        }

        let locations = if points.len() == 1 {
            asinh_transform(start, end, size, points[0])
        } else {
            ode_transform(start, end, size, points)?
        };
        Mesh1d::from_locations(locations)
    }
}

fn asinh_transform(start: f64, end: f64, size: usize, p: ConcentrationPoint) -> Vec<f64> {
    let scale = p.density * (end - start);
    let c1 = ((start - p.point) / scale).asinh();
    let c2 = ((end - p.point) / scale).asinh();
    let dx = 1.0 / (size - 1) as f64;
    let mut locations: Vec<f64> = (0..size)
        .map(|i| {
            let u = i as f64 * dx;
            p.point + scale * (c1 * (1.0 - u) + c2 * u).sinh()
        })
        .collect();
    locations[0] = start;
    locations[size - 1] = end;
    locations
}

fn ode_transform(
    start: f64,
    end: f64,
    size: usize,
    points: &[ConcentrationPoint],
) -> Result<Vec<f64>, FdmError> {
    let span = end - start;
    let betas: Vec<f64> = points.iter().map(|p| p.density * span).collect();

    // node density is driven by the summed kernels; the spacing dy/du is
    // their reciprocal square root, scaled so the transform spans [start,end]
    let kernel_sum = |y: f64| -> f64 {
        points
            .iter()
            .zip(&betas)
            .map(|(p, &beta)| p.weight / ((y - p.point) * (y - p.point) + beta * beta))
            .sum()
    };
    let rhs = |a: f64| move |_u: f64, y: f64| a / kernel_sum(y).sqrt();

    let rk = AdaptiveRungeKutta::new(1.0e-8, 1.0e-4)?;
    let shoot = |a: f64| -> Result<f64, FdmError> { rk.integrate_scalar(&rhs(a), start, 0.0, 1.0) };

    // bound the scale through the sampled kernel extrema: the spacing is
    // monotone in `a`, so these bounds bracket the root
    let mut s_min = f64::INFINITY;
    let mut s_max = 0.0_f64;
    for i in 0..=100 {
        let y = start + span * i as f64 / 100.0;
        let s = kernel_sum(y);
        s_min = s_min.min(s);
        s_max = s_max.max(s);
    }
    let a_lo = 0.5 * span * s_min.sqrt();
    let a_hi = 2.0 * span * s_max.sqrt();

    let mut objective = |a: f64| match shoot(a) {
        Ok(y1) => y1 - end,
        Err(_) => f64::NAN,
    };
    let (a_lo, a_hi) = bracket_root(&mut objective, a_lo, a_hi, 20)?;
    let a = brent(&mut objective, a_lo, a_hi, 1.0e-10 * span, 100)?;

    let du = 1.0 / (size - 1) as f64;
    let mut locations = Vec::with_capacity(size);
    locations.push(start);
    let f = rhs(a);
    let mut y = start;
    for i in 1..size {
        y = rk.integrate_scalar(&f, y, (i - 1) as f64 * du, i as f64 * du)?;
        locations.push(y);
    }
    locations[size - 1] = end;
    Ok(locations)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn min_spacing_location(mesh: &Mesh1d) -> f64 {
        let mut best = (f64::INFINITY, 0.0);
        for i in 0..mesh.size() - 1 {
            let h = mesh.dplus(i);
            if h < best.0 {
                best = (h, 0.5 * (mesh.location(i) + mesh.location(i + 1)));
            }
        }
        best.1
    }

    #[test]
    fn single_point_clusters_nodes_around_target() {
        let mesh =
            Mesh1d::concentrating(0.0, 200.0, 51, &[ConcentrationPoint::new(100.0, 0.1)]).unwrap();
        assert_eq!(mesh.size(), 51);
        assert_eq!(mesh.location(0), 0.0);
        assert_eq!(mesh.location(50), 200.0);
        assert!((min_spacing_location(&mesh) - 100.0).abs() < 10.0);
        // tighter near the target than at the edges
        assert!(mesh.dplus(25) < mesh.dplus(0));
        assert!(mesh.dplus(25) < mesh.dplus(49));
    }

    #[test]
    fn two_points_each_attract_nodes() {
        let mesh = Mesh1d::concentrating(
            0.0,
            1.0,
            101,
            &[
                ConcentrationPoint::new(0.25, 0.05),
                ConcentrationPoint::new(0.75, 0.05),
            ],
        )
        .unwrap();
        assert_eq!(mesh.location(0), 0.0);
        assert_eq!(mesh.location(100), 1.0);
        // spacing near either target is tighter than mid-interval spacing
        let spacing_near = |target: f64| -> f64 {
            (0..mesh.size() - 1)
                .filter(|&i| (mesh.location(i) - target).abs() < 0.05)
                .map(|i| mesh.dplus(i))
                .fold(f64::INFINITY, f64::min)
        };
        let near_a = spacing_near(0.25);
        let near_b = spacing_near(0.75);
        let mid = spacing_near(0.5);
        assert!(near_a < mid);
        assert!(near_b < mid);
    }

    #[test]
    fn rejects_target_outside_interval() {
        assert!(
            Mesh1d::concentrating(0.0, 1.0, 11, &[ConcentrationPoint::new(2.0, 0.1)]).is_err()
        );
        assert!(
            Mesh1d::concentrating(0.0, 1.0, 11, &[ConcentrationPoint::new(0.5, -0.1)]).is_err()
        );
        assert!(Mesh1d::concentrating(0.0, 1.0, 11, &[]).is_err());
    }
}
