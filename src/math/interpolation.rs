//! Grid interpolation used by the dividend handler and the solver facade.
//!
//! Linear lookup with flat extrapolation for event handling, and a natural
//! cubic spline with analytic first/second derivatives for solution
//! readout.

use crate::core::FdmError;

fn validate_xy(x: &[f64], y: &[f64], min_len: usize) -> Result<(), FdmError> {
    if x.len() != y.len() {
        return Err(FdmError::InvalidInput(
            "x and y must have the same length".to_string(),
        ));
    }
    if x.len() < min_len {
        return Err(FdmError::InvalidInput(
            "not enough interpolation nodes".to_string(),
        ));
    }
    if x.windows(2).any(|w| w[1] <= w[0]) {
        return Err(FdmError::InvalidInput(
            "x must be strictly increasing".to_string(),
        ));
    }
    if x.iter().any(|v| !v.is_finite()) || y.iter().any(|v| !v.is_finite()) {
        return Err(FdmError::InvalidInput(
            "x and y must be finite".to_string(),
        ));
    }
    Ok(())
}

/// Piecewise-linear value at `xq` with flat extrapolation outside the grid.
pub fn linear_interpolate(x: &[f64], y: &[f64], xq: f64) -> f64 {
    debug_assert_eq!(x.len(), y.len());
    if xq <= x[0] {
        return y[0];
    }
    let n = x.len() - 1;
    if xq >= x[n] {
        return y[n];
    }
    let hi = x.partition_point(|&v| v < xq).clamp(1, n);
    let lo = hi - 1;
    let w = (xq - x[lo]) / (x[hi] - x[lo]);
    (1.0 - w) * y[lo] + w * y[hi]
}

/// Natural cubic spline with closed-form first and second derivatives.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    x: Vec<f64>,
    y: Vec<f64>,
    // second derivatives at the nodes, natural end conditions
    m: Vec<f64>,
}

impl CubicSpline {
    /// Fits a natural spline through `(x, y)`; `x` must be strictly
    /// increasing with at least three nodes.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self, FdmError> {
        validate_xy(&x, &y, 3)?;
        let n = x.len();
        // Thomas solve of the tridiagonal second-derivative system
        let mut diag = vec![0.0; n];
        let mut rhs = vec![0.0; n];
        let mut upper = vec![0.0; n];
        diag[0] = 1.0;
        diag[n - 1] = 1.0;
        for i in 1..n - 1 {
            let h0 = x[i] - x[i - 1];
            let h1 = x[i + 1] - x[i];
            diag[i] = 2.0 * (h0 + h1);
            upper[i] = h1;
            rhs[i] = 6.0 * ((y[i + 1] - y[i]) / h1 - (y[i] - y[i - 1]) / h0);
        }
        let mut c_star = vec![0.0; n];
        let mut d_star = vec![0.0; n];
        d_star[0] = 0.0;
        for i in 1..n - 1 {
            let lower = x[i] - x[i - 1];
            let denom = diag[i] - lower * c_star[i - 1];
            if denom.abs() <= 1.0e-14 {
                return Err(FdmError::NumericalError(
                    "singular spline system".to_string(),
                ));
            }
            c_star[i] = upper[i] / denom;
            d_star[i] = (rhs[i] - lower * d_star[i - 1]) / denom;
        }
        let mut m = vec![0.0; n];
        for i in (1..n - 1).rev() {
            m[i] = d_star[i] - c_star[i] * m[i + 1];
        }
        Ok(Self { x, y, m })
    }

    fn segment(&self, xq: f64) -> usize {
        let n = self.x.len() - 1;
        self.x.partition_point(|&v| v < xq).clamp(1, n) - 1
    }

    /// Spline value; linear extrapolation with the endpoint slope outside
    /// the node range.
    pub fn value(&self, xq: f64) -> f64 {
        let n = self.x.len() - 1;
        if xq < self.x[0] {
            return self.y[0] + self.derivative(self.x[0]) * (xq - self.x[0]);
        }
        if xq > self.x[n] {
            return self.y[n] + self.derivative(self.x[n]) * (xq - self.x[n]);
        }
        let i = self.segment(xq);
        let h = self.x[i + 1] - self.x[i];
        let t = xq - self.x[i];
        let b = (self.y[i + 1] - self.y[i]) / h - h * (2.0 * self.m[i] + self.m[i + 1]) / 6.0;
        let c = 0.5 * self.m[i];
        let d = (self.m[i + 1] - self.m[i]) / (6.0 * h);
        self.y[i] + t * (b + t * (c + t * d))
    }

    /// First derivative; constant outside the node range.
    pub fn derivative(&self, xq: f64) -> f64 {
        let n = self.x.len() - 1;
        let xq = xq.clamp(self.x[0], self.x[n]);
        let i = self.segment(xq);
        let h = self.x[i + 1] - self.x[i];
        let t = xq - self.x[i];
        let b = (self.y[i + 1] - self.y[i]) / h - h * (2.0 * self.m[i] + self.m[i + 1]) / 6.0;
        let c = 0.5 * self.m[i];
        let d = (self.m[i + 1] - self.m[i]) / (6.0 * h);
        b + t * (2.0 * c + 3.0 * d * t)
    }

    /// Second derivative; zero outside the node range (natural ends).
    pub fn second_derivative(&self, xq: f64) -> f64 {
        let n = self.x.len() - 1;
        if xq < self.x[0] || xq > self.x[n] {
            return 0.0;
        }
        let i = self.segment(xq);
        let h = self.x[i + 1] - self.x[i];
        let t = xq - self.x[i];
        self.m[i] + (self.m[i + 1] - self.m[i]) * t / h
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_lookup_clamps_and_interpolates() {
        let x = [0.0, 1.0, 2.0];
        let y = [10.0, 20.0, 40.0];
        assert_eq!(linear_interpolate(&x, &y, -1.0), 10.0);
        assert_eq!(linear_interpolate(&x, &y, 3.0), 40.0);
        assert!((linear_interpolate(&x, &y, 0.5) - 15.0).abs() < 1.0e-12);
        assert!((linear_interpolate(&x, &y, 1.5) - 30.0).abs() < 1.0e-12);
    }

    #[test]
    fn spline_reproduces_nodes_and_smooth_function() {
        let x: Vec<f64> = (0..21).map(|i| i as f64 * 0.1).collect();
        let y: Vec<f64> = x.iter().map(|&v| (v * v * v) - v).collect();
        let spline = CubicSpline::new(x.clone(), y.clone()).unwrap();
        for (xi, yi) in x.iter().zip(&y) {
            assert!((spline.value(*xi) - yi).abs() < 1.0e-10);
        }
        // interior derivative of x^3 - x is 3x^2 - 1
        let d = spline.derivative(1.0);
        assert!((d - 2.0).abs() < 5.0e-3, "derivative {d}");
        let dd = spline.second_derivative(1.0);
        assert!((dd - 6.0).abs() < 5.0e-2, "second derivative {dd}");
    }

    #[test]
    fn spline_rejects_unsorted_nodes() {
        assert!(CubicSpline::new(vec![0.0, 0.0, 1.0], vec![1.0, 2.0, 3.0]).is_err());
        assert!(CubicSpline::new(vec![0.0, 1.0], vec![1.0, 2.0]).is_err());
    }
}
