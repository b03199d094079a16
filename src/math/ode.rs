//! Embedded adaptive Runge-Kutta integration.
//!
//! Cash-Karp 4(5) pair with step-size control, integrating in either time
//! direction. Drives the method-of-lines scheme and the multi-point
//! concentrating mesher transform.

use crate::core::FdmError;

const SAFETY: f64 = 0.9;
const P_GROW: f64 = -0.2;
const P_SHRINK: f64 = -0.25;
// (5/SAFETY)^(1/P_GROW): below this error the step may grow by up to 5x
const ERR_CON: f64 = 1.89e-4;
const TINY: f64 = 1.0e-30;
const MAX_STEPS: usize = 10_000;

/// Adaptive Cash-Karp Runge-Kutta integrator with relative error control.
#[derive(Debug, Clone, Copy)]
pub struct AdaptiveRungeKutta {
    eps: f64,
    initial_step: f64,
    min_step: f64,
}

impl AdaptiveRungeKutta {
    /// Creates an integrator with error tolerance `eps` and a first trial
    /// step of `initial_step` (its sign is taken from the integration
    /// direction).
    pub fn new(eps: f64, initial_step: f64) -> Result<Self, FdmError> {
        if !eps.is_finite() || eps <= 0.0 || !initial_step.is_finite() || initial_step == 0.0 {
            return Err(FdmError::InvalidInput(
                "adaptive runge-kutta needs eps > 0 and a nonzero initial step".to_string(),
            ));
        }
        Ok(Self {
            eps,
            initial_step,
            min_step: 0.0,
        })
    }

    /// Integrates `dy/dx = f(x, y)` from `x1` to `x2` (either direction)
    /// starting at `y1`.
    pub fn integrate<F>(&self, f: &F, y1: &[f64], x1: f64, x2: f64) -> Result<Vec<f64>, FdmError>
    where
        F: Fn(f64, &[f64]) -> Vec<f64>,
    {
        let mut x = x1;
        let mut y = y1.to_vec();
        let mut h = self.initial_step.abs().copysign(x2 - x1);
        if x1 == x2 {
            return Ok(y);
        }

        for _ in 0..MAX_STEPS {
            let dydx = f(x, &y);
            let yscal: Vec<f64> = y
                .iter()
                .zip(&dydx)
                .map(|(&yi, &di)| yi.abs() + (di * h).abs() + TINY)
                .collect();
            // clamp the trial step at the interval end
            if (x + h - x2) * (x + h - x1) > 0.0 {
                h = x2 - x;
            }
            let (x_next, h_next) = self.controlled_step(f, &mut y, &dydx, x, h, &yscal)?;
            x = x_next;
            h = h_next;
            if (x - x2) * (x2 - x1) >= 0.0 {
                return Ok(y);
            }
        }
        Err(FdmError::ConvergenceFailure(
            "adaptive runge-kutta exceeded its step budget".to_string(),
        ))
    }

    /// Scalar convenience wrapper around [`integrate`](Self::integrate).
    pub fn integrate_scalar<F>(&self, f: &F, y1: f64, x1: f64, x2: f64) -> Result<f64, FdmError>
    where
        F: Fn(f64, f64) -> f64,
    {
        let wrapped = |x: f64, y: &[f64]| vec![f(x, y[0])];
        Ok(self.integrate(&wrapped, &[y1], x1, x2)?[0])
    }

    fn controlled_step<F>(
        &self,
        f: &F,
        y: &mut Vec<f64>,
        dydx: &[f64],
        x: f64,
        h_try: f64,
        yscal: &[f64],
    ) -> Result<(f64, f64), FdmError>
    where
        F: Fn(f64, &[f64]) -> Vec<f64>,
    {
        let mut h = h_try;
        loop {
            let (y_out, y_err) = cash_karp_step(f, y, dydx, x, h);
            let err_max = y_err
                .iter()
                .zip(yscal)
                .map(|(&e, &s)| (e / s).abs())
                .fold(0.0_f64, f64::max)
                / self.eps;
            if err_max <= 1.0 {
                let h_next = if err_max > ERR_CON {
                    SAFETY * h * err_max.powf(P_GROW)
                } else {
                    5.0 * h
                };
                *y = y_out;
                return Ok((x + h, h_next));
            }
            let h_shrunk = SAFETY * h * err_max.powf(P_SHRINK);
            h = if h >= 0.0 {
                h_shrunk.max(0.1 * h)
            } else {
                h_shrunk.min(0.1 * h)
            };
            if x + h == x || h.abs() <= self.min_step {
                return Err(FdmError::NumericalError(
                    "step size underflow in adaptive runge-kutta".to_string(),
                ));
            }
        }
    }
}

/// One Cash-Karp step: returns the 5th-order estimate and the embedded
/// 4th/5th-order error.
fn cash_karp_step<F>(f: &F, y: &[f64], dydx: &[f64], x: f64, h: f64) -> (Vec<f64>, Vec<f64>)
where
    F: Fn(f64, &[f64]) -> Vec<f64>,
{
    const A2: f64 = 0.2;
    const A3: f64 = 0.3;
    const A4: f64 = 0.6;
    const A5: f64 = 1.0;
    const A6: f64 = 0.875;
    const B21: f64 = 0.2;
    const B31: f64 = 3.0 / 40.0;
    const B32: f64 = 9.0 / 40.0;
    const B41: f64 = 0.3;
    const B42: f64 = -0.9;
    const B43: f64 = 1.2;
    const B51: f64 = -11.0 / 54.0;
    const B52: f64 = 2.5;
    const B53: f64 = -70.0 / 27.0;
    const B54: f64 = 35.0 / 27.0;
    const B61: f64 = 1631.0 / 55296.0;
    const B62: f64 = 175.0 / 512.0;
    const B63: f64 = 575.0 / 13824.0;
    const B64: f64 = 44275.0 / 110592.0;
    const B65: f64 = 253.0 / 4096.0;
    const C1: f64 = 37.0 / 378.0;
    const C3: f64 = 250.0 / 621.0;
    const C4: f64 = 125.0 / 594.0;
    const C6: f64 = 512.0 / 1771.0;
    const DC1: f64 = C1 - 2825.0 / 27648.0;
    const DC3: f64 = C3 - 18575.0 / 48384.0;
    const DC4: f64 = C4 - 13525.0 / 55296.0;
    const DC5: f64 = -277.0 / 14336.0;
    const DC6: f64 = C6 - 0.25;

    let n = y.len();
    let stage = |coeffs: &[(f64, &[f64])]| -> Vec<f64> {
        (0..n)
            .map(|i| {
                y[i] + h * coeffs.iter().map(|&(c, k)| c * k[i]).sum::<f64>()
            })
            .collect()
    };

    let k2 = f(x + A2 * h, &stage(&[(B21, dydx)]));
    let k3 = f(x + A3 * h, &stage(&[(B31, dydx), (B32, &k2)]));
    let k4 = f(x + A4 * h, &stage(&[(B41, dydx), (B42, &k2), (B43, &k3)]));
    let k5 = f(
        x + A5 * h,
        &stage(&[(B51, dydx), (B52, &k2), (B53, &k3), (B54, &k4)]),
    );
    let k6 = f(
        x + A6 * h,
        &stage(&[(B61, dydx), (B62, &k2), (B63, &k3), (B64, &k4), (B65, &k5)]),
    );

    let mut y_out = Vec::with_capacity(n);
    let mut y_err = Vec::with_capacity(n);
    for i in 0..n {
        y_out.push(y[i] + h * (C1 * dydx[i] + C3 * k3[i] + C4 * k4[i] + C6 * k6[i]));
        y_err.push(h * (DC1 * dydx[i] + DC3 * k3[i] + DC4 * k4[i] + DC5 * k5[i] + DC6 * k6[i]));
    }
    (y_out, y_err)
}
