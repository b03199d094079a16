//! Recursive adaptive Simpson quadrature.
//!
//! Used to average payoffs over a grid cell when building terminal values;
//! the recursion splits any subinterval whose Simpson/Richardson error
//! estimate exceeds the budgeted tolerance.

use crate::core::FdmError;

const MAX_DEPTH: usize = 30;

/// Adaptive Simpson integral of `f` over `[a, b]` to absolute accuracy
/// `tol`.
pub fn simpson_adaptive<F: Fn(f64) -> f64>(
    f: &F,
    a: f64,
    b: f64,
    tol: f64,
) -> Result<f64, FdmError> {
    if !a.is_finite() || !b.is_finite() || tol <= 0.0 {
        return Err(FdmError::InvalidInput(
            "simpson needs finite bounds and tol > 0".to_string(),
        ));
    }
    if a == b {
        return Ok(0.0);
    }
    let fa = f(a);
    let fb = f(b);
    let mid = 0.5 * (a + b);
    let fm = f(mid);
    let whole = (b - a) / 6.0 * (fa + 4.0 * fm + fb);
    recurse(f, a, b, fa, fb, fm, whole, tol, MAX_DEPTH)
}

#[allow(clippy::too_many_arguments)]
fn recurse<F: Fn(f64) -> f64>(
    f: &F,
    a: f64,
    b: f64,
    fa: f64,
    fb: f64,
    fm: f64,
    whole: f64,
    tol: f64,
    depth: usize,
) -> Result<f64, FdmError> {
    let mid = 0.5 * (a + b);
    let lm = 0.5 * (a + mid);
    let rm = 0.5 * (mid + b);
    let flm = f(lm);
    let frm = f(rm);
    let left = (mid - a) / 6.0 * (fa + 4.0 * flm + fm);
    let right = (b - mid) / 6.0 * (fm + 4.0 * frm + fb);
    let delta = left + right - whole;
    if delta.abs() <= 15.0 * tol {
        return Ok(left + right + delta / 15.0);
    }
    if depth == 0 {
        return Err(FdmError::ConvergenceFailure(
            "adaptive simpson exceeded its recursion depth".to_string(),
        ));
    }
    let l = recurse(f, a, mid, fa, fm, flm, left, 0.5 * tol, depth - 1)?;
    let r = recurse(f, mid, b, fm, fb, frm, right, 0.5 * tol, depth - 1)?;
    Ok(l + r)
}
