//! Bracketing plus Brent root solve.
//!
//! Used by the concentrating mesher to pin the ODE scaling constant; the
//! bracket is expanded geometrically before handing over to Brent's
//! inverse-quadratic/bisection combination. See Press et al., *Numerical
//! Recipes*, ch. 9.3.

use crate::core::FdmError;

/// Expands `[a, b]` geometrically until `f` changes sign across it.
pub fn bracket_root<F: FnMut(f64) -> f64>(
    f: &mut F,
    mut a: f64,
    mut b: f64,
    max_expansions: usize,
) -> Result<(f64, f64), FdmError> {
    if a >= b {
        return Err(FdmError::InvalidInput(
            "bracket requires a < b".to_string(),
        ));
    }
    let mut fa = f(a);
    let mut fb = f(b);
    for _ in 0..max_expansions {
        if fa * fb <= 0.0 {
            return Ok((a, b));
        }
        if fa.abs() < fb.abs() {
            a += 1.6 * (a - b);
            fa = f(a);
        } else {
            b += 1.6 * (b - a);
            fb = f(b);
        }
    }
    Err(FdmError::ConvergenceFailure(
        "root bracketing exhausted its expansion budget".to_string(),
    ))
}

/// Brent's method on a sign-changing bracket `[a, b]`.
pub fn brent<F: FnMut(f64) -> f64>(
    f: &mut F,
    a: f64,
    b: f64,
    tol: f64,
    max_iter: usize,
) -> Result<f64, FdmError> {
    let (mut a, mut b) = (a, b);
    let (mut fa, mut fb) = (f(a), f(b));
    if fa * fb > 0.0 {
        return Err(FdmError::InvalidInput(
            "brent requires a sign change across the bracket".to_string(),
        ));
    }
    let (mut c, mut fc) = (a, fa);
    let mut d = b - a;
    let mut e = d;

    for _ in 0..max_iter {
        if fb.abs() > fc.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }
        let tol1 = 2.0 * f64::EPSILON * b.abs() + 0.5 * tol;
        let xm = 0.5 * (c - b);
        if xm.abs() <= tol1 || fb == 0.0 {
            return Ok(b);
        }
        if e.abs() >= tol1 && fa.abs() > fb.abs() {
            // inverse quadratic interpolation, falling back to secant
            let s = fb / fa;
            let (mut p, mut q);
            if a == c {
                p = 2.0 * xm * s;
                q = 1.0 - s;
            } else {
                let q0 = fa / fc;
                let r = fb / fc;
                p = s * (2.0 * xm * q0 * (q0 - r) - (b - a) * (r - 1.0));
                q = (q0 - 1.0) * (r - 1.0) * (s - 1.0);
            }
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();
            let min1 = 3.0 * xm * q - (tol1 * q).abs();
            let min2 = (e * q).abs();
            if 2.0 * p < min1.min(min2) {
                e = d;
                d = p / q;
            } else {
                d = xm;
                e = d;
            }
        } else {
            d = xm;
            e = d;
        }
        a = b;
        fa = fb;
        b += if d.abs() > tol1 {
            d
        } else {
            tol1.copysign(xm)
        };
        fb = f(b);
        if (fb > 0.0) == (fc > 0.0) {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
    }
    Err(FdmError::ConvergenceFailure(
        "brent exhausted its iteration budget".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brent_finds_cubic_root() {
        let mut f = |x: f64| x * x * x - 2.0 * x - 5.0;
        let root = brent(&mut f, 2.0, 3.0, 1.0e-12, 100).unwrap();
        assert!((f(root)).abs() < 1.0e-10);
        assert!((root - 2.0945514815).abs() < 1.0e-8);
    }

    #[test]
    fn bracket_expands_to_enclose_root() {
        let mut f = |x: f64| x - 10.0;
        let (a, b) = bracket_root(&mut f, 0.0, 1.0, 60).unwrap();
        assert!(f(a) * f(b) <= 0.0);
        let root = brent(&mut f, a, b, 1.0e-12, 100).unwrap();
        assert!((root - 10.0).abs() < 1.0e-9);
    }

    #[test]
    fn brent_rejects_unbracketed_interval() {
        let mut f = |x: f64| x * x + 1.0;
        assert!(brent(&mut f, -1.0, 1.0, 1.0e-12, 100).is_err());
    }
}
