//! Stabilized bi-conjugate gradient solver.
//!
//! Matrix-free: the operator and optional preconditioner are closures over
//! value arrays. See van der Vorst (1992) and Saad, *Iterative Methods for
//! Sparse Linear Systems* (2003), ch. 7.

use crate::core::FdmError;

/// Result of a converged Krylov solve.
#[derive(Debug, Clone)]
pub struct KrylovResult {
    /// Solution vector.
    pub x: Vec<f64>,
    /// Final relative residual `‖b - Ax‖ / ‖b‖`.
    pub error: f64,
    /// Iterations consumed.
    pub iterations: usize,
}

pub(crate) fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(&x, &y)| x * y).sum()
}

pub(crate) fn norm2(a: &[f64]) -> f64 {
    dot(a, a).sqrt()
}

/// BiCGStab solver over a linear operator `a` with an optional left
/// preconditioner `m`.
pub struct BiCgStab<'a> {
    a: &'a dyn Fn(&[f64]) -> Vec<f64>,
    m: Option<&'a dyn Fn(&[f64]) -> Vec<f64>>,
    max_iter: usize,
    rel_tol: f64,
}

impl<'a> BiCgStab<'a> {
    /// Creates a solver with the given operator, iteration cap, relative
    /// tolerance, and optional preconditioner.
    pub fn new(
        a: &'a dyn Fn(&[f64]) -> Vec<f64>,
        max_iter: usize,
        rel_tol: f64,
        preconditioner: Option<&'a dyn Fn(&[f64]) -> Vec<f64>>,
    ) -> Self {
        Self {
            a,
            m: preconditioner,
            max_iter,
            rel_tol,
        }
    }

    /// Solves `A x = b` starting from `x0`, failing on a degenerate
    /// recurrence or a non-converged residual.
    pub fn solve(&self, b: &[f64], x0: &[f64]) -> Result<KrylovResult, FdmError> {
        let n = b.len();
        if x0.len() != n {
            return Err(FdmError::InvalidInput(
                "bicgstab rhs and initial guess must have equal lengths".to_string(),
            ));
        }
        let norm_b = norm2(b);
        if norm_b == 0.0 {
            return Ok(KrylovResult {
                x: vec![0.0; n],
                error: 0.0,
                iterations: 0,
            });
        }

        let mut x = x0.to_vec();
        let ax = (self.a)(&x);
        let mut r: Vec<f64> = b.iter().zip(&ax).map(|(&bi, &ai)| bi - ai).collect();
        let r_tld = r.clone();
        let mut error = norm2(&r) / norm_b;
        if error < self.rel_tol {
            return Ok(KrylovResult {
                x,
                error,
                iterations: 0,
            });
        }

        let mut p = vec![0.0; n];
        let mut v = vec![0.0; n];
        let mut rho_last = 1.0;
        let mut alpha = 1.0;
        let mut omega = 1.0;

        for i in 1..=self.max_iter {
            let rho = dot(&r_tld, &r);
            if rho == 0.0 {
                return Err(FdmError::NumericalError(
                    "bicgstab breakdown: rho = 0".to_string(),
                ));
            }
            if i == 1 {
                p.copy_from_slice(&r);
            } else {
                let beta = (rho / rho_last) * (alpha / omega);
                for k in 0..n {
                    p[k] = r[k] + beta * (p[k] - omega * v[k]);
                }
            }
            let p_tld = match self.m {
                Some(m) => m(&p),
                None => p.clone(),
            };
            v = (self.a)(&p_tld);
            let denom = dot(&r_tld, &v);
            if denom == 0.0 {
                return Err(FdmError::NumericalError(
                    "bicgstab breakdown: r~ orthogonal to v".to_string(),
                ));
            }
            alpha = rho / denom;
            let s: Vec<f64> = r.iter().zip(&v).map(|(&ri, &vi)| ri - alpha * vi).collect();
            if norm2(&s) < self.rel_tol * norm_b {
                for k in 0..n {
                    x[k] += alpha * p_tld[k];
                }
                let ax = (self.a)(&x);
                error = b
                    .iter()
                    .zip(&ax)
                    .map(|(&bi, &ai)| (bi - ai) * (bi - ai))
                    .sum::<f64>()
                    .sqrt()
                    / norm_b;
                return Ok(KrylovResult {
                    x,
                    error,
                    iterations: i,
                });
            }
            let s_tld = match self.m {
                Some(m) => m(&s),
                None => s.clone(),
            };
            let t = (self.a)(&s_tld);
            let tt = dot(&t, &t);
            if tt == 0.0 {
                return Err(FdmError::NumericalError(
                    "bicgstab breakdown: t = 0".to_string(),
                ));
            }
            omega = dot(&t, &s) / tt;
            if omega == 0.0 {
                return Err(FdmError::NumericalError(
                    "bicgstab breakdown: omega = 0".to_string(),
                ));
            }
            for k in 0..n {
                x[k] += alpha * p_tld[k] + omega * s_tld[k];
                r[k] = s[k] - omega * t[k];
            }
            rho_last = rho;
            error = norm2(&r) / norm_b;
            if error < self.rel_tol {
                return Ok(KrylovResult {
                    x,
                    error,
                    iterations: i,
                });
            }
        }
        Err(FdmError::ConvergenceFailure(format!(
            "bicgstab did not converge in {} iterations (residual {:.3e})",
            self.max_iter, error
        )))
    }
}
