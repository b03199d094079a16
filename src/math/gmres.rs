//! Restarted GMRES with Givens-rotation least squares.
//!
//! Matrix-free like [`BiCgStab`](crate::math::bicgstab::BiCgStab); maintains
//! a growing orthonormal Arnoldi basis per restart cycle. See Saad and
//! Schultz (1986).

use crate::core::FdmError;
use crate::math::bicgstab::{dot, norm2, KrylovResult};

/// Restarted GMRES solver over a linear operator `a` with an optional right
/// preconditioner `m`.
pub struct Gmres<'a> {
    a: &'a dyn Fn(&[f64]) -> Vec<f64>,
    m: Option<&'a dyn Fn(&[f64]) -> Vec<f64>>,
    max_iter: usize,
    rel_tol: f64,
    restarts: usize,
}

impl<'a> Gmres<'a> {
    /// Creates a solver running up to `max_iter` Arnoldi steps per cycle.
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
            restarts: 10,
        }
    }

    /// Sets the number of restart cycles (default 10).
    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts.max(1);
        self
    }

    /// Solves `A x = b` starting from `x0`; fails if the residual still
    /// exceeds the tolerance after the iteration and restart budgets.
    pub fn solve(&self, b: &[f64], x0: &[f64]) -> Result<KrylovResult, FdmError> {
        if self.max_iter == 0 {
            return Err(FdmError::InvalidInput(
                "gmres needs max_iter >= 1".to_string(),
            ));
        }
        if b.len() != x0.len() {
            return Err(FdmError::InvalidInput(
                "gmres rhs and initial guess must have equal lengths".to_string(),
            ));
        }
        let norm_b = norm2(b);
        if norm_b == 0.0 {
            return Ok(KrylovResult {
                x: vec![0.0; b.len()],
                error: 0.0,
                iterations: 0,
            });
        }

        let mut x = x0.to_vec();
        let mut total_iterations = 0;
        let mut error = f64::INFINITY;
        for _ in 0..self.restarts {
            let (x_cycle, err_cycle, its) = self.cycle(b, &x, norm_b)?;
            x = x_cycle;
            error = err_cycle;
            total_iterations += its;
            if error < self.rel_tol {
                return Ok(KrylovResult {
                    x,
                    error,
                    iterations: total_iterations,
                });
            }
        }
        Err(FdmError::ConvergenceFailure(format!(
            "gmres did not converge within {} restarts (residual {:.3e})",
            self.restarts, error
        )))
    }

    /// One restart cycle: Arnoldi expansion with modified Gram-Schmidt and
    /// incremental Givens rotations on the Hessenberg columns.
    fn cycle(
        &self,
        b: &[f64],
        x0: &[f64],
        norm_b: f64,
    ) -> Result<(Vec<f64>, f64, usize), FdmError> {
        let n = b.len();
        let ax = (self.a)(x0);
        let r0: Vec<f64> = b.iter().zip(&ax).map(|(&bi, &ai)| bi - ai).collect();
        let beta = norm2(&r0);
        if beta == 0.0 {
            return Ok((x0.to_vec(), 0.0, 0));
        }

        let m = self.max_iter.min(n);
        let mut basis: Vec<Vec<f64>> = Vec::with_capacity(m + 1);
        basis.push(r0.iter().map(|&v| v / beta).collect());
        // rotated Hessenberg columns (upper triangular R, one column per step)
        let mut r_cols: Vec<Vec<f64>> = Vec::with_capacity(m);
        let mut cs: Vec<f64> = Vec::with_capacity(m);
        let mut sn: Vec<f64> = Vec::with_capacity(m);
        let mut g = vec![0.0; m + 1];
        g[0] = beta;

        let mut steps = 0;
        let mut residual = beta / norm_b;
        for j in 0..m {
            let z = match self.m {
                Some(precond) => precond(&basis[j]),
                None => basis[j].clone(),
            };
            let mut w = (self.a)(&z);
            let mut col = vec![0.0; j + 2];
            for (i, q) in basis.iter().enumerate() {
                let hij = dot(&w, q);
                col[i] = hij;
                for k in 0..n {
                    w[k] -= hij * q[k];
                }
            }
            let h_next = norm2(&w);
            col[j + 1] = h_next;

            // previously accumulated rotations
            for i in 0..j {
                let t = cs[i] * col[i] + sn[i] * col[i + 1];
                col[i + 1] = -sn[i] * col[i] + cs[i] * col[i + 1];
                col[i] = t;
            }
            // new rotation zeroing the subdiagonal entry
            let denom = col[j].hypot(col[j + 1]);
            if denom == 0.0 {
                return Err(FdmError::NumericalError(
                    "gmres breakdown: zero hessenberg column".to_string(),
                ));
            }
            let c = col[j] / denom;
            let s = col[j + 1] / denom;
            col[j] = denom;
            col[j + 1] = 0.0;
            cs.push(c);
            sn.push(s);
            g[j + 1] = -s * g[j];
            g[j] *= c;

            r_cols.push(col);
            steps = j + 1;
            residual = g[j + 1].abs() / norm_b;
            if residual < self.rel_tol || h_next == 0.0 {
                break;
            }
            basis.push(w.iter().map(|&v| v / h_next).collect());
        }

        // back substitution on R y = g
        let mut y = vec![0.0; steps];
        for i in (0..steps).rev() {
            let mut sum = g[i];
            for (k, yk) in y.iter().enumerate().skip(i + 1) {
                sum -= r_cols[k][i] * yk;
            }
            y[i] = sum / r_cols[i][i];
        }

        // x = x0 + M(V y); the preconditioner is linear, so applying it to
        // the combined update is equivalent to combining preconditioned
        // basis vectors
        let mut update = vec![0.0; n];
        for (yk, q) in y.iter().zip(&basis) {
            for i in 0..n {
                update[i] += yk * q[i];
            }
        }
        let update = match self.m {
            Some(precond) => precond(&update),
            None => update,
        };
        let x: Vec<f64> = x0.iter().zip(&update).map(|(&xi, &ui)| xi + ui).collect();
        Ok((x, residual, steps))
    }
}
