//! Banded linear operator with immediate-neighbour coupling along one axis.
//!
//! Stores three coefficients per grid point plus precomputed neighbour flat
//! indices (reflected at the edges) and a reverse-index permutation that
//! linearizes every grid line parallel to the operator's axis into a
//! contiguous run, so the banded solve is a sequence of independent Thomas
//! eliminations.

use nalgebra::DMatrix;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::core::FdmError;
use crate::mesher::{GridLayout, GridMesher};

/// Triple-band operator along one grid axis.
#[derive(Debug, Clone)]
pub struct TripleBandOp {
    direction: usize,
    size: usize,
    run_length: usize,
    i0: Vec<usize>,
    i2: Vec<usize>,
    reverse_index: Vec<usize>,
    lower: Vec<f64>,
    diag: Vec<f64>,
    upper: Vec<f64>,
}

impl TripleBandOp {
    /// Zero operator along `direction`, with neighbour indices and the
    /// line permutation precomputed from the mesher's layout.
    pub fn new(mesher: &GridMesher, direction: usize) -> Result<Self, FdmError> {
        let layout = mesher.layout();
        if direction >= layout.dimensions() {
            return Err(FdmError::InvalidInput(format!(
                "direction {direction} out of range for a {}-dimensional layout",
                layout.dimensions()
            )));
        }
        let size = layout.size();
        let mut i0 = vec![0usize; size];
        let mut i2 = vec![0usize; size];
        let mut reverse_index = vec![0usize; size];

        // strides of the layout with `direction` swapped to the front make
        // the operator's axis the fastest-running index
        let mut permuted_dims = layout.dims().to_vec();
        permuted_dims.swap(0, direction);
        let permuted = GridLayout::new(permuted_dims)?;
        let mut permuted_strides = permuted.strides().to_vec();
        permuted_strides.swap(0, direction);

        for cell in layout.cells() {
            i0[cell.index] = layout.neighbour(&cell.coords, direction, -1);
            i2[cell.index] = layout.neighbour(&cell.coords, direction, 1);
            let permuted_index: usize = cell
                .coords
                .iter()
                .zip(&permuted_strides)
                .map(|(&c, &s)| c * s)
                .sum();
            reverse_index[permuted_index] = cell.index;
        }

        Ok(Self {
            direction,
            size,
            run_length: layout.dims()[direction],
            i0,
            i2,
            reverse_index,
            lower: vec![0.0; size],
            diag: vec![0.0; size],
            upper: vec![0.0; size],
        })
    }

    /// Operator axis.
    pub fn direction(&self) -> usize {
        self.direction
    }

    /// Number of grid points.
    pub fn size(&self) -> usize {
        self.size
    }

    pub(crate) fn bands_mut(&mut self) -> (&mut [f64], &mut [f64], &mut [f64]) {
        (&mut self.lower, &mut self.diag, &mut self.upper)
    }

    /// Overwrites the three band coefficients of row `i`; the hook used by
    /// boundary conditions to pin edge rows.
    pub fn set_row(&mut self, i: usize, lower: f64, diag: f64, upper: f64) {
        self.lower[i] = lower;
        self.diag[i] = diag;
        self.upper[i] = upper;
    }

    /// Flat index of the lower neighbour of point `i` (reflected at the
    /// boundary).
    pub fn lower_neighbour(&self, i: usize) -> usize {
        self.i0[i]
    }

    /// Flat index of the upper neighbour of point `i` (reflected at the
    /// boundary).
    pub fn upper_neighbour(&self, i: usize) -> usize {
        self.i2[i]
    }

    /// `result[i] = lower[i]·v[i0[i]] + diag[i]·v[i] + upper[i]·v[i2[i]]`.
    pub fn apply(&self, v: &[f64]) -> Vec<f64> {
        debug_assert_eq!(v.len(), self.size);
        let body = |i: usize| {
            self.lower[i] * v[self.i0[i]] + self.diag[i] * v[i] + self.upper[i] * v[self.i2[i]]
        };
        #[cfg(feature = "parallel")]
        {
            (0..self.size).into_par_iter().map(body).collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            (0..self.size).map(body).collect()
        }
    }

    /// In-place affine combination `self = a ⊙ x + y + b` on the three
    /// bands; `a` and `b` may be absent (length 0), broadcast scalars
    /// (length 1), or per-point vectors.
    pub fn axpyb(
        &mut self,
        a: &[f64],
        x: &TripleBandOp,
        y: &TripleBandOp,
        b: &[f64],
    ) -> Result<(), FdmError> {
        let n = self.size;
        if x.size != n || y.size != n {
            return Err(FdmError::InvalidInput(
                "axpyb operands must share the operator size".to_string(),
            ));
        }
        if !matches!(a.len(), 0 | 1) && a.len() != n {
            return Err(FdmError::InvalidInput(
                "axpyb scale must have length 0, 1 or n".to_string(),
            ));
        }
        if !matches!(b.len(), 0 | 1) && b.len() != n {
            return Err(FdmError::InvalidInput(
                "axpyb shift must have length 0, 1 or n".to_string(),
            ));
        }

        let scale = |s: &[f64], i: usize| -> f64 {
            match s.len() {
                0 => 0.0,
                1 => s[0],
                _ => s[i],
            }
        };
        for i in 0..n {
            if a.is_empty() {
                self.lower[i] = y.lower[i];
                self.diag[i] = y.diag[i] + scale(b, i);
                self.upper[i] = y.upper[i];
            } else {
                let ai = scale(a, i);
                self.lower[i] = ai * x.lower[i] + y.lower[i];
                self.diag[i] = ai * x.diag[i] + y.diag[i] + scale(b, i);
                self.upper[i] = ai * x.upper[i] + y.upper[i];
            }
        }
        Ok(())
    }

    /// Row scale by a diagonal matrix: every band entry of row `i` is
    /// multiplied by `u[i]` (`u` broadcasts when of length 1).
    pub fn mult(&self, u: &[f64]) -> TripleBandOp {
        debug_assert!(u.len() == 1 || u.len() == self.size);
        let at = |i: usize| if u.len() == 1 { u[0] } else { u[i] };
        let mut out = self.clone();
        for i in 0..self.size {
            let ui = at(i);
            out.lower[i] *= ui;
            out.diag[i] *= ui;
            out.upper[i] *= ui;
        }
        out
    }

    /// Column scale by a diagonal matrix on the right: band entries pick
    /// up the scale factor of the column (neighbour) they couple to.
    pub fn mult_r(&self, u: &[f64]) -> TripleBandOp {
        debug_assert!(u.len() == 1 || u.len() == self.size);
        let at = |i: usize| if u.len() == 1 { u[0] } else { u[i] };
        let mut out = self.clone();
        for i in 0..self.size {
            out.lower[i] *= at(self.i0[i]);
            out.diag[i] *= at(i);
            out.upper[i] *= at(self.i2[i]);
        }
        out
    }

    /// Elementwise band sum; both operators must discretize the same axis.
    pub fn add(&self, other: &TripleBandOp) -> TripleBandOp {
        debug_assert_eq!(self.direction, other.direction);
        debug_assert_eq!(self.size, other.size);
        let mut out = self.clone();
        for i in 0..self.size {
            out.lower[i] += other.lower[i];
            out.diag[i] += other.diag[i];
            out.upper[i] += other.upper[i];
        }
        out
    }

    /// Solves `(a·A + b·I) x = r` by Thomas elimination, independently per
    /// grid line parallel to the operator's axis.
    ///
    /// Fails with `NumericalError` on a vanishing pivot and with
    /// `InvalidInput` when a run edge still couples to its reflected
    /// neighbour (such a row cannot be represented in a tridiagonal
    /// elimination and must have been zeroed by the discretization or a
    /// boundary condition).
    pub fn solve_splitting(&self, r: &[f64], a: f64, b: f64) -> Result<Vec<f64>, FdmError> {
        if r.len() != self.size {
            return Err(FdmError::InvalidInput(
                "solve_splitting rhs length must match the operator size".to_string(),
            ));
        }
        let mut out = vec![0.0; self.size];
        let mut c_star = vec![0.0; self.run_length];
        let mut d_star = vec![0.0; self.run_length];

        for run in self.reverse_index.chunks_exact(self.run_length) {
            let first = run[0];
            let last = run[self.run_length - 1];
            if self.lower[first] != 0.0 || self.upper[last] != 0.0 {
                return Err(FdmError::InvalidInput(
                    "run edge row couples to a reflected neighbour; zero it before solving"
                        .to_string(),
                ));
            }

            let pivot = a * self.diag[first] + b;
            if pivot.abs() <= 1.0e-14 {
                return Err(FdmError::NumericalError(
                    "zero pivot in banded solve".to_string(),
                ));
            }
            c_star[0] = a * self.upper[first] / pivot;
            d_star[0] = r[first] / pivot;
            for (k, &idx) in run.iter().enumerate().skip(1) {
                let lower = a * self.lower[idx];
                let denom = a * self.diag[idx] + b - lower * c_star[k - 1];
                if denom.abs() <= 1.0e-14 {
                    return Err(FdmError::NumericalError(
                        "zero pivot in banded solve".to_string(),
                    ));
                }
                c_star[k] = a * self.upper[idx] / denom;
                d_star[k] = (r[idx] - lower * d_star[k - 1]) / denom;
            }

            out[last] = d_star[self.run_length - 1];
            for k in (0..self.run_length - 1).rev() {
                out[run[k]] = d_star[k] - c_star[k] * out[run[k + 1]];
            }
        }
        Ok(out)
    }

    /// Materializes the dense representation for diagnostics and tests.
    ///
    /// Reflected neighbour contributions accumulate into their target
    /// column, exactly as `apply` reads them.
    pub fn to_matrix(&self) -> DMatrix<f64> {
        let mut m = DMatrix::zeros(self.size, self.size);
        for i in 0..self.size {
            m[(i, self.i0[i])] += self.lower[i];
            m[(i, i)] += self.diag[i];
            m[(i, self.i2[i])] += self.upper[i];
        }
        m
    }
}
