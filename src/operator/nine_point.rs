//! Nine-point operator coupling two axes, and the mixed second-derivative
//! operator built on it.

use crate::core::FdmError;
use crate::mesher::GridMesher;

/// Sparse operator storing the 3x3 neighbourhood coupling of two axes.
#[derive(Debug, Clone)]
pub struct NinePointOp {
    size: usize,
    // neighbour flat indices and coefficients in row-major (j, k) order,
    // j offsetting the first axis and k the second, both in {-1, 0, +1}
    neighbours: Vec<[usize; 9]>,
    coeffs: Vec<[f64; 9]>,
}

impl NinePointOp {
    /// Zero nine-point operator over the axes `d1` and `d2`.
    pub fn new(mesher: &GridMesher, d1: usize, d2: usize) -> Result<Self, FdmError> {
        let layout = mesher.layout();
        if d1 >= layout.dimensions() || d2 >= layout.dimensions() || d1 == d2 {
            return Err(FdmError::InvalidInput(
                "nine-point operator needs two distinct valid axes".to_string(),
            ));
        }
        let size = layout.size();
        let mut neighbours = Vec::with_capacity(size);
        for cell in layout.cells() {
            let mut n = [0usize; 9];
            for (slot, item) in n.iter_mut().enumerate() {
                let j = (slot / 3) as isize - 1;
                let k = (slot % 3) as isize - 1;
                *item = layout.neighbour2(&cell.coords, d1, j, d2, k);
            }
            neighbours.push(n);
        }
        Ok(Self {
            size,
            neighbours,
            coeffs: vec![[0.0; 9]; size],
        })
    }

    /// Number of grid points.
    pub fn size(&self) -> usize {
        self.size
    }

    pub(crate) fn coeffs_mut(&mut self) -> &mut [[f64; 9]] {
        &mut self.coeffs
    }

    /// Applies the operator to a value array.
    pub fn apply(&self, v: &[f64]) -> Vec<f64> {
        debug_assert_eq!(v.len(), self.size);
        (0..self.size)
            .map(|i| {
                self.neighbours[i]
                    .iter()
                    .zip(&self.coeffs[i])
                    .map(|(&n, &c)| c * v[n])
                    .sum()
            })
            .collect()
    }

    /// Row scale by a diagonal matrix (`u` broadcasts when of length 1).
    pub fn mult(&self, u: &[f64]) -> NinePointOp {
        debug_assert!(u.len() == 1 || u.len() == self.size);
        let at = |i: usize| if u.len() == 1 { u[0] } else { u[i] };
        let mut out = self.clone();
        for (i, c) in out.coeffs.iter_mut().enumerate() {
            for entry in c.iter_mut() {
                *entry *= at(i);
            }
        }
        out
    }
}

/// Mixed second-derivative operator `∂²/∂x_{d1}∂x_{d2}`: the tensor
/// product of the two axes' first-derivative stencils, one-sided at the
/// edges.
pub fn mixed_derivative(
    mesher: &GridMesher,
    d1: usize,
    d2: usize,
) -> Result<NinePointOp, FdmError> {
    let mut op = NinePointOp::new(mesher, d1, d2)?;
    let layout = mesher.layout().clone();
    let weights = |axis: usize, coords: &[usize]| -> [f64; 3] {
        let c = coords[axis];
        let last = layout.dims()[axis] - 1;
        if c == 0 {
            let hp = mesher.dplus(coords, axis);
            [0.0, -1.0 / hp, 1.0 / hp]
        } else if c == last {
            let hm = mesher.dminus(coords, axis);
            [-1.0 / hm, 1.0 / hm, 0.0]
        } else {
            let hm = mesher.dminus(coords, axis);
            let hp = mesher.dplus(coords, axis);
            [
                -hp / (hm * (hm + hp)),
                (hp - hm) / (hm * hp),
                hm / (hp * (hm + hp)),
            ]
        }
    };
    let coeffs = op.coeffs_mut();
    for cell in layout.cells() {
        let w1 = weights(d1, &cell.coords);
        let w2 = weights(d2, &cell.coords);
        for j in 0..3 {
            for k in 0..3 {
                coeffs[cell.index][j * 3 + k] = w1[j] * w2[k];
            }
        }
    }
    Ok(op)
}
