//! First and second derivative operators on non-uniform meshes.
//!
//! Interior rows use the standard three-point non-uniform stencils; the
//! first derivative falls back to one-sided differences at the mesh edges,
//! while the second derivative zeroes its edge rows entirely (boundary
//! conditions own those rows).

use crate::core::FdmError;
use crate::mesher::GridMesher;
use crate::operator::TripleBandOp;

/// Upwind/central first-derivative operator along `direction`.
pub fn first_derivative(
    mesher: &GridMesher,
    direction: usize,
) -> Result<TripleBandOp, FdmError> {
    let mut op = TripleBandOp::new(mesher, direction)?;
    let layout = mesher.layout().clone();
    let last = layout.dims()[direction] - 1;
    let (lower, diag, upper) = op.bands_mut();
    for cell in layout.cells() {
        let i = cell.index;
        let c = cell.coords[direction];
        if c == 0 {
            // one-sided forward difference
            let hp = mesher.dplus(&cell.coords, direction);
            lower[i] = 0.0;
            diag[i] = -1.0 / hp;
            upper[i] = 1.0 / hp;
        } else if c == last {
            // one-sided backward difference
            let hm = mesher.dminus(&cell.coords, direction);
            lower[i] = -1.0 / hm;
            diag[i] = 1.0 / hm;
            upper[i] = 0.0;
        } else {
            let hm = mesher.dminus(&cell.coords, direction);
            let hp = mesher.dplus(&cell.coords, direction);
            lower[i] = -hp / (hm * (hm + hp));
            diag[i] = (hp - hm) / (hm * hp);
            upper[i] = hm / (hp * (hm + hp));
        }
    }
    Ok(op)
}

/// Central second-derivative operator along `direction`; edge rows are
/// zero.
pub fn second_derivative(
    mesher: &GridMesher,
    direction: usize,
) -> Result<TripleBandOp, FdmError> {
    let mut op = TripleBandOp::new(mesher, direction)?;
    let layout = mesher.layout().clone();
    let last = layout.dims()[direction] - 1;
    let (lower, diag, upper) = op.bands_mut();
    for cell in layout.cells() {
        let i = cell.index;
        let c = cell.coords[direction];
        if c == 0 || c == last {
            lower[i] = 0.0;
            diag[i] = 0.0;
            upper[i] = 0.0;
        } else {
            let hm = mesher.dminus(&cell.coords, direction);
            let hp = mesher.dplus(&cell.coords, direction);
            lower[i] = 2.0 / (hm * (hm + hp));
            diag[i] = -2.0 / (hm * hp);
            upper[i] = 2.0 / (hp * (hm + hp));
        }
    }
    Ok(op)
}
