//! Flat-index layout of an N-dimensional grid.
//!
//! Maps integer coordinates to a flat storage index through mixed-radix
//! strides, iterates cells in lexicographic order (axis 0 fastest), and
//! resolves neighbour indices with reflection at the grid edges so that
//! derivative stencils never read out of bounds.

use crate::core::FdmError;

/// Ordered per-axis sizes plus derived strides of an N-dimensional grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridLayout {
    dims: Vec<usize>,
    strides: Vec<usize>,
    size: usize,
}

impl GridLayout {
    /// Builds a layout from per-axis sizes; every axis needs at least two
    /// points.
    pub fn new(dims: Vec<usize>) -> Result<Self, FdmError> {
        if dims.is_empty() {
            return Err(FdmError::InvalidInput(
                "layout needs at least one axis".to_string(),
            ));
        }
        if dims.iter().any(|&d| d < 2) {
            return Err(FdmError::InvalidInput(
                "every layout axis needs at least two points".to_string(),
            ));
        }
        let mut strides = Vec::with_capacity(dims.len());
        let mut size = 1usize;
        for &d in &dims {
            strides.push(size);
            size = size.checked_mul(d).ok_or_else(|| {
                FdmError::InvalidInput("layout size overflows usize".to_string())
            })?;
        }
        Ok(Self {
            dims,
            strides,
            size,
        })
    }

    /// Number of grid points.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Per-axis sizes.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Mixed-radix strides; `strides()[0] == 1`.
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Spatial dimensionality.
    pub fn dimensions(&self) -> usize {
        self.dims.len()
    }

    /// Flat index of a coordinate tuple: `sum(coords[i] * strides[i])`.
    pub fn index(&self, coords: &[usize]) -> usize {
        debug_assert_eq!(coords.len(), self.dims.len());
        coords
            .iter()
            .zip(&self.strides)
            .map(|(&c, &s)| c * s)
            .sum()
    }

    /// Flat index of the cell offset by `offset` along `axis`, with the
    /// offset reflected back into range at either boundary: index `-k`
    /// becomes `k`, index `dim-1+k` becomes `dim-1-k`.
    pub fn neighbour(&self, coords: &[usize], axis: usize, offset: isize) -> usize {
        let base = self.index(coords) - coords[axis] * self.strides[axis];
        base + self.reflect(axis, coords[axis] as isize + offset) * self.strides[axis]
    }

    /// Neighbour offset along two distinct axes at once, both reflected;
    /// used by mixed-derivative stencils.
    pub fn neighbour2(
        &self,
        coords: &[usize],
        axis1: usize,
        offset1: isize,
        axis2: usize,
        offset2: isize,
    ) -> usize {
        debug_assert_ne!(axis1, axis2);
        let base = self.index(coords)
            - coords[axis1] * self.strides[axis1]
            - coords[axis2] * self.strides[axis2];
        base + self.reflect(axis1, coords[axis1] as isize + offset1) * self.strides[axis1]
            + self.reflect(axis2, coords[axis2] as isize + offset2) * self.strides[axis2]
    }

    fn reflect(&self, axis: usize, coord: isize) -> usize {
        let dim = self.dims[axis] as isize;
        let r = if coord < 0 {
            -coord
        } else if coord >= dim {
            2 * (dim - 1) - coord
        } else {
            coord
        };
        debug_assert!((0..dim).contains(&r));
        r as usize
    }

    /// Iterates all cells in lexicographic order, axis 0 incrementing
    /// fastest.
    pub fn cells(&self) -> CellIter<'_> {
        CellIter {
            layout: self,
            coords: vec![0; self.dims.len()],
            index: 0,
        }
    }
}

/// A flat index paired with its coordinate tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridCell {
    /// Flat storage index.
    pub index: usize,
    /// Per-axis coordinates.
    pub coords: Vec<usize>,
}

/// Lexicographic cell iterator with carry across axes.
#[derive(Debug)]
pub struct CellIter<'a> {
    layout: &'a GridLayout,
    coords: Vec<usize>,
    index: usize,
}

impl Iterator for CellIter<'_> {
    type Item = GridCell;

    fn next(&mut self) -> Option<GridCell> {
        if self.index >= self.layout.size {
            return None;
        }
        let cell = GridCell {
            index: self.index,
            coords: self.coords.clone(),
        };
        self.index += 1;
        for (c, &d) in self.coords.iter_mut().zip(&self.layout.dims) {
            *c += 1;
            if *c < d {
                break;
            }
            *c = 0;
        }
        Some(cell)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.layout.size - self.index;
        (left, Some(left))
    }
}

impl ExactSizeIterator for CellIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_is_dot_product_of_coords_and_strides() {
        let layout = GridLayout::new(vec![4, 3, 2]).unwrap();
        assert_eq!(layout.strides(), &[1, 4, 12]);
        assert_eq!(layout.size(), 24);
        for cell in layout.cells() {
            let dot: usize = cell
                .coords
                .iter()
                .zip(layout.strides())
                .map(|(&c, &s)| c * s)
                .sum();
            assert_eq!(cell.index, dot);
        }
    }

    #[test]
    fn iteration_is_lexicographic_axis0_fastest() {
        let layout = GridLayout::new(vec![3, 2]).unwrap();
        let coords: Vec<Vec<usize>> = layout.cells().map(|c| c.coords).collect();
        assert_eq!(
            coords,
            vec![
                vec![0, 0],
                vec![1, 0],
                vec![2, 0],
                vec![0, 1],
                vec![1, 1],
                vec![2, 1]
            ]
        );
    }

    #[test]
    fn neighbour_reflects_at_both_edges() {
        let layout = GridLayout::new(vec![5]).unwrap();
        // -k becomes k
        assert_eq!(layout.neighbour(&[0], 0, -1), 1);
        assert_eq!(layout.neighbour(&[0], 0, -2), 2);
        // dim-1+k becomes dim-1-k
        assert_eq!(layout.neighbour(&[4], 0, 1), 3);
        assert_eq!(layout.neighbour(&[4], 0, 2), 2);
        // interior offsets are plain shifts
        assert_eq!(layout.neighbour(&[2], 0, 1), 3);
        assert_eq!(layout.neighbour(&[2], 0, -1), 1);
    }

    #[test]
    fn neighbour2_moves_along_both_axes() {
        let layout = GridLayout::new(vec![4, 4]).unwrap();
        let idx = layout.neighbour2(&[1, 1], 0, 1, 1, 1);
        assert_eq!(idx, layout.index(&[2, 2]));
        let reflected = layout.neighbour2(&[0, 3], 0, -1, 1, 1);
        assert_eq!(reflected, layout.index(&[1, 2]));
    }

    #[test]
    fn rejects_degenerate_axes() {
        assert!(GridLayout::new(vec![]).is_err());
        assert!(GridLayout::new(vec![4, 1]).is_err());
    }
}
