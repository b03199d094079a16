//! Tensor product of per-axis meshes.

use crate::core::FdmError;
use crate::mesher::{GridLayout, Mesh1d};

/// N-dimensional mesher owning one [`Mesh1d`] per layout axis.
#[derive(Debug, Clone)]
pub struct GridMesher {
    layout: GridLayout,
    axes: Vec<Mesh1d>,
}

impl GridMesher {
    /// Pairs a layout with per-axis meshes; fails if any mesh size
    /// disagrees with the corresponding layout dimension.
    pub fn new(layout: GridLayout, axes: Vec<Mesh1d>) -> Result<Self, FdmError> {
        if axes.len() != layout.dimensions() {
            return Err(FdmError::InvalidInput(format!(
                "layout has {} axes but {} meshes were supplied",
                layout.dimensions(),
                axes.len()
            )));
        }
        for (i, (mesh, &dim)) in axes.iter().zip(layout.dims()).enumerate() {
            if mesh.size() != dim {
                return Err(FdmError::InvalidInput(format!(
                    "axis {i}: mesh has {} nodes, layout expects {dim}",
                    mesh.size()
                )));
            }
        }
        Ok(Self { layout, axes })
    }

    /// Builds the layout implied by the mesh sizes.
    pub fn from_axes(axes: Vec<Mesh1d>) -> Result<Self, FdmError> {
        let layout = GridLayout::new(axes.iter().map(Mesh1d::size).collect())?;
        Self::new(layout, axes)
    }

    /// Grid layout.
    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    /// Spatial dimensionality.
    pub fn dimensions(&self) -> usize {
        self.layout.dimensions()
    }

    /// Per-axis mesh.
    pub fn axis(&self, axis: usize) -> &Mesh1d {
        &self.axes[axis]
    }

    /// Node location along `axis` for the cell at `coords`.
    pub fn location(&self, coords: &[usize], axis: usize) -> f64 {
        self.axes[axis].location(coords[axis])
    }

    /// Forward spacing along `axis` for the cell at `coords`.
    pub fn dplus(&self, coords: &[usize], axis: usize) -> f64 {
        self.axes[axis].dplus(coords[axis])
    }

    /// Backward spacing along `axis` for the cell at `coords`.
    pub fn dminus(&self, coords: &[usize], axis: usize) -> f64 {
        self.axes[axis].dminus(coords[axis])
    }
}
