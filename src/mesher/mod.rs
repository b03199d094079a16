//! Spatial meshers: per-axis node placement and the tensor-product
//! composite consumed by the operator algebra.

pub mod composite;
pub mod concentrating;
pub mod layout;
pub mod uniform;

pub use composite::GridMesher;
pub use concentrating::ConcentrationPoint;
pub use layout::{CellIter, GridCell, GridLayout};

/// Sentinel spacing stored at the first `dminus` and last `dplus` slot.
///
/// Interior stencils never read the boundary spacings; NaN makes any
/// accidental use immediately visible.
pub const SENTINEL_SPACING: f64 = f64::NAN;

/// Discretization of one spatial axis: node locations plus forward and
/// backward spacings.
///
/// Invariant: `dplus[i] == dminus[i+1] == locations[i+1] - locations[i]`
/// for every interior `i`; `dminus[0]` and `dplus[last]` hold
/// [`SENTINEL_SPACING`].
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh1d {
    locations: Vec<f64>,
    dplus: Vec<f64>,
    dminus: Vec<f64>,
}

impl Mesh1d {
    /// Builds a mesh from strictly increasing node locations.
    pub fn from_locations(locations: Vec<f64>) -> Result<Self, crate::core::FdmError> {
        if locations.len() < 2 {
            return Err(crate::core::FdmError::InvalidInput(
                "a mesh needs at least two nodes".to_string(),
            ));
        }
        if locations
            .windows(2)
            .any(|w| !w[0].is_finite() || !w[1].is_finite() || w[1] <= w[0])
        {
            return Err(crate::core::FdmError::InvalidInput(
                "mesh locations must be finite and strictly increasing".to_string(),
            ));
        }
        let n = locations.len();
        let mut dplus = vec![SENTINEL_SPACING; n];
        let mut dminus = vec![SENTINEL_SPACING; n];
        for i in 0..n - 1 {
            let h = locations[i + 1] - locations[i];
            dplus[i] = h;
            dminus[i + 1] = h;
        }
        Ok(Self {
            locations,
            dplus,
            dminus,
        })
    }

    /// Number of nodes.
    pub fn size(&self) -> usize {
        self.locations.len()
    }

    /// Node location at `i`.
    pub fn location(&self, i: usize) -> f64 {
        self.locations[i]
    }

    /// All node locations.
    pub fn locations(&self) -> &[f64] {
        &self.locations
    }

    /// Forward spacing to the next node; sentinel at the last node.
    pub fn dplus(&self, i: usize) -> f64 {
        self.dplus[i]
    }

    /// Backward spacing from the previous node; sentinel at the first node.
    pub fn dminus(&self, i: usize) -> f64 {
        self.dminus[i]
    }
}
