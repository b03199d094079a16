//! Backward solvers: rollback driver, scheme selection, terminal values,
//! and the one-dimensional pricing facade.

pub mod backward;
pub mod inner_value;
pub mod model;
pub mod solver1d;

pub use backward::BackwardSolver;
pub use inner_value::{InnerValueCalculator, PayoffInnerValue};
pub use model::FiniteDifferenceModel;
pub use solver1d::{Solver1d, SolverDesc};
