//! Numerical support kernels: Krylov solvers, adaptive ODE integration,
//! root finding, interpolation, and quadrature.

pub mod bicgstab;
pub mod brent;
pub mod gmres;
pub mod integration;
pub mod interpolation;
pub mod ode;

pub use bicgstab::{BiCgStab, KrylovResult};
pub use brent::{bracket_root, brent};
pub use gmres::Gmres;
pub use integration::simpson_adaptive;
pub use interpolation::{linear_interpolate, CubicSpline};
pub use ode::AdaptiveRungeKutta;
