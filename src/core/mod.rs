//! Crate-wide error type and the narrow collaborator interfaces the PDE
//! engine consumes (payoffs, term structures, local volatility).

pub mod types;

pub use types::*;

/// Errors surfaced by the finite-difference engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FdmError {
    /// Input validation error (bad sizes, illegal time steps, malformed rows).
    InvalidInput(String),
    /// Non-convergence in an iterative algorithm.
    ConvergenceFailure(String),
    /// Required market datum is unavailable.
    MarketDataMissing(String),
    /// Numerical issue (zero pivot, overflow, invalid state).
    NumericalError(String),
    /// Configuration names a variant that is declared but not implemented.
    Unsupported(String),
}

impl std::fmt::Display for FdmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            Self::ConvergenceFailure(msg) => write!(f, "convergence failure: {msg}"),
            Self::MarketDataMissing(msg) => write!(f, "market data missing: {msg}"),
            Self::NumericalError(msg) => write!(f, "numerical error: {msg}"),
            Self::Unsupported(msg) => write!(f, "unsupported: {msg}"),
        }
    }
}

impl std::error::Error for FdmError {}
