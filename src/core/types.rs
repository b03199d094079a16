//! Domain types and collaborator seams.
//!
//! The PDE core does not own payoff semantics or market term structures; it
//! consumes them through the minimal traits below. Times are year fractions
//! produced by the caller's own date arithmetic.

use crate::core::FdmError;

/// Plain-vanilla option side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionType {
    /// Call option payoff profile.
    Call,
    /// Put option payoff profile.
    Put,
}

impl OptionType {
    /// Returns +1.0 for calls and -1.0 for puts.
    pub fn sign(self) -> f64 {
        match self {
            Self::Call => 1.0,
            Self::Put => -1.0,
        }
    }
}

/// Payoff evaluated at a spot level, supplied by the instrument layer.
pub trait Payoff {
    /// Payoff value at spot `s`.
    fn value(&self, s: f64) -> f64;
}

/// Call/put payoff with a fixed strike.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlainVanillaPayoff {
    /// Option side.
    pub option_type: OptionType,
    /// Strike level.
    pub strike: f64,
}

impl PlainVanillaPayoff {
    /// Creates a vanilla payoff; the strike must be finite and positive.
    pub fn new(option_type: OptionType, strike: f64) -> Result<Self, FdmError> {
        if !strike.is_finite() || strike <= 0.0 {
            return Err(FdmError::InvalidInput(
                "strike must be finite and > 0".to_string(),
            ));
        }
        Ok(Self {
            option_type,
            strike,
        })
    }
}

impl Payoff for PlainVanillaPayoff {
    fn value(&self, s: f64) -> f64 {
        (self.option_type.sign() * (s - self.strike)).max(0.0)
    }
}

/// Forward-rate source over a time interval, supplied by the curve layer.
pub trait RateCurve {
    /// Continuously compounded forward rate over `[t1, t2]`.
    fn forward_rate(&self, t1: f64, t2: f64) -> f64;
}

/// Flat continuously compounded rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatRate(pub f64);

impl RateCurve for FlatRate {
    fn forward_rate(&self, _t1: f64, _t2: f64) -> f64 {
        self.0
    }
}

/// Local-volatility surface lookup, supplied by the volatility layer.
///
/// `None` signals a failed lookup; the operator either substitutes its
/// configured overwrite value or fails with `MarketDataMissing`.
pub trait LocalVol {
    /// Local volatility at time `t` and spot `s`, if available.
    fn local_vol(&self, t: f64, s: f64) -> Option<f64>;
}
