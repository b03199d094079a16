//! Black-Scholes spatial operator on a log-spot axis.
//!
//! `L V = (r - q - v/2) V_x + (v/2) V_xx - r V`, with the variance `v`
//! either flat or looked up per grid point on a local-volatility surface.
//! Rebuilt each time sub-interval through an affine combination of the
//! first/second derivative operators.

use std::rc::Rc;

use crate::core::{FdmError, LocalVol, RateCurve};
use crate::mesher::GridMesher;
use crate::operator::derivative::{first_derivative, second_derivative};
use crate::operator::{PdeOperator, TripleBandOp};

/// Volatility input for [`BlackScholesOp`].
#[derive(Clone)]
pub enum Volatility {
    /// Constant Black volatility.
    Flat(f64),
    /// Per-point local volatility with an optional substitute used when a
    /// lookup fails; without one, a failed lookup is an error.
    Local {
        /// Surface queried at the interval midpoint and the point's spot.
        surface: Rc<dyn LocalVol>,
        /// Variance substitute on lookup failure.
        illegal_value: Option<f64>,
    },
}

impl std::fmt::Debug for Volatility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Flat(sigma) => f.debug_tuple("Flat").field(sigma).finish(),
            Self::Local { illegal_value, .. } => f
                .debug_struct("Local")
                .field("illegal_value", illegal_value)
                .finish(),
        }
    }
}

/// One-dimensional Black-Scholes operator along a designated log-spot
/// axis of the mesher.
pub struct BlackScholesOp {
    direction: usize,
    rate: Rc<dyn RateCurve>,
    dividend: Rc<dyn RateCurve>,
    volatility: Volatility,
    dx: TripleBandOp,
    dxx: TripleBandOp,
    map: TripleBandOp,
    // spot level per grid point, exp of the log-coordinate
    spots: Vec<f64>,
}

impl BlackScholesOp {
    /// Builds the operator over `mesher`'s `direction` axis, whose
    /// locations are log-spot.
    pub fn new(
        mesher: &GridMesher,
        rate: Rc<dyn RateCurve>,
        dividend: Rc<dyn RateCurve>,
        volatility: Volatility,
        direction: usize,
    ) -> Result<Self, FdmError> {
        if let Volatility::Flat(sigma) = volatility {
            if !sigma.is_finite() || sigma <= 0.0 {
                return Err(FdmError::InvalidInput(
                    "flat volatility must be finite and > 0".to_string(),
                ));
            }
        }
        let dx = first_derivative(mesher, direction)?;
        let dxx = second_derivative(mesher, direction)?;
        let map = TripleBandOp::new(mesher, direction)?;
        let spots = mesher
            .layout()
            .cells()
            .map(|c| mesher.location(&c.coords, direction).exp())
            .collect();
        Ok(Self {
            direction,
            rate,
            dividend,
            volatility,
            dx,
            dxx,
            map,
            spots,
        })
    }

    /// Per-point variance over `[t1, t2]`.
    fn variances(&self, t1: f64, t2: f64) -> Result<Vec<f64>, FdmError> {
        match &self.volatility {
            Volatility::Flat(sigma) => Ok(vec![sigma * sigma]),
            Volatility::Local {
                surface,
                illegal_value,
            } => {
                let t = 0.5 * (t1 + t2);
                self.spots
                    .iter()
                    .map(|&s| match surface.local_vol(t, s) {
                        Some(sigma) => Ok(sigma * sigma),
                        None => illegal_value.ok_or_else(|| {
                            FdmError::MarketDataMissing(format!(
                                "local vol lookup failed at t={t}, spot={s}"
                            ))
                        }),
                    })
                    .collect()
            }
        }
    }
}

impl PdeOperator for BlackScholesOp {
    fn size(&self) -> usize {
        1
    }

    fn set_time(&mut self, t1: f64, t2: f64) -> Result<(), FdmError> {
        if t2 <= t1 {
            return Err(FdmError::InvalidInput(
                "set_time requires t1 < t2".to_string(),
            ));
        }
        let r = self.rate.forward_rate(t1, t2);
        let q = self.dividend.forward_rate(t1, t2);
        let v = self.variances(t1, t2)?;
        let drift: Vec<f64> = v.iter().map(|&vi| r - q - 0.5 * vi).collect();
        let half_v: Vec<f64> = v.iter().map(|&vi| 0.5 * vi).collect();
        let diffusion = self.dxx.mult(&half_v);
        self.map.axpyb(&drift, &self.dx, &diffusion, &[-r])
    }

    fn apply(&self, r: &[f64]) -> Vec<f64> {
        self.map.apply(r)
    }

    fn apply_direction(&self, direction: usize, r: &[f64]) -> Vec<f64> {
        if direction == self.direction {
            self.map.apply(r)
        } else {
            vec![0.0; r.len()]
        }
    }

    fn apply_mixed(&self, r: &[f64]) -> Vec<f64> {
        vec![0.0; r.len()]
    }

    fn solve_splitting(
        &self,
        direction: usize,
        r: &[f64],
        s: f64,
    ) -> Result<Vec<f64>, FdmError> {
        if direction != self.direction {
            return Err(FdmError::InvalidInput(format!(
                "black-scholes operator has no direction {direction}"
            )));
        }
        self.map.solve_splitting(r, s, 1.0)
    }

    fn preconditioner(&self, r: &[f64], s: f64) -> Result<Vec<f64>, FdmError> {
        self.solve_splitting(self.direction, r, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FlatRate;
    use crate::mesher::Mesh1d;

    fn log_spot_mesher() -> GridMesher {
        GridMesher::from_axes(vec![Mesh1d::uniform(
            (50.0_f64).ln(),
            (200.0_f64).ln(),
            51,
        )
        .unwrap()])
        .unwrap()
    }

    #[test]
    fn flat_vol_operator_prices_drift_and_discount_terms() {
        let mesher = log_spot_mesher();
        let mut op = BlackScholesOp::new(
            &mesher,
            Rc::new(FlatRate(0.05)),
            Rc::new(FlatRate(0.0)),
            Volatility::Flat(0.20),
            0,
        )
        .unwrap();
        op.set_time(0.0, 0.01).unwrap();

        // on V = const the derivative terms vanish: L V = -r V
        let ones = vec![1.0; mesher.layout().size()];
        let lv = op.apply(&ones);
        for &x in lv.iter().take(lv.len() - 1).skip(1) {
            assert!((x + 0.05).abs() < 1.0e-10);
        }
        assert_eq!(op.size(), 1);
    }

    struct PartialSurface;
    impl LocalVol for PartialSurface {
        fn local_vol(&self, _t: f64, s: f64) -> Option<f64> {
            (s < 150.0).then_some(0.25)
        }
    }

    #[test]
    fn local_vol_overwrite_covers_failed_lookups() {
        let mesher = log_spot_mesher();
        let mut strict = BlackScholesOp::new(
            &mesher,
            Rc::new(FlatRate(0.02)),
            Rc::new(FlatRate(0.0)),
            Volatility::Local {
                surface: Rc::new(PartialSurface),
                illegal_value: None,
            },
            0,
        )
        .unwrap();
        assert!(matches!(
            strict.set_time(0.0, 0.1),
            Err(FdmError::MarketDataMissing(_))
        ));

        let mut relaxed = BlackScholesOp::new(
            &mesher,
            Rc::new(FlatRate(0.02)),
            Rc::new(FlatRate(0.0)),
            Volatility::Local {
                surface: Rc::new(PartialSurface),
                illegal_value: Some(0.04),
            },
            0,
        )
        .unwrap();
        assert!(relaxed.set_time(0.0, 0.1).is_ok());
    }

    #[test]
    fn solve_splitting_rejects_foreign_direction() {
        let mesher = log_spot_mesher();
        let mut op = BlackScholesOp::new(
            &mesher,
            Rc::new(FlatRate(0.01)),
            Rc::new(FlatRate(0.0)),
            Volatility::Flat(0.3),
            0,
        )
        .unwrap();
        op.set_time(0.0, 0.5).unwrap();
        let r = vec![1.0; mesher.layout().size()];
        assert!(op.solve_splitting(1, &r, -0.1).is_err());
        assert!(op.solve_splitting(0, &r, -0.1).is_ok());
    }
}
