//! Reward shaping helpers: bounded tolerance curves and fuzzy conjunction.

use std::f64::consts::PI;
use std::str::FromStr;

use crate::core::{GymError, Result};

/// Value a tolerance curve takes at exactly one margin outside the bounds.
pub const DEFAULT_VALUE_AT_MARGIN: f64 = 0.1;

/// Shape of the decay outside the tolerance bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Sigmoid {
    Gaussian,
    Hyperbolic,
    LongTail,
    Reciprocal,
    Cosine,
    Linear,
    Quadratic,
    TanhSquared,
}

impl Sigmoid {
    /// Finite-support curves reach exactly zero and accept `value_at_1 == 0`.
    fn finite_support(self) -> bool {
        matches!(self, Sigmoid::Cosine | Sigmoid::Linear | Sigmoid::Quadratic)
    }

    /// Evaluate the curve at `x`, scaled so that it equals `value_at_1` at `x == 1`.
    pub fn eval(self, x: f64, value_at_1: f64) -> Result<f64> {
        let valid = if self.finite_support() {
            (0.0..1.0).contains(&value_at_1)
        } else {
            value_at_1 > 0.0 && value_at_1 < 1.0
        };
        if !valid {
            return Err(GymError::InvalidArgument(format!(
                "value_at_1 = {value_at_1} is out of range for {self:?}"
            )));
        }
        let y = match self {
            Sigmoid::Gaussian => {
                let scale = (-2.0 * value_at_1.ln()).sqrt();
                (-0.5 * (x * scale).powi(2)).exp()
            }
            Sigmoid::Hyperbolic => {
                let scale = (1.0 / value_at_1).acosh();
                1.0 / (x * scale).cosh()
            }
            Sigmoid::LongTail => {
                let scale = (1.0 / value_at_1 - 1.0).sqrt();
                1.0 / ((x * scale).powi(2) + 1.0)
            }
            Sigmoid::Reciprocal => {
                let scale = 1.0 / value_at_1 - 1.0;
                1.0 / (x.abs() * scale + 1.0)
            }
            Sigmoid::Cosine => {
                let scaled = x * (2.0 * value_at_1 - 1.0).acos() / PI;
                if scaled.abs() < 1.0 { (1.0 + (PI * scaled).cos()) / 2.0 } else { 0.0 }
            }
            Sigmoid::Linear => {
                let scaled = x * (1.0 - value_at_1);
                if scaled.abs() < 1.0 { 1.0 - scaled } else { 0.0 }
            }
            Sigmoid::Quadratic => {
                let scaled = x * (1.0 - value_at_1).sqrt();
                if scaled.abs() < 1.0 { 1.0 - scaled * scaled } else { 0.0 }
            }
            Sigmoid::TanhSquared => {
                let scale = (1.0 - value_at_1).sqrt().atanh();
                1.0 - (x * scale).tanh().powi(2)
            }
        };
        Ok(y)
    }
}

impl FromStr for Sigmoid {
    type Err = GymError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "gaussian" => Sigmoid::Gaussian,
            "hyperbolic" => Sigmoid::Hyperbolic,
            "long_tail" => Sigmoid::LongTail,
            "reciprocal" => Sigmoid::Reciprocal,
            "cosine" => Sigmoid::Cosine,
            "linear" => Sigmoid::Linear,
            "quadratic" => Sigmoid::Quadratic,
            "tanh_squared" => Sigmoid::TanhSquared,
            other => return Err(GymError::unknown("sigmoid", other)),
        })
    }
}

/// 1 inside `bounds`, decaying with `sigmoid` outside them.
///
/// The curve reaches [`DEFAULT_VALUE_AT_MARGIN`] one `margin` away from the
/// nearest bound. A zero margin gives a hard 0/1 indicator.
pub fn tolerance(x: f64, bounds: (f64, f64), margin: f64, sigmoid: Sigmoid) -> Result<f64> {
    tolerance_with(x, bounds, margin, sigmoid, DEFAULT_VALUE_AT_MARGIN)
}

pub fn tolerance_with(
    x: f64,
    bounds: (f64, f64),
    margin: f64,
    sigmoid: Sigmoid,
    value_at_margin: f64,
) -> Result<f64> {
    let (lower, upper) = bounds;
    if lower > upper {
        return Err(GymError::InvalidArgument("lower bound must be <= upper bound".into()));
    }
    if margin < 0.0 {
        return Err(GymError::InvalidArgument("margin must be non-negative".into()));
    }
    let in_bounds = lower <= x && x <= upper;
    if in_bounds {
        return Ok(1.0);
    }
    if margin == 0.0 {
        return Ok(0.0);
    }
    let outside = if x < lower { lower - x } else { x - upper };
    let d = outside / margin;
    sigmoid.eval(d, value_at_margin)
}

/// Hamacher t-norm: a smooth AND for values in [0, 1].
pub fn hamacher_product(a: f64, b: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&a) || !(0.0..=1.0).contains(&b) {
        return Err(GymError::InvalidArgument(format!("hamacher_product inputs must be in [0, 1], got {a}, {b}")));
    }
    let denominator = a + b - a * b;
    Ok(if denominator > 0.0 { a * b / denominator } else { 0.0 })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Sigmoid; 8] = [
        Sigmoid::Gaussian,
        Sigmoid::Hyperbolic,
        Sigmoid::LongTail,
        Sigmoid::Reciprocal,
        Sigmoid::Cosine,
        Sigmoid::Linear,
        Sigmoid::Quadratic,
        Sigmoid::TanhSquared,
    ];

    #[test]
    fn every_sigmoid_hits_value_at_margin() {
        for s in ALL {
            let y = tolerance(1.5, (0.0, 0.5), 1.0, s).unwrap();
            assert!((y - DEFAULT_VALUE_AT_MARGIN).abs() < 1e-9, "{s:?} gave {y}");
            assert_eq!(tolerance(0.25, (0.0, 0.5), 1.0, s).unwrap(), 1.0);
        }
    }

    #[test]
    fn decays_monotonically_below_and_above() {
        for s in ALL {
            let near = tolerance(0.6, (0.0, 0.5), 1.0, s).unwrap();
            let far = tolerance(1.2, (0.0, 0.5), 1.0, s).unwrap();
            assert!(near >= far, "{s:?}");
            let below = tolerance(-0.3, (0.0, 0.5), 1.0, s).unwrap();
            assert!(below < 1.0);
        }
    }

    #[test]
    fn zero_margin_is_an_indicator() {
        assert_eq!(tolerance(0.07, (0.0, 0.07), 0.0, Sigmoid::LongTail).unwrap(), 1.0);
        assert_eq!(tolerance(0.0701, (0.0, 0.07), 0.0, Sigmoid::LongTail).unwrap(), 0.0);
    }

    #[test]
    fn finite_support_curves_reach_zero() {
        assert_eq!(tolerance(10.0, (0.0, 0.0), 1.0, Sigmoid::Linear).unwrap(), 0.0);
        assert_eq!(tolerance_with(2.0, (0.0, 0.0), 1.0, Sigmoid::Quadratic, 0.0).unwrap(), 0.0);
    }

    #[test]
    fn invalid_arguments_are_errors() {
        assert!(tolerance(0.0, (1.0, 0.0), 1.0, Sigmoid::Gaussian).is_err());
        assert!(tolerance(2.0, (0.0, 1.0), -1.0, Sigmoid::Gaussian).is_err());
        assert!(tolerance_with(2.0, (0.0, 1.0), 1.0, Sigmoid::Gaussian, 0.0).is_err());
        assert!(tolerance_with(2.0, (0.0, 1.0), 1.0, Sigmoid::Linear, 1.0).is_err());
    }

    #[test]
    fn sigmoid_names_parse() {
        assert_eq!("long_tail".parse::<Sigmoid>().unwrap(), Sigmoid::LongTail);
        assert_eq!("tanh_squared".parse::<Sigmoid>().unwrap(), Sigmoid::TanhSquared);
        assert!("logistic".parse::<Sigmoid>().is_err());
    }

    #[test]
    fn hamacher_behaves_like_and() {
        assert_eq!(hamacher_product(0.0, 0.0).unwrap(), 0.0);
        assert_eq!(hamacher_product(1.0, 1.0).unwrap(), 1.0);
        assert_eq!(hamacher_product(1.0, 0.3).unwrap(), 0.3);
        assert!(hamacher_product(0.5, 0.5).unwrap() < 0.5);
        assert!(hamacher_product(1.2, 0.5).is_err());
    }
}
