//! Interpolation registry and helpers.
//!
//! The three built-in strategies (linear, Lagrange, Hermite) are selected by
//! [`InterpolationAlgorithm`] through an [`InterpRegistry`]. The registry is an
//! immutable value; callers pass it by reference.

pub mod functions;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TemporalError;
pub use functions::{HermiteApproximation, LagrangeApproximation, LinearApproximation};

/// Interpolation strategies packets can name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InterpolationAlgorithm {
    #[default]
    Linear,
    Lagrange,
    Hermite,
}

impl InterpolationAlgorithm {
    /// Wire name of the algorithm.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear => "LINEAR",
            Self::Lagrange => "LAGRANGE",
            Self::Hermite => "HERMITE",
        }
    }
}

impl fmt::Display for InterpolationAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InterpolationAlgorithm {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LINEAR" => Ok(Self::Linear),
            "LAGRANGE" => Ok(Self::Lagrange),
            "HERMITE" => Ok(Self::Hermite),
            _ => Err(TemporalError::UnknownAlgorithm {
                name: s.to_string(),
            }),
        }
    }
}

/// Numeric interpolation over a window of samples.
pub trait Interpolator: Send + Sync {
    fn algorithm(&self) -> InterpolationAlgorithm;

    /// Number of samples a window must hold for a polynomial of `degree`.
    fn required_point_count(&self, degree: u32) -> usize;

    /// Evaluate at offset `x`.
    ///
    /// `x_table` holds one offset per window point, `y_table` holds `width`
    /// numbers per point, and `result` receives `width` numbers.
    fn interpolate(
        &self,
        x: f64,
        x_table: &[f64],
        y_table: &[f64],
        width: usize,
        result: &mut [f64],
    ) -> Result<(), TemporalError>;
}

/// Maps each [`InterpolationAlgorithm`] to its implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct InterpRegistry {
    linear: LinearApproximation,
    lagrange: LagrangeApproximation,
    hermite: HermiteApproximation,
}

/// Registry of the built-in interpolators.
pub static BUILTIN_INTERPOLATORS: InterpRegistry = InterpRegistry::new();

impl InterpRegistry {
    pub const fn new() -> Self {
        Self {
            linear: LinearApproximation,
            lagrange: LagrangeApproximation,
            hermite: HermiteApproximation,
        }
    }

    #[inline]
    pub fn get(&self, algorithm: InterpolationAlgorithm) -> &dyn Interpolator {
        match algorithm {
            InterpolationAlgorithm::Linear => &self.linear,
            InterpolationAlgorithm::Lagrange => &self.lagrange,
            InterpolationAlgorithm::Hermite => &self.hermite,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!(
            "lagrange".parse::<InterpolationAlgorithm>().unwrap(),
            InterpolationAlgorithm::Lagrange
        );
        assert_eq!(
            " HERMITE ".parse::<InterpolationAlgorithm>().unwrap(),
            InterpolationAlgorithm::Hermite
        );
        assert_eq!(
            "SPLINE".parse::<InterpolationAlgorithm>(),
            Err(TemporalError::UnknownAlgorithm {
                name: "SPLINE".into()
            })
        );
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&InterpolationAlgorithm::Hermite).unwrap();
        assert_eq!(json, "\"HERMITE\"");
        let back: InterpolationAlgorithm = serde_json::from_str("\"LINEAR\"").unwrap();
        assert_eq!(back, InterpolationAlgorithm::Linear);
    }

    #[test]
    fn registry_maps_every_algorithm() {
        for alg in [
            InterpolationAlgorithm::Linear,
            InterpolationAlgorithm::Lagrange,
            InterpolationAlgorithm::Hermite,
        ] {
            assert_eq!(BUILTIN_INTERPOLATORS.get(alg).algorithm(), alg);
        }
    }

    #[test]
    fn point_counts_clamp_to_two() {
        let reg = InterpRegistry::new();
        assert_eq!(reg.get(InterpolationAlgorithm::Linear).required_point_count(5), 2);
        assert_eq!(reg.get(InterpolationAlgorithm::Lagrange).required_point_count(0), 2);
        assert_eq!(reg.get(InterpolationAlgorithm::Lagrange).required_point_count(5), 6);
        assert_eq!(reg.get(InterpolationAlgorithm::Hermite).required_point_count(3), 4);
    }
}
