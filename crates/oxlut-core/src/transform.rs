//! Operator application selectors.
//!
//! These enums parameterize how an operator is applied rather than what
//! it contains: the direction of application, the interpolation used to
//! read between grid samples, and the quality requested when an operator
//! has to be numerically inverted.
//!
//! Selectors are stored verbatim; abstract values such as
//! [`Interpolation::Best`] are resolved to an algorithm by the operator
//! that applies them (see the operator's `concrete_*` accessors).

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Transform application direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Apply the operator as authored.
    #[default]
    Forward,
    /// Apply the mathematical inverse of the operator.
    Inverse,
}

impl Direction {
    /// Returns the opposite direction.
    #[inline]
    pub fn inverse(self) -> Self {
        match self {
            Self::Forward => Self::Inverse,
            Self::Inverse => Self::Forward,
        }
    }

    /// Canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Inverse => "inverse",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interpolation selector for LUT evaluation.
///
/// Not every value is meaningful for every LUT type; a 3D LUT accepts
/// `Default`, `Linear`, `Nearest`, `Tetrahedral` and `Best` and rejects
/// the rest during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Interpolation {
    /// Let the operator pick its default algorithm.
    #[default]
    Default,
    /// Linear interpolation (trilinear for a 3D LUT).
    Linear,
    /// Nearest-neighbor selection.
    Nearest,
    /// Tetrahedral interpolation (3D only).
    Tetrahedral,
    /// Cubic interpolation (1D only).
    Cubic,
    /// Best available quality for the operator.
    Best,
    /// Unset / unrecognized; fails validation everywhere.
    Unknown,
}

impl Interpolation {
    /// Canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Linear => "linear",
            Self::Nearest => "nearest",
            Self::Tetrahedral => "tetrahedral",
            Self::Cubic => "cubic",
            Self::Best => "best",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interpolation {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Self::Default),
            "linear" => Ok(Self::Linear),
            "nearest" => Ok(Self::Nearest),
            "tetrahedral" => Ok(Self::Tetrahedral),
            "cubic" => Ok(Self::Cubic),
            "best" => Ok(Self::Best),
            _ => Err(ParseError::new("interpolation", s)),
        }
    }
}

/// Quality selector for numeric LUT inversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InversionQuality {
    /// Invert via a resampled forward approximation.
    #[default]
    Fast,
    /// Invert by exact per-sample root finding.
    Exact,
    /// Best available quality (resolves to exact).
    Best,
    /// Operator default (resolves to fast).
    Default,
}

impl InversionQuality {
    /// Canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Exact => "exact",
            Self::Best => "best",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for InversionQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_inverse() {
        assert_eq!(Direction::Forward.inverse(), Direction::Inverse);
        assert_eq!(Direction::Inverse.inverse(), Direction::Forward);
        assert_eq!(Direction::default(), Direction::Forward);
    }

    #[test]
    fn test_names() {
        assert_eq!(Direction::Forward.to_string(), "forward");
        assert_eq!(Interpolation::Tetrahedral.to_string(), "tetrahedral");
        assert_eq!(InversionQuality::Exact.to_string(), "exact");
    }

    #[test]
    fn test_interpolation_parse() {
        assert_eq!(
            "tetrahedral".parse::<Interpolation>().unwrap(),
            Interpolation::Tetrahedral
        );
        assert!("unknown".parse::<Interpolation>().is_err());
    }
}
