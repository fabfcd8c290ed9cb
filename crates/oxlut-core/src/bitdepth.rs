//! Bit-depth tags for sample scaling.
//!
//! All pipeline storage is `f32`; a [`BitDepth`] tag names the numeric
//! range those floats represent. Integer depths hold values scaled to
//! their maximum code value, float depths hold normalized values, so the
//! tag only matters when values cross an operator boundary.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Numeric range tag for float sample values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BitDepth {
    /// 8-bit unsigned integer range, max 255.
    U8,
    /// 10-bit unsigned integer range, max 1023.
    U10,
    /// 12-bit unsigned integer range, max 4095.
    U12,
    /// 16-bit unsigned integer range, max 65535.
    U16,
    /// Half-float range, normalized to 1.0.
    F16,
    /// Single-float range, normalized to 1.0.
    #[default]
    F32,
}

impl BitDepth {
    /// Maximum code value of the range.
    ///
    /// Integer depths return their largest code value; float depths
    /// return 1.0. All maxima are exactly representable.
    #[inline]
    pub fn max_value(self) -> f64 {
        match self {
            Self::U8 => 255.0,
            Self::U10 => 1023.0,
            Self::U12 => 4095.0,
            Self::U16 => 65535.0,
            Self::F16 | Self::F32 => 1.0,
        }
    }

    /// True for the floating-point depths.
    #[inline]
    pub fn is_float(self) -> bool {
        matches!(self, Self::F16 | Self::F32)
    }

    /// Canonical short name, as used in cache IDs and process lists.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::U8 => "8ui",
            Self::U10 => "10ui",
            Self::U12 => "12ui",
            Self::U16 => "16ui",
            Self::F16 => "16f",
            Self::F32 => "32f",
        }
    }
}

impl fmt::Display for BitDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BitDepth {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "8ui" => Ok(Self::U8),
            "10ui" => Ok(Self::U10),
            "12ui" => Ok(Self::U12),
            "16ui" => Ok(Self::U16),
            "16f" => Ok(Self::F16),
            "32f" => Ok(Self::F32),
            _ => Err(ParseError::new("bit depth", s)),
        }
    }
}
