//! Functional composition of 3D LUT operators.
//!
//! Composition merges two sequential LUTs into a single operator with
//! the same end-to-end effect: the domain of the first carried into the
//! range of the second. Sample values are rendered through a short op
//! chain, so the result is inherently a resampling; the larger of the
//! two grid sizes is used to bound the loss.

use std::ops::Deref;

use oxlut_core::{BitDepth, Direction, InversionQuality};
use tracing::{debug, trace};

use crate::error::{LutError, LutResult};
use crate::lut3d::Lut3D;
use crate::pipeline::{eval, Op};

/// Grid edge length for fast forward renditions of inverse LUTs.
///
/// 48 trades inversion accuracy against the cost of building the
/// rendition; callers wanting a different trade-off can compose against
/// their own domain.
pub const FAST_INVERSE_GRID_SIZE: usize = 48;

/// Replaces `a` with the composition "first `a`, then `b`".
///
/// Both operands connect through their bit depths:
/// `a.bit_depth_out()` must equal `b.bit_depth_in()`.
///
/// The result keeps `a`'s input depth and interpolation, takes `b`'s
/// output depth, and merges the metadata of both. Its grid is the larger
/// of the two operand grids: when `a` is at least as fine as `b`, `a`'s
/// own samples serve as the domain; otherwise `a` is resampled on `b`'s
/// grid size.
///
/// # Example
///
/// ```rust
/// use oxlut_ops::{compose, Lut3D};
///
/// let mut a = Lut3D::new(17)?;
/// let b = Lut3D::new(33)?;
/// compose(&mut a, &b)?;
/// assert_eq!(a.length(), 33);
/// # Ok::<(), oxlut_ops::LutError>(())
/// ```
pub fn compose(a: &mut Lut3D, b: &Lut3D) -> LutResult<()> {
    if a.bit_depth_out() != b.bit_depth_in() {
        return Err(LutError::BitDepthMismatch {
            out: a.bit_depth_out(),
            inp: b.bit_depth_in(),
        });
    }

    let n = a.length();
    let m = b.length();
    trace!(a_len = n, b_len = m, "compose");

    let mut ops: Vec<Op> = Vec::new();

    let (domain_values, domain_len) = if n >= m {
        // The range of the first LUT becomes the domain to interpolate
        // in the second; normalize it out of a's output scale.
        let iscale = 1.0 / a.bit_depth_out().max_value();
        ops.push(Op::Scale([iscale; 3]));
        (a.array().values().to_vec(), n)
    } else {
        // The second LUT is more finely sampled: resample a on a fresh
        // identity domain of b's grid size.
        let domain = Lut3D::new_full(
            a.bit_depth_in(),
            BitDepth::F32,
            a.metadata().clone(),
            a.interpolation(),
            m,
        )?;
        let values = domain.array().values().to_vec();
        ops.push(Op::Lut(a.clone()));
        (values, m)
    };

    // The op list owns its own copy of b so the caller's operator stays
    // untouched.
    ops.push(Op::Lut(b.clone()));
    ops.push(Op::Scale([b.bit_depth_out().max_value(); 3]));

    let mut metadata = a.metadata().clone();
    metadata.combine(b.metadata());

    debug!(grid = domain_len, "Composing 3D LUTs");

    let mut result = Lut3D::new_full(
        a.bit_depth_in(),
        b.bit_depth_out(),
        metadata,
        a.interpolation(),
        domain_len,
    )?;
    eval(&ops, &domain_values, result.array_mut().values_mut())?;

    *a = result;
    Ok(())
}

/// Builds a forward LUT approximating an inverse LUT's effect, on a
/// fixed [`FAST_INVERSE_GRID_SIZE`] grid.
///
/// The input must be an inverse-direction operator. The returned LUT is
/// forward, with the input operator's depths carried over
/// (`bit_depth_in` on both sides of the domain, `bit_depth_out` from the
/// composition), ready to substitute for the inverse in evaluation-speed
/// sensitive paths.
///
/// The operator's inversion quality is forced to exact while the
/// rendition is composed and restored before returning, error or not.
pub fn make_fast_lut3d_from_inverse(lut: &mut Lut3D) -> LutResult<Lut3D> {
    if lut.direction() != Direction::Inverse {
        return Err(LutError::ExpectsInverse);
    }

    debug!(grid = FAST_INVERSE_GRID_SIZE, "Building fast forward LUT from inverse");

    // The composition below must run the exact inversion renderer; the
    // fast renderer would route straight back into this builder.
    let guard = ExactStyleGuard::new(lut);

    // Whatever depth the domain is built at, pin both ends to the
    // operator's input depth so scaling lines up.
    let mut domain = Lut3D::new(FAST_INVERSE_GRID_SIZE)?;
    domain.set_input_bit_depth(guard.bit_depth_in());
    domain.set_output_bit_depth(guard.bit_depth_in());

    compose(&mut domain, &guard)?;

    Ok(domain)
}

/// Scoped force of the exact inversion style.
///
/// Restores the saved quality when dropped, covering every exit path of
/// the enclosing function.
struct ExactStyleGuard<'a> {
    lut: &'a mut Lut3D,
    saved: InversionQuality,
}

impl<'a> ExactStyleGuard<'a> {
    fn new(lut: &'a mut Lut3D) -> Self {
        let saved = lut.inversion_quality();
        lut.set_inversion_quality(InversionQuality::Exact);
        Self { lut, saved }
    }
}

impl Deref for ExactStyleGuard<'_> {
    type Target = Lut3D;

    fn deref(&self) -> &Lut3D {
        self.lut
    }
}

impl Drop for ExactStyleGuard<'_> {
    fn drop(&mut self) {
        self.lut.set_inversion_quality(self.saved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_guard_restores() {
        let mut lut = Lut3D::new_with_direction(2, Direction::Inverse).unwrap();
        lut.set_inversion_quality(InversionQuality::Default);

        {
            let guard = ExactStyleGuard::new(&mut lut);
            assert_eq!(guard.inversion_quality(), InversionQuality::Exact);
        }
        assert_eq!(lut.inversion_quality(), InversionQuality::Default);
    }

    #[test]
    fn test_fast_inverse_rejects_forward() {
        let mut lut = Lut3D::new(2).unwrap();
        let err = make_fast_lut3d_from_inverse(&mut lut).unwrap_err();
        assert!(matches!(err, LutError::ExpectsInverse));
    }
}
