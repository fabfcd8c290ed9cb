//! Ordered operator lists over RGB float buffers.
//!
//! Composition renders sample values through a short chain of ops. The
//! convention between ops is a normalized `[0, 1]` range: a LUT op
//! divides its raw output by its output-depth maximum, and scale ops at
//! the chain ends bridge in and out of stored bit-depth scales.

use oxlut_core::{Direction, Interpolation, InversionQuality};
use tracing::trace;

use crate::compose::make_fast_lut3d_from_inverse;
use crate::error::LutResult;
use crate::lut3d::Lut3D;
use crate::render;

/// One step of an evaluation chain.
#[derive(Debug, Clone)]
pub enum Op {
    /// Per-channel multiplication.
    Scale([f64; 3]),
    /// Lookup through a 3D LUT, honoring its direction and selectors.
    Lut(Lut3D),
}

impl Op {
    /// Applies this op to a buffer of RGB triples in place.
    pub fn apply(&self, pixels: &mut [f32]) -> LutResult<()> {
        match self {
            Op::Scale(factors) => {
                let f = [factors[0] as f32, factors[1] as f32, factors[2] as f32];
                for px in pixels.chunks_exact_mut(3) {
                    px[0] *= f[0];
                    px[1] *= f[1];
                    px[2] *= f[2];
                }
                Ok(())
            }
            Op::Lut(lut) => match lut.direction() {
                Direction::Forward => {
                    apply_forward(lut, pixels);
                    Ok(())
                }
                Direction::Inverse => match lut.concrete_inversion_quality() {
                    InversionQuality::Exact | InversionQuality::Best => {
                        apply_exact_inverse(lut, pixels);
                        Ok(())
                    }
                    // The fast path samples a forward rendition built
                    // once for the whole buffer.
                    InversionQuality::Fast | InversionQuality::Default => {
                        let mut inv = lut.clone();
                        let fast = make_fast_lut3d_from_inverse(&mut inv)?;
                        apply_forward(&fast, pixels);
                        Ok(())
                    }
                },
            },
        }
    }
}

fn apply_forward(lut: &Lut3D, pixels: &mut [f32]) {
    let max_out = lut.bit_depth_out().max_value() as f32;
    let tetrahedral = lut.concrete_interpolation() == Interpolation::Tetrahedral;

    for px in pixels.chunks_exact_mut(3) {
        let rgb = [px[0], px[1], px[2]];
        let out = if tetrahedral {
            render::tetrahedral(lut.array(), rgb)
        } else {
            render::trilinear(lut.array(), rgb)
        };
        px[0] = out[0] / max_out;
        px[1] = out[1] / max_out;
        px[2] = out[2] / max_out;
    }
}

fn apply_exact_inverse(lut: &Lut3D, pixels: &mut [f32]) {
    // An inverse LUT's array holds the forward samples in input-depth
    // scale; the solver returns the matching forward-domain coordinate.
    let max_stored = lut.bit_depth_in().max_value() as f32;

    for px in pixels.chunks_exact_mut(3) {
        let target = [px[0], px[1], px[2]];
        let x = render::exact_inverse(lut.array(), max_stored, target);
        px[0] = x[0];
        px[1] = x[1];
        px[2] = x[2];
    }
}

/// Evaluates `src` through `ops` into `dst`, left to right.
///
/// Both buffers are flat RGB and must have the same length.
pub fn eval(ops: &[Op], src: &[f32], dst: &mut [f32]) -> LutResult<()> {
    debug_assert_eq!(src.len(), dst.len());
    trace!(ops = ops.len(), values = src.len(), "pipeline::eval");

    dst.copy_from_slice(src);
    for op in ops {
        op.apply(dst)?;
    }
    Ok(())
}
