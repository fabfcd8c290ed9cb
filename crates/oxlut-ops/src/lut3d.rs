//! The 3D LUT operator.
//!
//! A [`Lut3D`] wraps a [`Lut3DArray`] with the tags that give its floats
//! meaning: input/output bit depths, an interpolation selector, a
//! direction, an inversion-quality hint and format metadata. The stored
//! array always holds the *forward* function's samples; an inverse
//! operator is the same array applied through a root-finding renderer.
//!
//! Operators are mutable while a pipeline is being assembled and are
//! conventionally frozen once [`Lut3D::finalize`] has computed their
//! cache ID.

use std::sync::Mutex;

use md5::{Digest, Md5};
use oxlut_core::{BitDepth, Direction, FormatMetadata, Interpolation, InversionQuality};

use crate::array::{Lut3DArray, MAX_SUPPORTED_LENGTH};
use crate::error::{LutError, LutResult};
use crate::range::Range;

/// A 3D lookup table operator.
///
/// # Example
///
/// ```rust
/// use oxlut_ops::Lut3D;
///
/// let lut = Lut3D::new(33)?;
/// assert!(lut.is_identity());
/// assert!(lut.validate().is_ok());
/// # Ok::<(), oxlut_ops::LutError>(())
/// ```
#[derive(Debug)]
pub struct Lut3D {
    array: Lut3DArray,
    bd_in: BitDepth,
    bd_out: BitDepth,
    interpolation: Interpolation,
    direction: Direction,
    inversion_quality: InversionQuality,
    metadata: FormatMetadata,
    // Empty until finalize; the lock lets concurrent finalizers converge
    // on a single ID.
    cache_id: Mutex<String>,
}

impl Lut3D {
    /// Creates a forward identity LUT in F32 with default selectors.
    ///
    /// `length` must be between 2 and [`MAX_SUPPORTED_LENGTH`].
    pub fn new(length: usize) -> LutResult<Self> {
        Self::new_with_direction(length, Direction::Forward)
    }

    /// Creates an identity LUT with an explicit direction.
    pub fn new_with_direction(length: usize, direction: Direction) -> LutResult<Self> {
        Ok(Self {
            array: Lut3DArray::new(length, BitDepth::F32)?,
            bd_in: BitDepth::F32,
            bd_out: BitDepth::F32,
            interpolation: Interpolation::Default,
            direction,
            inversion_quality: InversionQuality::Fast,
            metadata: FormatMetadata::new(),
            cache_id: Mutex::new(String::new()),
        })
    }

    /// Creates a forward identity LUT with explicit depths, metadata and
    /// interpolation. The identity ramp is written in `bd_out` scale.
    pub fn new_full(
        bd_in: BitDepth,
        bd_out: BitDepth,
        metadata: FormatMetadata,
        interpolation: Interpolation,
        length: usize,
    ) -> LutResult<Self> {
        Ok(Self {
            array: Lut3DArray::new(length, bd_out)?,
            bd_in,
            bd_out,
            interpolation,
            direction: Direction::Forward,
            inversion_quality: InversionQuality::Fast,
            metadata,
            cache_id: Mutex::new(String::new()),
        })
    }

    /// Grid edge length.
    #[inline]
    pub fn length(&self) -> usize {
        self.array.length()
    }

    /// Input bit depth.
    #[inline]
    pub fn bit_depth_in(&self) -> BitDepth {
        self.bd_in
    }

    /// Output bit depth.
    #[inline]
    pub fn bit_depth_out(&self) -> BitDepth {
        self.bd_out
    }

    /// The stored interpolation selector.
    #[inline]
    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// Stores an interpolation selector verbatim.
    ///
    /// Invalid selectors are accepted here and rejected by
    /// [`Lut3D::validate`].
    pub fn set_interpolation(&mut self, interpolation: Interpolation) {
        self.interpolation = interpolation;
    }

    /// The algorithm actually used for forward evaluation.
    ///
    /// `Best` and `Tetrahedral` resolve to tetrahedral; every other
    /// selector resolves to trilinear. Note that `Nearest` is accepted
    /// but rendered as trilinear.
    pub fn concrete_interpolation(&self) -> Interpolation {
        match self.interpolation {
            Interpolation::Best | Interpolation::Tetrahedral => Interpolation::Tetrahedral,
            _ => Interpolation::Linear,
        }
    }

    /// The stored inversion-quality hint.
    #[inline]
    pub fn inversion_quality(&self) -> InversionQuality {
        self.inversion_quality
    }

    /// Stores an inversion-quality hint.
    pub fn set_inversion_quality(&mut self, quality: InversionQuality) {
        self.inversion_quality = quality;
    }

    /// The inversion algorithm actually used.
    ///
    /// `Exact` and `Best` resolve to exact; `Fast` and `Default` resolve
    /// to fast.
    pub fn concrete_inversion_quality(&self) -> InversionQuality {
        match self.inversion_quality {
            InversionQuality::Exact | InversionQuality::Best => InversionQuality::Exact,
            InversionQuality::Fast | InversionQuality::Default => InversionQuality::Fast,
        }
    }

    /// Application direction.
    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Format metadata attached to the operator.
    #[inline]
    pub fn metadata(&self) -> &FormatMetadata {
        &self.metadata
    }

    /// Mutable access to the format metadata.
    #[inline]
    pub fn metadata_mut(&mut self) -> &mut FormatMetadata {
        &mut self.metadata
    }

    /// The sample array.
    #[inline]
    pub fn array(&self) -> &Lut3DArray {
        &self.array
    }

    /// Mutable access to the sample array.
    #[inline]
    pub fn array_mut(&mut self) -> &mut Lut3DArray {
        &mut self.array
    }

    /// Sets the input bit depth, rescaling the array when this operator
    /// is an inverse.
    ///
    /// An inverse operator's array holds samples of the underlying
    /// forward function, so its *input* depth owns the array scale.
    pub fn set_input_bit_depth(&mut self, depth: BitDepth) {
        if self.direction == Direction::Inverse {
            let factor = depth.max_value() as f32 / self.bd_in.max_value() as f32;
            self.array.scale(factor);
        }
        self.bd_in = depth;
    }

    /// Sets the output bit depth, rescaling the array when this operator
    /// is a forward LUT.
    pub fn set_output_bit_depth(&mut self, depth: BitDepth) {
        if self.direction == Direction::Forward {
            let factor = depth.max_value() as f32 / self.bd_out.max_value() as f32;
            self.array.scale(factor);
        }
        self.bd_out = depth;
    }

    /// Retags the input bit depth without touching the array.
    pub fn set_input_bit_depth_raw(&mut self, depth: BitDepth) {
        self.bd_in = depth;
    }

    /// Retags the output bit depth without touching the array.
    pub fn set_output_bit_depth_raw(&mut self, depth: BitDepth) {
        self.bd_out = depth;
    }

    /// Checks that the operator is usable: a valid interpolation
    /// selector, three color components, and a supported grid size.
    pub fn validate(&self) -> LutResult<()> {
        match self.interpolation {
            Interpolation::Best
            | Interpolation::Tetrahedral
            | Interpolation::Default
            | Interpolation::Linear
            | Interpolation::Nearest => {}
            other => return Err(LutError::InvalidInterpolation(other)),
        }
        if self.array.channels() != 3 {
            return Err(LutError::BadChannelCount(self.array.channels()));
        }
        if self.array.length() > MAX_SUPPORTED_LENGTH {
            return Err(LutError::GridTooLarge {
                length: self.array.length(),
                max: MAX_SUPPORTED_LENGTH,
            });
        }
        Ok(())
    }

    /// Always false: a 3D LUT clamps to its domain even when the samples
    /// are an identity ramp.
    pub fn is_no_op(&self) -> bool {
        false
    }

    /// True when the array matches the identity ramp for the output
    /// depth within tolerance.
    pub fn is_identity(&self) -> bool {
        self.array.is_identity(self.bd_out)
    }

    /// Always true: every output channel depends on every input channel.
    pub fn has_channel_crosstalk(&self) -> bool {
        true
    }

    /// The clamping range op an identity LUT may be replaced with during
    /// pipeline optimization: `[0, max(in)]` to `[0, max(out)]`.
    pub fn identity_replacement(&self) -> Range {
        Range::new(
            0.0,
            self.bd_in.max_value(),
            0.0,
            self.bd_out.max_value(),
        )
    }

    /// Returns the inverse operator: direction flipped, bit depths
    /// swapped, array untouched.
    pub fn inverse(&self) -> Self {
        let mut inv = self.clone();
        inv.direction = self.direction.inverse();
        // Swap tags only; the array still holds the forward samples.
        inv.bd_in = self.bd_out;
        inv.bd_out = self.bd_in;
        inv
    }

    /// True when `self` and `other` are a forward/inverse pair over the
    /// same function.
    ///
    /// Requires one forward and one inverse operand. The arrays are
    /// compared exactly (no tolerance) after harmonizing the forward
    /// LUT's output depth to the inverse LUT's input depth.
    pub fn is_inverse(&self, other: &Lut3D) -> bool {
        match (self.direction, other.direction) {
            (Direction::Forward, Direction::Inverse) => check_inverse(self, other),
            (Direction::Inverse, Direction::Forward) => check_inverse(other, self),
            _ => false,
        }
    }

    /// Repacks raw samples from red-fastest order (common in LUT file
    /// formats) into the stored blue-fastest order.
    pub fn set_array_from_red_fastest(&mut self, lut: &[f32]) -> LutResult<()> {
        let length = self.array.length();
        let expected = 3 * length * length * length;
        if lut.len() != expected {
            return Err(LutError::LengthMismatch {
                expected,
                got: lut.len(),
            });
        }

        for b in 0..length {
            for g in 0..length {
                for r in 0..length {
                    let red_fast = 3 * ((b * length + g) * length + r);
                    self.array.set_rgb(
                        r,
                        g,
                        b,
                        [lut[red_fast], lut[red_fast + 1], lut[red_fast + 2]],
                    );
                }
            }
        }
        Ok(())
    }

    /// Validates the operator and computes its cache ID.
    ///
    /// The ID is the MD5 of the raw sample bytes followed by the
    /// interpolation, direction and bit-depth names. The inversion
    /// quality is excluded so that quality hints do not split caches.
    pub fn finalize(&self) -> LutResult<()> {
        let mut cache_id = self.cache_id.lock().unwrap();

        self.validate()?;

        let bytes: Vec<u8> = self
            .array
            .values()
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let digest = Md5::digest(&bytes);

        let hex: String = digest.iter().map(|byte| format!("{byte:02x}")).collect();
        *cache_id = format!(
            "{hex} {} {} {} {}",
            self.interpolation, self.direction, self.bd_in, self.bd_out
        );
        Ok(())
    }

    /// The cache ID computed by [`Lut3D::finalize`]; empty beforehand.
    pub fn cache_id(&self) -> String {
        self.cache_id.lock().unwrap().clone()
    }
}

/// Array comparison for a forward/inverse pair, harmonizing bit depths
/// first.
fn check_inverse(fwd: &Lut3D, inv: &Lut3D) -> bool {
    if fwd.bd_out.max_value() != inv.bd_in.max_value() {
        // Quick fail on raw size.
        if fwd.array.num_values() != inv.array.num_values() {
            return false;
        }
        let mut scaled = fwd.clone();
        scaled.set_output_bit_depth(inv.bd_in);
        scaled.array == inv.array
    } else {
        fwd.array == inv.array
    }
}

impl Clone for Lut3D {
    fn clone(&self) -> Self {
        Self {
            array: self.array.clone(),
            bd_in: self.bd_in,
            bd_out: self.bd_out,
            interpolation: self.interpolation,
            direction: self.direction,
            inversion_quality: self.inversion_quality,
            metadata: self.metadata.clone(),
            cache_id: Mutex::new(self.cache_id.lock().unwrap().clone()),
        }
    }
}

/// Equality covers direction, interpolation, bit depths and samples.
/// The inversion-quality hint and metadata are deliberately excluded;
/// downstream caches rely on both exclusions.
impl PartialEq for Lut3D {
    fn eq(&self, other: &Self) -> bool {
        self.direction == other.direction
            && self.interpolation == other.interpolation
            && self.bd_in == other.bd_in
            && self.bd_out == other.bd_out
            && self.array == other.array
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let lut = Lut3D::new(2).unwrap();
        assert!(lut.validate().is_ok());
        assert!(lut.is_identity());
        assert!(!lut.is_no_op());
        assert!(lut.has_channel_crosstalk());
        assert_eq!(lut.inversion_quality(), InversionQuality::Fast);
        assert_eq!(lut.direction(), Direction::Forward);
        assert_eq!(lut.bit_depth_in(), BitDepth::F32);
        assert_eq!(lut.bit_depth_out(), BitDepth::F32);
    }

    #[test]
    fn test_accessors() {
        let mut md = FormatMetadata::new();
        md.set_id("uid");
        let mut lut =
            Lut3D::new_full(BitDepth::F32, BitDepth::F32, md, Interpolation::Linear, 33).unwrap();

        assert_eq!(lut.interpolation(), Interpolation::Linear);
        assert!(lut.is_identity());
        assert!(lut.validate().is_ok());

        lut.array_mut().values_mut()[0] = 1.0;
        assert!(!lut.is_identity());
        assert!(lut.validate().is_ok());

        lut.set_interpolation(Interpolation::Tetrahedral);
        assert_eq!(lut.interpolation(), Interpolation::Tetrahedral);

        lut.set_inversion_quality(InversionQuality::Best);
        assert_eq!(lut.inversion_quality(), InversionQuality::Best);
        assert_eq!(lut.concrete_inversion_quality(), InversionQuality::Exact);

        assert_eq!(lut.length(), 33);
        assert_eq!(lut.array().num_values(), 33 * 33 * 33 * 3);
        assert_eq!(lut.array().channels(), 3);
    }

    #[test]
    fn test_not_supported_length() {
        assert!(Lut3D::new(MAX_SUPPORTED_LENGTH).is_ok());
        let err = Lut3D::new(MAX_SUPPORTED_LENGTH + 1).unwrap_err();
        assert!(err.to_string().contains("must not be greater"));
    }

    #[test]
    fn test_concrete_interpolation() {
        let mut lut = Lut3D::new(2).unwrap();

        lut.set_interpolation(Interpolation::Linear);
        assert_eq!(lut.concrete_interpolation(), Interpolation::Linear);
        assert!(lut.validate().is_ok());

        lut.set_interpolation(Interpolation::Cubic);
        assert_eq!(lut.concrete_interpolation(), Interpolation::Linear);
        let err = lut.validate().unwrap_err();
        assert!(err.to_string().contains("invalid interpolation"));

        lut.set_interpolation(Interpolation::Tetrahedral);
        assert_eq!(lut.concrete_interpolation(), Interpolation::Tetrahedral);
        assert!(lut.validate().is_ok());

        lut.set_interpolation(Interpolation::Default);
        assert_eq!(lut.concrete_interpolation(), Interpolation::Linear);
        assert!(lut.validate().is_ok());

        lut.set_interpolation(Interpolation::Best);
        assert_eq!(lut.concrete_interpolation(), Interpolation::Tetrahedral);
        assert!(lut.validate().is_ok());

        // Nearest is accepted but rendered as trilinear.
        lut.set_interpolation(Interpolation::Nearest);
        assert_eq!(lut.concrete_interpolation(), Interpolation::Linear);
        assert!(lut.validate().is_ok());

        lut.set_interpolation(Interpolation::Unknown);
        assert_eq!(lut.concrete_interpolation(), Interpolation::Linear);
        assert!(lut.validate().is_err());
    }

    #[test]
    fn test_concrete_inversion_quality() {
        let mut lut = Lut3D::new(2).unwrap();

        for (stored, concrete) in [
            (InversionQuality::Exact, InversionQuality::Exact),
            (InversionQuality::Best, InversionQuality::Exact),
            (InversionQuality::Fast, InversionQuality::Fast),
            (InversionQuality::Default, InversionQuality::Fast),
        ] {
            lut.set_inversion_quality(stored);
            assert_eq!(lut.inversion_quality(), stored);
            assert_eq!(lut.concrete_inversion_quality(), concrete);
            assert!(lut.validate().is_ok());
        }
    }

    #[test]
    fn test_output_depth_scaling() {
        let lut_u8 = Lut3D::new_full(
            BitDepth::U8,
            BitDepth::U8,
            FormatMetadata::new(),
            Interpolation::Linear,
            33,
        )
        .unwrap();
        let mut lut = Lut3D::new_full(
            BitDepth::U8,
            BitDepth::U10,
            FormatMetadata::new(),
            Interpolation::Linear,
            33,
        )
        .unwrap();
        assert!(lut_u8.is_identity());
        assert!(lut.is_identity());

        let initial = lut.array().values().to_vec();
        let factor = BitDepth::U16.max_value() as f32 / BitDepth::U10.max_value() as f32;

        lut.set_output_bit_depth(BitDepth::U16);
        assert_eq!(lut.bit_depth_out(), BitDepth::U16);

        let rescaled = lut.array().values();
        assert_eq!(initial.len(), rescaled.len());
        for (before, after) in initial.iter().zip(rescaled) {
            assert!((before * factor - after).abs() < 1e-4);
        }
    }

    #[test]
    fn test_input_depth_scaling_is_inverse_only() {
        let mut fwd = Lut3D::new_full(
            BitDepth::U8,
            BitDepth::U10,
            FormatMetadata::new(),
            Interpolation::Linear,
            5,
        )
        .unwrap();
        let before = fwd.array().values().to_vec();
        fwd.set_input_bit_depth(BitDepth::U16);
        assert_eq!(fwd.bit_depth_in(), BitDepth::U16);
        assert_eq!(fwd.array().values(), &before[..]);

        let mut inv = fwd.inverse();
        let before = inv.array().values().to_vec();
        let factor = BitDepth::U12.max_value() as f32 / inv.bit_depth_in().max_value() as f32;
        inv.set_input_bit_depth(BitDepth::U12);
        for (prior, now) in before.iter().zip(inv.array().values()) {
            assert!((prior * factor - now).abs() < 1e-4);
        }
    }

    #[test]
    fn test_clone_is_deep() {
        let mut lut = Lut3D::new(33).unwrap();
        lut.array_mut().values_mut()[1] = 0.1;

        let mut copy = lut.clone();
        assert!(!copy.is_no_op());
        assert!(!copy.is_identity());
        assert!(copy.validate().is_ok());
        assert_eq!(copy, lut);

        copy.array_mut().values_mut()[1] = 0.2;
        assert_eq!(lut.array().values()[1], 0.1);
    }

    #[test]
    fn test_inverse_swaps_depths_without_rescale() {
        let mut md = FormatMetadata::new();
        md.set_id("uid");
        let mut lut = Lut3D::new_full(
            BitDepth::F16,
            BitDepth::U10,
            md,
            Interpolation::Tetrahedral,
            5,
        )
        .unwrap();
        lut.array_mut().values_mut()[0] = 20.0;

        let inv = lut.inverse();
        assert_eq!(inv.bit_depth_in(), BitDepth::U10);
        assert_eq!(inv.bit_depth_out(), BitDepth::F16);
        assert_eq!(inv.interpolation(), Interpolation::Tetrahedral);
        assert_eq!(inv.direction(), Direction::Inverse);
        assert_eq!(inv.array().values(), lut.array().values());

        let back = inv.inverse();
        assert_eq!(back, lut);
    }

    #[test]
    fn test_equality_exclusions() {
        let l1 = Lut3D::new_full(
            BitDepth::F32,
            BitDepth::F32,
            FormatMetadata::new(),
            Interpolation::Linear,
            33,
        )
        .unwrap();
        let l2 = Lut3D::new_full(
            BitDepth::F32,
            BitDepth::F32,
            FormatMetadata::new(),
            Interpolation::Best,
            33,
        )
        .unwrap();
        assert_ne!(l1, l2);

        let l3 = Lut3D::new_full(
            BitDepth::F16,
            BitDepth::F32,
            FormatMetadata::new(),
            Interpolation::Linear,
            33,
        )
        .unwrap();
        assert_ne!(l1, l3);
        assert_ne!(l2, l3);

        let mut l4 = Lut3D::new_full(
            BitDepth::F32,
            BitDepth::F32,
            FormatMetadata::new(),
            Interpolation::Linear,
            33,
        )
        .unwrap();
        assert_eq!(l1, l4);

        // Inversion quality does not affect equality.
        l4.set_inversion_quality(InversionQuality::Best);
        assert_eq!(l1, l4);

        // Neither does metadata.
        l4.metadata_mut().set_name("renamed");
        assert_eq!(l1, l4);

        // Nor does the inverse pair's quality.
        let l5 = l1.inverse();
        let l6 = l4.inverse();
        assert_eq!(l5, l6);
    }

    #[test]
    fn test_is_inverse() {
        let mut md = FormatMetadata::new();
        md.set_id("uid");
        let mut l1 =
            Lut3D::new_full(BitDepth::U8, BitDepth::U10, md, Interpolation::Linear, 5).unwrap();
        l1.array_mut().values_mut()[0] = 20.0;
        assert!(!l1.is_identity());

        let l2 = l1.inverse();
        let l3 = l2.inverse();
        assert_eq!(l3, l1);
        assert_ne!(l1, l2);

        assert!(l1.is_inverse(&l2));
        assert!(l2.is_inverse(&l1));

        // Two forwards are never an inverse pair.
        assert!(!l1.is_inverse(&l3));

        // Arrays stay equivalent when the depth change rescales.
        l1.set_output_bit_depth(BitDepth::U12);
        assert!(l1.is_inverse(&l2));
        assert!(l2.is_inverse(&l1));

        // A raw tag swap changes the effective array, not just its label.
        l1.set_output_bit_depth(BitDepth::U10);
        assert!(l1.is_inverse(&l2));
        l1.set_output_bit_depth_raw(BitDepth::U12);
        assert!(!l1.is_inverse(&l2));
        assert!(!l2.is_inverse(&l1));
    }

    #[test]
    fn test_set_array_from_red_fastest() {
        let mut lut = Lut3D::new(2).unwrap();

        // Red-fastest identity for L=2, normalized.
        let mut red_fast = Vec::with_capacity(24);
        for b in 0..2u32 {
            for g in 0..2u32 {
                for r in 0..2u32 {
                    red_fast.extend([r as f32, g as f32, b as f32]);
                }
            }
        }
        lut.set_array_from_red_fastest(&red_fast).unwrap();
        assert!(lut.is_identity());

        let err = lut.set_array_from_red_fastest(&red_fast[1..]).unwrap_err();
        assert!(matches!(err, LutError::LengthMismatch { .. }));
    }

    #[test]
    fn test_identity_replacement_bounds() {
        let lut = Lut3D::new_full(
            BitDepth::U8,
            BitDepth::U10,
            FormatMetadata::new(),
            Interpolation::Linear,
            2,
        )
        .unwrap();
        let range = lut.identity_replacement();
        assert_eq!(range.lower_bound(), 0.0);
        assert_eq!(range.upper_bound(), 1023.0);
    }

    #[test]
    fn test_finalize_cache_id() {
        let mut lut = Lut3D::new_full(
            BitDepth::U8,
            BitDepth::U10,
            FormatMetadata::new(),
            Interpolation::Linear,
            5,
        )
        .unwrap();
        assert!(lut.cache_id().is_empty());

        lut.finalize().unwrap();
        let id = lut.cache_id();
        let tokens: Vec<&str> = id.split(' ').collect();
        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[0].len(), 32);
        assert!(tokens[0].chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(&tokens[1..], &["linear", "forward", "8ui", "10ui"]);

        // Stable across clones and equal content.
        let copy = lut.clone();
        assert_eq!(copy.cache_id(), id);

        // Quality hints do not change the ID.
        lut.set_inversion_quality(InversionQuality::Best);
        lut.finalize().unwrap();
        assert_eq!(lut.cache_id(), id);

        // Array content does.
        lut.array_mut().values_mut()[0] += 1.0;
        lut.finalize().unwrap();
        assert_ne!(lut.cache_id(), id);

        // Invalid operators refuse to finalize.
        lut.set_interpolation(Interpolation::Unknown);
        assert!(lut.finalize().is_err());
    }
}
