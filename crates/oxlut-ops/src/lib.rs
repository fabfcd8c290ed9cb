//! # oxlut-ops
//!
//! The 3D LUT operator for the oxlut color pipeline: the in-memory data
//! model, identity and equality semantics, bit-depth rescaling,
//! direction inversion, content-hash cache identity, and functional
//! composition.
//!
//! # Core types
//!
//! - [`Lut3D`] - the operator: a sample cube plus the tags that scale it
//! - [`Lut3DArray`] - dense blue-fastest RGB sample storage
//! - [`range::Range`] - the clamp op an identity LUT collapses to
//! - [`pipeline::Op`] - the mini op chain used when composing
//!
//! # Entry points
//!
//! - [`compose`] - merge two sequential LUTs into one
//! - [`make_fast_lut3d_from_inverse`] - forward rendition of an inverse
//!
//! # Example
//!
//! ```rust
//! use oxlut_ops::{compose, Lut3D};
//!
//! let mut first = Lut3D::new(17)?;
//! let second = Lut3D::new(17)?;
//! compose(&mut first, &second)?;
//!
//! first.finalize()?;
//! assert!(!first.cache_id().is_empty());
//! # Ok::<(), oxlut_ops::LutError>(())
//! ```
//!
//! # Dependencies
//!
//! - [`oxlut_core`] - bit depths, selectors, metadata
//! - `md-5` - cache ID hashing
//! - `thiserror` - error handling
//! - `tracing` - structured diagnostics

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod array;
mod compose;
mod error;
mod lut3d;
pub mod pipeline;
pub mod range;
mod render;

pub use array::{Lut3DArray, MAX_SUPPORTED_LENGTH};
pub use compose::{compose, make_fast_lut3d_from_inverse, FAST_INVERSE_GRID_SIZE};
pub use error::{LutError, LutResult};
pub use lut3d::Lut3D;
