//! Image transforms for imgcrawl.
//!
//! - [`TransformDescriptor`] - a named, pure `Image -> Image` operation
//! - [`TransformPipeline`] - ordered descriptors applied to each downloaded image
//! - [`TransformGate`] - at-most-once claim per `(source, transform name)`
//! - [`TransformKind`] - the built-in transforms (identity, grayscale, tint)
//!
//! The gate keys purely on the descriptor's name, so two descriptors that
//! share a name are the same transform as far as caching is concerned.
//!
//! ```rust,ignore
//! use imgcrawl_transform::{TransformGate, TransformKind, TransformPipeline};
//!
//! let pipeline = TransformPipeline::from_kinds(&[TransformKind::Identity, TransformKind::Grayscale]);
//! let gate = TransformGate::new();
//! let outcomes = pipeline.run(&image, &gate, platform.as_ref());
//! let produced = outcomes.iter().filter(|o| o.is_stored()).count();
//! ```

mod builtin;
mod descriptor;
mod gate;
mod pipeline;

pub use builtin::{DEFAULT_TINT_FACTOR, TransformKind, grayscale, identity, tint};
pub use descriptor::TransformDescriptor;
pub use gate::TransformGate;
pub use pipeline::{TransformOutcome, TransformPipeline};
