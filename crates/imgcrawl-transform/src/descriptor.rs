//! Named transform operations.

use std::fmt;
use std::sync::Arc;

use compact_str::CompactString;

use imgcrawl_core::{Image, TransformError};

type TransformFn = dyn Fn(&Image) -> Result<Image, TransformError> + Send + Sync;

/// A named, pure image-to-image operation.
///
/// The function never mutates its input; it returns a new [`Image`].
#[derive(Clone)]
pub struct TransformDescriptor {
    name: CompactString,
    op: Arc<TransformFn>,
}

impl TransformDescriptor {
    /// Create a descriptor from a name and a transform function.
    pub fn new<F>(name: impl AsRef<str>, op: F) -> Self
    where
        F: Fn(&Image) -> Result<Image, TransformError> + Send + Sync + 'static,
    {
        Self {
            name: CompactString::new(name.as_ref()),
            op: Arc::new(op),
        }
    }

    /// Name used for caching and as the storage subdirectory.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Same operation under a different name.
    pub fn renamed(&self, name: impl AsRef<str>) -> Self {
        Self {
            name: CompactString::new(name.as_ref()),
            op: Arc::clone(&self.op),
        }
    }

    /// Apply the transform, tagging the result with this descriptor's name.
    pub fn apply(&self, image: &Image) -> Result<Image, TransformError> {
        let output = (self.op)(image)?;
        Ok(output.tagged(&self.name))
    }
}

impl fmt::Debug for TransformDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformDescriptor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_tags_output() {
        let invert = TransformDescriptor::new("invert", |image: &Image| {
            let pixels = image
                .pixels()
                .chunks_exact(4)
                .flat_map(|px| [255 - px[0], 255 - px[1], 255 - px[2], px[3]])
                .collect();
            Ok(image.derive("invert", pixels).expect("same dimensions"))
        });

        let image = Image::filled("a.png", 1, 1, [0, 100, 255, 7]).unwrap();
        let out = invert.apply(&image).unwrap();
        assert_eq!(out.pixels(), &[255, 155, 0, 7]);
        assert_eq!(out.transform(), Some("invert"));

        let renamed = invert.renamed("negative");
        assert_eq!(renamed.name(), "negative");
        assert_eq!(renamed.apply(&image).unwrap().transform(), Some("negative"));
    }
}
