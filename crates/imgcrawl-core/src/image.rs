//! In-memory images and stored artifact references.

use std::path::PathBuf;
use std::sync::Arc;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::error::ImageError;
use crate::location::{CacheKey, Location};

/// BLAKE3 content hash of a stored artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub [u8; 32]);

impl ContentHash {
    /// Create a new ContentHash from raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Hash a byte payload.
    pub fn of(bytes: &[u8]) -> Self {
        Self(*blake3::hash(bytes).as_bytes())
    }

    /// Get the hash as a hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

/// A decoded RGBA8 image held in memory.
///
/// Images are immutable: transforms build new images via [`Image::derive`].
/// Pixel data is shared, so cloning is cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    source: Location,
    width: u32,
    height: u32,
    pixels: Arc<[u8]>,
    transform: Option<CompactString>,
}

impl Image {
    /// Create an image from raw RGBA8 pixels.
    pub fn new(
        source: impl Into<Location>,
        width: u32,
        height: u32,
        pixels: impl Into<Arc<[u8]>>,
    ) -> Result<Self, ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::Empty { width, height });
        }
        let pixels = pixels.into();
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(ImageError::SizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            source: source.into(),
            width,
            height,
            pixels,
            transform: None,
        })
    }

    /// Create an image filled with a single RGBA color.
    pub fn filled(
        source: impl Into<Location>,
        width: u32,
        height: u32,
        rgba: [u8; 4],
    ) -> Result<Self, ImageError> {
        let count = width as usize * height as usize;
        let pixels: Vec<u8> = rgba.iter().copied().cycle().take(count * 4).collect();
        Self::new(source, width, height, pixels)
    }

    /// Build a new image with the same source and size from transformed pixels.
    pub fn derive(&self, transform: &str, pixels: Vec<u8>) -> Result<Self, ImageError> {
        let mut image = Self::new(self.source.clone(), self.width, self.height, pixels)?;
        image.transform = Some(CompactString::new(transform));
        Ok(image)
    }

    /// Same pixels tagged with a transform name.
    pub fn tagged(&self, transform: &str) -> Self {
        Self {
            transform: Some(CompactString::new(transform)),
            ..self.clone()
        }
    }

    pub fn source(&self) -> &Location {
        &self.source
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// RGBA8 pixel bytes, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Name of the transform that produced this image, if any.
    pub fn transform(&self) -> Option<&str> {
        self.transform.as_deref()
    }

    /// Payload size in bytes.
    pub fn byte_len(&self) -> u64 {
        self.pixels.len() as u64
    }
}

/// Reference to an artifact the platform has stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRef {
    /// Key the artifact was stored under.
    pub key: CacheKey,
    /// Where the platform placed it.
    pub path: PathBuf,
    /// Hash of the stored pixels.
    pub hash: ContentHash,
    /// Stored size in bytes.
    pub bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_size_validation() {
        let err = Image::new("a.png", 2, 2, vec![0u8; 15]).unwrap_err();
        assert_eq!(
            err,
            ImageError::SizeMismatch {
                expected: 16,
                actual: 15
            }
        );
        assert!(matches!(
            Image::new("a.png", 0, 2, Vec::<u8>::new()),
            Err(ImageError::Empty { .. })
        ));
    }

    #[test]
    fn test_derive_keeps_original() {
        let original = Image::filled("a.png", 1, 1, [10, 20, 30, 255]).unwrap();
        let derived = original.derive("invert", vec![245, 235, 225, 255]).unwrap();

        assert_eq!(original.pixels(), &[10, 20, 30, 255]);
        assert_eq!(original.transform(), None);
        assert_eq!(derived.transform(), Some("invert"));
        assert_eq!(derived.source(), original.source());
    }

    #[test]
    fn test_content_hash() {
        let a = ContentHash::of(b"pixels");
        let b = ContentHash::of(b"pixels");
        assert_eq!(a, b);
        assert_eq!(a.to_hex().len(), 64);
        assert_ne!(a, ContentHash::of(b"other"));
    }
}
