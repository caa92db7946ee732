//! Built-in transforms.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use imgcrawl_core::{Image, TransformError};

use crate::descriptor::TransformDescriptor;

/// Factor applied to the green and blue channels by [`tint`].
pub const DEFAULT_TINT_FACTOR: f32 = 0.5;

/// Built-in transforms selectable by name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TransformKind {
    /// Original image, unchanged.
    Identity,
    /// Luma grayscale.
    Grayscale,
    /// Red tint.
    Tint,
}

impl TransformKind {
    /// Build the descriptor for this transform.
    pub fn descriptor(self) -> TransformDescriptor {
        match self {
            Self::Identity => identity(),
            Self::Grayscale => grayscale(),
            Self::Tint => tint(DEFAULT_TINT_FACTOR),
        }
    }
}

/// Returns the image as downloaded.
pub fn identity() -> TransformDescriptor {
    TransformDescriptor::new(TransformKind::Identity.to_string(), |image: &Image| {
        Ok(image.clone())
    })
}

/// Converts each pixel to its luma, keeping alpha.
pub fn grayscale() -> TransformDescriptor {
    let name = TransformKind::Grayscale.to_string();
    TransformDescriptor::new(name.clone(), move |image: &Image| {
        let pixels = image
            .pixels()
            .chunks_exact(4)
            .flat_map(|px| {
                let luma = (0.299 * f32::from(px[0])
                    + 0.587 * f32::from(px[1])
                    + 0.114 * f32::from(px[2]))
                .round() as u8;
                [luma, luma, luma, px[3]]
            })
            .collect();
        derived(image, &name, pixels)
    })
}

/// Scales green and blue by `factor` (clamped to `0.0..=1.0`).
///
/// A NaN factor falls back to [`DEFAULT_TINT_FACTOR`].
pub fn tint(factor: f32) -> TransformDescriptor {
    let factor = if factor.is_nan() {
        DEFAULT_TINT_FACTOR
    } else {
        factor.clamp(0.0, 1.0)
    };
    let name = TransformKind::Tint.to_string();
    TransformDescriptor::new(name.clone(), move |image: &Image| {
        let scale = |channel: u8| (f32::from(channel) * factor).round() as u8;
        let pixels = image
            .pixels()
            .chunks_exact(4)
            .flat_map(|px| [px[0], scale(px[1]), scale(px[2]), px[3]])
            .collect();
        derived(image, &name, pixels)
    })
}

fn derived(image: &Image, name: &str, pixels: Vec<u8>) -> Result<Image, TransformError> {
    image
        .derive(name, pixels)
        .map_err(|err| TransformError::Failed {
            name: name.to_string(),
            source_location: image.source().clone(),
            message: err.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn sample() -> Image {
        Image::new(
            "http://site/a.png",
            2,
            1,
            vec![255, 0, 0, 255, 10, 200, 40, 128],
        )
        .unwrap()
    }

    #[test]
    fn test_identity_keeps_pixels() {
        let image = sample();
        let out = identity().apply(&image).unwrap();
        assert_eq!(out.pixels(), image.pixels());
        assert_eq!(out.transform(), Some("identity"));
    }

    #[test]
    fn test_grayscale() {
        let out = grayscale().apply(&sample()).unwrap();
        // 0.299 * 255 = 76.245; 0.299 * 10 + 0.587 * 200 + 0.114 * 40 = 124.95
        assert_eq!(out.pixels(), &[76, 76, 76, 255, 125, 125, 125, 128]);
    }

    #[test]
    fn test_tint() {
        let out = tint(0.5).apply(&sample()).unwrap();
        assert_eq!(out.pixels(), &[255, 0, 0, 255, 10, 100, 20, 128]);

        let clamped = tint(4.0).apply(&sample()).unwrap();
        assert_eq!(clamped.pixels(), sample().pixels());
    }

    #[test]
    fn test_tint_nan_uses_default_factor() {
        let out = tint(f32::NAN).apply(&sample()).unwrap();
        let expected = tint(DEFAULT_TINT_FACTOR).apply(&sample()).unwrap();
        assert_eq!(out.pixels(), expected.pixels());
        assert_eq!(out.pixels(), &[255, 0, 0, 255, 10, 100, 20, 128]);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(TransformKind::from_str("grayscale").unwrap(), TransformKind::Grayscale);
        assert_eq!(TransformKind::Tint.descriptor().name(), "tint");
        assert!(TransformKind::from_str("sepia").is_err());
    }
}
