//! JSON site manifest.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use imgcrawl_core::{Image, ImageError, Location};

/// Serialized description of a site.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteManifest {
    /// Pages keyed by location.
    #[serde(default)]
    pub pages: BTreeMap<String, PageSpec>,

    /// Images keyed by location.
    #[serde(default)]
    pub images: BTreeMap<String, ImageSpec>,
}

/// Links and image references on one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSpec {
    #[serde(default)]
    pub links: Vec<String>,

    #[serde(default)]
    pub images: Vec<String>,
}

/// A solid-color image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSpec {
    pub width: u32,
    pub height: u32,

    /// RGBA fill color.
    #[serde(default = "default_fill")]
    pub fill: [u8; 4],
}

fn default_fill() -> [u8; 4] {
    [128, 128, 128, 255]
}

impl ImageSpec {
    /// Create a spec.
    pub fn new(width: u32, height: u32, fill: [u8; 4]) -> Self {
        Self {
            width,
            height,
            fill,
        }
    }

    /// Render the spec as an image at `location`.
    pub fn render(&self, location: &Location) -> Result<Image, ImageError> {
        Image::filled(location.clone(), self.width, self.height, self.fill)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_defaults() {
        let manifest: SiteManifest = serde_json::from_str(
            r#"{
                "pages": { "http://site/": { "images": ["http://site/a.png"] } },
                "images": { "http://site/a.png": { "width": 2, "height": 3 } }
            }"#,
        )
        .unwrap();

        let page = &manifest.pages["http://site/"];
        assert!(page.links.is_empty());
        assert_eq!(page.images, vec!["http://site/a.png".to_string()]);
        assert_eq!(manifest.images["http://site/a.png"].fill, [128, 128, 128, 255]);
    }

    #[test]
    fn test_render() {
        let spec = ImageSpec::new(2, 2, [1, 2, 3, 4]);
        let image = spec.render(&Location::new("a.png")).unwrap();
        assert_eq!(image.pixels().len(), 16);
        assert_eq!(&image.pixels()[4..8], &[1, 2, 3, 4]);

        assert!(ImageSpec::new(0, 2, [0; 4]).render(&Location::new("b.png")).is_err());
    }
}
