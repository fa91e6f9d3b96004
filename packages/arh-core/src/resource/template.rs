use std::path::{Path, PathBuf};

use arh_cv::rgb_to_luma;
use image::{DynamicImage, GrayImage};
use tracing::debug;

use crate::error::{Error, Result};

/// The anchor image, loaded once and kept in grayscale.
///
/// Any alpha channel in the file is dropped before conversion, so a
/// transparent PNG matches the same as its opaque counterpart.
#[derive(Debug, Clone)]
pub struct TemplateAsset {
    path: Option<PathBuf>,
    gray: GrayImage,
}

impl TemplateAsset {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|source| Error::Template {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            "loaded template {:?} ({}x{}, {:?})",
            path,
            image.width(),
            image.height(),
            image.color()
        );

        let mut asset = Self::from_image(&image);
        asset.path = Some(path.to_path_buf());
        Ok(asset)
    }

    pub fn from_image(image: &DynamicImage) -> Self {
        let opaque = DynamicImage::ImageRgb8(image.to_rgb8());
        Self {
            path: None,
            gray: rgb_to_luma(&opaque),
        }
    }

    pub fn gray(&self) -> &GrayImage {
        &self.gray
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.gray.dimensions()
    }
}
