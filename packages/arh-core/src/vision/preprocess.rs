use arh_cv::{binarize_otsu, rgb_to_luma};
use image::DynamicImage;
use tracing::debug;

use crate::frame::CapturedFrame;

/// Stateless frame normalization before matching or recognition.
pub struct ImagePreprocessor;

impl ImagePreprocessor {
    /// Single channel copy of `frame`. A frame that already is 8 bit gray
    /// comes back with identical pixels.
    pub fn to_gray(frame: &CapturedFrame) -> CapturedFrame {
        frame.with_image(DynamicImage::ImageLuma8(rgb_to_luma(&frame.image)))
    }

    /// Otsu binarization; color frames are converted to gray first.
    pub fn binarize(frame: &CapturedFrame) -> CapturedFrame {
        let gray = match frame.as_gray() {
            Some(gray) => gray.clone(),
            None => rgb_to_luma(&frame.image),
        };
        let (binary, level) = binarize_otsu(&gray);
        debug!("binarized {}x{} frame at level {level}", binary.width(), binary.height());
        frame.with_image(DynamicImage::ImageLuma8(binary))
    }

    /// Gray, then binarized if asked to
    pub fn prepare(frame: &CapturedFrame, binarize: bool) -> CapturedFrame {
        let gray = Self::to_gray(frame);
        if binarize {
            Self::binarize(&gray)
        } else {
            gray
        }
    }
}
