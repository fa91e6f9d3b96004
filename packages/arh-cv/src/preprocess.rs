use image::{DynamicImage, GrayImage, Luma};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};

/// Converts any frame to 8 bit luma using BT.601 weights.
///
/// Alpha is dropped, never composited. An image that is already
/// [`DynamicImage::ImageLuma8`] is returned untouched, so converting twice
/// yields the identical pixel grid.
pub fn rgb_to_luma(image: &DynamicImage) -> GrayImage {
    if let DynamicImage::ImageLuma8(gray) = image {
        return gray.clone();
    }
    let image = image.to_rgb8();
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b] = image.get_pixel(x, y).0;
        let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
        Luma([luma.round().clamp(0.0, 255.0) as u8])
    })
}

/// Global binarization with an automatically chosen (Otsu) level.
///
/// Pixels strictly above the level become 255, the rest 0.
/// Returns the binarized image together with the level that was used.
pub fn binarize_otsu(gray: &GrayImage) -> (GrayImage, u8) {
    let level = otsu_level(gray);
    (threshold(gray, level, ThresholdType::Binary), level)
}
