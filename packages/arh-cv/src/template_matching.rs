//! Normalized correlation coefficient matching (`TM_CCOEFF_NORMED`).
//!
//! For every valid top-left offset `(x, y)` the score is
//!
//! ```text
//!            sum(T'(i, j) * I(x + i, y + j))
//! R(x, y) = ---------------------------------
//!              |T'| * |I'(x, y)|
//! ```
//!
//! where `T' = T - mean(T)` and `|I'(x, y)|` is the standard deviation based
//! norm of the window under the template. Because `T'` sums to zero the
//! window mean drops out of the numerator, so only the window energy needs
//! integral images. A window (or template) with zero variance scores `0`.
//!
//! The numerator is a direct correlation, so a `W x H` image against a `w x h`
//! template costs `O(W * H * w * h)`. Rows run in parallel but a full screen
//! against a large template is still slow; keep templates tight and crop the
//! image where the target can only appear in part of it.

use image::{GrayImage, ImageBuffer, Luma};
use imageproc::{integral_image::{integral_image, integral_squared_image}, template_matching::find_extremes};
use rayon::prelude::*;

type IntegralImage = ImageBuffer<Luma<u64>, Vec<u64>>;

/// The global maximum of a correlation surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestMatch {
    /// Top-left corner of the best window
    pub location: (u32, u32),
    /// Correlation coefficient at `location`, in `[-1, 1]`
    pub value: f32,
}

/// Scores `template` against every offset of `image`.
///
/// The result has size `(W - w + 1) x (H - h + 1)`. Returns `None` when the
/// template is empty or does not fit inside the image.
pub fn match_template_ccoeff_normed(
    image: &GrayImage,
    template: &GrayImage,
) -> Option<ImageBuffer<Luma<f32>, Vec<f32>>> {
    let (iw, ih) = image.dimensions();
    let (tw, th) = template.dimensions();
    if tw == 0 || th == 0 || tw > iw || th > ih {
        return None;
    }

    let n = (tw * th) as f64;
    let template_mean = template.pixels().map(|p| p[0] as f64).sum::<f64>() / n;
    let template_centered = template
        .pixels()
        .map(|p| p[0] as f64 - template_mean)
        .collect::<Vec<f64>>();
    let template_norm = template_centered.iter().map(|v| v * v).sum::<f64>().sqrt();

    let sum: IntegralImage = integral_image::<_, u64>(image);
    let sq_sum: IntegralImage = integral_squared_image::<_, u64>(image);

    let (rw, rh) = (iw - tw + 1, ih - th + 1);
    let raw = image.as_raw();

    let data = (0..rh)
        .into_par_iter()
        .flat_map_iter(|y| {
            let template_centered = &template_centered;
            let sum = &sum;
            let sq_sum = &sq_sum;
            (0..rw).map(move |x| {
                let mut numerator = 0.0;
                for j in 0..th {
                    let row = ((y + j) * iw + x) as usize;
                    let template_row = (j * tw) as usize;
                    for i in 0..tw as usize {
                        numerator += template_centered[template_row + i] * raw[row + i] as f64;
                    }
                }

                let s = window_sum(sum, x, y, tw, th) as f64;
                let s2 = window_sum(sq_sum, x, y, tw, th) as f64;
                let window_norm = (s2 - s * s / n).max(0.0).sqrt();

                let denominator = window_norm * template_norm;
                if denominator < 1e-9 {
                    0.0
                } else {
                    (numerator / denominator).clamp(-1.0, 1.0) as f32
                }
            })
        })
        .collect::<Vec<f32>>();

    ImageBuffer::from_vec(rw, rh, data)
}

/// Finds the highest scoring offset of `template` inside `image`.
///
/// Equal maxima resolve to the first offset in row-major order.
pub fn find_best_match(image: &GrayImage, template: &GrayImage) -> Option<BestMatch> {
    let res = match_template_ccoeff_normed(image, template)?;
    let extremes = find_extremes(&res);
    Some(BestMatch {
        location: extremes.max_value_location,
        value: extremes.max_value,
    })
}

/// Sum of the `w x h` window at `(x, y)`; `integral` carries the leading zero row and column.
fn window_sum(integral: &IntegralImage, x: u32, y: u32, w: u32, h: u32) -> u64 {
    let at = |x: u32, y: u32| integral.get_pixel(x, y)[0];
    at(x + w, y + h) + at(x, y) - at(x + w, y) - at(x, y + h)
}
