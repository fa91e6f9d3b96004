use std::{fs, path::Path};

use anyhow::Context;
use image::{DynamicImage, Rgb};
use imageproc::{drawing::draw_hollow_rect_mut, rect::Rect as DrawRect};
use serde::{Deserialize, Serialize};

/// An axis aligned box in frame pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    /// Center point, rounded down
    pub fn center(&self) -> (u32, u32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }
}

/// Copy of `image` with `rect` outlined in `color`
pub fn draw_box(image: &DynamicImage, rect: Rect, color: [u8; 3]) -> DynamicImage {
    let mut canvas = image.to_rgb8();
    if rect.width > 0 && rect.height > 0 {
        draw_hollow_rect_mut(
            &mut canvas,
            DrawRect::at(rect.x as i32, rect.y as i32).of_size(rect.width, rect.height),
            Rgb(color),
        );
    }
    DynamicImage::ImageRgb8(canvas)
}

/// Saves as PNG, creating parent directories as needed
pub fn save_image<P: AsRef<Path>>(image: &DynamicImage, path: P) -> anyhow::Result<()> {
    let path = path.as_ref().with_extension("png");
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("failed to create {parent:?}"))?;
    }
    image
        .save_with_format(&path, image::ImageFormat::Png)
        .with_context(|| format!("failed to save {path:?}"))
}
