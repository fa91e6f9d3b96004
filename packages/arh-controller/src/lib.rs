//! arh-controller contains the seams to the desktop: grabbing pixels from the
//! screen and driving the pointer.
//!
//! The detection loop only ever talks to [`ScreenCapper`] and [`Pointer`], so
//! tests can substitute synthetic screens and recording pointers. The real
//! implementation lives in [`desktop`] behind the `desktop` feature.

use std::{fmt, str::FromStr};

use image::DynamicImage;
use serde::{Deserialize, Serialize};

#[cfg(feature = "desktop")]
pub mod desktop;

/// A rectangle in the captured monitor's pixel coordinates.
///
/// The origin is that monitor's top-left corner, so a usable region has
/// non-negative `x`/`y` and must lie inside the monitor (see [`ScreenRegion::fits_in`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScreenRegion {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl ScreenRegion {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether the region lies entirely inside a `width x height` screen at the origin
    pub fn fits_in(&self, width: u32, height: u32) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.x as u64 + self.width as u64 <= width as u64
            && self.y as u64 + self.height as u64 <= height as u64
    }
}

impl fmt::Display for ScreenRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.x, self.y, self.width, self.height)
    }
}

/// Parses `x,y,width,height`
impl FromStr for ScreenRegion {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s.split(',').map(str::trim).collect::<Vec<&str>>();
        let [x, y, width, height] = parts.as_slice() else {
            anyhow::bail!("expected `x,y,width,height`, got {s:?}");
        };
        Ok(Self {
            x: x.parse()?,
            y: y.parse()?,
            width: width.parse()?,
            height: height.parse()?,
        })
    }
}

/// Produces still images of the screen.
pub trait ScreenCapper {
    /// Captures `region`, or the whole primary screen when it is `None`.
    ///
    /// Implementations return exactly `region.width x region.height` pixels or fail.
    fn screencap(&self, region: Option<ScreenRegion>) -> anyhow::Result<DynamicImage>;
}

/// Moves the pointer and clicks on the currently focused display.
pub trait Pointer {
    fn move_to(&mut self, x: i32, y: i32) -> anyhow::Result<()>;

    /// Primary button click at the current pointer position
    fn click(&mut self) -> anyhow::Result<()>;
}

impl<T: ScreenCapper + ?Sized> ScreenCapper for Box<T> {
    fn screencap(&self, region: Option<ScreenRegion>) -> anyhow::Result<DynamicImage> {
        (**self).screencap(region)
    }
}

impl<T: ScreenCapper + ?Sized> ScreenCapper for &T {
    fn screencap(&self, region: Option<ScreenRegion>) -> anyhow::Result<DynamicImage> {
        (**self).screencap(region)
    }
}

impl<T: Pointer + ?Sized> Pointer for Box<T> {
    fn move_to(&mut self, x: i32, y: i32) -> anyhow::Result<()> {
        (**self).move_to(x, y)
    }

    fn click(&mut self) -> anyhow::Result<()> {
        (**self).click()
    }
}
