//! The real desktop: xcap for screenshots, enigo for the pointer.

use anyhow::Context;
use enigo::{Button, Coordinate::Abs, Direction::Click, Enigo, Mouse, Settings};
use image::DynamicImage;
use tracing::{debug, info};
use xcap::Monitor;

use crate::{Pointer, ScreenCapper, ScreenRegion};

/// Connects to the primary monitor and the system pointer.
///
/// Regions are given in the primary monitor's coordinate space, the same
/// space the pointer moves in.
pub fn connect() -> anyhow::Result<(DesktopCapper, DesktopPointer)> {
    Ok((DesktopCapper::primary()?, DesktopPointer::new()?))
}

/// Captures one monitor
pub struct DesktopCapper {
    monitor: Monitor,
}

impl DesktopCapper {
    /// The primary monitor, or the first one if none is marked primary
    pub fn primary() -> anyhow::Result<Self> {
        let monitors = Monitor::all().context("failed to enumerate monitors")?;
        let monitor = match monitors.iter().position(|m| m.is_primary()) {
            Some(index) => monitors.into_iter().nth(index),
            None => monitors.into_iter().next(),
        }
        .ok_or_else(|| anyhow::anyhow!("no monitor found"))?;
        info!(
            "capturing monitor {:?} ({}x{} at {},{})",
            monitor.name(),
            monitor.width(),
            monitor.height(),
            monitor.x(),
            monitor.y()
        );
        Ok(Self { monitor })
    }

    pub fn screen_size(&self) -> (u32, u32) {
        (self.monitor.width(), self.monitor.height())
    }
}

impl ScreenCapper for DesktopCapper {
    fn screencap(&self, region: Option<ScreenRegion>) -> anyhow::Result<DynamicImage> {
        let screen = self
            .monitor
            .capture_image()
            .context("failed to capture monitor")?;
        let screen = DynamicImage::ImageRgba8(screen);

        let Some(region) = region else {
            return Ok(screen);
        };
        if region.is_empty() || !region.fits_in(screen.width(), screen.height()) {
            anyhow::bail!(
                "region {region} is outside the {}x{} screen",
                screen.width(),
                screen.height()
            );
        }
        debug!("cropping screen to {region}");
        Ok(screen.crop_imm(region.x as u32, region.y as u32, region.width, region.height))
    }
}

/// Drives the system pointer
pub struct DesktopPointer {
    enigo: Enigo,
}

impl DesktopPointer {
    pub fn new() -> anyhow::Result<Self> {
        let enigo = Enigo::new(&Settings::default()).context("failed to connect to input driver")?;
        Ok(Self { enigo })
    }
}

impl Pointer for DesktopPointer {
    fn move_to(&mut self, x: i32, y: i32) -> anyhow::Result<()> {
        self.enigo
            .move_mouse(x, y, Abs)
            .with_context(|| format!("failed to move pointer to ({x}, {y})"))
    }

    fn click(&mut self) -> anyhow::Result<()> {
        self.enigo
            .button(Button::Left, Click)
            .context("failed to click primary button")
    }
}
