use arh_controller::{ScreenCapper, ScreenRegion};
use chrono::{DateTime, Local};
use image::{ColorType, DynamicImage, GenericImageView, GrayImage};
use tracing::debug;

use crate::error::{Error, Result};

/// A still image of the screen, tagged with where and when it was taken.
///
/// Frames are produced fresh for every capture and never outlive the
/// iteration that requested them.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub image: DynamicImage,
    /// `None` for a full screen capture
    pub region: Option<ScreenRegion>,
    pub captured_at: DateTime<Local>,
}

impl CapturedFrame {
    pub fn new(image: DynamicImage, region: Option<ScreenRegion>) -> Self {
        Self {
            image,
            region,
            captured_at: Local::now(),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn channel_count(&self) -> u8 {
        self.image.color().channel_count()
    }

    pub fn is_gray(&self) -> bool {
        self.image.color() == ColorType::L8
    }

    /// The luma plane, if this frame already is single channel 8 bit
    pub fn as_gray(&self) -> Option<&GrayImage> {
        self.image.as_luma8()
    }

    /// Same region and timestamp, different pixels
    pub(crate) fn with_image(&self, image: DynamicImage) -> Self {
        Self {
            image,
            region: self.region,
            captured_at: self.captured_at,
        }
    }
}

/// Wraps the capture collaborator; a capture either yields a complete frame
/// of the requested size or fails.
pub struct FrameSource<C> {
    capper: C,
}

impl<C: ScreenCapper> FrameSource<C> {
    pub fn new(capper: C) -> Self {
        Self { capper }
    }

    pub fn capture(&self, region: Option<ScreenRegion>) -> Result<CapturedFrame> {
        let image = self.capper.screencap(region).map_err(Error::Capture)?;

        if let Some(region) = region {
            if image.dimensions() != (region.width, region.height) {
                return Err(Error::Capture(anyhow::anyhow!(
                    "requested region {region} but got a {}x{} image",
                    image.width(),
                    image.height()
                )));
            }
        }
        debug!(
            "captured {}x{} frame ({})",
            image.width(),
            image.height(),
            region.map_or("full screen".to_string(), |r| r.to_string())
        );

        Ok(CapturedFrame::new(image, region))
    }

    pub fn capper(&self) -> &C {
        &self.capper
    }
}

#[cfg(test)]
mod test {
    use image::RgbImage;

    use super::*;

    struct Flat(u32, u32);

    impl ScreenCapper for Flat {
        fn screencap(&self, region: Option<ScreenRegion>) -> anyhow::Result<DynamicImage> {
            let screen = DynamicImage::ImageRgb8(RgbImage::new(self.0, self.1));
            Ok(match region {
                Some(r) => screen.view(r.x as u32, r.y as u32, r.width, r.height).to_image().into(),
                None => screen,
            })
        }
    }

    struct Broken;

    impl ScreenCapper for Broken {
        fn screencap(&self, _region: Option<ScreenRegion>) -> anyhow::Result<DynamicImage> {
            anyhow::bail!("display unavailable")
        }
    }

    struct Sloppy;

    impl ScreenCapper for Sloppy {
        fn screencap(&self, _region: Option<ScreenRegion>) -> anyhow::Result<DynamicImage> {
            Ok(DynamicImage::ImageRgb8(RgbImage::new(3, 3)))
        }
    }

    #[test]
    fn test_capture() {
        let source = FrameSource::new(Flat(64, 48));

        let full = source.capture(None).unwrap();
        assert_eq!((full.width(), full.height()), (64, 48));
        assert_eq!(full.region, None);
        assert_eq!(full.channel_count(), 3);

        let region = ScreenRegion::new(10, 5, 20, 8);
        let part = source.capture(Some(region)).unwrap();
        assert_eq!((part.width(), part.height()), (20, 8));
        assert_eq!(part.region, Some(region));
    }

    #[test]
    fn test_capture_failures() {
        let err = FrameSource::new(Broken).capture(None).unwrap_err();
        assert!(matches!(err, Error::Capture(_)));
        assert!(err.to_string().contains("display unavailable"));

        let err = FrameSource::new(Sloppy)
            .capture(Some(ScreenRegion::new(0, 0, 4, 4)))
            .unwrap_err();
        assert!(matches!(err, Error::Capture(_)));
    }
}
