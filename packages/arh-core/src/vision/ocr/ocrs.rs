use std::path::Path;

use image::{DynamicImage, GrayImage};
use ocrs::{ImageSource, OcrEngineParams};
use rten::Model;
use tracing::{info, warn};

use super::OcrEngine;
use crate::error::{Error, Result};

/// The ocrs engine with models loaded from disk.
///
/// ocrs only ships latin models, so `language` is ignored.
pub struct OcrsEngine {
    engine: ocrs::OcrEngine,
    warned_language: bool,
}

impl OcrsEngine {
    pub fn load(detection_model: &Path, recognition_model: &Path) -> Result<Self> {
        let load = |path: &Path| {
            Model::load_file(path).map_err(|err| {
                Error::Configuration(format!("failed to load ocrs model {path:?}: {err}"))
            })
        };
        let detection_model = load(detection_model)?;
        let recognition_model = load(recognition_model)?;

        let engine = ocrs::OcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|err| Error::Configuration(format!("failed to create ocrs engine: {err}")))?;
        info!("ocrs engine ready");

        Ok(Self {
            engine,
            warned_language: false,
        })
    }
}

impl OcrEngine for OcrsEngine {
    fn recognize_text(&mut self, image: &GrayImage, language: &str) -> anyhow::Result<String> {
        if !self.warned_language && language != "eng" {
            warn!("ocrs only recognizes latin text, ignoring language {language:?}");
            self.warned_language = true;
        }

        let image = DynamicImage::ImageLuma8(image.clone()).to_rgb8();
        let source = ImageSource::from_bytes(image.as_raw(), image.dimensions())
            .map_err(|err| anyhow::anyhow!("prepare image source error: {err}"))?;
        let input = self
            .engine
            .prepare_input(source)
            .map_err(|err| anyhow::anyhow!("prepare image error: {err}"))?;
        self.engine
            .get_text(&input)
            .map_err(|err| anyhow::anyhow!("recognize text error: {err}"))
    }
}
