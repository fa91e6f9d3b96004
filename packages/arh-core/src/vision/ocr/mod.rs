//! Text recognition. The heavy lifting is done by an external [`OcrEngine`];
//! [`TextRecognizer`] prepares the frame, times the call and cleans up the result.

use std::{
    borrow::Cow,
    time::{Duration, Instant},
};

use arh_cv::rgb_to_luma;
use image::GrayImage;
use serde::Serialize;
use tracing::debug;

use crate::{
    config::OcrConfig,
    error::{Error, Result},
    frame::CapturedFrame,
    vision::preprocess::ImagePreprocessor,
};

#[cfg(feature = "ocrs")]
pub mod ocrs;
pub mod tesseract;

/// Anything that turns pixels into a string.
pub trait OcrEngine {
    /// Raw engine output for `image`; `language` is an engine specific model id.
    fn recognize_text(&mut self, image: &GrayImage, language: &str) -> anyhow::Result<String>;
}

impl<T: OcrEngine + ?Sized> OcrEngine for Box<T> {
    fn recognize_text(&mut self, image: &GrayImage, language: &str) -> anyhow::Result<String> {
        (**self).recognize_text(image, language)
    }
}

/// Builds the engine described by `config`, failing fast when it cannot be found.
pub fn create_engine(config: &OcrConfig) -> Result<Box<dyn OcrEngine + Send>> {
    match config {
        OcrConfig::Tesseract { cmd } => {
            let engine = tesseract::TesseractEngine::discover(cmd.as_deref())?;
            Ok(Box::new(engine))
        }
        #[cfg(feature = "ocrs")]
        OcrConfig::Ocrs {
            detection_model,
            recognition_model,
        } => {
            let engine = ocrs::OcrsEngine::load(detection_model, recognition_model)?;
            Ok(Box::new(engine))
        }
        #[cfg(not(feature = "ocrs"))]
        OcrConfig::Ocrs { .. } => Err(Error::Configuration(
            "the ocrs engine is not available, rebuild with the `ocrs` feature".to_string(),
        )),
    }
}

/// Text read from one region frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecognizedText {
    /// Engine output without leading/trailing whitespace
    pub text: String,
    pub elapsed: Duration,
}

pub struct TextRecognizer<E> {
    engine: E,
    language: String,
}

impl<E: OcrEngine> TextRecognizer<E> {
    pub fn new(engine: E, language: impl Into<String>) -> Self {
        Self {
            engine,
            language: language.into(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Converts `frame` to gray, optionally binarizes it, and recognizes it.
    pub fn recognize(&mut self, frame: &CapturedFrame, binarize: bool) -> Result<RecognizedText> {
        let prepared = ImagePreprocessor::prepare(frame, binarize);
        self.recognize_prepared(&prepared)
    }

    /// Recognizes a frame that has already been through [`ImagePreprocessor`].
    pub fn recognize_prepared(&mut self, frame: &CapturedFrame) -> Result<RecognizedText> {
        let gray = match frame.as_gray() {
            Some(gray) => Cow::Borrowed(gray),
            None => Cow::Owned(rgb_to_luma(&frame.image)),
        };

        let start = Instant::now();
        let raw = self
            .engine
            .recognize_text(&gray, &self.language)
            .map_err(Error::Ocr)?;
        let elapsed = start.elapsed();

        let text = raw.trim().to_string();
        debug!(
            "recognized {:?} from {}x{} frame, cost {:.3}s",
            text,
            gray.width(),
            gray.height(),
            elapsed.as_secs_f32()
        );
        Ok(RecognizedText { text, elapsed })
    }
}
