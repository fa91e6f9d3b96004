use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use arh_controller::ScreenRegion;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use tracing::info;

use crate::error::{Error, Result};

/// Default confidence for resolving the anchor
pub const DEFAULT_MATCH_CONFIDENCE: f32 = 0.8;
pub const DEFAULT_TEXT_CONFIDENCE: f32 = 0.7;
pub const DEFAULT_POLL_INTERVAL_SECS: f32 = 1.0;
/// Tesseract language id for simplified Chinese
pub const DEFAULT_LANGUAGE: &str = "chi_sim";

/// Which OCR engine to run and where to find it.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "engine", rename_all = "snake_case")]
pub enum OcrConfig {
    /// The tesseract command line tool.
    ///
    /// `cmd` overrides discovery; see [`crate::vision::ocr::tesseract::resolve_tesseract_cmd`].
    Tesseract {
        #[serde(default)]
        cmd: Option<PathBuf>,
    },
    /// The pure Rust ocrs engine (requires the `ocrs` feature)
    Ocrs {
        detection_model: PathBuf,
        recognition_model: PathBuf,
    },
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self::Tesseract { cmd: None }
    }
}

/// Everything a watch run needs, usually read from `arh.toml` and patched by CLI flags.
///
/// ```toml
/// template_path = "sendBtn.png"
/// target_phrase = "让场"
/// region = { x = 500, y = 800, width = 500, height = 400 }
/// binarize = true
///
/// [ocr]
/// engine = "tesseract"
/// cmd = "/usr/bin/tesseract"
/// ```
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// The anchor image to find and click
    pub template_path: PathBuf,
    /// Text whose appearance triggers the click
    pub target_phrase: String,
    /// Region sampled for text; `None` samples the full screen
    pub region: Option<ScreenRegion>,
    /// Minimum correlation for the anchor, in `(0, 1]`
    pub match_confidence: f32,
    /// Kept for configuration compatibility, the text predicate is plain containment
    pub text_confidence: f32,
    pub poll_interval_secs: f32,
    /// Otsu-binarize the region before recognition
    pub binarize: bool,
    /// OCR language id
    pub language: String,
    pub ocr: OcrConfig,
    /// Stop (without acting) after this many polls
    pub max_iterations: Option<u64>,
    /// Stop (without acting) once polling ran this long
    pub max_duration_secs: Option<f32>,
    /// Wait before resolving the anchor, e.g. to focus the target window
    pub start_delay_secs: f32,
    /// Dump the anchor frame and the latest polled region here as PNG
    pub debug_dir: Option<PathBuf>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            template_path: PathBuf::new(),
            target_phrase: String::new(),
            region: None,
            match_confidence: DEFAULT_MATCH_CONFIDENCE,
            text_confidence: DEFAULT_TEXT_CONFIDENCE,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            binarize: false,
            language: DEFAULT_LANGUAGE.to_string(),
            ocr: OcrConfig::default(),
            max_iterations: None,
            max_duration_secs: None,
            start_delay_secs: 0.0,
            debug_dir: None,
        }
    }
}

impl WatchConfig {
    pub fn new(template_path: impl Into<PathBuf>, target_phrase: impl Into<String>) -> Self {
        Self {
            template_path: template_path.into(),
            target_phrase: target_phrase.into(),
            ..Default::default()
        }
    }

    /// Reads a TOML file; missing keys fall back to their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("loading config from {:?}", path);
        let content = fs::read_to_string(path)
            .map_err(|err| Error::Configuration(format!("failed to read {path:?}: {err}")))?;
        toml::from_str(&content)
            .map_err(|err| Error::Configuration(format!("failed to parse {path:?}: {err}")))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|err| Error::Configuration(format!("failed to serialize config: {err}")))
    }

    pub fn with_region(mut self, region: ScreenRegion) -> Self {
        self.region = Some(region);
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    pub fn with_binarize(mut self, binarize: bool) -> Self {
        self.binarize = binarize;
        self
    }

    // The duration accessors assume `validate()` passed; out of range values read as zero.

    pub fn poll_interval(&self) -> Duration {
        Duration::try_from_secs_f32(self.poll_interval_secs).unwrap_or_default()
    }

    pub fn max_duration(&self) -> Option<Duration> {
        self.max_duration_secs
            .map(|secs| Duration::try_from_secs_f32(secs).unwrap_or_default())
    }

    pub fn start_delay(&self) -> Duration {
        Duration::try_from_secs_f32(self.start_delay_secs).unwrap_or_default()
    }

    /// Rejects values the loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(Error::Configuration(msg));

        if self.template_path.as_os_str().is_empty() {
            return invalid("template_path is empty".to_string());
        }
        if !(self.match_confidence > 0.0 && self.match_confidence <= 1.0) {
            return invalid(format!(
                "match_confidence must be in (0, 1], got {}",
                self.match_confidence
            ));
        }
        if !(0.0..=1.0).contains(&self.text_confidence) {
            return invalid(format!(
                "text_confidence must be in [0, 1], got {}",
                self.text_confidence
            ));
        }
        check_secs("poll_interval_secs", self.poll_interval_secs)?;
        check_secs("start_delay_secs", self.start_delay_secs)?;
        if self.max_iterations == Some(0) {
            return invalid("max_iterations must be at least 1".to_string());
        }
        if let Some(max_duration) = self.max_duration_secs {
            check_secs("max_duration_secs", max_duration)?;
        }
        if let Some(region) = self.region {
            if region.is_empty() {
                return invalid(format!("region {region} is empty"));
            }
            if region.x < 0 || region.y < 0 {
                return invalid(format!("region {region} starts outside the monitor"));
            }
        }
        if self.language.trim().is_empty() {
            return invalid("language is empty".to_string());
        }
        Ok(())
    }
}

/// Seconds must be representable as a [`Duration`]: finite, non-negative, not too large.
fn check_secs(name: &str, secs: f32) -> Result<()> {
    Duration::try_from_secs_f32(secs)
        .map(|_| ())
        .map_err(|err| Error::Configuration(format!("{name} is invalid ({secs}): {err}")))
}
