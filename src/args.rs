//! Command line arguments.

use std::path::PathBuf;

use arh_controller::ScreenRegion;
use arh_core::config::{OcrConfig, WatchConfig, DEFAULT_MATCH_CONFIDENCE};
use clap::{Args, Parser, Subcommand};

/// Watches a screen region for a phrase and clicks a button when it shows up.
#[derive(Debug, Parser)]
#[command(name = "arh", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Find the anchor once, then poll the region until the phrase appears and click
    #[command(after_help = "\
Examples:
  arh watch -t sendBtn.png -p 让场 -r 500,800,500,400 --binarize
  arh watch -c arh.toml --max-iterations 60
  RUST_LOG=debug arh watch -c arh.toml --debug-dir frames")]
    Watch(WatchArgs),

    /// Find the anchor once and click it
    Click(ClickArgs),
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// TOML file with the watch settings, flags take precedence over it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Image of the button to click
    #[arg(short, long)]
    pub template: Option<PathBuf>,

    /// Text that triggers the click (case sensitive substring)
    #[arg(short, long)]
    pub phrase: Option<String>,

    /// Region to read text from, as `x,y,width,height` [default: full screen]
    #[arg(short, long)]
    pub region: Option<ScreenRegion>,

    /// Minimum match score for the anchor, in (0, 1] [default: 0.8]
    #[arg(long)]
    pub confidence: Option<f32>,

    /// Seconds between polls [default: 1.0]
    #[arg(long)]
    pub interval: Option<f32>,

    /// Otsu-binarize the region before recognizing it
    #[arg(long)]
    pub binarize: bool,

    /// OCR language id [default: chi_sim]
    #[arg(long)]
    pub lang: Option<String>,

    /// Path to the tesseract executable
    #[arg(long)]
    pub tesseract: Option<PathBuf>,

    /// Give up after this many polls
    #[arg(long)]
    pub max_iterations: Option<u64>,

    /// Give up after polling this many seconds
    #[arg(long)]
    pub max_duration: Option<f32>,

    /// Seconds to wait before looking for the anchor
    #[arg(long)]
    pub delay: Option<f32>,

    /// Save the anchor and the latest polled frame here
    #[arg(long)]
    pub debug_dir: Option<PathBuf>,
}

impl WatchArgs {
    /// The config file (or defaults) with every given flag applied on top
    pub fn into_config(self) -> anyhow::Result<WatchConfig> {
        let mut config = match &self.config {
            Some(path) => WatchConfig::load(path)?,
            None => WatchConfig::default(),
        };

        if let Some(template) = self.template {
            config.template_path = template;
        }
        if let Some(phrase) = self.phrase {
            config.target_phrase = phrase;
        }
        if let Some(region) = self.region {
            config.region = Some(region);
        }
        if let Some(confidence) = self.confidence {
            config.match_confidence = confidence;
        }
        if let Some(interval) = self.interval {
            config.poll_interval_secs = interval;
        }
        if self.binarize {
            config.binarize = true;
        }
        if let Some(lang) = self.lang {
            config.language = lang;
        }
        if let Some(cmd) = self.tesseract {
            config.ocr = OcrConfig::Tesseract { cmd: Some(cmd) };
        }
        if let Some(max_iterations) = self.max_iterations {
            config.max_iterations = Some(max_iterations);
        }
        if let Some(max_duration) = self.max_duration {
            config.max_duration_secs = Some(max_duration);
        }
        if let Some(delay) = self.delay {
            config.start_delay_secs = delay;
        }
        if let Some(debug_dir) = self.debug_dir {
            config.debug_dir = Some(debug_dir);
        }

        if config.template_path.as_os_str().is_empty() {
            anyhow::bail!("no template given, pass --template or set template_path in the config");
        }
        // an empty phrase is contained in any text and would click on the first poll
        if config.target_phrase.is_empty() {
            anyhow::bail!("no phrase given, pass --phrase or set target_phrase in the config");
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Args)]
pub struct ClickArgs {
    /// Image of the button to click
    #[arg(short, long)]
    pub template: PathBuf,

    /// Minimum match score, in (0, 1]
    #[arg(long, default_value_t = DEFAULT_MATCH_CONFIDENCE)]
    pub confidence: f32,

    /// Seconds to wait before capturing, e.g. to focus the target window
    #[arg(long, default_value_t = 0.0)]
    pub delay: f32,
}
