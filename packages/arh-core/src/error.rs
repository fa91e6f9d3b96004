use std::path::PathBuf;

/// Everything that can end a watch run unsuccessfully.
///
/// "No match yet" and user cancellation are not errors; they never show up here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid settings or a missing external engine
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("configuration error: failed to load template {path:?}: {source}")]
    Template {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("anchor not found: best score {score:.3} is below confidence {confidence:.3}")]
    AnchorNotFound { score: f32, confidence: f32 },
    #[error("screen capture failed: {0:#}")]
    Capture(anyhow::Error),
    #[error("ocr engine failed: {0:#}")]
    Ocr(anyhow::Error),
    #[error("pointer action failed: {0:#}")]
    Action(anyhow::Error),
}

impl Error {
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_) | Error::Template { .. })
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
