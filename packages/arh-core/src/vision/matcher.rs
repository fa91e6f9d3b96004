use std::time::Instant;

use arh_cv::find_best_match;
use image::GrayImage;
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    vision::utils::Rect,
};

/// Confidence used to resolve the anchor when none is configured
pub const DEFAULT_CONFIDENCE: f32 = 0.8;

/// Outcome of one [`TemplateMatcher::find`] call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchResult {
    /// `score >= confidence`
    pub found: bool,
    /// Center of the best window, only set when `found`
    pub center: Option<(u32, u32)>,
    /// Best correlation, clamped to `[0, 1]`
    pub score: f32,
    /// Best window, set even when the score is under the confidence
    pub rect: Option<Rect>,
}

impl MatchResult {
    fn not_found(score: f32, rect: Option<Rect>) -> Self {
        Self {
            found: false,
            center: None,
            score,
            rect,
        }
    }
}

/// Finds a template inside a frame with `TM_CCOEFF_NORMED`.
pub struct TemplateMatcher;

impl TemplateMatcher {
    /// Scores `template` at every offset of `screen` and keeps the global
    /// maximum; equal maxima resolve to the first offset in raster order.
    ///
    /// A template bigger than the screen is simply not found. `confidence`
    /// outside `(0, 1]` is rejected as a configuration error.
    pub fn find(screen: &GrayImage, template: &GrayImage, confidence: f32) -> Result<MatchResult> {
        if !(confidence > 0.0 && confidence <= 1.0) {
            return Err(Error::Configuration(format!(
                "match confidence must be in (0, 1], got {confidence}"
            )));
        }

        let start = Instant::now();
        let Some(best) = find_best_match(screen, template) else {
            warn!(
                "template {}x{} does not fit in the {}x{} frame",
                template.width(),
                template.height(),
                screen.width(),
                screen.height()
            );
            return Ok(MatchResult::not_found(0.0, None));
        };

        let score = best.value.max(0.0);
        let rect = Rect {
            x: best.location.0,
            y: best.location.1,
            width: template.width(),
            height: template.height(),
        };
        debug!(
            "best match {:?} score {:.4} (confidence {confidence}), cost {:.3}s",
            best.location,
            score,
            start.elapsed().as_secs_f32()
        );

        if score >= confidence {
            Ok(MatchResult {
                found: true,
                center: Some(rect.center()),
                score,
                rect: Some(rect),
            })
        } else {
            Ok(MatchResult::not_found(score, Some(rect)))
        }
    }
}
