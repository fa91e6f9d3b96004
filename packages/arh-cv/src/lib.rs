//! CPU image routines used by arh.
//!
//! Both strategies share the same grayscale pipeline: [`preprocess`] turns a
//! captured color frame into a single channel (optionally Otsu-binarized)
//! image, and [`template_matching`] slides a template over it and scores every
//! offset with the normalized correlation coefficient.

#![deny(clippy::all)]

pub mod preprocess;
pub mod template_matching;

pub use preprocess::{binarize_otsu, rgb_to_luma};
pub use template_matching::{find_best_match, match_template_ccoeff_normed, BestMatch};
