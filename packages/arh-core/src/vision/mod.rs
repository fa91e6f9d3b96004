//! Everything that looks at pixels: grayscale/binarize, anchor matching and
//! text recognition.

pub mod matcher;
pub mod ocr;
pub mod preprocess;
pub mod utils;

pub use matcher::{MatchResult, TemplateMatcher};
pub use ocr::{RecognizedText, TextRecognizer};
pub use preprocess::ImagePreprocessor;
