//! The recognition capability behind the gateway.
//!
//! The engine is constructed once at startup and shared read-only across
//! requests; handlers reach it through the router state.

pub mod ocrs;

use serde::{Deserialize, Serialize};

use crate::error::OcrError;

/// One recognized text region: the line text, a confidence estimate in
/// `[0, 1]`, and the quadrilateral enclosing the region (corner points
/// clockwise from top-left).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRegion {
    pub text: String,
    pub confidence: f32,
    #[serde(rename = "box")]
    pub bounding_box: [[f32; 2]; 4],
}

/// Recognition engine interface.
pub trait OcrCapability: Send + Sync {
    /// Recognize text regions in the image at `img_path`, a local path or an
    /// http(s) URI. `detect_orientation` asks the engine to classify and
    /// correct text orientation where supported.
    fn recognize(
        &self,
        img_path: &str,
        detect_orientation: bool,
    ) -> Result<Vec<TextRegion>, OcrError>;
}
