//! ocrs-backed recognition engine.
//!
//! Pure Rust OCR via the ocrs library. Neural network models are downloaded
//! once into the user cache directory and reused across runs.

use image::DynamicImage;
use ocrs::{DecodeMethod, ImageSource, OcrEngine, OcrEngineParams};
use rten::Model;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::OcrError;
use crate::ocr::{OcrCapability, TextRegion};

/// Default model URLs from the ocrs project
const DETECTION_MODEL_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-detection.rten";
const RECOGNITION_MODEL_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-recognition.rten";

/// Recognition engine wrapping the ocrs library.
pub struct OcrsCapability {
    engine: OcrEngine,
}

impl OcrsCapability {
    /// Create the engine, downloading models if they are not cached yet.
    pub fn new() -> Result<Self, OcrError> {
        tracing::info!("Initializing OCR engine...");

        let detection_model_path =
            ensure_model_downloaded(DETECTION_MODEL_URL, "text-detection.rten")?;
        let recognition_model_path =
            ensure_model_downloaded(RECOGNITION_MODEL_URL, "text-recognition.rten")?;

        let detection_model = Model::load_file(&detection_model_path).map_err(|e| {
            OcrError::Initialization(format!("Failed to load detection model: {}", e))
        })?;
        let recognition_model = Model::load_file(&recognition_model_path).map_err(|e| {
            OcrError::Initialization(format!("Failed to load recognition model: {}", e))
        })?;

        let engine = OcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            decode_method: DecodeMethod::Greedy,
            ..Default::default()
        })
        .map_err(|e| OcrError::Initialization(format!("Failed to create OCR engine: {}", e)))?;

        tracing::info!("OCR engine initialized");

        Ok(Self { engine })
    }
}

impl OcrCapability for OcrsCapability {
    fn recognize(
        &self,
        img_path: &str,
        detect_orientation: bool,
    ) -> Result<Vec<TextRegion>, OcrError> {
        // ocrs has no orientation classifier; the flag is accepted for
        // contract compatibility and recorded.
        if detect_orientation {
            tracing::debug!("orientation detection requested; engine has no classifier");
        }

        let img = load_image(img_path)?;

        // Convert to RGB8 (HWC layout, which ImageSource::from_bytes expects)
        let rgb_img = img.into_rgb8();
        let dimensions = rgb_img.dimensions();

        let img_source = ImageSource::from_bytes(rgb_img.as_raw(), dimensions)
            .map_err(|e| OcrError::Processing(format!("Failed to create image source: {}", e)))?;

        let ocr_input = self
            .engine
            .prepare_input(img_source)
            .map_err(|e| OcrError::Processing(format!("Failed to prepare input: {}", e)))?;

        let word_rects = self
            .engine
            .detect_words(&ocr_input)
            .map_err(|e| OcrError::Processing(format!("Failed to detect words: {}", e)))?;

        let line_rects = self.engine.find_text_lines(&ocr_input, &word_rects);

        let line_texts = self
            .engine
            .recognize_text(&ocr_input, &line_rects)
            .map_err(|e| OcrError::Processing(format!("Failed to recognize text: {}", e)))?;

        let mut regions = Vec::new();
        for (rects, line) in line_rects.iter().zip(line_texts.iter()) {
            let Some(line) = line else { continue };

            let text = line
                .words()
                .map(|word| word.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            if text.is_empty() {
                continue;
            }

            // Axis-aligned quadrilateral enclosing the line's word rectangles
            let mut min_x = f32::INFINITY;
            let mut min_y = f32::INFINITY;
            let mut max_x = f32::NEG_INFINITY;
            let mut max_y = f32::NEG_INFINITY;
            for rect in rects {
                for corner in rect.corners() {
                    min_x = min_x.min(corner.x);
                    min_y = min_y.min(corner.y);
                    max_x = max_x.max(corner.x);
                    max_y = max_y.max(corner.y);
                }
            }
            if !min_x.is_finite() {
                continue;
            }

            let confidence = estimate_confidence(&text);
            regions.push(TextRegion {
                text,
                confidence,
                bounding_box: [
                    [min_x, min_y],
                    [max_x, min_y],
                    [max_x, max_y],
                    [min_x, max_y],
                ],
            });
        }

        Ok(regions)
    }
}

/// Decode an image from a local path or an http(s) URI.
fn load_image(img_path: &str) -> Result<DynamicImage, OcrError> {
    if img_path.starts_with("http://") || img_path.starts_with("https://") {
        let response = ureq::get(img_path)
            .call()
            .map_err(|e| OcrError::Processing(format!("Failed to fetch image: {}", e)))?;

        let bytes = response
            .into_body()
            .read_to_vec()
            .map_err(|e| OcrError::Processing(format!("Failed to read image body: {}", e)))?;

        image::load_from_memory(&bytes)
            .map_err(|e| OcrError::Processing(format!("Failed to decode image: {}", e)))
    } else {
        image::open(img_path)
            .map_err(|e| OcrError::Processing(format!("Failed to load image: {}", e)))
    }
}

/// Ensure a model file is available locally, downloading it if needed.
fn ensure_model_downloaded(url: &str, filename: &str) -> Result<PathBuf, OcrError> {
    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("ocr-web");

    std::fs::create_dir_all(&cache_dir)
        .map_err(|e| OcrError::Initialization(format!("Failed to create cache directory: {}", e)))?;

    let model_path = cache_dir.join(filename);

    if !model_path.exists() {
        tracing::info!("Downloading {} (this may take a moment)...", filename);
        download_file(url, &model_path)?;
        tracing::info!("Downloaded {} to {:?}", filename, model_path);
    } else {
        tracing::info!("Using cached model from {:?}", model_path);
    }

    Ok(model_path)
}

/// Download a file from URL to path using ureq
fn download_file(url: &str, path: &Path) -> Result<(), OcrError> {
    let response = ureq::get(url)
        .call()
        .map_err(|e| OcrError::Initialization(format!("Failed to download model: {}", e)))?;

    let mut file = File::create(path)
        .map_err(|e| OcrError::Initialization(format!("Failed to create model file: {}", e)))?;

    let buffer = response
        .into_body()
        .read_to_vec()
        .map_err(|e| OcrError::Initialization(format!("Failed to read response body: {}", e)))?;

    file.write_all(&buffer)
        .map_err(|e| OcrError::Initialization(format!("Failed to write model file: {}", e)))?;

    Ok(())
}

/// Estimate recognition confidence from text quality.
///
/// ocrs exposes no per-line confidence, so score the recognized text
/// itself: garbled output shows up as special-character noise and as long
/// runs of a repeated character.
fn estimate_confidence(text: &str) -> f32 {
    let total = text.chars().count();
    if total == 0 {
        return 0.0;
    }

    let noise = text
        .chars()
        .filter(|c| !c.is_alphanumeric() && !c.is_whitespace() && !c.is_ascii_punctuation())
        .count();
    let noise_score = 1.0 - ((noise as f32 / total as f32) * 5.0).min(1.0);

    let run_score = if longest_char_run(text) > 4 { 0.6 } else { 1.0 };

    (0.7 * noise_score + 0.3 * run_score).clamp(0.0, 1.0)
}

/// Length of the longest run of one repeated non-whitespace character.
fn longest_char_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    let mut prev: Option<char> = None;

    for c in text.chars() {
        if prev == Some(c) && !c.is_whitespace() {
            current += 1;
        } else {
            current = 1;
        }
        longest = longest.max(current);
        prev = Some(c);
    }

    longest
}
