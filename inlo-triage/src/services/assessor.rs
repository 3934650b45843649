//! Condition assessment
//!
//! `CaptionAssessor` turns image captions into a damage condition using keyword
//! matching, and asks its `ImageAnalyzer` for similarity and plate readings.
//! Captioning and embedding models live behind `ImageAnalyzer`.
//!
//! Any assessment error degrades to an `unknown` result through
//! [`assess_or_unknown`], which the workflow routes to manual assessment.

use std::path::Path;

use thiserror::Error;
use tracing::warn;

use crate::models::assessment::UNKNOWN_VEHICLE;
use crate::models::{AssessmentResult, Condition};
use crate::registry::normalize_vehicle_number;

/// Caption words that mark the target as damaged
pub const DAMAGE_KEYWORDS: &[&str] = &["scratch", "dent", "broken", "crack", "damaged"];

pub const BRAND_KEYWORDS: &[&str] = &["toyota", "honda", "bmw", "maruti", "tata"];

pub const COLOR_KEYWORDS: &[&str] = &["red", "blue", "black", "white", "silver", "maroon"];

/// Image analysis errors
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Image not found: {0}")]
    NotFound(String),

    #[error("Image decode error: {0}")]
    Decode(String),

    #[error("Caption unavailable: {0}")]
    Caption(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Opaque image-analysis oracle (captioning, embedding similarity, plate reading)
pub trait ImageAnalyzer: Send + Sync {
    fn caption(&self, image: &Path) -> Result<String, AnalysisError>;

    /// Similarity of two images in [0, 1]
    fn similarity(&self, first: &Path, second: &Path) -> Result<f64, AnalysisError>;

    /// Registration plate visible in the image, if one can be read
    fn read_plate(&self, _image: &Path) -> Result<Option<String>, AnalysisError> {
        Ok(None)
    }
}

/// Produces an assessment for a target image against a reference image
pub trait ConditionAssessor: Send + Sync {
    fn assess(&self, target: &Path, reference: &Path) -> Result<AssessmentResult, AnalysisError>;
}

/// Explanation of a degraded result; the error itself (with paths) is only logged
pub const DEGRADED_EXPLANATION: &str = "Error processing images: assessment unavailable";

/// Assess, degrading any failure to an `unknown` result
pub fn assess_or_unknown(
    assessor: &dyn ConditionAssessor,
    target: &Path,
    reference: &Path,
) -> AssessmentResult {
    match assessor.assess(target, reference) {
        Ok(result) => result,
        Err(e) => {
            warn!(
                target = %target.display(),
                reference = %reference.display(),
                error = %e,
                "Condition assessment failed, degrading to unknown"
            );
            AssessmentResult::unknown(DEGRADED_EXPLANATION)
        }
    }
}

/// Damage condition from a target caption
pub fn classify_condition(caption: &str) -> Condition {
    let caption = caption.to_lowercase();
    if DAMAGE_KEYWORDS.iter().any(|k| caption.contains(k)) {
        Condition::NotGood
    } else {
        Condition::Good
    }
}

/// True when some keyword appears in both captions
pub fn shared_keyword(reference: &str, target: &str, keywords: &[&str]) -> bool {
    let reference = reference.to_lowercase();
    let target = target.to_lowercase();
    keywords
        .iter()
        .any(|k| reference.contains(k) && target.contains(k))
}

/// Keyword-based assessor over an `ImageAnalyzer`
pub struct CaptionAssessor<A: ImageAnalyzer> {
    analyzer: A,
}

impl<A: ImageAnalyzer> CaptionAssessor<A> {
    pub fn new(analyzer: A) -> Self {
        Self { analyzer }
    }
}

impl<A: ImageAnalyzer> ConditionAssessor for CaptionAssessor<A> {
    fn assess(&self, target: &Path, reference: &Path) -> Result<AssessmentResult, AnalysisError> {
        let ref_caption = self.analyzer.caption(reference)?;
        let tgt_caption = self.analyzer.caption(target)?;

        let condition = classify_condition(&tgt_caption);
        let brand_match = shared_keyword(&ref_caption, &tgt_caption, BRAND_KEYWORDS);
        let color_match = shared_keyword(&ref_caption, &tgt_caption, COLOR_KEYWORDS);

        let overall_similarity = match self.analyzer.similarity(reference, target) {
            Ok(score) => (score.clamp(0.0, 1.0) * 100.0).round() / 100.0,
            Err(e) => {
                warn!(error = %e, "Image similarity unavailable, using 0.0");
                0.0
            }
        };

        let ref_plate = self.analyzer.read_plate(reference)?.map(|p| normalize_vehicle_number(&p));
        let tgt_plate = self.analyzer.read_plate(target)?.map(|p| normalize_vehicle_number(&p));
        let plates_match = matches!((&ref_plate, &tgt_plate), (Some(r), Some(t)) if r == t);

        Ok(AssessmentResult {
            vehicle_number: tgt_plate.unwrap_or_else(|| UNKNOWN_VEHICLE.to_string()),
            condition,
            operative: condition.operability(),
            same_vehicle: condition == Condition::Good && plates_match,
            overall_similarity,
            explanation: format!(
                "Reference: {} | Target: {} | brand match: {}, colour match: {}",
                ref_caption, tgt_caption, brand_match, color_match
            ),
        })
    }
}
