//! Local image analyzer
//!
//! Similarity is the cosine of coarse RGB colour histograms computed with the
//! `image` crate. Captions and plate readings come from sidecar files written
//! next to each image by the upstream captioning / plate-recognition models:
//!
//! - `car.jpg` → `car.caption.txt`
//! - `car.jpg` → `car.plate.txt` (optional)

use std::path::{Path, PathBuf};

use super::assessor::{AnalysisError, ImageAnalyzer};

/// Histogram bins per colour channel (4 × 4 × 4 = 64 bins)
const BINS_PER_CHANNEL: usize = 4;

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalImageAnalyzer;

impl LocalImageAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

fn sidecar_path(image: &Path, kind: &str) -> PathBuf {
    image.with_extension(format!("{}.txt", kind))
}

fn read_sidecar(image: &Path, kind: &str) -> Result<Option<String>, AnalysisError> {
    let path = sidecar_path(image, kind);
    if !path.exists() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(&path)?;
    let text = text.trim();
    Ok((!text.is_empty()).then(|| text.to_string()))
}

/// Normalized RGB histogram of an image file
pub fn color_histogram(path: &Path) -> Result<Vec<f64>, AnalysisError> {
    if !path.exists() {
        return Err(AnalysisError::NotFound(path.display().to_string()));
    }

    let img = image::open(path)
        .map_err(|e| AnalysisError::Decode(format!("{}: {}", path.display(), e)))?
        .to_rgb8();

    let bucket = 256 / BINS_PER_CHANNEL;
    let mut histogram = vec![0.0; BINS_PER_CHANNEL.pow(3)];
    for pixel in img.pixels() {
        let [r, g, b] = pixel.0;
        let index = (r as usize / bucket) * BINS_PER_CHANNEL * BINS_PER_CHANNEL
            + (g as usize / bucket) * BINS_PER_CHANNEL
            + (b as usize / bucket);
        histogram[index] += 1.0;
    }

    let total = (img.width() as f64) * (img.height() as f64);
    if total > 0.0 {
        for bin in histogram.iter_mut() {
            *bin /= total;
        }
    }
    Ok(histogram)
}

/// Cosine similarity of two non-negative vectors, 0.0 when either is all zero
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

impl ImageAnalyzer for LocalImageAnalyzer {
    fn caption(&self, image: &Path) -> Result<String, AnalysisError> {
        if !image.exists() {
            return Err(AnalysisError::NotFound(image.display().to_string()));
        }
        read_sidecar(image, "caption")?.ok_or_else(|| {
            AnalysisError::Caption(format!(
                "no caption sidecar at {}",
                sidecar_path(image, "caption").display()
            ))
        })
    }

    fn similarity(&self, first: &Path, second: &Path) -> Result<f64, AnalysisError> {
        let a = color_histogram(first)?;
        let b = color_histogram(second)?;
        Ok(cosine_similarity(&a, &b))
    }

    fn read_plate(&self, image: &Path) -> Result<Option<String>, AnalysisError> {
        read_sidecar(image, "plate")
    }
}
