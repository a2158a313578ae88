pub mod contours;
pub mod preprocessing;
pub mod quad;
pub mod scoring;

use image::{DynamicImage, GrayImage};

use crate::error::DetectError;
use crate::models::{Corners, ImageSize, ScoredCorners};
use scoring::ScoreWeights;

/// Intermediate images of one detection run, exposed for debugging output.
pub struct DetectionStages {
    pub gray: GrayImage,
    pub blurred: GrayImage,
    pub edges: GrayImage,
    pub dilated: GrayImage,
}

/// Rectangle detection pipeline orchestrator.
///
/// Pure and stateless across calls: every invocation owns its scratch
/// buffers, so separate images can be processed on separate threads without
/// coordination. All tuned constants are plain fields and can be adjusted
/// before use.
pub struct DetectionPipeline {
    /// Gaussian blur sigma applied before edge detection.
    pub blur_sigma: f32,
    /// Canny gradient-magnitude thresholds.
    pub canny_low: f32,
    pub canny_high: f32,
    /// Contours outside this band of area / image-area are discarded as
    /// noise specks or frame-sized outlines.
    pub min_area_ratio: f64,
    pub max_area_ratio: f64,
    /// How many of the largest contours are examined for candidates.
    pub max_contours: usize,
    /// Simplification tolerances as fractions of contour perimeter, tried
    /// tightest first.
    pub epsilon_factors: Vec<f64>,
    /// Concave approximations above this share of the image area are kept.
    pub convexity_relax_ratio: f64,
    pub weights: ScoreWeights,
    pub verbose: bool,
}

impl DetectionPipeline {
    pub fn new() -> Self {
        Self {
            blur_sigma: 1.5,
            canny_low: 50.0,
            canny_high: 150.0,
            min_area_ratio: 0.01,
            max_area_ratio: 0.8,
            max_contours: 30,
            epsilon_factors: vec![0.015, 0.02, 0.025, 0.03],
            convexity_relax_ratio: 0.05,
            weights: ScoreWeights::default(),
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Detect the best rectangle in the image.
    ///
    /// Returns `Ok(None)` when no contour passes validity screening; that is
    /// an expected outcome, not an error. Ties in score keep the
    /// earliest-generated candidate.
    pub fn detect(&self, img: &DynamicImage) -> Result<Option<Corners>, DetectError> {
        Ok(self.detect_all(img)?.into_iter().next().map(|s| s.corners))
    }

    /// Detect every rectangle candidate, ranked by score, best first.
    pub fn detect_all(&self, img: &DynamicImage) -> Result<Vec<ScoredCorners>, DetectError> {
        let size = self.image_size(img)?;
        let stages = self.run_stages(img);

        let found = contours::extract_contours(
            &stages.dilated,
            size,
            self.min_area_ratio,
            self.max_area_ratio,
        );
        if self.verbose {
            println!(
                "Found {} contours, checking top {}",
                found.len(),
                found.len().min(self.max_contours)
            );
        }

        let mut scored = Vec::new();
        for (index, contour) in found.iter().take(self.max_contours).enumerate() {
            match quad::approximate_candidate(
                contour,
                size,
                &self.epsilon_factors,
                self.convexity_relax_ratio,
            ) {
                Ok(candidate) => {
                    let score = self.weights.score(&candidate);
                    if self.verbose {
                        println!("  Contour {}: candidate, score = {:.3}", index, score);
                    }
                    scored.push(ScoredCorners {
                        corners: candidate.corners,
                        score,
                    });
                }
                Err(skip) => {
                    if self.verbose {
                        println!("  Contour {}: skipped ({})", index, skip);
                    }
                }
            }
        }

        // Stable sort keeps generation order among equal scores, which makes
        // repeated runs on the same image return identical rankings.
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        Ok(scored)
    }

    /// Run only the image preprocessing stages (for debugging output).
    pub fn stages(&self, img: &DynamicImage) -> Result<DetectionStages, DetectError> {
        self.image_size(img)?;
        Ok(self.run_stages(img))
    }

    /// Binary edge mask after dilation (for debugging).
    pub fn edge_map(&self, img: &DynamicImage) -> Result<GrayImage, DetectError> {
        Ok(self.stages(img)?.dilated)
    }

    fn image_size(&self, img: &DynamicImage) -> Result<ImageSize, DetectError> {
        let (width, height) = (img.width(), img.height());
        if width == 0 || height == 0 {
            return Err(DetectError::InvalidImage(format!(
                "zero-area input ({}x{})",
                width, height
            )));
        }
        Ok(ImageSize::new(width, height))
    }

    fn run_stages(&self, img: &DynamicImage) -> DetectionStages {
        if self.verbose {
            println!("Preprocessing {}x{} image...", img.width(), img.height());
        }
        let gray = preprocessing::to_grayscale(img);
        let blurred = preprocessing::apply_blur(&gray, self.blur_sigma);
        let edges = preprocessing::detect_edges(&blurred, self.canny_low, self.canny_high);
        let dilated = preprocessing::dilate_edges(&edges);
        DetectionStages {
            gray,
            blurred,
            edges,
            dilated,
        }
    }
}

impl Default for DetectionPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_size_image_is_invalid() {
        let pipeline = DetectionPipeline::new();
        let img = DynamicImage::new_luma8(0, 0);
        assert!(matches!(
            pipeline.detect(&img),
            Err(DetectError::InvalidImage(_))
        ));
        assert!(matches!(
            pipeline.detect_all(&img),
            Err(DetectError::InvalidImage(_))
        ));
    }
}
