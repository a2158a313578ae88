use image::{DynamicImage, GrayImage};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::dilate;

/// Convert image to grayscale
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Apply Gaussian blur to suppress sensor noise before edge detection
pub fn apply_blur(img: &GrayImage, sigma: f32) -> GrayImage {
    gaussian_blur_f32(img, sigma)
}

/// Detect edges using Canny edge detector
pub fn detect_edges(img: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    canny(img, low_threshold, high_threshold)
}

/// One 3x3 dilation pass to bridge 1-2 pixel gaps in the edge mask.
/// `Norm::LInf` with k = 1 is a 3x3 square structuring element.
pub fn dilate_edges(edges: &GrayImage) -> GrayImage {
    dilate(edges, Norm::LInf, 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn dilation_bridges_single_pixel_gap() {
        let mut edges = GrayImage::new(9, 3);
        // Horizontal segment with a one-pixel hole at x = 4.
        for x in [2, 3, 5, 6] {
            edges.put_pixel(x, 1, Luma([255]));
        }
        let dilated = dilate_edges(&edges);
        assert_eq!(dilated.get_pixel(4, 1)[0], 255);
    }
}
