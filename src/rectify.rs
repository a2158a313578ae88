use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, warp_into_with};

use crate::error::DetectError;
use crate::models::{Corners, Point};

/// Warp the quadrilateral described by `corners` into an upright rectangle.
///
/// Output width is the longer of the top/bottom edges, output height the
/// longer of the left/right edges, both rounded to whole pixels. Corner order
/// is load-bearing: swapping any two corners rotates or mirrors the output.
/// Fails with `DegenerateGeometry` when either dimension rounds to zero or
/// the four corners admit no planar homography.
pub fn rectify(image: &DynamicImage, corners: &Corners) -> Result<RgbaImage, DetectError> {
    let tl = corners.top_left;
    let tr = corners.top_right;
    let br = corners.bottom_right;
    let bl = corners.bottom_left;

    let width_top = tl.distance_to(&tr);
    let width_bottom = bl.distance_to(&br);
    let output_width = width_top.max(width_bottom).round() as u32;

    let height_left = tl.distance_to(&bl);
    let height_right = tr.distance_to(&br);
    let output_height = height_left.max(height_right).round() as u32;

    if output_width == 0 || output_height == 0 || image.width() == 0 || image.height() == 0 {
        return Err(DetectError::DegenerateGeometry);
    }

    let map = QuadMap::new(corners, output_width, output_height, image.width(), image.height())
        .ok_or(DetectError::DegenerateGeometry)?;

    let source = image.to_rgba8();
    let mut output = RgbaImage::new(output_width, output_height);
    warp_into_with(
        &source,
        |x, y| map.source_of(x, y),
        Interpolation::Bilinear,
        Rgba([0u8, 0u8, 0u8, 255u8]),
        &mut output,
    );
    Ok(output)
}

/// Projective map taking the output rectangle onto the source quadrilateral.
///
/// Built in f64 from the closed-form unit-square-to-quad homography, which
/// keeps axis-aligned cases exact; solving the control-point system in f32
/// drifts enough near the image border to matter.
struct QuadMap {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
    g: f64,
    h: f64,
    inv_w: f64,
    inv_h: f64,
    max_x: f64,
    max_y: f64,
}

impl QuadMap {
    fn new(corners: &Corners, out_w: u32, out_h: u32, src_w: u32, src_h: u32) -> Option<Self> {
        let Point { x: x0, y: y0 } = corners.top_left;
        let Point { x: x1, y: y1 } = corners.top_right;
        let Point { x: x2, y: y2 } = corners.bottom_right;
        let Point { x: x3, y: y3 } = corners.bottom_left;

        let sx = x0 - x1 + x2 - x3;
        let sy = y0 - y1 + y2 - y3;

        let (a, b, d, e, g, h);
        if sx == 0.0 && sy == 0.0 {
            // Parallelogram, the map is affine.
            a = x1 - x0;
            b = x3 - x0;
            d = y1 - y0;
            e = y3 - y0;
            g = 0.0;
            h = 0.0;
        } else {
            let dx1 = x1 - x2;
            let dx2 = x3 - x2;
            let dy1 = y1 - y2;
            let dy2 = y3 - y2;
            let den = dx1 * dy2 - dx2 * dy1;
            if den == 0.0 {
                return None;
            }
            g = (sx * dy2 - dx2 * sy) / den;
            h = (dx1 * sy - sx * dy1) / den;
            a = x1 - x0 + g * x1;
            b = x3 - x0 + h * x3;
            d = y1 - y0 + g * y1;
            e = y3 - y0 + h * y3;
        }

        // Bilinear sampling reads both floor and ceil neighbors, so clamp
        // samples strictly inside the last source pixel.
        const EDGE_INSET: f64 = 1e-3;
        Some(Self {
            a,
            b,
            c: x0,
            d,
            e,
            f: y0,
            g,
            h,
            inv_w: 1.0 / out_w as f64,
            inv_h: 1.0 / out_h as f64,
            max_x: (src_w - 1) as f64 - EDGE_INSET,
            max_y: (src_h - 1) as f64 - EDGE_INSET,
        })
    }

    /// Pre-image of the output pixel `(x, y)` in source coordinates.
    fn source_of(&self, x: f32, y: f32) -> (f32, f32) {
        let u = x as f64 * self.inv_w;
        let v = y as f64 * self.inv_h;
        let den = self.g * u + self.h * v + 1.0;
        if den.abs() < 1e-12 {
            // Point at infinity, let the warp fill with the default.
            return (-1.0, -1.0);
        }
        let sx = ((self.a * u + self.b * v + self.c) / den).clamp(0.0, self.max_x.max(0.0));
        let sy = ((self.d * u + self.e * v + self.f) / den).clamp(0.0, self.max_y.max(0.0));
        (sx as f32, sy as f32)
    }
}
