use image::GrayImage;
use imageproc::contours::{BorderType, find_contours};
use imageproc::geometry::arc_length;
use imageproc::point::Point as ImgPoint;

use crate::models::{ImageSize, Point, polygon_area};

/// A hole border tracing at least this share of its parent's area is the
/// inside of the same edge band, not a nested shape.
const BAND_HOLE_RATIO: f64 = 0.8;

/// A closed boundary curve traced from the edge mask, with its shoelace area
/// and perimeter precomputed. Points stay on the integer pixel grid until
/// polygon approximation picks the corner subset.
#[derive(Debug, Clone)]
pub struct TracedContour {
    pub points: Vec<ImgPoint<i32>>,
    pub area: f64,
    pub perimeter: f64,
}

/// Shoelace area of an integer contour.
pub fn contour_area(points: &[ImgPoint<i32>]) -> f64 {
    let float_points: Vec<Point> = points
        .iter()
        .map(|p| Point::new(p.x as f64, p.y as f64))
        .collect();
    polygon_area(&float_points)
}

/// Find closed boundary curves in a binary edge mask, drop noise specks and
/// frame-sized outer contours, and order the survivors by area, largest first.
///
/// Border following runs in tree mode (outer and hole borders both traced).
/// A closed edge band yields two borders per shape; the outer one runs a few
/// pixels outside the drawn boundary and rounds off convex corners, while
/// the hole border hugs the inside of the band and keeps them sharp, so when
/// a hole traces the same band as its parent it supersedes the outer border.
/// The descending order matters: downstream stages only examine a bounded
/// prefix, so it decides which rectangles are considered at all.
pub fn extract_contours(
    edges: &GrayImage,
    size: ImageSize,
    min_area_ratio: f64,
    max_area_ratio: f64,
) -> Vec<TracedContour> {
    let raw: Vec<imageproc::contours::Contour<i32>> = find_contours(edges);
    let image_area = size.area();

    let areas: Vec<f64> = raw.iter().map(|c| contour_area(&c.points)).collect();
    let mut superseded = vec![false; raw.len()];
    for (index, contour) in raw.iter().enumerate() {
        if contour.border_type != BorderType::Hole {
            continue;
        }
        if let Some(parent) = contour.parent {
            if areas[index] >= BAND_HOLE_RATIO * areas[parent] {
                superseded[parent] = true;
            }
        }
    }

    let mut contours: Vec<TracedContour> = raw
        .into_iter()
        .enumerate()
        .filter(|(index, c)| !superseded[*index] && c.points.len() >= 3)
        .filter_map(|(index, c)| {
            let area = areas[index];
            let ratio = area / image_area;
            if ratio < min_area_ratio || ratio > max_area_ratio {
                return None;
            }
            let perimeter = arc_length(&c.points, true);
            Some(TracedContour {
                points: c.points,
                area,
                perimeter,
            })
        })
        .collect();

    contours.sort_by(|a, b| b.area.partial_cmp(&a.area).unwrap_or(std::cmp::Ordering::Equal));
    contours
}
