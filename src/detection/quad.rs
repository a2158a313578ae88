use imageproc::geometry::approximate_polygon_dp;
use thiserror::Error;

use crate::detection::contours::{TracedContour, contour_area};
use crate::models::{Candidate, Corners, ImageSize, Point};

/// Why a contour produced no candidate. A skip is an expected branch of the
/// per-contour flow, never a detection failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("no tolerance produced a 4-point approximation")]
    NoQuadApproximation,
    #[error("approximation is concave and too small for the relaxation")]
    Concave,
}

/// Approximate one contour to a quadrilateral candidate.
///
/// Polygon simplification runs at each `epsilon_factor * perimeter`,
/// tightest first, and commits to the first tolerance that yields exactly
/// 4 points. A convex result is accepted outright; a concave one is accepted
/// only when its area exceeds `relax_area_ratio` of the image area, since
/// approximation artifacts on large, mostly-rectangular regions are common
/// and those are exactly the candidates worth keeping.
pub fn approximate_candidate(
    contour: &TracedContour,
    size: ImageSize,
    epsilon_factors: &[f64],
    relax_area_ratio: f64,
) -> Result<Candidate, SkipReason> {
    for &factor in epsilon_factors {
        let approx = approximate_polygon_dp(&contour.points, factor * contour.perimeter, true);
        if approx.len() != 4 {
            continue;
        }

        let area = contour_area(&approx);
        let quad = [
            Point::new(approx[0].x as f64, approx[0].y as f64),
            Point::new(approx[1].x as f64, approx[1].y as f64),
            Point::new(approx[2].x as f64, approx[2].y as f64),
            Point::new(approx[3].x as f64, approx[3].y as f64),
        ];
        if !is_convex(&quad) && area <= relax_area_ratio * size.area() {
            return Err(SkipReason::Concave);
        }

        return Ok(Candidate {
            corners: Corners::from_unordered(quad, size),
            area,
        });
    }

    Err(SkipReason::NoQuadApproximation)
}

/// Convexity via consistent cross-product sign over all vertex triples.
/// Near-collinear triples are ignored rather than counted as a sign flip.
pub fn is_convex(points: &[Point; 4]) -> bool {
    let mut sign = 0i8;
    for i in 0..4 {
        let p1 = points[i];
        let p2 = points[(i + 1) % 4];
        let p3 = points[(i + 2) % 4];
        let cross = (p2.x - p1.x) * (p3.y - p2.y) - (p2.y - p1.y) * (p3.x - p2.x);
        if cross.abs() < 1e-9 {
            continue;
        }
        let current = if cross > 0.0 { 1 } else { -1 };
        if sign == 0 {
            sign = current;
        } else if sign != current {
            return false;
        }
    }
    true
}
