use serde::Serialize;

/// A point in image coordinates (origin top-left, y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Pixel dimensions of the image a result was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> f64 {
        self.width as f64 * self.height as f64
    }

    pub fn center(&self) -> Point {
        Point::new(self.width as f64 / 2.0, self.height as f64 / 2.0)
    }
}

/// Four corner points in canonical order, plus the size of the source image.
///
/// The serialized form is the structural map the host dispatch layer expects:
/// `{"topLeft": {"x": ..., "y": ...}, "topRight": ..., ...}`. The image size
/// stays host-side and is not part of the wire form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Corners {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_right: Point,
    pub bottom_left: Point,
    #[serde(skip)]
    pub size: ImageSize,
}

impl Corners {
    /// Canonicalize 4 unordered points into topLeft, topRight, bottomRight,
    /// bottomLeft.
    ///
    /// Each corner is selected independently per axis rather than by angle
    /// sorting, which stays stable on near-degenerate shapes:
    /// topLeft minimizes x + y, topRight minimizes y - x, bottomRight
    /// maximizes x + y, bottomLeft maximizes y - x. Ties keep the first
    /// occurrence in input order.
    pub fn from_unordered(points: [Point; 4], size: ImageSize) -> Self {
        Self {
            top_left: select(&points, |p| p.x + p.y, false),
            top_right: select(&points, |p| p.y - p.x, false),
            bottom_right: select(&points, |p| p.x + p.y, true),
            bottom_left: select(&points, |p| p.y - p.x, true),
            size,
        }
    }

    /// Corners of the full image frame, the usual caller fallback when
    /// detection finds nothing.
    pub fn full_frame(size: ImageSize) -> Self {
        let w = size.width as f64;
        let h = size.height as f64;
        Self {
            top_left: Point::new(0.0, 0.0),
            top_right: Point::new(w, 0.0),
            bottom_right: Point::new(w, h),
            bottom_left: Point::new(0.0, h),
            size,
        }
    }

    /// Corners in canonical order: topLeft, topRight, bottomRight, bottomLeft.
    pub fn to_array(&self) -> [Point; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    /// Centroid of the four corners.
    pub fn centroid(&self) -> Point {
        let pts = self.to_array();
        Point::new(
            pts.iter().map(|p| p.x).sum::<f64>() / 4.0,
            pts.iter().map(|p| p.y).sum::<f64>() / 4.0,
        )
    }
}

// Strict comparison so equal keys keep the earliest point.
fn select(points: &[Point; 4], key: impl Fn(&Point) -> f64, largest: bool) -> Point {
    let mut best = points[0];
    let mut best_key = key(&points[0]);
    for p in &points[1..] {
        let k = key(p);
        if (largest && k > best_key) || (!largest && k < best_key) {
            best = *p;
            best_key = k;
        }
    }
    best
}

/// A detection result carrying its ranking score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredCorners {
    #[serde(flatten)]
    pub corners: Corners,
    pub score: f64,
}

/// An accepted quadrilateral before scoring: ordered corners plus the
/// approximated polygon's enclosed area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub corners: Corners,
    pub area: f64,
}

/// Enclosed area of a closed polygon via the shoelace formula.
pub fn polygon_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    for i in 0..points.len() {
        let j = (i + 1) % points.len();
        area += points[i].x * points[j].y;
        area -= points[j].x * points[i].y;
    }
    area.abs() / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size() -> ImageSize {
        ImageSize::new(100, 100)
    }

    fn permutations(points: [Point; 4]) -> Vec<[Point; 4]> {
        let mut out = Vec::new();
        for a in 0..4 {
            for b in 0..4 {
                if b == a {
                    continue;
                }
                for c in 0..4 {
                    if c == a || c == b {
                        continue;
                    }
                    let d = 6 - a - b - c;
                    out.push([points[a], points[b], points[c], points[d]]);
                }
            }
        }
        out
    }

    #[test]
    fn ordering_is_permutation_invariant() {
        let points = [
            Point::new(10.0, 12.0),
            Point::new(90.0, 8.0),
            Point::new(88.0, 95.0),
            Point::new(12.0, 91.0),
        ];
        let reference = Corners::from_unordered(points, size());
        for perm in permutations(points) {
            assert_eq!(Corners::from_unordered(perm, size()), reference);
        }
        assert_eq!(reference.top_left, points[0]);
        assert_eq!(reference.top_right, points[1]);
        assert_eq!(reference.bottom_right, points[2]);
        assert_eq!(reference.bottom_left, points[3]);
    }

    #[test]
    fn ordering_handles_skewed_quads() {
        // Strong perspective skew: corner selection must not depend on the
        // points forming anything close to an axis-aligned box.
        let corners = Corners::from_unordered(
            [
                Point::new(60.0, 30.0),
                Point::new(5.0, 10.0),
                Point::new(70.0, 80.0),
                Point::new(20.0, 95.0),
            ],
            size(),
        );
        assert_eq!(corners.top_left, Point::new(5.0, 10.0));
        assert_eq!(corners.top_right, Point::new(60.0, 30.0));
        assert_eq!(corners.bottom_right, Point::new(70.0, 80.0));
        assert_eq!(corners.bottom_left, Point::new(20.0, 95.0));
    }

    #[test]
    fn ordering_tie_break_keeps_first_occurrence() {
        // Two points share the minimal x + y; the earlier one wins.
        let a = Point::new(0.0, 10.0);
        let b = Point::new(10.0, 0.0);
        let corners = Corners::from_unordered(
            [a, b, Point::new(50.0, 50.0), Point::new(0.0, 50.0)],
            size(),
        );
        assert_eq!(corners.top_left, a);
    }

    #[test]
    fn shoelace_area_of_square() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        assert!((polygon_area(&square) - 100.0).abs() < 1e-9);
        // Opposite winding gives the same magnitude.
        let reversed: Vec<Point> = square.iter().rev().copied().collect();
        assert!((polygon_area(&reversed) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn serializes_to_structural_map() {
        let corners = Corners::full_frame(ImageSize::new(4, 3));
        let value = serde_json::to_value(ScoredCorners {
            corners,
            score: 1.25,
        })
        .unwrap();
        assert_eq!(value["topLeft"]["x"], 0.0);
        assert_eq!(value["bottomRight"]["x"], 4.0);
        assert_eq!(value["bottomRight"]["y"], 3.0);
        assert_eq!(value["score"], 1.25);
        assert!(value.get("size").is_none());
    }
}
