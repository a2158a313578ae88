use crate::models::{Candidate, Point};

/// Tunable weights and parameters for the rectangle quality score.
///
/// The defaults are empirically tuned for "crop the dominant document in the
/// frame": area dominates, shape regularity barely matters, and the uncapped
/// bonus lets frame-filling quadrilaterals outrank everything else.
#[derive(Debug, Clone, Copy)]
pub struct ScoreWeights {
    pub area: f64,
    pub aspect: f64,
    pub edge: f64,
    pub position: f64,
    /// Area ratio above which the additive bonus starts accruing.
    pub bonus_threshold: f64,
    /// Bonus per unit of area ratio beyond the threshold.
    pub bonus_gain: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            area: 0.8,
            aspect: 0.1,
            edge: 0.05,
            position: 0.05,
            bonus_threshold: 0.15,
            bonus_gain: 2.0,
        }
    }
}

impl ScoreWeights {
    /// Combine the four sub-scores and the area bonus into the total score.
    pub fn score(&self, candidate: &Candidate) -> f64 {
        let corners = &candidate.corners;
        let tl = corners.top_left;
        let tr = corners.top_right;
        let br = corners.bottom_right;
        let bl = corners.bottom_left;

        let top_width = tl.distance_to(&tr);
        let bottom_width = bl.distance_to(&br);
        let left_height = tl.distance_to(&bl);
        let right_height = tr.distance_to(&br);

        let area_ratio = candidate.area / corners.size.area();

        let avg_width = (top_width + bottom_width) / 2.0;
        let avg_height = (left_height + right_height) / 2.0;
        let aspect_ratio = if avg_width.min(avg_height) > 0.0 {
            avg_width.max(avg_height) / avg_width.min(avg_height)
        } else {
            f64::INFINITY
        };

        // Opposite-edge mismatch, capped at a 0.5 penalty so perspective
        // skew is tolerated but wildly unequal edges are not rewarded.
        let width_consistency = 1.0 - consistency_penalty(top_width, bottom_width);
        let height_consistency = 1.0 - consistency_penalty(left_height, right_height);
        let edge_score = (width_consistency + height_consistency) / 2.0;

        let centroid = corners.centroid();
        let center = corners.size.center();
        let max_distance = center.distance_to(&Point::new(0.0, 0.0));
        let position_score = if max_distance > 0.0 {
            1.0 - centroid.distance_to(&center) / max_distance
        } else {
            0.0
        };

        let bonus = ((area_ratio - self.bonus_threshold) * self.bonus_gain).max(0.0);

        self.area * area_score(area_ratio)
            + self.aspect * aspect_score(aspect_ratio)
            + self.edge * edge_score
            + self.position * position_score
            + bonus
    }
}

fn consistency_penalty(a: f64, b: f64) -> f64 {
    let longer = a.max(b);
    if longer <= 0.0 {
        return 0.5;
    }
    ((a - b).abs() / longer).min(0.5)
}

/// Banded score for the candidate's share of the image area. Large regions
/// score full marks; small ones are pushed toward zero.
pub fn area_score(area_ratio: f64) -> f64 {
    if area_ratio >= 0.2 {
        1.0
    } else if area_ratio >= 0.1 {
        0.8
    } else if area_ratio >= 0.05 {
        0.4
    } else if area_ratio >= 0.02 {
        0.1
    } else {
        0.01
    }
}

/// Banded score for elongation. Even extreme aspect ratios stay above 0.6;
/// the band only nudges ranking, it never disqualifies.
pub fn aspect_score(aspect_ratio: f64) -> f64 {
    if aspect_ratio <= 3.0 {
        1.0
    } else if aspect_ratio <= 5.0 {
        0.9
    } else if aspect_ratio <= 8.0 {
        0.8
    } else if aspect_ratio <= 12.0 {
        0.7
    } else {
        0.6
    }
}
