//! Directional coverage metric between two polylines
//!
//! [`match_polylines`] samples every point of the target and measures it
//! against the segments of the source. The result is asymmetric: a dense
//! target gives a finer coverage estimate, a dense source only gives a more
//! faithful geometric reference.

use crate::geometry;
use geo::Point;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Outcome of measuring how well a source polyline covers a target polyline
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CoverageResult {
    /// Every target point lies within the distance threshold of the source
    pub all_points_within_max_dist: bool,
    /// Mean distance from target points to the source
    pub average_point_distance: f64,
    /// Number of target points within the threshold
    pub matched_point_count: usize,
    /// Largest distance observed over all target points (not the threshold)
    pub max_observed_distance: f64,
    /// Fraction of target points within the threshold, in `[0, 1]`
    pub matched_point_percentage: f64,
}

impl CoverageResult {
    /// Check whether the result reaches an acceptance threshold
    ///
    /// Always false when the percentage is NaN (empty target).
    #[inline]
    pub fn passes(&self, min_point_match_percentage: f64) -> bool {
        self.matched_point_percentage >= min_point_match_percentage
    }
}

/// Measure how well `source` covers `target` within `max_point_dist`
///
/// For each point of `target` the distance to the nearest segment of `source`
/// is computed.
///
/// Degenerate inputs produce data, not errors:
/// * a `source` with fewer than two points yields infinite distances, so no
///   target point matches and the target is never fully covered;
/// * an empty `target` yields NaN for the average and the percentage, a zero
///   maximum and a vacuously true `all_points_within_max_dist`.
pub fn match_polylines(
    source: &[Point<f64>],
    target: &[Point<f64>],
    max_point_dist: f64,
) -> CoverageResult {
    #[cfg(feature = "profiling")]
    profiling::scope!("coverage::match_polylines");

    let mut max_distance: f64 = 0.0;
    let mut matched_point_count: usize = 0;
    let mut total_distance: f64 = 0.0;

    for &point in target {
        let dist = geometry::point_to_polyline_distance(point, source);
        total_distance += dist;

        if dist <= max_point_dist {
            matched_point_count += 1;
        }

        max_distance = max_distance.max(dist);
    }

    // 0 / 0 is NaN for an empty target
    let sample_count = target.len() as f64;

    CoverageResult {
        all_points_within_max_dist: max_distance <= max_point_dist,
        average_point_distance: total_distance / sample_count,
        matched_point_count,
        max_observed_distance: max_distance,
        matched_point_percentage: matched_point_count as f64 / sample_count,
    }
}
