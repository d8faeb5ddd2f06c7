//! Polyline storage and caller-annotated wrappers
//!
//! This module provides the immutable [`Polyline`] type, which caches its
//! bounding box at construction, and [`AnnotatedPolyline`], which attaches
//! caller metadata to a polyline for indexing.

use crate::{MatchError, Result, geometry};
use geo::{Point, Rect};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An ordered, non-empty sequence of points joined by straight segments
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "Vec<Point<f64>>", into = "Vec<Point<f64>>")
)]
pub struct Polyline {
    /// Points in drawing order
    points: Vec<Point<f64>>,
    /// Precomputed axis-aligned bounding box
    bounding_box: Rect<f64>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl Polyline {
    /// Create a polyline from its points
    ///
    /// # Returns
    /// The polyline, [`MatchError::EmptyPolyline`] if `points` is empty, or
    /// [`MatchError::NonFiniteCoordinate`] for the first point holding a NaN
    /// or infinite coordinate. A single point is accepted and yields a
    /// degenerate polyline without segments.
    pub fn new(points: Vec<Point<f64>>) -> Result<Self> {
        if let Some(position) = points
            .iter()
            .position(|p| !(p.x().is_finite() && p.y().is_finite()))
        {
            return Err(MatchError::NonFiniteCoordinate { position });
        }
        let bounding_box = geometry::bounding_box(&points).ok_or(MatchError::EmptyPolyline)?;
        Ok(Self {
            points,
            bounding_box,
        })
    }

    /// Create a polyline from `(x, y)` pairs
    pub fn from_coords(coords: impl IntoIterator<Item = (f64, f64)>) -> Result<Self> {
        Self::new(coords.into_iter().map(Point::from).collect())
    }

    /// Get the points in order
    #[inline]
    pub fn points(&self) -> &[Point<f64>] {
        &self.points
    }

    /// Get the cached bounding box
    #[inline]
    pub fn bounding_box(&self) -> Rect<f64> {
        self.bounding_box
    }

    /// Number of points (always at least one)
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; kept for API symmetry with slices
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of straight segments (zero for a single point)
    #[inline]
    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    /// True when the polyline has no segment to measure distances against
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 2
    }
}

impl AsRef<[Point<f64>]> for Polyline {
    fn as_ref(&self) -> &[Point<f64>] {
        &self.points
    }
}

impl TryFrom<Vec<Point<f64>>> for Polyline {
    type Error = MatchError;

    fn try_from(points: Vec<Point<f64>>) -> Result<Self> {
        Self::new(points)
    }
}

impl From<Polyline> for Vec<Point<f64>> {
    fn from(polyline: Polyline) -> Self {
        polyline.points
    }
}

/// A polyline together with caller-owned metadata
///
/// The library never mutates the metadata; the spatial index only keeps
/// shared references (`Arc`) for its own lifetime.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnnotatedPolyline<T> {
    /// The geometry
    pub line: Polyline,
    /// Caller metadata, including the identity value used by the index
    pub data: T,
}

impl<T> AnnotatedPolyline<T> {
    /// Wrap a polyline with its metadata
    pub fn new(line: Polyline, data: T) -> Self {
        Self { line, data }
    }
}
