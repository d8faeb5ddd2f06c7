//! Polyline Match Library - Directional Polyline Coverage and Matching
//!
//! This library decides whether one polyline geometrically covers another
//! within a distance tolerance, and finds, among a large set of candidate
//! polylines, the ones covered by a given polyline. It is meant for entity
//! reconciliation between differently digitized line datasets (roads,
//! rivers, tracks) that share a planar coordinate space.
//!
//! # Architecture
//!
//! - **[`geometry`]**: Distances and axis-aligned bounding boxes
//! - **[`Polyline`]** / **[`AnnotatedPolyline`]**: Immutable geometry plus caller metadata
//! - **[`match_polylines`]**: Directional coverage metric producing a [`CoverageResult`]
//! - **[`GridSpatialIndex`]**: Uniform grid bucketing polylines by bounding box
//! - **[`PolylineMatcher`]**: Index owner running one-to-many and many-to-many matching
//!
//! # Performance Characteristics
//!
//! - **Build Time**: O(N × C) where C = cells covered by a polyline's bounding box
//! - **Query Time**: O(Q + K × P) where Q = cells in the query box, K = candidates,
//!   P = points per candidate times segments of the source
//! - **Tuning**: the grid cell size is the dominant knob

pub mod geometry;

mod coverage;
mod grid_index;
mod matcher;
mod polyline;

// Public API exports
pub use coverage::{CoverageResult, match_polylines};
pub use grid_index::{Candidate, GridSpatialIndex, IndexInfo};
pub use matcher::{
    Config, IdSelector, MatchGroup, MatchRecord, PolylineMatcher, PolylineMatcherBuilder,
};
pub use polyline::{AnnotatedPolyline, Polyline};

/// Error types for polyline matching
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("an identity selector is required to deduplicate results from the spatial index")]
    MissingIdSelector,

    #[error("min_point_match_percentage must be between 0 and 1, was {0}")]
    InvalidMatchPercentage(f64),

    #[error("max_point_dist must be a finite number >= 0, was {0}")]
    InvalidMaxPointDist(f64),

    #[error("grid_cell_size must be a finite number > 0, was {0}")]
    InvalidCellSize(f64),

    #[error("identity value at position {position} is already used by another polyline")]
    DuplicateIdentity { position: usize },

    #[error("a polyline needs at least one point")]
    EmptyPolyline,

    #[error("point {position} has a non-finite coordinate")]
    NonFiniteCoordinate { position: usize },

    #[error("no source polylines to match against")]
    NoSourcePolylines,
}

pub type Result<T> = std::result::Result<T, MatchError>;
