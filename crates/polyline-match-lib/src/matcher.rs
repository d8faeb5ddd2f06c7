//! PolylineMatcher - Top-level manager for the target index and match queries
//!
//! This module provides the high-level API: validated configuration, an owned
//! grid index over the target polylines, and one-to-many / many-to-many
//! matching of source polylines against it.

use crate::{
    AnnotatedPolyline, CoverageResult, GridSpatialIndex, IndexInfo, MatchError, Result, geometry,
    match_polylines,
};
use rayon::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// Extracts the identity value of a polyline from its metadata
pub type IdSelector<T, K> = Arc<dyn Fn(&T) -> K + Send + Sync>;

/// Configuration for the matcher
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Distance within which a target point counts as covered by the source.
    /// Also the margin added to the source bounding box before querying.
    /// Default: 1.0
    pub max_point_dist: f64,
    /// Acceptance threshold: minimum fraction of target points within
    /// `max_point_dist`, in `[0, 1]`.
    /// Default: 1.0 (fully covered)
    pub min_point_match_percentage: f64,
    /// Side length of the spatial grid cells. Should be on the order of the
    /// typical polyline extent. Default: 1000.0
    pub grid_cell_size: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_point_dist: 1.0,
            min_point_match_percentage: 1.0,
            grid_cell_size: 1000.0,
        }
    }
}

impl Config {
    /// Check every numeric parameter against its constraint
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_point_match_percentage) {
            return Err(MatchError::InvalidMatchPercentage(
                self.min_point_match_percentage,
            ));
        }
        if !(self.max_point_dist.is_finite() && self.max_point_dist >= 0.0) {
            return Err(MatchError::InvalidMaxPointDist(self.max_point_dist));
        }
        crate::grid_index::validate_cell_size(self.grid_cell_size)
    }
}

/// A target accepted for a source, with the coverage that justified it
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MatchRecord<T> {
    /// The source polyline (the one doing the covering)
    pub source: Arc<AnnotatedPolyline<T>>,
    /// The covered target polyline
    pub target: Arc<AnnotatedPolyline<T>>,
    /// Position of the target in the bound target sequence
    pub target_position: usize,
    /// Coverage of the target by the source
    pub coverage: CoverageResult,
}

/// All accepted matches of a single source polyline
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MatchGroup<T> {
    /// The source polyline
    pub source: Arc<AnnotatedPolyline<T>>,
    /// Accepted matches, never empty
    pub matches: Vec<MatchRecord<T>>,
}

/// Finds target polylines covered by source polylines
///
/// The target set is indexed once, then queried read-only. Rebinding the
/// targets needs `&mut self`; to share a matcher between threads while still
/// allowing rebinds, wrap it in a `RwLock`.
pub struct PolylineMatcher<T, K> {
    /// Validated configuration
    config: Config,
    /// Identity selector, reused whenever the targets are rebound
    id_selector: IdSelector<T, K>,
    /// Index over the current target set (empty until targets are bound)
    index: GridSpatialIndex<T, K>,
}

/// Builder validating the matcher configuration before any indexing happens
pub struct PolylineMatcherBuilder<T, K> {
    config: Config,
    id_selector: Option<IdSelector<T, K>>,
    target_polylines: Option<Vec<Arc<AnnotatedPolyline<T>>>>,
}

impl<T, K: Eq + Hash> PolylineMatcherBuilder<T, K> {
    /// Set the identity selector (required)
    pub fn id_selector<F>(mut self, id_selector: F) -> Self
    where
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        self.id_selector = Some(Arc::new(id_selector));
        self
    }

    /// Bind an initial target set, indexed by [`build`](Self::build)
    pub fn target_polylines<I, P>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Arc<AnnotatedPolyline<T>>>,
    {
        self.target_polylines = Some(targets.into_iter().map(Into::into).collect());
        self
    }

    /// Validate the configuration and build the matcher
    ///
    /// Fails without indexing anything if the identity selector is missing
    /// or a configuration value is out of range.
    pub fn build(self) -> Result<PolylineMatcher<T, K>> {
        let id_selector = self.id_selector.ok_or(MatchError::MissingIdSelector)?;
        self.config.validate()?;

        let mut matcher = PolylineMatcher {
            index: GridSpatialIndex::empty(self.config.grid_cell_size)?,
            config: self.config,
            id_selector,
        };

        if let Some(targets) = self.target_polylines {
            matcher.set_target_polylines(targets)?;
        }

        Ok(matcher)
    }
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl<T, K: Eq + Hash> PolylineMatcher<T, K> {
    /// Start building a matcher with the given configuration
    pub fn builder(config: Config) -> PolylineMatcherBuilder<T, K> {
        PolylineMatcherBuilder {
            config,
            id_selector: None,
            target_polylines: None,
        }
    }

    /// Replace the target set and rebuild the spatial index
    ///
    /// On error the previous target set stays in place.
    pub fn set_target_polylines<I, P>(&mut self, targets: I) -> Result<()>
    where
        I: IntoIterator<Item = P>,
        P: Into<Arc<AnnotatedPolyline<T>>>,
    {
        #[cfg(feature = "profiling")]
        profiling::scope!("matcher::set_target_polylines");

        let id_selector = Arc::clone(&self.id_selector);
        self.index = GridSpatialIndex::new(targets, self.config.grid_cell_size, |data: &T| {
            id_selector(data)
        })?;
        Ok(())
    }

    /// Find the targets covered by `source`
    ///
    /// The source bounding box is expanded by `max_point_dist`, the index is
    /// queried with it, and every candidate whose matched point fraction
    /// reaches `min_point_match_percentage` is returned. The order of the
    /// records is unspecified.
    pub fn find_matches(&self, source: &Arc<AnnotatedPolyline<T>>) -> Vec<MatchRecord<T>> {
        #[cfg(feature = "profiling")]
        profiling::scope!("matcher::find_matches");

        let query_box =
            geometry::expand_bounding_box(source.line.bounding_box(), self.config.max_point_dist);

        self.index
            .query(query_box)
            .into_iter()
            .filter_map(|candidate| {
                let coverage = match_polylines(
                    source.line.points(),
                    candidate.polyline.line.points(),
                    self.config.max_point_dist,
                );
                coverage
                    .passes(self.config.min_point_match_percentage)
                    .then(|| MatchRecord {
                        source: Arc::clone(source),
                        target: Arc::clone(candidate.polyline),
                        target_position: candidate.position,
                        coverage,
                    })
            })
            .collect()
    }

    /// Find the covered targets of every source
    ///
    /// Sources without any accepted match are left out; the remaining groups
    /// keep the order of `sources`.
    pub fn find_matches_for_all(
        &self,
        sources: &[Arc<AnnotatedPolyline<T>>],
    ) -> Result<Vec<MatchGroup<T>>> {
        #[cfg(feature = "profiling")]
        profiling::scope!("matcher::find_matches_for_all");

        if sources.is_empty() {
            return Err(MatchError::NoSourcePolylines);
        }

        let groups: Vec<MatchGroup<T>> = sources
            .iter()
            .filter_map(|source| self.group_for(source))
            .collect();

        self.log_batch_summary(sources.len(), &groups);
        Ok(groups)
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the number of bound target polylines
    #[inline]
    pub fn target_count(&self) -> usize {
        self.index.len()
    }

    /// Get a reference to the spatial index over the targets
    #[inline]
    pub fn index(&self) -> &GridSpatialIndex<T, K> {
        &self.index
    }

    /// Get index information
    #[inline]
    pub fn index_info(&self) -> IndexInfo {
        self.index.get_info()
    }

    /// Build the group for one source, or `None` if nothing matched
    fn group_for(&self, source: &Arc<AnnotatedPolyline<T>>) -> Option<MatchGroup<T>> {
        let matches = self.find_matches(source);
        (!matches.is_empty()).then(|| MatchGroup {
            source: Arc::clone(source),
            matches,
        })
    }

    fn log_batch_summary(&self, source_count: usize, groups: &[MatchGroup<T>]) {
        let match_count: usize = groups.iter().map(|group| group.matches.len()).sum();
        tracing::debug!(
            "Matched {} of {} source polylines ({} matches) against {} targets",
            groups.len(),
            source_count,
            match_count,
            self.index.len()
        );
    }
}

impl<T, K> PolylineMatcher<T, K>
where
    T: Send + Sync,
    K: Eq + Hash + Send + Sync,
{
    /// Parallel version of [`find_matches_for_all`](Self::find_matches_for_all)
    ///
    /// Produces the same groups in the same order, spreading the sources over
    /// the rayon thread pool.
    pub fn find_matches_for_all_parallel(
        &self,
        sources: &[Arc<AnnotatedPolyline<T>>],
    ) -> Result<Vec<MatchGroup<T>>> {
        #[cfg(feature = "profiling")]
        profiling::scope!("matcher::find_matches_for_all_parallel");

        if sources.is_empty() {
            return Err(MatchError::NoSourcePolylines);
        }

        let groups: Vec<MatchGroup<T>> = sources
            .par_iter()
            .filter_map(|source| self.group_for(source))
            .collect();

        self.log_batch_summary(sources.len(), &groups);
        Ok(groups)
    }
}

impl<T: fmt::Debug, K: fmt::Debug> fmt::Debug for PolylineMatcher<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolylineMatcher")
            .field("config", &self.config)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}
