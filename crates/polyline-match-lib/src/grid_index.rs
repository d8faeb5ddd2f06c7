//! Uniform grid spatial index over annotated polylines
//!
//! Every polyline is registered in each grid cell its bounding box overlaps.
//! A long diagonal line therefore also lands in cells it never passes
//! through; those false candidates are removed by the bounding box filter in
//! [`GridSpatialIndex::query`] and by the coverage metric downstream.

use crate::{AnnotatedPolyline, MatchError, Result, geometry};
use geo::Rect;
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;

/// Integer cell coordinates `(x, y)`
type CellKey = (i64, i64);

/// Slots into [`GridSpatialIndex::entries`]; most cells hold only a few lines
type CellBucket = SmallVec<[usize; 4]>;

/// A polyline stored in the index with its resolved identity
#[derive(Debug)]
struct IndexEntry<T, K> {
    /// Identity value, resolved once at construction
    id: K,
    /// Position of the polyline in the sequence passed to the index
    position: usize,
    /// Cached bounding box of the polyline
    bounding_box: Rect<f64>,
    /// Shared reference to the caller's wrapper
    polyline: Arc<AnnotatedPolyline<T>>,
}

/// A polyline returned by a range query
#[derive(Debug)]
pub struct Candidate<'a, T> {
    /// The indexed wrapper
    pub polyline: &'a Arc<AnnotatedPolyline<T>>,
    /// Position of the wrapper in the sequence the index was built from
    pub position: usize,
}

/// Information about the index contents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexInfo {
    /// Number of indexed polylines
    pub polyline_count: usize,
    /// Number of non-empty grid cells
    pub cell_count: usize,
    /// Total number of cell registrations (one polyline counts once per cell)
    pub cell_entry_count: usize,
}

/// Grid of square cells mapping cell coordinates to the polylines overlapping them
#[derive(Debug)]
pub struct GridSpatialIndex<T, K> {
    /// Side length of a grid cell
    cell_size: f64,
    /// All indexed polylines, in input order
    entries: Vec<IndexEntry<T, K>>,
    /// Cell key to the entries whose bounding box overlaps that cell
    cells: HashMap<CellKey, CellBucket>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl<T, K: Eq + Hash> GridSpatialIndex<T, K> {
    /// Create an empty index
    ///
    /// # Returns
    /// An error if `cell_size` is not a finite positive number.
    pub fn empty(cell_size: f64) -> Result<Self> {
        validate_cell_size(cell_size)?;
        Ok(Self {
            cell_size,
            entries: Vec::new(),
            cells: HashMap::new(),
        })
    }

    /// Build an index over `polylines`
    ///
    /// `id_selector` is called once per polyline and its value cached. The
    /// values must be unique: a repeated identity fails with
    /// [`MatchError::DuplicateIdentity`] naming the position of the repeat.
    pub fn new<I, P, F>(polylines: I, cell_size: f64, id_selector: F) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<Arc<AnnotatedPolyline<T>>>,
        F: Fn(&T) -> K,
    {
        #[cfg(feature = "profiling")]
        profiling::scope!("grid_index::new");

        let mut index = Self::empty(cell_size)?;

        let mut entries = Vec::new();
        for (position, polyline) in polylines.into_iter().enumerate() {
            let polyline: Arc<AnnotatedPolyline<T>> = polyline.into();
            entries.push(IndexEntry {
                id: id_selector(&polyline.data),
                position,
                bounding_box: polyline.line.bounding_box(),
                polyline,
            });
        }

        // Reject duplicates before anything is bucketed
        let mut seen = HashSet::with_capacity(entries.len());
        if let Some(entry) = entries.iter().find(|entry| !seen.insert(&entry.id)) {
            return Err(MatchError::DuplicateIdentity {
                position: entry.position,
            });
        }

        for (slot, entry) in entries.iter().enumerate() {
            let (x_range, y_range) = index.cell_range(entry.bounding_box);
            for x in x_range {
                for y in y_range.clone() {
                    index.cells.entry((x, y)).or_default().push(slot);
                }
            }
        }
        index.entries = entries;

        tracing::debug!(
            "Built grid index: {} polylines in {} cells (cell size {})",
            index.entries.len(),
            index.cells.len(),
            index.cell_size
        );

        Ok(index)
    }

    /// Find the polylines whose bounding box intersects `query_box`
    ///
    /// Each identity appears at most once, even when the polyline spans many
    /// of the visited cells. Results follow cell enumeration order; callers
    /// must not rely on any particular order.
    pub fn query(&self, query_box: Rect<f64>) -> Vec<Candidate<'_, T>> {
        #[cfg(feature = "profiling")]
        profiling::scope!("grid_index::query");

        let mut seen: HashSet<&K> = HashSet::new();
        let mut results = Vec::new();

        let (x_range, y_range) = self.cell_range(query_box);
        for x in x_range {
            for y in y_range.clone() {
                let Some(bucket) = self.cells.get(&(x, y)) else {
                    continue;
                };

                for &slot in bucket {
                    let entry = &self.entries[slot];
                    if !seen.insert(&entry.id) {
                        continue; // First occurrence wins
                    }
                    if geometry::bbox_intersect(query_box, entry.bounding_box) {
                        results.push(Candidate {
                            polyline: &entry.polyline,
                            position: entry.position,
                        });
                    }
                }
            }
        }

        results
    }

    /// Inclusive cell ranges covered by a bounding box
    ///
    /// Mins are floored and maxes ceiled, so a box touching a cell edge also
    /// registers in the neighbouring cell.
    fn cell_range(
        &self,
        bbox: Rect<f64>,
    ) -> (std::ops::RangeInclusive<i64>, std::ops::RangeInclusive<i64>) {
        let min = bbox.min();
        let max = bbox.max();

        let min_cell_x = (min.x / self.cell_size).floor() as i64;
        let max_cell_x = (max.x / self.cell_size).ceil() as i64;
        let min_cell_y = (min.y / self.cell_size).floor() as i64;
        let max_cell_y = (max.y / self.cell_size).ceil() as i64;

        (min_cell_x..=max_cell_x, min_cell_y..=max_cell_y)
    }

    /// Get the side length of a grid cell
    #[inline]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Get the number of indexed polylines
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the index holds no polylines
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the number of non-empty cells
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Iterate over the indexed polylines in input order
    pub fn polylines(&self) -> impl Iterator<Item = &Arc<AnnotatedPolyline<T>>> {
        self.entries.iter().map(|entry| &entry.polyline)
    }

    /// Get index information
    pub fn get_info(&self) -> IndexInfo {
        IndexInfo {
            polyline_count: self.entries.len(),
            cell_count: self.cells.len(),
            cell_entry_count: self.cells.values().map(|bucket| bucket.len()).sum(),
        }
    }
}

/// Check that a grid cell size is usable
pub(crate) fn validate_cell_size(cell_size: f64) -> Result<()> {
    if cell_size.is_finite() && cell_size > 0.0 {
        Ok(())
    } else {
        Err(MatchError::InvalidCellSize(cell_size))
    }
}
