//! Input loading: JSON polyline records and GPX tracks
//!
//! Both formats end up as [`AnnotatedPolyline<Feature>`], where the feature
//! carries the identity used by the matcher and the remaining properties.

use crate::error::CliError;
use geo::Point;
use polyline_match_lib::{AnnotatedPolyline, Polyline};
use rayon::prelude::*;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Web Mercator bounds in meters (EPSG:3857)
pub const EARTH_MERCATOR_MAX: f64 = 20037508.34;

/// Maximum latitude that can be represented in Web Mercator
pub const MAX_LATITUDE: f64 = 85.05112878;

const LON_TO_X_FACTOR: f64 = EARTH_MERCATOR_MAX / 180.0;
const Y_FACTOR: f64 = EARTH_MERCATOR_MAX / std::f64::consts::PI;

/// Metadata attached to every loaded polyline
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Identity as found in the input (string or number)
    pub id: Value,
    /// Canonical form of `id`, used as the matcher key.
    /// `"1"` and `1` stay distinct.
    pub key: String,
    /// All other record fields
    pub properties: Map<String, Value>,
}

impl Feature {
    fn new(id: Value, properties: Map<String, Value>) -> Self {
        Self {
            key: id.to_string(),
            id,
            properties,
        }
    }
}

pub type LoadedPolyline = Arc<AnnotatedPolyline<Feature>>;

/// One JSON input record; every field but `line` lands in `properties`
#[derive(Deserialize)]
struct RawRecord {
    line: Polyline,
    #[serde(flatten)]
    properties: Map<String, Value>,
}

/// Convert WGS84 (lat, lon) to Web Mercator (x, y) in meters
///
/// Latitude is clamped to the Web Mercator range.
#[inline(always)]
pub fn wgs84_to_mercator(lat: f64, lon: f64) -> Point<f64> {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);

    let x = lon * LON_TO_X_FACTOR;
    let lat_rad = lat.to_radians();
    let y = (lat_rad.tan() + (1.0 / lat_rad.cos())).ln() * Y_FACTOR;

    Point::new(x, y)
}

fn is_gpx(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gpx"))
}

/// Load every file, in parallel, keeping the file order in the output
pub fn load_files(paths: &[PathBuf], id_field: &str) -> Result<Vec<LoadedPolyline>, CliError> {
    #[cfg(feature = "profiling")]
    profiling::scope!("loader::load_files");

    let per_file: Result<Vec<Vec<LoadedPolyline>>, CliError> = paths
        .par_iter()
        .map(|path| load_file(path, id_field))
        .collect();

    Ok(per_file?.into_iter().flatten().collect())
}

/// Load one file, picking the format from its extension
pub fn load_file(path: &Path, id_field: &str) -> Result<Vec<LoadedPolyline>, CliError> {
    let file = std::fs::File::open(path).map_err(|e| CliError::io(path, e))?;
    let reader = BufReader::new(file);

    let polylines = if is_gpx(path) {
        read_gpx(path, reader)?
    } else {
        read_json(path, reader, id_field)?
    };

    tracing::info!("Loaded {} polylines from {}", polylines.len(), path.display());
    Ok(polylines)
}

/// Read a JSON array of polyline records
pub fn read_json<R: Read>(
    path: &Path,
    reader: R,
    id_field: &str,
) -> Result<Vec<LoadedPolyline>, CliError> {
    let records: Vec<RawRecord> =
        serde_json::from_reader(reader).map_err(|source| CliError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    records
        .into_iter()
        .enumerate()
        .map(|(position, mut record)| {
            let id = record
                .properties
                .remove(id_field)
                .ok_or_else(|| CliError::MissingIdentity {
                    path: path.to_path_buf(),
                    position,
                    field: id_field.to_string(),
                })?;
            if !(id.is_string() || id.is_number()) {
                return Err(CliError::InvalidIdentity {
                    path: path.to_path_buf(),
                    position,
                    field: id_field.to_string(),
                });
            }
            Ok(Arc::new(AnnotatedPolyline::new(
                record.line,
                Feature::new(id, record.properties),
            )))
        })
        .collect()
}

/// Read a GPX file, one polyline per usable track segment
///
/// Identities are `"<file stem>/<track>/<segment>"` with zero-based indices.
pub fn read_gpx<R: Read>(path: &Path, reader: R) -> Result<Vec<LoadedPolyline>, CliError> {
    let gpx = gpx::read(reader).map_err(|source| CliError::Gpx {
        path: path.to_path_buf(),
        source,
    })?;
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut polylines = Vec::new();
    for (track_idx, track) in gpx.tracks.iter().enumerate() {
        for (segment_idx, segment) in track.segments.iter().enumerate() {
            let points: Vec<Point<f64>> = segment
                .points
                .iter()
                .map(|waypoint| wgs84_to_mercator(waypoint.point().y(), waypoint.point().x()))
                .collect();

            let line = match Polyline::new(points) {
                Ok(line) => line,
                Err(e) => {
                    tracing::warn!(
                        "Skipping segment {} of track {} in {}: {}",
                        segment_idx,
                        track_idx,
                        path.display(),
                        e
                    );
                    continue;
                }
            };

            let mut properties = Map::new();
            if let Some(name) = &track.name {
                properties.insert("name".to_string(), Value::String(name.clone()));
            }
            let id = Value::String(format!("{stem}/{track_idx}/{segment_idx}"));
            polylines.push(Arc::new(AnnotatedPolyline::new(
                line,
                Feature::new(id, properties),
            )));
        }
    }

    Ok(polylines)
}
