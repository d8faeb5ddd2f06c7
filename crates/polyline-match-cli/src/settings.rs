use clap::Parser;
use polyline_match_lib::Config;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Polyline Match - Find target polylines covered by source polylines
///
/// Files ending in `.gpx` are read as GPS tracks (one polyline per track
/// segment, projected to Web Mercator meters). Any other file is read as a
/// JSON array of `{"line": [{"x": .., "y": ..}, ...], "<id-field>": .., ...}`.
pub struct Settings {
    /// Files with the polylines doing the covering
    #[clap(short, long, value_name = "FILE", num_args = 1.., required = true)]
    pub sources: Vec<PathBuf>,

    /// Files with the polylines to be covered (these are indexed)
    #[clap(short, long, value_name = "FILE", num_args = 1.., required = true)]
    pub targets: Vec<PathBuf>,

    /// Identity field of JSON records (string or number, unique per target)
    #[clap(long, default_value = "id")]
    pub id_field: String,

    /// Distance within which a target point counts as covered
    #[clap(short = 'd', long, default_value = "1.0")]
    pub max_point_dist: f64,

    /// Minimum fraction of covered target points (range: 0-1)
    #[clap(short = 'p', long, default_value = "1.0")]
    pub min_point_match_percentage: f64,

    /// Side length of the spatial grid cells, in input units
    #[clap(long, default_value = "1000.0")]
    pub grid_cell_size: f64,

    /// Spread the sources over all cores
    #[clap(long, default_value = "false")]
    pub parallel: bool,

    /// Write the report to this file instead of stdout
    #[clap(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl Settings {
    /// Parse the process arguments, exiting with usage on error
    pub fn from_cli() -> Self {
        Settings::parse()
    }

    /// Matcher configuration from the numeric flags
    pub fn config(&self) -> Config {
        Config {
            max_point_dist: self.max_point_dist,
            min_point_match_percentage: self.min_point_match_percentage,
            grid_cell_size: self.grid_cell_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_library_config() {
        let settings =
            Settings::try_parse_from(["polyline-match", "-s", "a.json", "-t", "b.json"]).unwrap();
        assert_eq!(settings.config(), Config::default());
        assert_eq!(settings.id_field, "id");
        assert!(!settings.parallel);
        assert!(settings.output.is_none());
    }

    #[test]
    fn test_multiple_files_and_overrides() {
        let settings = Settings::try_parse_from([
            "polyline-match",
            "--sources",
            "a.json",
            "b.gpx",
            "--targets",
            "c.json",
            "--id-field",
            "osm_id",
            "--max-point-dist",
            "12.5",
            "--min-point-match-percentage",
            "0.8",
            "--parallel",
        ])
        .unwrap();

        assert_eq!(settings.sources.len(), 2);
        assert_eq!(settings.targets, vec![PathBuf::from("c.json")]);
        assert_eq!(settings.id_field, "osm_id");
        assert_eq!(settings.config().max_point_dist, 12.5);
        assert_eq!(settings.config().min_point_match_percentage, 0.8);
        assert!(settings.parallel);
    }

    #[test]
    fn test_sources_and_targets_are_required() {
        assert!(Settings::try_parse_from(["polyline-match", "-s", "a.json"]).is_err());
        assert!(Settings::try_parse_from(["polyline-match", "-t", "a.json"]).is_err());
    }
}
