use crate::error::CliError;
use crate::loader::Feature;
use polyline_match_lib::{CoverageResult, MatchGroup};
use serde::Serialize;
use serde_json::Value;
use std::io::Write;

/// Report entry for one source polyline with at least one match
#[derive(Debug, Serialize)]
pub struct SourceReport {
    pub source: Value,
    pub matches: Vec<TargetReport>,
}

/// A covered target and its coverage numbers (NaN is written as `null`)
#[derive(Debug, Serialize)]
pub struct TargetReport {
    pub target: Value,
    #[serde(flatten)]
    pub coverage: CoverageResult,
}

/// Flatten matcher output into report entries, keeping the group order.
/// Matches inside a group are sorted by target position for stable output.
pub fn build_report(groups: &[MatchGroup<Feature>]) -> Vec<SourceReport> {
    groups
        .iter()
        .map(|group| {
            let mut matches: Vec<_> = group.matches.iter().collect();
            matches.sort_by_key(|record| record.target_position);
            SourceReport {
                source: group.source.data.id.clone(),
                matches: matches
                    .into_iter()
                    .map(|record| TargetReport {
                        target: record.target.data.id.clone(),
                        coverage: record.coverage,
                    })
                    .collect(),
            }
        })
        .collect()
}

/// Write the report as pretty JSON followed by a newline
pub fn write_report<W: Write>(report: &[SourceReport], mut writer: W) -> Result<(), CliError> {
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer
        .write_all(b"\n")
        .and_then(|()| writer.flush())
        .map_err(|e| CliError::io("<report>", e))
}
