//! `polyline-match` - match two polyline datasets from the command line

mod error;
mod loader;
mod report;
mod settings;

use error::CliError;
use loader::Feature;
use polyline_match_lib::PolylineMatcher;
use settings::Settings;
use std::io::BufWriter;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber, defaulting to `info` when RUST_LOG is unset
fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(settings: &Settings) -> Result<(), CliError> {
    let sources = loader::load_files(&settings.sources, &settings.id_field)?;
    let targets = loader::load_files(&settings.targets, &settings.id_field)?;
    tracing::info!(
        "Matching {} source polylines against {} target polylines",
        sources.len(),
        targets.len()
    );

    let matcher = PolylineMatcher::builder(settings.config())
        .id_selector(|feature: &Feature| feature.key.clone())
        .target_polylines(targets)
        .build()?;
    tracing::debug!("Target index: {:?}", matcher.index_info());

    let groups = if settings.parallel {
        matcher.find_matches_for_all_parallel(&sources)?
    } else {
        matcher.find_matches_for_all(&sources)?
    };
    let report = report::build_report(&groups);

    match &settings.output {
        Some(path) => {
            let file = std::fs::File::create(path).map_err(|e| CliError::io(path, e))?;
            report::write_report(&report, BufWriter::new(file))?;
            tracing::info!("Wrote {} source groups to {}", report.len(), path.display());
        }
        None => {
            let stdout = std::io::stdout();
            report::write_report(&report, stdout.lock())?;
            tracing::info!("Wrote {} source groups", report.len());
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    setup_logging();
    let settings = Settings::from_cli();

    match run(&settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::{Path, PathBuf};

    fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_run_end_to_end() {
        let temp_dir = tempfile::tempdir().unwrap();
        let sources = write_file(
            temp_dir.path(),
            "sources.json",
            r#"[{"id": "a", "line": [{"x": 0.0, "y": 0.1}, {"x": 10.0, "y": 0.1}]}]"#,
        );
        let targets = write_file(
            temp_dir.path(),
            "targets.json",
            r#"[
                {"id": 1, "line": [{"x": 0.0, "y": 0.0}, {"x": 10.0, "y": 0.0}]},
                {"id": 2, "line": [{"x": 0.0, "y": 1.0}, {"x": 10.0, "y": 1.0}]}
            ]"#,
        );
        let output = temp_dir.path().join("report.json");

        let settings = Settings::try_parse_from([
            "polyline-match".into(),
            "--sources".into(),
            sources.into_os_string(),
            "--targets".into(),
            targets.into_os_string(),
            "--max-point-dist".into(),
            "0.3".into(),
            "--grid-cell-size".into(),
            "10".into(),
            "--parallel".into(),
            "--output".into(),
            output.clone().into_os_string(),
        ])
        .unwrap();
        run(&settings).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(json[0]["source"], serde_json::Value::from("a"));
        assert_eq!(json[0]["matches"][0]["target"], serde_json::Value::from(1));
        assert_eq!(json[0]["matches"].as_array().unwrap().len(), 1);

        let dir_path = temp_dir.path().to_path_buf();
        temp_dir.close().unwrap();
        assert!(!dir_path.exists());
    }

    #[test]
    fn test_run_rejects_duplicate_targets() {
        let temp_dir = tempfile::tempdir().unwrap();
        let sources = write_file(
            temp_dir.path(),
            "sources.json",
            r#"[{"id": "a", "line": [{"x": 0.0, "y": 0.0}, {"x": 1.0, "y": 0.0}]}]"#,
        );
        let targets = write_file(
            temp_dir.path(),
            "targets.json",
            r#"[
                {"id": 1, "line": [{"x": 0.0, "y": 0.0}]},
                {"id": 1, "line": [{"x": 5.0, "y": 0.0}]}
            ]"#,
        );

        let settings = Settings::try_parse_from([
            "polyline-match".into(),
            "-s".into(),
            sources.into_os_string(),
            "-t".into(),
            targets.into_os_string(),
        ])
        .unwrap();

        assert!(matches!(
            run(&settings),
            Err(CliError::Match(
                polyline_match_lib::MatchError::DuplicateIdentity { position: 1 }
            ))
        ));
    }
}
