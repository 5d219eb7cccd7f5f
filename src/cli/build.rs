//! Zone build sequence
//!
//! init -> load -> commit (twice) -> dump -> deinit
//!
//! An init failure aborts before anything is loaded. A commit failure is
//! reported after the session has been released.

use std::io;

use clap::error::ErrorKind;
use clap::Parser;

use super::args::Cli;
use super::config::BuildConfig;
use super::errors::{CliError, CliResult};
use super::io::{write_error, write_summary};
use crate::loader::{load_file, LoadReport, PropertyFilter};
use crate::observability::{log_event_with_fields, Event, Logger, ObservationScope, Severity};
use crate::zone::{Nvram, NvramZone, ZoneSummary};

/// Result of a successful build.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub summary: ZoneSummary,
    pub report: LoadReport,
}

/// Builds the zone image described by `config`.
pub fn build_zone(config: &BuildConfig) -> CliResult<BuildOutcome> {
    let mut zone = NvramZone::init(&config.output, config.size)
        .map_err(|e| CliError::init_failed(&e))?;

    let report = load_file(
        &mut zone,
        &config.config,
        PropertyFilter::All,
        config.loader_options(),
    );

    let scope = ObservationScope::new("COMMIT");
    // Both commits run; either failing fails the build.
    let first = zone.commit();
    let second = zone.commit();
    let committed = first.and(second);

    let result = match committed {
        Ok(header) => {
            scope.complete_with_fields(&[
                ("checksum", &format!("{:08x}", header.checksum)),
                ("generation", &header.generation.to_string()),
            ]);
            Ok(BuildOutcome {
                summary: zone.show(),
                report,
            })
        }
        Err(e) => {
            scope.fail(&e.to_string());
            Err(CliError::commit_failed(&e))
        }
    };

    zone.deinit();
    result
}

/// Parses arguments, runs the build and returns the process exit status.
pub fn run() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
        }
    };

    if cli.verbose {
        Logger::set_min_severity(Severity::Trace);
    }

    let config = match BuildConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => return report_error(&e, cli.json),
    };

    match execute(&config) {
        Ok(()) => 0,
        Err(e) => report_error(&e, config.json),
    }
}

fn execute(config: &BuildConfig) -> CliResult<()> {
    let config_json = serde_json::to_string(config)?;
    log_event_with_fields(Event::ConfigLoaded, &[("config", &config_json)]);

    log_event_with_fields(
        Event::BuildStart,
        &[("output", &config.output.display().to_string())],
    );
    let outcome = build_zone(config)?;
    log_event_with_fields(
        Event::BuildComplete,
        &[
            ("applied", &outcome.report.applied.to_string()),
            ("used_bytes", &outcome.summary.used_bytes.to_string()),
        ],
    );

    write_summary(
        &mut io::stdout().lock(),
        &outcome.summary,
        &outcome.report,
        config.json,
    )
}

fn report_error(err: &CliError, as_json: bool) -> i32 {
    if as_json {
        if write_error(err.code_str(), err.message()).is_err() {
            eprintln!("{}", err);
        }
    } else {
        eprintln!("{}", err);
    }
    err.exit_code()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::CliErrorCode;
    use crate::zone::ZoneReader;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_prop(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("nvram.prop");
        fs::write(&path, content).unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
        }
        path
    }

    #[test]
    fn test_build_writes_image() {
        let dir = TempDir::new().unwrap();
        let prop = write_prop(&dir, "a=1\nb = 2\n");
        let image = dir.path().join("nvram.img");

        let outcome = build_zone(&BuildConfig::new(0x100, &prop, &image)).unwrap();

        assert_eq!(outcome.report.applied, 2);
        assert_eq!(outcome.summary.tuples.len(), 2);
        assert_eq!(fs::metadata(&image).unwrap().len(), 0x100);

        let snapshot = ZoneReader::read(&image).unwrap();
        assert_eq!(snapshot.get("b"), Some("2"));
        assert_eq!(Some(snapshot.header.checksum), outcome.summary.checksum);
    }

    #[test]
    fn test_double_commit_keeps_first_generation() {
        let dir = TempDir::new().unwrap();
        let prop = write_prop(&dir, "a=1\n");
        let image = dir.path().join("nvram.img");

        let outcome = build_zone(&BuildConfig::new(0x100, &prop, &image)).unwrap();
        assert_eq!(outcome.summary.generation, Some(1));
    }

    #[test]
    fn test_missing_property_file_still_commits() {
        let dir = TempDir::new().unwrap();
        let image = dir.path().join("nvram.img");

        let outcome = build_zone(&BuildConfig::new(
            0x100,
            dir.path().join("missing.prop"),
            &image,
        ))
        .unwrap();

        assert!(outcome.summary.tuples.is_empty());
        assert_eq!(outcome.report.skipped_files().count(), 1);
        assert!(ZoneReader::read(&image).unwrap().tuples.is_empty());
    }

    #[test]
    fn test_capacity_failure() {
        let dir = TempDir::new().unwrap();
        let prop = write_prop(&dir, &format!("big={}\n", "x".repeat(200)));
        let image = dir.path().join("nvram.img");

        let err = build_zone(&BuildConfig::new(0x40, &prop, &image)).unwrap_err();
        assert_eq!(err.code(), CliErrorCode::CommitFailed);
    }

    #[test]
    fn test_init_failure() {
        let dir = TempDir::new().unwrap();
        let prop = write_prop(&dir, "a=1\n");
        let image = dir.path().join("no-such-dir").join("nvram.img");

        let err = build_zone(&BuildConfig::new(0x100, &prop, &image)).unwrap_err();
        assert_eq!(err.code(), CliErrorCode::InitFailed);
    }
}
