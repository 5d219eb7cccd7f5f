//! Output handling for the CLI
//!
//! - stdout carries only the operator dump
//! - text mode: `name=value` lines followed by a size line
//! - JSON mode: a single JSON object per invocation

use std::io::{self, Write};

use serde_json::{json, Value};

use super::errors::CliResult;
use crate::loader::LoadReport;
use crate::zone::ZoneSummary;

/// JSON form of a finished build.
pub fn build_response(summary: &ZoneSummary, report: &LoadReport) -> CliResult<Value> {
    let diagnostics: Vec<String> = report.diagnostics.iter().map(|d| d.to_string()).collect();
    Ok(json!({
        "status": "ok",
        "data": {
            "zone": serde_json::to_value(summary)?,
            "load": {
                "files_loaded": report.files_loaded,
                "lines": report.lines,
                "applied": report.applied,
                "filtered_out": report.filtered_out,
                "diagnostics": diagnostics,
            }
        }
    }))
}

/// Writes the dump in the requested format.
pub fn write_summary<W: Write>(
    writer: &mut W,
    summary: &ZoneSummary,
    report: &LoadReport,
    as_json: bool,
) -> CliResult<()> {
    if as_json {
        serde_json::to_writer(&mut *writer, &build_response(summary, report)?)?;
        writeln!(writer)?;
    } else {
        writeln!(writer, "{}", summary)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    let response = json!({
        "status": "error",
        "code": code,
        "message": message
    });

    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, &response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::SummaryTuple;

    fn summary() -> ZoneSummary {
        ZoneSummary {
            path: "nvram.img".into(),
            size: 64,
            used_bytes: 22,
            free_bytes: 42,
            generation: Some(1),
            checksum: Some(0x1234),
            tuples: vec![SummaryTuple {
                name: "a".into(),
                value: "1".into(),
                temporary: false,
            }],
        }
    }

    #[test]
    fn test_text_output() {
        let mut out = Vec::new();
        write_summary(&mut out, &summary(), &LoadReport::default(), false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("a=1\n"));
        assert!(text.ends_with("checksum 00001234\n"));
    }

    #[test]
    fn test_json_output_is_single_object() {
        let mut out = Vec::new();
        let report = LoadReport {
            files_loaded: 1,
            applied: 1,
            ..LoadReport::default()
        };
        write_summary(&mut out, &summary(), &report, true).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1);
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["status"], "ok");
        assert_eq!(value["data"]["zone"]["tuples"][0]["name"], "a");
        assert_eq!(value["data"]["load"]["applied"], 1);
    }
}
