//! Writes a [`Report`] to disk in the configured formats, validating the
//! JSON shape along the way. Validation failure never blocks the write —
//! it is surfaced to the caller as a list of problems so the CLI can
//! choose a non-zero, non-fatal exit code.

use std::path::Path;

use crate::core::errors::Result;
use crate::core::model::Report;
use crate::io::{json_report, markdown_report, schema};

/// Outcome of writing a report: the paths written and any schema
/// problems found in the JSON shape (empty if it validated cleanly).
pub struct WriteOutcome {
    pub written: Vec<std::path::PathBuf>,
    pub schema_errors: Vec<String>,
}

/// Write `report` to `out_dir` in each of `formats` (`"json"` and/or
/// `"md"`), creating the directory if needed.
pub fn write_report(report: &Report, out_dir: &Path, formats: &[String]) -> Result<WriteOutcome> {
    std::fs::create_dir_all(out_dir)?;

    let mut written = Vec::new();
    let mut schema_errors = Vec::new();

    if formats.iter().any(|f| f == "json") {
        let value = json_report::serialize_report(report);
        schema_errors = schema::validate(&value);
        let text = json_report::render(report)?;
        let path = out_dir.join("report.json");
        std::fs::write(&path, text)?;
        written.push(path);
    }

    if formats.iter().any(|f| f == "md") {
        let text = markdown_report::render(report);
        let path = out_dir.join("report.md");
        std::fs::write(&path, text)?;
        written.push(path);
    }

    Ok(WriteOutcome { written, schema_errors })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn empty_report() -> Report {
        Report {
            meta: ReportMeta { generated_at: "now".to_string(), cq_version: "0.1.0".to_string(), tools: HashMap::new() },
            project: ProjectReport {
                path: ".".to_string(),
                weights: WeightsSnapshot { metrics: HashMap::new(), pylint_categories: HashMap::new() },
                role_weights: RoleWeightsSnapshot(HashMap::new()),
                summary: ProjectSummary { duplication: 0.0, lint: 0.0, typing: 0.0, complexity: 0.0, grade: 0.0 },
                confidence: ProjectConfidence { per_metric: HashMap::new(), intervals: HashMap::new(), degraded: vec![] },
                architecture_violations: vec![],
            },
            files: vec![],
        }
    }

    #[test]
    fn writes_both_formats_when_requested() {
        let dir = tempdir().unwrap();
        let outcome = write_report(
            &empty_report(),
            dir.path(),
            &["json".to_string(), "md".to_string()],
        )
        .unwrap();
        assert_eq!(outcome.written.len(), 2);
        assert!(outcome.schema_errors.is_empty());
        assert!(dir.path().join("report.json").exists());
        assert!(dir.path().join("report.md").exists());
    }

    #[test]
    fn writes_only_requested_format() {
        let dir = tempdir().unwrap();
        let outcome = write_report(&empty_report(), dir.path(), &["md".to_string()]).unwrap();
        assert_eq!(outcome.written.len(), 1);
        assert!(!dir.path().join("report.json").exists());
    }
}
