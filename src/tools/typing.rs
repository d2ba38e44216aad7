//! Adapter to an external mypy-compatible type checker.
//!
//! Same degradation contract as [`crate::tools::lint`]: missing binary,
//! timeout, or an unexpected exit code all become a `degraded` outcome
//! instead of a hard failure.

use std::collections::HashMap;
use std::process::Stdio;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tokio::process::Command;

use crate::core::config::{ToolsConfig, TypingErrorScale};

const ALLOWED_EXIT_CODES: &[i32] = &[0, 1];

static MYPY_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<path>[^:]+):(?P<line>\d+): (?P<kind>error|note): (?P<message>.+)$").unwrap());

/// Outcome of running the type checker across a batch of files.
#[derive(Debug, Clone)]
pub struct TypingOutcome {
    pub errors: HashMap<String, u32>,
    pub scores: HashMap<String, f64>,
    pub degraded: bool,
    pub missing_reason: Option<String>,
}

/// Run mypy over `files` and turn its error lines into a per-file error
/// count and score, scaled against `loc_map`.
pub async fn analyze(
    files: &[String],
    loc_map: &HashMap<String, usize>,
    tools: &ToolsConfig,
    scale: &TypingErrorScale,
) -> TypingOutcome {
    if files.is_empty() {
        return TypingOutcome {
            errors: HashMap::new(),
            scores: HashMap::new(),
            degraded: false,
            missing_reason: None,
        };
    }

    let mut cmd = Command::new(&tools.mypy_cmd);
    cmd.arg("--hide-error-context")
        .arg("--no-color-output")
        .arg("--no-error-summary")
        .arg("--show-error-codes")
        .args(files)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let timeout = Duration::from_secs(tools.timeouts.mypy);
    let output = match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(err)) => return degraded_empty(format!("mypy unavailable: {err}")),
        Err(_) => {
            return degraded_empty(format!("mypy timed out after {}s", tools.timeouts.mypy));
        }
    };

    let code = output.status.code().unwrap_or(-1);
    if !ALLOWED_EXIT_CODES.contains(&code) {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let reason = if stderr.is_empty() { "mypy run failed".to_string() } else { stderr };
        return degraded_empty(reason);
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut errors: HashMap<String, u32> = HashMap::new();
    for line in stdout.lines() {
        if let Some(caps) = MYPY_LINE.captures(line) {
            if &caps["kind"] == "error" {
                *errors.entry(caps["path"].to_string()).or_insert(0) += 1;
            }
        }
    }

    let scores = score_all(&errors, loc_map, scale);

    TypingOutcome { errors, scores, degraded: false, missing_reason: None }
}

fn score_all(
    errors: &HashMap<String, u32>,
    loc_map: &HashMap<String, usize>,
    scale: &TypingErrorScale,
) -> HashMap<String, f64> {
    loc_map
        .iter()
        .map(|(path, &loc)| {
            let err_count = errors.get(path).copied().unwrap_or(0);
            let density = err_count as f64 * 1000.0 / loc.max(1) as f64;
            (path.clone(), score_one(density, scale))
        })
        .collect()
}

/// The reference curve decays linearly from `max_score_at_0` to zero at
/// `zero_score_at_20` errors-per-1000-LOC. A zero threshold degenerates
/// that division; any positive density is scored zero outright there
/// instead, rather than propagating a division by zero.
fn score_one(density: f64, scale: &TypingErrorScale) -> f64 {
    if scale.zero_score_at_20 <= 0.0 {
        return if density > 0.0 { 0.0 } else { scale.max_score_at_0 };
    }
    if density >= scale.zero_score_at_20 {
        0.0
    } else {
        (scale.max_score_at_0 - (scale.max_score_at_0 / scale.zero_score_at_20) * density).max(0.0)
    }
}

fn degraded_empty(reason: String) -> TypingOutcome {
    TypingOutcome {
        errors: HashMap::new(),
        scores: HashMap::new(),
        degraded: true,
        missing_reason: Some(reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scale() -> TypingErrorScale {
        TypingErrorScale { max_score_at_0: 100.0, zero_score_at_20: 20.0 }
    }

    #[test]
    fn zero_errors_scores_max() {
        assert_eq!(score_one(0.0, &scale()), 100.0);
    }

    #[test]
    fn density_at_threshold_scores_zero() {
        assert_eq!(score_one(20.0, &scale()), 0.0);
    }

    #[test]
    fn density_halfway_scores_half() {
        assert_eq!(score_one(10.0, &scale()), 50.0);
    }

    #[test]
    fn zero_threshold_only_penalizes_positive_density() {
        let degenerate = TypingErrorScale { max_score_at_0: 100.0, zero_score_at_20: 0.0 };
        assert_eq!(score_one(0.0, &degenerate), 100.0);
        assert_eq!(score_one(0.001, &degenerate), 0.0);
    }

    #[test]
    fn mypy_line_regex_extracts_errors_only() {
        assert!(MYPY_LINE.is_match("a/b.py:10: error: bad type"));
        let caps = MYPY_LINE.captures("a/b.py:10: note: see above").unwrap();
        assert_eq!(&caps["kind"], "note");
    }
}
