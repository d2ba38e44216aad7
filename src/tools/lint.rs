//! Adapter to an external pylint-compatible linter.
//!
//! `pylint` is an unreliable collaborator: it may be missing, time out, or
//! exit with a code we don't expect. Every one of those is folded into a
//! `degraded` outcome with a human-readable reason rather than failing
//! the whole scan — the caller falls back to a neutral score with a
//! reduced confidence multiplier.

use std::collections::HashMap;
use std::process::Stdio;
use std::time::Duration;

use serde::Deserialize;
use tokio::process::Command;

use crate::core::config::{LintCategoryWeights, ToolsConfig};
use crate::core::model::LintCounts;

/// Exit codes pylint itself defines as a non-fatal bitmask: fatal (1) is
/// excluded, everything else reflects "ran and found issues."
const ALLOWED_EXIT_CODES: &[i32] = &[0, 2, 4, 8, 16, 32];

#[derive(Debug, Deserialize)]
struct PylintMessage {
    path: Option<String>,
    symbol: Option<String>,
    #[serde(rename = "type")]
    msg_type: Option<String>,
}

/// Outcome of running lint across a batch of files.
#[derive(Debug, Clone)]
pub struct LintOutcome {
    pub counts: HashMap<String, LintCounts>,
    pub weighted_scores: HashMap<String, f64>,
    pub degraded: bool,
    pub missing_reason: Option<String>,
}

/// Run pylint in JSON-output mode over `files` and fold the result into
/// per-file category counts and weighted scores.
pub async fn analyze(files: &[String], tools: &ToolsConfig, weights: &LintCategoryWeights) -> LintOutcome {
    if files.is_empty() {
        return LintOutcome {
            counts: HashMap::new(),
            weighted_scores: HashMap::new(),
            degraded: false,
            missing_reason: None,
        };
    }

    let mut cmd = Command::new(&tools.pylint_cmd);
    cmd.arg("--output-format=json")
        .args(files)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let timeout = Duration::from_secs(tools.timeouts.pylint);
    let output = match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(err)) => {
            return degraded_empty(format!("pylint unavailable: {err}"));
        }
        Err(_) => {
            return degraded_empty(format!(
                "pylint timed out after {}s",
                tools.timeouts.pylint
            ));
        }
    };

    let code = output.status.code().unwrap_or(-1);
    if !ALLOWED_EXIT_CODES.contains(&code) {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let reason = if stderr.is_empty() { "pylint run failed".to_string() } else { stderr };
        return degraded_empty(reason);
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stdout = if stdout.trim().is_empty() { "[]" } else { stdout.trim() };
    let messages: Vec<PylintMessage> = match serde_json::from_str(stdout) {
        Ok(messages) => messages,
        Err(_) => return degraded_empty("pylint produced invalid JSON".to_string()),
    };

    let mut counts: HashMap<String, LintCounts> = HashMap::new();
    for message in messages {
        let Some(path) = message.path else { continue };
        let category = message
            .symbol
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(message.msg_type.as_deref())
            .and_then(|s| s.chars().next())
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('\0');
        let entry = counts.entry(path).or_default();
        bump(entry, category);
    }

    let mut weighted_scores = HashMap::new();
    for (path, cat_counts) in &counts {
        let total = weights.weight_for('C') * cat_counts.c as f64
            + weights.weight_for('W') * cat_counts.w as f64
            + weights.weight_for('R') * cat_counts.r as f64
            + weights.weight_for('E') * cat_counts.e as f64;
        weighted_scores.insert(path.clone(), (100.0 - total).max(0.0));
    }

    LintOutcome {
        counts,
        weighted_scores,
        degraded: false,
        missing_reason: None,
    }
}

fn bump(counts: &mut LintCounts, category: char) {
    match category {
        'C' => counts.c += 1,
        'W' => counts.w += 1,
        'R' => counts.r += 1,
        'E' => counts.e += 1,
        _ => {}
    }
}

fn degraded_empty(reason: String) -> LintOutcome {
    LintOutcome {
        counts: HashMap::new(),
        weighted_scores: HashMap::new(),
        degraded: true,
        missing_reason: Some(reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_files_is_a_clean_empty_run() {
        let outcome = futures::executor::block_on(analyze(
            &[],
            &ToolsConfig::default(),
            &LintCategoryWeights::default(),
        ));
        assert!(!outcome.degraded);
        assert!(outcome.counts.is_empty());
    }

    #[test]
    fn bump_routes_each_category() {
        let mut counts = LintCounts::default();
        bump(&mut counts, 'C');
        bump(&mut counts, 'W');
        bump(&mut counts, 'R');
        bump(&mut counts, 'E');
        bump(&mut counts, 'C');
        assert_eq!(counts.c, 2);
        assert_eq!(counts.w, 1);
        assert_eq!(counts.r, 1);
        assert_eq!(counts.e, 1);
    }

    #[test]
    fn weighted_score_never_goes_negative() {
        let weights = LintCategoryWeights { c: 1.0, w: 1.0, r: 1.0, e: 1.0 };
        let counts = LintCounts { c: 1000, w: 0, r: 0, e: 0 };
        let total = weights.weight_for('C') * counts.c as f64;
        assert_eq!((100.0 - total).max(0.0), 0.0);
    }
}
