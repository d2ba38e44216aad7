//! Configuration types and default-merge loading for cq.
//!
//! Mirrors the layered-YAML-over-defaults model: [`Config::default`]
//! supplies every key, and [`Config::load`] deep-merges a user file on top
//! of a serialized copy of the defaults before deserializing the result.
//! Unknown keys in a user file are ignored by serde; missing keys fall
//! back to the default produced by `#[serde(default)]`.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::errors::{CqError, Result};

/// Top-level configuration for a cq scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Include/exclude path patterns consumed by the enumerator.
    pub paths: PathsConfig,
    /// Architecture layer mapping and allowed-edge policy.
    pub arch: ArchConfig,
    /// Metric, lint-category, and role weights.
    pub weights: WeightsConfig,
    /// External tool commands and timeouts.
    pub tools: ToolsConfig,
    /// Winnowing duplication parameters.
    pub duplication: DuplicationConfig,
    /// Bootstrap resampling parameters.
    pub bootstrap: BootstrapConfig,
    /// Score-curve parameters for complexity and typing.
    pub scoring: ScoringConfig,
    /// Report output format and destination.
    pub report: ReportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            arch: ArchConfig::default(),
            weights: WeightsConfig::default(),
            tools: ToolsConfig::default(),
            duplication: DuplicationConfig::default(),
            bootstrap: BootstrapConfig::default(),
            scoring: ScoringConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from an optional YAML file, deep-merged over
    /// [`Config::default`]. `None` returns the defaults unchanged.
    ///
    /// A malformed config file is a fatal error: the scan must abort
    /// before any analysis begins.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .map_err(|e| CqError::io(format!("failed to read config file: {}", path.display()), e))?;
        Self::from_yaml_str(&text)
    }

    /// Parse and deep-merge a YAML document over the defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let override_value: serde_yaml::Value = serde_yaml::from_str(text)?;
        let base_value = serde_yaml::to_value(Self::default())
            .map_err(|e| CqError::internal(format!("failed to serialize defaults: {e}")))?;
        let merged = deep_merge(base_value, override_value);
        serde_yaml::from_value(merged).map_err(Into::into)
    }

    /// Render the default configuration as YAML, for `example-config`.
    pub fn default_yaml() -> String {
        serde_yaml::to_string(&Self::default()).unwrap_or_default()
    }

    /// Validate cross-field invariants that serde's structural
    /// deserialization can't express on its own.
    pub fn validate(&self) -> Result<()> {
        if self.bootstrap.iterations == 0 {
            return Err(CqError::config_field(
                "bootstrap.iterations must be >= 1",
                "bootstrap.iterations",
            ));
        }
        if self.duplication.k == 0 {
            return Err(CqError::config_field("duplication.k must be >= 1", "duplication.k"));
        }
        if self.duplication.w == 0 {
            return Err(CqError::config_field("duplication.w must be >= 1", "duplication.w"));
        }
        let metric_sum: f64 = [
            self.weights.metrics.duplication,
            self.weights.metrics.lint,
            self.weights.metrics.typing,
            self.weights.metrics.complexity,
        ]
        .iter()
        .sum();
        if metric_sum <= 0.0 {
            return Err(CqError::config_field(
                "weights.metrics must sum to a positive value",
                "weights.metrics",
            ));
        }
        Ok(())
    }
}

/// Recursively merge `override_val` onto `base`, preferring override
/// leaves and merging mapping keys (same semantics as the Python
/// `_deep_merge`: scalar/override wins, nested mappings merge key-wise).
fn deep_merge(base: serde_yaml::Value, override_val: serde_yaml::Value) -> serde_yaml::Value {
    use serde_yaml::Value;
    match (base, override_val) {
        (Value::Mapping(mut base_map), Value::Mapping(override_map)) => {
            for (key, override_value) in override_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, override_value),
                    None => override_value,
                };
                base_map.insert(key, merged);
            }
            Value::Mapping(base_map)
        }
        (_, override_val) => override_val,
    }
}

/// Path include/exclude configuration (consumed by the file enumerator).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directories to include, relative to the scan root.
    pub include: Vec<String>,
    /// Substring/prefix patterns to exclude.
    pub exclude: Vec<String>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            include: vec!["./".to_string()],
            exclude: vec![
                "/.venv/".to_string(),
                "/venv/".to_string(),
                "/build/".to_string(),
                "/dist/".to_string(),
                "/site-packages/".to_string(),
            ],
        }
    }
}

/// Architecture-conformance configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchConfig {
    /// Declared layer names (informational; enforcement uses `map` and
    /// `allowed_edges` directly).
    pub layers: Vec<String>,
    /// Longest-prefix-wins mapping from path/module prefix to layer name.
    pub map: HashMap<String, String>,
    /// Allowed `(from_layer, to_layer)` edges.
    pub allowed_edges: Vec<[String; 2]>,
}

impl Default for ArchConfig {
    fn default() -> Self {
        Self {
            layers: vec!["core".to_string(), "api".to_string(), "ui".to_string()],
            map: HashMap::from([
                ("src/core".to_string(), "core".to_string()),
                ("src/api".to_string(), "api".to_string()),
                ("src/ui".to_string(), "ui".to_string()),
            ]),
            allowed_edges: vec![
                ["core".to_string(), "core".to_string()],
                ["api".to_string(), "core".to_string()],
                ["api".to_string(), "api".to_string()],
                ["ui".to_string(), "api".to_string()],
                ["ui".to_string(), "core".to_string()],
                ["ui".to_string(), "ui".to_string()],
            ],
        }
    }
}

/// Metric, lint-category, and role weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightsConfig {
    /// Per-metric grade weights.
    pub metrics: MetricWeights,
    /// Lint category penalty coefficients.
    pub pylint_categories: LintCategoryWeights,
    /// Per-role aggregation weights.
    pub roles: RoleWeights,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            metrics: MetricWeights::default(),
            pylint_categories: LintCategoryWeights::default(),
            roles: RoleWeights::default(),
        }
    }
}

/// Weights for the four scored metrics that make up a file's grade.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricWeights {
    pub duplication: f64,
    pub lint: f64,
    pub typing: f64,
    pub complexity: f64,
}

impl Default for MetricWeights {
    fn default() -> Self {
        Self {
            duplication: 0.25,
            lint: 0.30,
            typing: 0.20,
            complexity: 0.25,
        }
    }
}

/// Penalty coefficient per lint category (Convention/Warning/Refactor/Error).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct LintCategoryWeights {
    #[serde(rename = "C")]
    pub c: f64,
    #[serde(rename = "W")]
    pub w: f64,
    #[serde(rename = "R")]
    pub r: f64,
    #[serde(rename = "E")]
    pub e: f64,
}

impl Default for LintCategoryWeights {
    fn default() -> Self {
        Self {
            c: 0.25,
            w: 0.5,
            r: 0.4,
            e: 1.0,
        }
    }
}

impl LintCategoryWeights {
    /// Look up the weight for a single-character category code.
    pub fn weight_for(&self, category: char) -> f64 {
        match category {
            'C' => self.c,
            'W' => self.w,
            'R' => self.r,
            'E' => self.e,
            _ => 0.0,
        }
    }
}

/// Aggregation weight applied per file, keyed by [`crate::core::model::Role`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleWeights {
    pub default: f64,
    pub test: f64,
    pub config: f64,
    pub vendor: f64,
    pub generated: f64,
}

impl Default for RoleWeights {
    fn default() -> Self {
        Self {
            default: 1.0,
            test: 0.35,
            config: 0.35,
            vendor: 0.2,
            generated: 0.0,
        }
    }
}

/// External tool commands and per-tool timeouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub pylint_cmd: String,
    pub mypy_cmd: String,
    pub timeouts: ToolTimeouts,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            pylint_cmd: "pylint".to_string(),
            mypy_cmd: "mypy".to_string(),
            timeouts: ToolTimeouts::default(),
        }
    }
}

/// Per-tool timeout in seconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolTimeouts {
    pub pylint: u64,
    pub mypy: u64,
}

impl Default for ToolTimeouts {
    fn default() -> Self {
        Self {
            pylint: 90,
            mypy: 120,
        }
    }
}

/// Winnowing duplication-engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DuplicationConfig {
    /// k-gram length, in tokens.
    pub k: usize,
    /// Winnowing window size.
    pub w: usize,
    /// Token-normalization switches.
    pub normalize: NormalizeConfig,
}

impl Default for DuplicationConfig {
    fn default() -> Self {
        Self {
            k: 25,
            w: 4,
            normalize: NormalizeConfig::default(),
        }
    }
}

/// Normalization switches for the duplication token stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    pub strip_literals: bool,
    pub strip_comments: bool,
    pub identifier_placeholder: String,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            strip_literals: true,
            strip_comments: true,
            identifier_placeholder: "ID".to_string(),
        }
    }
}

/// Bootstrap resampling configuration for the grade confidence interval.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    pub iterations: usize,
    pub seed: u64,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            iterations: 100,
            seed: 1337,
        }
    }
}

/// Score-curve configuration for complexity and typing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub complexity_scale: ComplexityScale,
    pub typing_error_scale: TypingErrorScaleConfig,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            complexity_scale: ComplexityScale::default(),
            typing_error_scale: TypingErrorScaleConfig::default(),
        }
    }
}

/// Cognitive-complexity score curve: `target_per_loc` sets the "fully
/// healthy" density, `hard_cap` is the raw complexity beyond which a file
/// scores zero outright.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplexityScale {
    pub target_per_loc: f64,
    pub hard_cap: u32,
}

impl Default for ComplexityScale {
    fn default() -> Self {
        Self {
            target_per_loc: 0.25,
            hard_cap: 50,
        }
    }
}

/// Wraps the typing-error curve under the `per_1k_loc` key, matching the
/// documented `scoring.typing_error_scale.per_1k_loc.{max_score_at_0,
/// zero_score_at_20}` config path exactly (the curve is, in fact, only
/// ever expressed per 1000 LOC — the nesting level exists so a user config
/// written to that path round-trips instead of being silently dropped by
/// `deep_merge`'s unknown-key handling).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TypingErrorScaleConfig {
    pub per_1k_loc: TypingErrorScale,
}

impl Default for TypingErrorScaleConfig {
    fn default() -> Self {
        Self {
            per_1k_loc: TypingErrorScale::default(),
        }
    }
}

/// Typing-error score curve, expressed per 1000 LOC.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TypingErrorScale {
    pub max_score_at_0: f64,
    pub zero_score_at_20: f64,
}

impl Default for TypingErrorScale {
    fn default() -> Self {
        Self {
            max_score_at_0: 100.0,
            zero_score_at_20: 0.0,
        }
    }
}

/// Report rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub format: Vec<String>,
    pub out_dir: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: vec!["json".to_string(), "md".to_string()],
            out_dir: ".cq-out".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn yaml_override_merges_over_defaults() {
        let yaml = r#"
weights:
  metrics:
    lint: 0.9
duplication:
  k: 10
"#;
        let cfg = Config::from_yaml_str(yaml).unwrap();
        assert_eq!(cfg.weights.metrics.lint, 0.9);
        // Untouched sibling keys keep their defaults.
        assert_eq!(cfg.weights.metrics.duplication, 0.25);
        assert_eq!(cfg.duplication.k, 10);
        assert_eq!(cfg.duplication.w, 4);
    }

    #[test]
    fn empty_yaml_is_defaults() {
        let cfg = Config::from_yaml_str("").unwrap();
        assert_eq!(cfg.duplication.k, 25);
    }

    #[test]
    fn rejects_zero_bootstrap_iterations() {
        let mut cfg = Config::default();
        cfg.bootstrap.iterations = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn typing_error_scale_round_trips_through_the_documented_per_1k_loc_path() {
        let yaml = r#"
scoring:
  typing_error_scale:
    per_1k_loc:
      zero_score_at_20: 20
"#;
        let cfg = Config::from_yaml_str(yaml).unwrap();
        assert_eq!(cfg.scoring.typing_error_scale.per_1k_loc.zero_score_at_20, 20.0);
        assert_eq!(cfg.scoring.typing_error_scale.per_1k_loc.max_score_at_0, 100.0);
    }
}
