//! Command-line argument definitions for the `cq` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Multi-metric static-quality analyzer for Python source trees.
#[derive(Parser, Debug)]
#[command(name = "cq", version, about, long_about = None)]
pub struct Cli {
    /// Emit debug-level tracing instead of info-level.
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a scan over a source tree and write a report.
    Scan(ScanArgs),
    /// Print the JSON report schema this version of cq validates against.
    PrintSchema,
    /// Print the default configuration as YAML.
    ExampleConfig,
}

/// Output format for the written report.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Md,
    Both,
}

impl ReportFormat {
    /// The `["json", "md", ...]` values this format expands to.
    pub fn formats(self) -> Vec<String> {
        match self {
            ReportFormat::Json => vec!["json".to_string()],
            ReportFormat::Md => vec!["md".to_string()],
            ReportFormat::Both => vec!["json".to_string(), "md".to_string()],
        }
    }
}

#[derive(Parser, Debug)]
pub struct ScanArgs {
    /// Path to analyze.
    #[arg(long, default_value = ".")]
    pub path: PathBuf,

    /// Path to a cq.yml config file; defaults to the built-in configuration.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Report formats to write.
    #[arg(long, value_enum, default_value_t = ReportFormat::Both)]
    pub format: ReportFormat,

    /// Output directory; defaults to the configured `report.out_dir`.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Parallel jobs. Unused: per-file work already runs on rayon's global
    /// pool, and tool adapters run concurrently regardless of this value.
    #[arg(long, default_value_t = 1)]
    pub jobs: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_defaults_match_the_reference_cli() {
        let cli = Cli::parse_from(["cq", "scan"]);
        match cli.command {
            Commands::Scan(args) => {
                assert_eq!(args.path, PathBuf::from("."));
                assert!(args.config.is_none());
                assert_eq!(args.format, ReportFormat::Both);
                assert!(args.out.is_none());
                assert_eq!(args.jobs, 1);
            }
            _ => panic!("expected Scan command"),
        }
    }

    #[test]
    fn scan_accepts_explicit_flags() {
        let cli = Cli::parse_from([
            "cq", "scan", "--path", "src/", "--config", "cq.yml", "--format", "json", "--out",
            "reports", "--jobs", "4",
        ]);
        match cli.command {
            Commands::Scan(args) => {
                assert_eq!(args.path, PathBuf::from("src/"));
                assert_eq!(args.config, Some(PathBuf::from("cq.yml")));
                assert_eq!(args.format, ReportFormat::Json);
                assert_eq!(args.out, Some(PathBuf::from("reports")));
                assert_eq!(args.jobs, 4);
            }
            _ => panic!("expected Scan command"),
        }
    }

    #[test]
    fn print_schema_and_example_config_parse() {
        assert!(matches!(
            Cli::parse_from(["cq", "print-schema"]).command,
            Commands::PrintSchema
        ));
        assert!(matches!(
            Cli::parse_from(["cq", "example-config"]).command,
            Commands::ExampleConfig
        ));
    }
}
