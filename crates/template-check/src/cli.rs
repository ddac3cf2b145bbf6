//! CLI argument parsing.

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};

/// Parses Vue-style templates and reports warnings.
#[derive(Debug, Parser)]
#[command(name = "template-check")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Working directory for the check
    #[arg(long, default_value = ".")]
    pub workspace: Utf8PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    pub output: OutputFormat,

    /// Glob patterns to ignore
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Keep whitespace-only text between elements
    #[arg(long = "preserve-whitespace")]
    pub preserve_whitespace: bool,

    /// Interpolation delimiters, e.g. `[[,]]`
    #[arg(long, value_parser = parse_delimiters)]
    pub delimiters: Option<(String, String)>,

    /// Exit with error on warnings
    #[arg(long = "fail-on-warnings")]
    pub fail_on_warnings: bool,

    /// Print timing breakdowns
    #[arg(long)]
    pub timings: bool,
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output with source snippets (default)
    #[default]
    Human,
    /// Machine-readable (one line per warning)
    Machine,
    /// JSON output
    Json,
    /// JSON dump of each parsed template
    Ast,
}

/// Parses `OPEN,CLOSE`.
fn parse_delimiters(value: &str) -> Result<(String, String), String> {
    match value.split_once(',') {
        Some((open, close)) if !open.is_empty() && !close.is_empty() => {
            Ok((open.to_string(), close.to_string()))
        }
        _ => Err(format!("expected OPEN,CLOSE, got `{value}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = Args::parse_from(["template-check"]);
        assert_eq!(args.workspace.as_str(), ".");
        assert_eq!(args.output, OutputFormat::Human);
        assert!(!args.preserve_whitespace);
        assert!(args.delimiters.is_none());
    }

    #[test]
    fn test_custom_workspace() {
        let args = Args::parse_from(["template-check", "--workspace", "/path/to/project"]);
        assert_eq!(args.workspace.as_str(), "/path/to/project");
    }

    #[test]
    fn test_output_formats() {
        let args = Args::parse_from(["template-check", "--output", "json"]);
        assert_eq!(args.output, OutputFormat::Json);

        let args = Args::parse_from(["template-check", "--output", "ast"]);
        assert_eq!(args.output, OutputFormat::Ast);
    }

    #[test]
    fn test_delimiters() {
        let args = Args::parse_from(["template-check", "--delimiters", "[[,]]"]);
        assert_eq!(args.delimiters, Some(("[[".to_string(), "]]".to_string())));

        assert!(Args::try_parse_from(["template-check", "--delimiters", "[["]).is_err());
    }

    #[test]
    fn test_repeated_ignore() {
        let args = Args::parse_from(["template-check", "--ignore", "a/**", "--ignore", "b/**"]);
        assert_eq!(args.ignore, vec!["a/**", "b/**"]);
    }
}
