//! Output formatting.

use crate::cli::OutputFormat;
use camino::Utf8Path;
use serde::Serialize;
use template_parser::{LineCol, LineIndex, Template, Warning};

/// A formatted warning for output.
#[derive(Debug, Serialize)]
pub struct FormattedWarning {
    /// The file path.
    pub filename: String,
    /// The start position.
    pub start: Position,
    /// The end position.
    pub end: Position,
    /// The message.
    pub message: String,
    /// The warning code.
    pub code: String,
}

/// A position in the source.
#[derive(Debug, Serialize)]
pub struct Position {
    /// 1-indexed line number.
    pub line: u32,
    /// 1-indexed column number.
    pub column: u32,
    /// Byte offset.
    pub offset: u32,
}

impl Position {
    fn at(line_index: &LineIndex, offset: template_parser::ByteOffset) -> Self {
        let LineCol { line, col } = line_index.line_col(offset).unwrap_or_default();
        Self {
            line: line + 1,
            column: col + 1,
            offset: u32::from(offset),
        }
    }
}

/// One parsed template, serialized for `--output ast`.
#[derive(Debug, Serialize)]
pub struct AstDump<'a> {
    /// The file path.
    pub filename: String,
    /// The parsed template.
    pub template: &'a Template,
}

/// Formats warnings for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the warnings of one file as text.
    ///
    /// JSON and AST output are collected across files and printed once, so
    /// they produce nothing here.
    pub fn format(&self, warnings: &[Warning], file_path: &Utf8Path, source: &str) -> String {
        match self.format {
            OutputFormat::Human => self.format_human(warnings, file_path, source),
            OutputFormat::Machine => self.format_machine(warnings, file_path, source),
            OutputFormat::Json | OutputFormat::Ast => String::new(),
        }
    }

    /// Formats as human-readable output with code snippets.
    fn format_human(&self, warnings: &[Warning], file_path: &Utf8Path, source: &str) -> String {
        let line_index = LineIndex::new(source);
        let lines: Vec<&str> = source.lines().collect();
        let mut output = String::new();

        for warning in warnings {
            let start = line_index.line_col(warning.span.start).unwrap_or_default();

            output.push_str(&format!(
                "{}:{}:{}\nWarning: {} ({})\n",
                file_path,
                start.line + 1,
                start.col + 1,
                warning,
                warning.kind.code()
            ));

            let line_num = start.line as usize;
            if line_num < lines.len() {
                output.push_str(&format!("  {} | {}\n", line_num + 1, lines[line_num]));

                let padding = " ".repeat(start.col as usize);
                output.push_str(&format!(
                    "  {} | {}^\n",
                    " ".repeat((line_num + 1).to_string().len()),
                    padding
                ));
            }

            output.push('\n');
        }

        output
    }

    /// Formats warnings into JSON-ready structs.
    pub fn format_json_warnings(
        warnings: &[Warning],
        file_path: &Utf8Path,
        source: &str,
    ) -> Vec<FormattedWarning> {
        let line_index = LineIndex::new(source);
        warnings
            .iter()
            .map(|warning| FormattedWarning {
                filename: file_path.to_string(),
                start: Position::at(&line_index, warning.span.start),
                end: Position::at(&line_index, warning.span.end),
                message: warning.to_string(),
                code: warning.kind.code().to_string(),
            })
            .collect()
    }

    /// Formats as machine-readable output.
    fn format_machine(&self, warnings: &[Warning], file_path: &Utf8Path, source: &str) -> String {
        let line_index = LineIndex::new(source);
        let mut output = String::new();

        for warning in warnings {
            let start = line_index.line_col(warning.span.start).unwrap_or_default();
            let end = line_index.line_col(warning.span.end).unwrap_or_default();

            output.push_str(&format!(
                "WARNING {}:{}:{}:{}:{} {} ({})\n",
                file_path,
                start.line + 1,
                start.col + 1,
                end.line + 1,
                end.col + 1,
                warning,
                warning.kind.code()
            ));
        }

        output
    }
}

/// Summary of a check run.
#[derive(Debug, Default)]
pub struct CheckSummary {
    /// Number of files checked.
    pub file_count: usize,
    /// Number of warnings.
    pub warning_count: usize,
    /// Whether to fail on warnings.
    pub fail_on_warnings: bool,
}

impl CheckSummary {
    /// Returns true if the run should exit with a failure status.
    pub fn failed(&self) -> bool {
        self.fail_on_warnings && self.warning_count > 0
    }

    /// Formats the summary line.
    pub fn format(&self) -> String {
        let warning_word = if self.warning_count == 1 {
            "warning"
        } else {
            "warnings"
        };
        let file_word = if self.file_count == 1 {
            "file"
        } else {
            "files"
        };

        format!(
            "====================================\ntemplate-check found {} {} in {} {}",
            self.warning_count, warning_word, self.file_count, file_word
        )
    }
}
