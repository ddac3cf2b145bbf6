//! Main orchestration logic.

use crate::cli::{Args, OutputFormat};
use crate::config::TemplateConfig;
use crate::output::{AstDump, CheckSummary, FormattedWarning, Formatter};
use crate::sfc::template_body;
use camino::{Utf8Path, Utf8PathBuf};
use globset::{Glob, GlobSetBuilder};
use rayon::prelude::*;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use template_parser::{parse_with_options, ByteOffset, ParseOptions, Template, Warning};
use thiserror::Error;
use walkdir::WalkDir;

/// Orchestration errors.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Invalid glob pattern.
    #[error("invalid glob pattern: {0}")]
    InvalidGlob(String),

    /// Workspace directory could not be resolved.
    #[error("invalid workspace: {0}")]
    InvalidWorkspace(String),

    /// Output serialization failed.
    #[error("failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A parsed file: its warnings relative to the whole file, and the template.
struct CheckedFile {
    warnings: Vec<Warning>,
    template: Template,
}

/// Parses `source`, restricting `.vue` files to their template block.
///
/// Returns `None` for a `.vue` file without a template block.
fn check_source(path: &Utf8Path, source: &str, options: &ParseOptions) -> Option<CheckedFile> {
    let (offset, body) = if path.extension() == Some("vue") {
        let range = template_body(source)?;
        (range.start, &source[range])
    } else {
        (0, source)
    };

    let result = parse_with_options(body, options);
    let delta = ByteOffset::from(u32::try_from(offset).unwrap_or(u32::MAX));
    let warnings = result
        .warnings
        .into_iter()
        .map(|warning| Warning {
            span: warning.span.shift(delta),
            ..warning
        })
        .collect();
    Some(CheckedFile {
        warnings,
        template: result.template,
    })
}

/// Resolves the workspace against the current directory.
fn resolve_workspace(workspace: &Utf8Path) -> Result<Utf8PathBuf, OrchestratorError> {
    if workspace.is_absolute() {
        return Ok(workspace.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|e| OrchestratorError::InvalidWorkspace(e.to_string()))?;
    let cwd = Utf8PathBuf::try_from(cwd)
        .map_err(|e| OrchestratorError::InvalidWorkspace(e.to_string()))?;
    Ok(cwd.join(workspace))
}

/// Finds every template file under `workspace`.
fn collect_files(
    workspace: &Utf8Path,
    config: &TemplateConfig,
) -> Result<Vec<Utf8PathBuf>, OrchestratorError> {
    let mut ignore_builder = GlobSetBuilder::new();
    for pattern in &config.exclude {
        let glob = Glob::new(pattern).map_err(|e| OrchestratorError::InvalidGlob(e.to_string()))?;
        ignore_builder.add(glob);
    }

    // Add default ignores
    for pattern in ["**/node_modules/**", "**/dist/**"] {
        if let Ok(glob) = Glob::new(pattern) {
            ignore_builder.add(glob);
        }
    }

    let ignore_set = ignore_builder
        .build()
        .map_err(|e| OrchestratorError::InvalidGlob(e.to_string()))?;

    let mut files: Vec<Utf8PathBuf> = WalkDir::new(workspace)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| Utf8PathBuf::try_from(e.into_path()).ok())
        .filter(|p| {
            let file_name = p.file_name().unwrap_or("");
            config.extensions.iter().any(|ext| file_name.ends_with(ext.as_str()))
        })
        .filter(|p| {
            let relative = p.strip_prefix(workspace).unwrap_or(p);
            !ignore_set.is_match(relative.as_str())
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Runs the check on all files.
pub fn run(args: Args) -> Result<CheckSummary, OrchestratorError> {
    let total_start = Instant::now();
    let workspace = resolve_workspace(&args.workspace)?;

    let mut config = TemplateConfig::load(&workspace);
    config.merge_args(&args);
    let options = config.parse_options();

    let scan_start = Instant::now();
    let files = collect_files(&workspace, &config)?;
    let scan_time = scan_start.elapsed();

    let formatter = Formatter::new(args.output);
    let warning_count = AtomicUsize::new(0);

    struct FileOutput {
        text: String,
        json: Vec<FormattedWarning>,
        ast: Option<(String, Template)>,
    }

    let parse_start = Instant::now();
    let outputs: Vec<FileOutput> = files
        .par_iter()
        .filter_map(|file_path| {
            let source = match fs::read_to_string(file_path) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Failed to read {}: {}", file_path, e);
                    return None;
                }
            };
            let checked = check_source(file_path, &source, &options)?;
            warning_count.fetch_add(checked.warnings.len(), Ordering::Relaxed);

            let relative_path = file_path.strip_prefix(&workspace).unwrap_or(file_path);
            let json = if args.output == OutputFormat::Json {
                Formatter::format_json_warnings(&checked.warnings, relative_path, &source)
            } else {
                Vec::new()
            };
            let ast = (args.output == OutputFormat::Ast)
                .then(|| (relative_path.to_string(), checked.template));
            Some(FileOutput {
                text: formatter.format(&checked.warnings, relative_path, &source),
                json,
                ast,
            })
        })
        .collect();
    let parse_time = parse_start.elapsed();

    let summary = CheckSummary {
        file_count: files.len(),
        warning_count: warning_count.load(Ordering::Relaxed),
        fail_on_warnings: args.fail_on_warnings,
    };

    match args.output {
        OutputFormat::Json => {
            let warnings: Vec<FormattedWarning> =
                outputs.into_iter().flat_map(|output| output.json).collect();
            println!("{}", serde_json::to_string_pretty(&warnings)?);
        }
        OutputFormat::Ast => {
            let dumps: Vec<AstDump<'_>> = outputs
                .iter()
                .filter_map(|output| output.ast.as_ref())
                .map(|(filename, template)| AstDump {
                    filename: filename.clone(),
                    template,
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&dumps)?);
        }
        OutputFormat::Human | OutputFormat::Machine => {
            for output in &outputs {
                print!("{}", output.text);
            }
            println!("{}", summary.format());
        }
    }

    if args.timings {
        eprintln!("=== template-check timings ===");
        eprintln!("file scan: {:?} ({} files)", scan_time, files.len());
        eprintln!("parse: {:?}", parse_time);
        eprintln!("total: {:?}", total_start.elapsed());
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_relative_workspace() {
        let resolved = resolve_workspace(Utf8Path::new("project")).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("project"));
    }

    #[test]
    fn test_vue_spans_are_file_offsets() {
        let source = "<script>\nexport default {}\n</script>\n<template>\n  <div><span></div>\n</template>\n";
        let checked = check_source(Utf8Path::new("App.vue"), source, &ParseOptions::default()).unwrap();
        assert_eq!(checked.warnings.len(), 1);
        assert_eq!(checked.warnings[0].span.slice(source), Some("<span>"));
        assert_eq!(checked.template.root_element().unwrap().tag, "div");
    }

    #[test]
    fn test_vue_without_template_is_skipped() {
        let source = "<script>export default {}</script>";
        assert!(check_source(Utf8Path::new("Logic.vue"), source, &ParseOptions::default()).is_none());
    }

    #[test]
    fn test_collect_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        for path in ["a.html", "b.vue", "c.txt", "node_modules/d.html", "gen/e.html"] {
            let path = root.join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, "<div></div>").unwrap();
        }
        let config = TemplateConfig {
            exclude: vec!["gen/**".to_string()],
            ..Default::default()
        };

        let files = collect_files(&root, &config).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(&root).unwrap().as_str().to_string())
            .collect();
        assert_eq!(names, vec!["a.html", "b.vue"]);
    }

    #[test]
    fn test_invalid_glob() {
        let config = TemplateConfig {
            exclude: vec!["[".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            collect_files(Utf8Path::new("."), &config),
            Err(OrchestratorError::InvalidGlob(_))
        ));
    }
}
