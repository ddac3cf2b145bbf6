//! Configuration loading.

use crate::cli::Args;
use camino::Utf8Path;
use serde::Deserialize;
use std::fs;
use template_parser::ParseOptions;

/// Name of the optional project configuration file.
pub const CONFIG_FILE: &str = "template.config.json";

/// Project configuration read from `template.config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplateConfig {
    /// File extensions to process.
    pub extensions: Vec<String>,

    /// Glob patterns to exclude, relative to the workspace.
    pub exclude: Vec<String>,

    /// Keep whitespace-only text between elements.
    pub preserve_whitespace: bool,

    /// Interpolation delimiters as `[open, close]`.
    pub delimiters: Option<(String, String)>,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            extensions: vec![".html".to_string(), ".vue".to_string()],
            exclude: Vec::new(),
            preserve_whitespace: false,
            delimiters: None,
        }
    }
}

impl TemplateConfig {
    /// Loads configuration from the project root, falling back to defaults.
    pub fn load(project_root: &Utf8Path) -> Self {
        let config_path = project_root.join(CONFIG_FILE);
        if !config_path.exists() {
            return Self::default();
        }
        match Self::parse_config(&config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Warning: Failed to parse {}: {}", config_path, e);
                Self::default()
            }
        }
    }

    fn parse_config(path: &Utf8Path) -> Result<Self, String> {
        let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
        serde_json::from_str(&content).map_err(|e| e.to_string())
    }

    /// Applies command line overrides.
    pub fn merge_args(&mut self, args: &Args) {
        if args.preserve_whitespace {
            self.preserve_whitespace = true;
        }
        if let Some(delimiters) = &args.delimiters {
            self.delimiters = Some(delimiters.clone());
        }
        self.exclude.extend(args.ignore.iter().cloned());
    }

    /// Returns the parser options this configuration selects.
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            preserve_whitespace: self.preserve_whitespace,
            delimiters: self.delimiters.clone(),
            ..Default::default()
        }
    }
}
