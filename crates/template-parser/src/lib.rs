//! Template parser for Vue-style HTML templates.
//!
//! This crate turns template source into a single-rooted AST:
//! - A streaming tokenizer with raw-text, implicit-close and auto-close handling
//! - A builder that assembles elements, text and interpolations into an arena
//! - Directive processing for loops, conditionals, slots, bindings and events
//! - Warnings reported through an injected sink; parsing never fails
//!
//! # Example
//!
//! ```
//! use template_parser::{parse, Node};
//!
//! let result = parse(r#"<ul><li v-for="item in items">{{ item.name }}</li></ul>"#);
//! assert!(result.warnings.is_empty());
//!
//! let root = result.template.root_element().unwrap();
//! let Node::Element(li) = root.children[0] else { panic!() };
//! let for_loop = result.template.element(li).directives.for_loop.as_ref().unwrap();
//! assert_eq!(for_loop.alias, "item");
//! assert_eq!(for_loop.source, "items");
//! ```

mod ast;
mod builder;
mod cache;
pub mod directives;
pub mod entities;
mod error;
pub mod filters;
pub mod helpers;
pub mod interpolation;
mod lexer;
mod span;
mod tokenizer;

pub use ast::*;
pub use builder::parse_for;
pub use error::{Warning, WarningKind, WarningSink};
pub use lexer::{RawAttribute, StartTag};
pub use span::{ByteOffset, LineCol, LineIndex, Span};
pub use tokenizer::{scan, TokenSink};

/// Options for parsing templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Keep whitespace-only text between elements as a single space.
    pub preserve_whitespace: bool,
    /// Custom interpolation delimiters; `{{`/`}}` when `None`.
    pub delimiters: Option<(String, String)>,
    /// Warn when a literal attribute contains interpolation delimiters.
    pub warn_interpolation_in_attributes: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            preserve_whitespace: false,
            delimiters: None,
            warn_interpolation_in_attributes: true,
        }
    }
}

/// The result of parsing a template.
#[derive(Debug)]
pub struct ParseResult {
    /// The parsed template.
    pub template: Template,
    /// Warnings in the order they were raised.
    pub warnings: Vec<Warning>,
}

/// Parses a template with default options.
pub fn parse(source: &str) -> ParseResult {
    parse_with_options(source, &ParseOptions::default())
}

/// Parses a template, collecting warnings.
pub fn parse_with_options(source: &str, options: &ParseOptions) -> ParseResult {
    let mut warnings = Vec::new();
    let template = parse_with_sink(source, options, &mut warnings);
    ParseResult { template, warnings }
}

/// Parses a template, forwarding each warning to `sink` as it is raised.
pub fn parse_with_sink<W: WarningSink + ?Sized>(
    source: &str,
    options: &ParseOptions,
    sink: &mut W,
) -> Template {
    builder::build(source, options, sink)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty() {
        let result = parse("");
        assert_eq!(result.template.root, None);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].kind, WarningKind::NoRootElement);
    }

    #[test]
    fn test_parse_simple_element() {
        let result = parse("<div>hello</div>");
        assert!(result.warnings.is_empty());
        let root = result.template.root_element().unwrap();
        assert_eq!(root.tag, "div");
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].as_text(), Some("hello"));
        assert!(root.directives.is_plain);
    }

    #[test]
    fn test_parse_with_sink_closure() {
        let mut count = 0;
        let template = parse_with_sink(
            "<div><span></div>",
            &ParseOptions::default(),
            &mut |_: Warning| count += 1,
        );
        assert!(template.root.is_some());
        assert_eq!(count, 1);
    }

    #[test]
    fn test_custom_delimiters() {
        let options = ParseOptions {
            delimiters: Some(("[[".to_string(), "]]".to_string())),
            ..Default::default()
        };
        let result = parse_with_options("<p>[[ msg ]] {{ raw }}</p>", &options);
        let root = result.template.root_element().unwrap();
        match &root.children[0] {
            Node::Expression(text) => assert_eq!(text.expression, "_s(msg)+\" {{ raw }}\""),
            other => panic!("expected expression, got {other:?}"),
        }
    }
}
