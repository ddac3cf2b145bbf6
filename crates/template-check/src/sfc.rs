//! Locating the `<template>` block of a single-file component.

use std::ops::Range;
use template_parser::{scan, Span, StartTag, TokenSink, Warning, WarningSink};

/// Returns the byte range of the body of the outermost `<template>` block.
///
/// Nested `<template>` elements inside the block are part of its body. A block
/// that is never closed runs to the end of the file.
pub fn template_body(source: &str) -> Option<Range<usize>> {
    let mut finder = TemplateBlock::default();
    scan(source, &mut finder);
    finder.body
}

#[derive(Debug, Default)]
struct TemplateBlock {
    depth: usize,
    /// Body start and the depth the block was opened at.
    open: Option<(usize, usize)>,
    body: Option<Range<usize>>,
}

impl WarningSink for TemplateBlock {
    fn warn(&mut self, _warning: Warning) {}
}

impl TokenSink for TemplateBlock {
    fn start_tag(&mut self, tag: StartTag, unary: bool) {
        if unary {
            return;
        }
        let found = self.open.is_some() || self.body.is_some();
        if !found && self.depth == 0 && tag.name.eq_ignore_ascii_case("template") {
            self.open = Some((usize::from(tag.span.end), self.depth));
        }
        self.depth += 1;
    }

    fn end_tag(&mut self, _name: &str, span: Span) {
        self.depth = self.depth.saturating_sub(1);
        if let Some((start, depth)) = self.open {
            if depth == self.depth {
                self.body = Some(start..usize::from(span.start));
                self.open = None;
            }
        }
    }

    fn text(&mut self, _text: &str, _span: Span) {}
}
