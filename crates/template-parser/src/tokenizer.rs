//! Streaming markup tokenizer.
//!
//! [`scan`] walks the source once with a byte cursor and reports start tags,
//! end tags and text runs to a [`TokenSink`] in document order. It keeps its
//! own stack of open tag names, used only to match end tags, implicitly close
//! elements and detect raw-text bodies. Comments, conditional sections and
//! doctypes are skipped without events.

use crate::cache::RegexCache;
use crate::error::{Warning, WarningKind, WarningSink};
use crate::helpers::{
    can_be_left_open, ignores_first_newline, is_non_phrasing, is_raw_text_element, is_unary,
    keeps_raw_wrappers,
};
use crate::lexer::{parse_end_tag, parse_start_tag, scan_tag_name, StartTag};
use crate::span::Span;
use once_cell::sync::Lazy;
use regex::Regex;
use smol_str::SmolStr;
use std::borrow::Cow;

/// Longest malformed fragment quoted in a warning.
const MAX_FRAGMENT_LEN: usize = 64;

static CLOSE_TAG_RE: Lazy<RegexCache> = Lazy::new(RegexCache::default);

static COMMENT_WRAPPER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--(.*?)-->").expect("comment wrapper pattern is valid"));

static CDATA_WRAPPER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").expect("cdata wrapper pattern is valid")
});

/// Receives tokenizer events.
pub trait TokenSink: WarningSink {
    /// A start tag. `unary` elements get no matching [`TokenSink::end_tag`] call.
    fn start_tag(&mut self, tag: StartTag, unary: bool);

    /// An element closed, explicitly or implicitly. `span` covers the end tag, or
    /// is empty when the close was implied.
    fn end_tag(&mut self, name: &str, span: Span);

    /// A run of character data. Raw-text bodies arrive as a single run.
    fn text(&mut self, text: &str, span: Span);
}

#[derive(Debug)]
struct OpenTag {
    name: SmolStr,
    lower: SmolStr,
    span: Span,
}

/// Tokenizes `source`, reporting every event to `sink`.
pub fn scan<S: TokenSink + ?Sized>(source: &str, sink: &mut S) {
    Tokenizer {
        source,
        pos: 0,
        stack: Vec::new(),
        sink,
    }
    .run();
}

struct Tokenizer<'src, 'sink, S: ?Sized> {
    source: &'src str,
    pos: usize,
    stack: Vec<OpenTag>,
    sink: &'sink mut S,
}

impl<'src, S: TokenSink + ?Sized> Tokenizer<'src, '_, S> {
    fn run(mut self) {
        while self.pos < self.source.len() {
            let last = self.pos;

            let raw_tag = self
                .stack
                .last()
                .filter(|open| is_raw_text_element(&open.lower))
                .map(|open| open.lower.clone());
            match raw_tag {
                Some(tag) => self.scan_raw_text(&tag),
                None => self.scan_markup(),
            }

            if self.pos == last {
                self.flush_malformed();
                break;
            }
        }

        let end = Span::from_usize(self.source.len(), self.source.len());
        while let Some(open) = self.stack.pop() {
            self.sink.warn(Warning::new(
                WarningKind::MissingEndTag {
                    tag: open.name.to_string(),
                },
                open.span,
            ));
            self.sink.end_tag(&open.name, end);
        }
    }

    fn rest(&self) -> &'src str {
        &self.source[self.pos..]
    }

    /// One step outside raw-text: a declaration, a tag, or a text run.
    fn scan_markup(&mut self) {
        let rest = self.rest();
        let text_end = rest.find('<');

        if text_end == Some(0) {
            if let Some(len) = skipped_declaration_len(rest) {
                self.pos += len;
                return;
            }
            if let Some(end_tag) = parse_end_tag(self.source, self.pos) {
                self.pos = usize::from(end_tag.span.end);
                self.close(&end_tag.name, end_tag.span);
                return;
            }
            if let Some(start_tag) = parse_start_tag(self.source, self.pos) {
                self.pos = usize::from(start_tag.span.end);
                self.open(start_tag);
                return;
            }
        }

        let len = match text_end {
            None => rest.len(),
            Some(mut end) => {
                // A `<` that starts nothing recognisable is plain text.
                while !starts_markup(&rest[end..]) {
                    match rest[end + 1..].find('<') {
                        Some(next) => end += next + 1,
                        None => {
                            end = rest.len();
                            break;
                        }
                    }
                }
                end
            }
        };
        if len > 0 {
            let start = self.pos;
            self.pos += len;
            self.sink
                .text(&self.source[start..self.pos], Span::from_usize(start, self.pos));
        }
    }

    /// Consumes a raw-text body up to its case-insensitive closing tag.
    fn scan_raw_text(&mut self, tag: &str) {
        let close_re = CLOSE_TAG_RE.get_or_compile(tag, || {
            format!("(?i)</{}[^>]*>", regex::escape(tag))
        });
        let rest = self.rest();
        let found = close_re.and_then(|re| re.find(rest)).map(|m| (m.start(), m.end()));
        let (body_len, close_len) = match found {
            Some((start, end)) => (start, end - start),
            None => (rest.len(), 0),
        };

        let start = self.pos;
        let body = &rest[..body_len];
        let text: Cow<'_, str> = if keeps_raw_wrappers(tag) {
            Cow::Borrowed(body)
        } else {
            let without_comments = COMMENT_WRAPPER_RE.replace_all(body, "$1");
            Cow::Owned(CDATA_WRAPPER_RE.replace_all(&without_comments, "$1").into_owned())
        };
        if !text.is_empty() {
            self.sink.text(&text, Span::from_usize(start, start + body_len));
        }

        self.pos = start + body_len + close_len;
        if close_len > 0 {
            let close_span = Span::from_usize(start + body_len, self.pos);
            self.close(tag, close_span);
        }
    }

    fn open(&mut self, tag: StartTag) {
        let lower = SmolStr::new(tag.name.to_ascii_lowercase());

        if self.last_open_is("p") && is_non_phrasing(&lower) {
            self.close_implicitly(&tag);
        }
        if can_be_left_open(&lower) && self.last_open_is(&lower) {
            self.close_implicitly(&tag);
        }

        let unary = is_unary(&lower) || tag.self_closing;
        if !unary {
            self.stack.push(OpenTag {
                name: tag.name.clone(),
                lower: lower.clone(),
                span: tag.span,
            });
        }
        self.sink.start_tag(tag, unary);

        if !unary && ignores_first_newline(&lower) && self.rest().starts_with('\n') {
            self.pos += 1;
        }
    }

    fn last_open_is(&self, lower: &str) -> bool {
        self.stack.last().is_some_and(|open| open.lower == lower)
    }

    /// Closes the innermost open element because `by` cannot be its child.
    fn close_implicitly(&mut self, by: &StartTag) {
        if let Some(open) = self.stack.pop() {
            self.sink.warn(Warning::new(
                WarningKind::ImplicitlyClosed {
                    tag: open.name.to_string(),
                    by: by.name.to_string(),
                },
                by.span,
            ));
            self.sink.end_tag(&open.name, Span::empty(by.span.start));
        }
    }

    /// Closes the nearest open element named `name`, and everything opened after it.
    fn close(&mut self, name: &str, span: Span) {
        let Some(depth) = self
            .stack
            .iter()
            .rposition(|open| open.lower.eq_ignore_ascii_case(name))
        else {
            return;
        };

        for i in (depth..self.stack.len()).rev() {
            if i > depth {
                self.sink.warn(Warning::new(
                    WarningKind::MissingEndTag {
                        tag: self.stack[i].name.to_string(),
                    },
                    self.stack[i].span,
                ));
            }
            self.sink.end_tag(&self.stack[i].name, span);
        }
        self.stack.truncate(depth);
    }

    /// Emits the unconsumable remainder as text and stops.
    fn flush_malformed(&mut self) {
        let start = self.pos;
        let rest = self.rest();
        let fragment = match rest.char_indices().nth(MAX_FRAGMENT_LEN) {
            Some((cut, _)) => format!("{}...", &rest[..cut]),
            None => rest.to_string(),
        };
        self.pos = self.source.len();
        let span = Span::from_usize(start, self.pos);
        self.sink.text(&self.source[start..], span);
        self.sink
            .warn(Warning::new(WarningKind::MalformedTag { fragment }, span));
    }
}

/// Returns true if `rest` begins with something other than literal text.
fn starts_markup(rest: &str) -> bool {
    rest.starts_with("<!--")
        || rest.starts_with("<![")
        || (rest.starts_with("</") && parse_end_tag(rest, 0).is_some())
        || (rest.starts_with('<') && scan_tag_name(rest, 1).is_some())
}

/// Length of a complete comment, conditional section or doctype at the start of `rest`.
fn skipped_declaration_len(rest: &str) -> Option<usize> {
    if let Some(body) = rest.strip_prefix("<!--") {
        return body.find("-->").map(|end| 4 + end + 3);
    }
    if rest.starts_with("<![") {
        return rest.find("]>").map(|end| end + 2);
    }
    let is_doctype = rest
        .get(..10)
        .is_some_and(|head| head.eq_ignore_ascii_case("<!doctype "));
    if is_doctype {
        return rest[10..]
            .find('>')
            .filter(|end| *end > 0)
            .map(|end| 10 + end + 1);
    }
    None
}
