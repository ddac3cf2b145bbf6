//! Tag-level lexing: tag names, start tags with their attribute lists, and end tags.
//!
//! The attribute grammar inside a start tag is lexed with `logos`. Tag names and
//! unquoted attribute values are matched by hand with character-class scanners.

use crate::entities::decode_attr;
use crate::span::Span;
use logos::Logos;
use smol_str::SmolStr;
use std::ops::Range;

/// Longest tag or attribute name accepted.
pub const MAX_NAME_LEN: usize = 1024;

/// Most attributes accepted on a single start tag.
pub const MAX_ATTRIBUTES: usize = 1024;

/// Tokens inside a start tag, after the tag name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Logos)]
pub enum TagToken {
    /// Whitespace between attributes.
    #[regex(r"[ \t\r\n\x0C]+")]
    Whitespace,

    /// An attribute name.
    #[regex(r#"[^ \t\r\n\x0C"'<>/=]+"#)]
    Name,

    /// `=`
    #[token("=")]
    Eq,

    /// `"..."`
    #[regex(r#""[^"]*""#)]
    DoubleQuoted,

    /// `'...'`
    #[regex(r"'[^']*'")]
    SingleQuoted,

    /// `>`
    #[token(">")]
    Close,

    /// `/>`
    #[token("/>")]
    SelfClose,
}

/// An attribute exactly as written in a start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RawAttribute {
    /// The attribute name, case preserved.
    pub name: SmolStr,
    /// The value with quotes removed and attribute entities decoded; empty when absent.
    pub value: String,
    /// The span of the whole `name="value"` occurrence.
    pub span: Span,
}

/// A successfully matched start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    /// The tag name, case preserved.
    pub name: SmolStr,
    /// Attributes in source order.
    pub attrs: Vec<RawAttribute>,
    /// Whether the tag ended with `/>`.
    pub self_closing: bool,
    /// Span from `<` through the closing `>`.
    pub span: Span,
}

/// A successfully matched end tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndTag {
    /// The tag name, case preserved.
    pub name: SmolStr,
    /// Span from `<` through `>`.
    pub span: Span,
}

fn is_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.')
}

/// Matches `name` or `prefix:name` at `pos`, returning the end offset.
pub fn scan_tag_name(source: &str, pos: usize) -> Option<usize> {
    let bytes = source.as_bytes();
    let scan_part = |start: usize| -> Option<usize> {
        if !bytes.get(start).copied().is_some_and(is_name_start) {
            return None;
        }
        let len = bytes[start..].iter().take_while(|b| is_name_char(**b)).count();
        Some(start + len)
    };

    let mut end = scan_part(pos)?;
    if bytes.get(end) == Some(&b':') {
        if let Some(qualified_end) = scan_part(end + 1) {
            end = qualified_end;
        }
    }
    (end - pos <= MAX_NAME_LEN).then_some(end)
}

/// Returns the next tag token starting at `pos` with its absolute range.
fn next_token(source: &str, pos: usize) -> Option<(Result<TagToken, ()>, Range<usize>)> {
    let mut lex = TagToken::lexer(&source[pos..]);
    let token = lex.next()?;
    let span = lex.span();
    Some((token, pos + span.start..pos + span.end))
}

/// Skips whitespace tokens, returning the first non-whitespace token.
fn next_significant(source: &str, mut pos: usize) -> Option<(Result<TagToken, ()>, Range<usize>)> {
    loop {
        let (token, range) = next_token(source, pos)?;
        if token == Ok(TagToken::Whitespace) {
            pos = range.end;
            continue;
        }
        return Some((token, range));
    }
}

/// Matches an unquoted attribute value at `pos`, returning its end offset.
fn scan_unquoted_value(source: &str, pos: usize) -> Option<usize> {
    let len = source.as_bytes()[pos..]
        .iter()
        .take_while(|b| !b.is_ascii_whitespace() && !matches!(b, b'"' | b'\'' | b'=' | b'<' | b'>' | b'`'))
        .count();
    (len > 0).then_some(pos + len)
}

/// Matches the optional `= value` part of an attribute.
///
/// Returns `(value, end)` or `None` if there is no `=`. A `=` that is not
/// followed by a valid value fails the whole start tag.
fn parse_attribute_value(source: &str, pos: usize) -> Result<Option<(String, usize)>, ()> {
    match next_significant(source, pos) {
        Some((Ok(TagToken::Eq), eq)) => {
            let value_start = match next_significant(source, eq.end) {
                Some((_, range)) => range.start,
                None => return Err(()),
            };
            match next_token(source, value_start) {
                Some((Ok(TagToken::DoubleQuoted | TagToken::SingleQuoted), range)) => {
                    let inner = &source[range.start + 1..range.end - 1];
                    Ok(Some((decode_attr(inner).into_owned(), range.end)))
                }
                _ => {
                    let end = scan_unquoted_value(source, value_start).ok_or(())?;
                    Ok(Some((decode_attr(&source[value_start..end]).into_owned(), end)))
                }
            }
        }
        _ => Ok(None),
    }
}

/// Matches a start tag at `pos`, which must point at `<`.
///
/// Returns `None` if the text there is not a complete start tag; the caller then
/// treats the `<` as literal text.
pub fn parse_start_tag(source: &str, pos: usize) -> Option<StartTag> {
    if source.as_bytes().get(pos) != Some(&b'<') {
        return None;
    }
    let name_end = scan_tag_name(source, pos + 1)?;
    let name = SmolStr::new(&source[pos + 1..name_end]);

    let mut attrs = Vec::new();
    let mut cursor = name_end;
    loop {
        let (token, range) = next_significant(source, cursor)?;
        match token.ok()? {
            TagToken::Close | TagToken::SelfClose => {
                return Some(StartTag {
                    name,
                    attrs,
                    self_closing: token == Ok(TagToken::SelfClose),
                    span: Span::from_usize(pos, range.end),
                });
            }
            TagToken::Name if attrs.len() < MAX_ATTRIBUTES && range.len() <= MAX_NAME_LEN => {
                let (value, end) = match parse_attribute_value(source, range.end).ok()? {
                    Some((value, end)) => (value, end),
                    None => (String::new(), range.end),
                };
                attrs.push(RawAttribute {
                    name: SmolStr::new(&source[range.clone()]),
                    value,
                    span: Span::from_usize(range.start, end),
                });
                cursor = end;
            }
            _ => return None,
        }
    }
}

/// Matches an end tag at `pos`, which must point at `<`.
///
/// The closing `>` must appear within `MAX_NAME_LEN` bytes of the name.
pub fn parse_end_tag(source: &str, pos: usize) -> Option<EndTag> {
    if !source[pos..].starts_with("</") {
        return None;
    }
    let name_end = scan_tag_name(source, pos + 2)?;
    let close = source[name_end..]
        .bytes()
        .take(MAX_NAME_LEN)
        .position(|b| b == b'>')?;
    Some(EndTag {
        name: SmolStr::new(&source[pos + 2..name_end]),
        span: Span::from_usize(pos, name_end + close + 1),
    })
}
