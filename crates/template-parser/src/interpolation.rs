//! Splitting text runs on interpolation delimiters.

use crate::cache::RegexCache;
use crate::filters::parse_filters;
use crate::helpers::json_quote;
use once_cell::sync::Lazy;
use regex::Regex;

static DEFAULT_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{\{(.+?)\}\}").expect("default delimiter pattern is valid"));

static CUSTOM_TAG_RE: Lazy<RegexCache> = Lazy::new(RegexCache::default);

/// One fragment of an interpolated text run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum TextToken {
    /// Literal text between interpolations.
    Literal(String),
    /// A filtered binding expression.
    Binding(String),
}

/// A text run containing at least one interpolation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedText {
    /// Concatenation expression, e.g. `"Hi "+_s(name)`.
    pub expression: String,
    /// The literal and binding fragments in source order.
    pub tokens: Vec<TextToken>,
}

/// Returns the regex matching one interpolation for the given delimiters.
fn tag_regex(delimiters: Option<&(String, String)>) -> Option<Regex> {
    match delimiters {
        None => Some(DEFAULT_TAG_RE.clone()),
        Some((open, close)) => {
            let key = format!("{open}\u{0}{close}");
            CUSTOM_TAG_RE.get_or_compile(&key, || {
                format!("(?s){}(.+?){}", regex::escape(open), regex::escape(close))
            })
        }
    }
}

/// Parses interpolations out of `text`.
///
/// Returns `None` when the text contains no complete delimiter pair.
pub fn parse_text(text: &str, delimiters: Option<&(String, String)>) -> Option<ParsedText> {
    let tag_re = tag_regex(delimiters)?;
    if !tag_re.is_match(text) {
        return None;
    }

    let mut expression = Vec::new();
    let mut tokens = Vec::new();
    let mut last_index = 0;
    for caps in tag_re.captures_iter(text) {
        let (Some(whole), Some(body)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last_index {
            let literal = &text[last_index..whole.start()];
            expression.push(json_quote(literal));
            tokens.push(TextToken::Literal(literal.to_string()));
        }
        let exp = parse_filters(body.as_str().trim());
        expression.push(format!("_s({exp})"));
        tokens.push(TextToken::Binding(exp));
        last_index = whole.end();
    }
    if last_index < text.len() {
        let literal = &text[last_index..];
        expression.push(json_quote(literal));
        tokens.push(TextToken::Literal(literal.to_string()));
    }

    Some(ParsedText {
        expression: expression.join("+"),
        tokens,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_text() {
        assert_eq!(parse_text("hello {{ world", None), None);
    }

    #[test]
    fn test_mixed_text() {
        let parsed = parse_text("Hi {{ name | upper }}!", None).unwrap();
        assert_eq!(parsed.expression, "\"Hi \"+_s(_f(\"upper\")(name))+\"!\"");
        assert_eq!(
            parsed.tokens,
            vec![
                TextToken::Literal("Hi ".to_string()),
                TextToken::Binding("_f(\"upper\")(name)".to_string()),
                TextToken::Literal("!".to_string()),
            ]
        );
    }

    #[test]
    fn test_multiline_binding() {
        let parsed = parse_text("{{ a +\n b }}", None).unwrap();
        assert_eq!(parsed.expression, "_s(a +\n b)");
    }

    #[test]
    fn test_custom_delimiters() {
        let delimiters = ("${".to_string(), "}".to_string());
        let parsed = parse_text("${ x }{{ y }}", Some(&delimiters)).unwrap();
        assert_eq!(parsed.expression, "_s(x)+\"{{ y }}\"");
    }
}
