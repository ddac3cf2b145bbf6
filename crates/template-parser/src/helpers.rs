//! Tag tables and small string helpers shared by the tokenizer and the builder.

/// Elements whose body is consumed verbatim up to the matching end tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea"];

/// Void elements: never have children or an end tag.
const UNARY_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "frame", "hr", "img", "input", "isindex", "keygen",
    "link", "meta", "param", "source", "track", "wbr",
];

/// Elements whose end tag may be omitted when a sibling of the same name starts.
const CAN_BE_LEFT_OPEN: &[&str] = &[
    "colgroup", "dd", "dt", "li", "options", "p", "td", "tfoot", "th", "thead", "tr", "source",
];

/// Block-level elements; starting one of these closes an open `<p>`.
/// See: https://html.spec.whatwg.org/multipage/indices.html#elements-3
const NON_PHRASING: &[&str] = &[
    "address", "article", "aside", "base", "blockquote", "body", "caption", "col", "colgroup",
    "dd", "details", "dialog", "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer",
    "form", "h1", "h2", "h3", "h4", "h5", "h6", "head", "header", "hgroup", "hr", "html",
    "legend", "li", "menuitem", "meta", "optgroup", "option", "param", "rp", "rt", "source",
    "style", "summary", "tbody", "td", "tfoot", "th", "thead", "title", "tr", "track",
];

/// Elements that take a `value` property rather than attribute.
const ACCEPTS_VALUE: &[&str] = &["input", "textarea", "option", "select", "progress"];

fn contains_ignore_case(table: &[&str], tag: &str) -> bool {
    table.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

/// Returns true for `script`, `style` and `textarea`.
pub fn is_raw_text_element(tag: &str) -> bool {
    contains_ignore_case(RAW_TEXT_ELEMENTS, tag)
}

/// Returns true for raw-text elements whose comment and CDATA wrappers are kept verbatim.
pub fn keeps_raw_wrappers(tag: &str) -> bool {
    ["script", "style", "noscript"]
        .iter()
        .any(|t| t.eq_ignore_ascii_case(tag))
}

/// Returns true for elements whose text children bypass entity decoding.
pub fn is_text_tag(tag: &str) -> bool {
    tag.eq_ignore_ascii_case("script") || tag.eq_ignore_ascii_case("style")
}

/// Returns true for HTML void elements.
pub fn is_unary(tag: &str) -> bool {
    contains_ignore_case(UNARY_ELEMENTS, tag)
}

/// Returns true for elements that may be closed by a following sibling start tag.
pub fn can_be_left_open(tag: &str) -> bool {
    contains_ignore_case(CAN_BE_LEFT_OPEN, tag)
}

/// Returns true for block-level elements.
pub fn is_non_phrasing(tag: &str) -> bool {
    contains_ignore_case(NON_PHRASING, tag)
}

/// Returns true for elements whose first body newline is dropped.
pub fn ignores_first_newline(tag: &str) -> bool {
    tag.eq_ignore_ascii_case("pre") || tag.eq_ignore_ascii_case("textarea")
}

/// Returns true if `attr` on `tag` must be bound as a DOM property rather than an attribute.
///
/// `type_attr` is the element's declared `type` attribute, if any.
pub fn must_use_prop(tag: &str, type_attr: Option<&str>, attr: &str) -> bool {
    (attr == "value" && ACCEPTS_VALUE.contains(&tag) && type_attr != Some("button"))
        || (attr == "selected" && tag == "option")
        || (attr == "checked" && tag == "input")
        || (attr == "muted" && tag == "video")
}

/// Converts a hyphenated name to camel case: `foo-bar` becomes `fooBar`.
pub fn camelize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut chars = name.chars().peekable();
    while let Some(c) = chars.next() {
        match chars.peek() {
            Some(next) if c == '-' && (next.is_ascii_alphanumeric() || *next == '_') => {
                out.extend(next.to_uppercase());
                chars.next();
            }
            _ => out.push(c),
        }
    }
    out
}

/// Quotes `value` as a JavaScript string literal.
pub fn json_quote(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camelize() {
        assert_eq!(camelize("inner-html"), "innerHtml");
        assert_eq!(camelize("foo-bar-baz"), "fooBarBaz");
        assert_eq!(camelize("already"), "already");
        assert_eq!(camelize("trailing-"), "trailing-");
    }

    #[test]
    fn test_json_quote() {
        assert_eq!(json_quote("a \"b\"\n"), r#""a \"b\"\n""#);
    }

    #[test]
    fn test_must_use_prop() {
        assert!(must_use_prop("input", Some("checkbox"), "value"));
        assert!(!must_use_prop("input", Some("button"), "value"));
        assert!(must_use_prop("option", None, "selected"));
        assert!(must_use_prop("video", None, "muted"));
        assert!(!must_use_prop("div", None, "value"));
    }

    #[test]
    fn test_tag_tables_ignore_case() {
        assert!(is_raw_text_element("SCRIPT"));
        assert!(is_text_tag("SCRIPT"));
        assert!(!is_text_tag("textarea"));
        assert!(is_unary("Br"));
        assert!(can_be_left_open("li"));
        assert!(is_non_phrasing("div"));
        assert!(!is_non_phrasing("span"));
    }
}
