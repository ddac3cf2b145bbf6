//! HTML character reference decoding.

use quick_xml::escape::resolve_html5_entity;
use std::borrow::Cow;

/// Longest reference body we try to resolve (`&CounterClockwiseContourIntegral;` is 31).
const MAX_REFERENCE_LEN: usize = 32;

/// Decodes named and numeric character references in text content.
///
/// Unknown or unterminated references are left untouched.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    decode_with(text, resolve_reference)
}

/// Decodes the references that may appear escaped inside attribute values.
pub fn decode_attr(value: &str) -> Cow<'_, str> {
    decode_with(value, |body| match body {
        "lt" => Some(Cow::Borrowed("<")),
        "gt" => Some(Cow::Borrowed(">")),
        "quot" => Some(Cow::Borrowed("\"")),
        "amp" => Some(Cow::Borrowed("&")),
        "#10" => Some(Cow::Borrowed("\n")),
        "#9" => Some(Cow::Borrowed("\t")),
        _ => None,
    })
}

fn decode_with<'a>(
    text: &'a str,
    resolve: impl Fn(&str) -> Option<Cow<'static, str>>,
) -> Cow<'a, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let resolved = after
            .find(';')
            .filter(|semi| *semi > 0 && *semi <= MAX_REFERENCE_LEN)
            .and_then(|semi| resolve(&after[..semi]).map(|s| (semi, s)));
        match resolved {
            Some((semi, replacement)) => {
                out.push_str(&replacement);
                rest = &after[semi + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn resolve_reference(body: &str) -> Option<Cow<'static, str>> {
    if let Some(num) = body.strip_prefix('#') {
        let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        let c = match char::from_u32(code) {
            Some('\0') | None => char::REPLACEMENT_CHARACTER,
            Some(c) => c,
        };
        return Some(Cow::Owned(c.to_string()));
    }
    resolve_html5_entity(body).map(Cow::Borrowed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_and_numeric() {
        assert_eq!(decode_entities("a &lt; b &amp;&amp; c"), "a < b && c");
        assert_eq!(decode_entities("&copy; &#169; &#xA9;"), "© © ©");
        assert_eq!(decode_entities("&nbsp;"), "\u{a0}");
    }

    #[test]
    fn test_unknown_passes_through() {
        assert_eq!(decode_entities("&bogus; & &;"), "&bogus; & &;");
        assert_eq!(decode_entities("tom & jerry"), "tom & jerry");
        assert!(matches!(decode_entities("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn test_decode_attr_subset() {
        assert_eq!(decode_attr("a&#10;b&quot;"), "a\nb\"");
        assert_eq!(decode_attr("&copy;"), "&copy;");
    }
}
