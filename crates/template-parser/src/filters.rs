//! Binding expression helpers: the filter pipeline and model assignment paths.
//!
//! Expressions are treated as opaque JavaScript text. Only the delimiters that
//! matter for splitting (`|`, quotes, brackets and regex literals) are scanned.

/// Characters after which a `/` is a division operator rather than a regex start.
fn is_division_prefix(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b')' | b'.' | b'+' | b'-' | b'_' | b'$' | b']')
}

/// Rewrites `expr | filterA | filterB(arg)` into nested filter calls.
///
/// `msg | capitalize` becomes `_f("capitalize")(msg)`. Expressions without a
/// top-level single pipe are returned trimmed.
pub fn parse_filters(exp: &str) -> String {
    let bytes = exp.as_bytes();
    let mut in_single = false;
    let mut in_double = false;
    let mut in_template = false;
    let mut in_regex = false;
    let (mut curly, mut square, mut paren) = (0i32, 0i32, 0i32);
    let mut last_filter_index = 0;
    let mut expression: Option<&str> = None;
    let mut filters: Vec<&str> = Vec::new();
    let mut prev = 0u8;

    for (i, &c) in bytes.iter().enumerate() {
        let escaped = prev == b'\\';
        prev = c;
        if in_single {
            in_single = !(c == b'\'' && !escaped);
        } else if in_double {
            in_double = !(c == b'"' && !escaped);
        } else if in_template {
            in_template = !(c == b'`' && !escaped);
        } else if in_regex {
            in_regex = !(c == b'/' && !escaped);
        } else if c == b'|'
            && bytes.get(i + 1) != Some(&b'|')
            && (i == 0 || bytes[i - 1] != b'|')
            && curly == 0
            && square == 0
            && paren == 0
        {
            match expression {
                None => expression = Some(exp[..i].trim()),
                Some(_) => filters.push(exp[last_filter_index..i].trim()),
            }
            last_filter_index = i + 1;
        } else {
            match c {
                b'"' => in_double = true,
                b'\'' => in_single = true,
                b'`' => in_template = true,
                b'(' => paren += 1,
                b')' => paren -= 1,
                b'[' => square += 1,
                b']' => square -= 1,
                b'{' => curly += 1,
                b'}' => curly -= 1,
                b'/' => {
                    let before = bytes[..i].iter().rev().find(|b| **b != b' ');
                    if !before.is_some_and(|b| is_division_prefix(*b)) {
                        in_regex = true;
                    }
                }
                _ => {}
            }
        }
    }

    let Some(head) = expression else {
        return exp.trim().to_string();
    };
    filters.push(exp[last_filter_index..].trim());
    filters
        .into_iter()
        .fold(head.to_string(), |acc, filter| wrap_filter(&acc, filter))
}

fn wrap_filter(exp: &str, filter: &str) -> String {
    match filter.find('(') {
        None => format!("_f(\"{filter}\")({exp})"),
        Some(open) => {
            let name = &filter[..open];
            let args = &filter[open + 1..];
            if args == ")" {
                format!("_f(\"{name}\")({exp}{args}")
            } else {
                format!("_f(\"{name}\")({exp},{args}")
            }
        }
    }
}

/// A model path split into the object expression and the member key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPath<'a> {
    /// The object being assigned into, or the whole path when there is no member.
    pub exp: &'a str,
    /// The member key as an expression (quoted for dot access), if any.
    pub key: Option<String>,
}

/// Splits `a.b`, `a[b]` or `a["b"].c` at the last member access.
pub fn parse_model(value: &str) -> ModelPath<'_> {
    let val = value.trim();
    let len = val.len();

    let has_trailing_bracket = val.contains('[') && val.rfind(']').is_some_and(|i| i + 1 == len);
    if !has_trailing_bracket {
        return match val.rfind('.') {
            Some(dot) => ModelPath {
                exp: &val[..dot],
                key: Some(format!("\"{}\"", &val[dot + 1..])),
            },
            None => ModelPath {
                exp: val,
                key: None,
            },
        };
    }

    let bytes = val.as_bytes();
    let mut index = 0;
    let mut expression_pos = 0;
    let mut expression_end = 0;
    while index + 1 < len {
        index += 1;
        match bytes[index] {
            b'"' | b'\'' => index = skip_string(bytes, index),
            b'[' => {
                expression_pos = index;
                let mut depth = 1;
                while index + 1 < len {
                    index += 1;
                    match bytes[index] {
                        b'"' | b'\'' => {
                            index = skip_string(bytes, index);
                            continue;
                        }
                        b'[' => depth += 1,
                        b']' => depth -= 1,
                        _ => {}
                    }
                    if depth == 0 {
                        expression_end = index;
                        break;
                    }
                }
            }
            _ => {}
        }
    }

    ModelPath {
        exp: &val[..expression_pos],
        key: Some(val[expression_pos + 1..expression_end.max(expression_pos + 1)].to_string()),
    }
}

/// Returns the index of the closing quote matching the one at `start`, or the last index.
fn skip_string(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut index = start;
    while index + 1 < bytes.len() {
        index += 1;
        if bytes[index] == quote {
            break;
        }
    }
    index
}

/// Generates code assigning `assignment` to the model path `value`.
///
/// Member paths go through the reactive setter so new keys stay observable.
pub fn gen_assignment_code(value: &str, assignment: &str) -> String {
    let model = parse_model(value);
    match model.key {
        None => format!("{value}={assignment}"),
        Some(key) => format!("$set({}, {key}, {assignment})", model.exp),
    }
}
