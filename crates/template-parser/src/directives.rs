//! Attribute processing: bindings, event handlers, generic directives and
//! literal attributes.
//!
//! Structural directives (`v-for`, `v-if`, `key`, `ref`, slots) are consumed
//! by the builder first; whatever is left in `attrs_list` ends up here.

use crate::ast::{Binding, DirectiveBinding, Element, ElementId, Handler, Template};
use crate::error::{Warning, WarningKind, WarningSink};
use crate::filters::{gen_assignment_code, parse_filters};
use crate::helpers::{camelize, json_quote, must_use_prop};
use crate::interpolation::parse_text;
use crate::span::Span;
use crate::ParseOptions;

const DIRECTIVE_PREFIXES: [&str; 3] = ["v-", "@", ":"];
const BIND_PREFIXES: [&str; 2] = [":", "v-bind:"];
const ON_PREFIXES: [&str; 2] = ["@", "v-on:"];

fn strip_any<'a>(name: &'a str, prefixes: &[&str]) -> Option<&'a str> {
    prefixes.iter().find_map(|prefix| name.strip_prefix(prefix))
}

/// Returns true if `name` is written with a directive prefix.
pub fn is_directive(name: &str) -> bool {
    strip_any(name, &DIRECTIVE_PREFIXES).is_some()
}

/// Splits `name.mod1.mod2` into the bare name and its modifiers.
///
/// Empty segments are dropped and repeated modifiers are kept once.
pub fn parse_modifiers(name: &str) -> (&str, Vec<String>) {
    let Some((bare, rest)) = name.split_once('.') else {
        return (name, Vec::new());
    };
    let mut modifiers: Vec<String> = Vec::new();
    for modifier in rest.split('.').filter(|m| !m.is_empty()) {
        if !modifiers.iter().any(|m| m == modifier) {
            modifiers.push(modifier.to_string());
        }
    }
    (bare, modifiers)
}

/// Removes `name` from `modifiers`, returning whether it was present.
fn take_modifier(modifiers: &mut Vec<String>, name: &str) -> bool {
    match modifiers.iter().position(|m| m == name) {
        Some(index) => {
            modifiers.remove(index);
            true
        }
        None => false,
    }
}

/// Removes every `name` attribute from the element, returning its value.
///
/// The value is the last-wins one from `attrs_map`.
pub(crate) fn get_and_remove_attr(element: &mut Element, name: &str) -> Option<String> {
    let value = element.attrs_map.shift_remove(name)?;
    element.attrs_list.retain(|attr| attr.name != name);
    Some(value)
}

/// Reads `:name`/`v-bind:name` as a filtered expression, falling back to a
/// quoted static `name` attribute.
pub(crate) fn get_binding_attr(element: &mut Element, name: &str) -> Option<String> {
    let dynamic = match get_and_remove_attr(element, &format!(":{name}")) {
        Some(value) if !value.is_empty() => Some(value),
        _ => get_and_remove_attr(element, &format!("v-bind:{name}")),
    };
    match dynamic {
        Some(value) => Some(parse_filters(&value)),
        None => get_and_remove_attr(element, name).map(|value| json_quote(&value)),
    }
}

pub(crate) fn add_prop(element: &mut Element, name: impl Into<String>, value: impl Into<String>) {
    element.directives.props.push(Binding {
        name: name.into(),
        value: value.into(),
    });
    element.directives.is_plain = false;
}

pub(crate) fn add_attr(element: &mut Element, name: impl Into<String>, value: impl Into<String>) {
    element.directives.attrs.push(Binding {
        name: name.into(),
        value: value.into(),
    });
    element.directives.is_plain = false;
}

fn add_directive(element: &mut Element, directive: DirectiveBinding) {
    element.directives.directives.push(directive);
    element.directives.is_plain = false;
}

/// Registers an event handler, folding `capture`, `once` and `passive` into
/// name prefixes and normalising `click.right`/`click.middle`.
pub(crate) fn add_handler<W: WarningSink + ?Sized>(
    element: &mut Element,
    mut name: String,
    value: String,
    mut modifiers: Vec<String>,
    sink: &mut W,
) {
    if modifiers.iter().any(|m| m == "prevent") && modifiers.iter().any(|m| m == "passive") {
        sink.warn(Warning::new(WarningKind::PassiveWithPrevent, element.span));
    }

    if name == "click" {
        if take_modifier(&mut modifiers, "right") {
            name = "contextmenu".to_string();
        } else if modifiers.iter().any(|m| m == "middle") {
            name = "mouseup".to_string();
        }
    }
    if take_modifier(&mut modifiers, "capture") {
        name.insert(0, '!');
    }
    if take_modifier(&mut modifiers, "once") {
        name.insert(0, '~');
    }
    if take_modifier(&mut modifiers, "passive") {
        name.insert(0, '&');
    }
    let native = take_modifier(&mut modifiers, "native");

    element.directives.handlers.push(Handler {
        name,
        value,
        modifiers,
        native,
    });
    element.directives.is_plain = false;
}

/// Turns the remaining attributes of `id` into props, attrs, handlers and
/// directives.
pub(crate) fn process_attrs<W: WarningSink + ?Sized>(
    template: &mut Template,
    id: ElementId,
    options: &ParseOptions,
    sink: &mut W,
) {
    let attrs = template.element(id).attrs_list.clone();
    let mut model_values = Vec::new();

    let element = template.element_mut(id);
    for attr in attrs {
        let raw_name = attr.name.as_str();
        let value = attr.value;

        if !is_directive(raw_name) {
            if options.warn_interpolation_in_attributes
                && parse_text(&value, options.delimiters.as_ref()).is_some()
            {
                sink.warn(Warning::new(
                    WarningKind::InterpolationInAttribute {
                        name: raw_name.to_string(),
                        value: value.clone(),
                    },
                    attr.span,
                ));
            }
            add_attr(element, raw_name, json_quote(&value));
            let type_attr = element.attrs_map.get("type").map(String::as_str);
            if element.directives.component.is_none()
                && raw_name == "muted"
                && must_use_prop(&element.tag, type_attr, "muted")
            {
                add_prop(element, "muted", "true");
            }
            continue;
        }

        element.directives.has_bindings = true;
        let (name, mut modifiers) = parse_modifiers(raw_name);

        if let Some(name) = strip_any(name, &BIND_PREFIXES) {
            let value = parse_filters(&value);
            let mut name = name.to_string();
            let mut is_prop = false;
            if take_modifier(&mut modifiers, "prop") {
                is_prop = true;
                name = camelize(&name);
                if name == "innerHtml" {
                    name = "innerHTML".to_string();
                }
            }
            if take_modifier(&mut modifiers, "camel") {
                name = camelize(&name);
            }
            if take_modifier(&mut modifiers, "sync") {
                let event = format!("update:{}", camelize(&name));
                let handler = gen_assignment_code(&value, "$event");
                add_handler(element, event, handler, Vec::new(), sink);
            }
            let type_attr = element.attrs_map.get("type").map(String::as_str);
            if is_prop
                || (element.directives.component.is_none()
                    && must_use_prop(&element.tag, type_attr, &name))
            {
                add_prop(element, name, value);
            } else {
                add_attr(element, name, value);
            }
        } else if let Some(event) = strip_any(name, &ON_PREFIXES) {
            add_handler(element, event.to_string(), value, modifiers, sink);
        } else {
            let bare = strip_any(name, &DIRECTIVE_PREFIXES).unwrap_or(name);
            let (directive, arg) = match bare.split_once(':') {
                Some((directive, arg)) if !arg.is_empty() => (directive, Some(arg.to_string())),
                _ => (bare, None),
            };
            if directive == "model" {
                model_values.push((value.clone(), attr.span));
            }
            add_directive(
                element,
                DirectiveBinding {
                    name: directive.to_string(),
                    raw_name: raw_name.to_string(),
                    value,
                    arg,
                    modifiers,
                },
            );
        }
    }

    for (value, span) in model_values {
        check_model_alias(template, id, &value, span, sink);
    }
}

/// Warns when a model binds directly to a loop alias of the element or an
/// ancestor.
fn check_model_alias<W: WarningSink + ?Sized>(
    template: &Template,
    id: ElementId,
    value: &str,
    span: Span,
    sink: &mut W,
) {
    let bound_to_alias = template.ancestors(id).any(|ancestor| {
        template
            .element(ancestor)
            .directives
            .for_loop
            .as_ref()
            .is_some_and(|for_loop| for_loop.alias == value)
    });
    if bound_to_alias {
        sink.warn(Warning::new(
            WarningKind::ModelOnLoopAlias {
                tag: template.element(id).tag.to_string(),
                alias: value.to_string(),
            },
            span,
        ));
    }
}
