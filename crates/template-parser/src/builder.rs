//! Tree assembly on top of the tokenizer.
//!
//! The [`Builder`] receives tokenizer events and maintains its own stack of
//! open elements, which stays in lock-step with the tokenizer's because unary
//! elements are pushed on neither. Structural directives are consumed when an
//! element opens; conditional branches and scoped slots are linked to their
//! owners rather than appended as children.

use crate::ast::{Element, ElementId, ExpressionText, ForLoop, IfCondition, Node, Template, Text};
use crate::directives::{add_attr, get_and_remove_attr, get_binding_attr, process_attrs};
use crate::entities::decode_entities;
use crate::error::{Warning, WarningKind, WarningSink};
use crate::helpers::is_text_tag;
use crate::interpolation::parse_text;
use crate::lexer::StartTag;
use crate::span::Span;
use crate::tokenizer::{scan, TokenSink};
use crate::ParseOptions;
use once_cell::sync::Lazy;
use regex::Regex;

static FOR_ALIAS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^(.*?)\s+(?:in|of)\s+(.*)$").expect("loop alias pattern is valid")
});

static FOR_ITERATOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r",([^,\}\]]*)(?:,([^,\}\]]*))?$").expect("loop iterator pattern is valid")
});

/// Name under which an unnamed scoped slot is registered.
const DEFAULT_SLOT: &str = "\"default\"";

/// Parses a `v-for` value such as `(item, index) in items`.
///
/// Returns `None` if there is no `in`/`of` separator.
pub fn parse_for(exp: &str) -> Option<ForLoop> {
    let caps = FOR_ALIAS_RE.captures(exp)?;
    let source = caps.get(2)?.as_str().trim().to_string();
    let alias = caps.get(1)?.as_str().trim();
    let alias = alias.strip_prefix('(').unwrap_or(alias);
    let alias = alias.strip_suffix(')').unwrap_or(alias);

    let mut for_loop = ForLoop {
        source,
        alias: alias.to_string(),
        iterator1: None,
        iterator2: None,
    };
    if let Some(iterators) = FOR_ITERATOR_RE.captures(alias) {
        let whole = iterators.get(0)?;
        for_loop.alias = alias[..whole.start()].trim().to_string();
        for_loop.iterator1 = iterators.get(1).map(|m| m.as_str().trim().to_string());
        for_loop.iterator2 = iterators
            .get(2)
            .filter(|m| !m.as_str().is_empty())
            .map(|m| m.as_str().trim().to_string());
    }
    Some(for_loop)
}

/// Builds a [`Template`] from `source`, reporting warnings to `sink`.
pub(crate) fn build<W: WarningSink + ?Sized>(
    source: &str,
    options: &ParseOptions,
    sink: &mut W,
) -> Template {
    let mut builder = Builder {
        source,
        options,
        template: Template::default(),
        stack: Vec::new(),
        warned_multiple_roots: false,
        sink,
    };
    scan(source, &mut builder);
    builder.finish()
}

struct Builder<'a, W: ?Sized> {
    source: &'a str,
    options: &'a ParseOptions,
    template: Template,
    stack: Vec<ElementId>,
    warned_multiple_roots: bool,
    sink: &'a mut W,
}

impl<W: WarningSink + ?Sized> WarningSink for Builder<'_, W> {
    fn warn(&mut self, warning: Warning) {
        self.sink.warn(warning);
    }
}

impl<W: WarningSink + ?Sized> TokenSink for Builder<'_, W> {
    fn start_tag(&mut self, tag: StartTag, unary: bool) {
        let parent = self.current_parent();
        let id = self
            .template
            .push(Element::new(tag.name, tag.attrs, parent, tag.span));

        self.process_for(id);
        self.process_if(id);
        self.process_once(id);
        self.process_element(id);

        match self.template.root {
            None => {
                self.template.root = Some(id);
                let element = self.template.element(id);
                if element.directives.is_else || element.directives.else_if_expression.is_some() {
                    let warning = else_without_if(element);
                    self.warn(warning);
                }
                self.check_root_constraints(id);
            }
            Some(root) if self.stack.is_empty() => self.add_top_level(root, id),
            Some(_) => {}
        }

        if let Some(parent) = parent {
            let directives = &self.template.element(id).directives;
            if directives.is_else || directives.else_if_expression.is_some() {
                self.process_if_conditions(id, parent);
            } else if directives.slot_scope.is_some() {
                let name = directives
                    .slot_target
                    .clone()
                    .unwrap_or_else(|| DEFAULT_SLOT.to_string());
                let parent = self.template.element_mut(parent);
                parent.directives.is_plain = false;
                parent.directives.scoped_slots.insert(name, id);
            } else {
                self.template
                    .element_mut(parent)
                    .children
                    .push(Node::Element(id));
            }
        }

        if !unary {
            self.stack.push(id);
        }
    }

    fn end_tag(&mut self, _name: &str, span: Span) {
        let Some(id) = self.stack.pop() else {
            return;
        };
        let element = self.template.element_mut(id);
        if element.last_child().and_then(Node::as_text) == Some(" ") {
            element.children.pop();
        }
        element.span = element.span.cover(span);
    }

    fn text(&mut self, text: &str, span: Span) {
        let Some(parent) = self.current_parent() else {
            self.text_outside_root(text, span);
            return;
        };

        let element = self.template.element(parent);
        let text = if !text.trim().is_empty() {
            if is_text_tag(&element.tag) {
                text.to_string()
            } else {
                decode_entities(text).into_owned()
            }
        } else if self.options.preserve_whitespace && !element.children.is_empty() {
            " ".to_string()
        } else {
            return;
        };

        if text != " " {
            if let Some(parsed) = parse_text(&text, self.options.delimiters.as_ref()) {
                self.template
                    .element_mut(parent)
                    .children
                    .push(Node::Expression(ExpressionText {
                        expression: parsed.expression,
                        tokens: parsed.tokens,
                        text,
                        span,
                    }));
                return;
            }
        }

        let element = self.template.element_mut(parent);
        if text != " " || element.last_child().and_then(Node::as_text) != Some(" ") {
            element.children.push(Node::Text(Text { text, span }));
        }
    }
}

impl<W: WarningSink + ?Sized> Builder<'_, W> {
    fn current_parent(&self) -> Option<ElementId> {
        self.stack.last().copied()
    }

    fn finish(mut self) -> Template {
        if self.template.root.is_none() {
            let span = Span::from_usize(0, self.source.len());
            self.warn(Warning::new(WarningKind::NoRootElement, span));
        }
        self.template
    }

    fn text_outside_root(&mut self, text: &str, span: Span) {
        let trimmed = text.trim();
        // A template that is nothing but text is reported once by `finish`.
        if trimmed.is_empty() || (self.template.root.is_none() && text.len() == self.source.len()) {
            return;
        }
        self.warn(Warning::new(
            WarningKind::TextOutsideRoot {
                text: trimmed.to_string(),
            },
            span,
        ));
    }

    /// Links a second top-level element: an else branch of a conditional root
    /// joins its chain, anything else is a second root.
    fn add_top_level(&mut self, root: ElementId, id: ElementId) {
        let element = self.template.element(id);
        let is_branch = element.directives.is_else || element.directives.else_if_expression.is_some();
        let chain = &self.template.element(root).directives;
        // A chain that already ended in a plain else takes no further branches.
        let root_is_conditional = chain.if_expression.is_some()
            && chain
                .if_conditions
                .last()
                .is_some_and(|condition| condition.expression.is_some());

        if is_branch && root_is_conditional {
            let expression = element.directives.else_if_expression.clone();
            self.check_root_constraints(id);
            self.template
                .element_mut(root)
                .directives
                .if_conditions
                .push(IfCondition { expression, block: id });
        } else if is_branch {
            let warning = else_without_if(element);
            self.warn(warning);
        } else if !self.warned_multiple_roots {
            self.warned_multiple_roots = true;
            let span = element.span;
            self.warn(Warning::new(WarningKind::MultipleRoots, span));
        }
    }

    fn check_root_constraints(&mut self, id: ElementId) {
        let element = self.template.element(id);
        let reason = if element.tag == "slot" || element.tag == "template" {
            Some(format!("<{}>", element.tag))
        } else if element.has_for() {
            Some("v-for".to_string())
        } else {
            None
        };
        if let Some(reason) = reason {
            let span = element.span;
            self.warn(Warning::new(WarningKind::UnstableRoot { reason }, span));
        }
    }

    /// Attaches an else branch to the `v-if` element immediately before it,
    /// dropping any text in between.
    fn process_if_conditions(&mut self, id: ElementId, parent: ElementId) {
        let previous = loop {
            match self.template.element(parent).children.last() {
                Some(Node::Element(previous)) => break Some(*previous),
                Some(Node::Text(text)) if text.text == " " => {}
                Some(Node::Text(Text { text, span }))
                | Some(Node::Expression(ExpressionText { text, span, .. })) => {
                    let warning = Warning::new(
                        WarningKind::TextBetweenConditions {
                            text: text.trim().to_string(),
                        },
                        *span,
                    );
                    self.warn(warning);
                }
                None => break None,
            }
            self.template.element_mut(parent).children.pop();
        };

        let expression = self.template.element(id).directives.else_if_expression.clone();
        match previous {
            Some(previous) if self.template.element(previous).directives.if_expression.is_some() => {
                self.template
                    .element_mut(previous)
                    .directives
                    .if_conditions
                    .push(IfCondition { expression, block: id });
            }
            _ => {
                let warning = else_without_if(self.template.element(id));
                self.warn(warning);
            }
        }
    }

    fn process_for(&mut self, id: ElementId) {
        let element = self.template.element_mut(id);
        let Some(exp) = get_and_remove_attr(element, "v-for").filter(|exp| !exp.is_empty()) else {
            return;
        };
        match parse_for(&exp) {
            Some(for_loop) => element.directives.for_loop = Some(for_loop),
            None => {
                let span = element.span;
                self.warn(Warning::new(
                    WarningKind::InvalidForExpression { expression: exp },
                    span,
                ));
            }
        }
    }

    fn process_if(&mut self, id: ElementId) {
        let element = self.template.element_mut(id);
        if let Some(exp) = get_and_remove_attr(element, "v-if").filter(|exp| !exp.is_empty()) {
            element.directives.if_expression = Some(exp.clone());
            element.directives.if_conditions.push(IfCondition {
                expression: Some(exp),
                block: id,
            });
            return;
        }
        if get_and_remove_attr(element, "v-else").is_some() {
            element.directives.is_else = true;
        }
        element.directives.else_if_expression =
            get_and_remove_attr(element, "v-else-if").filter(|exp| !exp.is_empty());
    }

    fn process_once(&mut self, id: ElementId) {
        let element = self.template.element_mut(id);
        element.directives.is_once = get_and_remove_attr(element, "v-once").is_some();
    }

    /// Key, plainness, ref, slot and component handling, then the remaining attributes.
    fn process_element(&mut self, id: ElementId) {
        self.process_key(id);

        let element = self.template.element_mut(id);
        element.directives.is_plain = element.directives.key.is_none() && element.attrs_list.is_empty();

        self.process_ref(id);
        self.process_slot(id);
        self.process_component(id);
        process_attrs(&mut self.template, id, self.options, &mut *self.sink);
    }

    fn process_key(&mut self, id: ElementId) {
        let element = self.template.element_mut(id);
        let Some(key) = get_binding_attr(element, "key").filter(|key| !key.is_empty()) else {
            return;
        };
        let keyed_template = element.tag == "template";
        let span = element.span;
        element.directives.key = Some(key);
        if keyed_template {
            self.warn(Warning::new(WarningKind::KeyedTemplate, span));
        }
    }

    fn process_ref(&mut self, id: ElementId) {
        let Some(ref_) = get_binding_attr(self.template.element_mut(id), "ref").filter(|r| !r.is_empty())
        else {
            return;
        };
        let in_for = self
            .template
            .ancestors(id)
            .any(|ancestor| self.template.element(ancestor).has_for());
        let element = self.template.element_mut(id);
        element.directives.ref_ = Some(ref_);
        element.directives.ref_in_for = in_for;
    }

    fn process_slot(&mut self, id: ElementId) {
        let element = self.template.element_mut(id);
        if element.tag == "slot" {
            element.directives.slot_name = get_binding_attr(element, "name");
            return;
        }

        let non_empty = |value: Option<String>| value.filter(|v| !v.is_empty());
        element.directives.slot_scope = if element.tag == "template" {
            non_empty(get_and_remove_attr(element, "scope"))
                .or_else(|| non_empty(get_and_remove_attr(element, "slot-scope")))
        } else {
            non_empty(get_and_remove_attr(element, "slot-scope"))
        };

        if let Some(target) = non_empty(get_binding_attr(element, "slot")) {
            let target = if target == "\"\"" {
                DEFAULT_SLOT.to_string()
            } else {
                target
            };
            if element.tag != "template" && element.directives.slot_scope.is_none() {
                add_attr(element, "slot", target.clone());
            }
            element.directives.slot_target = Some(target);
        }
    }

    fn process_component(&mut self, id: ElementId) {
        let element = self.template.element_mut(id);
        element.directives.component = get_binding_attr(element, "is");
        element.directives.is_inline_template = get_and_remove_attr(element, "inline-template").is_some();
    }
}

fn else_without_if(element: &Element) -> Warning {
    let (directive, expression) = match &element.directives.else_if_expression {
        Some(exp) => ("else-if", exp.clone()),
        None => ("else", String::new()),
    };
    Warning::new(
        WarningKind::ElseWithoutIf {
            directive,
            expression,
            tag: element.tag.to_string(),
        },
        element.span,
    )
}
