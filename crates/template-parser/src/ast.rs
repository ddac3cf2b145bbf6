//! AST types for parsed templates.
//!
//! Elements live in an arena owned by [`Template`] and refer to each other by
//! [`ElementId`]. Children are owned downward; `parent` is a plain index used
//! for ancestry queries only.

use crate::interpolation::TextToken;
use crate::lexer::RawAttribute;
use crate::span::Span;
use indexmap::IndexMap;
use smol_str::SmolStr;

/// Index of an element in [`Template::elements`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ElementId(pub(crate) u32);

impl ElementId {
    /// Returns the arena index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A parsed template: every element created during the scan plus the root.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Template {
    /// Arena of all elements, in creation order.
    pub elements: Vec<Element>,
    /// The single root element, if one was found.
    pub root: Option<ElementId>,
}

impl Template {
    /// Returns the element with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not come from this template.
    pub fn element(&self, id: ElementId) -> &Element {
        &self.elements[id.index()]
    }

    pub(crate) fn element_mut(&mut self, id: ElementId) -> &mut Element {
        &mut self.elements[id.index()]
    }

    /// Returns the root element.
    pub fn root_element(&self) -> Option<&Element> {
        self.root.map(|id| self.element(id))
    }

    /// Returns the element children of `id`, skipping text nodes.
    pub fn child_elements(&self, id: ElementId) -> impl Iterator<Item = &Element> + '_ {
        self.element(id).children.iter().filter_map(|node| match node {
            Node::Element(child) => Some(self.element(*child)),
            _ => None,
        })
    }

    /// Walks `parent` links from `id` upward, starting with `id` itself.
    pub fn ancestors(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        std::iter::successors(Some(id), |current| self.element(*current).parent)
    }

    pub(crate) fn push(&mut self, element: Element) -> ElementId {
        let id = ElementId(self.elements.len() as u32);
        self.elements.push(element);
        id
    }
}

/// A node in an element's child list.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", content = "node", rename_all = "camelCase"))]
pub enum Node {
    /// A child element.
    Element(ElementId),
    /// Text containing interpolations.
    Expression(ExpressionText),
    /// Literal text.
    Text(Text),
}

impl Node {
    /// Returns the literal text of a text node.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(&text.text),
            _ => None,
        }
    }
}

/// Text containing at least one interpolation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ExpressionText {
    /// The generated concatenation expression.
    pub expression: String,
    /// Literal and binding fragments.
    pub tokens: Vec<TextToken>,
    /// The decoded source text.
    pub text: String,
    /// Source span of the text run.
    pub span: Span,
}

/// Literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Text {
    /// The decoded text, or a single space for collapsed whitespace.
    pub text: String,
    /// Source span of the text run.
    pub span: Span,
}

/// An element node.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Element {
    /// The tag name, case preserved.
    pub tag: SmolStr,
    /// Attributes left after structural directives were consumed.
    pub attrs_list: Vec<RawAttribute>,
    /// Last-wins projection of the original attribute list.
    pub attrs_map: IndexMap<SmolStr, String>,
    /// The enclosing element, if linked into the tree.
    pub parent: Option<ElementId>,
    /// Child nodes in source order.
    pub children: Vec<Node>,
    /// Directive-derived metadata.
    pub directives: Directives,
    /// Span of the start tag, extended to the end tag once closed.
    pub span: Span,
}

impl Element {
    pub(crate) fn new(tag: SmolStr, attrs: Vec<RawAttribute>, parent: Option<ElementId>, span: Span) -> Self {
        let attrs_map = attrs
            .iter()
            .map(|attr| (attr.name.clone(), attr.value.clone()))
            .collect();
        Self {
            tag,
            attrs_list: attrs,
            attrs_map,
            parent,
            children: Vec::new(),
            directives: Directives::default(),
            span,
        }
    }

    /// Returns true if the element has a `v-for` directive.
    pub fn has_for(&self) -> bool {
        self.directives.for_loop.is_some()
    }

    /// Returns the last child node.
    pub fn last_child(&self) -> Option<&Node> {
        self.children.last()
    }
}

/// Everything directive processing attaches to an element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Directives {
    /// `v-for` loop.
    pub for_loop: Option<ForLoop>,
    /// `v-if` condition.
    pub if_expression: Option<String>,
    /// `v-else`.
    pub is_else: bool,
    /// `v-else-if` condition.
    pub else_if_expression: Option<String>,
    /// Branches of a conditional chain; only on the element carrying `v-if`.
    pub if_conditions: Vec<IfCondition>,
    /// `v-once`.
    pub is_once: bool,
    /// Key binding expression.
    pub key: Option<String>,
    /// Ref binding expression.
    pub ref_: Option<String>,
    /// Whether the ref sits inside a loop.
    pub ref_in_for: bool,
    /// `name` of a `<slot>` outlet.
    pub slot_name: Option<String>,
    /// Target slot of projected content.
    pub slot_target: Option<String>,
    /// Scope parameter of a scoped slot.
    pub slot_scope: Option<String>,
    /// Scoped slot templates keyed by target name.
    pub scoped_slots: IndexMap<String, ElementId>,
    /// Dynamic component binding (`is`).
    pub component: Option<String>,
    /// `inline-template`.
    pub is_inline_template: bool,
    /// No key and no remaining attributes.
    pub is_plain: bool,
    /// Carries at least one binding or directive attribute.
    pub has_bindings: bool,
    /// DOM property bindings.
    pub props: Vec<Binding>,
    /// Attribute bindings and literal attributes.
    pub attrs: Vec<Binding>,
    /// Generic directives.
    pub directives: Vec<DirectiveBinding>,
    /// Event handlers.
    pub handlers: Vec<Handler>,
}

/// A parsed `v-for` value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ForLoop {
    /// The iterated source expression.
    pub source: String,
    /// The value alias.
    pub alias: String,
    /// The first index/key alias.
    pub iterator1: Option<String>,
    /// The second index alias.
    pub iterator2: Option<String>,
}

/// One branch of a conditional chain.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct IfCondition {
    /// The branch condition; `None` for `v-else`.
    pub expression: Option<String>,
    /// The element rendered for this branch.
    pub block: ElementId,
}

/// A name/value binding, used for both props and attrs.
///
/// `value` is always an expression: literal attributes carry a quoted string.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Binding {
    pub name: String,
    pub value: String,
}

/// A generic directive such as `v-model` or `v-custom:arg.mod`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct DirectiveBinding {
    /// Name without prefix, argument or modifiers.
    pub name: String,
    /// The attribute name as written.
    pub raw_name: String,
    /// The raw value expression.
    pub value: String,
    /// The argument after the first `:`.
    pub arg: Option<String>,
    /// Dot-separated modifiers.
    pub modifiers: Vec<String>,
}

/// An event handler registration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Handler {
    /// Event name, with `!`, `~` and `&` prefixes for capture, once and passive.
    pub name: String,
    /// The handler expression.
    pub value: String,
    /// Modifiers not folded into the name.
    pub modifiers: Vec<String>,
    /// Listens on the component's root element rather than its emitted events.
    pub native: bool,
}
