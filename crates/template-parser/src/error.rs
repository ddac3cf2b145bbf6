//! Warning types and the sink they are reported through.
//!
//! Nothing in the parsing path is fatal. Every recoverable problem becomes a
//! [`Warning`] handed to a [`WarningSink`]; callers that want strict behaviour
//! treat any warning as a failure.

use crate::span::Span;
use thiserror::Error;

/// A recoverable problem found while parsing a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct Warning {
    /// What went wrong.
    pub kind: WarningKind,
    /// Where in the source it happened.
    pub span: Span,
}

impl Warning {
    /// Creates a new warning.
    pub fn new(kind: WarningKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The kind of warning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WarningKind {
    /// Input the tokenizer could not make progress on.
    #[error("mal-formatted tag at end of template: \"{fragment}\"")]
    MalformedTag {
        /// The unconsumed remainder, truncated for display.
        fragment: String,
    },

    /// An element was closed implicitly because an ancestor's end tag or the end of input was reached.
    #[error("tag <{tag}> has no matching end tag.")]
    MissingEndTag {
        /// The element that was left open.
        tag: String,
    },

    /// An element that may be left open was closed by a following start tag.
    #[error("tag <{tag}> was implicitly closed by <{by}>.")]
    ImplicitlyClosed {
        /// The element that was closed.
        tag: String,
        /// The start tag that closed it.
        by: String,
    },

    /// A loop directive whose value does not match `alias in source`.
    #[error("invalid v-for expression: {expression}")]
    InvalidForExpression {
        /// The raw directive value.
        expression: String,
    },

    /// A `v-else`/`v-else-if` without a directly preceding `v-if` sibling.
    #[error("v-{directive}=\"{expression}\" used on element <{tag}> without corresponding v-if.")]
    ElseWithoutIf {
        /// `else` or `else-if`.
        directive: &'static str,
        /// The else-if condition, empty for a plain else.
        expression: String,
        /// The element carrying the directive.
        tag: String,
    },

    /// Non-blank text between the branches of a conditional chain.
    #[error("text \"{text}\" between v-if and v-else(-if) will be ignored.")]
    TextBetweenConditions {
        /// The dropped text, trimmed.
        text: String,
    },

    /// More than one top-level element outside a conditional chain.
    #[error(
        "Component template should contain exactly one root element. \
         If you are using v-if on multiple elements, use v-else-if to chain them instead."
    )]
    MultipleRoots,

    /// A root element that may render more than one node.
    #[error("Cannot use {reason} as component root element because it may contain multiple nodes.")]
    UnstableRoot {
        /// `<slot>`, `<template>` or `v-for`.
        reason: String,
    },

    /// A template without any element.
    #[error("Component template requires a root element, rather than just text.")]
    NoRootElement,

    /// Text outside the root element.
    #[error("text \"{text}\" outside root element will be ignored.")]
    TextOutsideRoot {
        /// The dropped text, trimmed.
        text: String,
    },

    /// A `key` attribute on a `<template>` wrapper.
    #[error("<template> cannot be keyed. Place the key on real elements instead.")]
    KeyedTemplate,

    /// A literal attribute containing interpolation delimiters.
    #[error(
        "{name}=\"{value}\": Interpolation inside attributes has been removed. \
         Use v-bind or the colon shorthand instead."
    )]
    InterpolationInAttribute {
        /// The attribute name.
        name: String,
        /// The raw attribute value.
        value: String,
    },

    /// A model directive bound straight to a loop alias.
    #[error(
        "<{tag} v-model=\"{alias}\">: You are binding v-model directly to a v-for iteration alias. \
         This will not be able to modify the v-for source array."
    )]
    ModelOnLoopAlias {
        /// The element carrying the directive.
        tag: String,
        /// The alias it is bound to.
        alias: String,
    },

    /// Event modifiers that cannot be combined.
    #[error("passive and prevent can't be used together. Passive handler can't prevent default event.")]
    PassiveWithPrevent,
}

impl WarningKind {
    /// A stable kebab-case identifier for the warning kind.
    pub fn code(&self) -> &'static str {
        match self {
            WarningKind::MalformedTag { .. } => "malformed-tag",
            WarningKind::MissingEndTag { .. } => "missing-end-tag",
            WarningKind::ImplicitlyClosed { .. } => "implicitly-closed",
            WarningKind::InvalidForExpression { .. } => "invalid-for-expression",
            WarningKind::ElseWithoutIf { .. } => "else-without-if",
            WarningKind::TextBetweenConditions { .. } => "text-between-conditions",
            WarningKind::MultipleRoots => "multiple-roots",
            WarningKind::UnstableRoot { .. } => "unstable-root",
            WarningKind::NoRootElement => "no-root-element",
            WarningKind::TextOutsideRoot { .. } => "text-outside-root",
            WarningKind::KeyedTemplate => "keyed-template",
            WarningKind::InterpolationInAttribute { .. } => "interpolation-in-attribute",
            WarningKind::ModelOnLoopAlias { .. } => "model-on-loop-alias",
            WarningKind::PassiveWithPrevent => "passive-with-prevent",
        }
    }
}

/// Receives warnings as the parser produces them.
pub trait WarningSink {
    /// Reports one warning.
    fn warn(&mut self, warning: Warning);
}

impl WarningSink for Vec<Warning> {
    fn warn(&mut self, warning: Warning) {
        self.push(warning);
    }
}

impl<F> WarningSink for F
where
    F: FnMut(Warning),
{
    fn warn(&mut self, warning: Warning) {
        self(warning)
    }
}
