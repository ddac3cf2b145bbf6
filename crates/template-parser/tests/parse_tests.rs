//! End-to-end parsing tests.

use pretty_assertions::assert_eq;
use template_parser::{
    parse, parse_with_options, scan, Binding, ElementId, Node, ParseOptions, Span, StartTag,
    Template, TokenSink, Warning, WarningKind, WarningSink,
};

fn element_children(template: &Template, id: ElementId) -> Vec<ElementId> {
    template
        .element(id)
        .children
        .iter()
        .filter_map(|node| match node {
            Node::Element(child) => Some(*child),
            _ => None,
        })
        .collect()
}

fn tags(template: &Template, ids: &[ElementId]) -> Vec<String> {
    ids.iter()
        .map(|id| template.element(*id).tag.to_string())
        .collect()
}

fn warning_messages(warnings: &[Warning]) -> Vec<String> {
    warnings.iter().map(ToString::to_string).collect()
}

#[test]
fn test_nesting_mirrors_source() {
    let result = parse("<div><header><h1>t</h1></header><main><p>a</p><p>b</p></main></div>");
    assert!(result.warnings.is_empty());
    let template = &result.template;
    let root = template.root.unwrap();

    let level1 = element_children(template, root);
    assert_eq!(tags(template, &level1), vec!["header", "main"]);
    assert_eq!(tags(template, &element_children(template, level1[0])), vec!["h1"]);
    assert_eq!(tags(template, &element_children(template, level1[1])), vec!["p", "p"]);
    assert_eq!(template.element(level1[1]).parent, Some(root));
}

#[derive(Default)]
struct Spans {
    starts: Vec<(String, Span)>,
    ends: Vec<Span>,
    warnings: Vec<Warning>,
}

impl WarningSink for Spans {
    fn warn(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }
}

impl TokenSink for Spans {
    fn start_tag(&mut self, tag: StartTag, _unary: bool) {
        self.starts.push((tag.name.to_string(), tag.span));
    }

    fn end_tag(&mut self, _name: &str, span: Span) {
        if !span.is_empty() {
            self.ends.push(span);
        }
    }

    fn text(&mut self, _text: &str, _span: Span) {}
}

#[test]
fn test_event_offsets_slice_tags() {
    let source = r#"<div id="a"><input :value='x' disabled/><b class=c>t</b></div>"#;
    let mut spans = Spans::default();
    scan(source, &mut spans);

    let starts: Vec<_> = spans
        .starts
        .iter()
        .map(|(name, span)| (name.as_str(), span.slice(source).unwrap()))
        .collect();
    assert_eq!(
        starts,
        vec![
            ("div", r#"<div id="a">"#),
            ("input", r#"<input :value='x' disabled/>"#),
            ("b", "<b class=c>"),
        ]
    );
    let ends: Vec<_> = spans.ends.iter().map(|span| span.slice(source).unwrap()).collect();
    assert_eq!(ends, vec!["</b>", "</div>"]);
    assert!(spans.warnings.is_empty());
}

#[test]
fn test_script_body_is_raw_text() {
    let result = parse("<script>if (a<b) {}</script>");
    assert!(result.warnings.is_empty());
    let root = result.template.root_element().unwrap();
    assert_eq!(root.tag, "script");
    assert_eq!(root.children.len(), 1);
    assert_eq!(root.children[0].as_text(), Some("if (a<b) {}"));
}

#[test]
fn test_style_and_textarea_bodies() {
    let result = parse("<div><style>a > b { }</style><textarea><b>&amp;</b></textarea></div>");
    let template = &result.template;
    let children = element_children(template, template.root.unwrap());
    assert_eq!(
        template.element(children[0]).children[0].as_text(),
        Some("a > b { }")
    );
    assert_eq!(
        template.element(children[1]).children[0].as_text(),
        Some("<b>&</b>")
    );
}

#[test]
fn test_list_items_close_implicitly() {
    let result = parse("<ul><li>a<li>b</ul>");
    let template = &result.template;
    let root = template.root.unwrap();
    let items = element_children(template, root);
    assert_eq!(tags(template, &items), vec!["li", "li"]);
    assert_eq!(template.element(items[0]).children[0].as_text(), Some("a"));
    assert_eq!(template.element(items[1]).children[0].as_text(), Some("b"));

    assert_eq!(
        warning_messages(&result.warnings),
        vec![
            "tag <li> was implicitly closed by <li>.",
            "tag <li> has no matching end tag.",
        ]
    );
}

#[test]
fn test_loop_directive() {
    let result = parse(r#"<ul><li v-for="(item, index) in items" :key="item.id">{{ item }}</li></ul>"#);
    assert!(result.warnings.is_empty());
    let template = &result.template;
    let li = template.element(element_children(template, template.root.unwrap())[0]);
    let for_loop = li.directives.for_loop.as_ref().unwrap();
    assert_eq!(for_loop.alias, "item");
    assert_eq!(for_loop.source, "items");
    assert_eq!(for_loop.iterator1.as_deref(), Some("index"));
    assert_eq!(for_loop.iterator2, None);
    assert_eq!(li.directives.key.as_deref(), Some("item.id"));
    assert!(li.attrs_list.is_empty());
    assert!(!li.directives.is_plain);
}

#[test]
fn test_invalid_loop_directive() {
    let result = parse(r#"<div><p v-for="items"></p></div>"#);
    let template = &result.template;
    let p = template.element(element_children(template, template.root.unwrap())[0]);
    assert!(p.directives.for_loop.is_none());
    insta::assert_snapshot!(result.warnings[0].to_string(), @"invalid v-for expression: items");
}

#[test]
fn test_conditional_chain_collapses() {
    let result = parse(
        r#"<div>
  <p v-if="a">A</p>
  <p v-else-if="b">B</p>
  <p v-else>C</p>
</div>"#,
    );
    assert!(result.warnings.is_empty());
    let template = &result.template;
    let children = element_children(template, template.root.unwrap());
    assert_eq!(children.len(), 1);

    let head = template.element(children[0]);
    assert_eq!(head.directives.if_expression.as_deref(), Some("a"));
    let expressions: Vec<_> = head
        .directives
        .if_conditions
        .iter()
        .map(|condition| condition.expression.as_deref())
        .collect();
    assert_eq!(expressions, vec![Some("a"), Some("b"), None]);
    assert_eq!(head.directives.if_conditions[0].block, children[0]);
    assert!(template
        .element(head.directives.if_conditions[2].block)
        .directives
        .is_else);
}

#[test]
fn test_conditional_roots() {
    let result = parse(r#"<div v-if="a"></div><span v-else></span>"#);
    assert!(result.warnings.is_empty());
    let root = result.template.root_element().unwrap();
    assert_eq!(root.directives.if_conditions.len(), 2);
}

#[test]
fn test_multiple_roots_warned_once() {
    let result = parse("<div></div><p></p><p></p>");
    assert_eq!(result.template.root_element().unwrap().tag, "div");
    let kinds: Vec<_> = result.warnings.iter().map(|w| w.kind.clone()).collect();
    assert_eq!(kinds, vec![WarningKind::MultipleRoots]);
}

#[test]
fn test_orphaned_else() {
    let result = parse(r#"<div><span></span><p v-else-if="x"></p></div>"#);
    let template = &result.template;
    assert_eq!(
        tags(template, &element_children(template, template.root.unwrap())),
        vec!["span"]
    );
    insta::assert_snapshot!(
        result.warnings[0].to_string(),
        @r#"v-else-if="x" used on element <p> without corresponding v-if."#
    );
}

#[test]
fn test_else_on_first_root() {
    let result = parse(r#"<div v-else></div>"#);
    assert_eq!(result.template.root_element().unwrap().tag, "div");
    insta::assert_snapshot!(
        result.warnings[0].to_string(),
        @r#"v-else="" used on element <div> without corresponding v-if."#
    );

    let result = parse(r#"<div v-else-if="x"></div>"#);
    let kinds: Vec<_> = result.warnings.iter().map(|w| w.kind.clone()).collect();
    assert!(matches!(kinds.as_slice(), [WarningKind::ElseWithoutIf { .. }]));
}

#[test]
fn test_top_level_else_without_conditional_root() {
    let result = parse(r#"<div></div><p v-else></p>"#);
    let root = result.template.root_element().unwrap();
    assert!(root.directives.if_conditions.is_empty());
    let kinds: Vec<_> = result.warnings.iter().map(|w| w.kind.clone()).collect();
    assert!(matches!(kinds.as_slice(), [WarningKind::ElseWithoutIf { .. }]));
}

#[test]
fn test_else_after_closed_chain() {
    let result = parse(r#"<div v-if="a"></div><p v-else></p><p v-else></p>"#);
    let root = result.template.root_element().unwrap();
    assert_eq!(root.directives.if_conditions.len(), 2);
    let kinds: Vec<_> = result.warnings.iter().map(|w| w.kind.clone()).collect();
    assert!(matches!(kinds.as_slice(), [WarningKind::ElseWithoutIf { .. }]));
}

#[test]
fn test_unstable_roots() {
    let messages = |source: &str| warning_messages(&parse(source).warnings);
    assert_eq!(
        messages("<template><div></div></template>"),
        vec!["Cannot use <template> as component root element because it may contain multiple nodes."]
    );
    assert_eq!(
        messages(r#"<div v-for="x in xs"></div>"#),
        vec!["Cannot use v-for as component root element because it may contain multiple nodes."]
    );
}

#[test]
fn test_binding_classification() {
    let result = parse(
        r#"<div><span :value.prop="x"></span><input type="checkbox" :value="y"><input type="button" :value="z"></div>"#,
    );
    assert!(result.warnings.is_empty());
    let template = &result.template;
    let children = element_children(template, template.root.unwrap());

    let binding = |name: &str, value: &str| Binding {
        name: name.to_string(),
        value: value.to_string(),
    };
    let span = template.element(children[0]);
    assert_eq!(span.directives.props, vec![binding("value", "x")]);

    let checkbox = template.element(children[1]);
    assert_eq!(checkbox.directives.props, vec![binding("value", "y")]);
    assert_eq!(checkbox.directives.attrs, vec![binding("type", "\"checkbox\"")]);

    let button = template.element(children[2]);
    assert!(button.directives.props.is_empty());
    assert_eq!(
        button.directives.attrs,
        vec![binding("type", "\"button\""), binding("value", "z")]
    );
}

#[test]
fn test_camel_binding_stays_an_attribute() {
    let result = parse(r#"<svg :view-box.camel="box"></svg>"#);
    assert!(result.warnings.is_empty());
    let root = result.template.root_element().unwrap();
    assert!(root.directives.props.is_empty());
    assert_eq!(
        root.directives.attrs,
        vec![Binding {
            name: "viewBox".to_string(),
            value: "box".to_string(),
        }]
    );
}

#[test]
fn test_whitespace_collapsing() {
    let source = "<div>\n  <span></span>   \n  <span></span>\n</div>";

    let result = parse(source);
    let root = result.template.root_element().unwrap();
    assert_eq!(root.children.len(), 2);
    assert!(root.children.iter().all(|node| matches!(node, Node::Element(_))));

    let options = ParseOptions {
        preserve_whitespace: true,
        ..Default::default()
    };
    let result = parse_with_options(source, &options);
    let root = result.template.root_element().unwrap();
    let shape: Vec<_> = root
        .children
        .iter()
        .map(|node| node.as_text().unwrap_or("<el>"))
        .collect();
    assert_eq!(shape, vec!["<el>", " ", "<el>"]);
}

#[test]
fn test_no_adjacent_spaces() {
    let options = ParseOptions {
        preserve_whitespace: true,
        ..Default::default()
    };
    let result = parse_with_options("<div><b></b> <!-- c --> <i></i></div>", &options);
    let root = result.template.root_element().unwrap();
    let spaces = root
        .children
        .windows(2)
        .filter(|pair| pair[0].as_text() == Some(" ") && pair[1].as_text() == Some(" "))
        .count();
    assert_eq!(spaces, 0);
}

#[test]
fn test_interpolation_and_entities() {
    let result = parse("<p>a &lt; b: {{ msg | upper }}</p>");
    let root = result.template.root_element().unwrap();
    match &root.children[0] {
        Node::Expression(text) => {
            assert_eq!(text.text, "a < b: {{ msg | upper }}");
            assert_eq!(text.expression, "\"a < b: \"+_s(_f(\"upper\")(msg))");
        }
        other => panic!("expected expression, got {other:?}"),
    }
}

#[test]
fn test_uppercase_script_is_not_decoded() {
    let result = parse("<div><SCRIPT>a &amp; b</SCRIPT></div>");
    let template = &result.template;
    let script = element_children(template, template.root.unwrap())[0];
    assert_eq!(
        template.element(script).children[0].as_text(),
        Some("a &amp; b")
    );
}

#[test]
fn test_ref_in_for_and_slots() {
    let result = parse(
        r#"<div><comp v-for="i in list" ref="item"><slot name="head"></slot><p slot="foot">f</p></comp></div>"#,
    );
    assert!(result.warnings.is_empty());
    let template = &result.template;
    let comp_id = element_children(template, template.root.unwrap())[0];
    let comp = template.element(comp_id);
    assert_eq!(comp.directives.ref_.as_deref(), Some("\"item\""));
    assert!(comp.directives.ref_in_for);

    let inner = element_children(template, comp_id);
    let slot = template.element(inner[0]);
    assert_eq!(slot.directives.slot_name.as_deref(), Some("\"head\""));
    let p = template.element(inner[1]);
    assert_eq!(p.directives.slot_target.as_deref(), Some("\"foot\""));
    assert_eq!(
        p.directives.attrs,
        vec![Binding {
            name: "slot".to_string(),
            value: "\"foot\"".to_string(),
        }]
    );
}

#[test]
fn test_dynamic_component() {
    let result = parse(r#"<component :is="view" inline-template v-once></component>"#);
    let root = result.template.root_element().unwrap();
    assert_eq!(root.directives.component.as_deref(), Some("view"));
    assert!(root.directives.is_inline_template);
    assert!(root.directives.is_once);
}

#[test]
fn test_model_on_loop_alias() {
    let result = parse(r#"<div v-if="ok"><p v-for="item in items"><input v-model="item"></p></div>"#);
    assert_eq!(result.warnings.len(), 1);
    assert!(matches!(
        &result.warnings[0].kind,
        WarningKind::ModelOnLoopAlias { tag, alias } if tag == "input" && alias == "item"
    ));
}

#[test]
fn test_keyed_template() {
    let result = parse(r#"<div><template v-if="a" key="k"><b></b></template></div>"#);
    assert_eq!(result.warnings[0].kind, WarningKind::KeyedTemplate);
}

#[test]
fn test_malformed_input_terminates() {
    let inputs = [
        "<div><p",
        "<div><span class=\"open",
        "<div><!-- never closed",
        "<div></",
        "<div><a href=></a>",
        "<",
        "<<<>>>",
        "<div><script>unterminated",
    ];
    for input in inputs {
        let result = parse(input);
        assert!(!result.warnings.is_empty(), "no warnings for {input:?}");
    }
}
