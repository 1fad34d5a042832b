use super::*;
use std::collections::BTreeMap;

use crate::options::{parse_boolean, OptionValue, Validator};
use crate::render::js_literal;
use crate::transforms;
use crate::tree::{Annotation, NodeKind, Pending, Transition};

fn test_config() -> RenderConfig {
    RenderConfig {
        provision_assets: false,
        ..RenderConfig::default()
    }
}

fn convert_str(source: &str) -> String {
    convert(source, &DirectiveRegistry::standard(), &test_config())
        .expect("conversion should succeed")
}

fn parse_str(source: &str) -> DocTree {
    let registry = DirectiveRegistry::standard();
    Parser::new(&registry).parse(source)
}

#[test]
fn test_boolean_tokens() {
    assert_eq!(parse_boolean("yes"), Some(true));
    assert_eq!(parse_boolean("No"), Some(false));
    assert_eq!(parse_boolean("TRUE"), Some(true));
    assert_eq!(parse_boolean("0"), Some(false));
    assert_eq!(parse_boolean("maybe"), None);
}

#[test]
fn test_choice_validator() {
    let validator = Validator::Choice(&["fast", "slow"]);
    assert_eq!(
        validator.validate(Some("Fast")),
        Ok(OptionValue::Str("fast".to_string()))
    );
    assert!(validator.validate(Some("medium")).is_err());
}

#[test]
fn test_comma_list_validator() {
    let validator = Validator::CommaList;
    assert_eq!(
        validator.validate(Some("a.css, b.css,, ")),
        Ok(OptionValue::List(vec![
            "a.css".to_string(),
            "b.css".to_string()
        ]))
    );
}

#[test]
fn test_nonnegative_int_validator() {
    assert_eq!(
        Validator::NonNegativeInt.validate(Some("120")),
        Ok(OptionValue::Int(120))
    );
    assert!(Validator::NonNegativeInt.validate(Some("-3")).is_err());
    assert!(Validator::NonNegativeInt.validate(Some("x")).is_err());
}

#[test]
fn test_uri_validator_rejects_whitespace() {
    assert!(Validator::Uri.validate(Some("a b.css")).is_err());
    assert!(Validator::Uri.validate(Some("css/custom.css")).is_ok());
    assert!(Validator::Uri.validate(Some("https://example.com/x.css")).is_ok());
    assert!(Validator::Uri.validate(Some("http://bad host/")).is_err());
}

#[test]
fn test_js_literal_coercion() {
    assert_eq!(js_literal(&OptionValue::Bool(true)), "true");
    assert_eq!(js_literal(&OptionValue::Bool(false)), "false");
    assert_eq!(js_literal(&OptionValue::Int(120)), "120");
    assert_eq!(js_literal(&OptionValue::Str("120".to_string())), "120");
    assert_eq!(js_literal(&OptionValue::Str("0.2".to_string())), "0.2");
    assert_eq!(js_literal(&OptionValue::Str("slide".to_string())), "'slide'");
    assert_eq!(
        js_literal(&OptionValue::Str("it's".to_string())),
        r"'it\'s'"
    );
}

#[test]
fn test_merge_attribs_state_union() {
    let mut tree = DocTree::new();
    let section = tree.append_child(tree.root(), NodeKind::Section { level: 2 });
    let mut first = BTreeMap::new();
    first.insert("data-state".to_string(), "a b".to_string());
    tree.merge_attribs(section, first);
    let mut second = BTreeMap::new();
    second.insert("data-state".to_string(), "b c".to_string());
    tree.merge_attribs(section, second);
    let attribs = tree.node(section).attribs.as_ref().unwrap();
    assert_eq!(attribs.get("data-state").unwrap(), "a b c");
}

#[test]
fn test_merge_attribs_scalar_overwrite() {
    let mut tree = DocTree::new();
    let section = tree.append_child(tree.root(), NodeKind::Section { level: 2 });
    let mut first = BTreeMap::new();
    first.insert("data-transition".to_string(), "fade".to_string());
    tree.merge_attribs(section, first);
    let mut second = BTreeMap::new();
    second.insert("data-transition".to_string(), "zoom".to_string());
    tree.merge_attribs(section, second);
    let attribs = tree.node(section).attribs.as_ref().unwrap();
    assert_eq!(attribs.get("data-transition").unwrap(), "zoom");
}

fn pending_transition(tree: &mut DocTree, parent: NodeId) -> NodeId {
    tree.append_child(
        parent,
        NodeKind::Pending(Pending {
            annotation: Annotation::Transition(Transition {
                style: "fade".to_string(),
                speed: None,
            }),
            line: 1,
            raw: ".. transition:: fade".to_string(),
        }),
    )
}

#[test]
fn test_next_section_ascends_to_following_sibling() {
    // Section A with nested A.1, then sibling B: a placeholder inside A.1
    // must find B, not anything inside A.
    let mut tree = DocTree::new();
    let a = tree.append_child(tree.root(), NodeKind::Section { level: 2 });
    let a1 = tree.append_child(a, NodeKind::Section { level: 3 });
    let pending = pending_transition(&mut tree, a1);
    let b = tree.append_child(tree.root(), NodeKind::Section { level: 2 });
    assert_eq!(tree.next_section_after(pending), Some(b));
}

#[test]
fn test_next_section_prefers_nearest_level() {
    let mut tree = DocTree::new();
    let a = tree.append_child(tree.root(), NodeKind::Section { level: 2 });
    let pending = pending_transition(&mut tree, a);
    let a1 = tree.append_child(a, NodeKind::Section { level: 3 });
    let _b = tree.append_child(tree.root(), NodeKind::Section { level: 2 });
    assert_eq!(tree.next_section_after(pending), Some(a1));
}

#[test]
fn test_next_section_fails_in_last_section() {
    let mut tree = DocTree::new();
    let _a = tree.append_child(tree.root(), NodeKind::Section { level: 2 });
    let b = tree.append_child(tree.root(), NodeKind::Section { level: 2 });
    let pending = pending_transition(&mut tree, b);
    assert_eq!(tree.next_section_after(pending), None);
}

#[test]
fn test_transition_failure_leaves_error_marker() {
    let mut tree = parse_str("## Only slide\n\n.. transition:: fade\n");
    transforms::apply(&mut tree);
    let marker = tree
        .descendants(tree.root())
        .into_iter()
        .any(|id| matches!(tree.node(id).kind, NodeKind::SystemMessage { .. }));
    assert!(marker, "expected an inline error marker");
    assert!(tree.pending_ids().is_empty());
}

#[test]
fn test_title_promotion() {
    let mut tree = parse_str("# Deck\n\n## One\n\ncontent\n\n## Two\n");
    transforms::apply(&mut tree);
    assert_eq!(tree.doc_title_text(), Some("Deck"));
    let sections = tree
        .children(tree.root())
        .iter()
        .filter(|&&id| tree.is_section(id))
        .count();
    assert_eq!(sections, 2);
}

#[test]
fn test_subtitle_promotion() {
    let html = convert_str("# Deck\n\n## The subtitle\n\n## One\n\ncontent\n");
    assert!(html.contains("<h1>Deck</h1>"));
    assert!(html.contains("<h3 class=\"subtitle\">The subtitle</h3>"));
}

#[test]
fn test_no_title_keeps_sections_flat() {
    let mut tree = parse_str("## One\n\n## Two\n");
    transforms::apply(&mut tree);
    assert_eq!(tree.doc_title_text(), None);
    assert!(tree.has_sections());
}

#[test]
fn test_unknown_directive_becomes_error_marker() {
    let tree = parse_str("## Slide\n\n.. frobnicate:: now\n");
    let marker = tree
        .descendants(tree.root())
        .into_iter()
        .any(|id| matches!(tree.node(id).kind, NodeKind::SystemMessage { .. }));
    assert!(marker);
}

#[test]
fn test_comment_lines_are_dropped() {
    let html = convert_str("## Slide\n\n.. this is just a comment\n\nreal text\n");
    assert!(!html.contains("just a comment"));
    assert!(html.contains("<p>real text</p>"));
}

#[test]
fn test_fenced_code_shields_structure() {
    let html = convert_str("## Slide\n\n```\n## not a heading\n.. transition:: fade\n```\n");
    assert!(html.contains("<code>## not a heading"));
    assert!(!html.contains("data-transition"));
    // Only the one real slide heading.
    assert_eq!(html.matches("<h2>").count(), 1);
}

#[test]
fn test_background_color_annotates_slide() {
    let html = convert_str("## Slide\n\n.. background:: #112233\n\ntext\n");
    assert!(html.contains("<section data-background-color=\"#112233\">"));
}

#[test]
fn test_background_image_options() {
    let html = convert_str(
        "## Slide\n\n.. background:: img/cover.png\n   :size: Contain\n   :repeat: yes\n",
    );
    assert!(html.contains("data-background-image=\"img/cover.png\""));
    assert!(html.contains("data-background-size=\"contain\""));
    assert!(html.contains("data-background-repeat=\"repeat\""));
}

#[test]
fn test_background_color_rejects_options() {
    let html = convert_str("## Slide\n\n.. background:: red\n   :size: cover\n");
    assert!(html.contains("ERROR:"));
    assert!(!html.contains("data-background-color"));
}

#[test]
fn test_reveal_state_classes_merge() {
    let html = convert_str(
        "## Slide\n\n.. reveal-state:: fancy special\n\n.. reveal-state:: special extra\n   :timing: 120\n",
    );
    assert!(html.contains("data-state=\"fancy special extra\""));
    assert!(html.contains("data-timing=\"120\""));
}

#[test]
fn test_video_directive_emits_embed() {
    let html = convert_str(
        "## Slide\n\n.. video:: http://example.com/clip.mp4\n   :align: right\n   :loop:\n",
    );
    assert!(html.contains("<source src=\"http://example.com/clip.mp4\" type=\"video/mp4\">"));
    assert!(html.contains("align-right"));
    assert!(html.contains(" loop"));
    assert!(html.contains(" controls"));
}

#[test]
fn test_video_directive_rejects_unknown_codec() {
    let html = convert_str("## Slide\n\n.. video:: http://example.com/clip.avi\n");
    assert!(html.contains("ERROR:"));
    assert!(!html.contains("<video"));
}

#[test]
fn test_reveal_options_in_init_script() {
    let html = convert_str(
        "## Slide\n\n.. reveal::\n   :width: 1280\n   :margin: 0.2\n   :loop: yes\n   :transition: fade\n",
    );
    assert!(html.contains("        width: 1280,\n"));
    assert!(html.contains("        margin: 0.2,\n"));
    assert!(html.contains("        loop: true,\n"));
    assert!(html.contains("        transition: 'fade',\n"));
}

#[test]
fn test_reveal_theme_and_style_selection() {
    let html = convert_str(
        "## Slide\n\n.. reveal::\n   :theme: night\n   :highlightStyle: zenburn\n",
    );
    assert!(html.contains("/css/theme/night.css"));
    assert!(html.contains("/hljs/zenburn.css"));
}

#[test]
fn test_titlepage_docinfo_block() {
    let html = convert_str(
        "# Deck\n\n.. titlepage::\n   :author: Ada\n   :date: April 1, 2018\n\n## One\n",
    );
    assert!(html.contains("<p class=\"authors\">Ada</p>"));
    assert!(html.contains("<p class=\"date\">April 1, 2018</p>"));
}

#[test]
fn test_aside_renders_speaker_notes() {
    let html = convert_str("## Slide\n\n.. aside::\n\n   Remember the demo.\n");
    assert!(html.contains("<aside class=\"notes\">"));
    assert!(html.contains("<p>Remember the demo.</p>"));
}

#[test]
fn test_math_dependency_only_when_used() {
    let plain = convert_str("## Slide\n\nno math here\n");
    assert!(!plain.contains("plugin/math/math.js"));
    let mathy = convert_str("## Slide\n\nEuler: $$e^{i\\pi}+1=0$$\n");
    assert!(mathy.contains("plugin/math/math.js"));
    assert!(mathy.contains("math: {"));
}

#[test]
fn test_empty_document_is_fatal() {
    let result = convert("just a paragraph\n", &DirectiveRegistry::standard(), &test_config());
    assert!(matches!(result, Err(SlidesError::DocumentError(_))));
}

#[test]
fn test_vertical_slides_nest_sections() {
    let html = convert_str("## Top\n\ntext\n\n### Sub\n\nmore\n");
    // Outer wrapper, inner section for the slide's own content, then the
    // vertical sub-slide.
    assert!(html.contains("<section>\n<section>"));
    assert!(html.contains("<h2>Top</h2>"));
    assert!(html.contains("<h2>Sub</h2>"));
}
