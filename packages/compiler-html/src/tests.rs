use crate::{compile_to_html, to_html, RenderError, RenderOptions};
use lessondoc_document::{Document, Mark, MarkKind, Node, NodeKind, NodePath};
use lessondoc_validator::{normalize, ValidationOptions};
use serde_json::{json, Value};

fn render(raw: Value) -> String {
    let document = normalize(&raw, &ValidationOptions::strict()).expect("Failed to validate");
    compile_to_html(&document, RenderOptions::default()).expect("Failed to render")
}

#[test]
fn test_render_heading_and_bold_paragraph() {
    let html = render(json!({"kind": "doc", "children": [
        {"kind": "heading", "attributes": {"level": 2},
         "children": [{"kind": "text", "text": "Intro"}]},
        {"kind": "paragraph",
         "children": [{"kind": "text", "text": "Hello", "marks": ["bold"]}]}
    ]}));

    assert_eq!(html, "<h2>Intro</h2><p><strong>Hello</strong></p>");
}

#[test]
fn test_render_empty_document() {
    assert_eq!(to_html(&Document::empty()), "");
}

#[test]
fn test_marks_nest_in_canonical_order() {
    // Input order is scrambled on purpose.
    let html = render(json!({"kind": "doc", "children": [
        {"kind": "paragraph", "children": [
            {"kind": "text", "text": "dose", "marks": [
                "code", "italic", "strike", "underline", "bold",
                {"kind": "link", "attributes": {"href": "https://example.org/dose"}}
            ]}
        ]}
    ]}));

    assert_eq!(
        html,
        "<p><a href=\"https://example.org/dose\"><strong><em><u><s><code>dose\
         </code></s></u></em></strong></a></p>"
    );
}

#[test]
fn test_link_target_blank_adds_rel() {
    let html = render(json!({"kind": "doc", "children": [
        {"kind": "paragraph", "children": [
            {"kind": "text", "text": "guideline", "marks": [
                {"kind": "link", "attributes": {"href": "https://example.org", "target": "_blank"}}
            ]}
        ]}
    ]}));

    assert!(html.contains(
        "<a href=\"https://example.org\" target=\"_blank\" rel=\"noopener noreferrer nofollow\">"
    ));
}

#[test]
fn test_render_lists() {
    let html = render(json!({"kind": "doc", "children": [
        {"kind": "bullet_list", "children": [
            {"kind": "list_item", "children": [
                {"kind": "paragraph", "children": [{"kind": "text", "text": "one"}]}
            ]}
        ]},
        {"kind": "ordered_list", "attributes": {"start": 3}, "children": [
            {"kind": "list_item", "children": [
                {"kind": "paragraph", "children": [{"kind": "text", "text": "three"}]}
            ]}
        ]}
    ]}));

    assert_eq!(
        html,
        "<ul><li><p>one</p></li></ul><ol start=\"3\"><li><p>three</p></li></ol>"
    );
}

#[test]
fn test_render_table_preserves_order() {
    let cell = |kind: &str, text: &str| {
        json!({"kind": kind, "children": [
            {"kind": "paragraph", "children": [{"kind": "text", "text": text}]}
        ]})
    };
    let html = render(json!({"kind": "doc", "children": [
        {"kind": "table", "children": [
            {"kind": "table_row", "children": [cell("table_header", "Drug"), cell("table_header", "Dose")]},
            {"kind": "table_row", "children": [
                cell("table_cell", "Aspirin"),
                {"kind": "table_cell", "attributes": {"colspan": 2}, "children": [
                    {"kind": "paragraph", "children": [{"kind": "text", "text": "75 mg"}]}
                ]}
            ]}
        ]}
    ]}));

    assert_eq!(
        html,
        "<table>\
         <tr><th><p>Drug</p></th><th><p>Dose</p></th></tr>\
         <tr><td><p>Aspirin</p></td><td colspan=\"2\"><p>75 mg</p></td></tr>\
         </table>"
    );
}

#[test]
fn test_render_media_and_rules() {
    let html = render(json!({"kind": "doc", "children": [
        {"kind": "image", "attributes": {"src": "https://cdn.example.org/ecg.png", "alt": "ECG", "width": 640}},
        {"kind": "horizontal_rule"},
        {"kind": "video", "attributes": {"src": "https://cdn.example.org/echo.mp4"}}
    ]}));

    assert_eq!(
        html,
        "<img src=\"https://cdn.example.org/ecg.png\" alt=\"ECG\" width=\"640\">\
         <hr>\
         <video src=\"https://cdn.example.org/echo.mp4\" controls></video>"
    );
}

#[test]
fn test_render_code_block() {
    let html = render(json!({"kind": "doc", "children": [
        {"kind": "code_block", "attributes": {"language": "python"},
         "children": [{"kind": "text", "text": "if a < b:\n    pass"}]}
    ]}));

    assert_eq!(
        html,
        "<pre><code class=\"language-python\">if a &lt; b:\n    pass</code></pre>"
    );
}

#[test]
fn test_hard_break() {
    let html = render(json!({"kind": "doc", "children": [
        {"kind": "paragraph", "children": [
            {"kind": "text", "text": "line one"},
            {"kind": "hard_break"},
            {"kind": "text", "text": "line two"}
        ]}
    ]}));

    assert_eq!(html, "<p>line one<br>line two</p>");
}

#[test]
fn test_escape_html_entities() {
    let html = render(json!({"kind": "doc", "children": [
        {"kind": "paragraph", "children": [{"kind": "text", "text": "Hello <script> & \"friends\""}]},
        {"kind": "image", "attributes": {"src": "/a.png", "alt": "\"><script>alert(1)</script>"}}
    ]}));

    assert!(html.contains("Hello &lt;script&gt; &amp; &quot;friends&quot;"));
    assert!(!html.contains("<script>"));
    assert!(html.contains("alt=\"&quot;&gt;&lt;script&gt;"));
}

#[test]
fn test_render_is_deterministic() {
    let document = normalize(
        &json!({"kind": "doc", "children": [
            {"kind": "heading", "attributes": {"level": 1}, "children": [{"kind": "text", "text": "Renal"}]},
            {"kind": "paragraph", "children": [
                {"kind": "text", "text": "GFR", "marks": ["italic", "bold"]}
            ]}
        ]}),
        &ValidationOptions::default(),
    )
    .unwrap();

    let first = compile_to_html(&document, RenderOptions::default()).unwrap();
    let second = compile_to_html(&document, RenderOptions::default()).unwrap();
    assert_eq!(first.as_bytes(), second.as_bytes());
}

#[test]
fn test_pretty_print() {
    let html = {
        let document = normalize(
            &json!({"kind": "doc", "children": [
                {"kind": "heading", "attributes": {"level": 2}, "children": [{"kind": "text", "text": "Intro"}]},
                {"kind": "bullet_list", "children": [
                    {"kind": "list_item", "children": [
                        {"kind": "paragraph", "children": [{"kind": "text", "text": "a"}]}
                    ]}
                ]}
            ]}),
            &ValidationOptions::default(),
        )
        .unwrap();
        let options = RenderOptions {
            pretty: true,
            ..Default::default()
        };
        compile_to_html(&document, options).unwrap()
    };

    assert_eq!(
        html,
        "<h2>Intro</h2>\n<ul>\n  <li>\n    <p>a</p>\n  </li>\n</ul>\n"
    );
}

#[test]
fn test_without_pretty_print_is_compact() {
    let document = Document::new(vec![Node::paragraph(vec![Node::text("x")])]);
    let html = compile_to_html(&document, RenderOptions::default()).unwrap();
    assert!(!html.contains('\n'));
}

fn drifted_document() -> Document {
    // Hand-built, never validated: a table row directly under the root.
    Document::new(vec![
        Node::paragraph(vec![Node::text("ok").with_mark(Mark::new(MarkKind::Italic))]),
        Node::new(NodeKind::TableRow).with_children(vec![Node::new(NodeKind::TableCell)
            .with_children(vec![Node::paragraph(vec![Node::text("stray")])])]),
    ])
}

#[test]
fn test_unreachable_kind_is_fatal_with_strict_invariants() {
    let options = RenderOptions {
        strict_invariants: true,
        ..Default::default()
    };

    let err = compile_to_html(&drifted_document(), options).unwrap_err();
    assert_eq!(
        err,
        RenderError::UnreachableNodeKind {
            kind: NodeKind::TableRow,
            parent: NodeKind::Doc,
            path: NodePath::from(vec![1]),
        }
    );
}

#[test]
fn test_unreachable_kind_is_skipped_in_production() {
    let html = compile_to_html(&drifted_document(), RenderOptions::production()).unwrap();
    assert_eq!(html, "<p><em>ok</em></p>stray");
    assert_eq!(to_html(&drifted_document()), html);
}

fn unsafe_url_document() -> Document {
    // Hand-built: URLs never went through the validator
    Document::new(vec![
        Node::paragraph(vec![Node::text("click").with_mark(Mark::link("javascript:steal()"))]),
        Node::new(NodeKind::Image).with_attr("src", " JaVaScRiPt:alert(1)"),
        Node::new(NodeKind::Image).with_attr("src", "/media/ecg.png"),
    ])
}

#[test]
fn test_unsafe_url_is_fatal_with_strict_invariants() {
    let options = RenderOptions {
        strict_invariants: true,
        ..Default::default()
    };

    let err = compile_to_html(&unsafe_url_document(), options).unwrap_err();
    assert!(matches!(
        err,
        RenderError::UnsafeUrl { attribute: "href", ref path, .. } if *path == NodePath::from(vec![0, 0])
    ));
}

#[test]
fn test_unsafe_url_is_dropped_in_production() {
    let html = to_html(&unsafe_url_document());

    assert_eq!(
        html,
        "<p><a>click</a></p><img><img src=\"/media/ecg.png\">"
    );
    assert!(!html.to_ascii_lowercase().contains("javascript"));
}
