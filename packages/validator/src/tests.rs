use crate::{
    normalize, normalize_with_report, parse_document, renormalize, DiagnosticLevel,
    ValidationError, ValidationOptions,
};
use lessondoc_document::{AttrValue, Document, Mark, MarkKind, Node, NodeKind, NodePath};
use serde_json::{json, Value};

fn lesson() -> Value {
    json!({
        "kind": "doc",
        "children": [
            {"kind": "heading", "attributes": {"level": 2},
             "children": [{"kind": "text", "text": "Intro"}]},
            {"kind": "paragraph",
             "children": [{"kind": "text", "text": "Hello", "marks": ["bold"]}]}
        ]
    })
}

#[test]
fn test_normalize_simple_lesson() {
    let doc = normalize(&lesson(), &ValidationOptions::strict()).expect("valid lesson");

    assert_eq!(
        doc,
        Document::new(vec![
            Node::heading(2, vec![Node::text("Intro")]),
            Node::paragraph(vec![Node::text("Hello").with_mark(Mark::new(MarkKind::Bold))]),
        ])
    );
}

#[test]
fn test_null_and_empty_input_yield_empty_document() {
    let options = ValidationOptions::default();

    assert!(normalize(&Value::Null, &options).unwrap().is_empty());
    assert!(parse_document("", &options).unwrap().is_empty());
    assert!(parse_document("   \n", &options).unwrap().is_empty());
    assert!(parse_document("null", &options).unwrap().is_empty());
    assert!(normalize(&json!({"kind": "doc"}), &options).unwrap().is_empty());
}

#[test]
fn test_malformed_json() {
    let err = parse_document("{\"kind\": ", &ValidationOptions::default()).unwrap_err();
    assert!(matches!(err, ValidationError::MalformedJson(_)));
}

#[test]
fn test_unknown_kind_fails_in_both_modes() {
    let raw = json!({"kind": "doc", "children": [{"kind": "iframe"}]});

    for options in [ValidationOptions::strict(), ValidationOptions::lenient()] {
        let err = normalize(&raw, &options).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownNodeKind {
                kind: "iframe".to_string(),
                path: NodePath::from(vec![0]),
            }
        );
    }
}

#[test]
fn test_invalid_root() {
    let raw = json!({"kind": "paragraph"});
    let err = normalize(&raw, &ValidationOptions::default()).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidRoot { .. }));

    let err = normalize(&json!([1, 2]), &ValidationOptions::default()).unwrap_err();
    assert!(matches!(err, ValidationError::MalformedNode { .. }));
}

#[test]
fn test_table_row_under_doc_strict() {
    let raw = json!({"kind": "doc", "children": [
        {"kind": "paragraph", "children": [{"kind": "text", "text": "before"}]},
        {"kind": "table_row", "children": []}
    ]});

    let err = normalize(&raw, &ValidationOptions::strict()).unwrap_err();
    assert_eq!(
        err,
        ValidationError::InvalidNesting {
            parent: NodeKind::Doc,
            child: NodeKind::TableRow,
            path: NodePath::from(vec![1]),
        }
    );
    assert_eq!(err.code(), "invalid-nesting");
}

#[test]
fn test_table_row_under_doc_lenient() {
    let raw = json!({"kind": "doc", "children": [
        {"kind": "paragraph", "children": [{"kind": "text", "text": "before"}]},
        {"kind": "table_row", "children": []}
    ]});

    let report = normalize_with_report(&raw, &ValidationOptions::lenient()).unwrap();
    assert_eq!(report.document.children.len(), 1);
    assert_eq!(report.document.children[0].kind, NodeKind::Paragraph);
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].rule, "dropped-node");
    assert_eq!(report.diagnostics[0].level, DiagnosticLevel::Warning);
    assert_eq!(report.diagnostics[0].path, NodePath::from(vec![1]));
}

#[test]
fn test_javascript_urls_rejected_in_both_modes() {
    let payloads = [
        "javascript:alert(1)",
        "JAVASCRIPT:alert(1)",
        " javascript:alert(document.cookie)",
        "jav\u{0009}ascript:alert(1)",
    ];

    for payload in payloads {
        let image = json!({"kind": "doc", "children": [
            {"kind": "image", "attributes": {"src": payload}}
        ]});
        let link = json!({"kind": "doc", "children": [
            {"kind": "paragraph", "children": [
                {"kind": "text", "text": "click",
                 "marks": [{"kind": "link", "attributes": {"href": payload}}]}
            ]}
        ]});

        for options in [ValidationOptions::strict(), ValidationOptions::lenient()] {
            for raw in [&image, &link] {
                let err = normalize(raw, &options).unwrap_err();
                assert!(
                    matches!(err, ValidationError::UnsafeAttribute { .. }),
                    "{:?} was not rejected: {:?}",
                    payload,
                    err
                );
            }
        }
    }
}

#[test]
fn test_unsafe_url_inside_dropped_subtree_never_survives() {
    // The bad image sits under a misplaced table_row, which lenient mode drops.
    let raw = json!({"kind": "doc", "children": [
        {"kind": "table_row", "children": [
            {"kind": "table_cell", "children": [
                {"kind": "image", "attributes": {"src": "javascript:alert(1)"}}
            ]}
        ]}
    ]});

    let doc = normalize(&raw, &ValidationOptions::lenient()).unwrap();
    assert!(doc.is_empty());
}

#[test]
fn test_data_urls_allowed_only_for_images() {
    let image = json!({"kind": "doc", "children": [
        {"kind": "image", "attributes": {"src": "data:image/png;base64,iVBORw0KGgo="}}
    ]});
    assert!(normalize(&image, &ValidationOptions::strict()).is_ok());

    let video = json!({"kind": "doc", "children": [
        {"kind": "video", "attributes": {"src": "data:image/png;base64,iVBORw0KGgo="}}
    ]});
    assert!(matches!(
        normalize(&video, &ValidationOptions::strict()),
        Err(ValidationError::UnsafeAttribute { .. })
    ));
}

#[test]
fn test_marks_on_structural_nodes() {
    let raw = json!({"kind": "doc", "children": [
        {"kind": "paragraph", "marks": ["bold"],
         "children": [{"kind": "text", "text": "x"}]}
    ]});

    let err = normalize(&raw, &ValidationOptions::strict()).unwrap_err();
    assert_eq!(
        err,
        ValidationError::InvalidMark {
            kind: NodeKind::Paragraph,
            path: NodePath::from(vec![0]),
        }
    );

    let report = normalize_with_report(&raw, &ValidationOptions::lenient()).unwrap();
    assert!(report.document.children[0].marks.is_empty());
    assert_eq!(report.diagnostics[0].rule, "stripped-marks");
}

#[test]
fn test_unknown_mark_fails() {
    let raw = json!({"kind": "doc", "children": [
        {"kind": "paragraph", "children": [
            {"kind": "text", "text": "x", "marks": ["blink"]}
        ]}
    ]});

    let err = normalize(&raw, &ValidationOptions::lenient()).unwrap_err();
    assert!(matches!(err, ValidationError::UnknownMark { ref mark, .. } if mark == "blink"));
}

#[test]
fn test_marks_sorted_and_deduplicated() {
    let raw = json!({"kind": "doc", "children": [
        {"kind": "paragraph", "children": [
            {"kind": "text", "text": "x", "marks": [
                "code", "italic", "bold", "italic",
                {"kind": "link", "attributes": {"href": "https://example.org"}}
            ]}
        ]}
    ]});

    let doc = normalize(&raw, &ValidationOptions::lenient()).unwrap();
    let kinds: Vec<_> = doc.children[0].children[0]
        .marks
        .iter()
        .map(|m| m.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![MarkKind::Link, MarkKind::Bold, MarkKind::Italic, MarkKind::Code]
    );
}

#[test]
fn test_attribute_whitelist() {
    let raw = json!({"kind": "doc", "children": [
        {"kind": "heading", "attributes": {"level": 3, "onclick": "alert(1)"},
         "children": [{"kind": "text", "text": "T"}]}
    ]});

    let err = normalize(&raw, &ValidationOptions::strict()).unwrap_err();
    assert!(matches!(err, ValidationError::UnknownAttribute { ref attribute, .. } if attribute == "onclick"));

    let doc = normalize(&raw, &ValidationOptions::lenient()).unwrap();
    let heading = &doc.children[0];
    assert_eq!(heading.attributes.len(), 1);
    assert_eq!(heading.attr("level"), Some(&AttrValue::Integer(3)));
}

#[test]
fn test_invalid_attribute_falls_back_to_default() {
    let raw = json!({"kind": "doc", "children": [
        {"kind": "heading", "attributes": {"level": 9},
         "children": [{"kind": "text", "text": "T"}]}
    ]});

    assert!(matches!(
        normalize(&raw, &ValidationOptions::strict()),
        Err(ValidationError::InvalidAttribute { .. })
    ));

    let doc = normalize(&raw, &ValidationOptions::lenient()).unwrap();
    assert_eq!(doc.children[0].attr("level"), Some(&AttrValue::Integer(1)));
}

#[test]
fn test_defaults_are_filled() {
    let raw = json!({"kind": "doc", "children": [
        {"kind": "ordered_list", "children": [
            {"kind": "list_item", "children": [
                {"kind": "paragraph", "children": [{"kind": "text", "text": "one"}]}
            ]}
        ]}
    ]});

    let doc = normalize(&raw, &ValidationOptions::strict()).unwrap();
    assert_eq!(doc.children[0].attr("start"), Some(&AttrValue::Integer(1)));
}

#[test]
fn test_missing_required_attribute() {
    let raw = json!({"kind": "doc", "children": [
        {"kind": "image", "attributes": {"alt": "no source"}},
        {"kind": "paragraph", "children": [{"kind": "text", "text": "kept"}]}
    ]});

    let err = normalize(&raw, &ValidationOptions::strict()).unwrap_err();
    assert!(matches!(err, ValidationError::MissingAttribute { ref attribute, .. } if attribute == "src"));

    let doc = normalize(&raw, &ValidationOptions::lenient()).unwrap();
    assert_eq!(doc.children.len(), 1);
    assert_eq!(doc.children[0].kind, NodeKind::Paragraph);
}

#[test]
fn test_link_without_href_is_dropped_leniently() {
    let raw = json!({"kind": "doc", "children": [
        {"kind": "paragraph", "children": [
            {"kind": "text", "text": "x", "marks": [{"kind": "link"}, "bold"]}
        ]}
    ]});

    let doc = normalize(&raw, &ValidationOptions::lenient()).unwrap();
    let text = &doc.children[0].children[0];
    assert_eq!(text.marks, vec![Mark::new(MarkKind::Bold)]);
}

#[test]
fn test_empty_text_removed_and_adjacent_text_merged() {
    let raw = json!({"kind": "doc", "children": [
        {"kind": "paragraph", "children": [
            {"kind": "text", "text": "Hel"},
            {"kind": "text", "text": ""},
            {"kind": "text", "text": "lo"}
        ]}
    ]});

    let doc = normalize(&raw, &ValidationOptions::strict()).unwrap();
    assert_eq!(doc.children[0].children, vec![Node::text("Hello")]);
}

#[test]
fn test_editor_library_aliases() {
    let raw = json!({"type": "doc", "content": [
        {"type": "bulletList", "content": [
            {"type": "listItem", "content": [
                {"type": "paragraph", "content": [
                    {"type": "text", "text": "dose", "marks": [{"type": "bold"}]}
                ]}
            ]}
        ]},
        {"type": "image", "attrs": {"src": "https://cdn.example.org/x.png", "alt": null, "title": null}}
    ]});

    let doc = normalize(&raw, &ValidationOptions::strict()).unwrap();
    assert_eq!(doc.children[0].kind, NodeKind::BulletList);
    assert_eq!(doc.children[0].children[0].kind, NodeKind::ListItem);
    assert_eq!(doc.children[1].attributes.len(), 1);
}

#[test]
fn test_depth_limit() {
    let mut raw = json!({"kind": "paragraph", "children": [{"kind": "text", "text": "deep"}]});
    for _ in 0..10 {
        raw = json!({"kind": "blockquote", "children": [raw]});
    }
    let raw = json!({"kind": "doc", "children": [raw]});

    assert!(normalize(&raw, &ValidationOptions::strict()).is_ok());

    let err = normalize(&raw, &ValidationOptions::strict().with_max_depth(5)).unwrap_err();
    assert!(matches!(err, ValidationError::TooDeep { max_depth: 5, .. }));
}

#[test]
fn test_normalization_is_idempotent() {
    let raw = json!({"kind": "doc", "children": [
        {"kind": "heading", "children": [{"kind": "text", "text": "Anatomy"}]},
        {"kind": "paragraph", "children": [
            {"kind": "text", "text": "See ", "marks": ["italic"]},
            {"kind": "text", "text": "atlas", "marks": [
                "bold", {"kind": "link", "attributes": {"href": "https://example.org", "target": "_blank"}}
            ]},
            {"kind": "hard_break"},
            {"kind": "text", "text": "p. 12"}
        ]},
        {"kind": "table", "children": [
            {"kind": "table_row", "children": [
                {"kind": "table_header", "children": [
                    {"kind": "paragraph", "children": [{"kind": "text", "text": "Drug"}]}
                ]},
                {"kind": "table_header", "attributes": {"colspan": 2}, "children": [
                    {"kind": "paragraph", "children": [{"kind": "text", "text": "Dose"}]}
                ]}
            ]}
        ]},
        {"kind": "code_block", "attributes": {"language": "rust"},
         "children": [{"kind": "text", "text": "fn main() {}"}]},
        {"kind": "image", "attributes": {"src": "/media/heart.png", "alt": "Heart", "width": 640}}
    ]});

    for options in [ValidationOptions::strict(), ValidationOptions::lenient()] {
        let once = normalize(&raw, &options).unwrap();
        let serialized = once.to_value().unwrap();
        let twice = normalize(&serialized, &options).unwrap();
        assert_eq!(once, twice);

        assert_eq!(renormalize(&once, &options).unwrap(), once);
    }
}
