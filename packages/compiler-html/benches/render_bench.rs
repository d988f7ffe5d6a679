use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lessondoc_compiler_html::{compile_to_html, RenderOptions};
use lessondoc_validator::{normalize, ValidationOptions};
use serde_json::json;

fn render_lesson(c: &mut Criterion) {
    let paragraph = json!({"kind": "paragraph", "children": [
        {"kind": "text", "text": "Atrial fibrillation is the most common "},
        {"kind": "text", "text": "sustained arrhythmia", "marks": ["bold"]},
        {"kind": "text", "text": "; see "},
        {"kind": "text", "text": "guidelines", "marks": [
            {"kind": "link", "attributes": {"href": "https://example.org/af"}}
        ]}
    ]});
    let children: Vec<_> = (0..200).map(|_| paragraph.clone()).collect();
    let raw = json!({"kind": "doc", "children": children});

    let doc = normalize(&raw, &ValidationOptions::default()).unwrap();

    c.bench_function("render_lesson_html", |b| {
        b.iter(|| compile_to_html(black_box(&doc), RenderOptions::production()))
    });

    c.bench_function("normalize_lesson", |b| {
        b.iter(|| normalize(black_box(&raw), &ValidationOptions::default()))
    });
}

criterion_group!(benches, render_lesson);
criterion_main!(benches);
