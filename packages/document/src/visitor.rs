use crate::model::{Document, Mark, Node, NodeKind};

/// Visitor pattern for traversing documents immutably
///
/// Default implementations walk the entire tree depth-first, parent before
/// children. Override specific visit_* methods to act on nodes.
pub trait Visitor: Sized {
    fn visit_document(&mut self, doc: &Document) {
        walk_document(self, doc);
    }

    fn visit_node(&mut self, node: &Node) {
        walk_node(self, node);
    }

    fn visit_text(&mut self, _text: &str, _marks: &[Mark]) {
        // Leaf, nothing to walk
    }

    fn visit_mark(&mut self, _mark: &Mark) {
        // Leaf, nothing to walk
    }
}

pub fn walk_document<V: Visitor>(visitor: &mut V, doc: &Document) {
    for child in &doc.children {
        visitor.visit_node(child);
    }
}

pub fn walk_node<V: Visitor>(visitor: &mut V, node: &Node) {
    for mark in &node.marks {
        visitor.visit_mark(mark);
    }
    if let Some(text) = &node.text {
        visitor.visit_text(text, &node.marks);
    }
    for child in &node.children {
        visitor.visit_node(child);
    }
}

/// Collects readable text, one line per textblock
struct PlainText {
    lines: Vec<String>,
    current: String,
}

impl PlainText {
    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.lines.push(std::mem::take(&mut self.current));
        }
    }
}

impl Visitor for PlainText {
    fn visit_node(&mut self, node: &Node) {
        match node.kind {
            NodeKind::HardBreak => self.current.push('\n'),
            NodeKind::Image => {
                if let Some(alt) = node.attr("alt").and_then(|v| v.as_str()) {
                    self.flush();
                    self.current.push_str(alt);
                    self.flush();
                }
            }
            NodeKind::Paragraph | NodeKind::Heading | NodeKind::CodeBlock => {
                self.flush();
                walk_node(self, node);
                self.flush();
            }
            _ => walk_node(self, node),
        }
    }

    fn visit_text(&mut self, text: &str, _marks: &[Mark]) {
        self.current.push_str(text);
    }
}

/// Collects URLs of externally hosted media and link targets
struct References {
    media: Vec<String>,
    links: Vec<String>,
}

impl Visitor for References {
    fn visit_node(&mut self, node: &Node) {
        if matches!(node.kind, NodeKind::Image | NodeKind::Video) {
            if let Some(src) = node.attr("src").and_then(|v| v.as_str()) {
                self.media.push(src.to_string());
            }
        }
        walk_node(self, node);
    }

    fn visit_mark(&mut self, mark: &Mark) {
        if let Some(href) = mark.attr("href").and_then(|v| v.as_str()) {
            if !self.links.iter().any(|seen| seen == href) {
                self.links.push(href.to_string());
            }
        }
    }
}

impl Document {
    /// Readable text of the whole document, textblocks separated by newlines
    pub fn plain_text(&self) -> String {
        let mut collector = PlainText {
            lines: Vec::new(),
            current: String::new(),
        };
        collector.visit_document(self);
        collector.flush();
        collector.lines.join("\n")
    }

    /// `src` of every image and video, in document order
    pub fn media_sources(&self) -> Vec<String> {
        self.references().media
    }

    /// Distinct link targets, in order of first appearance
    pub fn link_targets(&self) -> Vec<String> {
        self.references().links
    }

    fn references(&self) -> References {
        let mut refs = References {
            media: Vec::new(),
            links: Vec::new(),
        };
        refs.visit_document(self);
        refs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MarkKind;

    fn sample() -> Document {
        Document::new(vec![
            Node::heading(1, vec![Node::text("Cardiology")]),
            Node::paragraph(vec![
                Node::text("See "),
                Node::text("guidelines").with_mark(Mark::link("https://example.org/esc")),
                Node::new(NodeKind::HardBreak),
                Node::text("twice").with_mark(Mark::new(MarkKind::Bold)),
            ]),
            Node::new(NodeKind::Image)
                .with_attr("src", "https://cdn.example.org/ecg.png")
                .with_attr("alt", "ECG strip"),
        ])
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(
            sample().plain_text(),
            "Cardiology\nSee guidelines\ntwice\nECG strip"
        );
    }

    #[test]
    fn test_references() {
        let doc = sample();
        assert_eq!(doc.media_sources(), vec!["https://cdn.example.org/ecg.png"]);
        assert_eq!(doc.link_targets(), vec!["https://example.org/esc"]);
    }

    #[test]
    fn test_custom_visitor_counts_nodes() {
        struct Counter(usize);
        impl Visitor for Counter {
            fn visit_node(&mut self, node: &Node) {
                self.0 += 1;
                walk_node(self, node);
            }
        }

        let mut counter = Counter(0);
        counter.visit_document(&sample());
        assert_eq!(counter.0, 8);
    }
}
