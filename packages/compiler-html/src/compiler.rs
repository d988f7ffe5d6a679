use lessondoc_document::{
    is_valid_child, node_spec, AttrValue, Document, Mark, MarkKind, Node, NodeKind, NodePath,
};
use lessondoc_validator::check_url;
use thiserror::Error;

/// Errors that can occur during HTML rendering
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// A node sits somewhere the schema forbids. Validated documents never
    /// contain one; reaching it means the schema and renderer have drifted.
    #[error("Unreachable node kind '{kind}' inside '{parent}' at {path}")]
    UnreachableNodeKind {
        kind: NodeKind,
        parent: NodeKind,
        path: NodePath,
    },

    /// A `src`/`href` that fails the URL allow-list, only possible on a
    /// document built without the validator
    #[error("Unsafe {attribute} at {path}: {reason}")]
    UnsafeUrl {
        attribute: &'static str,
        reason: String,
        path: NodePath,
    },
}

/// Options for HTML rendering
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Put each block on its own indented line
    pub pretty: bool,
    /// Indentation string
    pub indent: String,
    /// Fail on schema drift instead of logging and rendering plain text
    pub strict_invariants: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            indent: "  ".to_string(),
            strict_invariants: cfg!(debug_assertions),
        }
    }
}

impl RenderOptions {
    /// Settings for serving pages: drift is logged, never fatal
    pub fn production() -> Self {
        Self {
            strict_invariants: false,
            ..Default::default()
        }
    }
}

struct Context {
    options: RenderOptions,
    depth: usize,
    buffer: String,
}

impl Context {
    fn new(options: RenderOptions) -> Self {
        Self {
            options,
            depth: 0,
            buffer: String::new(),
        }
    }

    fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn add_line(&mut self, text: &str) {
        self.start_line();
        self.add(text);
        self.end_line();
    }

    fn start_line(&mut self) {
        if self.options.pretty {
            self.add_indent();
        }
    }

    fn end_line(&mut self) {
        if self.options.pretty {
            self.add("\n");
        }
    }

    fn add_indent(&mut self) {
        for _ in 0..self.depth {
            self.buffer.push_str(&self.options.indent);
        }
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    fn get_output(self) -> String {
        self.buffer
    }
}

/// Render a document to HTML
///
/// Attribute values are escaped and URLs are checked against the same
/// allow-list the validator uses.
pub fn compile_to_html(document: &Document, options: RenderOptions) -> Result<String, RenderError> {
    let mut ctx = Context::new(options);
    compile_children(&document.children, NodeKind::Doc, &NodePath::root(), &mut ctx)?;
    Ok(ctx.get_output())
}

/// Render with production settings
pub fn to_html(document: &Document) -> String {
    match compile_to_html(document, RenderOptions::production()) {
        Ok(html) => html,
        Err(err) => {
            tracing::error!("HTML rendering failed: {}", err);
            String::new()
        }
    }
}

fn compile_children(
    children: &[Node],
    parent: NodeKind,
    path: &NodePath,
    ctx: &mut Context,
) -> Result<(), RenderError> {
    for (index, child) in children.iter().enumerate() {
        compile_node(child, parent, &path.child(index), ctx)?;
    }
    Ok(())
}

fn compile_node(
    node: &Node,
    parent: NodeKind,
    path: &NodePath,
    ctx: &mut Context,
) -> Result<(), RenderError> {
    if node_spec(node.kind).is_none() || !is_valid_child(parent, node.kind) {
        return compile_unreachable(node, parent, path, ctx);
    }

    match node.kind {
        NodeKind::Text => compile_text(node, path, ctx),
        NodeKind::HardBreak => {
            ctx.add("<br>");
            Ok(())
        }
        NodeKind::Paragraph => compile_textblock("p", node, path, ctx),
        NodeKind::Heading => {
            let tag = format!("h{}", heading_level(node));
            compile_textblock(&tag, node, path, ctx)
        }
        NodeKind::CodeBlock => {
            let class = node
                .attr("language")
                .and_then(AttrValue::as_str)
                .map(|language| format!("language-{}", language));

            ctx.start_line();
            ctx.add("<pre>");
            ctx.add(&open_tag("code", &[("class", class)]));
            compile_children(&node.children, node.kind, path, ctx)?;
            ctx.add("</code></pre>");
            ctx.end_line();
            Ok(())
        }
        NodeKind::HorizontalRule => {
            ctx.add_line("<hr>");
            Ok(())
        }
        NodeKind::Blockquote => compile_container("blockquote", &[], node, path, ctx),
        NodeKind::BulletList => compile_container("ul", &[], node, path, ctx),
        NodeKind::OrderedList => {
            let start = int_attr(node, "start").filter(|start| *start != 1);
            compile_container("ol", &[("start", start.map(|s| s.to_string()))], node, path, ctx)
        }
        NodeKind::ListItem => compile_container("li", &[], node, path, ctx),
        NodeKind::Table => compile_container("table", &[], node, path, ctx),
        NodeKind::TableRow => compile_container("tr", &[], node, path, ctx),
        NodeKind::TableCell => compile_container("td", &span_attrs(node), node, path, ctx),
        NodeKind::TableHeader => compile_container("th", &span_attrs(node), node, path, ctx),
        NodeKind::Image => {
            let tag = open_tag(
                "img",
                &[
                    ("src", safe_url(node.attr("src"), "src", true, path, ctx)?),
                    ("alt", str_attr(node, "alt")),
                    ("title", str_attr(node, "title")),
                    ("width", int_attr(node, "width").map(|n| n.to_string())),
                    ("height", int_attr(node, "height").map(|n| n.to_string())),
                ],
            );
            ctx.add_line(&tag);
            Ok(())
        }
        NodeKind::Video => {
            let tag = open_tag(
                "video",
                &[
                    ("src", safe_url(node.attr("src"), "src", false, path, ctx)?),
                    ("width", int_attr(node, "width").map(|n| n.to_string())),
                    ("height", int_attr(node, "height").map(|n| n.to_string())),
                ],
            );
            // `controls` is a bare boolean attribute
            let tag = format!("{} controls>", tag.trim_end_matches('>'));
            ctx.add_line(&format!("{}</video>", tag));
            Ok(())
        }
        NodeKind::Doc => compile_unreachable(node, parent, path, ctx),
    }
}

fn compile_unreachable(
    node: &Node,
    parent: NodeKind,
    path: &NodePath,
    ctx: &mut Context,
) -> Result<(), RenderError> {
    let err = RenderError::UnreachableNodeKind {
        kind: node.kind,
        parent,
        path: path.clone(),
    };
    if ctx.options.strict_invariants {
        return Err(err);
    }

    tracing::error!("{}; rendering plain text instead", err);
    ctx.add(&escape_html(&node.text_content()));
    Ok(())
}

/// Block whose children are inline content, kept on one line
fn compile_textblock(
    tag: &str,
    node: &Node,
    path: &NodePath,
    ctx: &mut Context,
) -> Result<(), RenderError> {
    ctx.start_line();
    ctx.add(&format!("<{}>", tag));
    compile_children(&node.children, node.kind, path, ctx)?;
    ctx.add(&format!("</{}>", tag));
    ctx.end_line();
    Ok(())
}

/// Block whose children are blocks
fn compile_container(
    tag: &str,
    attrs: &[(&str, Option<String>)],
    node: &Node,
    path: &NodePath,
    ctx: &mut Context,
) -> Result<(), RenderError> {
    ctx.add_line(&open_tag(tag, attrs));
    ctx.indent();
    compile_children(&node.children, node.kind, path, ctx)?;
    ctx.dedent();
    ctx.add_line(&format!("</{}>", tag));
    Ok(())
}

fn compile_text(node: &Node, path: &NodePath, ctx: &mut Context) -> Result<(), RenderError> {
    let mut marks: Vec<&Mark> = node.marks.iter().collect();
    marks.sort_by_key(|mark| mark.kind.rank());

    for mark in &marks {
        let open = mark_open(mark, path, ctx)?;
        ctx.add(&open);
    }
    ctx.add(&escape_html(node.text.as_deref().unwrap_or_default()));
    for mark in marks.iter().rev() {
        ctx.add(mark_close(mark.kind));
    }
    Ok(())
}

/// URL attribute value if it passes the allow-list; otherwise an error
/// under strict invariants, or dropped with a log line
fn safe_url(
    value: Option<&AttrValue>,
    attribute: &'static str,
    allow_data_images: bool,
    path: &NodePath,
    ctx: &Context,
) -> Result<Option<String>, RenderError> {
    let Some(value) = value.and_then(AttrValue::as_str) else {
        return Ok(None);
    };

    match check_url(value, allow_data_images) {
        Ok(url) => Ok(Some(url)),
        Err(reason) => {
            let err = RenderError::UnsafeUrl {
                attribute,
                reason,
                path: path.clone(),
            };
            if ctx.options.strict_invariants {
                return Err(err);
            }
            tracing::error!("{}; attribute dropped", err);
            Ok(None)
        }
    }
}

fn mark_open(mark: &Mark, path: &NodePath, ctx: &Context) -> Result<String, RenderError> {
    let tag = match mark.kind {
        MarkKind::Link => {
            let href = safe_url(mark.attr("href"), "href", false, path, ctx)?;
            let target = mark.attr("target").and_then(AttrValue::as_str);
            let rel = (target == Some("_blank")).then(|| "noopener noreferrer nofollow".to_string());
            let title = mark.attr("title").and_then(AttrValue::as_str);

            open_tag(
                "a",
                &[
                    ("href", href),
                    ("target", target.map(str::to_string)),
                    ("rel", rel),
                    ("title", title.map(str::to_string)),
                ],
            )
        }
        MarkKind::Bold => "<strong>".to_string(),
        MarkKind::Italic => "<em>".to_string(),
        MarkKind::Underline => "<u>".to_string(),
        MarkKind::Strike => "<s>".to_string(),
        MarkKind::Code => "<code>".to_string(),
    };
    Ok(tag)
}

fn mark_close(kind: MarkKind) -> &'static str {
    match kind {
        MarkKind::Link => "</a>",
        MarkKind::Bold => "</strong>",
        MarkKind::Italic => "</em>",
        MarkKind::Underline => "</u>",
        MarkKind::Strike => "</s>",
        MarkKind::Code => "</code>",
    }
}

/// `<tag a="v">` with absent attributes skipped, in the given order
fn open_tag(tag: &str, attrs: &[(&str, Option<String>)]) -> String {
    let mut out = format!("<{}", tag);
    for (name, value) in attrs {
        if let Some(value) = value {
            out.push_str(&format!(" {}=\"{}\"", name, escape_html(value)));
        }
    }
    out.push('>');
    out
}

fn span_attrs(node: &Node) -> Vec<(&'static str, Option<String>)> {
    ["colspan", "rowspan"]
        .into_iter()
        .map(|name| {
            let value = int_attr(node, name).filter(|span| *span != 1);
            (name, value.map(|n| n.to_string()))
        })
        .collect()
}

fn heading_level(node: &Node) -> i64 {
    int_attr(node, "level")
        .filter(|level| (1..=6).contains(level))
        .unwrap_or(1)
}

fn int_attr(node: &Node, name: &str) -> Option<i64> {
    node.attr(name).and_then(AttrValue::as_i64)
}

fn str_attr(node: &Node, name: &str) -> Option<String> {
    node.attr(name).and_then(AttrValue::as_str).map(str::to_string)
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
