use lessondoc_document::{
    is_valid_child, node_spec, AttrValue, Document, Mark, MarkKind, Node, NodeKind, NodePath,
    LIST_START_MAX,
};
use thiserror::Error;

/// Errors that can occur during Markdown rendering
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Unreachable node kind '{kind}' inside '{parent}' at {path}")]
    UnreachableNodeKind {
        kind: NodeKind,
        parent: NodeKind,
        path: NodePath,
    },
}

/// Options for Markdown rendering
#[derive(Debug, Clone)]
pub struct MarkdownOptions {
    /// Fail on schema drift instead of logging and rendering plain text
    pub strict_invariants: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            strict_invariants: cfg!(debug_assertions),
        }
    }
}

impl MarkdownOptions {
    pub fn production() -> Self {
        Self {
            strict_invariants: false,
        }
    }
}

#[derive(Clone)]
struct Context {
    options: MarkdownOptions,
    /// Inside a table cell: one line only, `|` escaped
    in_table: bool,
}

/// Render a document to Markdown
///
/// Blocks are separated by a blank line and the output ends with a single
/// newline. An empty document renders to an empty string.
pub fn compile_to_markdown(
    document: &Document,
    options: MarkdownOptions,
) -> Result<String, RenderError> {
    let ctx = Context {
        options,
        in_table: false,
    };
    let blocks = compile_blocks(&document.children, NodeKind::Doc, &NodePath::root(), &ctx)?;
    if blocks.is_empty() {
        return Ok(String::new());
    }
    Ok(format!("{}\n", blocks.join("\n\n")))
}

/// Render with production settings
pub fn to_markdown(document: &Document) -> String {
    match compile_to_markdown(document, MarkdownOptions::production()) {
        Ok(markdown) => markdown,
        Err(err) => {
            tracing::error!("Markdown rendering failed: {}", err);
            String::new()
        }
    }
}

fn is_allowed(node: &Node, parent: NodeKind) -> bool {
    node_spec(node.kind).is_some() && is_valid_child(parent, node.kind)
}

fn compile_blocks(
    children: &[Node],
    parent: NodeKind,
    path: &NodePath,
    ctx: &Context,
) -> Result<Vec<String>, RenderError> {
    let mut blocks = Vec::new();
    for (index, child) in children.iter().enumerate() {
        let block = compile_block(child, parent, &path.child(index), ctx)?;
        // Markdown has no empty paragraph
        if !block.is_empty() {
            blocks.push(block);
        }
    }
    Ok(blocks)
}

fn compile_block(
    node: &Node,
    parent: NodeKind,
    path: &NodePath,
    ctx: &Context,
) -> Result<String, RenderError> {
    if !is_allowed(node, parent) {
        return compile_unreachable(node, parent, path, ctx);
    }

    match node.kind {
        NodeKind::Paragraph => compile_inline(&node.children, node.kind, path, ctx),
        NodeKind::Heading => {
            let text = compile_inline(&node.children, node.kind, path, ctx)?;
            Ok(format!("{} {}", "#".repeat(heading_level(node)), text))
        }
        NodeKind::Blockquote => {
            let inner = compile_blocks(&node.children, node.kind, path, ctx)?.join("\n\n");
            Ok(prefix_lines(&inner, "> ", ">"))
        }
        NodeKind::CodeBlock => Ok(compile_code_block(node, ctx)),
        NodeKind::HorizontalRule => Ok("---".to_string()),
        NodeKind::BulletList => compile_list(node, path, ctx, |_| "- ".to_string()),
        NodeKind::OrderedList => {
            let start = node
                .attr("start")
                .and_then(AttrValue::as_i64)
                .unwrap_or(1)
                .clamp(1, LIST_START_MAX);
            compile_list(node, path, ctx, |index| {
                let number = start.saturating_add(index as i64).min(LIST_START_MAX);
                format!("{}. ", number)
            })
        }
        NodeKind::Table => compile_table(node, path, ctx),
        NodeKind::Image => Ok(compile_image(node, ctx)),
        NodeKind::Video => {
            let src = str_attr(node, "src").unwrap_or_default();
            Ok(format!("[video]({})", link_destination(src)))
        }
        _ => compile_unreachable(node, parent, path, ctx),
    }
}

fn compile_unreachable(
    node: &Node,
    parent: NodeKind,
    path: &NodePath,
    ctx: &Context,
) -> Result<String, RenderError> {
    let err = RenderError::UnreachableNodeKind {
        kind: node.kind,
        parent,
        path: path.clone(),
    };
    if ctx.options.strict_invariants {
        return Err(err);
    }

    tracing::error!("{}; rendering plain text instead", err);
    Ok(escape_text(&node.text_content(), ctx, false))
}

fn compile_list(
    node: &Node,
    path: &NodePath,
    ctx: &Context,
    marker: impl Fn(usize) -> String,
) -> Result<String, RenderError> {
    let mut items = Vec::new();
    let mut loose = false;

    for (index, item) in node.children.iter().enumerate() {
        let item_path = path.child(index);
        if !is_allowed(item, node.kind) {
            items.push(compile_unreachable(item, node.kind, &item_path, ctx)?);
            continue;
        }

        let blocks = compile_blocks(&item.children, item.kind, &item_path, ctx)?;
        loose |= blocks.len() > 1;
        items.push(hang_lines(&blocks.join("\n\n"), &marker(index)));
    }

    let separator = if loose { "\n\n" } else { "\n" };
    Ok(items.join(separator))
}

fn compile_table(node: &Node, path: &NodePath, ctx: &Context) -> Result<String, RenderError> {
    let cell_ctx = Context {
        in_table: true,
        ..ctx.clone()
    };
    let mut rows: Vec<Vec<String>> = Vec::new();

    for (row_index, row) in node.children.iter().enumerate() {
        let row_path = path.child(row_index);
        if !is_allowed(row, node.kind) {
            rows.push(vec![compile_unreachable(row, node.kind, &row_path, &cell_ctx)?]);
            continue;
        }

        let mut cells = Vec::new();
        for (cell_index, cell) in row.children.iter().enumerate() {
            let cell_path = row_path.child(cell_index);
            if !is_allowed(cell, row.kind) {
                cells.push(compile_unreachable(cell, row.kind, &cell_path, &cell_ctx)?);
                continue;
            }

            let blocks = compile_blocks(&cell.children, cell.kind, &cell_path, &cell_ctx)?;
            cells.push(collapse_line(&blocks.join(" ")));

            let colspan = cell.attr("colspan").and_then(AttrValue::as_i64).unwrap_or(1);
            for _ in 1..colspan.max(1) {
                cells.push(String::new());
            }
        }
        rows.push(cells);
    }

    let columns = rows.iter().map(Vec::len).max().unwrap_or(0).max(1);
    if rows.is_empty() {
        return Ok(String::new());
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    for (index, mut row) in rows.into_iter().enumerate() {
        row.resize(columns, String::new());
        lines.push(format!("| {} |", row.join(" | ")));
        if index == 0 {
            lines.push(format!("|{}", " --- |".repeat(columns)));
        }
    }
    Ok(lines.join("\n"))
}

fn compile_code_block(node: &Node, ctx: &Context) -> String {
    let code = node.text_content();
    if ctx.in_table {
        return code_span(&collapse_line(&code), ctx);
    }

    let fence = "`".repeat(longest_run(&code, '`').max(2) + 1);
    let language = str_attr(node, "language").unwrap_or_default();
    if code.is_empty() {
        return format!("{}{}\n{}", fence, language, fence);
    }
    format!("{}{}\n{}\n{}", fence, language, code, fence)
}

fn compile_image(node: &Node, ctx: &Context) -> String {
    let alt = str_attr(node, "alt").unwrap_or_default();
    let src = str_attr(node, "src").unwrap_or_default();
    format!(
        "![{}]({}{})",
        escape_text(alt, ctx, false),
        link_destination(src),
        link_title(str_attr(node, "title"))
    )
}

fn compile_inline(
    children: &[Node],
    parent: NodeKind,
    path: &NodePath,
    ctx: &Context,
) -> Result<String, RenderError> {
    let mut out = String::new();
    for (index, child) in children.iter().enumerate() {
        let child_path = path.child(index);
        if !is_allowed(child, parent) {
            let piece = compile_unreachable(child, parent, &child_path, ctx)?;
            push_inline(&mut out, &piece);
            continue;
        }

        match child.kind {
            NodeKind::Text => {
                let line_start = out.is_empty() || out.ends_with('\n');
                push_inline(&mut out, &compile_text(child, ctx, line_start));
            }
            NodeKind::HardBreak if ctx.in_table => out.push(' '),
            NodeKind::HardBreak => out.push_str("\\\n"),
            _ => {
                let piece = compile_unreachable(child, parent, &child_path, ctx)?;
                push_inline(&mut out, &piece);
            }
        }
    }
    Ok(out)
}

/// Append an inline piece; a `!` left before a link would make it an image
fn push_inline(out: &mut String, piece: &str) {
    if piece.starts_with('[') && out.ends_with('!') {
        out.pop();
        out.push_str("\\!");
    }
    out.push_str(piece);
}

fn compile_text(node: &Node, ctx: &Context, line_start: bool) -> String {
    let text = node.text.as_deref().unwrap_or_default();
    let body = text.trim();
    if body.is_empty() {
        return text.to_string();
    }

    // Delimiters must hug the text, so surrounding whitespace moves outside
    let leading = &text[..text.len() - text.trim_start().len()];
    let trailing = &text[text.trim_end().len()..];

    let mut marks: Vec<&Mark> = node.marks.iter().collect();
    marks.sort_by_key(|mark| mark.kind.rank());

    let mut out = if node.has_mark(MarkKind::Code) {
        code_span(body, ctx)
    } else {
        escape_text(body, ctx, line_start && leading.is_empty())
    };

    for mark in marks.iter().rev() {
        out = match mark.kind {
            MarkKind::Code | MarkKind::Underline => out,
            MarkKind::Strike => format!("~~{}~~", out),
            MarkKind::Italic => format!("*{}*", out),
            MarkKind::Bold => format!("**{}**", out),
            MarkKind::Link => {
                let href = mark.attr("href").and_then(AttrValue::as_str).unwrap_or_default();
                let title = mark.attr("title").and_then(AttrValue::as_str);
                format!("[{}]({}{})", out, link_destination(href), link_title(title))
            }
        };
    }

    format!("{}{}{}", leading, out, trailing)
}

fn code_span(code: &str, ctx: &Context) -> String {
    let code = if ctx.in_table {
        code.replace('|', "\\|")
    } else {
        code.to_string()
    };
    let fence = "`".repeat(longest_run(&code, '`') + 1);
    if code.starts_with('`') || code.ends_with('`') {
        format!("{} {} {}", fence, code, fence)
    } else {
        format!("{}{}{}", fence, code, fence)
    }
}

/// Every line after an embedded newline starts a Markdown line too
fn escape_text(text: &str, ctx: &Context, line_start: bool) -> String {
    text.split('\n')
        .enumerate()
        .map(|(index, line)| {
            let escaped = escape_chars(line, ctx);
            if index > 0 || line_start {
                escape_line_start(escaped)
            } else {
                escaped
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn escape_chars(text: &str, ctx: &Context) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        let special = matches!(ch, '\\' | '`' | '*' | '_' | '[' | ']' | '<' | '~')
            || (ctx.in_table && ch == '|');
        if special {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Keep text that looks like a heading, quote, list marker or setext
/// underline literal
fn escape_line_start(text: String) -> String {
    let indent = text.len() - text.trim_start_matches(' ').len();
    let (spaces, rest) = text.split_at(indent);

    let mut chars = rest.chars();
    let escaped = match (chars.next(), chars.next()) {
        (Some('#' | '>' | '='), _) => format!("\\{}", rest),
        (Some('-' | '+'), None | Some(' ' | '-')) => format!("\\{}", rest),
        (Some(c), _) if c.is_ascii_digit() => {
            let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
            match rest[digits..].chars().next() {
                Some('.' | ')') => format!("{}\\{}", &rest[..digits], &rest[digits..]),
                _ => return text,
            }
        }
        _ => return text,
    };
    format!("{}{}", spaces, escaped)
}

fn link_destination(url: &str) -> String {
    if url.contains(|c: char| c.is_whitespace() || matches!(c, '(' | ')' | '<' | '>')) {
        format!("<{}>", url.replace('<', "%3C").replace('>', "%3E"))
    } else {
        url.to_string()
    }
}

fn link_title(title: Option<&str>) -> String {
    match title {
        Some(title) => format!(" \"{}\"", title.replace('\\', "\\\\").replace('"', "\\\"")),
        None => String::new(),
    }
}

fn prefix_lines(text: &str, prefix: &str, empty_prefix: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                empty_prefix.to_string()
            } else {
                format!("{}{}", prefix, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Marker on the first line, continuation lines indented to match
fn hang_lines(text: &str, marker: &str) -> String {
    if text.is_empty() {
        return marker.trim_end().to_string();
    }

    let indent = " ".repeat(marker.len());
    text.lines()
        .enumerate()
        .map(|(index, line)| match index {
            0 => format!("{}{}", marker, line),
            _ if line.is_empty() => String::new(),
            _ => format!("{}{}", indent, line),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn collapse_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn longest_run(text: &str, needle: char) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for ch in text.chars() {
        if ch == needle {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

fn heading_level(node: &Node) -> usize {
    node.attr("level")
        .and_then(AttrValue::as_i64)
        .filter(|level| (1..=6).contains(level))
        .unwrap_or(1) as usize
}

fn str_attr<'a>(node: &'a Node, name: &str) -> Option<&'a str> {
    node.attr(name).and_then(AttrValue::as_str)
}
