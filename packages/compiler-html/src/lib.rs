//! # Lessondoc HTML Compiler
//!
//! Renders a validated [`Document`](lessondoc_document::Document) to HTML.
//! Output is a pure function of the document: the same input always yields
//! byte-identical output.

mod compiler;

#[cfg(test)]
mod tests;

pub use compiler::{compile_to_html, to_html, RenderError, RenderOptions};
