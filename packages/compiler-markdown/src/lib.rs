//! # Lessondoc Markdown Compiler
//!
//! Lossy Markdown export. Constructs without a Markdown equivalent collapse
//! to the nearest readable form:
//!
//! | Node | Markdown |
//! |---|---|
//! | table | GitHub-flavored table, first row as header |
//! | video | `[video](src)` |
//! | underline | plain text |
//! | colspan | padded with empty cells |

mod compiler;


pub use compiler::{compile_to_markdown, to_markdown, MarkdownOptions, RenderError};
