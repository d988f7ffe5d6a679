//! # Lessondoc Validator
//!
//! The boundary between untrusted author input and HTML rendering.
//!
//! ```rust,ignore
//! use lessondoc_validator::{normalize, ValidationOptions};
//!
//! let doc = normalize(&request_body, &ValidationOptions::strict())?;
//! ```
//!
//! Validation is whitelist-based: only kinds, marks and attributes present
//! in the schema table survive, and URL attributes must pass the scheme
//! allow-list in every mode.

mod diagnostic;
mod error;
mod normalizer;
mod options;
mod sanitize;

#[cfg(test)]
mod tests;

pub use diagnostic::{Diagnostic, DiagnosticLevel};
pub use error::ValidationError;
pub use normalizer::{
    normalize, normalize_with_report, parse_document, parse_document_with_report, renormalize,
    NormalizeReport,
};
pub use options::{ValidationMode, ValidationOptions, DEFAULT_MAX_DEPTH};
pub use sanitize::check_url;
