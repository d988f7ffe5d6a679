use crate::ValidationError;
use lessondoc_document::NodePath;
use serde::Serialize;

/// Severity level of a repair diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    /// The whole document was rejected
    Error,
    /// Content was removed
    Warning,
    /// Content was tidied without losing anything visible
    Info,
}

/// A repair performed by lenient normalization, or the reason a document
/// was rejected when reported as a warning instead of an error
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,

    /// Short identifier of the repair
    pub rule: &'static str,

    /// Human-readable message
    pub message: String,

    /// Location in the input document
    pub path: NodePath,
}

impl Diagnostic {
    pub fn error(rule: &'static str, message: impl Into<String>, path: NodePath) -> Self {
        Self {
            level: DiagnosticLevel::Error,
            rule,
            message: message.into(),
            path,
        }
    }

    pub fn warning(rule: &'static str, message: impl Into<String>, path: NodePath) -> Self {
        Self {
            level: DiagnosticLevel::Warning,
            rule,
            message: message.into(),
            path,
        }
    }

    pub fn info(rule: &'static str, message: impl Into<String>, path: NodePath) -> Self {
        Self {
            level: DiagnosticLevel::Info,
            rule,
            message: message.into(),
            path,
        }
    }

    /// Structured form of a rejection, for callers that degrade instead
    /// of failing
    pub fn rejected(error: &ValidationError) -> Self {
        Self::error(
            error.code(),
            error.to_string(),
            error.path().cloned().unwrap_or_default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_keeps_code_and_path() {
        let error = ValidationError::UnsafeAttribute {
            attribute: "src".to_string(),
            reason: "scheme 'javascript' is not allowed".to_string(),
            path: NodePath::from(vec![0]),
        };

        let diagnostic = Diagnostic::rejected(&error);

        assert_eq!(diagnostic.level, DiagnosticLevel::Error);
        assert_eq!(diagnostic.rule, "unsafe-attribute");
        assert_eq!(diagnostic.path, NodePath::from(vec![0]));
        assert_eq!(diagnostic.message, error.to_string());
    }

    #[test]
    fn test_rejected_without_path_points_at_root() {
        let diagnostic = Diagnostic::rejected(&ValidationError::MalformedJson("eof".to_string()));
        assert!(diagnostic.path.is_root());
    }
}
