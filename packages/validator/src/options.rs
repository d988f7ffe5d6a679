use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Policy for schema-violating content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Reject the whole document on the first violation
    Strict,
    /// Drop or repair offending nodes, marks and attributes
    #[default]
    Lenient,
}

/// Options for document validation
///
/// Unsafe URLs, unknown node kinds and unknown marks are rejected in both
/// modes; the mode only decides what happens to content the schema can
/// repair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOptions {
    #[serde(default)]
    pub mode: ValidationMode,

    /// Maximum nesting depth below the root
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl ValidationOptions {
    pub fn strict() -> Self {
        Self {
            mode: ValidationMode::Strict,
            ..Default::default()
        }
    }

    pub fn lenient() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.mode == ValidationMode::Strict
    }
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            mode: ValidationMode::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
