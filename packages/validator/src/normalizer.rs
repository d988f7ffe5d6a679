//! # Normalizer
//!
//! Turns an untrusted JSON tree into a [`Document`] that satisfies every
//! schema invariant.
//!
//! ## Traversal
//!
//! Depth-first, parent before children. Each node is resolved against the
//! schema table; the traversal never names concrete kinds.
//!
//! ## Policy
//!
//! | Problem | Strict | Lenient |
//! |---|---|---|
//! | unknown node kind / mark | error | error |
//! | unsafe URL | error | error |
//! | disallowed child | `InvalidNesting` | child dropped |
//! | marks on a structural node | `InvalidMark` | marks stripped |
//! | unknown attribute | `UnknownAttribute` | attribute dropped |
//! | bad attribute value | `InvalidAttribute` | default / dropped |
//! | missing required attribute | `MissingAttribute` | node or mark dropped |
//!
//! Both modes drop empty text leaves, merge adjacent text leaves with equal
//! marks, sort marks into canonical order and fill attribute defaults, so
//! normalizing an already normalized document is the identity.
//!
//! Field names from the editor library's own JSON (`type`, `content`,
//! `attrs`, camelCase kind names) are accepted as aliases.

use crate::diagnostic::Diagnostic;
use crate::error::ValidationError;
use crate::options::ValidationOptions;
use crate::sanitize::check_url;
use lessondoc_document::{
    is_valid_child, mark_spec, node_spec, AttrSpec, AttrType, AttrValue, Attributes, Document,
    Mark, MarkKind, Node, NodeKind, NodePath,
};
use serde_json::{Map, Value};

/// Normalized document plus the repairs lenient mode performed
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeReport {
    pub document: Document,
    pub diagnostics: Vec<Diagnostic>,
}

/// Validate and normalize an untrusted JSON tree.
///
/// `null` yields the empty document.
pub fn normalize(raw: &Value, options: &ValidationOptions) -> Result<Document, ValidationError> {
    normalize_with_report(raw, options).map(|report| report.document)
}

pub fn normalize_with_report(
    raw: &Value,
    options: &ValidationOptions,
) -> Result<NormalizeReport, ValidationError> {
    let mut normalizer = Normalizer {
        options,
        diagnostics: Vec::new(),
    };
    let document = normalizer.normalize_root(raw)?;

    Ok(NormalizeReport {
        document,
        diagnostics: normalizer.diagnostics,
    })
}

/// Parse JSON text and normalize it.
///
/// Empty or whitespace-only text yields the empty document.
pub fn parse_document(source: &str, options: &ValidationOptions) -> Result<Document, ValidationError> {
    parse_document_with_report(source, options).map(|report| report.document)
}

pub fn parse_document_with_report(
    source: &str,
    options: &ValidationOptions,
) -> Result<NormalizeReport, ValidationError> {
    if source.trim().is_empty() {
        return Ok(NormalizeReport {
            document: Document::empty(),
            diagnostics: Vec::new(),
        });
    }

    let raw: Value =
        serde_json::from_str(source).map_err(|e| ValidationError::MalformedJson(e.to_string()))?;
    normalize_with_report(&raw, options)
}

/// Re-check a document built in memory (e.g. by the editor)
pub fn renormalize(doc: &Document, options: &ValidationOptions) -> Result<Document, ValidationError> {
    let raw = doc
        .to_value()
        .map_err(|e| ValidationError::MalformedJson(e.to_string()))?;
    normalize(&raw, options)
}

struct Normalizer<'a> {
    options: &'a ValidationOptions,
    diagnostics: Vec<Diagnostic>,
}

enum AttrProblem {
    Invalid(String),
    Unsafe(String),
}

impl<'a> Normalizer<'a> {
    fn normalize_root(&mut self, raw: &Value) -> Result<Document, ValidationError> {
        if raw.is_null() {
            return Ok(Document::empty());
        }

        let root = NodePath::root();
        let obj = as_node_object(raw, &root)?;
        let kind_name = kind_name(obj, &root)?;

        match resolve_kind(kind_name) {
            Some(NodeKind::Doc) => {}
            Some(_) => {
                return Err(ValidationError::InvalidRoot {
                    found: kind_name.to_string(),
                })
            }
            None => {
                return Err(ValidationError::UnknownNodeKind {
                    kind: kind_name.to_string(),
                    path: root,
                })
            }
        }

        self.check_structural_marks(obj, NodeKind::Doc, &root)?;
        self.normalize_attributes(field(obj, ATTRIBUTES), &[], "doc", &root)?;
        let children = self.normalize_children(obj, NodeKind::Doc, &root, 0)?;

        Ok(Document::new(children))
    }

    fn normalize_node(
        &mut self,
        raw: &Value,
        parent: NodeKind,
        path: &NodePath,
        depth: usize,
    ) -> Result<Option<Node>, ValidationError> {
        if depth > self.options.max_depth {
            return Err(ValidationError::TooDeep {
                max_depth: self.options.max_depth,
                path: path.clone(),
            });
        }

        let obj = as_node_object(raw, path)?;
        let kind_name = kind_name(obj, path)?;
        let unknown = || ValidationError::UnknownNodeKind {
            kind: kind_name.to_string(),
            path: path.clone(),
        };
        let kind = resolve_kind(kind_name).ok_or_else(unknown)?;
        let spec = node_spec(kind).ok_or_else(unknown)?;

        if !is_valid_child(parent, kind) {
            if self.options.is_strict() {
                return Err(ValidationError::InvalidNesting {
                    parent,
                    child: kind,
                    path: path.clone(),
                });
            }
            self.report(Diagnostic::warning(
                "dropped-node",
                format!("'{}' is not allowed inside '{}'", kind, parent),
                path.clone(),
            ));
            return Ok(None);
        }

        let mut node = Node::new(kind);

        if kind == NodeKind::Text {
            let text = match obj.get("text") {
                Some(Value::String(text)) => text,
                _ => {
                    return Err(ValidationError::MalformedNode {
                        reason: "text node without a 'text' string".to_string(),
                        path: path.clone(),
                    })
                }
            };
            if text.is_empty() {
                self.report(Diagnostic::info(
                    "empty-text",
                    "removed empty text node",
                    path.clone(),
                ));
                return Ok(None);
            }
            node.text = Some(text.clone());
            node.marks = self.normalize_marks(field(obj, &["marks"]), path)?;
        } else {
            self.check_structural_marks(obj, kind, path)?;
        }

        match self.normalize_attributes(field(obj, ATTRIBUTES), spec.attrs, kind.name(), path)? {
            Some(attributes) => node.attributes = attributes,
            None => return Ok(None),
        }

        node.children = self.normalize_children(obj, kind, path, depth)?;

        Ok(Some(node))
    }

    fn normalize_children(
        &mut self,
        obj: &Map<String, Value>,
        kind: NodeKind,
        path: &NodePath,
        depth: usize,
    ) -> Result<Vec<Node>, ValidationError> {
        let raw_children = match field(obj, CHILDREN) {
            None => return Ok(Vec::new()),
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(ValidationError::MalformedNode {
                    reason: "'children' must be an array".to_string(),
                    path: path.clone(),
                })
            }
        };

        let mut children = Vec::with_capacity(raw_children.len());
        for (index, raw_child) in raw_children.iter().enumerate() {
            if let Some(child) = self.normalize_node(raw_child, kind, &path.child(index), depth + 1)? {
                children.push(child);
            }
        }

        Ok(merge_adjacent_text(children))
    }

    /// Structural nodes never carry marks
    fn check_structural_marks(
        &mut self,
        obj: &Map<String, Value>,
        kind: NodeKind,
        path: &NodePath,
    ) -> Result<(), ValidationError> {
        let has_marks = match field(obj, &["marks"]) {
            None => false,
            Some(Value::Array(items)) => !items.is_empty(),
            Some(_) => true,
        };
        if !has_marks {
            return Ok(());
        }

        if self.options.is_strict() {
            return Err(ValidationError::InvalidMark {
                kind,
                path: path.clone(),
            });
        }
        self.report(Diagnostic::warning(
            "stripped-marks",
            format!("removed marks from '{}'", kind),
            path.clone(),
        ));
        Ok(())
    }

    fn normalize_marks(
        &mut self,
        raw: Option<&Value>,
        path: &NodePath,
    ) -> Result<Vec<Mark>, ValidationError> {
        let items = match raw {
            None => return Ok(Vec::new()),
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(ValidationError::MalformedNode {
                    reason: "'marks' must be an array".to_string(),
                    path: path.clone(),
                })
            }
        };

        let mut marks: Vec<Mark> = Vec::with_capacity(items.len());
        for item in items {
            let (name, raw_attrs) = match item {
                Value::String(name) => (name.as_str(), None),
                Value::Object(obj) => (kind_name(obj, path)?, field(obj, ATTRIBUTES)),
                _ => {
                    return Err(ValidationError::MalformedNode {
                        reason: "mark must be a name or an object".to_string(),
                        path: path.clone(),
                    })
                }
            };

            let unknown = || ValidationError::UnknownMark {
                mark: name.to_string(),
                path: path.clone(),
            };
            let kind = resolve_mark(name).ok_or_else(unknown)?;
            let spec = mark_spec(kind).ok_or_else(unknown)?;

            let owner = format!("{} mark", kind);
            let Some(attributes) = self.normalize_attributes(raw_attrs, spec.attrs, &owner, path)?
            else {
                continue;
            };

            if marks.iter().any(|m| m.kind == kind) {
                self.report(Diagnostic::info(
                    "duplicate-mark",
                    format!("removed duplicate '{}' mark", kind),
                    path.clone(),
                ));
                continue;
            }
            marks.push(Mark { kind, attributes });
        }

        marks.sort_by_key(|mark| mark.kind.rank());
        Ok(marks)
    }

    /// Whitelist attributes against `specs`.
    ///
    /// `Ok(None)` means a required attribute is missing in lenient mode and
    /// the owner must be dropped.
    fn normalize_attributes(
        &mut self,
        raw: Option<&Value>,
        specs: &[AttrSpec],
        owner: &str,
        path: &NodePath,
    ) -> Result<Option<Attributes>, ValidationError> {
        let entries = match raw {
            None => None,
            Some(Value::Object(entries)) => Some(entries),
            Some(_) => {
                return Err(ValidationError::MalformedNode {
                    reason: "'attributes' must be an object".to_string(),
                    path: path.clone(),
                })
            }
        };

        let mut attributes = Attributes::new();

        for (name, value) in entries.into_iter().flatten() {
            // Editors emit `null` for unset attributes
            if value.is_null() {
                continue;
            }

            let Some(spec) = specs.iter().find(|spec| spec.name == name) else {
                if self.options.is_strict() {
                    return Err(ValidationError::UnknownAttribute {
                        owner: owner.to_string(),
                        attribute: name.clone(),
                        path: path.clone(),
                    });
                }
                self.report(Diagnostic::warning(
                    "dropped-attribute",
                    format!("removed unknown attribute '{}' from {}", name, owner),
                    path.clone(),
                ));
                continue;
            };

            match coerce(value, spec.ty) {
                Ok(Some(value)) => {
                    attributes.insert(name.clone(), value);
                }
                Ok(None) => {}
                Err(AttrProblem::Unsafe(reason)) => {
                    return Err(ValidationError::UnsafeAttribute {
                        attribute: name.clone(),
                        reason,
                        path: path.clone(),
                    });
                }
                Err(AttrProblem::Invalid(reason)) => {
                    if self.options.is_strict() {
                        return Err(ValidationError::InvalidAttribute {
                            attribute: name.clone(),
                            reason,
                            path: path.clone(),
                        });
                    }
                    self.report(Diagnostic::warning(
                        "dropped-attribute",
                        format!("removed invalid '{}' on {}: {}", name, owner, reason),
                        path.clone(),
                    ));
                }
            }
        }

        for spec in specs {
            if attributes.contains_key(spec.name) {
                continue;
            }
            if let Some(default) = spec.default {
                attributes.insert(spec.name.to_string(), AttrValue::Integer(default));
            } else if spec.required {
                if self.options.is_strict() {
                    return Err(ValidationError::MissingAttribute {
                        owner: owner.to_string(),
                        attribute: spec.name.to_string(),
                        path: path.clone(),
                    });
                }
                self.report(Diagnostic::warning(
                    "dropped-node",
                    format!("removed {} without '{}'", owner, spec.name),
                    path.clone(),
                ));
                return Ok(None);
            }
        }

        Ok(Some(attributes))
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        tracing::debug!(
            rule = diagnostic.rule,
            path = %diagnostic.path,
            "{}",
            diagnostic.message
        );
        self.diagnostics.push(diagnostic);
    }
}

const ATTRIBUTES: &[&str] = &["attributes", "attrs"];
const CHILDREN: &[&str] = &["children", "content"];
const KIND: &[&str] = &["kind", "type"];

/// First present, non-null field among `names`
fn field<'v>(obj: &'v Map<String, Value>, names: &[&str]) -> Option<&'v Value> {
    names
        .iter()
        .filter_map(|name| obj.get(*name))
        .find(|value| !value.is_null())
}

fn as_node_object<'v>(raw: &'v Value, path: &NodePath) -> Result<&'v Map<String, Value>, ValidationError> {
    raw.as_object().ok_or_else(|| ValidationError::MalformedNode {
        reason: "expected an object".to_string(),
        path: path.clone(),
    })
}

fn kind_name<'v>(obj: &'v Map<String, Value>, path: &NodePath) -> Result<&'v str, ValidationError> {
    field(obj, KIND)
        .and_then(Value::as_str)
        .ok_or_else(|| ValidationError::MalformedNode {
            reason: "missing 'kind'".to_string(),
            path: path.clone(),
        })
}

fn resolve_kind(name: &str) -> Option<NodeKind> {
    NodeKind::from_name(name).or_else(|| NodeKind::from_name(&to_snake_case(name)))
}

fn resolve_mark(name: &str) -> Option<MarkKind> {
    MarkKind::from_name(name).or_else(|| MarkKind::from_name(&to_snake_case(name)))
}

/// `bulletList` → `bullet_list`
fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Convert a raw attribute to its schema type; `Ok(None)` means "absent"
fn coerce(value: &Value, ty: AttrType) -> Result<Option<AttrValue>, AttrProblem> {
    match ty {
        AttrType::Url { allow_data_images } => {
            let s = value
                .as_str()
                .ok_or_else(|| AttrProblem::Invalid("expected a string".to_string()))?;
            check_url(s, allow_data_images)
                .map(|url| Some(AttrValue::Text(url)))
                .map_err(AttrProblem::Unsafe)
        }
        AttrType::Text => value
            .as_str()
            .map(|s| Some(AttrValue::Text(s.to_string())))
            .ok_or_else(|| AttrProblem::Invalid("expected a string".to_string())),
        AttrType::Identifier => {
            let s = value
                .as_str()
                .ok_or_else(|| AttrProblem::Invalid("expected a string".to_string()))?;
            if s.is_empty() {
                return Ok(None);
            }
            if s
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '#' | '.' | '-'))
            {
                Ok(Some(AttrValue::Text(s.to_string())))
            } else {
                Err(AttrProblem::Invalid(format!("'{}' is not an identifier", s)))
            }
        }
        AttrType::Integer { min, max } => {
            let n = match value {
                Value::Number(n) => n
                    .as_i64()
                    .or_else(|| n.as_f64().and_then(whole_number)),
                Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            }
            .ok_or_else(|| AttrProblem::Invalid("expected an integer".to_string()))?;

            if (min..=max).contains(&n) {
                Ok(Some(AttrValue::Integer(n)))
            } else {
                Err(AttrProblem::Invalid(format!(
                    "{} is outside {}..={}",
                    n, min, max
                )))
            }
        }
        AttrType::Choice(options) => match value.as_str() {
            Some(s) if options.contains(&s) => Ok(Some(AttrValue::Text(s.to_string()))),
            _ => Err(AttrProblem::Invalid(format!(
                "expected one of {}",
                options.join(", ")
            ))),
        },
    }
}

/// `3.0` → `3`; fractions and values beyond the `i64` range are rejected
fn whole_number(f: f64) -> Option<i64> {
    const LIMIT: f64 = 9_007_199_254_740_992.0; // 2^53

    if f.is_finite() && f.fract() == 0.0 && f.abs() <= LIMIT {
        Some(f as i64)
    } else {
        None
    }
}

/// Merge neighbouring text leaves that carry identical marks
fn merge_adjacent_text(children: Vec<Node>) -> Vec<Node> {
    let mut merged: Vec<Node> = Vec::with_capacity(children.len());

    for child in children {
        if let Some(prev) = merged.last_mut() {
            if prev.is_text() && child.is_text() && prev.marks == child.marks {
                if let (Some(prev_text), Some(text)) = (prev.text.as_mut(), child.text.as_deref()) {
                    prev_text.push_str(text);
                    continue;
                }
            }
        }
        merged.push(child);
    }

    merged
}
