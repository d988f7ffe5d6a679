//! # Document Schema
//!
//! Static table of node and mark kinds: which children each kind accepts
//! and which attributes it may carry.
//!
//! Everything here is data. Adding a block kind means adding a `NodeKind`
//! variant and a row to [`NODE_SPECS`]; the validator and renderers only
//! consult the table through the lookup functions below.

use crate::model::{MarkKind, NodeKind};
use std::collections::BTreeSet;

/// Content group a kind belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeGroup {
    Block,
    Inline,
}

/// One entry of a node's allowed-children list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentRule {
    /// Any kind in the group
    Group(NodeGroup),
    /// Exactly this kind
    Kind(NodeKind),
}

/// Value type accepted for an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrType {
    /// URL checked against the scheme allow-list
    Url { allow_data_images: bool },
    /// Free text (escaped on output)
    Text,
    /// `[A-Za-z0-9_+#.-]`, e.g. a code block language
    Identifier,
    /// Integer within an inclusive range
    Integer { min: i64, max: i64 },
    /// One of a fixed set of strings
    Choice(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttrSpec {
    pub name: &'static str,
    pub ty: AttrType,
    pub required: bool,
    /// Integer default applied when the attribute is absent
    pub default: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeSpec {
    pub kind: NodeKind,
    pub group: Option<NodeGroup>,
    /// Allowed children; empty for leaves
    pub content: &'static [ContentRule],
    pub attrs: &'static [AttrSpec],
}

impl NodeSpec {
    pub fn is_leaf(&self) -> bool {
        self.content.is_empty()
    }

    pub fn attr(&self, name: &str) -> Option<&'static AttrSpec> {
        self.attrs.iter().find(|spec| spec.name == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkSpec {
    pub kind: MarkKind,
    pub attrs: &'static [AttrSpec],
}

impl MarkSpec {
    pub fn attr(&self, name: &str) -> Option<&'static AttrSpec> {
        self.attrs.iter().find(|spec| spec.name == name)
    }
}

const fn optional(name: &'static str, ty: AttrType) -> AttrSpec {
    AttrSpec {
        name,
        ty,
        required: false,
        default: None,
    }
}

const fn required(name: &'static str, ty: AttrType) -> AttrSpec {
    AttrSpec {
        name,
        ty,
        required: true,
        default: None,
    }
}

const fn integer(name: &'static str, min: i64, max: i64, default: Option<i64>) -> AttrSpec {
    AttrSpec {
        name,
        ty: AttrType::Integer { min, max },
        required: false,
        default,
    }
}

const BLOCKS: &[ContentRule] = &[ContentRule::Group(NodeGroup::Block)];
const INLINES: &[ContentRule] = &[ContentRule::Group(NodeGroup::Inline)];
const LEAF: &[ContentRule] = &[];
const NO_ATTRS: &[AttrSpec] = &[];

const CELL_ATTRS: &[AttrSpec] = &[
    integer("colspan", 1, 1000, Some(1)),
    integer("rowspan", 1, 65534, Some(1)),
];

const DIMENSIONS_MAX: i64 = 10_000;
/// Largest list number CommonMark accepts (nine digits)
pub const LIST_START_MAX: i64 = 999_999_999;

pub static NODE_SPECS: &[NodeSpec] = &[
    NodeSpec {
        kind: NodeKind::Doc,
        group: None,
        content: BLOCKS,
        attrs: NO_ATTRS,
    },
    NodeSpec {
        kind: NodeKind::Paragraph,
        group: Some(NodeGroup::Block),
        content: INLINES,
        attrs: NO_ATTRS,
    },
    NodeSpec {
        kind: NodeKind::Heading,
        group: Some(NodeGroup::Block),
        content: INLINES,
        attrs: &[integer("level", 1, 6, Some(1))],
    },
    NodeSpec {
        kind: NodeKind::Blockquote,
        group: Some(NodeGroup::Block),
        content: BLOCKS,
        attrs: NO_ATTRS,
    },
    NodeSpec {
        kind: NodeKind::CodeBlock,
        group: Some(NodeGroup::Block),
        content: &[ContentRule::Kind(NodeKind::Text)],
        attrs: &[optional("language", AttrType::Identifier)],
    },
    NodeSpec {
        kind: NodeKind::HorizontalRule,
        group: Some(NodeGroup::Block),
        content: LEAF,
        attrs: NO_ATTRS,
    },
    NodeSpec {
        kind: NodeKind::BulletList,
        group: Some(NodeGroup::Block),
        content: &[ContentRule::Kind(NodeKind::ListItem)],
        attrs: NO_ATTRS,
    },
    NodeSpec {
        kind: NodeKind::OrderedList,
        group: Some(NodeGroup::Block),
        content: &[ContentRule::Kind(NodeKind::ListItem)],
        attrs: &[integer("start", 1, LIST_START_MAX, Some(1))],
    },
    NodeSpec {
        kind: NodeKind::ListItem,
        group: None,
        content: BLOCKS,
        attrs: NO_ATTRS,
    },
    NodeSpec {
        kind: NodeKind::Table,
        group: Some(NodeGroup::Block),
        content: &[ContentRule::Kind(NodeKind::TableRow)],
        attrs: NO_ATTRS,
    },
    NodeSpec {
        kind: NodeKind::TableRow,
        group: None,
        content: &[
            ContentRule::Kind(NodeKind::TableCell),
            ContentRule::Kind(NodeKind::TableHeader),
        ],
        attrs: NO_ATTRS,
    },
    NodeSpec {
        kind: NodeKind::TableCell,
        group: None,
        content: BLOCKS,
        attrs: CELL_ATTRS,
    },
    NodeSpec {
        kind: NodeKind::TableHeader,
        group: None,
        content: BLOCKS,
        attrs: CELL_ATTRS,
    },
    NodeSpec {
        kind: NodeKind::Image,
        group: Some(NodeGroup::Block),
        content: LEAF,
        attrs: &[
            required("src", AttrType::Url { allow_data_images: true }),
            optional("alt", AttrType::Text),
            optional("title", AttrType::Text),
            integer("width", 1, DIMENSIONS_MAX, None),
            integer("height", 1, DIMENSIONS_MAX, None),
        ],
    },
    NodeSpec {
        kind: NodeKind::Video,
        group: Some(NodeGroup::Block),
        content: LEAF,
        attrs: &[
            required("src", AttrType::Url { allow_data_images: false }),
            integer("width", 1, DIMENSIONS_MAX, None),
            integer("height", 1, DIMENSIONS_MAX, None),
        ],
    },
    NodeSpec {
        kind: NodeKind::HardBreak,
        group: Some(NodeGroup::Inline),
        content: LEAF,
        attrs: NO_ATTRS,
    },
    NodeSpec {
        kind: NodeKind::Text,
        group: Some(NodeGroup::Inline),
        content: LEAF,
        attrs: NO_ATTRS,
    },
];

pub static MARK_SPECS: &[MarkSpec] = &[
    MarkSpec {
        kind: MarkKind::Link,
        attrs: &[
            required("href", AttrType::Url { allow_data_images: false }),
            optional("target", AttrType::Choice(&["_blank", "_self"])),
            optional("title", AttrType::Text),
        ],
    },
    MarkSpec {
        kind: MarkKind::Bold,
        attrs: NO_ATTRS,
    },
    MarkSpec {
        kind: MarkKind::Italic,
        attrs: NO_ATTRS,
    },
    MarkSpec {
        kind: MarkKind::Underline,
        attrs: NO_ATTRS,
    },
    MarkSpec {
        kind: MarkKind::Strike,
        attrs: NO_ATTRS,
    },
    MarkSpec {
        kind: MarkKind::Code,
        attrs: NO_ATTRS,
    },
];

/// Table row for `kind`, `None` if the table has drifted from the enum
pub fn node_spec(kind: NodeKind) -> Option<&'static NodeSpec> {
    NODE_SPECS.iter().find(|spec| spec.kind == kind)
}

pub fn mark_spec(kind: MarkKind) -> Option<&'static MarkSpec> {
    MARK_SPECS.iter().find(|spec| spec.kind == kind)
}

/// Whether `child` may appear directly inside `parent`
pub fn is_valid_child(parent: NodeKind, child: NodeKind) -> bool {
    let Some(parent_spec) = node_spec(parent) else {
        return false;
    };
    let child_group = node_spec(child).and_then(|spec| spec.group);

    parent_spec.content.iter().any(|rule| match rule {
        ContentRule::Group(group) => child_group == Some(*group),
        ContentRule::Kind(kind) => *kind == child,
    })
}

/// Attribute keys `kind` may carry
pub fn allowed_attributes(kind: NodeKind) -> BTreeSet<&'static str> {
    node_spec(kind)
        .map(|spec| spec.attrs.iter().map(|attr| attr.name).collect())
        .unwrap_or_default()
}
