//! Object classification.
//!
//! Two decisions live here. At registration time an OBJECT-TYPE's [`NodeKind`] is inferred
//! from its own clauses and its parent's kind. At generation time a node's [`Shape`] is
//! derived from its kind and the kinds of its children, which are only final once the whole
//! module has been registered.

use crate::ast::{ObjectType, Syntax};
use crate::registry::{Node, NodeKind, Registry};
use std::fmt;

/// Kind of an OBJECT-TYPE, given its parent's kind.
pub fn object_kind(def: &ObjectType, parent_kind: NodeKind) -> Result<NodeKind, String> {
    if matches!(def.syntax, Syntax::SequenceOf(_)) {
        return Ok(NodeKind::Table);
    }
    if !def.index.is_empty() {
        return Ok(NodeKind::Row);
    }
    match parent_kind {
        NodeKind::Row => Ok(NodeKind::Column),
        NodeKind::Identifier => Ok(NodeKind::Scalar),
        other => Err(format!("objects cannot be placed under a {}", other)),
    }
}

/// Kind of a NOTIFICATION-TYPE. Only branches are walked for children, so anything
/// else would leave the notification unreachable.
pub fn notification_kind(parent_kind: NodeKind) -> Result<NodeKind, String> {
    match parent_kind {
        NodeKind::Identifier => Ok(NodeKind::Notification),
        other => Err(format!("notifications cannot be placed under a {}", other)),
    }
}

/// What the generator emits for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Branch whose children are all scalars: one flattened lookup table.
    ScalarArray,
    /// Branch without children.
    EmptyBranch,
    /// Branch with mixed or non-scalar children.
    Branch,
    Scalar,
    Table,
    Row,
    Column,
    Notification,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Shape::ScalarArray => "scalar array",
            Shape::EmptyBranch => "empty tree",
            Shape::Branch => "tree",
            Shape::Scalar => "scalar",
            Shape::Table => "table",
            Shape::Row => "row",
            Shape::Column => "column",
            Shape::Notification => "notification",
        };
        f.write_str(s)
    }
}

pub fn shape(registry: &Registry, node: &Node) -> Shape {
    match node.kind {
        NodeKind::Identifier => {
            if node.children.is_empty() {
                Shape::EmptyBranch
            } else if registry
                .children(node)
                .all(|child| child.kind == NodeKind::Scalar)
            {
                Shape::ScalarArray
            } else {
                Shape::Branch
            }
        }
        NodeKind::Scalar => Shape::Scalar,
        NodeKind::Table => Shape::Table,
        NodeKind::Row => Shape::Row,
        NodeKind::Column => Shape::Column,
        NodeKind::Notification => Shape::Notification,
    }
}

/// The row entry of a table (its first Row child).
pub fn table_row<'a>(registry: &'a Registry, table: &'a Node) -> Option<&'a Node> {
    registry
        .children(table)
        .find(|child| child.kind == NodeKind::Row)
}

/// Columns of a row, in registration order.
pub fn row_columns<'a>(registry: &'a Registry, row: &'a Node) -> Vec<&'a Node> {
    registry
        .children(row)
        .filter(|child| child.kind == NodeKind::Column)
        .collect()
}

/// A table is writable when any column of its row can be written.
pub fn is_writable_table(registry: &Registry, table: &Node) -> bool {
    table_row(registry, table)
        .map(|row| {
            row_columns(registry, row)
                .iter()
                .any(|col| col.access.is_writable())
        })
        .unwrap_or(false)
}

/// Where an index range came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSource {
    /// Explicit value range on the index object's syntax.
    Bounds,
    /// One value per enumeration item.
    Enumeration,
    /// Known object without range or enumeration.
    Default,
    /// Index object is not defined in this module.
    Unknown,
}

/// Valid values of one INDEX component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRange {
    pub name: String,
    pub lo: u32,
    pub hi: u32,
    pub source: RangeSource,
}

// Keeps `hi + 1` representable in generated u32 loops.
const MAX_INDEX: i64 = u32::MAX as i64 - 1;

/// Row index domain, one range per INDEX item.
pub fn index_domain(registry: &Registry, row: &Node) -> Vec<IndexRange> {
    row.index
        .iter()
        .map(|item| {
            let syntax = registry.lookup(&item.name).and_then(|n| n.syntax.as_ref());
            let (lo, hi, source) = match syntax {
                Some(s) => match (s.value_bounds(), s.enums().len()) {
                    (Some(b), _) => (
                        b.lowest().unwrap_or(1),
                        b.highest().unwrap_or(1),
                        RangeSource::Bounds,
                    ),
                    (None, n) if n > 0 => (1, n as i64, RangeSource::Enumeration),
                    _ => (1, 1, RangeSource::Default),
                },
                None => (1, 1, RangeSource::Unknown),
            };
            let lo = lo.clamp(0, MAX_INDEX);
            let hi = hi.clamp(lo, MAX_INDEX);
            IndexRange {
                name: item.name.clone(),
                lo: lo as u32,
                hi: hi as u32,
                source,
            }
        })
        .collect()
}
