//! Symbol and tree registry: names resolved to OIDs, OIDs to nodes, parents linked to children.
//!
//! One registry exists per compilation. It is seeded with `private` (1.3.6.1.4) and
//! `enterprises` (1.3.6.1.4.1) and then fed statement by statement by the parser, so a
//! definition's parent must appear earlier in the source than the definition itself.

use crate::ast::*;
use crate::classify;
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::error::CompileError;
use crate::parser::StatementSink;
use std::collections::HashMap;
use std::fmt;

/// Name of the seeded branch every generated MIB lives under.
pub const ENTERPRISES: &str = "enterprises";
pub const PRIVATE: &str = "private";

const PRIVATE_ARCS: [u32; 5] = [1, 3, 6, 1, 4];

/// A fully-resolved numeric OID.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Oid(Vec<u32>);

impl Oid {
    pub fn new(arcs: Vec<u32>) -> Self {
        Oid(arcs)
    }

    pub fn arcs(&self) -> &[u32] {
        &self.0
    }

    /// This OID with one more arc.
    pub fn child(&self, sub_id: u32) -> Oid {
        let mut arcs = Vec::with_capacity(self.0.len() + 1);
        arcs.extend_from_slice(&self.0);
        arcs.push(sub_id);
        Oid(arcs)
    }

    pub fn parent(&self) -> Option<Oid> {
        if self.0.len() <= 1 {
            None
        } else {
            Some(Oid(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    pub fn last_arc(&self) -> Option<u32> {
        self.0.last().copied()
    }

    pub fn to_dotted(&self) -> String {
        self.0
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_dotted())
    }
}

/// Object kind decided at registration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// OBJECT IDENTIFIER or MODULE-IDENTITY: a branch.
    Identifier,
    Scalar,
    Table,
    Row,
    Column,
    Notification,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeKind::Identifier => "identifier",
            NodeKind::Scalar => "scalar",
            NodeKind::Table => "table",
            NodeKind::Row => "row",
            NodeKind::Column => "column",
            NodeKind::Notification => "notification",
        };
        f.write_str(s)
    }
}

/// A registered definition.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub oid: Oid,
    pub sub_id: u32,
    pub kind: NodeKind,
    pub syntax: Option<Syntax>,
    pub access: Access,
    pub status: Option<String>,
    pub units: Option<String>,
    pub description: Option<String>,
    /// Parent OID, for lookup only; the parent's `children` is the authoritative edge.
    pub parent: Option<Oid>,
    /// Child OIDs in registration order.
    pub children: Vec<Oid>,
    /// Notifications: referenced objects, in declaration order.
    pub objects: Vec<String>,
    /// Rows: INDEX items.
    pub index: Vec<IndexItem>,
    pub location: Location,
}

impl Node {
    fn new(name: &str, oid: Oid, kind: NodeKind, location: Location) -> Self {
        let sub_id = oid.last_arc().unwrap_or(0);
        let parent = oid.parent();
        Node {
            name: name.to_string(),
            oid,
            sub_id,
            kind,
            syntax: None,
            access: Access::NotAccessible,
            status: None,
            units: None,
            description: None,
            parent,
            children: Vec::new(),
            objects: Vec::new(),
            index: Vec::new(),
            location,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Registry {
    names: HashMap<String, Oid>,
    nodes: HashMap<Oid, Node>,
    order: Vec<Oid>,
    diagnostics: Vec<Diagnostic>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Registry seeded with `private` and `enterprises`.
    pub fn new() -> Self {
        let mut registry = Registry {
            names: HashMap::new(),
            nodes: HashMap::new(),
            order: Vec::new(),
            diagnostics: Vec::new(),
        };
        let private = Oid::new(PRIVATE_ARCS.to_vec());
        let enterprises = private.child(1);
        registry.insert(Node::new(PRIVATE, private, NodeKind::Identifier, Location::default()));
        registry.insert(Node::new(
            ENTERPRISES,
            enterprises,
            NodeKind::Identifier,
            Location::default(),
        ));
        registry
    }

    pub fn lookup(&self, name: &str) -> Option<&Node> {
        self.names.get(name).and_then(|oid| self.nodes.get(oid))
    }

    pub fn oid_of(&self, name: &str) -> Option<&Oid> {
        self.names.get(name)
    }

    pub fn node(&self, oid: &Oid) -> Option<&Node> {
        self.nodes.get(oid)
    }

    pub fn parent_of(&self, node: &Node) -> Option<&Node> {
        node.parent.as_ref().and_then(|p| self.nodes.get(p))
    }

    /// Children of `node` in registration order.
    pub fn children<'a>(&'a self, node: &'a Node) -> impl Iterator<Item = &'a Node> + 'a {
        node.children.iter().filter_map(move |oid| self.nodes.get(oid))
    }

    /// All nodes in registration order, seeds first.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.order.iter().filter_map(move |oid| self.nodes.get(oid))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn enterprises(&self) -> Option<&Node> {
        self.lookup(ENTERPRISES)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    fn warn(&mut self, location: Location, kind: DiagnosticKind, message: String) {
        self.diagnostics
            .push(Diagnostic::new(location.line, location.column, kind, message));
    }

    /// Duplicate names are dropped with a warning.
    fn is_duplicate(&mut self, statement: &str, name: &str, location: Location) -> bool {
        if self.names.contains_key(name) {
            self.warn(
                location,
                DiagnosticKind::DuplicateName,
                format!("{}: {} repeat!", statement, name),
            );
            return true;
        }
        false
    }

    fn resolve_parent(
        &self,
        name: &str,
        assignment: &OidAssignment,
        location: Location,
    ) -> Result<Oid, CompileError> {
        self.names
            .get(&assignment.parent)
            .cloned()
            .ok_or_else(|| CompileError::UnresolvedParent {
                name: name.to_string(),
                parent: assignment.parent.clone(),
                line: location.line,
            })
    }

    /// Index the node by name and OID and append it to its parent's children.
    fn insert(&mut self, node: Node) -> bool {
        if let Some(existing) = self.nodes.get(&node.oid) {
            let message = format!(
                "{} has the same OID {} as {}",
                node.name, node.oid, existing.name
            );
            let location = node.location;
            self.warn(location, DiagnosticKind::DuplicateOid, message);
            return false;
        }
        if let Some(parent) = node.parent.as_ref().and_then(|p| self.nodes.get_mut(p)) {
            parent.children.push(node.oid.clone());
        }
        self.names.insert(node.name.clone(), node.oid.clone());
        self.order.push(node.oid.clone());
        self.nodes.insert(node.oid.clone(), node);
        true
    }

    fn register_identifier(
        &mut self,
        statement: &str,
        name: &str,
        assignment: &OidAssignment,
        location: Location,
    ) -> Result<(), CompileError> {
        if self.is_duplicate(statement, name, location) {
            return Ok(());
        }
        let parent = self.resolve_parent(name, assignment, location)?;
        let node = Node::new(
            name,
            parent.child(assignment.sub_id),
            NodeKind::Identifier,
            location,
        );
        self.insert(node);
        Ok(())
    }
}

impl StatementSink for Registry {
    fn module_identity(&mut self, def: ModuleIdentity) -> Result<(), CompileError> {
        self.register_identifier("MODULE-IDENTITY", &def.name, &def.assignment, def.location)
    }

    fn object_identifier(&mut self, def: ObjectIdentifier) -> Result<(), CompileError> {
        self.register_identifier("OBJECT IDENTIFIER", &def.name, &def.assignment, def.location)
    }

    fn object_type(&mut self, def: ObjectType) -> Result<(), CompileError> {
        if self.is_duplicate("OBJECT-TYPE", &def.name, def.location) {
            return Ok(());
        }
        let parent_oid = self.resolve_parent(&def.name, &def.assignment, def.location)?;
        let parent_kind = self
            .nodes
            .get(&parent_oid)
            .map(|p| p.kind)
            .unwrap_or(NodeKind::Identifier);
        let kind = classify::object_kind(&def, parent_kind).map_err(|reason| {
            CompileError::Unclassifiable {
                name: def.name.clone(),
                parent: def.assignment.parent.clone(),
                reason,
                line: def.location.line,
            }
        })?;

        let mut node = Node::new(
            &def.name,
            parent_oid.child(def.assignment.sub_id),
            kind,
            def.location,
        );
        node.syntax = Some(def.syntax);
        node.access = def.access;
        node.status = Some(def.status);
        node.units = def.units;
        node.description = def.description;
        node.index = def.index;
        self.insert(node);
        Ok(())
    }

    fn notification_type(&mut self, def: NotificationType) -> Result<(), CompileError> {
        if self.is_duplicate("NOTIFICATION-TYPE", &def.name, def.location) {
            return Ok(());
        }
        let parent = self.resolve_parent(&def.name, &def.assignment, def.location)?;
        let parent_kind = self
            .nodes
            .get(&parent)
            .map(|p| p.kind)
            .unwrap_or(NodeKind::Identifier);
        let kind = classify::notification_kind(parent_kind).map_err(|reason| {
            CompileError::Unclassifiable {
                name: def.name.clone(),
                parent: def.assignment.parent.clone(),
                reason,
                line: def.location.line,
            }
        })?;
        let mut node = Node::new(
            &def.name,
            parent.child(def.assignment.sub_id),
            kind,
            def.location,
        );
        node.access = def.access.unwrap_or_default();
        node.status = Some(def.status);
        node.description = def.description;
        node.objects = def.objects;
        self.insert(node);
        Ok(())
    }
}
