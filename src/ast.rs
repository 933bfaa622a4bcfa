//! Attribute records produced by the MIB parser, one per recognized statement.

use std::fmt;

/// Source position of a statement (1-based).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

/// `{ parentName subId }`: the trailing path assignment of every definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OidAssignment {
    pub parent: String,
    pub sub_id: u32,
}

/// A whole module, collected statement by statement.
#[derive(Debug, Clone, Default)]
pub struct MibModule {
    pub name: String,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone)]
pub enum Statement {
    Imports(Vec<Import>),
    ModuleIdentity(ModuleIdentity),
    ObjectIdentifier(ObjectIdentifier),
    ObjectType(ObjectType),
    Sequence(SequenceType),
    NotificationType(NotificationType),
}

impl Statement {
    /// Name defined by the statement, if any (imports define none).
    pub fn name(&self) -> Option<&str> {
        match self {
            Statement::Imports(_) => None,
            Statement::ModuleIdentity(s) => Some(&s.name),
            Statement::ObjectIdentifier(s) => Some(&s.name),
            Statement::ObjectType(s) => Some(&s.name),
            Statement::Sequence(s) => Some(&s.name),
            Statement::NotificationType(s) => Some(&s.name),
        }
    }
}

/// `a, b FROM SOME-MIB`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub symbols: Vec<String>,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct ModuleIdentity {
    pub name: String,
    pub last_updated: String,
    pub organization: String,
    pub contact_info: String,
    pub description: String,
    pub revisions: Vec<Revision>,
    pub assignment: OidAssignment,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    pub date: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct ObjectIdentifier {
    pub name: String,
    pub assignment: OidAssignment,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct ObjectType {
    pub name: String,
    pub syntax: Syntax,
    pub units: Option<String>,
    pub access: Access,
    pub status: String,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub index: Vec<IndexItem>,
    pub defval: Option<String>,
    pub assignment: OidAssignment,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexItem {
    pub name: String,
    pub implied: bool,
}

/// `EntryName ::= SEQUENCE { field Syntax, ... }`
#[derive(Debug, Clone)]
pub struct SequenceType {
    pub name: String,
    pub fields: Vec<(String, Syntax)>,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct NotificationType {
    pub name: String,
    pub objects: Vec<String>,
    pub access: Option<Access>,
    pub status: String,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub assignment: OidAssignment,
    pub location: Location,
}

/// Declared value syntax of an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Syntax {
    /// `OBJECT IDENTIFIER`
    ObjectIdentifier,
    /// `OCTET STRING [(SIZE (..))]`
    OctetString { size: Option<Bounds> },
    /// `SEQUENCE OF EntryType`
    SequenceOf(String),
    /// Any other type name, with optional enumeration or bounds.
    Named {
        name: String,
        enums: Vec<(String, i64)>,
        bounds: Option<Bounds>,
    },
}

impl Syntax {
    /// Lower-cased keyword used by the runtime lookup tables.
    pub fn keyword(&self) -> String {
        match self {
            Syntax::ObjectIdentifier => "object".to_string(),
            Syntax::OctetString { .. } => "octet".to_string(),
            Syntax::SequenceOf(_) => "sequence".to_string(),
            Syntax::Named { name, .. } => name.to_ascii_lowercase(),
        }
    }

    pub fn enums(&self) -> &[(String, i64)] {
        match self {
            Syntax::Named { enums, .. } => enums,
            _ => &[],
        }
    }

    /// Value range bounds, e.g. `Integer32 (1..8)`. SIZE qualifiers are not value bounds.
    pub fn value_bounds(&self) -> Option<&Bounds> {
        match self {
            Syntax::Named {
                bounds: Some(b), ..
            } if b.kind == BoundsKind::Value => Some(b),
            _ => None,
        }
    }

    /// SIZE qualifier on string-like syntaxes.
    pub fn size_bounds(&self) -> Option<&Bounds> {
        match self {
            Syntax::OctetString { size } => size.as_ref(),
            Syntax::Named {
                bounds: Some(b), ..
            } if b.kind == BoundsKind::Size => Some(b),
            _ => None,
        }
    }
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Syntax::ObjectIdentifier => write!(f, "OBJECT IDENTIFIER"),
            Syntax::OctetString { size: None } => write!(f, "OCTET STRING"),
            Syntax::OctetString { size: Some(b) } => write!(f, "OCTET STRING (SIZE {})", b),
            Syntax::SequenceOf(row) => write!(f, "SEQUENCE OF {}", row),
            Syntax::Named { name, bounds, .. } => match bounds {
                Some(b) if b.kind == BoundsKind::Size => write!(f, "{} (SIZE {})", name, b),
                Some(b) => write!(f, "{} {}", name, b),
                None => write!(f, "{}", name),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundsKind {
    /// `(lo..hi)` on the value itself.
    Value,
    /// `(SIZE (lo..hi))` on the length.
    Size,
}

/// Parenthesized bound list: `(1..8)`, `(0 | 4..6)`, `(SIZE (0..255))`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bounds {
    pub kind: BoundsKind,
    pub ranges: Vec<(i64, i64)>,
}

impl Bounds {
    pub fn lowest(&self) -> Option<i64> {
        self.ranges.iter().map(|&(lo, _)| lo).min()
    }

    pub fn highest(&self) -> Option<i64> {
        self.ranges.iter().map(|&(_, hi)| hi).max()
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .ranges
            .iter()
            .map(|&(lo, hi)| {
                if lo == hi {
                    lo.to_string()
                } else {
                    format!("{}..{}", lo, hi)
                }
            })
            .collect();
        write!(f, "({})", parts.join(" | "))
    }
}

/// ACCESS / MAX-ACCESS value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Access {
    ReadOnly,
    ReadWrite,
    WriteOnly,
    ReadCreate,
    AccessibleForNotify,
    #[default]
    NotAccessible,
}

impl Access {
    /// Unknown keywords fall back to not-accessible.
    pub fn from_keyword(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "read-only" => Access::ReadOnly,
            "read-write" => Access::ReadWrite,
            "write-only" => Access::WriteOnly,
            "read-create" => Access::ReadCreate,
            "accessible-for-notify" => Access::AccessibleForNotify,
            _ => Access::NotAccessible,
        }
    }

    pub fn is_writable(self) -> bool {
        matches!(self, Access::ReadWrite | Access::WriteOnly | Access::ReadCreate)
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Access::ReadOnly => "read-only",
            Access::ReadWrite => "read-write",
            Access::WriteOnly => "write-only",
            Access::ReadCreate => "read-create",
            Access::AccessibleForNotify => "accessible-for-notify",
            Access::NotAccessible => "not-accessible",
        };
        f.write_str(s)
    }
}
