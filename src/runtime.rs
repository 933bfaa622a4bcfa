//! Names fixed by the lwIP SNMP agent API. Generated code must use these verbatim.

use crate::ast::{Access, Syntax};

/// Declared syntax keyword (lower-cased) → ASN.1 wire type tag.
const ASN1_TYPES: &[(&str, &str)] = &[
    ("integer", "SNMP_ASN1_TYPE_INTEGER"),
    ("integer32", "SNMP_ASN1_TYPE_INTEGER"),
    ("octet", "SNMP_ASN1_TYPE_OCTET_STRING"),
    ("displaystring", "SNMP_ASN1_TYPE_OCTET_STRING"),
    ("physaddress", "SNMP_ASN1_TYPE_OCTET_STRING"),
    ("bits", "SNMP_ASN1_TYPE_OCTET_STRING"),
    ("object", "SNMP_ASN1_TYPE_OBJECT_ID"),
    ("timeticks", "SNMP_ASN1_TYPE_TIMETICKS"),
    ("gauge", "SNMP_ASN1_TYPE_GAUGE"),
    ("gauge32", "SNMP_ASN1_TYPE_GAUGE"),
    ("unsigned32", "SNMP_ASN1_TYPE_UNSIGNED32"),
    ("counter", "SNMP_ASN1_TYPE_COUNTER"),
    ("counter32", "SNMP_ASN1_TYPE_COUNTER"),
    ("ipaddress", "SNMP_ASN1_TYPE_IPADDRESS"),
    ("networkaddress", "SNMP_ASN1_TYPE_IPADDRESS"),
];

const DEFAULT_ASN1_TYPE: &str = "SNMP_ASN1_TYPE_INTEGER";

pub const ACCESS_READ_ONLY: &str = "SNMP_NODE_INSTANCE_READ_ONLY";
pub const ACCESS_READ_WRITE: &str = "SNMP_NODE_INSTANCE_READ_WRITE";
pub const ACCESS_WRITE_ONLY: &str = "SNMP_NODE_INSTANCE_WRITE_ONLY";
pub const ACCESS_NOT_ACCESSIBLE: &str = "SNMP_NODE_INSTANCE_NOT_ACCESSIBLE";

pub const VARIANT_S32: &str = "SNMP_VARIANT_VALUE_TYPE_S32";
pub const VARIANT_U32: &str = "SNMP_VARIANT_VALUE_TYPE_U32";
pub const VARIANT_CONST_PTR: &str = "SNMP_VARIANT_VALUE_TYPE_CONST_PTR";

const MAX_OCTET_STRING_LEN: &str = "SNMP_MAX_OCTET_STRING_LEN";
const MAX_OBJ_ID_LEN: &str = "SNMP_MAX_OBJ_ID_LEN";

/// Broad storage class of a syntax keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Storage {
    Signed,
    Unsigned,
    Octets,
    ObjectId,
}

fn storage_class(keyword: &str) -> Storage {
    match keyword {
        "integer" | "integer32" => Storage::Signed,
        "octet" | "displaystring" | "physaddress" | "bits" => Storage::Octets,
        "object" => Storage::ObjectId,
        _ => Storage::Unsigned,
    }
}

/// ASN.1 tag for a syntax; unknown keywords (and missing syntax) give the integer tag.
pub fn asn1_type(syntax: Option<&Syntax>) -> &'static str {
    let keyword = syntax.map(Syntax::keyword).unwrap_or_default();
    ASN1_TYPES
        .iter()
        .find(|(k, _)| *k == keyword)
        .map(|(_, tag)| *tag)
        .unwrap_or(DEFAULT_ASN1_TYPE)
}

pub fn access_mode(access: Access) -> &'static str {
    match access {
        Access::ReadOnly => ACCESS_READ_ONLY,
        Access::ReadWrite | Access::ReadCreate => ACCESS_READ_WRITE,
        Access::WriteOnly => ACCESS_WRITE_ONLY,
        Access::AccessibleForNotify | Access::NotAccessible => ACCESS_NOT_ACCESSIBLE,
    }
}

/// Discriminant of `union snmp_variant_value` used by simple table accessors.
pub fn variant_type(syntax: Option<&Syntax>) -> &'static str {
    let keyword = syntax.map(Syntax::keyword).unwrap_or_default();
    match storage_class(&keyword) {
        Storage::Signed => VARIANT_S32,
        Storage::Unsigned => VARIANT_U32,
        Storage::Octets | Storage::ObjectId => VARIANT_CONST_PTR,
    }
}

/// Native C storage for a value: element type plus array extent for strings and OIDs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CType {
    pub base: &'static str,
    pub extent: Option<String>,
}

impl CType {
    pub fn is_array(&self) -> bool {
        self.extent.is_some()
    }

    /// Type name as written inside `sizeof`: `s32_t`, `u8_t[N]`.
    pub fn spelling(&self) -> String {
        match &self.extent {
            Some(n) => format!("{}[{}]", self.base, n),
            None => self.base.to_string(),
        }
    }

    /// `s32_t name` or `u8_t name[N]`.
    pub fn declare(&self, name: &str) -> String {
        match &self.extent {
            Some(n) => format!("{} {}[{}]", self.base, name, n),
            None => format!("{} {}", self.base, name),
        }
    }
}

/// Storage type for a syntax; unknown keywords give `u32_t`.
pub fn storage_type(syntax: Option<&Syntax>) -> CType {
    let keyword = syntax.map(Syntax::keyword).unwrap_or_default();
    match storage_class(&keyword) {
        Storage::Signed => CType {
            base: "s32_t",
            extent: None,
        },
        Storage::Unsigned => CType {
            base: "u32_t",
            extent: None,
        },
        Storage::Octets => {
            let size = syntax
                .and_then(Syntax::size_bounds)
                .and_then(|b| b.highest())
                .filter(|&n| n > 0)
                .map(|n| n.to_string());
            CType {
                base: "u8_t",
                extent: Some(size.unwrap_or_else(|| MAX_OCTET_STRING_LEN.to_string())),
            }
        }
        Storage::ObjectId => CType {
            base: "u32_t",
            extent: Some(MAX_OBJ_ID_LEN.to_string()),
        },
    }
}
