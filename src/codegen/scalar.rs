//! Scalars and scalar-array branches.

use super::{c_ident, CWriter, Emitter};
use crate::classify::Shape;
use crate::error::CompileError;
use crate::registry::Node;
use crate::runtime::{self, CType};

/// Store a placeholder in the agent's value buffer and return its size.
///
/// Plain values get `expr`; strings and OIDs are zero-filled.
pub(super) fn placeholder(w: &mut CWriter, ctype: &CType, expr: &str) {
    if ctype.is_array() {
        w.line(&format!("memset(value, 0, sizeof({}));", ctype.spelling()));
    } else {
        w.line(&format!("*({} *)value = ({}){};", ctype.base, ctype.base, expr));
    }
    w.line(&format!("return sizeof({});", ctype.spelling()));
}

impl<'a> Emitter<'a> {
    /// `set_test` / `set_value` stubs that accept every write.
    pub(super) fn set_stubs(&mut self, prefix: &str, target: &str, subject: &str) {
        for method in ["set_test", "set_value"] {
            self.open_function(&format!(
                "snmp_err_t {}_{}({}, u16_t len, void *value)",
                prefix, method, target
            ));
            self.body.line("snmp_err_t ret = SNMP_ERR_NOERROR;");
            for arg in [subject, "len", "value"] {
                self.body.line(&format!("LWIP_UNUSED_ARG({});", arg));
            }
            self.body.line("return ret;");
            self.close_function();
        }
    }

    /// One flattened `snmp_scalar_array_node` for a branch whose children are all scalars.
    /// The children get no records of their own.
    pub(super) fn scalar_array(&mut self, node: &'a Node) -> Result<(), CompileError> {
        self.record(node, Shape::ScalarArray);
        let name = c_ident(&node.name);
        let registry = self.registry;
        let children: Vec<&Node> = registry.children(node).collect();
        self.extern_node("snmp_scalar_array_node", &format!("{}_root", name));

        self.open_function(&format!(
            "s16_t {}_get_value(const struct snmp_scalar_array_node_def *node, void *value)",
            name
        ));
        self.body.line("switch (node->oid) {");
        for child in &children {
            let ctype = runtime::storage_type(child.syntax.as_ref());
            self.body
                .line(&format!("case {}: /* {} */", child.sub_id, child.name));
            self.body.indent();
            placeholder(&mut self.body, &ctype, &child.sub_id.to_string());
            self.body.dedent();
        }
        self.body.line("default:");
        self.body.indent();
        self.body.line("break;");
        self.body.dedent();
        self.body.line("}");
        self.body.line("return 0;");
        self.close_function();

        self.set_stubs(
            &name,
            "const struct snmp_scalar_array_node_def *node",
            "node",
        );

        self.body.open(&format!(
            "static const struct snmp_scalar_array_node_def {}_nodes[] = {{",
            name
        ));
        for child in &children {
            self.body.line(&format!(
                "{{{}, {}, {}}}, /* {} */",
                child.sub_id,
                runtime::asn1_type(child.syntax.as_ref()),
                runtime::access_mode(child.access),
                child.name
            ));
        }
        self.body.close("};");
        self.body.line(&format!(
            "const struct snmp_scalar_array_node {n}_root = SNMP_SCALAR_CREATE_ARRAY_NODE({}, {n}_nodes, {n}_get_value, {n}_set_test, {n}_set_value);",
            node.sub_id,
            n = name
        ));
        self.body.blank();
        Ok(())
    }

    /// A standalone `snmp_scalar_node`, used when the scalar shares its branch with
    /// non-scalar siblings. Set methods are wired only for writable scalars.
    pub(super) fn scalar(&mut self, node: &'a Node) -> Result<(), CompileError> {
        self.record(node, Shape::Scalar);
        let name = c_ident(&node.name);
        let ctype = runtime::storage_type(node.syntax.as_ref());
        self.extern_node("snmp_scalar_node", &format!("{}_root", name));

        self.open_function(&format!(
            "s16_t {}_get_value(struct snmp_node_instance *instance, void *value)",
            name
        ));
        self.body.line("LWIP_UNUSED_ARG(instance);");
        placeholder(&mut self.body, &ctype, &node.sub_id.to_string());
        self.close_function();

        let (test, set) = if node.access.is_writable() {
            self.set_stubs(&name, "struct snmp_node_instance *instance", "instance");
            (format!("{}_set_test", name), format!("{}_set_value", name))
        } else {
            ("NULL".to_string(), "NULL".to_string())
        };
        self.body.line(&format!(
            "const struct snmp_scalar_node {n}_root = SNMP_SCALAR_CREATE_NODE({}, {}, {}, {n}_get_value, {}, {});",
            node.sub_id,
            runtime::access_mode(node.access),
            runtime::asn1_type(node.syntax.as_ref()),
            test,
            set,
            n = name
        ));
        self.body.blank();
        Ok(())
    }
}
