//! Notifications: a payload struct in the header and a send function that builds one
//! varbind per object, sends the trap and releases every varbind it allocated.

use super::{c_ident, Emitter};
use crate::classify::Shape;
use crate::diagnostic::DiagnosticKind;
use crate::error::CompileError;
use crate::registry::{Node, NodeKind, Oid};
use crate::runtime;
use std::collections::HashSet;

/// Instance OID carried in a varbind for `object`.
pub fn varbind_oid(object: &Node) -> Oid {
    match object.kind {
        NodeKind::Scalar => object.oid.child(0),
        NodeKind::Column => object.oid.child(1),
        _ => object.oid.clone(),
    }
}

/// One struct field per object. A repeated object gets `_1`, `_2`, ... appended so every
/// field name stays distinct.
fn field_names(objects: &[&Node]) -> Vec<String> {
    let mut used = HashSet::new();
    objects
        .iter()
        .map(|object| {
            let base = c_ident(&object.name);
            let mut field = base.clone();
            let mut n = 0;
            while used.contains(&field) {
                n += 1;
                field = format!("{}_{}", base, n);
            }
            used.insert(field.clone());
            field
        })
        .collect()
}

fn arc_list(oid: &Oid) -> String {
    oid.arcs()
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl<'a> Emitter<'a> {
    pub(super) fn notification(&mut self, node: &'a Node) -> Result<(), CompileError> {
        if node.objects.is_empty() {
            self.warn(
                node,
                DiagnosticKind::EmptyNotification,
                format!("notification `{}` has no OBJECTS; nothing is generated", node.name),
            );
            return Ok(());
        }
        let registry = self.registry;
        let objects = node
            .objects
            .iter()
            .map(|object| {
                registry
                    .lookup(object)
                    .ok_or_else(|| CompileError::UnresolvedObject {
                        notification: node.name.clone(),
                        object: object.clone(),
                    })
            })
            .collect::<Result<Vec<&Node>, CompileError>>()?;

        self.record(node, Shape::Notification);
        let name = c_ident(&node.name);
        let fields = field_names(&objects);

        self.structs
            .open(&format!("struct {}_varbinds {{", name));
        for (object, field) in objects.iter().zip(&fields) {
            let ctype = runtime::storage_type(object.syntax.as_ref());
            self.structs.line(&format!("{};", ctype.declare(field)));
        }
        self.structs.close("};");
        self.structs.blank();

        self.open_function(&format!(
            "err_t {}_send(const struct {}_varbinds *data)",
            name, name
        ));
        self.body.line(&format!(
            "static const u32_t trap_arcs[] = {{ {} }};",
            arc_list(&node.oid)
        ));
        for (i, object) in objects.iter().enumerate() {
            self.body.line(&format!(
                "static const u32_t vb{}_arcs[] = {{ {} }}; /* {} */",
                i,
                arc_list(&varbind_oid(object)),
                object.name
            ));
        }
        self.body.line("struct snmp_obj_id trap_oid;");
        self.body.line("struct snmp_obj_id vb_oid;");
        let nulls = vec!["NULL"; objects.len()].join(", ");
        self.body.line(&format!(
            "struct snmp_varbind *vb[{}] = {{ {} }};",
            objects.len(),
            nulls
        ));
        self.body.line("err_t err = ERR_MEM;");
        self.body.blank();

        self.body
            .line("snmp_oid_assign(&trap_oid, trap_arcs, LWIP_ARRAYSIZE(trap_arcs));");
        for (i, (object, field)) in objects.iter().zip(&fields).enumerate() {
            self.body.line(&format!(
                "snmp_oid_assign(&vb_oid, vb{i}_arcs, LWIP_ARRAYSIZE(vb{i}_arcs));",
                i = i
            ));
            self.body.line(&format!(
                "vb[{}] = snmp_varbind_alloc(&vb_oid, {}, sizeof(data->{}));",
                i,
                runtime::asn1_type(object.syntax.as_ref()),
                field
            ));
        }
        self.body.blank();

        let all_allocated = (0..objects.len())
            .map(|i| format!("vb[{}] != NULL", i))
            .collect::<Vec<_>>()
            .join(" && ");
        self.body.open(&format!("if ({}) {{", all_allocated));
        for (i, field) in fields.iter().enumerate() {
            self.body.line(&format!(
                "memcpy(vb[{}]->value, &data->{f}, sizeof(data->{f}));",
                i,
                f = field
            ));
        }
        for i in 1..objects.len() {
            self.body.line(&format!("vb[{}]->next = vb[{}];", i - 1, i));
            self.body.line(&format!("vb[{}]->prev = vb[{}];", i, i - 1));
        }
        self.body.line(&format!(
            "/* enterprise OID is the trap path; for v2c lwIP sends snmpTrapOID as {}.0.{} */",
            node.oid, node.sub_id
        ));
        self.body.line(&format!(
            "err = snmp_send_trap(&trap_oid, SNMP_GENTRAP_ENTERPRISE_SPECIFIC, {}, vb[0]);",
            node.sub_id
        ));
        self.body.close("}");
        self.body.blank();

        for i in 0..objects.len() {
            self.body.open(&format!("if (vb[{}] != NULL) {{", i));
            self.body.line(&format!("snmp_varbind_free(vb[{}]);", i));
            self.body.close("}");
        }
        self.body.line("return err;");
        self.close_function();
        Ok(())
    }
}
