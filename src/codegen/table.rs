//! Tables. A table with any writable column gets the full `SNMP_TABLE_CREATE` form with
//! separate instance lookup and value access; an all read-only table gets the compact
//! `SNMP_TABLE_CREATE_SIMPLE` form built on `union snmp_variant_value`.

use super::scalar::placeholder;
use super::{c_ident, Emitter};
use crate::classify::{self, IndexRange, RangeSource, Shape};
use crate::diagnostic::DiagnosticKind;
use crate::error::CompileError;
use crate::registry::Node;
use crate::runtime;

/// lwIP addresses table cells as `<table>.1.<column>.<index>`.
const ENTRY_SUB_ID: u32 = 1;

impl<'a> Emitter<'a> {
    pub(super) fn table(&mut self, node: &'a Node) -> Result<(), CompileError> {
        let registry = self.registry;
        let row = classify::table_row(registry, node).ok_or_else(|| CompileError::MalformedTable {
            name: node.name.clone(),
            reason: "no row entry with an INDEX clause".to_string(),
        })?;
        if row.sub_id != ENTRY_SUB_ID {
            return Err(CompileError::MalformedTable {
                name: node.name.clone(),
                reason: format!(
                    "row entry `{}` must be numbered {}, found {}",
                    row.name, ENTRY_SUB_ID, row.sub_id
                ),
            });
        }
        let columns = classify::row_columns(registry, row);
        if columns.is_empty() {
            return Err(CompileError::MalformedTable {
                name: node.name.clone(),
                reason: format!("row entry `{}` has no columns", row.name),
            });
        }
        let ranges = classify::index_domain(registry, row);
        for range in ranges.iter().filter(|r| r.source == RangeSource::Unknown) {
            self.warn(
                row,
                DiagnosticKind::DefaultIndexBound,
                format!(
                    "index `{}` of `{}` is not defined here; assuming {}..{}",
                    range.name, row.name, range.lo, range.hi
                ),
            );
        }

        self.record(node, Shape::Table);
        let name = c_ident(&node.name);
        self.oid_ranges(&name, &ranges);
        if classify::is_writable_table(registry, node) {
            self.indexed_table(node, &name, &columns, &ranges);
        } else {
            self.simple_table(node, &name, &columns, &ranges);
        }
        Ok(())
    }

    fn oid_ranges(&mut self, name: &str, ranges: &[IndexRange]) {
        self.body.open(&format!(
            "static const struct snmp_oid_range {}_oid_ranges[] = {{",
            name
        ));
        for range in ranges {
            self.body
                .line(&format!("{{{}, {}}}, /* {} */", range.lo, range.hi, range.name));
        }
        self.body.close("};");
        self.body.blank();
    }

    /// Locals for a next-instance search; must open the function body.
    fn next_oid_locals(&mut self, ranges: &[IndexRange]) {
        self.body.line("struct snmp_next_oid_state state;");
        self.body
            .line(&format!("u32_t result_temp[{}];", ranges.len()));
        self.body.line(&format!("u32_t test_oid[{}];", ranges.len()));
        for i in 0..ranges.len() {
            self.body.line(&format!("u32_t i{};", i));
        }
    }

    /// Offer every index tuple of the domain to `snmp_next_oid_check` and leave the
    /// successor in `row_oid`.
    fn next_oid_search(&mut self, ranges: &[IndexRange]) {
        let n = ranges.len();
        self.body.line(&format!(
            "snmp_next_oid_init(&state, row_oid->id, row_oid->len, result_temp, {});",
            n
        ));
        for (i, range) in ranges.iter().enumerate() {
            self.body.open(&format!(
                "for (i{i} = {}; i{i} <= {}; i{i}++) {{",
                range.lo,
                range.hi,
                i = i
            ));
        }
        for i in 0..n {
            self.body.line(&format!("test_oid[{i}] = i{i};", i = i));
        }
        self.body
            .line(&format!("snmp_next_oid_check(&state, test_oid, {}, NULL);", n));
        for _ in ranges {
            self.body.close("}");
        }
        self.body
            .open("if (state.status != SNMP_NEXT_OID_STATUS_SUCCESS) {");
        self.body.line("return SNMP_ERR_NOSUCHINSTANCE;");
        self.body.close("}");
        self.body
            .line("snmp_oid_assign(row_oid, state.next_oid, state.next_oid_len);");
    }

    fn in_range_guard(&mut self, name: &str) {
        self.body.open(&format!(
            "if (!snmp_oid_in_range(row_oid, row_oid_len, {n}_oid_ranges, LWIP_ARRAYSIZE({n}_oid_ranges))) {{",
            n = name
        ));
        self.body.line("return SNMP_ERR_NOSUCHINSTANCE;");
        self.body.close("}");
    }

    /// Column and row of the cell an instance method was called for.
    fn cell_locals(&mut self) {
        self.body
            .line("u32_t column = SNMP_TABLE_GET_COLUMN_FROM_OID(instance->instance_oid.id);");
        self.body.line("u32_t row = instance->reference.u32;");
    }

    fn indexed_table(&mut self, node: &Node, name: &str, columns: &[&Node], ranges: &[IndexRange]) {
        self.extern_node("snmp_table_node", &format!("{}_root", name));

        self.body.open(&format!(
            "static const struct snmp_table_col_def {}_columns[] = {{",
            name
        ));
        for col in columns {
            self.body.line(&format!(
                "{{{}, {}, {}}}, /* {} */",
                col.sub_id,
                runtime::asn1_type(col.syntax.as_ref()),
                runtime::access_mode(col.access),
                col.name
            ));
        }
        self.body.close("};");
        self.body.blank();

        self.open_function(&format!(
            "snmp_err_t {}_get_cell_instance(const u32_t *column, const u32_t *row_oid, u8_t row_oid_len, struct snmp_node_instance *cell_instance)",
            name
        ));
        self.body.line("LWIP_UNUSED_ARG(column);");
        self.in_range_guard(name);
        self.body.line("cell_instance->reference.u32 = row_oid[0];");
        self.body.line("return SNMP_ERR_NOERROR;");
        self.close_function();

        self.open_function(&format!(
            "snmp_err_t {}_get_next_cell_instance(const u32_t *column, struct snmp_obj_id *row_oid, struct snmp_node_instance *cell_instance)",
            name
        ));
        self.next_oid_locals(ranges);
        self.body.line("LWIP_UNUSED_ARG(column);");
        self.body.blank();
        self.next_oid_search(ranges);
        self.body.line("cell_instance->reference.u32 = row_oid->id[0];");
        self.body.line("return SNMP_ERR_NOERROR;");
        self.close_function();

        self.open_function(&format!(
            "s16_t {}_get_value(struct snmp_node_instance *instance, void *value)",
            name
        ));
        self.cell_locals();
        self.body.line("LWIP_UNUSED_ARG(row);");
        self.body.blank();
        self.body.line("switch (column) {");
        for col in columns {
            let ctype = runtime::storage_type(col.syntax.as_ref());
            self.body.line(&format!("case {}: /* {} */", col.sub_id, col.name));
            self.body.indent();
            placeholder(&mut self.body, &ctype, "row");
            self.body.dedent();
        }
        self.body.line("default:");
        self.body.indent();
        self.body.line("break;");
        self.body.dedent();
        self.body.line("}");
        self.body.line("return 0;");
        self.close_function();

        let writable: Vec<&Node> = columns
            .iter()
            .copied()
            .filter(|col| col.access.is_writable())
            .collect();
        for method in ["set_test", "set_value"] {
            self.open_function(&format!(
                "snmp_err_t {}_{}(struct snmp_node_instance *instance, u16_t len, void *value)",
                name, method
            ));
            self.cell_locals();
            self.body.line("snmp_err_t ret = SNMP_ERR_NOERROR;");
            for arg in ["row", "len", "value"] {
                self.body.line(&format!("LWIP_UNUSED_ARG({});", arg));
            }
            self.body.blank();
            self.body.line("switch (column) {");
            for col in &writable {
                self.body.line(&format!("case {}: /* {} */", col.sub_id, col.name));
                self.body.indent();
                self.body.line("break;");
                self.body.dedent();
            }
            self.body.line("default:");
            self.body.indent();
            self.body.line("ret = SNMP_ERR_NOTWRITABLE;");
            self.body.line("break;");
            self.body.dedent();
            self.body.line("}");
            self.body.line("return ret;");
            self.close_function();
        }

        self.body.line(&format!(
            "const struct snmp_table_node {n}_root = SNMP_TABLE_CREATE({}, {n}_columns, {n}_get_cell_instance, {n}_get_next_cell_instance, {n}_get_value, {n}_set_test, {n}_set_value);",
            node.sub_id,
            n = name
        ));
        self.body.blank();
    }

    fn simple_table(&mut self, node: &Node, name: &str, columns: &[&Node], ranges: &[IndexRange]) {
        self.extern_node("snmp_table_simple_node", &format!("{}_root", name));

        self.body.open(&format!(
            "static const struct snmp_table_simple_col_def {}_columns[] = {{",
            name
        ));
        for col in columns {
            self.body.line(&format!(
                "{{{}, {}, {}}}, /* {} */",
                col.sub_id,
                runtime::asn1_type(col.syntax.as_ref()),
                runtime::variant_type(col.syntax.as_ref()),
                col.name
            ));
        }
        self.body.close("};");
        self.body.blank();

        // Shared by both accessors; static, so it stays out of the header.
        self.body.line(&format!(
            "static snmp_err_t {}_cell_value(u32_t column, u32_t row, union snmp_variant_value *value, u32_t *value_len)",
            name
        ));
        self.body.open("{");
        self.body.line("LWIP_UNUSED_ARG(row);");
        self.body.line("LWIP_UNUSED_ARG(value_len);");
        self.body.blank();
        self.body.line("switch (column) {");
        for col in columns {
            self.body.line(&format!("case {}: /* {} */", col.sub_id, col.name));
            self.body.indent();
            match runtime::variant_type(col.syntax.as_ref()) {
                runtime::VARIANT_S32 => self.body.line("value->s32 = (s32_t)row;"),
                runtime::VARIANT_CONST_PTR => {
                    self.body.line("value->const_ptr = \"\";");
                    self.body.line("*value_len = 0;");
                }
                _ => self.body.line("value->u32 = row;"),
            }
            self.body.line("break;");
            self.body.dedent();
        }
        self.body.line("default:");
        self.body.indent();
        self.body.line("return SNMP_ERR_NOSUCHINSTANCE;");
        self.body.dedent();
        self.body.line("}");
        self.body.line("return SNMP_ERR_NOERROR;");
        self.body.close("}");
        self.body.blank();

        self.open_function(&format!(
            "snmp_err_t {}_get_cell_value(const u32_t *column, const u32_t *row_oid, u8_t row_oid_len, union snmp_variant_value *value, u32_t *value_len)",
            name
        ));
        self.in_range_guard(name);
        self.body.line(&format!(
            "return {}_cell_value(*column, row_oid[0], value, value_len);",
            name
        ));
        self.close_function();

        self.open_function(&format!(
            "snmp_err_t {}_get_next_cell_instance_and_value(const u32_t *column, struct snmp_obj_id *row_oid, union snmp_variant_value *value, u32_t *value_len)",
            name
        ));
        self.next_oid_locals(ranges);
        self.body.blank();
        self.next_oid_search(ranges);
        self.body.line(&format!(
            "return {}_cell_value(*column, row_oid->id[0], value, value_len);",
            name
        ));
        self.close_function();

        self.body.line(&format!(
            "const struct snmp_table_simple_node {n}_root = SNMP_TABLE_CREATE_SIMPLE({}, {n}_columns, {n}_get_cell_value, {n}_get_next_cell_instance_and_value);",
            node.sub_id,
            n = name
        ));
        self.body.blank();
    }
}
