//! Generator tests: node shapes, emitted lwIP constructs and generation errors.

use mibgen::{
    compile, CompileError, DiagnosticKind, GeneratorOptions, LineEnding, NodeKind, Shape,
};

const HEADER: &str = "DEMO-MIB DEFINITIONS ::= BEGIN\n";
const FOOTER: &str = "END\n";

fn mib(body: &str) -> String {
    format!("{}{}{}", HEADER, body, FOOTER)
}

fn options() -> GeneratorOptions {
    GeneratorOptions::new()
        .with_base_name("demo")
        .with_line_ending(LineEnding::Lf)
}

fn scalar(name: &str, syntax: &str, access: &str, parent: &str, sub_id: u32) -> String {
    format!(
        "{} OBJECT-TYPE\n    SYNTAX {}\n    ACCESS {}\n    STATUS mandatory\n    ::= {{ {} {} }}\n",
        name, syntax, access, parent, sub_id
    )
}

const ROUND_TRIP: &str = "\
enterprises OBJECT IDENTIFIER ::= { private 1 }
demo OBJECT IDENTIFIER ::= { enterprises 12345 }
temp OBJECT-TYPE SYNTAX INTEGER ACCESS read-only STATUS mandatory ::= { demo 1 }
";

fn table_mib(name_access: &str) -> String {
    mib(&format!(
        "demo OBJECT IDENTIFIER ::= {{ enterprises 12345 }}
demoTable OBJECT-TYPE
    SYNTAX SEQUENCE OF DemoEntry
    ACCESS not-accessible
    STATUS mandatory
    ::= {{ demo 2 }}
demoEntry OBJECT-TYPE
    SYNTAX DemoEntry
    ACCESS not-accessible
    STATUS mandatory
    INDEX {{ demoIndex }}
    ::= {{ demoTable 1 }}
DemoEntry ::= SEQUENCE {{ demoIndex INTEGER, demoName DisplayString }}
demoIndex OBJECT-TYPE
    SYNTAX INTEGER (1..8)
    ACCESS read-only
    STATUS mandatory
    ::= {{ demoEntry 1 }}
demoName OBJECT-TYPE
    SYNTAX DisplayString (SIZE (0..32))
    ACCESS {}
    STATUS mandatory
    ::= {{ demoEntry 2 }}
",
        name_access
    ))
}

#[test]
fn test_round_trip_scalar_array() {
    let out = compile(&mib(ROUND_TRIP), &options()).expect("compile");
    let demo = out.registry.lookup("demo").expect("demo");
    assert_eq!(demo.oid.to_dotted(), "1.3.6.1.4.1.12345");
    let temp = out.registry.lookup("temp").expect("temp");
    assert_eq!(temp.kind, NodeKind::Scalar);

    let src = &out.artifacts.source;
    assert!(src.contains("{1, SNMP_ASN1_TYPE_INTEGER, SNMP_NODE_INSTANCE_READ_ONLY}, /* temp */"));
    assert!(src.contains(
        "const struct snmp_scalar_array_node demo_root = SNMP_SCALAR_CREATE_ARRAY_NODE(12345, demo_nodes, demo_get_value, demo_set_test, demo_set_value);"
    ));
    assert!(src.contains("    &demo_root.node.node, /* demo */"));
    assert!(src.contains("static const u32_t demo_oid_arr[] = { 1, 3, 6, 1, 4, 1, 12345 };"));
    assert!(src.contains("const struct snmp_mib demo_mib = SNMP_MIB_CREATE(demo_oid_arr, &demo_root.node.node);"));
    assert!(src.starts_with("#include \"demo.h\"\n"));

    let shapes: Vec<(&str, Shape)> = out
        .artifacts
        .emitted
        .iter()
        .map(|e| (e.name.as_str(), e.shape))
        .collect();
    assert_eq!(
        shapes,
        vec![("enterprises", Shape::Branch), ("demo", Shape::ScalarArray)]
    );

    // Redefining the seeded `enterprises` is a warning, not an error.
    assert_eq!(out.diagnostics.len(), 1);
    assert_eq!(out.diagnostics[0].kind, DiagnosticKind::DuplicateName);
    assert_eq!(out.diagnostics[0].line, 2);
}

#[test]
fn test_branch_without_children_is_empty_tree() {
    let body = "demo OBJECT IDENTIFIER ::= { enterprises 12345 }\n";
    let out = compile(&mib(body), &options()).expect("compile");
    assert_eq!(out.artifacts.emitted[1].shape, Shape::EmptyBranch);
    let src = &out.artifacts.source;
    assert!(src.contains("static const struct snmp_node *const demo_nodes[] = {};"));
    assert!(src.contains("const struct snmp_tree_node demo_root = SNMP_CREATE_EMPTY_TREE_NODE(12345);"));
}

#[test]
fn test_scalar_children_are_flattened() {
    let body = format!(
        "demo OBJECT IDENTIFIER ::= {{ enterprises 12345 }}\n{}{}",
        scalar("alpha", "INTEGER", "read-only", "demo", 1),
        scalar("beta", "Counter32", "read-only", "demo", 2)
    );
    let out = compile(&mib(&body), &options()).expect("compile");
    let src = &out.artifacts.source;
    assert_eq!(src.matches("SNMP_SCALAR_CREATE_ARRAY_NODE(").count(), 1);
    assert_eq!(src.matches("SNMP_SCALAR_CREATE_NODE(").count(), 0);
    assert!(src.contains("{1, SNMP_ASN1_TYPE_INTEGER, SNMP_NODE_INSTANCE_READ_ONLY}, /* alpha */"));
    assert!(src.contains("{2, SNMP_ASN1_TYPE_COUNTER, SNMP_NODE_INSTANCE_READ_ONLY}, /* beta */"));
    assert!(src.contains("case 2: /* beta */\n        *(u32_t *)value = (u32_t)2;\n        return sizeof(u32_t);"));
    assert!(out.artifacts.emitted.iter().all(|e| e.name != "alpha"));
}

#[test]
fn test_scalar_beside_table_is_emitted_alone() {
    let src = table_mib("read-only").replace(
        "demoTable OBJECT-TYPE",
        &format!(
            "{}demoTable OBJECT-TYPE",
            scalar("alpha", "INTEGER", "read-write", "demo", 1)
        ),
    );
    let out = compile(&src, &options()).expect("compile");
    let c = &out.artifacts.source;
    assert_eq!(c.matches("SNMP_SCALAR_CREATE_ARRAY_NODE(").count(), 0);
    assert!(c.contains(
        "const struct snmp_scalar_node alpha_root = SNMP_SCALAR_CREATE_NODE(1, SNMP_NODE_INSTANCE_READ_WRITE, SNMP_ASN1_TYPE_INTEGER, alpha_get_value, alpha_set_test, alpha_set_value);"
    ));
    assert!(c.contains("    &alpha_root.node.node, /* alpha */"));
    assert!(c.contains("    &demoTable_root.node.node, /* demoTable */"));
    assert!(c.contains("const struct snmp_tree_node demo_root = SNMP_CREATE_TREE_NODE(12345, demo_nodes);"));

    let names: Vec<&str> = out.artifacts.emitted.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["enterprises", "demo", "alpha", "demoTable"]);
}

#[test]
fn test_read_only_scalar_wires_null_setters() {
    let body = format!(
        "demo OBJECT IDENTIFIER ::= {{ enterprises 12345 }}\nsub OBJECT IDENTIFIER ::= {{ demo 9 }}\n{}",
        scalar("alpha", "TimeTicks", "read-only", "demo", 1)
    );
    let out = compile(&mib(&body), &options()).expect("compile");
    let c = &out.artifacts.source;
    assert!(c.contains(
        "SNMP_SCALAR_CREATE_NODE(1, SNMP_NODE_INSTANCE_READ_ONLY, SNMP_ASN1_TYPE_TIMETICKS, alpha_get_value, NULL, NULL);"
    ));
    assert!(!c.contains("alpha_set_test"));
    assert!(c.contains("    &sub_root.node, /* sub */"));
}

#[test]
fn test_writable_table_uses_indexed_form() {
    let out = compile(&table_mib("read-write"), &options()).expect("compile");
    let c = &out.artifacts.source;
    assert!(c.contains("SNMP_TABLE_CREATE(2, demoTable_columns, demoTable_get_cell_instance, demoTable_get_next_cell_instance, demoTable_get_value, demoTable_set_test, demoTable_set_value);"));
    assert!(!c.contains("SNMP_TABLE_CREATE_SIMPLE("));
    assert!(c.contains("{1, 8}, /* demoIndex */"));
    assert!(c.contains("{2, SNMP_ASN1_TYPE_OCTET_STRING, SNMP_NODE_INSTANCE_READ_WRITE}, /* demoName */"));
    assert!(c.contains("for (i0 = 1; i0 <= 8; i0++) {"));
    assert!(c.contains("memset(value, 0, sizeof(u8_t[32]));"));
    assert!(out
        .artifacts
        .header
        .contains("extern const struct snmp_table_node demoTable_root;"));
}

#[test]
fn test_read_only_table_uses_simple_form() {
    let out = compile(&table_mib("read-only"), &options()).expect("compile");
    let c = &out.artifacts.source;
    assert!(c.contains("SNMP_TABLE_CREATE_SIMPLE(2, demoTable_columns, demoTable_get_cell_value, demoTable_get_next_cell_instance_and_value);"));
    assert!(!c.contains("SNMP_TABLE_CREATE("));
    assert!(c.contains("{1, SNMP_ASN1_TYPE_INTEGER, SNMP_VARIANT_VALUE_TYPE_S32}, /* demoIndex */"));
    assert!(c.contains("{2, SNMP_ASN1_TYPE_OCTET_STRING, SNMP_VARIANT_VALUE_TYPE_CONST_PTR}, /* demoName */"));
    // The shared cell helper is static and stays out of the header.
    assert!(c.contains("static snmp_err_t demoTable_cell_value("));
    assert!(!out.artifacts.header.contains("demoTable_cell_value"));
    assert!(out
        .artifacts
        .header
        .contains("extern const struct snmp_table_simple_node demoTable_root;"));
}

#[test]
fn test_enumerated_index_bounds() {
    let src = table_mib("read-only").replace("INTEGER (1..8)", "INTEGER { red(1), green(2), blue(3) }");
    let out = compile(&src, &options()).expect("compile");
    assert!(out.artifacts.source.contains("{1, 3}, /* demoIndex */"));
}

#[test]
fn test_unknown_index_defaults_with_warning() {
    let src = table_mib("read-only").replace("INDEX { demoIndex }", "INDEX { ifIndex }");
    let out = compile(&src, &options()).expect("compile");
    assert!(out.artifacts.source.contains("{1, 1}, /* ifIndex */"));
    assert!(out
        .diagnostics
        .iter()
        .any(|d| d.kind == DiagnosticKind::DefaultIndexBound));
}

const NOTIFY: &str = "\
demo OBJECT IDENTIFIER ::= { enterprises 12345 }
demoTraps OBJECT IDENTIFIER ::= { demo 0 }
x OBJECT-TYPE SYNTAX INTEGER ACCESS read-only STATUS mandatory ::= { demo 1 }
y OBJECT-TYPE SYNTAX OCTET STRING (SIZE (0..16)) ACCESS read-only STATUS mandatory ::= { demo 2 }
z OBJECT-TYPE SYNTAX Gauge32 ACCESS read-only STATUS mandatory ::= { demo 3 }
demoAlarm NOTIFICATION-TYPE OBJECTS { x, y, z } STATUS current ::= { demoTraps 1 }
";

#[test]
fn test_notification_balance() {
    let out = compile(&mib(NOTIFY), &options()).expect("compile");
    let c = &out.artifacts.source;
    assert_eq!(c.matches("snmp_varbind_alloc(").count(), 3);
    assert_eq!(c.matches("snmp_varbind_free(").count(), 3);
    assert_eq!(c.matches("snmp_send_trap(").count(), 1);
    for link in [
        "vb[0]->next = vb[1];",
        "vb[1]->prev = vb[0];",
        "vb[1]->next = vb[2];",
        "vb[2]->prev = vb[1];",
    ] {
        assert!(c.contains(link), "missing {}", link);
    }
    assert!(!c.contains("vb[2]->next"));
    assert!(c.contains("err = snmp_send_trap(&trap_oid, SNMP_GENTRAP_ENTERPRISE_SPECIFIC, 1, vb[0]);"));
    assert!(c.contains("static const u32_t trap_arcs[] = { 1, 3, 6, 1, 4, 1, 12345, 0, 1 };"));
    assert!(c.contains("static const u32_t vb0_arcs[] = { 1, 3, 6, 1, 4, 1, 12345, 1, 0 }; /* x */"));
    assert!(c.contains("vb[1] = snmp_varbind_alloc(&vb_oid, SNMP_ASN1_TYPE_OCTET_STRING, sizeof(data->y));"));
    assert!(c.contains("    NULL, /* demoAlarm */"));

    let h = &out.artifacts.header;
    assert!(h.contains("struct demoAlarm_varbinds {\n    s32_t x;\n    u8_t y[16];\n    u32_t z;\n};"));
    assert!(h.contains("err_t demoAlarm_send(const struct demoAlarm_varbinds *data);"));
}

#[test]
fn test_notification_without_objects_is_skipped() {
    let body = "demo OBJECT IDENTIFIER ::= { enterprises 12345 }\nping NOTIFICATION-TYPE STATUS current ::= { demo 1 }\n";
    let out = compile(&mib(body), &options()).expect("compile");
    assert!(!out.artifacts.source.contains("ping_send"));
    assert!(!out.artifacts.header.contains("ping_varbinds"));
    assert!(out
        .diagnostics
        .iter()
        .any(|d| d.kind == DiagnosticKind::EmptyNotification));
    assert!(out.artifacts.emitted.iter().all(|e| e.name != "ping"));
}

#[test]
fn test_unknown_syntax_falls_back() {
    let body = format!(
        "demo OBJECT IDENTIFIER ::= {{ enterprises 12345 }}\n{}",
        scalar("odd", "FancyThing", "read-only", "demo", 4)
    );
    let out = compile(&mib(&body), &options()).expect("compile");
    let c = &out.artifacts.source;
    assert!(c.contains("{4, SNMP_ASN1_TYPE_INTEGER, SNMP_NODE_INSTANCE_READ_ONLY}, /* odd */"));
    assert!(c.contains("*(u32_t *)value = (u32_t)4;"));
}

#[test]
fn test_header_layout() {
    let out = compile(&mib(ROUND_TRIP), &options()).expect("compile");
    let h = &out.artifacts.header;
    assert!(h.starts_with("#ifndef DEMO_H\n#define DEMO_H\n"));
    assert!(h.contains("#include <string.h>\n"));
    assert!(h.contains("#include \"lwip/apps/snmp_scalar.h\"\n"));
    assert!(h.trim_end().ends_with("#endif /* DEMO_H */"));

    let tree = h.find("extern const struct snmp_tree_node enterprises_root;").expect("tree");
    let array = h.find("extern const struct snmp_scalar_array_node demo_root;").expect("array");
    let mib = h.find("extern const struct snmp_mib demo_mib;").expect("mib");
    let func = h
        .find("s16_t demo_get_value(const struct snmp_scalar_array_node_def *node, void *value);")
        .expect("func");
    assert!(tree < array && array < mib && mib < func);
}

#[test]
fn test_crlf_by_default() {
    let out = compile(&mib(ROUND_TRIP), &GeneratorOptions::new()).expect("compile");
    for text in [&out.artifacts.source, &out.artifacts.header] {
        assert!(text.contains("\r\n"));
        assert!(!text.replace("\r\n", "").contains('\n'));
    }
    assert_eq!(out.artifacts.base_name, "mib");
}

#[test]
fn test_configured_root() {
    let body = "demo OBJECT IDENTIFIER ::= { enterprises 12345 }\nother OBJECT IDENTIFIER ::= { enterprises 7 }\n";
    let out = compile(&mib(body), &options().with_root("other")).expect("compile");
    assert!(out
        .artifacts
        .source
        .contains("const struct snmp_mib other_mib = SNMP_MIB_CREATE(other_oid_arr, &other_root.node);"));

    let err = compile(&mib(body), &options().with_root("nope")).unwrap_err();
    assert!(matches!(err, CompileError::MissingRoot(_)));
    let err = compile(&mib(body), &options().with_root("private")).unwrap_err();
    assert!(matches!(err, CompileError::MissingRoot(_)));
}

#[test]
fn test_missing_root() {
    let err = compile(&mib(""), &options()).unwrap_err();
    assert!(matches!(err, CompileError::MissingRoot(_)));
}

#[test]
fn test_unresolved_parent() {
    let body = "demo OBJECT IDENTIFIER ::= { nowhere 1 }\n";
    match compile(&mib(body), &options()) {
        Err(CompileError::UnresolvedParent { name, parent, line }) => {
            assert_eq!(name, "demo");
            assert_eq!(parent, "nowhere");
            assert_eq!(line, 2);
        }
        other => panic!("expected unresolved parent, got {:?}", other.map(|c| c.module_name)),
    }
}

#[test]
fn test_child_before_parent_is_unresolved() {
    let body = format!(
        "{}demo OBJECT IDENTIFIER ::= {{ enterprises 12345 }}\n",
        scalar("alpha", "INTEGER", "read-only", "demo", 1)
    );
    assert!(matches!(
        compile(&mib(&body), &options()),
        Err(CompileError::UnresolvedParent { .. })
    ));
}

#[test]
fn test_object_under_scalar_is_unclassifiable() {
    let body = format!(
        "demo OBJECT IDENTIFIER ::= {{ enterprises 12345 }}\n{}{}",
        scalar("alpha", "INTEGER", "read-only", "demo", 1),
        scalar("beta", "INTEGER", "read-only", "alpha", 1)
    );
    assert!(matches!(
        compile(&mib(&body), &options()),
        Err(CompileError::Unclassifiable { .. })
    ));
}

#[test]
fn test_table_without_row_is_malformed() {
    let body = "demo OBJECT IDENTIFIER ::= { enterprises 12345 }
demoTable OBJECT-TYPE SYNTAX SEQUENCE OF DemoEntry ACCESS not-accessible STATUS mandatory ::= { demo 1 }
";
    match compile(&mib(body), &options()) {
        Err(CompileError::MalformedTable { name, .. }) => assert_eq!(name, "demoTable"),
        other => panic!("expected malformed table, got {:?}", other.map(|c| c.module_name)),
    }
}

#[test]
fn test_row_outside_table_is_malformed() {
    let body = "demo OBJECT IDENTIFIER ::= { enterprises 12345 }
stray OBJECT-TYPE SYNTAX StrayEntry ACCESS not-accessible STATUS mandatory INDEX { k } ::= { demo 1 }
";
    assert!(matches!(
        compile(&mib(body), &options()),
        Err(CompileError::MalformedTable { .. })
    ));
}

#[test]
fn test_notification_with_unknown_object() {
    let body = "demo OBJECT IDENTIFIER ::= { enterprises 12345 }\nboom NOTIFICATION-TYPE OBJECTS { ghost } STATUS current ::= { demo 1 }\n";
    match compile(&mib(body), &options()) {
        Err(CompileError::UnresolvedObject {
            notification,
            object,
        }) => {
            assert_eq!(notification, "boom");
            assert_eq!(object, "ghost");
        }
        other => panic!("expected unresolved object, got {:?}", other.map(|c| c.module_name)),
    }
}

#[test]
fn test_duplicate_oid_is_dropped() {
    let body = "demo OBJECT IDENTIFIER ::= { enterprises 12345 }\ntwin OBJECT IDENTIFIER ::= { enterprises 12345 }\n";
    let out = compile(&mib(body), &options()).expect("compile");
    assert!(out.registry.lookup("twin").is_none());
    assert_eq!(out.diagnostics[0].kind, DiagnosticKind::DuplicateOid);
    assert!(!out.artifacts.source.contains("twin"));
}

#[test]
fn test_paths_extend_parent_paths() {
    let out = compile(&table_mib("read-write"), &options()).expect("compile");
    for node in out.registry.iter() {
        if let Some(parent) = out.registry.parent_of(node) {
            assert_eq!(node.oid, parent.oid.child(node.sub_id), "{}", node.name);
            assert!(parent.children.contains(&node.oid));
        }
    }
    let kinds: Vec<NodeKind> = ["demoTable", "demoEntry", "demoIndex", "demoName"]
        .iter()
        .map(|n| out.registry.lookup(n).expect("node").kind)
        .collect();
    assert_eq!(
        kinds,
        vec![NodeKind::Table, NodeKind::Row, NodeKind::Column, NodeKind::Column]
    );
}

#[test]
fn test_branch_root_binds_tree_node() {
    let body = format!(
        "demo OBJECT IDENTIFIER ::= {{ enterprises 12345 }}\nsub OBJECT IDENTIFIER ::= {{ demo 2 }}\n{}",
        scalar("alpha", "INTEGER", "read-only", "demo", 1)
    );
    let out = compile(&mib(&body), &options()).expect("compile");
    assert_eq!(out.artifacts.emitted[1].shape, Shape::Branch);
    assert!(out
        .artifacts
        .source
        .contains("const struct snmp_mib demo_mib = SNMP_MIB_CREATE(demo_oid_arr, &demo_root.node);"));
}

#[test]
fn test_notification_under_leaf_is_unclassifiable() {
    let body = format!(
        "demo OBJECT IDENTIFIER ::= {{ enterprises 12345 }}\n{}al NOTIFICATION-TYPE OBJECTS {{ x }} STATUS current ::= {{ x 1 }}\n",
        scalar("x", "INTEGER", "read-only", "demo", 1)
    );
    match compile(&mib(&body), &options()) {
        Err(CompileError::Unclassifiable { name, parent, .. }) => {
            assert_eq!(name, "al");
            assert_eq!(parent, "x");
        }
        other => panic!("expected unclassifiable, got {:?}", other.map(|c| c.module_name)),
    }
}

#[test]
fn test_repeated_notification_object_gets_distinct_field() {
    let body = format!(
        "demo OBJECT IDENTIFIER ::= {{ enterprises 12345 }}\n{}al NOTIFICATION-TYPE OBJECTS {{ x, x }} STATUS current ::= {{ demo 2 }}\n",
        scalar("x", "INTEGER", "read-only", "demo", 1)
    );
    let out = compile(&mib(&body), &options()).expect("compile");
    assert!(out
        .artifacts
        .header
        .contains("struct al_varbinds {\n    s32_t x;\n    s32_t x_1;\n};"));
    let c = &out.artifacts.source;
    assert!(c.contains("memcpy(vb[1]->value, &data->x_1, sizeof(data->x_1));"));
    assert_eq!(c.matches("snmp_varbind_alloc(").count(), 2);
}

#[test]
fn test_trap_call_documents_v2c_trap_oid() {
    let out = compile(&mib(NOTIFY), &options()).expect("compile");
    assert!(out.artifacts.source.contains(
        "/* enterprise OID is the trap path; for v2c lwIP sends snmpTrapOID as 1.3.6.1.4.1.12345.0.1.0.1 */\n        err = snmp_send_trap("
    ));
}

#[test]
fn test_syntax_error_wins_over_earlier_unresolved_parent() {
    // The whole module is parsed before any statement is registered.
    let body = "demo OBJECT IDENTIFIER ::= { nowhere 1 }\nbad OBJECT IDENTIFIER ::= { demo }\n";
    match compile(&mib(body), &options()) {
        Err(CompileError::Syntax { line, .. }) => assert_eq!(line, 3),
        other => panic!("expected syntax error, got {:?}", other.map(|c| c.module_name)),
    }
}
