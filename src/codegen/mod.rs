//! lwIP SNMP glue-code generator.
//!
//! The generator walks the registry depth-first from `enterprises`, children in registration
//! order, and emits one construct per node according to its [`Shape`]. Bodies and node
//! records go to the `.c` artifact in traversal order; every non-static symbol also gets a
//! declaration in the `.h` artifact, so a parent's pointer array may name a child that is
//! defined further down.

mod notification;
mod scalar;
mod table;
mod writer;

pub use writer::CWriter;

use crate::classify::{self, Shape};
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::error::CompileError;
use crate::registry::{Node, NodeKind, Registry};

/// Line terminator of the generated files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    CrLf,
    Lf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::CrLf => "\r\n",
            LineEnding::Lf => "\n",
        }
    }
}

const DEFAULT_INCLUDES: &[&str] = &[
    "<string.h>",
    "lwip/apps/snmp_opts.h",
    "lwip/apps/snmp.h",
    "lwip/apps/snmp_core.h",
    "lwip/apps/snmp_scalar.h",
    "lwip/apps/snmp_table.h",
];

/// Options for code generation.
#[derive(Clone, Debug)]
pub struct GeneratorOptions {
    /// Artifact base name: `<base>.h`, `<base>.c` and the `<BASE>_H` guard.
    pub base_name: String,
    pub line_ending: LineEnding,
    /// Headers included by the declarations artifact. Entries in angle brackets are kept
    /// as written, others are quoted.
    pub includes: Vec<String>,
    /// Node bound by the MIB aggregate. Defaults to the first child of `enterprises`.
    pub root: Option<String>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            base_name: "mib".to_string(),
            line_ending: LineEnding::default(),
            includes: DEFAULT_INCLUDES.iter().map(|s| s.to_string()).collect(),
            root: None,
        }
    }
}

impl GeneratorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_name(mut self, base_name: &str) -> Self {
        self.base_name = base_name.to_string();
        self
    }

    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    /// Replace the include list.
    pub fn with_includes<I, S>(mut self, includes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.includes = includes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_include(mut self, include: &str) -> Self {
        self.includes.push(include.to_string());
        self
    }

    pub fn with_root(mut self, root: &str) -> Self {
        self.root = Some(root.to_string());
        self
    }
}

/// One construct emitted for a node, in traversal order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedNode {
    pub name: String,
    pub shape: Shape,
}

/// Generated files plus what was emitted and any warnings raised while generating.
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub base_name: String,
    pub header: String,
    pub source: String,
    pub emitted: Vec<EmittedNode>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Artifacts {
    pub fn header_file_name(&self) -> String {
        format!("{}.h", self.base_name)
    }

    pub fn source_file_name(&self) -> String {
        format!("{}.c", self.base_name)
    }
}

/// lwIP code generator.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    options: GeneratorOptions,
}

impl Generator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: GeneratorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Generate both artifacts for everything registered under `enterprises`.
    pub fn generate(&self, registry: &Registry) -> Result<Artifacts, CompileError> {
        Emitter::new(registry, &self.options).run()
    }
}

/// C identifier for a MIB name.
pub fn c_ident(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Per-run generation state.
pub(crate) struct Emitter<'a> {
    registry: &'a Registry,
    options: &'a GeneratorOptions,
    body: CWriter,
    /// Notification payload structs, already rendered.
    structs: CWriter,
    node_externs: Vec<String>,
    func_externs: Vec<String>,
    emitted: Vec<EmittedNode>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Emitter<'a> {
    fn new(registry: &'a Registry, options: &'a GeneratorOptions) -> Self {
        Self {
            registry,
            options,
            body: CWriter::new(options.line_ending),
            structs: CWriter::new(options.line_ending),
            node_externs: Vec::new(),
            func_externs: Vec::new(),
            emitted: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Artifacts, CompileError> {
        let registry = self.registry;
        let enterprises = registry
            .enterprises()
            .ok_or_else(|| CompileError::MissingRoot("`enterprises` is not registered".to_string()))?;
        let root = self.mib_root(enterprises)?;

        let base = c_ident(&self.options.base_name);
        self.body.line(&format!("#include \"{}.h\"", base));
        self.body.blank();
        self.body.blank();

        self.visit(enterprises)?;
        self.aggregate(root)?;

        let header = self.header(&base);
        Ok(Artifacts {
            base_name: base,
            header,
            source: self.body.into_string(),
            emitted: self.emitted,
            diagnostics: self.diagnostics,
        })
    }

    /// The node bound by `SNMP_MIB_CREATE`: the configured root, or the first child of
    /// `enterprises`. It must be a branch below `enterprises` so the traversal emits its record.
    fn mib_root(&self, enterprises: &'a Node) -> Result<&'a Node, CompileError> {
        let registry = self.registry;
        let node = match &self.options.root {
            Some(name) => {
                let node = registry.lookup(name).ok_or_else(|| {
                    CompileError::MissingRoot(format!("`{}` is not defined", name))
                })?;
                let below = node.oid.arcs().len() > enterprises.oid.arcs().len()
                    && node.oid.arcs().starts_with(enterprises.oid.arcs());
                if !below {
                    return Err(CompileError::MissingRoot(format!(
                        "`{}` ({}) is not below enterprises",
                        name, node.oid
                    )));
                }
                node
            }
            None => registry.children(enterprises).next().ok_or_else(|| {
                CompileError::MissingRoot("nothing is registered under enterprises".to_string())
            })?,
        };
        if node.kind != NodeKind::Identifier {
            return Err(CompileError::MissingRoot(format!(
                "`{}` is a {}, not a branch",
                node.name, node.kind
            )));
        }
        Ok(node)
    }

    fn visit(&mut self, node: &'a Node) -> Result<(), CompileError> {
        let shape = classify::shape(self.registry, node);
        match shape {
            Shape::ScalarArray => self.scalar_array(node),
            Shape::EmptyBranch => self.empty_branch(node),
            Shape::Branch => {
                self.branch(node)?;
                let registry = self.registry;
                for child in registry.children(node) {
                    self.visit(child)?;
                }
                Ok(())
            }
            Shape::Scalar => self.scalar(node),
            Shape::Table => self.table(node),
            Shape::Row | Shape::Column => Err(CompileError::MalformedTable {
                name: node.name.clone(),
                reason: format!("{} outside of a table", shape),
            }),
            Shape::Notification => self.notification(node),
        }
    }

    fn record(&mut self, node: &Node, shape: Shape) {
        self.emitted.push(EmittedNode {
            name: node.name.clone(),
            shape,
        });
    }

    fn warn(&mut self, node: &Node, kind: DiagnosticKind, message: String) {
        self.diagnostics.push(Diagnostic::new(
            node.location.line,
            node.location.column,
            kind,
            message,
        ));
    }

    fn extern_node(&mut self, c_type: &str, name: &str) {
        self.node_externs
            .push(format!("extern const struct {} {};", c_type, name));
    }

    /// Open a non-static function body and declare it in the header.
    fn open_function(&mut self, signature: &str) {
        self.func_externs.push(format!("{};", signature));
        self.body.line(signature);
        self.body.open("{");
    }

    fn close_function(&mut self) {
        self.body.close("}");
        self.body.blank();
    }

    /// Pointer-array entry referencing a child's `struct snmp_node`.
    fn node_ref(&self, child: &Node) -> Result<String, CompileError> {
        let name = c_ident(&child.name);
        match classify::shape(self.registry, child) {
            Shape::ScalarArray | Shape::Table | Shape::Scalar => {
                Ok(format!("&{}_root.node.node", name))
            }
            Shape::EmptyBranch | Shape::Branch => Ok(format!("&{}_root.node", name)),
            Shape::Notification => Ok("NULL".to_string()),
            shape @ (Shape::Row | Shape::Column) => Err(CompileError::MalformedTable {
                name: child.name.clone(),
                reason: format!("{} outside of a table", shape),
            }),
        }
    }

    fn empty_branch(&mut self, node: &Node) -> Result<(), CompileError> {
        self.record(node, Shape::EmptyBranch);
        let name = c_ident(&node.name);
        self.extern_node("snmp_tree_node", &format!("{}_root", name));
        self.body.line(&format!(
            "static const struct snmp_node *const {}_nodes[] = {{}};",
            name
        ));
        self.body.line(&format!(
            "const struct snmp_tree_node {}_root = SNMP_CREATE_EMPTY_TREE_NODE({});",
            name, node.sub_id
        ));
        self.body.blank();
        Ok(())
    }

    fn branch(&mut self, node: &Node) -> Result<(), CompileError> {
        self.record(node, Shape::Branch);
        let name = c_ident(&node.name);
        let entries = self
            .registry
            .children(node)
            .map(|child| self.node_ref(child).map(|entry| (entry, child.name.clone())))
            .collect::<Result<Vec<_>, CompileError>>()?;

        self.extern_node("snmp_tree_node", &format!("{}_root", name));
        self.body.open(&format!(
            "static const struct snmp_node *const {}_nodes[] = {{",
            name
        ));
        for (entry, child) in entries {
            self.body.line(&format!("{}, /* {} */", entry, child));
        }
        self.body.close("};");
        self.body.line(&format!(
            "const struct snmp_tree_node {}_root = SNMP_CREATE_TREE_NODE({}, {}_nodes);",
            name, node.sub_id, name
        ));
        self.body.blank();
        Ok(())
    }

    /// `SNMP_MIB_CREATE` binding the root's numeric path to its node record.
    fn aggregate(&mut self, root: &Node) -> Result<(), CompileError> {
        let entry = self.node_ref(root)?;
        let name = c_ident(&root.name);
        let arcs = root
            .oid
            .arcs()
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        self.body.line(&format!(
            "static const u32_t {}_oid_arr[] = {{ {} }};",
            name, arcs
        ));
        self.body.line(&format!(
            "const struct snmp_mib {}_mib = SNMP_MIB_CREATE({}_oid_arr, {});",
            name, name, entry
        ));
        self.extern_node("snmp_mib", &format!("{}_mib", name));
        Ok(())
    }

    fn header(&self, base: &str) -> String {
        let guard = format!("{}_H", base.to_ascii_uppercase());
        let mut h = CWriter::new(self.options.line_ending);
        h.line(&format!("#ifndef {}", guard));
        h.line(&format!("#define {}", guard));
        h.blank();
        if !self.options.includes.is_empty() {
            for include in &self.options.includes {
                if include.starts_with('<') {
                    h.line(&format!("#include {}", include));
                } else {
                    h.line(&format!("#include \"{}\"", include));
                }
            }
            h.blank();
        }
        h.push_raw(self.structs.as_str());
        for decl in &self.node_externs {
            h.line(decl);
        }
        h.blank();
        for decl in &self.func_externs {
            h.line(decl);
        }
        h.blank();
        h.line(&format!("#endif /* {} */", guard));
        h.into_string()
    }
}
