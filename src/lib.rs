//! # mibgen — SNMP MIB to lwIP glue-code compiler
//!
//! Compiles one SMI module (module identity, object identifiers, scalar and table objects,
//! notifications) into a C header and source file implementing those objects against the
//! lwIP SNMP agent API.
//!
//! ## Pipeline
//!
//! - **Parser** ([`parser`]): pest grammar; each recognized statement is handed to a
//!   [`StatementSink`] in file order.
//! - **Registry** ([`registry`]): resolves `::= { parent n }` to a numeric OID, links the
//!   node under its parent and classifies it. Parents must be defined before children.
//! - **Generator** ([`codegen`]): depth-first walk from `enterprises`, one construct per node
//!   shape (scalar array, tree, scalar, table, notification).
//!
//! ## Example MIB
//!
//! ```text
//! DEMO-MIB DEFINITIONS ::= BEGIN
//!   demo OBJECT IDENTIFIER ::= { enterprises 12345 }
//!   temp OBJECT-TYPE
//!     SYNTAX INTEGER
//!     ACCESS read-only
//!     STATUS mandatory
//!     ::= { demo 1 }
//! END
//! ```
//!
//! ## Usage
//!
//! ```no_run
//! use mibgen::{compile, GeneratorOptions};
//!
//! let source = std::fs::read_to_string("DEMO-MIB.txt")?;
//! let out = compile(&source, &GeneratorOptions::new().with_base_name("demo"))?;
//! std::fs::write("demo.c", &out.artifacts.source)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod ast;
pub mod classify;
pub mod codegen;
pub mod diagnostic;
pub mod error;
pub mod output;
pub mod parser;
pub mod registry;
pub mod runtime;

pub use ast::{Access, MibModule, Statement, Syntax};
pub use classify::Shape;
pub use codegen::{Artifacts, EmittedNode, Generator, GeneratorOptions, LineEnding};
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use error::CompileError;
pub use output::{artifact_base_name, compile_file, write_artifacts, WrittenArtifacts};
pub use parser::{parse, parse_with, StatementSink};
pub use registry::{Node, NodeKind, Oid, Registry};

/// Result of compiling one module.
#[derive(Debug, Clone)]
pub struct Compilation {
    /// Name before `DEFINITIONS`.
    pub module_name: String,
    pub registry: Registry,
    pub artifacts: Artifacts,
    /// Registration warnings followed by generation warnings.
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse, register and generate in one pass.
pub fn compile(source: &str, options: &GeneratorOptions) -> Result<Compilation, CompileError> {
    let mut registry = Registry::new();
    let module_name = parser::parse_with(source, &mut registry)?;
    let mut diagnostics = registry.take_diagnostics();
    let artifacts = Generator::with_options(options.clone()).generate(&registry)?;
    diagnostics.extend(artifacts.diagnostics.iter().cloned());
    Ok(Compilation {
        module_name,
        registry,
        artifacts,
        diagnostics,
    })
}
