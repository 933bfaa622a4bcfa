//! Artifact naming and file output.

use crate::codegen::{Artifacts, GeneratorOptions};
use crate::error::CompileError;
use crate::{compile, Compilation};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Base name for the artifacts of `input`: file name up to its first `.`, `-` mapped to `_`.
pub fn artifact_base_name(input: &Path) -> String {
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = file_name.split('.').next().unwrap_or_default();
    if stem.is_empty() {
        "mib".to_string()
    } else {
        stem.replace('-', "_")
    }
}

/// Paths of the two files written for one compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenArtifacts {
    pub header: PathBuf,
    pub source: PathBuf,
}

/// Write `<base>.h` and `<base>.c` into `dir`. Both files are open only for the duration
/// of this call.
pub fn write_artifacts(dir: &Path, artifacts: &Artifacts) -> Result<WrittenArtifacts, CompileError> {
    let header = dir.join(artifacts.header_file_name());
    let source = dir.join(artifacts.source_file_name());
    let mut header_out = BufWriter::new(File::create(&header).map_err(|e| CompileError::io(&header, e))?);
    let mut source_out = BufWriter::new(File::create(&source).map_err(|e| CompileError::io(&source, e))?);
    write_all(&mut header_out, &header, &artifacts.header)?;
    write_all(&mut source_out, &source, &artifacts.source)?;
    Ok(WrittenArtifacts { header, source })
}

fn write_all(out: &mut BufWriter<File>, path: &Path, text: &str) -> Result<(), CompileError> {
    out.write_all(text.as_bytes())
        .and_then(|_| out.flush())
        .map_err(|e| CompileError::io(path, e))
}

/// Read `input`, compile it and write the artifacts next to it.
///
/// The artifact base name always comes from the input path; the other options are used
/// as given. Nothing is written when reading or compiling fails.
pub fn compile_file(
    input: &Path,
    options: &GeneratorOptions,
) -> Result<(Compilation, WrittenArtifacts), CompileError> {
    let source = std::fs::read_to_string(input).map_err(|e| CompileError::io(input, e))?;
    let options = options
        .clone()
        .with_base_name(&artifact_base_name(input));
    let compilation = compile(&source, &options)?;
    let dir = match input.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let written = write_artifacts(dir, &compilation.artifacts)?;
    Ok((compilation, written))
}
