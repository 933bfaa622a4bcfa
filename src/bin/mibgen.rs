//! Compile an SNMP MIB module into lwIP glue code.
//!
//! Usage:
//!   mibgen FILE
//!
//! Writes `<base>.h` and `<base>.c` next to FILE, where `<base>` is the file name up to its
//! first `.` with `-` replaced by `_`. Prints one line per emitted construct, then any
//! warnings on stderr as `FILE:line:col: warning: message [rule]`.

use mibgen::{compile_file, Diagnostic, GeneratorOptions};
use std::path::Path;

fn print_diagnostic(path: &str, d: &Diagnostic) {
    eprintln!(
        "{}:{}:{}: warning: {} [{}]",
        path,
        d.line,
        d.column,
        d.message,
        d.kind.id()
    );
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() != 1 {
        eprintln!("usage: mibgen <mib-file>");
        std::process::exit(2);
    }
    let input = Path::new(&args[0]);
    let display_path = input.display().to_string();

    let (compilation, written) = match compile_file(input, &GeneratorOptions::new()) {
        Ok(done) => done,
        Err(e) => {
            eprintln!("{}: {}", display_path, e);
            std::process::exit(1);
        }
    };

    for node in &compilation.artifacts.emitted {
        println!("{}: {}", node.shape, node.name);
    }
    for d in &compilation.diagnostics {
        print_diagnostic(&display_path, d);
    }
    if !compilation.diagnostics.is_empty() {
        eprintln!("mibgen: {} warning(s)", compilation.diagnostics.len());
    }
    println!(
        "wrote {} and {}",
        written.header.display(),
        written.source.display()
    );
    Ok(())
}
