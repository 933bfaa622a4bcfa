//! Compiler fuzz target: feed arbitrary text to the MIB parser and the full pipeline.
//! Neither may panic; both return Ok or a CompileError.
//! Build with: cargo fuzz run parser_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let s = match std::str::from_utf8(data) {
        Ok(x) => x,
        Err(_) => return,
    };
    if mibgen::parse(s).is_ok() {
        let _ = mibgen::compile(s, &mibgen::GeneratorOptions::new());
    }
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run parser_fuzz");
}
