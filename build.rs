//! Stages the `memory.x` linker script for embedded ARM builds.
//!
//! Host builds only need the library, so this just places the script on the
//! linker search path; the target-specific `-Tlink.x` flags live in
//! `.cargo/config.toml` and never apply to the host.

use std::env;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

fn main() {
    let out = PathBuf::from(env::var_os("OUT_DIR").unwrap());
    File::create(out.join("memory.x"))
        .unwrap()
        .write_all(include_bytes!("memory.x"))
        .unwrap();
    println!("cargo:rustc-link-search={}", out.display());
    println!("cargo:rerun-if-changed=memory.x");
}
