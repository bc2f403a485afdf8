//! Renders `oneprovider.1` into `OUT_DIR` from the clap command tree.

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::CommandFactory;
use clap_mangen::Man;

#[path = "src/cli/mod.rs"]
mod cli;

use cli::Cli;

const PAGE_NAME: &str = "oneprovider.1";

/// Files whose contents end up in the rendered page. `Cargo.toml` supplies
/// the version and description that clap reads through `CARGO_PKG_*`.
const PAGE_INPUTS: [&str; 3] = ["build.rs", "src/cli/mod.rs", "Cargo.toml"];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout = io::stdout().lock();
    for input in PAGE_INPUTS {
        writeln!(stdout, "cargo:rerun-if-changed={input}")?;
    }

    let out_dir = env::var_os("OUT_DIR")
        .map(PathBuf::from)
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "OUT_DIR was not set"))?;

    let command = Cli::command().version(env!("CARGO_PKG_VERSION"));
    let mut page = Vec::new();
    Man::new(command)
        .section("1")
        .source(concat!("oneprovider ", env!("CARGO_PKG_VERSION")))
        .manual("OneProvider Manual")
        .render(&mut page)?;

    fs::write(out_dir.join(PAGE_NAME), page)?;
    Ok(())
}
