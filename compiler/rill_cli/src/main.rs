//! Rill language command-line compiler
//!
//! Reads Rill source files, lowers them to LIR, and writes the textual IR
//! to stdout or a file. One module is produced per input file; modules are
//! emitted in argument order.

use anyhow::{Context as _, Result};
use clap::Parser;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

/// The Rill language compiler
#[derive(Parser)]
#[command(name = "rillc")]
#[command(about = "The Rill programming language compiler")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Rill source files to compile
    #[arg(value_name = "FILE", required = true)]
    inputs: Vec<PathBuf>,

    /// Write the LIR to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Dump each function's control-flow graph in dot form to stderr
    #[arg(long)]
    emit_cfg: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let mut ctx = rill_lir::Context::new(Vec::new());
    for path in &cli.inputs {
        let source = fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let file = rill_syntax::parse_source(&source)
            .map_err(|err| anyhow::anyhow!("{}: {}", path.display(), err))?;
        let mut notices = rill_common::Notices::new();
        let module = rill_codegen::compile(&file, &mut notices)
            .map_err(|err| anyhow::anyhow!("{}: {}", path.display(), err))?;
        for notice in &notices {
            eprintln!("{}: {}", path.display(), notice);
        }
        log::debug!("compiled {} as module {}", path.display(), module.name());

        if cli.emit_cfg {
            let mut stderr = io::stderr().lock();
            for function in module.functions() {
                function.write_cfg_dot(&mut stderr)?;
            }
        }
        ctx.add_module(module);
    }

    ctx.emit()?;
    let text = ctx.into_writer();
    match &cli.output {
        Some(path) => fs::write(path, text)
            .with_context(|| format!("cannot write {}", path.display()))?,
        None => io::stdout().write_all(&text)?,
    }
    Ok(())
}
