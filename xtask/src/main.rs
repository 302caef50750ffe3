//! Project automation tasks.
//!
//! Run via `cargo xtask <command>`.

use std::{path::PathBuf, process};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use xshell::{Shell, cmd};

/// Package holding the library, its benches and its examples.
const PACKAGE: &str = "scanpoint";

/// Command line interface for the `xtask` helper.
#[derive(Debug, Parser)]
#[command(name = "xtask")]
struct Cli {
    /// Task to run.
    #[command(subcommand)]
    command: CommandName,
}

/// Supported automation commands.
#[derive(Debug, Subcommand)]
enum CommandName {
    /// Format the workspace and run the linter.
    Tidy,
    /// Run tests using cargo nextest, then the doc tests.
    Test,
    /// Run the criterion benchmarks.
    Bench {
        /// Only run benchmarks whose name contains this filter.
        filter: Option<String>,
    },
    /// Run the masked snake grid example with debug logging.
    Demo {
        /// Log filter passed through `RUST_LOG`.
        #[arg(long, default_value = "scanpoint=debug")]
        log: String,
    },
}

/// Repository root computed relative to the `xtask` crate.
fn repo_root() -> Result<PathBuf> {
    let xtask_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    Ok(xtask_dir
        .parent()
        .context("xtask crate must live at <repo>/xtask")?
        .to_path_buf())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        process::exit(1);
    }
}

/// Dispatch the selected `xtask` command.
fn run() -> Result<()> {
    let cli = Cli::parse();
    let sh = repo_shell()?;

    match cli.command {
        CommandName::Tidy => tidy(&sh),
        CommandName::Test => test(&sh),
        CommandName::Bench { filter } => bench(&sh, filter.as_deref()),
        CommandName::Demo { log } => demo(&sh, &log),
    }
}

/// Run `cargo fmt` and the workspace linter.
fn tidy(sh: &Shell) -> Result<()> {
    cmd!(sh, "cargo +nightly fmt --all").run()?;
    cmd!(
        sh,
        "cargo clippy -q --fix --all --all-targets --all-features --allow-dirty --tests --examples"
    )
    .run()?;
    cmd!(sh, "cargo +nightly fmt --all").run()?;
    Ok(())
}

/// Run unit, integration and property tests, then the doc tests nextest
/// skips.
fn test(sh: &Shell) -> Result<()> {
    cmd!(sh, "cargo nextest run --all").run()?;
    cmd!(sh, "cargo test --doc -p {PACKAGE}").run()?;
    Ok(())
}

/// Run the benchmarks, optionally filtered.
fn bench(sh: &Shell, filter: Option<&str>) -> Result<()> {
    let filter: Vec<&str> = filter.into_iter().collect();
    cmd!(sh, "cargo bench -p {PACKAGE} --bench compound -- {filter...}").run()?;
    Ok(())
}

/// Run the example program with logging enabled.
fn demo(sh: &Shell, log: &str) -> Result<()> {
    let _env = sh.push_env("RUST_LOG", log);
    cmd!(sh, "cargo run -q -p {PACKAGE} --example grid").run()?;
    Ok(())
}

/// Create a shell rooted at the repository root.
fn repo_shell() -> Result<Shell> {
    let sh = Shell::new()?;
    sh.change_dir(repo_root()?);
    Ok(sh)
}
