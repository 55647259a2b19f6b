use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for serenpaths")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run fmt, clippy, tests and doc in order
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy with warnings denied
    Clippy,
    /// Run all tests
    Test,
    /// Build rustdoc for the workspace
    Doc,
    /// Build the entire workspace
    Build,
    /// Drive the CLI offline against a scratch data directory
    Smoke,
}

const SMOKE_DIR: &str = "target/smoke-data";

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            for step in [fmt, clippy, test, doc] {
                step()?;
            }
        }
        Commands::Fmt => fmt()?,
        Commands::Clippy => clippy()?,
        Commands::Test => test()?,
        Commands::Doc => doc()?,
        Commands::Build => cargo("build", &["build", "--workspace"])?,
        Commands::Smoke => smoke()?,
    }

    Ok(())
}

fn cargo(label: &str, args: &[&str]) -> Result<()> {
    println!("==> cargo {label}");
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        bail!("cargo {label} failed ({status})");
    }
    Ok(())
}

fn fmt() -> Result<()> {
    cargo("fmt", &["fmt", "--all", "--", "--check"])
}

fn clippy() -> Result<()> {
    cargo(
        "clippy",
        &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
    )
}

fn test() -> Result<()> {
    cargo("test", &["test", "--workspace"])
}

fn doc() -> Result<()> {
    cargo("doc", &["doc", "--workspace", "--no-deps"])
}

fn smoke() -> Result<()> {
    if std::path::Path::new(SMOKE_DIR).exists() {
        std::fs::remove_dir_all(SMOKE_DIR)?;
    }
    let runs: [&[&str]; 6] = [
        &["onboard", "--level", "1", "--avoid", "Social"],
        &["challenge", "--accept"],
        &["journal", "Evening walk", "--category", "Nature & Outdoor"],
        &["list"],
        &["stats"],
        &["scene"],
    ];
    for run in runs {
        let mut args = vec![
            "run",
            "-q",
            "-p",
            "serenpaths-cli",
            "--",
            "--offline",
            "--data-dir",
            SMOKE_DIR,
        ];
        args.extend_from_slice(run);
        cargo(&format!("smoke {}", run[0]), &args)?;
    }
    Ok(())
}
