use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about = "Project automation commands", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the test suite with cargo nextest, or cargo test when nextest is missing
    Test {
        #[arg(long)]
        profile: Option<String>,
        #[arg(long)]
        release: bool,
    },
    /// Check formatting and clippy lints
    Lint,
    /// Write shell completion scripts for bookmr into a directory
    Completions {
        #[arg(long, default_value = "target/completions")]
        out_dir: PathBuf,
    },
}

const SHELLS: &[(&str, &str)] = &[
    ("bash", "bookmr.bash"),
    ("zsh", "_bookmr"),
    ("fish", "bookmr.fish"),
    ("powershell", "_bookmr.ps1"),
];

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Test { profile, release } => run_tests(profile, release)?,
        Commands::Lint => run_lint()?,
        Commands::Completions { out_dir } => write_completions(&out_dir)?,
    }
    Ok(())
}

fn run_tests(profile: Option<String>, release: bool) -> Result<()> {
    let nextest = Command::new("cargo")
        .args(["nextest", "--version"])
        .output()
        .is_ok_and(|out| out.status.success());

    let mut cmd = Command::new("cargo");
    if nextest {
        cmd.arg("nextest").arg("run").arg("--workspace");
        if let Some(profile) = profile {
            cmd.arg("--profile").arg(profile);
        }
    } else {
        cmd.arg("test").arg("--workspace");
    }
    if release {
        cmd.arg("--release");
    }
    cargo(cmd, "tests")
}

fn run_lint() -> Result<()> {
    let mut fmt = Command::new("cargo");
    fmt.args(["fmt", "--all", "--", "--check"]);
    cargo(fmt, "cargo fmt")?;

    let mut clippy = Command::new("cargo");
    clippy.args(["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"]);
    cargo(clippy, "cargo clippy")
}

fn write_completions(out_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    for (shell, file) in SHELLS {
        let output = Command::new("cargo")
            .args(["run", "--quiet", "-p", "bookmr", "--", "completions", shell])
            .output()
            .with_context(|| format!("failed to run bookmr for {shell}"))?;
        if !output.status.success() {
            anyhow::bail!(
                "bookmr completions {shell} failed:\n{}",
                String::from_utf8_lossy(&output.stderr)
            );
        }
        let path = out_dir.join(file);
        std::fs::write(&path, output.stdout)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(())
}

fn cargo(mut cmd: Command, what: &str) -> Result<()> {
    let status = cmd.status()?;
    if !status.success() {
        anyhow::bail!("{what} failed");
    }
    Ok(())
}
