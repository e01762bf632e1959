//! Command-line interface.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::app::convert::{ConvertOptions, Converter};
use crate::infra::config::Config;
use crate::infra::git::GitCli;
use crate::infra::paths;
use crate::infra::source::{BookmarkSource, BookmarksFile};
use crate::infra::writer;

#[derive(Debug, Parser)]
#[command(
    name = "bookmr",
    version,
    about = "Generate a myrepos config from SourceTree bookmarks"
)]
pub struct Cli {
    /// Path to the SourceTree bookmarks file
    #[arg(long, value_name = "PATH")]
    pub bookmarks: Option<PathBuf>,

    /// Whether to define the myrepos update command to rebase by default
    #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
    pub default_rebase: Option<bool>,

    /// Whether to define the myrepos repo paths relative to the config file
    #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
    pub config_relative_repo_paths: Option<bool>,

    /// Path to write the myrepos config file to
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Additional TOML config file layered over the user config
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (repeatable)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print shell completions to stdout
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Fold command-line flags over the loaded configuration.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(path) = &self.bookmarks {
            config.set_bookmarks(path.display().to_string());
        }
        if let Some(path) = &self.output {
            config.set_output_path(path.display().to_string());
        }
        if let Some(enabled) = self.default_rebase {
            config.set_default_rebase(enabled);
        }
        if let Some(enabled) = self.config_relative_repo_paths {
            config.set_relative_repo_paths(enabled);
        }
    }
}

/// Execute the parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    if let Some(Commands::Completions { shell }) = cli.command {
        let mut command = Cli::command();
        clap_complete::generate(shell, &mut command, "bookmr", &mut io::stdout());
        return Ok(());
    }

    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply_to(&mut config);
    convert(&config)
}

/// Read the bookmarks named by `config` and write the myrepos config it describes.
pub fn convert(config: &Config) -> Result<()> {
    let bookmarks = config.source.bookmarks();
    let root = BookmarksFile::new(&bookmarks).load()?;

    let output = config.output.path();
    let mut out = writer::create_output(&output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    let output_abs = paths::absolutize(&output)
        .with_context(|| format!("failed to resolve {}", output.display()))?;

    let inspector = GitCli::with_program(config.git.program());
    let options = ConvertOptions::from_config(config, &output_abs);
    let summary = Converter::new(&inspector, options)
        .run(&root, &mut out)
        .with_context(|| format!("failed to generate {}", output.display()))?;

    tracing::info!(
        output = %output.display(),
        repositories = summary.repositories,
        without_origin = summary.without_origin,
        host_restricted = summary.host_restricted,
        "wrote myrepos config"
    );
    Ok(())
}
