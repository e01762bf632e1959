//! Configuration management utilities.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs_next::config_dir;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::infra::paths;

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));

/// Layered configuration loaded from defaults, user config, an explicit file, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub source: Source,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub git: Git,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Source {
    #[serde(default)]
    bookmarks: Option<String>,
}

impl Source {
    /// Bookmarks file to read, falling back to the platform default.
    pub fn bookmarks(&self) -> PathBuf {
        self.bookmarks
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(paths::default_bookmarks_path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    default_rebase: Option<bool>,
    #[serde(default)]
    relative_repo_paths: Option<bool>,
}

impl Output {
    fn default_path() -> &'static str {
        ".mrconfig"
    }

    pub fn path(&self) -> PathBuf {
        PathBuf::from(self.path.as_deref().unwrap_or(Self::default_path()))
    }

    pub fn default_rebase(&self) -> bool {
        self.default_rebase.unwrap_or(true)
    }

    pub fn relative_repo_paths(&self) -> bool {
        self.relative_repo_paths.unwrap_or(true)
    }
}

impl Default for Output {
    fn default() -> Self {
        Self {
            path: Some(Self::default_path().to_owned()),
            default_rebase: Some(true),
            relative_repo_paths: Some(true),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Git {
    #[serde(default)]
    program: Option<String>,
}

impl Git {
    fn default_program() -> &'static str {
        "git"
    }

    /// Executable used to inspect checkouts.
    pub fn program(&self) -> &str {
        self.program.as_deref().unwrap_or(Self::default_program())
    }
}

impl Default for Git {
    fn default() -> Self {
        Self {
            program: Some(Self::default_program().to_owned()),
        }
    }
}

/// Environment overrides for the most commonly scripted settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    bookmarks: Option<String>,
    output: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            bookmarks: env::var("BOOKMR_BOOKMARKS").ok(),
            output: env::var("BOOKMR_OUTPUT").ok(),
        }
    }

    #[cfg(test)]
    fn for_tests(bookmarks: &str, output: &str) -> Self {
        Self {
            bookmarks: Some(bookmarks.to_owned()),
            output: Some(output.to_owned()),
        }
    }
}

impl Config {
    /// Load configuration from defaults, the user config, an optional explicit file, and env.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit
            && !path.exists()
        {
            anyhow::bail!("config file not found: {}", path.display());
        }
        Self::load_with_layers(
            global_config_path(),
            explicit.map(Path::to_path_buf),
            EnvOverrides::from_env(),
        )
    }

    fn load_with_layers(
        global: Option<PathBuf>,
        explicit: Option<PathBuf>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut layers: Vec<Config> = Vec::new();

        layers.push(Self::from_str(&DEFAULT_CONFIG)?);

        if let Some(global_path) = global.filter(|path| path.exists()) {
            tracing::debug!(path = %global_path.display(), "loading user config");
            layers.push(Self::from_file(&global_path)?);
        }

        if let Some(explicit_path) = explicit.filter(|path| path.exists()) {
            layers.push(Self::from_file(&explicit_path)?);
        }

        let merged = layers.into_iter().reduce(Config::merge).unwrap_or_default();
        Ok(apply_env_overrides(merged, env_overrides))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data)
            .with_context(|| format!("invalid config file: {}", path.display()))
    }

    fn from_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    fn merge(self, other: Self) -> Self {
        Self {
            source: Source {
                bookmarks: other.source.bookmarks.or(self.source.bookmarks),
            },
            output: merge_output(self.output, other.output),
            git: Git {
                program: other.git.program.or(self.git.program),
            },
        }
    }

    pub fn set_bookmarks(&mut self, path: impl Into<String>) {
        self.source.bookmarks = Some(path.into());
    }

    pub fn set_output_path(&mut self, path: impl Into<String>) {
        self.output.path = Some(path.into());
    }

    pub fn set_default_rebase(&mut self, enabled: bool) {
        self.output.default_rebase = Some(enabled);
    }

    pub fn set_relative_repo_paths(&mut self, enabled: bool) {
        self.output.relative_repo_paths = Some(enabled);
    }
}

fn merge_output(mut base: Output, overlay: Output) -> Output {
    if let Some(value) = overlay.path {
        base.path = Some(value);
    }
    if let Some(value) = overlay.default_rebase {
        base.default_rebase = Some(value);
    }
    if let Some(value) = overlay.relative_repo_paths {
        base.relative_repo_paths = Some(value);
    }
    base
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("bookmr/config.toml"))
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Config {
    if let Some(bookmarks) = env.bookmarks {
        config.set_bookmarks(bookmarks);
    }
    if let Some(output) = env.output {
        config.set_output_path(output);
    }
    config
}
