//! Git integration utilities.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::domain::errors::ConvertError;
use crate::domain::model::Origin;

const ORIGIN_REMOTE: &str = "origin";

/// Messages git prints when the `origin` remote does not exist. Older releases report it
/// as fatal, newer ones (2.26+) as an error.
const NO_ORIGIN_MESSAGES: &[&str] = &[
    "fatal: No such remote 'origin'",
    "error: No such remote 'origin'",
];

/// Looks up the upstream remote of a local checkout.
pub trait OriginInspector {
    fn origin_of(&self, repo_path: &Path) -> Result<Origin, ConvertError>;
}

/// Inspector shelling out to the `git` executable.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: PathBuf,
}

impl GitCli {
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("git"),
        }
    }

    /// Use a specific git executable instead of the one on `PATH`.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl GitCli {
    /// `git remote get-url origin` in `repo_path`, pinned to the C locale so the
    /// missing-remote message is never translated.
    fn remote_url_command(&self, repo_path: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(["remote", "get-url", ORIGIN_REMOTE])
            .current_dir(repo_path)
            .env("LC_ALL", "C");
        command
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl OriginInspector for GitCli {
    fn origin_of(&self, repo_path: &Path) -> Result<Origin, ConvertError> {
        let output = self
            .remote_url_command(repo_path)
            .output()
            .map_err(|err| spawn_failure(repo_path, &self.program, err))?;

        if output.status.success() {
            let url = String::from_utf8_lossy(&output.stdout).trim().to_owned();
            return Ok(Origin::Found(url));
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        if NO_ORIGIN_MESSAGES.contains(&stderr) {
            tracing::debug!(path = %repo_path.display(), "repository has no origin remote");
            return Ok(Origin::Absent);
        }

        Err(ConvertError::OriginInspection {
            path: repo_path.to_path_buf(),
            detail: if stderr.is_empty() {
                format!("git exited with {}", output.status)
            } else {
                stderr.to_owned()
            },
        })
    }
}

fn spawn_failure(repo_path: &Path, program: &Path, err: io::Error) -> ConvertError {
    ConvertError::OriginInspection {
        path: repo_path.to_path_buf(),
        detail: format!("failed to run {}: {err}", program.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn git_available() -> bool {
        Command::new("git")
            .arg("--version")
            .output()
            .is_ok_and(|out| out.status.success())
    }

    fn git(dir: &Path, args: &[&str]) {
        let output = Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .unwrap_or_else(|e| panic!("failed to run `git {args:?}`: {e}"));
        assert!(
            output.status.success(),
            "`git {args:?}` failed:\n{}",
            String::from_utf8_lossy(&output.stderr)
        );
    }

    #[test]
    fn reports_configured_origin() -> anyhow::Result<()> {
        if !git_available() {
            return Ok(());
        }
        let temp = tempfile::tempdir()?;
        git(temp.path(), &["init", "--quiet"]);
        git(
            temp.path(),
            &["remote", "add", "origin", "git@host:org/repo.git"],
        );

        let origin = GitCli::new().origin_of(temp.path())?;
        assert_eq!(origin, Origin::Found("git@host:org/repo.git".into()));
        Ok(())
    }

    #[test]
    fn missing_origin_is_not_an_error() -> anyhow::Result<()> {
        if !git_available() {
            return Ok(());
        }
        let temp = tempfile::tempdir()?;
        git(temp.path(), &["init", "--quiet"]);

        assert_eq!(GitCli::new().origin_of(temp.path())?, Origin::Absent);
        Ok(())
    }

    #[test]
    fn non_repository_fails() -> anyhow::Result<()> {
        if !git_available() {
            return Ok(());
        }
        let temp = tempfile::tempdir()?;
        let err = GitCli::new()
            .origin_of(temp.path())
            .expect_err("not a repository");
        assert!(matches!(err, ConvertError::OriginInspection { .. }));
        Ok(())
    }

    #[test]
    fn missing_executable_fails() {
        let err = GitCli::with_program("definitely-not-git-bookmr")
            .origin_of(Path::new("."))
            .expect_err("spawn failure");
        assert!(err.to_string().contains("failed to run"));
    }

    #[test]
    fn inspection_runs_in_c_locale() {
        let command = GitCli::new().remote_url_command(Path::new("."));
        let locale = command
            .get_envs()
            .find(|(key, _)| *key == "LC_ALL")
            .and_then(|(_, value)| value);
        assert_eq!(locale, Some(std::ffi::OsStr::new("C")));
    }

    #[cfg(unix)]
    #[test]
    fn translated_git_still_reports_missing_origin() -> anyhow::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        // Stands in for a git that speaks German unless forced into the C locale.
        let temp = tempfile::tempdir()?;
        let program = temp.path().join("git");
        std::fs::write(
            &program,
            "#!/bin/sh\n\
             if [ \"$LC_ALL\" = C ]; then\n\
             \techo \"error: No such remote 'origin'\" >&2\n\
             else\n\
             \techo \"Fehler: Kein solches Remote-Repository: 'origin'\" >&2\n\
             fi\n\
             exit 2\n",
        )?;
        std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755))?;

        let origin = GitCli::with_program(&program).origin_of(temp.path())?;
        assert_eq!(origin, Origin::Absent);
        Ok(())
    }
}
