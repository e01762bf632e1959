//! Platform paths and lexical path arithmetic.

use std::env;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::domain::errors::ConvertError;

const BOOKMARKS_FILE: &str = "Bookmarks.xml";

/// Where SourceTree keeps its bookmarks on this platform.
///
/// Only the Windows client stores them as XML under a well-known directory. Elsewhere the
/// caller is expected to export the file and point at it explicitly, so the default is
/// `Bookmarks.xml` in the working directory.
pub fn default_bookmarks_path() -> PathBuf {
    if cfg!(windows)
        && let Some(local) = dirs_next::data_local_dir()
    {
        return local
            .join("Atlassian")
            .join("SourceTree")
            .join(BOOKMARKS_FILE);
    }
    PathBuf::from(BOOKMARKS_FILE)
}

/// Resolve `path` against the working directory without touching the filesystem.
pub fn absolutize(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(clean(path));
    }
    Ok(clean(&env::current_dir()?.join(path)))
}

/// Lexically normalize a path: drop `.` segments and fold `..` into the preceding segment.
///
/// Leading `..` segments of a relative path are kept; `..` directly under the root is
/// dropped.
pub fn clean(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}

/// Express `target` relative to the directory `base`.
///
/// Both paths are cleaned first, and on Windows components are compared ignoring ASCII
/// case. Fails when one path is absolute and the other is not, when they live under
/// different prefixes (drives), or when `base` climbs above the shared ancestor with
/// `..` segments that cannot be inverted.
pub fn relative_to(base: &Path, target: &Path) -> Result<PathBuf, ConvertError> {
    let failure = || ConvertError::PathRelativization {
        base: base.to_path_buf(),
        target: target.to_path_buf(),
    };

    let base_clean = clean(base);
    let target_clean = clean(target);
    if base_clean.is_absolute() != target_clean.is_absolute()
        || base_clean.has_root() != target_clean.has_root()
    {
        return Err(failure());
    }

    let base_parts = meaningful_components(&base_clean);
    let target_parts = meaningful_components(&target_clean);

    let same_prefix = match (prefix_of(&base_parts), prefix_of(&target_parts)) {
        (Some(a), Some(b)) => same_component(&a, &b),
        (a, b) => a == b,
    };
    if !same_prefix {
        return Err(failure());
    }

    let shared = base_parts
        .iter()
        .zip(&target_parts)
        .take_while(|(a, b)| same_component(a, b))
        .count();

    let mut relative = PathBuf::new();
    for component in &base_parts[shared..] {
        if matches!(component, Component::ParentDir) {
            return Err(failure());
        }
        relative.push("..");
    }
    for component in &target_parts[shared..] {
        relative.push(component.as_os_str());
    }

    if relative.as_os_str().is_empty() {
        relative.push(".");
    }
    Ok(relative)
}

fn meaningful_components(path: &Path) -> Vec<Component<'_>> {
    path.components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect()
}

fn same_component(a: &Component<'_>, b: &Component<'_>) -> bool {
    if cfg!(windows) {
        a.as_os_str().eq_ignore_ascii_case(b.as_os_str())
    } else {
        a == b
    }
}

fn prefix_of<'a>(parts: &[Component<'a>]) -> Option<Component<'a>> {
    parts
        .first()
        .copied()
        .filter(|component| matches!(component, Component::Prefix(_)))
}
