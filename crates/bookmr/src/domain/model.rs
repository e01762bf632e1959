//! Domain models for bookmark trees and generated config sections.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A node of the bookmark tree as exported by the repository browser.
///
/// Leaves reference a local checkout through `path` and `repo_kind`. Interior nodes are
/// folders and only carry `children`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkNode {
    #[serde(default)]
    pub is_leaf: bool,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub repo_kind: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub children: Vec<BookmarkNode>,
}

impl BookmarkNode {
    /// Build a folder node holding `children`.
    pub fn folder(name: impl Into<String>, children: Vec<BookmarkNode>) -> Self {
        Self {
            is_leaf: false,
            name: name.into(),
            children,
            ..Self::default()
        }
    }

    /// Build a leaf node pointing at a local checkout.
    pub fn leaf(
        name: impl Into<String>,
        repo_kind: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            is_leaf: true,
            name: name.into(),
            repo_kind: repo_kind.into(),
            path: path.into(),
            children: Vec::new(),
        }
    }
}

/// Flattened projection of a leaf [`BookmarkNode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafBookmark {
    pub name: String,
    pub repo_kind: String,
    pub path: PathBuf,
}

impl From<&BookmarkNode> for LeafBookmark {
    fn from(node: &BookmarkNode) -> Self {
        Self {
            name: node.name.clone(),
            repo_kind: node.repo_kind.clone(),
            path: PathBuf::from(&node.path),
        }
    }
}

/// Host restriction embedded in a bookmark's display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipDirective {
    pub host: String,
    /// `true` skips the repository on `host`, `false` skips it everywhere else.
    pub exclude: bool,
}

/// Outcome of asking a checkout for its `origin` remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Found(String),
    Absent,
}

impl Origin {
    pub fn url(&self) -> Option<&str> {
        match self {
            Origin::Found(url) => Some(url.as_str()),
            Origin::Absent => None,
        }
    }
}

/// Repository kinds the generated config knows how to check out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepoKind {
    Git,
}

impl RepoKind {
    /// Every kind accepted by the converter. Add new kinds here.
    pub const SUPPORTED: &'static [RepoKind] = &[RepoKind::Git];

    pub fn as_str(&self) -> &'static str {
        match self {
            RepoKind::Git => "git",
        }
    }

    /// Case-insensitive lookup among [`RepoKind::SUPPORTED`]. Surrounding whitespace is
    /// significant.
    pub fn parse(value: &str) -> Option<Self> {
        Self::SUPPORTED
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for RepoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named group of `key = value` lines in the generated config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSection {
    pub name: String,
    lines: Vec<String>,
}

impl ConfigSection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lines: Vec::new(),
        }
    }

    /// Append a line, dropping it when empty.
    pub fn push_line(&mut self, line: impl Into<String>) {
        let line = line.into();
        if !line.is_empty() {
            self.lines.push(line);
        }
    }

    pub fn with_line(mut self, line: impl Into<String>) -> Self {
        self.push_line(line);
        self
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_kind_parse_ignores_case() {
        assert_eq!(RepoKind::parse("Git"), Some(RepoKind::Git));
        assert_eq!(RepoKind::parse("GIT"), Some(RepoKind::Git));
        assert_eq!(RepoKind::parse("hg"), None);
        assert_eq!(RepoKind::parse(""), None);
    }

    #[test]
    fn repo_kind_parse_keeps_whitespace() {
        assert_eq!(RepoKind::parse(" git "), None);
        assert_eq!(RepoKind::parse("Git\n"), None);
    }

    #[test]
    fn section_drops_empty_lines() {
        let section = ConfigSection::new("repo")
            .with_line("")
            .with_line("checkout = git clone x");
        assert_eq!(section.lines(), ["checkout = git clone x"]);
    }
}
