//! Turning a bookmark tree into a myrepos config.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::app::flatten::flatten;
use crate::app::section::{build_section, default_section};
use crate::app::skip::parse_skip_directive;
use crate::domain::errors::ConvertError;
use crate::domain::model::{BookmarkNode, Origin, RepoKind};
use crate::infra::config::Config;
use crate::infra::git::OriginInspector;
use crate::infra::writer::ConfigWriter;

/// Runtime options controlling conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Emit a `[DEFAULT]` section that updates with `git pull --rebase`.
    pub default_rebase: bool,
    /// Name sections relative to this directory instead of by absolute path.
    pub relative_base: Option<PathBuf>,
    /// Program name recorded in the generated header comment.
    pub tool_name: String,
}

impl ConvertOptions {
    /// Build options from configuration; `output_path` must already be absolute.
    pub fn from_config(config: &Config, output_path: &Path) -> Self {
        let relative_base = config
            .output
            .relative_repo_paths()
            .then(|| output_path.parent().map(Path::to_path_buf))
            .flatten();
        Self {
            default_rebase: config.output.default_rebase(),
            relative_base,
            tool_name: env!("CARGO_PKG_NAME").to_owned(),
        }
    }

    fn header(&self) -> String {
        format!(
            "This file was generated from SourceTree bookmarks by the {} command",
            self.tool_name
        )
    }
}

/// Counters describing a finished conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    pub repositories: usize,
    pub without_origin: usize,
    pub host_restricted: usize,
}

/// Drives flattening, inspection, and section output.
pub struct Converter<'a, I: OriginInspector> {
    inspector: &'a I,
    options: ConvertOptions,
}

impl<'a, I: OriginInspector> Converter<'a, I> {
    pub fn new(inspector: &'a I, options: ConvertOptions) -> Self {
        Self { inspector, options }
    }

    /// Write the config for every leaf of `root`, in tree order.
    ///
    /// Stops at the first unsupported repository kind or failure. Anything already written
    /// stays in `writer`.
    pub fn run<W: Write>(
        &self,
        root: &BookmarkNode,
        writer: &mut ConfigWriter<W>,
    ) -> Result<ConversionSummary, ConvertError> {
        let leaves = flatten(root);
        tracing::info!(bookmarks = leaves.len(), "converting bookmarks");

        writer.write_comment(&self.options.header())?;
        if let Some(section) = default_section(self.options.default_rebase) {
            writer.write_section(&section)?;
        }

        let mut summary = ConversionSummary::default();
        for leaf in &leaves {
            let kind = RepoKind::parse(&leaf.repo_kind).ok_or_else(|| {
                ConvertError::UnsupportedRepoKind {
                    kind: leaf.repo_kind.to_lowercase(),
                    name: leaf.name.clone(),
                }
            })?;
            tracing::debug!(name = %leaf.name, path = %leaf.path.display(), %kind, "processing bookmark");

            let skip = parse_skip_directive(&leaf.name);
            let origin = self.inspector.origin_of(&leaf.path)?;
            if origin == Origin::Absent {
                tracing::warn!(path = %leaf.path.display(), "no origin remote; omitting checkout");
                summary.without_origin += 1;
            }
            if skip.is_some() {
                summary.host_restricted += 1;
            }

            let section = build_section(
                leaf,
                &origin,
                skip.as_ref(),
                self.options.relative_base.as_deref(),
            )?;
            writer.write_section(&section)?;
            summary.repositories += 1;
        }

        writer.flush()?;
        Ok(summary)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Inspector answering from a fixed table and recording every query.
    #[derive(Default)]
    struct FakeInspector {
        origins: HashMap<PathBuf, Origin>,
        queried: RefCell<Vec<PathBuf>>,
    }

    impl FakeInspector {
        fn with(mut self, path: &str, origin: Origin) -> Self {
            self.origins.insert(PathBuf::from(path), origin);
            self
        }
    }

    impl OriginInspector for FakeInspector {
        fn origin_of(&self, repo_path: &Path) -> Result<Origin, ConvertError> {
            self.queried.borrow_mut().push(repo_path.to_path_buf());
            self.origins
                .get(repo_path)
                .cloned()
                .ok_or_else(|| ConvertError::OriginInspection {
                    path: repo_path.to_path_buf(),
                    detail: "fatal: not a git repository".into(),
                })
        }
    }

    fn options() -> ConvertOptions {
        ConvertOptions {
            default_rebase: true,
            relative_base: Some(PathBuf::from("/home/me")),
            tool_name: "bookmr".into(),
        }
    }

    fn output(writer: ConfigWriter<Vec<u8>>) -> String {
        String::from_utf8(writer.into_inner()).expect("utf8")
    }

    #[test]
    fn writes_default_then_leaves_in_order() {
        let inspector = FakeInspector::default()
            .with("/home/me/src/a", Origin::Found("git@host:org/a.git".into()))
            .with("/home/me/src/b", Origin::Absent);
        let root = BookmarkNode::folder(
            "",
            vec![
                BookmarkNode::leaf("a MR:!ci", "Git", "/home/me/src/a"),
                BookmarkNode::folder("nested", vec![BookmarkNode::leaf("b", "git", "/home/me/src/b")]),
            ],
        );

        let mut writer = ConfigWriter::new(Vec::new());
        let summary = Converter::new(&inspector, options())
            .run(&root, &mut writer)
            .expect("conversion succeeds");

        assert_eq!(
            summary,
            ConversionSummary {
                repositories: 2,
                without_origin: 1,
                host_restricted: 1,
            }
        );
        assert_eq!(
            output(writer),
            "# This file was generated from SourceTree bookmarks by the bookmr command\n\
             \n[DEFAULT]\nupdate = git pull --rebase\n\
             \n[src/a]\ncheckout = git clone git@host:org/a.git\nskip = test $(hostname) = 'ci'\n\
             \n[src/b]\n"
        );
    }

    #[test]
    fn unsupported_kind_stops_processing() {
        let inspector = FakeInspector::default()
            .with("/home/me/a", Origin::Absent)
            .with("/home/me/c", Origin::Absent);
        let root = BookmarkNode::folder(
            "",
            vec![
                BookmarkNode::leaf("a", "git", "/home/me/a"),
                BookmarkNode::leaf("b", "Mercurial", "/home/me/b"),
                BookmarkNode::leaf("c", "git", "/home/me/c"),
            ],
        );

        let mut writer = ConfigWriter::new(Vec::new());
        let err = Converter::new(&inspector, options())
            .run(&root, &mut writer)
            .expect_err("unsupported kind");

        match err {
            ConvertError::UnsupportedRepoKind { kind, name } => {
                assert_eq!(kind, "mercurial");
                assert_eq!(name, "b");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(*inspector.queried.borrow(), [PathBuf::from("/home/me/a")]);

        let written = output(writer);
        assert!(written.contains("[a]"));
        assert!(!written.contains("[c]"));
    }

    #[test]
    fn inspection_failure_aborts_run() {
        let inspector = FakeInspector::default();
        let root = BookmarkNode::folder("", vec![BookmarkNode::leaf("x", "git", "/home/me/x")]);

        let mut writer = ConfigWriter::new(Vec::new());
        let err = Converter::new(&inspector, options())
            .run(&root, &mut writer)
            .expect_err("inspection fails");
        assert!(matches!(err, ConvertError::OriginInspection { .. }));
    }

    #[test]
    fn absolute_names_without_default_section() {
        let inspector = FakeInspector::default().with("/srv/repo", Origin::Absent);
        let root = BookmarkNode::folder("", vec![BookmarkNode::leaf("repo", "git", "/srv/repo")]);
        let options = ConvertOptions {
            default_rebase: false,
            relative_base: None,
            tool_name: "bookmr".into(),
        };

        let mut writer = ConfigWriter::new(Vec::new());
        Converter::new(&inspector, options)
            .run(&root, &mut writer)
            .expect("conversion succeeds");

        let written = output(writer);
        assert!(!written.contains("[DEFAULT]"));
        assert!(written.ends_with("\n[/srv/repo]\n"));
    }

    #[test]
    fn options_follow_config() {
        let mut config = Config::default();
        config.set_relative_repo_paths(false);
        config.set_default_rebase(false);
        let options = ConvertOptions::from_config(&config, Path::new("/home/me/.mrconfig"));
        assert!(options.relative_base.is_none());
        assert!(!options.default_rebase);

        let options =
            ConvertOptions::from_config(&Config::default(), Path::new("/home/me/.mrconfig"));
        assert_eq!(options.relative_base, Some(PathBuf::from("/home/me")));
        assert!(options.default_rebase);
    }
}
