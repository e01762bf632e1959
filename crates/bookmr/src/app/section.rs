//! Building myrepos config sections for bookmarks.

use std::path::Path;

use crate::app::skip::skip_line;
use crate::domain::errors::ConvertError;
use crate::domain::model::{ConfigSection, LeafBookmark, Origin, SkipDirective};
use crate::infra::paths;

pub const DEFAULT_SECTION: &str = "DEFAULT";
pub const REBASE_UPDATE_LINE: &str = "update = git pull --rebase";

/// The `[DEFAULT]` section applied to every repository.
pub fn default_section(rebase: bool) -> Option<ConfigSection> {
    rebase.then(|| ConfigSection::new(DEFAULT_SECTION).with_line(REBASE_UPDATE_LINE))
}

/// Assemble the section for a single leaf bookmark.
///
/// `relative_base` is the directory holding the output file; when given, the section is
/// named by the leaf's path relative to it.
pub fn build_section(
    leaf: &LeafBookmark,
    origin: &Origin,
    skip: Option<&SkipDirective>,
    relative_base: Option<&Path>,
) -> Result<ConfigSection, ConvertError> {
    let name = match relative_base {
        Some(base) => paths::relative_to(base, &leaf.path)?,
        None => leaf.path.clone(),
    };

    let mut section = ConfigSection::new(name.display().to_string());
    if let Some(url) = origin.url() {
        section.push_line(checkout_line(url));
    }
    if let Some(directive) = skip {
        section.push_line(skip_line(directive));
    }
    Ok(section)
}

fn checkout_line(url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }
    format!("checkout = git clone {url}")
}
