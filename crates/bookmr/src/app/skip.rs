//! Host skip directives encoded in bookmark names.
//!
//! A bookmark named `tools MR:build-box` is only updated on `build-box`, while
//! `tools MR:!build-box` is updated everywhere except `build-box`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::model::SkipDirective;

static SKIP_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)MR:(!)?([a-z0-9\-\.]+)$").expect("skip directive pattern is valid")
});

/// Extract the trailing `MR:[!]host` directive from a display name, if any.
pub fn parse_skip_directive(name: &str) -> Option<SkipDirective> {
    let captures = SKIP_SUFFIX.captures(name)?;
    Some(SkipDirective {
        host: captures.get(2)?.as_str().to_owned(),
        exclude: captures.get(1).is_some(),
    })
}

/// Render the myrepos `skip` line for a directive.
pub fn skip_line(directive: &SkipDirective) -> String {
    let op = if directive.exclude { "=" } else { "!=" };
    format!("skip = test $(hostname) {op} '{}'", directive.host)
}
