// SPDX-License-Identifier: MPL-2.0

//! Splitting requirement lines like `numpy>=1.3,<2.0  # comment` into a package name
//! and its version range.

use std::fmt::{self, Display};
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::VersionError;
use crate::range::VersionRange;

/// Package name followed by an optional selection string.
const DEPENDENCY_PATTERN: &str = r"^([a-zA-Z0-9_\-]+)\s*([><=][><=*0-9., ]*)?$";

fn dependency_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(DEPENDENCY_PATTERN).expect("dependency pattern is valid"))
}

/// A package together with the versions of it that are acceptable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Name of the package.
    pub name: String,
    /// Acceptable versions. A line without selectors accepts every version.
    pub range: VersionRange,
}

/// Parse one requirement line. Anything after `#` is a comment.
pub fn parse_dependency(line: &str) -> Result<Dependency, VersionError> {
    let text = line.split('#').next().unwrap_or_default().trim();
    let captures = dependency_regex()
        .captures(text)
        .ok_or_else(|| VersionError::Format {
            text: text.to_string(),
            reason: "does not seem to be a package name followed by version selectors"
                .to_string(),
        })?;
    let name = captures[1].to_string();
    let range = match captures.get(2) {
        Some(selection) => selection.as_str().parse()?,
        None => VersionRange::full(),
    };
    log::debug!("dependency {name} {range}");
    Ok(Dependency { name, range })
}

impl FromStr for Dependency {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_dependency(s)
    }
}

impl Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.range)
    }
}
