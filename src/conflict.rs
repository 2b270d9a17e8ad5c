// SPDX-License-Identifier: MPL-2.0

//! What happens when narrowing a range would leave it empty.
//!
//! The minimum always wins. Whether the caller hears about it is the [ConflictPolicy],
//! and the outcome of every merge is reported as a [Merge] so it can be inspected
//! without serializing the range.

use std::fmt::{self, Display};
use std::str::FromStr;

use version_codec::{max_component, Version};

use crate::error::VersionError;

/// Caller-chosen behavior when two bounds do not overlap.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum ConflictPolicy {
    /// Resolve the conflict without reporting it.
    Silent,
    /// Resolve the conflict and log a warning.
    #[default]
    Warning,
    /// Return [VersionError::RangeMismatch] and leave the range untouched.
    Error,
}

impl FromStr for ConflictPolicy {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "silent" => Ok(Self::Silent),
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            _ => Err(VersionError::UnknownPolicy { name: s.to_string() }),
        }
    }
}

impl Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Silent => "silent",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// Which end of a range to favor when a version must be picked from it.
///
/// Lowered to [Preference::Lowest] only by a resolved conflict or an explicit marker.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum Preference {
    /// Pick the highest matching version.
    #[default]
    Highest,
    /// Pick the lowest matching version.
    Lowest,
}

impl Preference {
    /// Highest only if both sides prefer highest.
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::Highest, Self::Highest) => Self::Highest,
            _ => Self::Lowest,
        }
    }

    /// Whether this is [Preference::Highest].
    pub fn is_highest(self) -> bool {
        self == Self::Highest
    }
}

/// The bound whose update caused a conflict.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Side {
    /// A new minimum above the current maximum. It is adopted and the maximum pinned to it,
    /// or reopened to the top when the minimum is not a version itself.
    Minimum,
    /// A new maximum below the current minimum. It is dropped.
    Maximum,
}

/// One end of a range, spelled as a selector.
///
/// Bounds that are not versions themselves are written through their neighbour:
/// the end of a major as `<3.0`, a minimum just past the limit as `>5.98`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct Bound {
    side: Side,
    version: Version,
    limit: u32,
}

impl Bound {
    pub(crate) fn new(side: Side, version: Version, limit: u32) -> Self {
        Self {
            side,
            version,
            limit,
        }
    }
}

impl Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let top = max_component(self.limit);
        let (major, minor) = (self.version.major(), self.version.minor());
        match self.side {
            Side::Minimum if major > top => write!(f, ">{}", major - 1),
            Side::Minimum if minor > top => write!(f, ">{}.{}", major, minor - 1),
            Side::Minimum => write!(f, ">={}", self.version),
            Side::Maximum if minor != self.limit => write!(f, "<={}", self.version),
            Side::Maximum if major + 1 > top => write!(f, "<={major}"),
            Side::Maximum => write!(f, "<{}.0", major + 1),
        }
    }
}

/// A pair of bounds that did not overlap.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Conflict {
    side: Side,
    attempted: Version,
    existing: Version,
    limit: u32,
}

impl Conflict {
    pub(crate) fn new(side: Side, attempted: Version, existing: Version, limit: u32) -> Self {
        Self {
            side,
            attempted,
            existing,
            limit,
        }
    }

    /// Which update conflicted.
    pub fn side(&self) -> Side {
        self.side
    }

    /// The bound that was being applied.
    pub fn attempted(&self) -> Version {
        self.attempted
    }

    /// The opposite bound it collided with.
    pub fn existing(&self) -> Version {
        self.existing
    }
}

impl Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (attempted, existing) = match self.side {
            Side::Minimum => (
                Bound::new(Side::Minimum, self.attempted, self.limit),
                Bound::new(Side::Maximum, self.existing, self.limit),
            ),
            Side::Maximum => (
                Bound::new(Side::Maximum, self.attempted, self.limit),
                Bound::new(Side::Minimum, self.existing, self.limit),
            ),
        };
        match self.side {
            Side::Minimum => write!(
                f,
                "Minimum {attempted} conflicts with maximum {existing}; \
                 minimum (highest value) takes precedence."
            ),
            Side::Maximum => write!(
                f,
                "Maximum {attempted} conflicts with minimum {existing}; \
                 minimum (highest value) takes precedence, but lower values not preferred."
            ),
        }
    }
}

/// Outcome of narrowing a range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Merge {
    pub(crate) narrowed: bool,
    pub(crate) conflicts: Vec<Conflict>,
    pub(crate) preference: Preference,
}

impl Merge {
    /// Whether any bound moved.
    pub fn is_narrowed(&self) -> bool {
        self.narrowed
    }

    /// Conflicts that were resolved, maximum first.
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    /// Whether the merge went through without conflicts.
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Preference of the range after the merge.
    pub fn preference(&self) -> Preference {
        self.preference
    }

    pub(crate) fn absorb(&mut self, other: Merge) {
        self.narrowed |= other.narrowed;
        self.conflicts.extend(other.conflicts);
        self.preference = other.preference;
    }

    pub(crate) fn describe(&self) -> String {
        self.conflicts
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_names() {
        for policy in [
            ConflictPolicy::Silent,
            ConflictPolicy::Warning,
            ConflictPolicy::Error,
        ] {
            assert_eq!(policy.to_string().parse::<ConflictPolicy>(), Ok(policy));
        }
        assert_eq!(
            "ignore".parse::<ConflictPolicy>(),
            Err(VersionError::UnknownPolicy {
                name: "ignore".into()
            })
        );
    }

    #[test]
    fn preference_and() {
        use Preference::*;
        assert_eq!(Highest.and(Highest), Highest);
        assert_eq!(Highest.and(Lowest), Lowest);
        assert_eq!(Lowest.and(Highest), Lowest);
        assert_eq!(Lowest.and(Lowest), Lowest);
    }

    #[test]
    fn messages_name_both_bounds() {
        let conflict = Conflict::new(Side::Minimum, Version::new(5, 4), Version::new(4, 3), 100);
        assert_eq!(
            conflict.to_string(),
            "Minimum >=5.4 conflicts with maximum <=4.3; minimum (highest value) takes precedence."
        );
        let conflict =
            Conflict::new(Side::Maximum, Version::new(0, 100), Version::new(2, 1), 100);
        assert!(conflict
            .to_string()
            .starts_with("Maximum <1.0 conflicts with minimum >=2.1;"));
    }

    #[test]
    fn bounds_outside_the_versions_use_their_neighbour() {
        let bound =
            |side, major, minor| Bound::new(side, Version::new(major, minor), 100).to_string();
        assert_eq!(bound(Side::Minimum, 3, 2), ">=3.2");
        assert_eq!(bound(Side::Minimum, 99, 0), ">98");
        assert_eq!(bound(Side::Minimum, 5, 99), ">5.98");
        assert_eq!(bound(Side::Maximum, 3, 2), "<=3.2");
        assert_eq!(bound(Side::Maximum, 3, 100), "<4.0");
        assert_eq!(bound(Side::Maximum, 98, 100), "<=98");
    }
}
