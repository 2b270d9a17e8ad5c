// SPDX-License-Identifier: MPL-2.0

//! Ranges are pip-style constraints narrowed to a single interval of versions.
//!
//! A range is an inclusive interval `[min, max]` on the encoded version line of its limit
//! (see [version_codec]), plus a [Preference] telling a resolver which end to favor.
//! Exclusive selectors are normalized at parse time by moving the bound one step,
//! so `>1.3` is stored as `>=1.4`.
//!
//! Ranges only ever narrow:
//!  - [parse](LimitedRange::parse): build from a selection string such as `>=1.3,<2.0`
//!  - [add_selections](LimitedRange::add_selections): narrow with more selectors
//!  - [update_values](LimitedRange::update_values): narrow with raw encoded bounds
//!  - [intersection](LimitedRange::intersection): narrow with another range
//!
//! ```
//! use package_versions::VersionRange;
//!
//! let range: VersionRange = "<=2.5,>1".parse().unwrap();
//! assert_eq!(range.to_string(), ">=2.0,<=2.5");
//!
//! let major: VersionRange = "==2.*".parse().unwrap();
//! assert_eq!(major.to_string(), ">=2.0,<3.0");
//! assert_eq!((&range & &major).to_string(), ">=2.0,<=2.5");
//! ```

use std::fmt::{self, Display, Formatter};
use std::ops::BitAnd;
use std::str::FromStr;

#[cfg(any(feature = "proptest", test))]
use proptest::prelude::*;
use version_codec::{highest, Version, DEFAULT_LIMIT};

use crate::conflict::{Bound, Conflict, ConflictPolicy, Merge, Preference, Side};
use crate::error::VersionError;
use crate::selector::{Selection, Selector, PREFER_LOWEST_MARKER};

/// A range of `major.minor` versions whose components stay below `LIMIT - 1`.
#[derive(Debug, Clone, Copy)]
pub struct LimitedRange<const LIMIT: u32> {
    min: u64,
    max: u64,
    preference: Preference,
}

/// A range using the default digit limit.
pub type VersionRange = LimitedRange<DEFAULT_LIMIT>;

// Constructors
impl<const LIMIT: u32> LimitedRange<LIMIT> {
    /// Largest encoded value a bound can take.
    pub const HIGHEST: u64 = highest(LIMIT);

    /// Every version, `==*`.
    pub fn full() -> Self {
        Self {
            min: 0,
            max: Self::HIGHEST,
            preference: Preference::Highest,
        }
    }

    /// Build a range from a selection string like `>=1.3,<2.0`.
    ///
    /// Clauses that contradict each other are an error. A leading `_` sets the preference
    /// to [Preference::Lowest].
    pub fn parse(selections: &str) -> Result<Self, VersionError> {
        let mut range = Self::full();
        match range.add_selections(selections, ConflictPolicy::Error) {
            Ok(_) => Ok(range.check_invariants()),
            Err(VersionError::RangeMismatch { message }) => Err(VersionError::RangeMismatch {
                message: format!("\"{selections}\" contains conflicting directives: {message}"),
            }),
            Err(err) => Err(err),
        }
    }

    /// Build a range directly from optional inclusive bounds.
    pub fn raw(
        min: Option<Version>,
        max: Option<Version>,
        preference: Preference,
        conflict: ConflictPolicy,
    ) -> Result<Self, VersionError> {
        let min = min.map(|v| v.encode(LIMIT)).transpose()?;
        let max = max.map(|v| v.encode(LIMIT)).transpose()?;
        let mut range = Self::full();
        range.update_values(min, max, conflict)?;
        range.preference = range.preference.and(preference);
        Ok(range.check_invariants())
    }
}

// Narrowing
impl<const LIMIT: u32> LimitedRange<LIMIT> {
    /// Narrow the bounds to `min` and `max` where they are tighter than the current ones.
    ///
    /// A maximum below the current minimum is dropped. A minimum above the current maximum
    /// is adopted and the maximum pinned to it, or reopened to [Self::HIGHEST] when that
    /// minimum is not a valid version. Both conflicts lower the preference and are
    /// reported according to `conflict`; with [ConflictPolicy::Error] nothing is changed.
    /// Values above [Self::HIGHEST] are clamped to it.
    pub fn update_values(
        &mut self,
        min: Option<u64>,
        max: Option<u64>,
        conflict: ConflictPolicy,
    ) -> Result<Merge, VersionError> {
        let mut updated = *self;
        let merge = updated.merge(
            min.map(|v| v.min(Self::HIGHEST)),
            max.map(|v| v.min(Self::HIGHEST)),
        );
        if !merge.is_clean() {
            match conflict {
                ConflictPolicy::Silent => {}
                ConflictPolicy::Warning => {
                    for c in merge.conflicts() {
                        log::warn!("{c}");
                    }
                }
                ConflictPolicy::Error => {
                    return Err(VersionError::RangeMismatch {
                        message: merge.describe(),
                    })
                }
            }
        }
        *self = updated.check_invariants();
        Ok(merge)
    }

    /// Narrow by a single selector, like `>=1.3`.
    pub fn add_selection(
        &mut self,
        selection: &str,
        conflict: ConflictPolicy,
    ) -> Result<Merge, VersionError> {
        let selector: Selector = selection.parse()?;
        self.apply(&selector, conflict)
    }

    /// Narrow by every selector of a comma separated selection string.
    ///
    /// Selectors are applied one by one: an error leaves the earlier ones applied.
    pub fn add_selections(
        &mut self,
        selections: &str,
        conflict: ConflictPolicy,
    ) -> Result<Merge, VersionError> {
        let selection: Selection = selections.parse()?;
        let mut merge = Merge {
            preference: self.preference,
            ..Merge::default()
        };
        for selector in selection.selectors() {
            merge.absorb(self.apply(selector, conflict)?);
        }
        if selection.prefer_lowest() {
            self.preference = Preference::Lowest;
            merge.preference = Preference::Lowest;
        }
        Ok(merge)
    }

    fn apply(
        &mut self,
        selector: &Selector,
        conflict: ConflictPolicy,
    ) -> Result<Merge, VersionError> {
        let bounds = selector.bounds(LIMIT)?;
        log::trace!("applying {selector} as {bounds:?} to {}", self);
        self.update_values(bounds.min, bounds.max, conflict)
    }

    /// Narrow `self` by `other`'s bounds into a new range.
    /// The result prefers the highest version only if both sides do.
    pub fn intersection(
        &self,
        other: &Self,
        conflict: ConflictPolicy,
    ) -> Result<Self, VersionError> {
        let mut range = *self;
        range.update_values(Some(other.min), Some(other.max), conflict)?;
        range.preference = range.preference.and(other.preference);
        Ok(range)
    }

    /// Intersection that resolves conflicts silently, so it never fails.
    pub fn intersect(&self, other: &Self) -> Self {
        let mut range = *self;
        range.merge(Some(other.min), Some(other.max));
        range.preference = range.preference.and(other.preference);
        range.check_invariants()
    }

    /// Apply new bounds, resolving conflicts in place. The maximum goes first.
    fn merge(&mut self, min: Option<u64>, max: Option<u64>) -> Merge {
        let mut merge = Merge::default();
        let (old_min, old_max) = (self.min(), self.max());
        if let Some(max) = max {
            let new_max = self.version(max);
            if max >= self.max {
                log::debug!("max NOT updated from {old_max} to {new_max}");
            } else if max < self.min {
                let conflict = Conflict::new(Side::Maximum, new_max, old_min, LIMIT);
                log::debug!("max NOT updated from {old_max} to {new_max} (conflict mode)");
                merge.conflicts.push(conflict);
                self.preference = Preference::Lowest;
            } else {
                log::debug!("max updated from {old_max} to {new_max}");
                self.max = max;
                merge.narrowed = true;
            }
        }
        if let Some(min) = min {
            let new_min = self.version(min);
            if min <= self.min {
                log::debug!("min NOT updated from {old_min} to {new_min}");
            } else {
                if min > self.max {
                    let conflict = Conflict::new(Side::Minimum, new_min, self.max(), LIMIT);
                    log::debug!("min updated from {old_min} to {new_min} (conflict mode)");
                    merge.conflicts.push(conflict);
                    // A point that is not a version could not be written back.
                    self.max = if new_min.encode(LIMIT).is_ok() {
                        min
                    } else {
                        Self::HIGHEST
                    };
                    self.preference = Preference::Lowest;
                } else {
                    log::debug!("min updated from {old_min} to {new_min}");
                }
                self.min = min;
                merge.narrowed = true;
            }
        }
        merge.preference = self.preference;
        merge
    }

    fn version(&self, nr: u64) -> Version {
        Version::decode(nr, LIMIT)
    }

    fn check_invariants(self) -> Self {
        if cfg!(debug_assertions) {
            assert!(self.min <= self.max, "empty range {:?}", self);
            assert!(self.max <= Self::HIGHEST, "range above highest {:?}", self);
        }
        self
    }
}

// Other useful functions.
impl<const LIMIT: u32> LimitedRange<LIMIT> {
    /// Lowest version in the range.
    pub fn min(&self) -> Version {
        self.version(self.min)
    }

    /// Highest encoded bound in the range. Decodes to `major.LIMIT` when the range
    /// runs up to the next major.
    pub fn max(&self) -> Version {
        self.version(self.max)
    }

    /// Lower bound on the encoded line.
    pub fn min_encoded(&self) -> u64 {
        self.min
    }

    /// Upper bound on the encoded line.
    pub fn max_encoded(&self) -> u64 {
        self.max
    }

    /// Which end of the range a resolver should favor.
    pub fn preference(&self) -> Preference {
        self.preference
    }

    /// Whether higher versions are preferred.
    pub fn prefer_highest(&self) -> bool {
        self.preference.is_highest()
    }

    /// Whether the range matches everything.
    pub fn is_full(&self) -> bool {
        self.min == 0 && self.max == Self::HIGHEST
    }

    /// If the range holds exactly one version, return it.
    pub fn as_singleton(&self) -> Option<Version> {
        (self.min == self.max).then(|| self.min())
    }

    /// Check if the range contains a version. Versions that do not fit the limit never match.
    pub fn contains(&self, version: &Version) -> bool {
        version
            .encode(LIMIT)
            .map(|nr| self.min <= nr && nr <= self.max)
            .unwrap_or(false)
    }

    /// The preference only matters when there is a lower bound to move away from
    /// and more than one version to choose between.
    fn preference_matters(&self) -> bool {
        self.min > 0 && self.min != self.max
    }
}

impl<const LIMIT: u32> Default for LimitedRange<LIMIT> {
    fn default() -> Self {
        Self::full()
    }
}

impl<const LIMIT: u32> PartialEq for LimitedRange<LIMIT> {
    fn eq(&self, other: &Self) -> bool {
        self.min == other.min
            && self.max == other.max
            && (!self.preference_matters() || self.preference == other.preference)
    }
}

impl<const LIMIT: u32> Eq for LimitedRange<LIMIT> {}

impl<const LIMIT: u32> BitAnd for LimitedRange<LIMIT> {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        self.intersect(&rhs)
    }
}

impl<'a, const LIMIT: u32> BitAnd<&'a LimitedRange<LIMIT>> for &'a LimitedRange<LIMIT> {
    type Output = LimitedRange<LIMIT>;

    fn bitand(self, rhs: Self) -> LimitedRange<LIMIT> {
        self.intersect(rhs)
    }
}

impl<const LIMIT: u32> FromStr for LimitedRange<LIMIT> {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// REPORT ######################################################################

/// The shortest selection string that parses back to the same range.
impl<const LIMIT: u32> Display for LimitedRange<LIMIT> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_full() {
            return write!(f, "==*");
        }
        if let Some(v) = self.as_singleton() {
            return write!(f, "=={v}");
        }
        if self.preference_matters() && !self.prefer_highest() {
            write!(f, "{PREFER_LOWEST_MARKER}")?;
        }
        let has_max = self.max < Self::HIGHEST;
        if self.min > 0 {
            write!(f, "{}", Bound::new(Side::Minimum, self.min(), LIMIT))?;
            if has_max {
                write!(f, ",")?;
            }
        }
        if has_max {
            write!(f, "{}", Bound::new(Side::Maximum, self.max(), LIMIT))?;
        }
        Ok(())
    }
}

// SERIALIZATION ###############################################################

#[cfg(feature = "serde")]
impl<const LIMIT: u32> serde::Serialize for LimitedRange<LIMIT> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de, const LIMIT: u32> serde::Deserialize<'de> for LimitedRange<LIMIT> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        FromStr::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Generate ranges whose bounds are all valid versions or major boundaries, so that
/// their string form parses back.
#[cfg(any(feature = "proptest", test))]
pub fn proptest_strategy() -> impl Strategy<Value = VersionRange> {
    let version = || version_codec::proptest_strategy(DEFAULT_LIMIT);
    let step = u64::from(DEFAULT_LIMIT) + 1;
    (
        prop::option::of(version()),
        prop::option::of((version(), any::<bool>())),
        any::<bool>(),
    )
        .prop_map(move |(min, max, lowest)| {
            let encode = |v: Version| u64::from(v.major()) * step + u64::from(v.minor());
            let min = min.map(encode).unwrap_or(0);
            let max = max
                .map(|(v, whole_major)| {
                    if whole_major {
                        u64::from(v.major()) * step + u64::from(DEFAULT_LIMIT)
                    } else {
                        encode(v)
                    }
                })
                .unwrap_or(VersionRange::HIGHEST);
            let (min, max) = if min <= max { (min, max) } else { (max, min) };
            // A lower bound that came from the upper side can be the end of a major,
            // which is not a version; start at the beginning of that major instead.
            let min = if min % step == u64::from(DEFAULT_LIMIT) {
                min - u64::from(DEFAULT_LIMIT)
            } else {
                min
            };
            VersionRange {
                min,
                max,
                preference: if lowest {
                    Preference::Lowest
                } else {
                    Preference::Highest
                },
            }
            .check_invariants()
        })
}

// TESTS #######################################################################
