// SPDX-License-Identifier: MPL-2.0

//! Pip-style version selectors as comparable, intersectable ranges.
//!
//! A package resolver needs to narrow down which versions of a dependency are acceptable,
//! given constraints like `>=1.3,<2.0` or `==2.*` coming from different places.
//! This crate turns each such selection string into a [VersionRange]:
//! a single interval of `major.minor` versions, together with a preference
//! for the highest or the lowest version inside it.
//!
//! # Versions on a line
//!
//! Only the first two components of a version are ever compared.
//! Deeper components (`1.3.dev7`) are bugfixes, compatible by definition,
//! and selecting on them is rejected.
//!
//! Each `major.minor` pair is encoded as a single integer
//! `major * (limit + 1) + minor`, see the [version_codec] crate.
//! With components below the limit this preserves ordering,
//! so every range operation is plain integer arithmetic.
//! The limit is a const parameter of [LimitedRange];
//! [VersionRange] uses [DEFAULT_LIMIT].
//!
//! # Basic example
//!
//! ```
//! # use package_versions::{VersionRange, VersionError};
//! #
//! # fn try_main() -> Result<(), VersionError> {
//! let exact_major: VersionRange = "==3".parse()?;
//! assert_eq!(exact_major.to_string(), ">=3.0,<4.0");
//!
//! let from_one: VersionRange = "<=3.5,>1".parse()?;
//! assert_eq!(from_one.to_string(), ">=2.0,<=3.5");
//!
//! let both = exact_major & from_one;
//! assert_eq!(both.to_string(), ">=3.0,<=3.5");
//! #     Ok(())
//! # }
//! # fn main() {
//! #     try_main().unwrap();
//! # }
//! ```
//!
//! # Conflicts
//!
//! Two ranges that do not overlap cannot be intersected into an empty range.
//! Instead the higher minimum wins and the result prefers lower versions.
//! A [ConflictPolicy] decides whether this happens silently, with a logged warning,
//! or is refused with [VersionError::RangeMismatch]:
//!
//! ```
//! # use package_versions::{ConflictPolicy, VersionRange, VersionError};
//! let old: VersionRange = "<4.4".parse().unwrap();
//! let new: VersionRange = ">5.3".parse().unwrap();
//!
//! assert!(matches!(
//!     old.intersection(&new, ConflictPolicy::Error),
//!     Err(VersionError::RangeMismatch { .. })
//! ));
//!
//! let pinned = old & new;
//! assert_eq!(pinned.to_string(), "==5.4");
//! assert!(!pinned.prefer_highest());
//! ```
//!
//! Parsing a single selection string always uses [ConflictPolicy::Error],
//! so `">2.0,<1.0"` fails to parse.

#![warn(missing_docs)]

pub mod conflict;
pub mod dependency;
pub mod error;
pub mod range;
pub mod selector;

pub use conflict::{Conflict, ConflictPolicy, Merge, Preference, Side};
pub use dependency::{parse_dependency, Dependency};
pub use error::VersionError;
pub use range::{LimitedRange, VersionRange};
pub use selector::{Selection, Selector};
pub use version_codec::{Version, DEFAULT_LIMIT};

#[cfg(feature = "proptest")]
pub use range::proptest_strategy;
