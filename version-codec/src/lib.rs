// SPDX-License-Identifier: MPL-2.0

//! This crate converts between dotted `major.minor[.rest]` version text and a single ordered
//! integer.
//!
//! Every `(major, minor)` pair is mapped onto `major * (limit + 1) + minor`. As long as both
//! components stay below the limit, comparing the integers is the same as comparing the tuples,
//! so range arithmetic can work on one line of integers instead of pairs.
//!
//! The limit keeps a margin at the top: a component must stay below `limit - 1`. Bounds derived
//! from the largest literal version (like "everything up to the next major") then still fit, and
//! [highest] is only ever reached as a computed bound, never as a parsed version.
//!
//! Anything after the second dot is an opaque "rest" (`1.3.dev7` has rest `dev7`). It is never
//! compared, only carried through [encode_with_rest] and [decode_with_rest].
//!
//! ```
//! use version_codec::{decode_with_rest, encode_with_rest};
//!
//! let (nr, rest) = encode_with_rest("1.3.dev7", 100).unwrap();
//! assert_eq!(nr, 104);
//! assert_eq!(rest, "dev7");
//! assert_eq!(decode_with_rest(nr, &rest, 100), "1.3.dev7");
//! ```
//!
//! ## Optional features
//!
//! * `serde`: serialization and deserialization of [Version] as a `major.minor` string.
//! * `proptest`: exports a proptest strategy for [Version] below a given limit.

#![warn(missing_docs)]

use std::fmt::{self, Display};
use std::num::IntErrorKind;
use std::str::FromStr;

#[cfg(any(feature = "proptest", test))]
use proptest::prelude::*;
use thiserror::Error;

/// Default maximum digit value: components up to `9_998` are accepted.
pub const DEFAULT_LIMIT: u32 = 10_000;

/// Errors converting version text to and from its encoded form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The text is not a `major[.minor[.rest]]` version.
    #[error("version \"{text}\" is not properly formatted: {reason}")]
    Format {
        /// Text that was being parsed.
        text: String,
        /// What is wrong with it.
        reason: String,
    },
    /// A component does not fit below the configured limit.
    #[error("component {value} of version \"{text}\" is too high for limit {limit}")]
    TooHigh {
        /// Version that was being encoded.
        text: String,
        /// The offending component.
        value: u32,
        /// Limit in effect.
        limit: u32,
    },
}

// Version #####################################################################

/// A `major.minor` version. Deeper levels are bugfixes and are never compared.
#[derive(Debug, Copy, Clone, Default, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct Version {
    major: u32,
    minor: u32,
}

impl Version {
    /// Create a version `major.minor`.
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Version 0.0.
    pub fn zero() -> Self {
        Self::new(0, 0)
    }

    /// The major component.
    pub fn major(&self) -> u32 {
        self.major
    }

    /// The minor component.
    pub fn minor(&self) -> u32 {
        self.minor
    }

    /// Encode onto the integer line of `limit`.
    pub fn encode(self, limit: u32) -> Result<u64, CodecError> {
        encode(self.major, self.minor, limit)
    }

    /// Inverse of [Version::encode].
    pub fn decode(nr: u64, limit: u32) -> Self {
        let (major, minor) = decode(nr, limit);
        Self::new(major, minor)
    }
}

impl From<(u32, u32)> for Version {
    fn from((major, minor): (u32, u32)) -> Self {
        Self::new(major, minor)
    }
}

impl From<Version> for (u32, u32) {
    fn from(v: Version) -> Self {
        (v.major, v.minor)
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Parses `major` or `major.minor`; a missing minor is 0.
impl FromStr for Version {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('.');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(major), minor, None) => {
                let major = parse_component(major, s)?;
                let minor = match minor {
                    Some(minor) => parse_component(minor, s)?,
                    None => 0,
                };
                Ok(Self::new(major, minor))
            }
            _ => Err(CodecError::Format {
                text: s.to_string(),
                reason: "expected at most two numbers separated by a dot".to_string(),
            }),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Version {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        FromStr::from_str(&s).map_err(serde::de::Error::custom)
    }
}

// Codec #######################################################################

/// Largest value on the integer line of `limit`.
///
/// Never produced by [encode]; only range arithmetic reaches it.
pub const fn highest(limit: u32) -> u64 {
    (limit as u64 + 1) * limit as u64
}

/// Largest component value [encode] accepts for `limit`.
pub fn max_component(limit: u32) -> u32 {
    limit.saturating_sub(2)
}

/// Encode `major.minor` as `major * (limit + 1) + minor`.
pub fn encode(major: u32, minor: u32, limit: u32) -> Result<u64, CodecError> {
    for value in [major, minor] {
        if value > max_component(limit) || limit < 2 {
            return Err(CodecError::TooHigh {
                text: format!("{major}.{minor}"),
                value,
                limit,
            });
        }
    }
    Ok(u64::from(major) * (u64::from(limit) + 1) + u64::from(minor))
}

/// Split an encoded version back into `(major, minor)`.
pub fn decode(nr: u64, limit: u32) -> (u32, u32) {
    let base = u64::from(limit) + 1;
    // The remainder is at most `limit`, the quotient only overflows for values
    // far beyond `highest(limit)`.
    let major = u32::try_from(nr / base).unwrap_or(u32::MAX);
    (major, (nr % base) as u32)
}

/// Encode `major` or `major.minor` text.
pub fn encode_str(text: &str, limit: u32) -> Result<u64, CodecError> {
    text.parse::<Version>()
        .and_then(|v| v.encode(limit))
        .map_err(|err| with_text(err, text))
}

/// Format an encoded version as `major.minor`.
pub fn decode_str(nr: u64, limit: u32) -> String {
    Version::decode(nr, limit).to_string()
}

/// Encode `major[.minor[.rest]]` text, returning the rest verbatim.
///
/// Trailing dots are dropped first, so `"1.2."` gives an empty rest and `"1.2.3.."` gives `"3"`.
pub fn encode_with_rest(text: &str, limit: u32) -> Result<(u64, String), CodecError> {
    let trimmed = text.trim_end_matches('.');
    let mut parts = trimmed.splitn(3, '.');
    let major = parse_component(parts.next().unwrap_or_default(), text)?;
    let minor = match parts.next() {
        Some(minor) => parse_component(minor, text)?,
        None => 0,
    };
    let rest = parts.next().unwrap_or_default().to_string();
    let nr = encode(major, minor, limit).map_err(|err| with_text(err, text))?;
    Ok((nr, rest))
}

/// Inverse of [encode_with_rest].
pub fn decode_with_rest(nr: u64, rest: &str, limit: u32) -> String {
    let version = Version::decode(nr, limit);
    if rest.is_empty() {
        version.to_string()
    } else {
        format!("{version}.{rest}")
    }
}

fn parse_component(part: &str, text: &str) -> Result<u32, CodecError> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CodecError::Format {
            text: text.to_string(),
            reason: format!("'{part}' is not a number"),
        });
    }
    part.parse::<u32>().map_err(|err| match err.kind() {
        IntErrorKind::PosOverflow => CodecError::TooHigh {
            text: text.to_string(),
            value: u32::MAX,
            limit: u32::MAX,
        },
        _ => CodecError::Format {
            text: text.to_string(),
            reason: err.to_string(),
        },
    })
}

fn with_text(err: CodecError, text: &str) -> CodecError {
    match err {
        CodecError::TooHigh { value, limit, .. } => CodecError::TooHigh {
            text: text.to_string(),
            value,
            limit,
        },
        other => other,
    }
}

/// Versions whose components all encode under `limit`.
#[cfg(any(feature = "proptest", test))]
pub fn proptest_strategy(limit: u32) -> impl Strategy<Value = Version> {
    let top = max_component(limit);
    (0..=top, 0..=top).prop_map(Version::from)
}

// TESTS #######################################################################

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    const LIMITS: [u32; 3] = [100, 241, DEFAULT_LIMIT];

    fn rest_strat() -> impl Strategy<Value = String> {
        "([a-z0-9][a-zA-Z0-9_.-]{0,6})?"
    }

    proptest! {
        #[test]
        fn round_trip_with_rest(
            limit in prop::sample::select(LIMITS.to_vec()),
            (major, minor) in (0u32..99, 0u32..99),
            rest in rest_strat(),
        ) {
            let text = format!("{major}.{minor}.{rest}");
            let (nr, rest) = encode_with_rest(&text, limit).unwrap();
            let back = decode_with_rest(nr, &rest, limit);
            prop_assert_eq!(text.trim_end_matches('.'), back.trim_end_matches('.'));
        }

        #[test]
        fn round_trip_without_rest(version in proptest_strategy(DEFAULT_LIMIT)) {
            let text = version.to_string();
            let nr = encode_str(&text, DEFAULT_LIMIT).unwrap();
            prop_assert_eq!(decode_str(nr, DEFAULT_LIMIT), text);
        }

        #[test]
        fn encoding_preserves_order(v1 in proptest_strategy(241), v2 in proptest_strategy(241)) {
            let (n1, n2) = (v1.encode(241).unwrap(), v2.encode(241).unwrap());
            prop_assert_eq!(v1.cmp(&v2), n1.cmp(&n2));
        }

        #[test]
        fn encoded_stays_below_highest(version in proptest_strategy(100)) {
            prop_assert!(version.encode(100).unwrap() < highest(100));
        }
    }

    #[test]
    fn boundary_components() {
        for limit in LIMITS {
            for bad in [limit, limit - 1] {
                for (major, minor) in [(bad, 0), (0, bad)] {
                    assert!(matches!(
                        encode(major, minor, limit),
                        Err(CodecError::TooHigh { value, .. }) if value == bad
                    ));
                }
            }
            let top = limit - 2;
            assert_eq!(encode(top, 0, limit), Ok(u64::from(top) * (u64::from(limit) + 1)));
            assert_eq!(encode(0, top, limit), Ok(u64::from(top)));
            assert_eq!(decode(encode(top, top, limit).unwrap(), limit), (top, top));
            assert_eq!(encode(0, 0, limit), Ok(0));
        }
    }

    #[test]
    fn limit_errors_from_text() {
        assert!(matches!(encode_str("100.0", 100), Err(CodecError::TooHigh { .. })));
        assert!(matches!(encode_str("0.100", 100), Err(CodecError::TooHigh { .. })));
        assert!(matches!(encode_str("99.0", 100), Err(CodecError::TooHigh { .. })));
        assert!(matches!(encode_str("0.99", 100), Err(CodecError::TooHigh { .. })));
        assert_eq!(encode_str("98.0", 100), Ok(98 * 101));
        assert_eq!(encode_str("0.98", 100), Ok(98));
    }

    #[test]
    fn too_high_names_the_text() {
        let err = encode_with_rest("99.1.dev", 100).unwrap_err();
        assert_eq!(
            err,
            CodecError::TooHigh {
                text: "99.1.dev".into(),
                value: 99,
                limit: 100
            }
        );
    }

    #[test]
    fn highest_is_last_major_boundary() {
        assert_eq!(highest(100), 101 * 100);
        assert_eq!(decode(highest(100), 100), (100, 0));
    }

    #[test]
    fn rest_is_normalized() {
        assert_eq!(encode_with_rest("1.2.", 100), Ok((103, String::new())));
        assert_eq!(encode_with_rest("1.2.0..", 100), Ok((103, "0".into())));
        assert_eq!(encode_with_rest("1", 100), Ok((101, String::new())));
        assert_eq!(decode_with_rest(103, "", 100), "1.2");
    }

    #[test]
    fn malformed_text() {
        for text in ["", "a.1", "1..2", "1.-2", "+1.0", ".5"] {
            assert!(
                matches!(encode_with_rest(text, 100), Err(CodecError::Format { .. })),
                "{text:?} should not parse"
            );
        }
        assert!(matches!("1.2.3".parse::<Version>(), Err(CodecError::Format { .. })));
        assert!(matches!(
            "99999999999.0".parse::<Version>(),
            Err(CodecError::TooHigh { .. })
        ));
    }

    #[test]
    fn version_text() {
        assert_eq!("3".parse::<Version>(), Ok(Version::new(3, 0)));
        assert_eq!("3.14".parse::<Version>(), Ok(Version::new(3, 14)));
        assert_eq!(Version::new(2, 5).to_string(), "2.5");
        assert!(Version::new(1, 9) < Version::new(2, 0));
    }
}
