// SPDX-License-Identifier: MPL-2.0

//! Tokenizer for pip-style selectors.
//!
//! A selection string such as `>=1.3,<2.0` is a comma separated list of selectors.
//! Each selector is an operator followed by at most two dotted components:
//!
//! ```txt
//! selector := operator (digits | '*') ('.' (digits | '*'))?
//! operator := '==' | '=' | '>=' | '>' | '<=' | '<'
//! ```
//!
//! Deeper components are bugfix levels which are compatible by definition,
//! so selecting on them is rejected instead of silently ignored.

use std::fmt::{self, Display};
use std::str::FromStr;

use version_codec::encode;

use crate::error::VersionError;

/// Textual form of the accepted grammar, used in error messages.
pub const SELECTOR_PATTERN: &str = r"^[><=]=?(\d+|\*)(?:\.(\d*|\*))?$";

/// Marker in front of a selection string meaning "prefer lower versions".
pub const PREFER_LOWEST_MARKER: char = '_';

/// Comparison operator of a selector. `=` and `==` are the same operator.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `==` or `=`
    Equal,
    /// `>=`
    GreaterEqual,
    /// `>`
    Greater,
    /// `<=`
    LessEqual,
    /// `<`
    Less,
}

impl Operator {
    /// Split the operator off the front of a selector.
    fn strip(s: &str) -> Option<(Self, &str)> {
        const OPERATORS: [(&str, Operator); 6] = [
            ("==", Operator::Equal),
            (">=", Operator::GreaterEqual),
            ("<=", Operator::LessEqual),
            ("=", Operator::Equal),
            (">", Operator::Greater),
            ("<", Operator::Less),
        ];
        OPERATORS
            .iter()
            .find_map(|(text, op)| s.strip_prefix(text).map(|rest| (*op, rest)))
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Equal => "==",
            Self::GreaterEqual => ">=",
            Self::Greater => ">",
            Self::LessEqual => "<=",
            Self::Less => "<",
        };
        f.write_str(text)
    }
}

/// One dotted component of a selector.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Component {
    /// A plain number.
    Number(u32),
    /// `*`, matching any value.
    Wildcard,
}

impl Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Wildcard => f.write_str("*"),
        }
    }
}

/// A single `operator version` clause, like `>=1.3`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Selector {
    operator: Operator,
    major: Component,
    minor: Option<Component>,
}

/// New bounds requested by a selector on the encoded version line.
/// `None` leaves that side of the range alone.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Bounds {
    /// Inclusive lower bound.
    pub min: Option<u64>,
    /// Inclusive upper bound.
    pub max: Option<u64>,
}

impl Selector {
    /// The selector's operator.
    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// The major component.
    pub fn major(&self) -> Component {
        self.major
    }

    /// The minor component, if one was written.
    pub fn minor(&self) -> Option<Component> {
        self.minor
    }

    /// Whether this selector matches every version (`==*`).
    pub fn is_any(&self) -> bool {
        self.major == Component::Wildcard
    }

    /// Translate the selector into bounds on the integer line of `limit`.
    ///
    /// Bare-major bounds are not mirror images: `<7` means below `7.0`, while
    /// `>7` means `8.0` or higher and `<=7` means anything below `8.0`.
    pub fn bounds(&self, limit: u32) -> Result<Bounds, VersionError> {
        let major = match self.major {
            Component::Wildcard => return Ok(Bounds::default()),
            Component::Number(major) => major,
        };
        let minor = match self.minor {
            Some(Component::Number(minor)) => Some(minor),
            Some(Component::Wildcard) | None => None,
        };
        let major_start = encode(major, 0, limit)?;
        // Valid majors stay two below the limit, so the next major still fits.
        let next_major = major_start + u64::from(limit) + 1;
        let exact = match minor {
            Some(minor) => Some(encode(major, minor, limit)?),
            None => None,
        };

        let (min, max) = match (self.operator, exact) {
            (Operator::Equal, None) => (Some(major_start), Some(next_major - 1)),
            (Operator::Equal, Some(v)) => (Some(v), Some(v)),
            (Operator::GreaterEqual, v) => (Some(v.unwrap_or(major_start)), None),
            (Operator::Greater, None) => (Some(next_major), None),
            (Operator::Greater, Some(v)) => (Some(v + 1), None),
            (Operator::LessEqual, None) => (None, Some(next_major - 1)),
            (Operator::LessEqual, Some(v)) => (None, Some(v)),
            (Operator::Less, v) => {
                let below = v.unwrap_or(major_start).checked_sub(1).ok_or_else(|| {
                    VersionError::RangeMismatch {
                        message: format!("\"{}\" does not leave any version to select", self),
                    }
                })?;
                (None, Some(below))
            }
        };
        Ok(Bounds { min, max })
    }
}

impl Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator, self.major)?;
        if let Some(minor) = self.minor {
            write!(f, ".{minor}")?;
        }
        Ok(())
    }
}

impl FromStr for Selector {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        let text = text.replace("=.", "=0.");
        let format_error = |reason: String| VersionError::Format {
            text: text.clone(),
            reason,
        };

        if text.contains(',') {
            return Err(format_error(
                "perhaps you're trying to add a combined selection; parse it as a selection instead"
                    .to_string(),
            ));
        }
        if text.matches('.').count() > 1 {
            return Err(format_error(
                "perhaps it contains a version longer than 2 numbers (e.g. \"3.1.4\"), which is \
                 intentionally not supported; version numbers beyond the second are for \
                 bugfixes only"
                    .to_string(),
            ));
        }
        let not_formatted =
            || format_error(format!("not properly formatted according to \"{SELECTOR_PATTERN}\""));

        let (operator, version) = Operator::strip(&text).ok_or_else(not_formatted)?;
        let (major, minor) = match version.split_once('.') {
            Some((major, minor)) => (major, Some(minor)),
            None => (version, None),
        };
        let major = parse_component(major).ok_or_else(not_formatted)?;
        let minor = match minor {
            // `>=3.` is read as `>=3`
            Some("") | None => None,
            Some(minor) => Some(parse_component(minor).ok_or_else(not_formatted)?),
        };

        let wildcard_ok = match (major, minor) {
            (Component::Wildcard, None) => operator == Operator::Equal,
            (Component::Wildcard, Some(_)) => false,
            (Component::Number(_), Some(Component::Wildcard)) => operator == Operator::Equal,
            (Component::Number(_), _) => true,
        };
        if !wildcard_ok {
            return Err(format_error(
                "* can appear as \"==*\" or \"==nr.*\" only".to_string(),
            ));
        }

        Ok(Self {
            operator,
            major,
            minor,
        })
    }
}

fn parse_component(part: &str) -> Option<Component> {
    if part == "*" {
        return Some(Component::Wildcard);
    }
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // Too many digits for a u32 is certainly above any limit.
    Some(Component::Number(part.parse().unwrap_or(u32::MAX)))
}

/// A whole selection string: the selectors it lists and its preference marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    prefer_lowest: bool,
    selectors: Vec<Selector>,
}

impl Selection {
    /// Whether the selection carried the [PREFER_LOWEST_MARKER].
    pub fn prefer_lowest(&self) -> bool {
        self.prefer_lowest
    }

    /// The selectors, in the order written. Empty entries are skipped.
    pub fn selectors(&self) -> &[Selector] {
        &self.selectors
    }
}

impl FromStr for Selection {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim_start();
        let (prefer_lowest, body) = match trimmed.strip_prefix(PREFER_LOWEST_MARKER) {
            Some(body) => (true, body),
            None => (false, trimmed),
        };
        let selectors = body
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(str::parse)
            .collect::<Result<_, _>>()?;
        Ok(Self {
            prefer_lowest,
            selectors,
        })
    }
}

// TESTS #######################################################################

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: u32 = 100;

    fn bounds(s: &str) -> Bounds {
        s.parse::<Selector>().unwrap().bounds(LIMIT).unwrap()
    }

    fn enc(major: u32, minor: u32) -> u64 {
        encode(major, minor, LIMIT).unwrap()
    }

    #[test]
    fn tokenize() {
        let sel: Selector = " >= 1 . 3 ".parse().unwrap();
        assert_eq!(sel.operator(), Operator::GreaterEqual);
        assert_eq!(sel.major(), Component::Number(1));
        assert_eq!(sel.minor(), Some(Component::Number(3)));
        assert_eq!(sel.to_string(), ">=1.3");

        let sel: Selector = "=2.*".parse().unwrap();
        assert_eq!(sel.operator(), Operator::Equal);
        assert_eq!(sel.minor(), Some(Component::Wildcard));
        assert_eq!(sel.to_string(), "==2.*");

        assert_eq!("==.5".parse::<Selector>().unwrap().to_string(), "==0.5");
        assert_eq!("<3.".parse::<Selector>().unwrap().minor(), None);
        assert!("==*".parse::<Selector>().unwrap().is_any());
        assert!("=*".parse::<Selector>().unwrap().is_any());
    }

    #[test]
    fn rejects_malformed() {
        for text in [
            "", "3.1", "~=3.1", "=>3", "!=3", ">=a", ">=3.b", "==3.1.4", ">=*", "<*", "==*.1",
            "==*.*", ">=3.*", "<=3.*", "3,4", "===3",
        ] {
            assert!(
                matches!(text.parse::<Selector>(), Err(VersionError::Format { .. })),
                "{text:?} should be rejected"
            );
        }
    }

    #[test]
    fn format_error_names_pattern() {
        let err = "~3".parse::<Selector>().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("~3"), "{message}");
        assert!(message.contains(SELECTOR_PATTERN), "{message}");
    }

    #[test]
    fn too_many_components() {
        let err = ">=3.1.4".parse::<Selector>().unwrap_err();
        assert!(err.to_string().contains("longer than 2 numbers"));
    }

    #[test]
    fn bounds_per_operator() {
        let none = Bounds::default();
        assert_eq!(bounds("==*"), none);
        let major_two = Bounds {
            min: Some(enc(2, 0)),
            max: Some(enc(3, 0) - 1),
        };
        assert_eq!(bounds("==2.*"), major_two);
        assert_eq!(bounds("==2"), major_two);
        assert_eq!(
            bounds("==2.5"),
            Bounds {
                min: Some(enc(2, 5)),
                max: Some(enc(2, 5))
            }
        );
        assert_eq!(bounds(">=2").min, Some(enc(2, 0)));
        assert_eq!(bounds(">=2.5").min, Some(enc(2, 5)));
        assert_eq!(bounds(">2").min, Some(enc(3, 0)));
        assert_eq!(bounds(">2.5").min, Some(enc(2, 5) + 1));
        assert_eq!(bounds("<=2").max, Some(enc(3, 0) - 1));
        assert_eq!(bounds("<=2.5").max, Some(enc(2, 5)));
        assert_eq!(bounds("<2").max, Some(enc(2, 0) - 1));
        assert_eq!(bounds("<2.5").max, Some(enc(2, 5) - 1));
        assert_eq!(bounds("<2.5").min, None);
        assert_eq!(bounds(">2.5").max, None);
    }

    #[test]
    fn bounds_at_the_top() {
        let top = LIMIT - 2;
        let b = bounds(&format!(">{top}"));
        assert_eq!(b.min, Some(u64::from(top + 1) * u64::from(LIMIT + 1)));
        assert!(b.min.unwrap() < version_codec::highest(LIMIT));
        assert!(matches!(
            format!("=={}", LIMIT - 1).parse::<Selector>().unwrap().bounds(LIMIT),
            Err(VersionError::TooHigh { .. })
        ));
    }

    #[test]
    fn nothing_below_zero() {
        for text in ["<0", "<0.0"] {
            assert!(matches!(
                text.parse::<Selector>().unwrap().bounds(LIMIT),
                Err(VersionError::RangeMismatch { .. })
            ));
        }
        assert_eq!(bounds("<0.1").max, Some(0));
    }

    #[test]
    fn selection() {
        let selection: Selection = " _>=2.0, <3 ,".parse().unwrap();
        assert!(selection.prefer_lowest());
        assert_eq!(selection.selectors().len(), 2);
        assert_eq!(selection.selectors()[1].to_string(), "<3");

        let selection: Selection = "".parse().unwrap();
        assert!(!selection.prefer_lowest());
        assert!(selection.selectors().is_empty());

        assert!("==1,~2".parse::<Selection>().is_err());
    }
}
