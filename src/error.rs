// SPDX-License-Identifier: MPL-2.0

//! Handling version errors.

use thiserror::Error;
use version_codec::CodecError;

/// Errors that may occur while parsing selectors or combining ranges.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// Selector or version text does not match the accepted grammar.
    #[error("version string \"{text}\" is incorrect: {reason}")]
    Format {
        /// The offending text.
        text: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A version component does not fit under the configured limit.
    /// Raise the limit or reject the version.
    #[error("component {value} of version \"{text}\" is too high for limit {limit}")]
    TooHigh {
        /// The version being encoded.
        text: String,
        /// The offending component.
        value: u32,
        /// Limit in effect.
        limit: u32,
    },

    /// Two selectors combine into bounds that do not overlap.
    #[error("{message}")]
    RangeMismatch {
        /// Description naming both conflicting bounds.
        message: String,
    },

    /// A conflict policy name that is not `silent`, `warning` or `error`.
    #[error("unknown conflict mode \"{name}\"")]
    UnknownPolicy {
        /// The name that was given.
        name: String,
    },
}

impl From<CodecError> for VersionError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Format { text, reason } => Self::Format { text, reason },
            CodecError::TooHigh { text, value, limit } => Self::TooHigh { text, value, limit },
        }
    }
}
