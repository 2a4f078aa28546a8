use thiserror::Error;

/// Errors raised by the diff, match and patch engines.
///
/// These cover malformed inputs only. Expected negative outcomes are soft:
/// a fuzzy search that finds nothing returns `None`, and a hunk that cannot
/// be anchored records `false` in the results of
/// [`Patcher::apply`](crate::Patcher::apply).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A fuzzy-match pattern is longer than the configured word width.
    #[error("pattern of {len} chars exceeds the {max} char match window")]
    PatternTooLong { len: usize, max: usize },

    /// A delta string does not describe the text it was paired with.
    #[error("invalid delta: {0}")]
    InvalidDelta(String),

    /// A percent escape could not be decoded.
    #[error("malformed percent escape in {0:?}")]
    InvalidEscape(String),

    /// Patch text has a malformed header or an unknown body line.
    #[error("invalid patch text: {0:?}")]
    InvalidPatchText(String),

    /// A hunk was serialized or grown before being anchored.
    #[error("patch hunk has no start coordinates")]
    PatchNotInitialized,
}
