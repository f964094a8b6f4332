//! Error types for message resolution.

use crate::locale::Locale;
use thiserror::Error;

/// Result type alias for message operations
pub type MessageResult<T> = Result<T, MessageError>;

/// Errors surfaced by message resolution and formatting.
///
/// Resource absence and per-line parse problems never appear here; they are
/// absorbed during bundle loading. Only an unresolvable code without a
/// default message, or a broken pattern/argument pairing, crosses the
/// public boundary.
#[derive(Error, Debug)]
pub enum MessageError {
    /// No code resolved in any locale and no default message was supplied
    #[error("No message found under codes {codes:?} for locale '{locale}'")]
    NoSuchMessage { codes: Vec<String>, locale: Locale },

    /// A pattern referenced an argument index that was not supplied
    #[error("Pattern references argument {{{index}}} but only {supplied} argument(s) were given")]
    MissingArgument { index: usize, supplied: usize },

    /// A pattern contained an unclosed or non-numeric placeholder
    #[error("Malformed placeholder at byte {position} in pattern \"{pattern}\"")]
    InvalidPlaceholder { pattern: String, position: usize },
}

impl MessageError {
    /// Whether this error reports an unresolvable code.
    pub fn is_no_such_message(&self) -> bool {
        matches!(self, Self::NoSuchMessage { .. })
    }

    /// Whether this error reports a pattern/argument formatting problem.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::MissingArgument { .. } | Self::InvalidPlaceholder { .. }
        )
    }
}
