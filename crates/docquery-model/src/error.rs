//! Error types for the document model.

/// Errors produced while building a [`RegexPattern`](crate::RegexPattern).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    /// The option string contains a flag the query dialect does not define.
    #[error("unsupported regex option '{option}' (expected any of \"imsxu\")")]
    UnsupportedOption {
        /// The offending option character.
        option: char,
    },
    /// The pattern source failed to compile.
    #[error("invalid regex pattern '{source_text}': {message}")]
    InvalidPattern {
        /// The pattern source as given.
        source_text: String,
        /// Compiler diagnostic.
        message: String,
    },
    /// A backtracking match gave up before finishing.
    #[error("match against '{source_text}' aborted: {message}")]
    MatchAborted {
        /// The pattern source.
        source_text: String,
        /// Engine diagnostic.
        message: String,
    },
}
