//! Error types for criteria building and field resolution.
//!
//! Every variant is a usage error: the caller can detect it while building
//! or compiling, and retrying the same call never helps.

use docquery_model::PatternError;

/// Errors raised by the [`Criteria`](crate::Criteria) builder and compiler.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CriteriaError {
    /// An equality value was set twice, or set while a `not()` is pending.
    #[error("conflicting assignment: {message}")]
    ConflictingAssignment {
        /// Explanation.
        message: String,
    },

    /// A multi-value call received a collection in second position.
    #[error("ambiguous argument for {operator}: {message}")]
    AmbiguousArgument {
        /// The operator being recorded.
        operator: String,
        /// Explanation.
        message: String,
    },

    /// A bitmask could not be stored.
    #[error("invalid bitmask: {message}")]
    InvalidBitmask {
        /// Explanation.
        message: String,
    },

    /// Two chained nodes compiled to the same top-level key.
    #[error(
        "cannot add a second '{key}' expression specified as '{key} : {value}'; \
         criteria already contains '{key} : {existing}'"
    )]
    DuplicateKey {
        /// The conflicting key.
        key: String,
        /// Rendering of the value already present.
        existing: String,
        /// Rendering of the value that was rejected.
        value: String,
    },

    /// A chain element was appended directly after a dangling `not()`.
    #[error("illegal nesting: {message}")]
    IllegalNesting {
        /// Explanation.
        message: String,
    },

    /// A regular expression could not be compiled.
    #[error(transparent)]
    Pattern(#[from] PatternError),
}

/// Errors raised while resolving field references.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// The field is not exposed by the root context.
    #[error("invalid reference '{field}'")]
    InvalidReference {
        /// The unresolved field target.
        field: String,
    },

    /// The field name or target is empty.
    #[error("field name must not be empty")]
    EmptyField,
}

/// Convenience result type for criteria operations.
pub type CriteriaResult<T> = Result<T, CriteriaError>;

/// Convenience result type for field resolution.
pub type ResolveResult<T> = Result<T, ResolveError>;
